//! The build driver.
//!
//! A build moves through `Discover → CompileAll → LinkBinary`, or ends in
//! `ReportFailure` after `CompileAll` when any source failed. Compiles run
//! one at a time; each is independent of the others. Linking starts only
//! after every compile has finished and all of them succeeded, so an
//! incomplete object set never produces a binary.

use std::path::{Path, PathBuf};

use kiln_config::{BuildLayout, StalenessMode};

use crate::compile::{CompileOutcome, Compiler};
use crate::dirs::ensure_parent;
use crate::discover::{discover_objects, discover_sources, SourceFile};
use crate::error::BuildError;
use crate::toolchain::{LinkRequest, Toolchain};

/// Summary of a successful build.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BuildReport {
    /// Sources that were recompiled, relative to the source root.
    pub compiled: Vec<PathBuf>,
    /// Sources whose objects were already fresh.
    pub up_to_date: Vec<PathBuf>,
    /// Objects passed to the linker.
    pub objects: Vec<PathBuf>,
    /// The linked executable.
    pub binary: PathBuf,
}

/// Per-source results of the compile phase.
#[derive(Debug, Default)]
struct CompileSummary {
    compiled: Vec<PathBuf>,
    up_to_date: Vec<PathBuf>,
    failed: Vec<PathBuf>,
}

/// Drives a full build over a [`BuildLayout`].
pub struct Builder<'a> {
    layout: &'a BuildLayout,
    toolchain: &'a dyn Toolchain,
    work_dir: &'a Path,
    staleness: StalenessMode,
}

impl<'a> Builder<'a> {
    /// Creates a builder using modification-time staleness.
    ///
    /// `work_dir` is the directory the toolchain runs in.
    pub fn new(layout: &'a BuildLayout, toolchain: &'a dyn Toolchain, work_dir: &'a Path) -> Self {
        Self {
            layout,
            toolchain,
            work_dir,
            staleness: StalenessMode::Mtime,
        }
    }

    /// Selects the staleness detection strategy.
    pub fn staleness(mut self, mode: StalenessMode) -> Self {
        self.staleness = mode;
        self
    }

    /// Runs the build to completion.
    ///
    /// Returns [`BuildError::CompileFailed`] without linking if any source
    /// fails, and [`BuildError::LinkFailed`] if the linker exits non-zero.
    /// Filesystem and spawn errors abort immediately.
    pub fn build(&self) -> Result<BuildReport, BuildError> {
        let sources = discover_sources(self.layout)?;
        if sources.is_empty() {
            return Err(BuildError::NoSources {
                root: self.layout.source_root.clone(),
            });
        }
        log::debug!("discovered {} source(s)", sources.len());

        let summary = self.compile_all(&sources)?;
        if !summary.failed.is_empty() {
            log::error!("Object compilation failed.");
            return Err(BuildError::CompileFailed {
                failed: summary.failed,
            });
        }

        let (objects, binary) = self.link()?;
        Ok(BuildReport {
            compiled: summary.compiled,
            up_to_date: summary.up_to_date,
            objects,
            binary,
        })
    }

    /// Compiles every source, continuing past individual failures.
    fn compile_all(&self, sources: &[SourceFile]) -> Result<CompileSummary, BuildError> {
        let mut compiler = Compiler::new(self.layout, self.toolchain, self.work_dir, self.staleness);
        let mut summary = CompileSummary::default();
        for source in sources {
            let rel = source.relative.clone();
            match compiler.compile_one(source)? {
                CompileOutcome::UpToDate => summary.up_to_date.push(rel),
                CompileOutcome::Compiled => summary.compiled.push(rel),
                CompileOutcome::Failed { exit_code } => {
                    log::error!("{} failed to compile (exit code {exit_code})", rel.display());
                    summary.failed.push(rel);
                }
            }
        }
        compiler.finish()?;
        Ok(summary)
    }

    /// Links every object found under the object root.
    fn link(&self) -> Result<(Vec<PathBuf>, PathBuf), BuildError> {
        let objects = discover_objects(self.layout)?;
        let binary = self.layout.binary_path();
        ensure_parent(&binary)?;

        let exit_code = self.toolchain.link(&LinkRequest {
            objects: &objects,
            binary: &binary,
        })?;
        if exit_code != 0 {
            return Err(BuildError::LinkFailed { binary, exit_code });
        }
        Ok((objects, binary))
    }
}
