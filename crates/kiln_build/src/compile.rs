//! Per-source compile orchestration.

use std::path::Path;

use kiln_cache::{HashLedger, SourceHasher, KILN_VERSION};
use kiln_config::{BuildLayout, StalenessMode};

use crate::depfile::read_dependencies;
use crate::dirs::ensure_parent;
use crate::discover::SourceFile;
use crate::error::BuildError;
use crate::staleness::{self, Inputs};
use crate::toolchain::{CompileRequest, Toolchain};

/// What happened to one source.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CompileOutcome {
    /// The artifact was fresh; no compiler was run.
    UpToDate,
    /// The compiler ran and exited zero.
    Compiled,
    /// The compiler ran and exited non-zero.
    Failed {
        /// The compiler's exit code.
        exit_code: i32,
    },
}

impl CompileOutcome {
    /// Returns `true` for [`UpToDate`](Self::UpToDate) and [`Compiled`](Self::Compiled).
    pub fn is_success(&self) -> bool {
        !matches!(self, CompileOutcome::Failed { .. })
    }
}

/// Compiles individual sources into the mirrored object and manifest trees.
///
/// In content-hash mode the compiler owns the [`HashLedger`] for the
/// duration of a build; call [`Compiler::finish`] to persist it.
pub struct Compiler<'a> {
    layout: &'a BuildLayout,
    toolchain: &'a dyn Toolchain,
    work_dir: &'a Path,
    ledger: Option<HashLedger>,
}

impl<'a> Compiler<'a> {
    /// Creates a compiler. `work_dir` is where relative manifest entries
    /// are resolved; it must match the directory the toolchain runs in.
    pub fn new(
        layout: &'a BuildLayout,
        toolchain: &'a dyn Toolchain,
        work_dir: &'a Path,
        mode: StalenessMode,
    ) -> Self {
        let ledger = match mode {
            StalenessMode::Mtime => None,
            StalenessMode::ContentHash => Some(HashLedger::load_or_create(
                &layout.manifest_root,
                KILN_VERSION,
            )),
        };
        Self {
            layout,
            toolchain,
            work_dir,
            ledger,
        }
    }

    /// Brings one source's object and manifest up to date.
    ///
    /// A non-zero compiler exit is reported as [`CompileOutcome::Failed`],
    /// not as an error, so the caller can carry on with the next source.
    pub fn compile_one(&mut self, source: &SourceFile) -> Result<CompileOutcome, BuildError> {
        let rel = &source.relative;
        let source_path = self.layout.source_path(rel);
        let object = self.layout.object_path(rel);
        let manifest = self.layout.manifest_path(rel);

        ensure_parent(&manifest)?;
        ensure_parent(&object)?;

        let inputs = Inputs {
            source: &source_path,
            artifact: &object,
            manifest: &manifest,
            work_dir: self.work_dir,
        };
        let verdict = match &self.ledger {
            Some(ledger) => staleness::check_content(inputs, rel, ledger)?,
            None => staleness::needs_build(inputs)?,
        };
        if !verdict.is_stale() {
            log::debug!("{} is up to date", rel.display());
            return Ok(CompileOutcome::UpToDate);
        }
        log::debug!("{} is stale: {verdict:?}", rel.display());

        let exit_code = self.toolchain.compile(&CompileRequest {
            source: &source_path,
            object: &object,
            manifest: &manifest,
        })?;

        if exit_code == 0 {
            self.remember(rel, &manifest);
            Ok(CompileOutcome::Compiled)
        } else {
            if let Some(ledger) = self.ledger.as_mut() {
                ledger.forget(rel);
            }
            Ok(CompileOutcome::Failed { exit_code })
        }
    }

    /// Records the fresh manifest's dependency hashes in content-hash mode.
    fn remember(&mut self, rel: &Path, manifest: &Path) {
        let Some(ledger) = self.ledger.as_mut() else {
            return;
        };
        let hashed = read_dependencies(manifest, self.work_dir)
            .and_then(|deps| SourceHasher::hash_all(&deps).map_err(BuildError::from));
        match hashed {
            Ok(hashes) => ledger.record(rel, hashes),
            Err(e) => {
                log::warn!("not recording hashes for {}: {e}", rel.display());
                ledger.forget(rel);
            }
        }
    }

    /// Persists the hash ledger, if one is in use.
    pub fn finish(self) -> Result<(), BuildError> {
        if let Some(ledger) = &self.ledger {
            ledger.save(&self.layout.manifest_root)?;
        }
        Ok(())
    }
}
