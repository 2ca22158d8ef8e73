//! Rebuild decisions for a single source.
//!
//! The oracle looks at one level of indirection only: the compiler already
//! flattened every transitive header into the manifest, so the manifest is
//! trusted as the complete dependency list.
//!
//! The default check compares modification times. Clock skew between
//! machines and coarse filesystem timestamps can hide an edit or cause an
//! unnecessary rebuild; ties count as stale so that an edit landing in the
//! same timestamp tick as the last compile is not lost. Projects that cannot
//! live with that can opt into [`check_content`], which compares content
//! hashes recorded in the [`HashLedger`].

use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::time::SystemTime;

use kiln_cache::{HashLedger, SourceHasher};

use crate::depfile::read_dependencies;
use crate::error::BuildError;

/// Why an artifact must be rebuilt, or [`Staleness::Fresh`] if it need not be.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Staleness {
    /// Artifact and manifest are up to date.
    Fresh,
    /// No manifest on disk yet.
    MissingManifest,
    /// No object on disk yet.
    MissingArtifact,
    /// The source is at least as new as its manifest.
    SourceNewer,
    /// A listed dependency is at least as new as the object.
    DependencyNewer(PathBuf),
    /// A listed dependency no longer exists.
    MissingDependency(PathBuf),
    /// The manifest could not be read or parsed.
    UnreadableManifest,
    /// Content-hash mode: nothing recorded for this source.
    NotRecorded,
    /// Content-hash mode: a dependency's bytes changed.
    ContentChanged(PathBuf),
}

impl Staleness {
    /// Returns `true` unless the artifact is up to date.
    pub fn is_stale(&self) -> bool {
        !matches!(self, Staleness::Fresh)
    }
}

/// Paths the oracle inspects for one source.
#[derive(Debug, Clone, Copy)]
pub struct Inputs<'a> {
    /// The source file.
    pub source: &'a Path,
    /// Its object artifact.
    pub artifact: &'a Path,
    /// Its dependency manifest.
    pub manifest: &'a Path,
    /// Directory relative manifest entries are resolved against.
    pub work_dir: &'a Path,
}

/// Decides staleness from existence and modification times.
///
/// In order: missing manifest, missing artifact, source not older than the
/// manifest, then any manifest dependency not older than the artifact.
pub fn needs_build(inputs: Inputs<'_>) -> Result<Staleness, BuildError> {
    if let Some(early) = missing_outputs(inputs) {
        return Ok(early);
    }
    if mtime(inputs.source)? >= mtime(inputs.manifest)? {
        return Ok(Staleness::SourceNewer);
    }

    let artifact_time = mtime(inputs.artifact)?;
    let deps = match manifest_dependencies(inputs) {
        Some(deps) => deps,
        None => return Ok(Staleness::UnreadableManifest),
    };
    for dep in deps {
        match std::fs::metadata(&dep).and_then(|m| m.modified()) {
            Ok(time) if time >= artifact_time => return Ok(Staleness::DependencyNewer(dep)),
            Ok(_) => {}
            Err(e) if e.kind() == ErrorKind::NotFound => {
                return Ok(Staleness::MissingDependency(dep))
            }
            Err(e) => return Err(BuildError::io(dep, e)),
        }
    }
    Ok(Staleness::Fresh)
}

/// Decides staleness by comparing dependency content against the ledger.
///
/// `key` identifies the source in the ledger. Timestamps are ignored, so
/// touching a file without changing it never triggers a rebuild.
pub fn check_content(
    inputs: Inputs<'_>,
    key: &Path,
    ledger: &HashLedger,
) -> Result<Staleness, BuildError> {
    if let Some(early) = missing_outputs(inputs) {
        return Ok(early);
    }
    let Some(entry) = ledger.entry(key) else {
        return Ok(Staleness::NotRecorded);
    };
    let deps = match manifest_dependencies(inputs) {
        Some(deps) => deps,
        None => return Ok(Staleness::UnreadableManifest),
    };
    Ok(match SourceHasher::first_change(entry, &deps) {
        Some(dep) => Staleness::ContentChanged(dep),
        None => Staleness::Fresh,
    })
}

fn missing_outputs(inputs: Inputs<'_>) -> Option<Staleness> {
    if !inputs.manifest.is_file() {
        Some(Staleness::MissingManifest)
    } else if !inputs.artifact.is_file() {
        Some(Staleness::MissingArtifact)
    } else {
        None
    }
}

/// Reads the manifest, downgrading any failure to a warning.
///
/// An unusable manifest is recovered from by rebuilding, which rewrites it.
fn manifest_dependencies(inputs: Inputs<'_>) -> Option<Vec<PathBuf>> {
    match read_dependencies(inputs.manifest, inputs.work_dir) {
        Ok(deps) => Some(deps),
        Err(e) => {
            log::warn!("{e}; rebuilding {}", inputs.source.display());
            None
        }
    }
}

fn mtime(path: &Path) -> Result<SystemTime, BuildError> {
    std::fs::metadata(path)
        .and_then(|m| m.modified())
        .map_err(|e| BuildError::io(path, e))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    struct Fixture {
        dir: tempfile::TempDir,
        source: PathBuf,
        header: PathBuf,
        artifact: PathBuf,
        manifest: PathBuf,
    }

    impl Fixture {
        fn new() -> Self {
            let dir = tempfile::tempdir().unwrap();
            let p = dir.path();
            Self {
                source: p.join("a.cc"),
                header: p.join("b.h"),
                artifact: p.join("a.o"),
                manifest: p.join("a.d"),
                dir,
            }
        }

        fn inputs(&self) -> Inputs<'_> {
            Inputs {
                source: &self.source,
                artifact: &self.artifact,
                manifest: &self.manifest,
                work_dir: self.dir.path(),
            }
        }

        /// Writes all four files, with the outputs 10s newer than the inputs.
        fn built(self) -> Self {
            std::fs::write(&self.source, "#include \"b.h\"\n").unwrap();
            std::fs::write(&self.header, "int b();\n").unwrap();
            std::fs::write(&self.artifact, "obj").unwrap();
            std::fs::write(&self.manifest, "a.o: a.cc b.h\n").unwrap();
            let base = SystemTime::now() - Duration::from_secs(100);
            set_mtime(&self.source, base);
            set_mtime(&self.header, base);
            set_mtime(&self.artifact, base + Duration::from_secs(10));
            set_mtime(&self.manifest, base + Duration::from_secs(10));
            self
        }
    }

    fn set_mtime(path: &Path, time: SystemTime) {
        std::fs::File::options()
            .write(true)
            .open(path)
            .unwrap()
            .set_modified(time)
            .unwrap();
    }

    fn mtime_of(path: &Path) -> SystemTime {
        std::fs::metadata(path).unwrap().modified().unwrap()
    }

    #[test]
    fn nothing_built_is_stale() {
        let f = Fixture::new();
        std::fs::write(&f.source, "").unwrap();
        assert_eq!(needs_build(f.inputs()).unwrap(), Staleness::MissingManifest);
    }

    #[test]
    fn missing_artifact_is_stale() {
        let f = Fixture::new().built();
        std::fs::remove_file(&f.artifact).unwrap();
        assert_eq!(needs_build(f.inputs()).unwrap(), Staleness::MissingArtifact);
    }

    #[test]
    fn up_to_date_is_fresh() {
        let f = Fixture::new().built();
        let s = needs_build(f.inputs()).unwrap();
        assert_eq!(s, Staleness::Fresh);
        assert!(!s.is_stale());
    }

    #[test]
    fn source_equal_to_manifest_time_is_stale() {
        let f = Fixture::new().built();
        set_mtime(&f.source, mtime_of(&f.manifest));
        assert_eq!(needs_build(f.inputs()).unwrap(), Staleness::SourceNewer);
    }

    #[test]
    fn touched_header_is_stale() {
        let f = Fixture::new().built();
        set_mtime(&f.header, mtime_of(&f.artifact) + Duration::from_secs(1));
        assert_eq!(
            needs_build(f.inputs()).unwrap(),
            Staleness::DependencyNewer(f.header.clone())
        );
    }

    #[test]
    fn header_tied_with_artifact_is_stale() {
        let f = Fixture::new().built();
        set_mtime(&f.header, mtime_of(&f.artifact));
        assert!(needs_build(f.inputs()).unwrap().is_stale());
    }

    #[test]
    fn deleted_header_is_stale() {
        let f = Fixture::new().built();
        std::fs::remove_file(&f.header).unwrap();
        assert_eq!(
            needs_build(f.inputs()).unwrap(),
            Staleness::MissingDependency(f.header.clone())
        );
    }

    #[test]
    fn garbage_manifest_forces_rebuild() {
        let f = Fixture::new().built();
        std::fs::write(&f.manifest, "this is not a rule\n").unwrap();
        set_mtime(&f.manifest, mtime_of(&f.artifact));
        assert_eq!(needs_build(f.inputs()).unwrap(), Staleness::UnreadableManifest);
    }

    #[test]
    fn content_mode_needs_a_record() {
        let f = Fixture::new().built();
        let ledger = HashLedger::new("test");
        assert_eq!(
            check_content(f.inputs(), Path::new("a.cc"), &ledger).unwrap(),
            Staleness::NotRecorded
        );
    }

    #[test]
    fn content_mode_ignores_touch_but_sees_edits() {
        let f = Fixture::new().built();
        let deps = vec![f.source.clone(), f.header.clone()];
        let mut ledger = HashLedger::new("test");
        ledger.record(Path::new("a.cc"), SourceHasher::hash_all(&deps).unwrap());

        set_mtime(&f.header, SystemTime::now());
        assert_eq!(
            check_content(f.inputs(), Path::new("a.cc"), &ledger).unwrap(),
            Staleness::Fresh
        );

        std::fs::write(&f.header, "int b(int);\n").unwrap();
        assert_eq!(
            check_content(f.inputs(), Path::new("a.cc"), &ledger).unwrap(),
            Staleness::ContentChanged(f.header.clone())
        );
    }
}
