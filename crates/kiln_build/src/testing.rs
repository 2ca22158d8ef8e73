//! In-process toolchain double for unit tests.

use std::cell::RefCell;
use std::collections::{HashMap, HashSet};
use std::path::{Path, PathBuf};
use std::time::{Duration, SystemTime};

use crate::error::BuildError;
use crate::toolchain::{CompileRequest, LinkRequest, Toolchain};

/// Writes objects and manifests the way `g++ -MMD` would, without compiling.
///
/// Outputs are stamped one second after the newest input so that timestamp
/// comparisons behave as if compilation took real time.
#[derive(Default)]
pub struct FakeToolchain {
    headers: HashMap<PathBuf, Vec<PathBuf>>,
    failing: HashSet<PathBuf>,
    link_exit: i32,
    pub compiled: RefCell<Vec<PathBuf>>,
    pub links: RefCell<Vec<Vec<PathBuf>>>,
}

impl FakeToolchain {
    pub fn new() -> Self {
        Self::default()
    }

    /// Lists `headers` in the manifest written for `source`.
    pub fn with_headers(mut self, source: &Path, headers: &[PathBuf]) -> Self {
        self.headers.insert(source.to_path_buf(), headers.to_vec());
        self
    }

    /// Makes compiling `source` exit with status 1 and write nothing.
    pub fn failing_on(mut self, source: &Path) -> Self {
        self.failing.insert(source.to_path_buf());
        self
    }

    pub fn link_exit(mut self, code: i32) -> Self {
        self.link_exit = code;
        self
    }

    pub fn compile_count(&self) -> usize {
        self.compiled.borrow().len()
    }
}

impl Toolchain for FakeToolchain {
    fn compile(&self, req: &CompileRequest<'_>) -> Result<i32, BuildError> {
        self.compiled.borrow_mut().push(req.source.to_path_buf());
        if self.failing.contains(req.source) {
            return Ok(1);
        }

        let mut deps = vec![req.source.to_path_buf()];
        deps.extend(self.headers.get(req.source).cloned().unwrap_or_default());
        let rule = deps
            .iter()
            .map(|d| d.display().to_string())
            .collect::<Vec<_>>()
            .join(" \\\n  ");
        std::fs::write(req.manifest, format!("{}: {rule}\n", req.object.display())).unwrap();
        std::fs::write(req.object, b"\x7fELF").unwrap();

        let newest = deps.iter().map(|d| mtime(d)).max().unwrap();
        set_mtime(req.object, newest + Duration::from_secs(1));
        set_mtime(req.manifest, newest + Duration::from_secs(1));
        Ok(0)
    }

    fn link(&self, req: &LinkRequest<'_>) -> Result<i32, BuildError> {
        self.links.borrow_mut().push(req.objects.to_vec());
        if self.link_exit == 0 {
            std::fs::write(req.binary, b"\x7fELF").unwrap();
        }
        Ok(self.link_exit)
    }
}

/// Writes `body` to `path` (creating parents) and dates it an hour back.
pub fn write_old(path: &Path, body: &str) {
    std::fs::create_dir_all(path.parent().unwrap()).unwrap();
    std::fs::write(path, body).unwrap();
    set_mtime(path, SystemTime::now() - Duration::from_secs(3600));
}

/// Sets the modification time to now.
pub fn touch(path: &Path) {
    set_mtime(path, SystemTime::now());
}

pub fn set_mtime(path: &Path, time: SystemTime) {
    std::fs::File::options()
        .write(true)
        .open(path)
        .unwrap()
        .set_modified(time)
        .unwrap();
}

pub fn mtime(path: &Path) -> SystemTime {
    std::fs::metadata(path).unwrap().modified().unwrap()
}

thread_local! {
    static CAPTURED: RefCell<Vec<String>> = const { RefCell::new(Vec::new()) };
}

/// Records log messages per thread, so concurrently running tests only see
/// their own output.
struct CaptureLogger;

impl log::Log for CaptureLogger {
    fn enabled(&self, _: &log::Metadata<'_>) -> bool {
        true
    }

    fn log(&self, record: &log::Record<'_>) {
        let line = format!("{}: {}", record.level(), record.args());
        CAPTURED.with(|c| c.borrow_mut().push(line));
    }

    fn flush(&self) {}
}

static LOGGER: CaptureLogger = CaptureLogger;

/// Starts capturing log output on the current thread, discarding anything
/// captured earlier.
pub fn capture_logs() {
    // Another test may have installed it already.
    let _ = log::set_logger(&LOGGER);
    log::set_max_level(log::LevelFilter::Debug);
    CAPTURED.with(|c| c.borrow_mut().clear());
}

/// Messages logged on the current thread since [`capture_logs`].
pub fn captured_logs() -> Vec<String> {
    CAPTURED.with(|c| c.borrow().clone())
}
