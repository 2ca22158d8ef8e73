//! The compiler/linker boundary.
//!
//! The builder never spawns processes directly; it goes through
//! [`Toolchain`], so tests can substitute a fake that writes objects and
//! manifests itself.

use std::path::{Path, PathBuf};
use std::process::Command;

use kiln_config::ToolchainConfig;

use crate::error::BuildError;

/// One compile step: produce `object` and `manifest` from `source`.
#[derive(Debug, Clone, Copy)]
pub struct CompileRequest<'a> {
    /// Source file to compile.
    pub source: &'a Path,
    /// Object file to emit.
    pub object: &'a Path,
    /// Dependency manifest to emit alongside the object.
    pub manifest: &'a Path,
}

/// The final link step.
#[derive(Debug, Clone, Copy)]
pub struct LinkRequest<'a> {
    /// Objects to link, in order.
    pub objects: &'a [PathBuf],
    /// Executable to produce.
    pub binary: &'a Path,
}

/// Compile and link capabilities.
///
/// Both calls block until the tool exits and return its exit code, `0` on
/// success and `-1` if it was killed by a signal. An `Err` means the tool
/// could not be run at all.
pub trait Toolchain {
    /// Compiles one source, emitting its object and dependency manifest in a
    /// single invocation. The manifest lists user headers only.
    fn compile(&self, request: &CompileRequest<'_>) -> Result<i32, BuildError>;

    /// Links the given objects into an executable.
    fn link(&self, request: &LinkRequest<'_>) -> Result<i32, BuildError>;
}

/// Runs a GCC-compatible compiler driver as a subprocess.
///
/// Child processes inherit the environment and run in `work_dir`, which is
/// also where relative manifest entries are resolved.
pub struct CommandToolchain {
    config: ToolchainConfig,
    work_dir: PathBuf,
}

impl CommandToolchain {
    /// Creates a toolchain that runs `config.compiler` inside `work_dir`.
    pub fn new(config: ToolchainConfig, work_dir: &Path) -> Self {
        Self {
            config,
            work_dir: work_dir.to_path_buf(),
        }
    }

    /// `<cc> -MMD -MF <manifest> <compile flags> <include flags> -c -o <object> <source>`
    pub fn compile_command(&self, request: &CompileRequest<'_>) -> Command {
        let mut cmd = Command::new(&self.config.compiler);
        cmd.arg("-MMD")
            .arg("-MF")
            .arg(request.manifest)
            .args(&self.config.compile_flags)
            .args(&self.config.include_flags)
            .arg("-c")
            .arg("-o")
            .arg(request.object)
            .arg(request.source)
            .current_dir(&self.work_dir);
        cmd
    }

    /// `<cc> <objects> <link flags> -o <binary>`
    pub fn link_command(&self, request: &LinkRequest<'_>) -> Command {
        let mut cmd = Command::new(&self.config.compiler);
        cmd.args(request.objects)
            .args(&self.config.link_flags)
            .arg("-o")
            .arg(request.binary)
            .current_dir(&self.work_dir);
        cmd
    }

    fn run(&self, mut cmd: Command) -> Result<i32, BuildError> {
        log::info!("{}", render(&cmd));
        let status = cmd.status().map_err(|e| BuildError::Spawn {
            program: self.config.compiler.clone(),
            source: e,
        })?;
        Ok(status.code().unwrap_or(-1))
    }
}

impl Toolchain for CommandToolchain {
    fn compile(&self, request: &CompileRequest<'_>) -> Result<i32, BuildError> {
        self.run(self.compile_command(request))
    }

    fn link(&self, request: &LinkRequest<'_>) -> Result<i32, BuildError> {
        self.run(self.link_command(request))
    }
}

/// Formats a command the way it would be typed in a shell (without quoting).
pub fn render(cmd: &Command) -> String {
    std::iter::once(cmd.get_program())
        .chain(cmd.get_args())
        .map(|s| s.to_string_lossy())
        .collect::<Vec<_>>()
        .join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn toolchain(compiler: &str) -> CommandToolchain {
        let config = ToolchainConfig {
            compiler: compiler.to_string(),
            compile_flags: vec!["-std=c++14".into(), "-Wall".into()],
            include_flags: vec!["-I/usr/include/libnoise".into()],
            link_flags: vec!["-lSDL2".into(), "-lpthread".into()],
        };
        CommandToolchain::new(config, Path::new("."))
    }

    #[test]
    fn compile_line_requests_manifest_and_object() {
        let tc = toolchain("g++");
        let req = CompileRequest {
            source: Path::new("src/sub/a.cc"),
            object: Path::new("obj/sub/a.o"),
            manifest: Path::new(".d/sub/a.d"),
        };
        assert_eq!(
            render(&tc.compile_command(&req)),
            "g++ -MMD -MF .d/sub/a.d -std=c++14 -Wall -I/usr/include/libnoise -c -o obj/sub/a.o src/sub/a.cc"
        );
    }

    #[test]
    fn link_line_lists_objects_then_flags() {
        let tc = toolchain("g++");
        let objects = vec![PathBuf::from("obj/a.o"), PathBuf::from("obj/sub/a.o")];
        let req = LinkRequest {
            objects: &objects,
            binary: Path::new("./burrowbun"),
        };
        assert_eq!(
            render(&tc.link_command(&req)),
            "g++ obj/a.o obj/sub/a.o -lSDL2 -lpthread -o ./burrowbun"
        );
    }

    #[test]
    fn unknown_compiler_is_spawn_error() {
        let tc = toolchain("kiln-no-such-compiler");
        let objects = Vec::new();
        let err = tc
            .link(&LinkRequest {
                objects: &objects,
                binary: Path::new("out"),
            })
            .unwrap_err();
        assert!(matches!(err, BuildError::Spawn { program, .. } if program == "kiln-no-such-compiler"));
    }

    #[cfg(unix)]
    #[test]
    fn exit_codes_are_passed_through() {
        let objects = Vec::new();
        let req = LinkRequest {
            objects: &objects,
            binary: Path::new("out"),
        };
        assert_eq!(toolchain("true").link(&req).unwrap(), 0);
        assert_eq!(toolchain("false").link(&req).unwrap(), 1);
    }
}
