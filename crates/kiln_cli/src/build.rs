//! `kiln build`: compile stale sources and relink.
//!
//! 1. Find project root (walk up looking for `kiln.toml`)
//! 2. Load config, or default it from the directory name
//! 3. Resolve build roots against the project root
//! 4. Run the build driver with the system toolchain
//! 5. Report what was compiled

use kiln_build::{BuildError, BuildReport, Builder, CommandToolchain};
use kiln_config::StalenessMode;

use crate::project::{load_project, resolve_project_root};
use crate::{BuildArgs, GlobalArgs};

/// Runs the `kiln build` command.
///
/// Returns exit code 0 when the executable was linked, 1 when any source
/// failed to compile or the linker failed.
pub fn run(args: &BuildArgs, global: &GlobalArgs) -> Result<i32, Box<dyn std::error::Error>> {
    let project_dir = resolve_project_root(global)?;
    let config = load_project(&project_dir, global)?;
    let resolved = config.resolve(&project_dir);
    let staleness: StalenessMode = args.staleness.map(Into::into).unwrap_or(resolved.staleness);

    if !global.quiet {
        eprintln!(
            "   Building {} ({})",
            config.project.name,
            project_dir.display()
        );
    }

    let toolchain = CommandToolchain::new(resolved.toolchain.clone(), &project_dir);
    let result = Builder::new(&resolved.layout, &toolchain, &project_dir)
        .staleness(staleness)
        .build();

    match result {
        Ok(report) => {
            if !global.quiet {
                eprintln!("   {}", summary(&report));
            }
            Ok(0)
        }
        Err(e @ (BuildError::CompileFailed { .. } | BuildError::LinkFailed { .. })) => {
            eprintln!("error: {e}");
            Ok(1)
        }
        Err(e) => Err(e.into()),
    }
}

/// One-line summary of a successful build.
fn summary(report: &BuildReport) -> String {
    format!(
        "Finished {} ({} compiled, {} up to date, {} object(s) linked)",
        report.binary.display(),
        report.compiled.len(),
        report.up_to_date.len(),
        report.objects.len()
    )
}
