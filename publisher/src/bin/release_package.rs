//! Artefact packaging binary.
//!
//! Runs the build, staging, archiving, and packaging stages for one platform
//! and collects the artefacts in the distribution directory. Nothing is
//! uploaded and no credential is needed. Run from the project root.

use clap::Parser;
use log::info;
use release_publisher::cli::PackageCli;
use release_publisher::command::SystemCommandRunner;
use release_publisher::config::PublishConfig;
use release_publisher::error::Result;
use release_publisher::output::{current_dir_utf8, exit_code_for_run_result, init_logging};
use release_publisher::pipeline::{PipelineContext, assemble};
use release_publisher::platform::Platform;
use release_publisher::tag::Version;

fn main() {
    init_logging();
    let cli = PackageCli::parse();
    let mut stderr = std::io::stderr();
    let exit_code = exit_code_for_run_result(run(&cli), &mut stderr);
    if exit_code != 0 {
        std::process::exit(exit_code);
    }
}

/// Validate the inputs, then assemble the artefacts into `dist/`.
fn run(cli: &PackageCli) -> Result<()> {
    let version = Version::try_from(cli.version.as_str())?;
    let platform = Platform::try_from(cli.platform.as_str())?;

    let root = current_dir_utf8()?;
    let config = PublishConfig::load(&root)?;
    let runner = SystemCommandRunner::new(root);
    let context = PipelineContext {
        config: &config,
        runner: &runner,
    };

    let artefacts = assemble(&context, &version, &platform)?;
    let dist = config.dist_path()?;
    for artefact in &artefacts {
        info!("Created {}", dist.join(artefact.name()));
    }
    Ok(())
}
