//! Release publisher CLI entrypoint.
//!
//! Publishes the release artefacts for one platform to the GitHub release
//! named by `--tag`. Run from the project root.

use clap::Parser;
use log::info;
use release_publisher::cli::Cli;
use release_publisher::command::SystemCommandRunner;
use release_publisher::config::{Credentials, PublishConfig};
use release_publisher::error::Result;
use release_publisher::output::{
    current_dir_utf8, exit_code_for_run_result, init_logging, outcome_summary,
};
use release_publisher::pipeline::{Outcome, PipelineContext, PublishRequest, publish_release};
use release_publisher::release::GitHubReleases;

fn main() {
    init_logging();
    let cli = Cli::parse();
    let mut stderr = std::io::stderr();
    let exit_code = exit_code_for_run_result(run(&cli), &mut stderr);
    if exit_code != 0 {
        std::process::exit(exit_code);
    }
}

fn run(cli: &Cli) -> Result<Outcome> {
    let root = current_dir_utf8()?;
    let config = PublishConfig::load(&root)?;
    let runner = SystemCommandRunner::new(root);
    let context = PipelineContext {
        config: &config,
        runner: &runner,
    };
    let request = PublishRequest {
        tag: &cli.tag,
        platform: &cli.platform,
    };

    let outcome = publish_release(&context, request, || {
        let credentials = Credentials::from_env(&config.token_env)?;
        Ok(GitHubReleases::new(&config, credentials)?)
    })?;
    info!("{}", outcome_summary(&outcome));
    Ok(outcome)
}
