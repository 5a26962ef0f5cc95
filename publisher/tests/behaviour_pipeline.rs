//! BDD tests for the publish pipeline.
//!
//! Commands are scripted with `StubRunner` and the release store is the
//! in-memory fake; staging, archiving, and the distribution directory run
//! for real inside a temporary project.

mod support;

use camino::Utf8PathBuf;
use release_publisher::config::PublishConfig;
use release_publisher::error::PublishError;
use release_publisher::pipeline::{Outcome, PipelineContext, PublishRequest, publish_release};
use release_publisher::test_utils::{
    ExpectedCall, InMemoryReleases, RecordedUpload, StubRunner, failure_output,
    output_with_stdout,
};
use rstest::fixture;
use rstest_bdd_macros::{given, scenario, then, when};
use support::{PACKAGE_PATH, utf8_temp_dir, write_built_project};
use tempfile::TempDir;

#[derive(Default)]
struct PipelineWorld {
    _temp_dir: Option<TempDir>,
    root: Option<Utf8PathBuf>,
    tool: String,
    tag: String,
    platform: String,
    existing_release: bool,
    failing_upload: Option<String>,
    build_fails: bool,
    token_missing: bool,
    result: Option<Result<Outcome, PublishError>>,
    calls: Vec<String>,
    uploads: Vec<RecordedUpload>,
    release_count: usize,
}

impl PipelineWorld {
    fn root(&self) -> &Utf8PathBuf {
        self.root.as_ref().expect("project root set")
    }

    fn scripted_calls(&self) -> Vec<ExpectedCall> {
        if self.build_fails {
            return vec![ExpectedCall {
                cmd: "cargo",
                args: vec!["build", "--release"],
                result: Ok(failure_output("could not compile")),
            }];
        }
        let mut calls = vec![ExpectedCall::succeeding("cargo", &["build", "--release"])];
        if self.platform.contains("linux") {
            calls.push(ExpectedCall::succeeding("cargo", &["deb", "--version"]));
            calls.push(ExpectedCall::with_output(
                "cargo",
                &["deb"],
                output_with_stdout(PACKAGE_PATH),
            ));
        }
        calls
    }

    fn releases(&self) -> InMemoryReleases {
        let mut releases = InMemoryReleases::new();
        if self.existing_release {
            releases = releases.with_existing_release(&self.tag);
        }
        if let Some(name) = &self.failing_upload {
            releases = releases.failing_upload_for(name);
        }
        releases
    }
}

#[fixture]
fn world() -> PipelineWorld {
    PipelineWorld::default()
}

#[given("a built project for \"{tool}\"")]
fn given_built_project(world: &mut PipelineWorld, tool: String) {
    let (dir, root) = utf8_temp_dir();
    write_built_project(&root, &tool);
    world._temp_dir = Some(dir);
    world.root = Some(root);
    world.tool = tool;
}

#[given("the release tag \"{tag}\"")]
fn given_release_tag(world: &mut PipelineWorld, tag: String) {
    world.tag = tag;
}

#[given("the platform \"{platform}\"")]
fn given_platform(world: &mut PipelineWorld, platform: String) {
    world.platform = platform;
}

#[given("a release already exists for the tag")]
fn given_existing_release(world: &mut PipelineWorld) {
    world.existing_release = true;
}

#[given("uploads of \"{name}\" fail")]
fn given_failing_upload(world: &mut PipelineWorld, name: String) {
    world.failing_upload = Some(name);
}

#[given("no API token is available")]
fn given_no_token(world: &mut PipelineWorld) {
    world.token_missing = true;
}

#[given("the release build fails")]
fn given_build_fails(world: &mut PipelineWorld) {
    world.build_fails = true;
}

#[when("the release is published")]
fn when_published(world: &mut PipelineWorld) {
    let config = PublishConfig::new(world.root().clone(), world.tool.clone());
    let runner = StubRunner::new(world.scripted_calls());
    let releases = world.releases();
    let context = PipelineContext {
        config: &config,
        runner: &runner,
    };
    let request = PublishRequest {
        tag: &world.tag,
        platform: &world.platform,
    };

    let token_missing = world.token_missing;
    let result = publish_release(&context, request, || {
        if token_missing {
            Err(PublishError::MissingCredential {
                variable: config.token_env.clone(),
            })
        } else {
            Ok(&releases)
        }
    });

    world.calls = runner.calls();
    world.uploads = releases.uploads();
    world.release_count = releases.releases().len();
    world.result = Some(result);
}

#[then("the run succeeds")]
fn then_run_succeeds(world: &mut PipelineWorld) {
    let result = world.result.as_ref().expect("result set");
    assert!(
        matches!(result, Ok(Outcome::Published { .. })),
        "expected a published outcome, got {result:?}"
    );
}

#[then("the run is skipped")]
fn then_run_skipped(world: &mut PipelineWorld) {
    let result = world.result.as_ref().expect("result set");
    assert!(
        matches!(result, Ok(Outcome::Skipped { tag }) if *tag == world.tag),
        "expected a skipped outcome, got {result:?}"
    );
}

#[then("the run fails mentioning \"{text}\"")]
fn then_run_fails(world: &mut PipelineWorld, text: String) {
    match world.result.as_ref().expect("result set") {
        Err(err) => {
            let message = err.to_string();
            assert!(
                message.contains(&text),
                "expected error mentioning '{text}', got: {message}"
            );
        }
        Ok(outcome) => panic!("expected failure, got {outcome:?}"),
    }
}

#[then("the staging directory \"{dir}\" contains \"{file}\"")]
fn then_staging_contains(world: &mut PipelineWorld, dir: String, file: String) {
    let path = world.root().join(&dir).join(&file);
    assert!(path.is_file(), "{path} should be staged");
    for document in ["README.md", "CHANGELOG.md", "LICENSE"] {
        assert!(world.root().join(&dir).join(document).is_file());
    }
}

#[then("{count} assets are uploaded")]
fn then_asset_count(world: &mut PipelineWorld, count: usize) {
    assert_eq!(
        world.uploads.len(),
        count,
        "uploaded: {:?}",
        world.uploads.iter().map(|u| &u.name).collect::<Vec<_>>()
    );
}

#[then("the asset \"{name}\" is uploaded as \"{content_type}\"")]
fn then_asset_uploaded(world: &mut PipelineWorld, name: String, content_type: String) {
    let upload = world
        .uploads
        .iter()
        .find(|u| u.name == name)
        .unwrap_or_else(|| panic!("{name} was not uploaded"));
    assert_eq!(upload.content_type, content_type);
    assert!(!upload.bytes.is_empty());
    assert!(
        world.root().join("dist").join(&name).is_file(),
        "{name} should be collected in dist/"
    );
}

#[then("the packaging tool was invoked")]
fn then_packaging_invoked(world: &mut PipelineWorld) {
    assert!(world.calls.iter().any(|c| c == "cargo deb"), "calls: {:?}", world.calls);
}

#[then("the packaging tool was not invoked")]
fn then_packaging_not_invoked(world: &mut PipelineWorld) {
    assert!(!world.calls.iter().any(|c| c.starts_with("cargo deb")));
}

#[then("no commands were run")]
fn then_no_commands(world: &mut PipelineWorld) {
    assert!(world.calls.is_empty(), "calls: {:?}", world.calls);
}

#[then("exactly one release exists")]
fn then_one_release(world: &mut PipelineWorld) {
    assert_eq!(world.release_count, 1);
}

#[scenario(
    path = "tests/features/pipeline.feature",
    name = "Publishing a Linux release"
)]
fn scenario_linux_release(world: PipelineWorld) {
    let _ = world;
}

#[scenario(
    path = "tests/features/pipeline.feature",
    name = "Publishing a Windows release"
)]
fn scenario_windows_release(world: PipelineWorld) {
    let _ = world;
}

#[scenario(
    path = "tests/features/pipeline.feature",
    name = "Ignoring a tag that is not a release"
)]
fn scenario_non_release_tag(world: PipelineWorld) {
    let _ = world;
}

#[scenario(
    path = "tests/features/pipeline.feature",
    name = "Re-running against an existing release"
)]
fn scenario_existing_release(world: PipelineWorld) {
    let _ = world;
}

#[scenario(
    path = "tests/features/pipeline.feature",
    name = "A failed upload aborts the run"
)]
fn scenario_failed_upload(world: PipelineWorld) {
    let _ = world;
}

#[scenario(
    path = "tests/features/pipeline.feature",
    name = "Publishing without a token"
)]
fn scenario_missing_token(world: PipelineWorld) {
    let _ = world;
}

#[scenario(
    path = "tests/features/pipeline.feature",
    name = "A failed build aborts the run"
)]
fn scenario_failed_build(world: PipelineWorld) {
    let _ = world;
}
