//! Shared test doubles for the release publisher.
//!
//! Available to unit tests and, through the `test-support` feature, to the
//! behaviour suites under `tests/`.

use crate::command::{CommandRunner, command_line};
use crate::error::{PublishError, Result};
use crate::release::{Release, ReleaseApi, ReleaseApiError, UploadedAsset};
use std::cell::{Cell, RefCell};
use std::collections::VecDeque;
use std::process::{ExitStatus, Output};

/// Creates an `ExitStatus` from an exit code (Unix implementation).
#[cfg(unix)]
#[must_use]
pub fn exit_status(code: i32) -> ExitStatus {
    use std::os::unix::process::ExitStatusExt;

    ExitStatus::from_raw(code << 8)
}

/// Creates an `ExitStatus` from an exit code (Windows implementation).
#[cfg(windows)]
#[must_use]
pub fn exit_status(code: i32) -> ExitStatus {
    use std::os::windows::process::ExitStatusExt;

    ExitStatus::from_raw(code as u32)
}

/// Creates a successful command `Output` with empty stdout and stderr.
#[must_use]
pub fn success_output() -> Output {
    output_with_stdout("")
}

/// Creates a successful command `Output` whose stdout is `stdout`.
#[must_use]
pub fn output_with_stdout(stdout: &str) -> Output {
    Output {
        status: exit_status(0),
        stdout: stdout.as_bytes().to_vec(),
        stderr: Vec::new(),
    }
}

/// Creates a failed command `Output` with the given stderr message.
#[must_use]
pub fn failure_output(stderr: &str) -> Output {
    Output {
        status: exit_status(1),
        stdout: Vec::new(),
        stderr: stderr.as_bytes().to_vec(),
    }
}

/// An expected command invocation and the result it produces.
#[derive(Debug)]
pub struct ExpectedCall {
    /// The command to execute (e.g. `cargo`).
    pub cmd: &'static str,
    /// The arguments to pass to the command.
    pub args: Vec<&'static str>,
    /// The result to return when this command is invoked. Status-only
    /// invocations receive the output's exit status.
    pub result: Result<Output>,
}

impl ExpectedCall {
    /// Expect `cmd args..` and answer with a successful, silent output.
    #[must_use]
    pub fn succeeding(cmd: &'static str, args: &[&'static str]) -> Self {
        Self::with_output(cmd, args, success_output())
    }

    /// Expect `cmd args..` and answer with exit status `code` and no output.
    #[must_use]
    pub fn exiting(cmd: &'static str, args: &[&'static str], code: i32) -> Self {
        Self::with_output(
            cmd,
            args,
            Output {
                status: exit_status(code),
                stdout: Vec::new(),
                stderr: Vec::new(),
            },
        )
    }

    /// Expect `cmd args..` and answer with `output`.
    #[must_use]
    pub fn with_output(cmd: &'static str, args: &[&'static str], output: Output) -> Self {
        Self {
            cmd,
            args: args.to_vec(),
            result: Ok(output),
        }
    }
}

/// A [`CommandRunner`] that replays scripted results in order.
///
/// Every invocation is recorded as a display string. An invocation that does
/// not match the next expected call yields [`PublishError::StubMismatch`].
#[derive(Debug, Default)]
pub struct StubRunner {
    expected: RefCell<VecDeque<ExpectedCall>>,
    calls: RefCell<Vec<String>>,
}

impl StubRunner {
    /// Creates a new `StubRunner` with the given expected calls.
    #[must_use]
    pub fn new(expected: Vec<ExpectedCall>) -> Self {
        Self {
            expected: RefCell::new(expected.into()),
            calls: RefCell::new(Vec::new()),
        }
    }

    /// Appends another expected call.
    pub fn push(&self, call: ExpectedCall) {
        self.expected.borrow_mut().push_back(call);
    }

    /// Returns every invocation seen so far, rendered as command lines.
    #[must_use]
    pub fn calls(&self) -> Vec<String> {
        self.calls.borrow().clone()
    }

    /// Asserts that all expected command invocations have been consumed.
    ///
    /// # Panics
    ///
    /// Panics if there are remaining expected calls that were not invoked.
    pub fn assert_finished(&self) {
        let remaining: Vec<_> = self
            .expected
            .borrow()
            .iter()
            .map(|call| command_line(call.cmd, &call.args))
            .collect();
        assert!(
            remaining.is_empty(),
            "expected further command invocations: {remaining:?}"
        );
    }

    fn next(&self, cmd: &str, args: &[&str]) -> Result<Output> {
        let invoked = command_line(cmd, args);
        self.calls.borrow_mut().push(invoked.clone());

        let call = self
            .expected
            .borrow_mut()
            .pop_front()
            .ok_or_else(|| PublishError::StubMismatch {
                message: format!("unexpected invocation `{invoked}`"),
            })?;
        if call.cmd != cmd || call.args.as_slice() != args {
            return Err(PublishError::StubMismatch {
                message: format!(
                    "expected `{}`, got `{invoked}`",
                    command_line(call.cmd, &call.args)
                ),
            });
        }
        call.result
    }
}

impl CommandRunner for StubRunner {
    fn status(&self, cmd: &str, args: &[&str]) -> Result<ExitStatus> {
        self.next(cmd, args).map(|output| output.status)
    }

    fn output(&self, cmd: &str, args: &[&str]) -> Result<Output> {
        self.next(cmd, args)
    }
}

/// An upload received by [`InMemoryReleases`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordedUpload {
    /// Identifier of the release the asset was attached to.
    pub release_id: u64,
    /// Asset name.
    pub name: String,
    /// Declared content type.
    pub content_type: String,
    /// Uploaded bytes.
    pub bytes: Vec<u8>,
}

/// A [`ReleaseApi`] that keeps releases and assets in memory.
///
/// Creating a release for a tag that already has one fails with
/// [`ReleaseApiError::AlreadyExists`], as the real service does.
#[derive(Debug, Default)]
pub struct InMemoryReleases {
    releases: RefCell<Vec<Release>>,
    uploads: RefCell<Vec<RecordedUpload>>,
    create_attempts: Cell<usize>,
    failing_upload: Option<String>,
}

impl InMemoryReleases {
    /// Create an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a release for `tag` as if an earlier run had created it.
    #[must_use]
    pub fn with_existing_release(self, tag: &str) -> Self {
        self.insert(tag);
        self
    }

    /// Make every upload named `name` fail with HTTP 500.
    #[must_use]
    pub fn failing_upload_for(mut self, name: &str) -> Self {
        self.failing_upload = Some(name.to_owned());
        self
    }

    /// Return the stored releases.
    #[must_use]
    pub fn releases(&self) -> Vec<Release> {
        self.releases.borrow().clone()
    }

    /// Return every accepted upload, in arrival order.
    #[must_use]
    pub fn uploads(&self) -> Vec<RecordedUpload> {
        self.uploads.borrow().clone()
    }

    /// Return how many times creation was requested.
    #[must_use]
    pub fn create_attempts(&self) -> usize {
        self.create_attempts.get()
    }

    fn insert(&self, tag: &str) -> Release {
        let mut releases = self.releases.borrow_mut();
        let id = releases.len() as u64 + 1;
        let release = Release {
            id,
            tag_name: tag.to_owned(),
            name: Some(tag.to_owned()),
            upload_url: format!("memory://releases/{id}/assets{{?name,label}}"),
            html_url: None,
        };
        releases.push(release.clone());
        release
    }
}

impl ReleaseApi for InMemoryReleases {
    fn create_release(
        &self,
        tag: &str,
        _name: &str,
    ) -> std::result::Result<Release, ReleaseApiError> {
        self.create_attempts.set(self.create_attempts.get() + 1);
        if self.releases.borrow().iter().any(|r| r.tag_name == tag) {
            return Err(ReleaseApiError::AlreadyExists {
                tag: tag.to_owned(),
            });
        }
        Ok(self.insert(tag))
    }

    fn release_by_tag(
        &self,
        tag: &str,
    ) -> std::result::Result<Option<Release>, ReleaseApiError> {
        Ok(self
            .releases
            .borrow()
            .iter()
            .find(|r| r.tag_name == tag)
            .cloned())
    }

    fn upload_asset(
        &self,
        release: &Release,
        content_type: &str,
        name: &str,
        bytes: &[u8],
    ) -> std::result::Result<UploadedAsset, ReleaseApiError> {
        let url = release.upload_endpoint()?.to_owned();
        if self.failing_upload.as_deref() == Some(name) {
            return Err(ReleaseApiError::Status {
                method: "POST",
                url,
                status: 500,
            });
        }

        let mut uploads = self.uploads.borrow_mut();
        uploads.push(RecordedUpload {
            release_id: release.id,
            name: name.to_owned(),
            content_type: content_type.to_owned(),
            bytes: bytes.to_vec(),
        });
        Ok(UploadedAsset {
            id: uploads.len() as u64,
            name: name.to_owned(),
            content_type: content_type.to_owned(),
            size: bytes.len() as u64,
            browser_download_url: Some(format!("{url}/{name}")),
        })
    }
}
