//! Mock process implementations for tests.
//!
//! `MockFfmpegSpawner` records every argument list it receives and replays
//! scripted outcomes in order; when the script runs out it succeeds with no
//! events. `MockFfprobe` answers per path. Both share state through `Rc` so a
//! test can keep a handle after moving a clone into the engine.

use std::cell::RefCell;
use std::collections::HashMap;
use std::io;
use std::path::{Path, PathBuf};
use std::process::ExitStatus;
use std::rc::Rc;

use ffmpeg_sidecar::event::FfmpegEvent;

use super::ffmpeg_executor::{FfmpegProcess, FfmpegSpawner};
use super::ffprobe_executor::FfprobeExecutor;
use crate::error::{CoreResult, command_start_error};
use crate::media::MediaInfo;

/// Exit status carrying `code`.
#[cfg(unix)]
#[must_use]
pub fn exit_status(code: i32) -> ExitStatus {
    use std::os::unix::process::ExitStatusExt;
    ExitStatus::from_raw(code << 8)
}

/// Exit status carrying `code`.
#[cfg(windows)]
#[must_use]
pub fn exit_status(code: i32) -> ExitStatus {
    use std::os::windows::process::ExitStatusExt;
    ExitStatus::from_raw(code as u32)
}

/// Exit status of a process killed by `signal`.
#[cfg(unix)]
#[must_use]
pub fn signal_status(signal: i32) -> ExitStatus {
    use std::os::unix::process::ExitStatusExt;
    ExitStatus::from_raw(signal)
}

/// Mock implementation of FfmpegProcess.
pub struct MockFfmpegProcess {
    events: Vec<FfmpegEvent>,
    exit_status: ExitStatus,
}

impl FfmpegProcess for MockFfmpegProcess {
    fn handle_events<F>(&mut self, mut handler: F) -> CoreResult<()>
    where
        F: FnMut(FfmpegEvent) -> CoreResult<()>,
    {
        for event in std::mem::take(&mut self.events) {
            handler(event)?;
        }
        Ok(())
    }

    fn wait(&mut self) -> CoreResult<ExitStatus> {
        Ok(self.exit_status)
    }
}

enum ScriptedOutcome {
    Run { events: Vec<FfmpegEvent>, exit_status: ExitStatus },
    SpawnError(io::ErrorKind),
}

/// Mock implementation of FfmpegSpawner.
#[derive(Clone, Default)]
pub struct MockFfmpegSpawner {
    script: Rc<RefCell<Vec<ScriptedOutcome>>>,
    received_calls: Rc<RefCell<Vec<Vec<String>>>>,
    create_outputs: Rc<RefCell<bool>>,
}

impl MockFfmpegSpawner {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Queues the result of the next spawn.
    pub fn push_outcome(&self, events: Vec<FfmpegEvent>, exit_status: ExitStatus) {
        self.script
            .borrow_mut()
            .push(ScriptedOutcome::Run { events, exit_status });
    }

    /// Queues a failing run whose stderr contains `message`.
    pub fn push_failure(&self, code: i32, message: &str) {
        self.push_outcome(vec![FfmpegEvent::Error(message.to_string())], exit_status(code));
    }

    /// Queues a spawn failure (e.g. `NotFound` for a missing binary).
    pub fn push_spawn_error(&self, kind: io::ErrorKind) {
        self.script.borrow_mut().push(ScriptedOutcome::SpawnError(kind));
    }

    /// Creates an empty file at the output path (last argument) of each
    /// successful run.
    pub fn create_outputs(&self, enabled: bool) {
        *self.create_outputs.borrow_mut() = enabled;
    }

    #[must_use]
    pub fn received_calls(&self) -> Vec<Vec<String>> {
        self.received_calls.borrow().clone()
    }

    #[must_use]
    pub fn spawn_count(&self) -> usize {
        self.received_calls.borrow().len()
    }
}

impl FfmpegSpawner for MockFfmpegSpawner {
    type Process = MockFfmpegProcess;

    fn spawn(&self, args: &[String]) -> CoreResult<Self::Process> {
        self.received_calls.borrow_mut().push(args.to_vec());

        let outcome = {
            let mut script = self.script.borrow_mut();
            if script.is_empty() {
                None
            } else {
                Some(script.remove(0))
            }
        };

        let (events, status) = match outcome {
            Some(ScriptedOutcome::SpawnError(kind)) => {
                log::info!("MockFfmpegSpawner simulating spawn error: {kind:?}");
                return Err(command_start_error("ffmpeg", io::Error::new(kind, "mock spawn failure")));
            }
            Some(ScriptedOutcome::Run { events, exit_status }) => (events, exit_status),
            None => (Vec::new(), exit_status(0)),
        };

        if status.success() && *self.create_outputs.borrow() {
            if let Some(output) = args.last() {
                if let Err(e) = std::fs::File::create(output) {
                    log::error!("MockFfmpegSpawner failed to create dummy output {output}: {e}");
                }
            }
        }

        Ok(MockFfmpegProcess { events, exit_status: status })
    }
}

/// Mock implementation of FfprobeExecutor.
#[derive(Clone, Default)]
pub struct MockFfprobe {
    results: Rc<RefCell<HashMap<PathBuf, Option<MediaInfo>>>>,
    calls: Rc<RefCell<usize>>,
}

impl MockFfprobe {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the probe answer for `path`; unknown paths probe as `None`.
    pub fn expect(&self, path: &Path, info: Option<MediaInfo>) {
        self.results.borrow_mut().insert(path.to_path_buf(), info);
    }

    #[must_use]
    pub fn call_count(&self) -> usize {
        *self.calls.borrow()
    }
}

impl FfprobeExecutor for MockFfprobe {
    fn probe(&self, input: &Path) -> CoreResult<Option<MediaInfo>> {
        *self.calls.borrow_mut() += 1;
        Ok(self.results.borrow().get(input).cloned().flatten())
    }
}
