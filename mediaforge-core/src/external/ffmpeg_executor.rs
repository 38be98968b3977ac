//! FFmpeg process management and abstraction
//!
//! This module provides the trait seam used to spawn ffmpeg with a built
//! argument list, the ffmpeg-sidecar implementation behind it, and
//! [`run_ffmpeg`], which drives a process to completion while collecting its
//! diagnostic output and forwarding progress.

use std::io;
use std::path::PathBuf;
use std::process::ExitStatus;

use ffmpeg_sidecar::child::FfmpegChild as SidecarChild;
use ffmpeg_sidecar::command::FfmpegCommand;
use ffmpeg_sidecar::event::{FfmpegEvent, FfmpegProgress, LogLevel};

use crate::error::{CoreError, CoreResult, command_start_error, command_wait_error};
use crate::utils::parse_ffmpeg_time;

/// Trait representing an active ffmpeg process instance.
pub trait FfmpegProcess {
    /// Processes events from the running command using a provided handler closure.
    fn handle_events<F>(&mut self, handler: F) -> CoreResult<()>
    where
        F: FnMut(FfmpegEvent) -> CoreResult<()>;

    /// Waits for the command to complete and returns its exit status.
    fn wait(&mut self) -> CoreResult<ExitStatus>;
}

/// Trait representing something that can spawn an [`FfmpegProcess`].
pub trait FfmpegSpawner {
    type Process: FfmpegProcess;

    /// Spawns ffmpeg with exactly these arguments.
    fn spawn(&self, args: &[String]) -> CoreResult<Self::Process>;
}

/// Wrapper around `ffmpeg_sidecar::child::FfmpegChild` implementing `FfmpegProcess`.
pub struct SidecarProcess(SidecarChild);

impl FfmpegProcess for SidecarProcess {
    fn handle_events<F>(&mut self, mut handler: F) -> CoreResult<()>
    where
        F: FnMut(FfmpegEvent) -> CoreResult<()>,
    {
        let iterator = self.0.iter().map_err(|e| {
            log::error!("Failed to get ffmpeg event iterator: {e}");
            command_wait_error("ffmpeg", io::Error::other(e.to_string()))
        })?;
        for event in iterator {
            handler(event)?;
        }
        Ok(())
    }

    fn wait(&mut self) -> CoreResult<ExitStatus> {
        self.0.wait().map_err(|e| command_wait_error("ffmpeg", e))
    }
}

/// Spawns the configured ffmpeg binary through `ffmpeg-sidecar`.
#[derive(Debug, Clone)]
pub struct SidecarSpawner {
    ffmpeg_path: PathBuf,
}

impl SidecarSpawner {
    #[must_use]
    pub fn new(ffmpeg_path: impl Into<PathBuf>) -> Self {
        Self { ffmpeg_path: ffmpeg_path.into() }
    }
}

impl Default for SidecarSpawner {
    fn default() -> Self {
        Self::new("ffmpeg")
    }
}

impl FfmpegSpawner for SidecarSpawner {
    type Process = SidecarProcess;

    fn spawn(&self, args: &[String]) -> CoreResult<Self::Process> {
        let mut cmd = FfmpegCommand::new_with_path(&self.ffmpeg_path);
        cmd.args(args);
        log::debug!("Spawning {} {}", self.ffmpeg_path.display(), args.join(" "));
        cmd.spawn()
            .map(SidecarProcess)
            .map_err(|e| command_start_error(self.ffmpeg_path.display().to_string(), e))
    }
}

// ============================================================================
// RUNNING A PROCESS
// ============================================================================

/// Progress snapshot forwarded while ffmpeg runs.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ProgressUpdate {
    /// Media time processed so far, in seconds
    pub processed_secs: f64,
    /// 0..=100, only when the total duration is known
    pub percent: Option<f64>,
    /// Encoding speed relative to real time
    pub speed: f32,
}

impl ProgressUpdate {
    fn from_event(progress: &FfmpegProgress, total_duration: Option<f64>) -> Self {
        let processed_secs = parse_ffmpeg_time(&progress.time)
            .or_else(|| progress.time.parse::<f64>().ok())
            .unwrap_or(0.0)
            .max(0.0);
        let percent = total_duration
            .filter(|d| *d > 0.0)
            .map(|d| (processed_secs / d * 100.0).min(100.0));
        Self { processed_secs, percent, speed: progress.speed }
    }
}

/// Exit status and diagnostic text of a finished ffmpeg process.
#[derive(Debug, Clone)]
pub struct ProcessOutput {
    pub status: ExitStatus,
    /// Warning and error lines, in the order ffmpeg printed them
    pub stderr: String,
}

impl ProcessOutput {
    #[must_use]
    pub fn success(&self) -> bool {
        self.status.success()
    }

    /// `None` when the process was terminated by a signal.
    #[must_use]
    pub fn exit_code(&self) -> Option<i32> {
        self.status.code()
    }
}

/// Runs ffmpeg to completion.
///
/// Log and error events are collected into [`ProcessOutput::stderr`]; progress
/// events are turned into [`ProgressUpdate`]s for `on_progress`. A non-zero
/// exit is not an error at this level; callers classify it.
pub fn run_ffmpeg<S, F>(
    spawner: &S,
    args: &[String],
    total_duration: Option<f64>,
    mut on_progress: F,
) -> CoreResult<ProcessOutput>
where
    S: FfmpegSpawner,
    F: FnMut(ProgressUpdate),
{
    let mut process = spawner.spawn(args)?;
    let mut stderr = String::new();

    process.handle_events(|event| {
        match event {
            FfmpegEvent::Progress(progress) => {
                on_progress(ProgressUpdate::from_event(&progress, total_duration));
            }
            FfmpegEvent::Log(level, message) => {
                match level {
                    LogLevel::Warning | LogLevel::Error | LogLevel::Fatal => {
                        stderr.push_str(&message);
                        stderr.push('\n');
                    }
                    _ => {}
                }
                log::trace!(target: "ffmpeg_log", "{message}");
            }
            FfmpegEvent::Error(error) => {
                stderr.push_str(&error);
                stderr.push('\n');
            }
            _ => {}
        }
        Ok(())
    })?;

    let status = process.wait()?;
    if status.success() {
        log::debug!("ffmpeg finished successfully");
    } else {
        log::debug!("ffmpeg exited with {status}");
    }
    Ok(ProcessOutput { status, stderr })
}

/// Maps a failed [`ProcessOutput`] onto the error taxonomy, given the
/// classifier's verdict on its diagnostic text.
pub(crate) fn failure_error(output: &ProcessOutput, message: String, suggestion: String) -> CoreError {
    match output.exit_code() {
        None => CoreError::Cancelled("ffmpeg".to_string()),
        exit_code => CoreError::ExternalToolFailure {
            tool: "ffmpeg".to_string(),
            exit_code,
            message,
            suggestion,
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::external::mocks::{MockFfmpegSpawner, exit_status};

    fn progress_at(time: &str, speed: f32) -> FfmpegEvent {
        FfmpegEvent::Progress(FfmpegProgress {
            frame: 0,
            fps: 0.0,
            q: 0.0,
            size_kb: 0,
            time: time.to_string(),
            bitrate_kbps: 0.0,
            speed,
            raw_log_message: String::new(),
        })
    }

    #[test]
    fn test_progress_updates_and_stderr_collection() {
        let spawner = MockFfmpegSpawner::new();
        spawner.push_outcome(
            vec![
                FfmpegEvent::Log(LogLevel::Info, "Stream mapping:".into()),
                progress_at("00:00:05.00", 2.0),
                FfmpegEvent::Log(LogLevel::Error, "Something broke".into()),
                progress_at("00:00:20.00", 1.5),
            ],
            exit_status(1),
        );

        let mut updates = Vec::new();
        let args = vec!["-i".to_string(), "in.mp4".to_string(), "out.mp4".to_string()];
        let output = run_ffmpeg(&spawner, &args, Some(10.0), |u| updates.push(u)).unwrap();

        assert!(!output.success());
        assert_eq!(output.exit_code(), Some(1));
        assert_eq!(output.stderr, "Something broke\n");
        assert_eq!(updates.len(), 2);
        assert_eq!(updates[0].processed_secs, 5.0);
        assert_eq!(updates[0].percent, Some(50.0));
        assert_eq!(updates[1].percent, Some(100.0));
        assert_eq!(spawner.received_calls(), vec![args]);
    }

    #[test]
    fn test_progress_without_duration_has_no_percent() {
        let spawner = MockFfmpegSpawner::new();
        spawner.push_outcome(vec![progress_at("00:00:01.00", 1.0)], exit_status(0));
        let mut updates = Vec::new();
        let output = run_ffmpeg(&spawner, &[], None, |u| updates.push(u)).unwrap();
        assert!(output.success());
        assert_eq!(updates[0].percent, None);
    }

    #[cfg(unix)]
    #[test]
    fn test_signal_maps_to_cancelled() {
        use crate::external::mocks::signal_status;
        let output = ProcessOutput { status: signal_status(9), stderr: String::new() };
        assert!(matches!(
            failure_error(&output, "m".into(), "s".into()),
            CoreError::Cancelled(_)
        ));

        let output = ProcessOutput { status: exit_status(1), stderr: String::new() };
        assert!(matches!(
            failure_error(&output, "m".into(), "s".into()),
            CoreError::ExternalToolFailure { exit_code: Some(1), .. }
        ));
    }
}
