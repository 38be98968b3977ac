// ============================================================================
// mediaforge-core/src/engine.rs
// ============================================================================
//
// MEDIA ENGINE: Operation Orchestration
//
// The engine runs one media operation end to end:
// 1. Check that every input exists (no process is spawned otherwise)
// 2. Fill unset options from CoreConfig (quality tier, audio bitrate)
// 3. Probe the input when the builder or the progress display can use it
// 4. Build the ffmpeg argument list
// 5. Refuse to clobber an existing output unless overwrite was requested
// 6. Run ffmpeg, forwarding progress
// 7. Classify a failure into a (message, suggestion) pair
//
// The engine is generic over its process, probe and file-system seams so the
// whole flow can be driven by the mocks in `external::mocks`.

use std::path::{Path, PathBuf};
use std::time::Instant;

use log::{debug, error, info, warn};

use crate::builders::{
    BuildResult, CompressOptions, ConvertOptions, ExtractOptions, GifOptions, MergeOptions,
    ThumbnailOptions, TrimOptions, build_compress, build_convert, build_extract, build_gif,
    build_merge, build_thumbnail, build_trim,
};
use crate::classifier::classify;
use crate::config::CoreConfig;
use crate::error::{CoreError, CoreResult};
use crate::external::ffmpeg_executor::failure_error;
use crate::external::{
    CommandFfprobeExecutor, FfmpegSpawner, FfprobeExecutor, FileMetadataProvider, ProgressUpdate,
    SidecarSpawner, StdFsMetadataProvider, check_dependency, run_ffmpeg,
};
use crate::media::MediaInfo;
use crate::temp_files::ConcatList;
use crate::utils::format_duration;

// ============================================================================
// OPERATIONS
// ============================================================================

/// One media operation and its options.
#[derive(Debug, Clone)]
pub enum Operation {
    Convert(ConvertOptions),
    Compress(CompressOptions),
    Trim(TrimOptions),
    Extract(ExtractOptions),
    Merge(MergeOptions),
    Gif(GifOptions),
    Thumbnail(ThumbnailOptions),
}

impl Operation {
    /// Short lowercase name used in logs.
    #[must_use]
    pub fn name(&self) -> &'static str {
        match self {
            Self::Convert(_) => "convert",
            Self::Compress(_) => "compress",
            Self::Trim(_) => "trim",
            Self::Extract(_) => "extract",
            Self::Merge(_) => "merge",
            Self::Gif(_) => "gif",
            Self::Thumbnail(_) => "thumbnail",
        }
    }

    /// Every input file the operation reads.
    #[must_use]
    pub fn inputs(&self) -> Vec<&Path> {
        match self {
            Self::Convert(o) => vec![o.input.as_path()],
            Self::Compress(o) => vec![o.input.as_path()],
            Self::Trim(o) => vec![o.input.as_path()],
            Self::Extract(o) => vec![o.input.as_path()],
            Self::Merge(o) => o.inputs.iter().map(PathBuf::as_path).collect(),
            Self::Gif(o) => vec![o.input.as_path()],
            Self::Thumbnail(o) => vec![o.input.as_path()],
        }
    }

    #[must_use]
    pub fn overwrite(&self) -> bool {
        match self {
            Self::Convert(o) => o.overwrite,
            Self::Compress(o) => o.overwrite,
            Self::Trim(o) => o.overwrite,
            Self::Extract(o) => o.overwrite,
            Self::Merge(o) => o.overwrite,
            Self::Gif(o) => o.overwrite,
            Self::Thumbnail(o) => o.overwrite,
        }
    }

    /// Whether building cannot proceed without probe metadata.
    fn requires_probe(&self) -> bool {
        match self {
            Self::Compress(o) => o.target.needs_duration(),
            Self::Thumbnail(o) => o.mode.needs_duration(),
            _ => false,
        }
    }
}

/// Result of [`MediaEngine::run`], flattened for display.
#[derive(Debug, Clone, PartialEq)]
pub struct OperationOutcome {
    pub success: bool,
    pub output_path: Option<PathBuf>,
    /// `"<message>\n<suggestion>"` for external failures, the error text otherwise
    pub error: Option<String>,
}

impl OperationOutcome {
    fn from_result(result: CoreResult<PathBuf>) -> Self {
        match result {
            Ok(path) => Self { success: true, output_path: Some(path), error: None },
            Err(e) => {
                let text = match &e {
                    CoreError::ExternalToolFailure { message, suggestion, .. } => {
                        format!("{message}\n{suggestion}")
                    }
                    other => other.to_string(),
                };
                Self { success: false, output_path: None, error: Some(text) }
            }
        }
    }
}

// ============================================================================
// ENGINE
// ============================================================================

/// Runs media operations through ffmpeg.
///
/// Generic over the types that implement the required traits:
/// - `S`: FfmpegSpawner - For spawning ffmpeg processes
/// - `P`: FfprobeExecutor - For probing inputs
/// - `M`: FileMetadataProvider - For existence and size checks
pub struct MediaEngine<S, P, M> {
    config: CoreConfig,
    spawner: S,
    prober: P,
    metadata: M,
}

impl MediaEngine<SidecarSpawner, CommandFfprobeExecutor, StdFsMetadataProvider> {
    /// Engine using the real binaries named in `config`.
    #[must_use]
    pub fn new(config: CoreConfig) -> Self {
        let spawner = SidecarSpawner::new(&config.ffmpeg_path);
        let prober = CommandFfprobeExecutor::new(&config.ffprobe_path);
        Self::with_components(config, spawner, prober, StdFsMetadataProvider)
    }
}

impl<S, P, M> MediaEngine<S, P, M>
where
    S: FfmpegSpawner,
    P: FfprobeExecutor,
    M: FileMetadataProvider,
{
    pub fn with_components(config: CoreConfig, spawner: S, prober: P, metadata: M) -> Self {
        Self { config, spawner, prober, metadata }
    }

    #[must_use]
    pub fn config(&self) -> &CoreConfig {
        &self.config
    }

    /// Probes `input`, failing with `InputNotFound` when it does not exist.
    pub fn probe(&self, input: &Path) -> CoreResult<Option<MediaInfo>> {
        if !self.metadata.exists(input) {
            return Err(CoreError::InputNotFound(input.to_path_buf()));
        }
        let mut info = self.prober.probe(input)?;
        if let Some(info) = info.as_mut() {
            if info.size_bytes.is_none() {
                info.size_bytes = self.metadata.get_size(input).ok();
            }
        }
        Ok(info)
    }

    /// Version line of each configured binary, in ffmpeg, ffprobe order.
    pub fn check_dependencies(&self) -> Vec<(PathBuf, CoreResult<String>)> {
        [&self.config.ffmpeg_path, &self.config.ffprobe_path]
            .into_iter()
            .map(|path| (path.clone(), check_dependency(path)))
            .collect()
    }

    /// Runs `operation` and flattens the result into an [`OperationOutcome`].
    pub fn run(&self, operation: &Operation) -> OperationOutcome {
        OperationOutcome::from_result(self.execute(operation))
    }

    /// Runs `operation` and returns the output path (or sequence template).
    pub fn execute(&self, operation: &Operation) -> CoreResult<PathBuf> {
        self.execute_with_progress(operation, |_| {})
    }

    /// Like [`execute`](Self::execute), reporting ffmpeg progress to `on_progress`.
    pub fn execute_with_progress<F>(&self, operation: &Operation, on_progress: F) -> CoreResult<PathBuf>
    where
        F: FnMut(ProgressUpdate),
    {
        let started = Instant::now();
        info!("Starting {} of {}", operation.name(), describe_inputs(operation));

        for input in operation.inputs() {
            if !self.metadata.exists(input) {
                return Err(CoreError::InputNotFound(input.to_path_buf()));
            }
        }

        let operation = self.apply_defaults(operation);
        let info = self.probe_for(&operation)?;

        // Holds the merge concat list until ffmpeg has finished with it.
        let mut concat_list: Option<ConcatList> = None;
        let build = match &operation {
            Operation::Convert(o) => build_convert(o, info.as_ref())?,
            Operation::Compress(o) => build_compress(o, info.as_ref())?,
            Operation::Trim(o) => build_trim(o)?,
            Operation::Extract(o) => build_extract(o)?,
            Operation::Gif(o) => build_gif(o)?,
            Operation::Thumbnail(o) => build_thumbnail(o, info.as_ref())?,
            Operation::Merge(o) => {
                let merge = build_merge(o, &self.config.temp_dir())?;
                concat_list = merge.concat_list;
                merge.result
            }
        };

        if !operation.overwrite() && !build.is_template && self.metadata.exists(&build.output_path) {
            return Err(CoreError::OutputExists(build.output_path));
        }

        let total_duration = info.as_ref().and_then(MediaInfo::known_duration);
        let output = self.invoke(&operation, &build, total_duration, on_progress);

        if let Some(list) = concat_list {
            // Cleanup failures never mask the operation's own result.
            if let Err(e) = list.close() {
                warn!("{e}");
            }
        }

        let output = output?;
        info!(
            "Finished {} -> {} in {}",
            operation.name(),
            output.display(),
            format_duration(started.elapsed().as_secs_f64())
        );
        Ok(output)
    }

    fn invoke<F>(
        &self,
        operation: &Operation,
        build: &BuildResult,
        total_duration: Option<f64>,
        on_progress: F,
    ) -> CoreResult<PathBuf>
    where
        F: FnMut(ProgressUpdate),
    {
        let output = run_ffmpeg(&self.spawner, &build.args, total_duration, on_progress)?;
        if output.success() {
            return Ok(build.output_path.clone());
        }

        let diagnosis = classify(&output.stderr);
        error!(
            "{} failed (exit code {:?}): {}",
            operation.name(),
            output.exit_code(),
            diagnosis.message
        );
        debug!("ffmpeg stderr:\n{}", output.stderr.trim_end());
        Err(failure_error(&output, diagnosis.message, diagnosis.suggestion))
    }

    /// Copies unset options from the configuration.
    fn apply_defaults(&self, operation: &Operation) -> Operation {
        let mut operation = operation.clone();
        match &mut operation {
            Operation::Convert(o) if o.quality.is_none() => {
                o.quality = Some(self.config.default_quality.clone());
            }
            Operation::Compress(o) if o.audio_bitrate.is_none() => {
                o.audio_bitrate = Some(self.config.default_audio_bitrate);
            }
            _ => {}
        }
        operation
    }

    /// Probe snapshot for a single-input operation.
    ///
    /// Probe failures are fatal only when the builder needs the metadata;
    /// otherwise the operation proceeds without a progress percentage.
    fn probe_for(&self, operation: &Operation) -> CoreResult<Option<MediaInfo>> {
        let input = match operation {
            Operation::Merge(_) => return Ok(None),
            other => match other.inputs().first() {
                Some(input) => input.to_path_buf(),
                None => return Ok(None),
            },
        };

        match self.prober.probe(&input) {
            Ok(Some(mut info)) => {
                if info.size_bytes.is_none() {
                    info.size_bytes = self.metadata.get_size(&input).ok();
                }
                Ok(Some(info))
            }
            Ok(None) => Ok(self.size_only(&input)),
            Err(e) if operation.requires_probe() => Err(e),
            Err(e) => {
                warn!("Could not probe {}: {e}", input.display());
                Ok(self.size_only(&input))
            }
        }
    }

    fn size_only(&self, input: &Path) -> Option<MediaInfo> {
        self.metadata
            .get_size(input)
            .ok()
            .map(|size| MediaInfo { size_bytes: Some(size), ..Default::default() })
    }
}

fn describe_inputs(operation: &Operation) -> String {
    operation
        .inputs()
        .iter()
        .map(|p| p.display().to_string())
        .collect::<Vec<_>>()
        .join(", ")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bitrate::CompressTarget;
    use crate::builders::TrimEnd;
    use crate::external::mocks::{MockFfmpegSpawner, MockFfprobe};
    use tempfile::TempDir;

    type TestEngine = MediaEngine<MockFfmpegSpawner, MockFfprobe, StdFsMetadataProvider>;

    fn engine_in(dir: &TempDir) -> (TestEngine, MockFfmpegSpawner) {
        let spawner = MockFfmpegSpawner::new();
        let config = CoreConfig { temp_dir: Some(dir.path().to_path_buf()), ..Default::default() };
        let engine =
            MediaEngine::with_components(config, spawner.clone(), MockFfprobe::new(), StdFsMetadataProvider);
        (engine, spawner)
    }

    fn touch(dir: &TempDir, name: &str) -> PathBuf {
        let path = dir.path().join(name);
        std::fs::write(&path, b"data").unwrap();
        path
    }

    #[test]
    fn test_convert_gets_default_quality() {
        let dir = tempfile::tempdir().unwrap();
        let input = touch(&dir, "clip.mp4");
        let spawner = MockFfmpegSpawner::new();
        let config = CoreConfig { default_quality: "high".into(), ..Default::default() };
        let engine =
            MediaEngine::with_components(config, spawner.clone(), MockFfprobe::new(), StdFsMetadataProvider);

        let mut options = ConvertOptions::new(&input);
        options.format = Some("mkv".into());
        let output = engine.execute(&Operation::Convert(options)).unwrap();

        assert_eq!(output, dir.path().join("clip.mkv"));
        let calls = spawner.received_calls();
        assert_eq!(calls.len(), 1);
        let crf = calls[0].iter().position(|a| a == "-crf").unwrap();
        assert_eq!(calls[0][crf + 1], "18");
        assert_eq!(calls[0][crf + 3], "slow");
    }

    #[test]
    fn test_trim_runs_without_probe_metadata() {
        let dir = tempfile::tempdir().unwrap();
        let input = touch(&dir, "clip.mp4");
        let (engine, spawner) = engine_in(&dir);

        let mut options = TrimOptions::new(&input);
        options.start = Some(5.0);
        options.end = Some(TrimEnd::Duration(10.0));
        let outcome = engine.run(&Operation::Trim(options));

        assert!(outcome.success);
        assert_eq!(outcome.output_path, Some(dir.path().join("clip_trimmed.mp4")));
        assert_eq!(spawner.spawn_count(), 1);
    }

    #[test]
    fn test_percent_target_without_duration_fails_before_spawn() {
        let dir = tempfile::tempdir().unwrap();
        let input = dir.path().join("clip.mp4");
        std::fs::write(&input, vec![0u8; 1000]).unwrap();
        let (engine, spawner) = engine_in(&dir);

        let options = CompressOptions::new(&input, CompressTarget::Percent(50.0));
        let result = engine.execute(&Operation::Compress(options));
        assert!(matches!(result, Err(CoreError::MissingDuration(_))));
        assert_eq!(spawner.spawn_count(), 0);
    }

    #[test]
    fn test_outcome_error_text() {
        let failure = CoreError::ExternalToolFailure {
            tool: "ffmpeg".into(),
            exit_code: Some(1),
            message: "Input file not found".into(),
            suggestion: "Check the path".into(),
        };
        let outcome = OperationOutcome::from_result(Err(failure));
        assert!(!outcome.success);
        assert_eq!(outcome.error.as_deref(), Some("Input file not found\nCheck the path"));

        let outcome = OperationOutcome::from_result(Err(CoreError::InvalidOptions("bad".into())));
        assert_eq!(outcome.error.as_deref(), Some("Invalid options: bad"));
    }
}
