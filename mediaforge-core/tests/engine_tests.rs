// mediaforge-core/tests/engine_tests.rs

use mediaforge_core::bitrate::CompressTarget;
use mediaforge_core::builders::{
    CompressOptions, ExtractMode, ExtractOptions, FrameSelection, MergeMode, MergeOptions,
    ThumbnailMode, ThumbnailOptions, TrimOptions,
};
use mediaforge_core::config::CoreConfig;
use mediaforge_core::engine::{MediaEngine, Operation};
use mediaforge_core::error::CoreError;
use mediaforge_core::external::StdFsMetadataProvider;
use mediaforge_core::external::mocks::{MockFfmpegSpawner, MockFfprobe, exit_status};
use mediaforge_core::media::MediaInfo;
use ffmpeg_sidecar::event::{FfmpegEvent, FfmpegProgress};
use std::fs::File;
use std::io::Write;
use std::path::{Path, PathBuf};
use tempfile::tempdir;

type TestEngine = MediaEngine<MockFfmpegSpawner, MockFfprobe, StdFsMetadataProvider>;

fn create_dummy_file(dir: &Path, filename: &str) -> PathBuf {
    let file_path = dir.join(filename);
    let mut file = File::create(&file_path).expect("Failed to create dummy file");
    file.write_all(b"dummy content").expect("Failed to write dummy content");
    file_path
}

fn engine(temp_dir: &Path, spawner: &MockFfmpegSpawner, prober: &MockFfprobe) -> TestEngine {
    let config = CoreConfig { temp_dir: Some(temp_dir.to_path_buf()), ..Default::default() };
    MediaEngine::with_components(config, spawner.clone(), prober.clone(), StdFsMetadataProvider)
}

fn probed(duration: f64, size: u64) -> MediaInfo {
    MediaInfo { duration: Some(duration), size_bytes: Some(size), ..Default::default() }
}

fn progress_at(time: &str) -> FfmpegEvent {
    FfmpegEvent::Progress(FfmpegProgress {
        frame: 100,
        fps: 25.0,
        q: 0.0,
        size_kb: 1024,
        time: time.to_string(),
        bitrate_kbps: 500.0,
        speed: 2.0,
        raw_log_message: String::new(),
    })
}

#[test]
fn test_missing_input_never_spawns() {
    let dir = tempdir().unwrap();
    let spawner = MockFfmpegSpawner::new();
    let prober = MockFfprobe::new();
    let engine = engine(dir.path(), &spawner, &prober);

    let options = TrimOptions::new(dir.path().join("missing.mp4"));
    let result = engine.execute(&Operation::Trim(options));

    assert!(matches!(result, Err(CoreError::InputNotFound(_))));
    assert_eq!(spawner.spawn_count(), 0);
    assert_eq!(prober.call_count(), 0);
}

#[test]
fn test_existing_output_without_overwrite_never_spawns() {
    let dir = tempdir().unwrap();
    let input = create_dummy_file(dir.path(), "clip.mp4");
    let existing = create_dummy_file(dir.path(), "clip_trimmed.mp4");
    let spawner = MockFfmpegSpawner::new();
    let prober = MockFfprobe::new();
    let engine = engine(dir.path(), &spawner, &prober);

    let mut options = TrimOptions::new(&input);
    options.start = Some(1.0);
    let result = engine.execute(&Operation::Trim(options.clone()));
    match result {
        Err(CoreError::OutputExists(path)) => assert_eq!(path, existing),
        other => panic!("expected OutputExists, got {other:?}"),
    }
    assert_eq!(spawner.spawn_count(), 0);

    options.overwrite = true;
    let output = engine.execute(&Operation::Trim(options)).unwrap();
    assert_eq!(output, existing);
    assert_eq!(spawner.received_calls()[0][0], "-y");
}

#[test]
fn test_compress_to_size_end_to_end() {
    let dir = tempdir().unwrap();
    let input = create_dummy_file(dir.path(), "holiday.mp4");
    let spawner = MockFfmpegSpawner::new();
    spawner.create_outputs(true);
    spawner.push_outcome(vec![progress_at("00:01:00.00"), progress_at("00:02:00.00")], exit_status(0));
    let prober = MockFfprobe::new();
    prober.expect(&input, Some(probed(120.0, 50_000_000)));
    let engine = engine(dir.path(), &spawner, &prober);

    let target = CompressTarget::from_flags(Some("10MB"), None, None).unwrap();
    let mut updates = Vec::new();
    let output = engine
        .execute_with_progress(&Operation::Compress(CompressOptions::new(&input, target)), |p| {
            updates.push(p)
        })
        .unwrap();

    let expected = dir.path().join("holiday_compressed.mp4");
    assert_eq!(output, expected);
    assert!(expected.exists());

    let calls = spawner.received_calls();
    assert_eq!(calls.len(), 1);
    let args = &calls[0];
    let value_of = |flag: &str| {
        let i = args.iter().position(|a| a == flag).unwrap();
        args[i + 1].as_str()
    };
    assert_eq!(value_of("-b:v"), "536k");
    assert_eq!(value_of("-b:a"), "128k");
    assert_eq!(args.last().map(String::as_str), expected.to_str());

    assert_eq!(updates.len(), 2);
    assert_eq!(updates[0].percent, Some(50.0));
    assert_eq!(updates[1].percent, Some(100.0));
}

#[test]
fn test_failure_is_classified() {
    let dir = tempdir().unwrap();
    let input = create_dummy_file(dir.path(), "clip.mkv");
    let spawner = MockFfmpegSpawner::new();
    spawner.push_failure(1, "[libx265 @ 0x55d0] Unknown encoder 'libx265'");
    let prober = MockFfprobe::new();
    let engine = engine(dir.path(), &spawner, &prober);

    let options = ExtractOptions::new(&input, ExtractMode::Audio);
    match engine.execute(&Operation::Extract(options.clone())) {
        Err(CoreError::ExternalToolFailure { tool, exit_code, message, suggestion }) => {
            assert_eq!(tool, "ffmpeg");
            assert_eq!(exit_code, Some(1));
            assert_eq!(message, "The requested encoder is not available in this ffmpeg build");
            assert!(suggestion.contains("ffmpeg -encoders"));
        }
        other => panic!("expected ExternalToolFailure, got {other:?}"),
    }

    spawner.push_failure(1, "Something odd\nConversion failed!");
    let outcome = engine.run(&Operation::Extract(options));
    assert!(!outcome.success);
    assert!(outcome.output_path.is_none());
    let text = outcome.error.unwrap();
    assert!(text.starts_with("The ffmpeg operation failed\n"), "{text}");
}

#[cfg(unix)]
#[test]
fn test_signal_termination_is_cancelled() {
    use mediaforge_core::external::mocks::signal_status;

    let dir = tempdir().unwrap();
    let input = create_dummy_file(dir.path(), "clip.mp4");
    let spawner = MockFfmpegSpawner::new();
    spawner.push_outcome(Vec::new(), signal_status(9));
    let prober = MockFfprobe::new();
    let engine = engine(dir.path(), &spawner, &prober);

    let options = ExtractOptions::new(&input, ExtractMode::Video);
    let result = engine.execute(&Operation::Extract(options));
    assert!(matches!(result, Err(CoreError::Cancelled(_))));
}

#[test]
fn test_spawn_error_surfaces_missing_dependency() {
    let dir = tempdir().unwrap();
    let input = create_dummy_file(dir.path(), "clip.mp4");
    let spawner = MockFfmpegSpawner::new();
    spawner.push_spawn_error(std::io::ErrorKind::NotFound);
    let prober = MockFfprobe::new();
    let engine = engine(dir.path(), &spawner, &prober);

    let options = ExtractOptions::new(&input, ExtractMode::Video);
    let result = engine.execute(&Operation::Extract(options));
    assert!(matches!(result, Err(CoreError::DependencyNotFound(_))));
}

#[test]
fn test_merge_list_removed_after_run() {
    let dir = tempdir().unwrap();
    let lists = tempdir().unwrap();
    let first = create_dummy_file(dir.path(), "part1.mp4");
    let second = create_dummy_file(dir.path(), "part2.mp4");
    let spawner = MockFfmpegSpawner::new();
    let prober = MockFfprobe::new();
    let engine = engine(lists.path(), &spawner, &prober);

    let options = MergeOptions {
        inputs: vec![first.clone(), second],
        mode: MergeMode::Demuxer,
        ..Default::default()
    };
    let output = engine.execute(&Operation::Merge(options)).unwrap();
    assert_eq!(output, dir.path().join("part1_merged.mp4"));

    let args = &spawner.received_calls()[0];
    let list = args.iter().position(|a| a == "-i").map(|i| PathBuf::from(&args[i + 1])).unwrap();
    assert!(list.starts_with(lists.path()));
    assert!(!list.exists());
    assert_eq!(std::fs::read_dir(lists.path()).unwrap().count(), 0);
    // Merge has no single input to probe.
    assert_eq!(prober.call_count(), 0);
}

#[test]
fn test_merge_checks_every_input() {
    let dir = tempdir().unwrap();
    let first = create_dummy_file(dir.path(), "part1.mp4");
    let spawner = MockFfmpegSpawner::new();
    let prober = MockFfprobe::new();
    let engine = engine(dir.path(), &spawner, &prober);

    let missing = dir.path().join("part2.mp4");
    let options = MergeOptions { inputs: vec![first, missing.clone()], ..Default::default() };
    match engine.execute(&Operation::Merge(options)) {
        Err(CoreError::InputNotFound(path)) => assert_eq!(path, missing),
        other => panic!("expected InputNotFound, got {other:?}"),
    }
    assert_eq!(spawner.spawn_count(), 0);
}

#[test]
fn test_thumbnail_grid_uses_probed_duration() {
    let dir = tempdir().unwrap();
    let input = create_dummy_file(dir.path(), "talk.mp4");
    let spawner = MockFfmpegSpawner::new();
    let prober = MockFfprobe::new();
    prober.expect(&input, Some(probed(100.0, 1_000_000)));
    let engine = engine(dir.path(), &spawner, &prober);

    let options = ThumbnailOptions::new(&input, ThumbnailMode::Grid { cols: 4, rows: 4 });
    let output = engine.execute(&Operation::Thumbnail(options)).unwrap();
    assert_eq!(output, dir.path().join("talk_grid.jpg"));

    let args = &spawner.received_calls()[0];
    let vf = args.iter().position(|a| a == "-vf").map(|i| args[i + 1].clone()).unwrap();
    assert_eq!(vf, "fps=0.16,scale=320:-1,tile=4x4");
}

#[test]
fn test_thumbnail_without_duration_fails_before_spawn() {
    let dir = tempdir().unwrap();
    let input = create_dummy_file(dir.path(), "talk.mp4");
    let spawner = MockFfmpegSpawner::new();
    let prober = MockFfprobe::new();
    let engine = engine(dir.path(), &spawner, &prober);

    let options = ThumbnailOptions::new(&input, ThumbnailMode::Multiple(5));
    let result = engine.execute(&Operation::Thumbnail(options));
    assert!(matches!(result, Err(CoreError::MissingDuration(_))));
    assert_eq!(spawner.spawn_count(), 0);
}

#[test]
fn test_frame_sequence_skips_output_check() {
    let dir = tempdir().unwrap();
    let input = create_dummy_file(dir.path(), "clip.mp4");
    let spawner = MockFfmpegSpawner::new();
    let prober = MockFfprobe::new();
    let engine = engine(dir.path(), &spawner, &prober);

    let options = ExtractOptions::new(&input, ExtractMode::Frames(FrameSelection::Every(2.0)));
    let output = engine.execute(&Operation::Extract(options)).unwrap();
    assert_eq!(output, dir.path().join("clip_frame_%04d.png"));
    assert_eq!(spawner.spawn_count(), 1);
}

#[test]
fn test_probe_fills_missing_size() {
    let dir = tempdir().unwrap();
    let input = create_dummy_file(dir.path(), "clip.mp4");
    let spawner = MockFfmpegSpawner::new();
    let prober = MockFfprobe::new();
    prober.expect(&input, Some(MediaInfo { duration: Some(3.0), ..Default::default() }));
    let engine = engine(dir.path(), &spawner, &prober);

    let info = engine.probe(&input).unwrap().unwrap();
    assert_eq!(info.size_bytes, Some(13));
    assert!(matches!(
        engine.probe(&dir.path().join("nope.mp4")),
        Err(CoreError::InputNotFound(_))
    ));
}
