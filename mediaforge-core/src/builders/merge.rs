//! Merge: join several files end to end.
//!
//! Demuxer mode copies streams through the concat demuxer and needs inputs
//! with matching codecs. Re-encode mode goes through the concat filter and
//! accepts anything ffmpeg can decode.

use std::path::{Path, PathBuf};

use super::{BuildResult, input_extension, log_built};
use crate::error::{CoreResult, invalid_options};
use crate::external::ffmpeg_builder::FfmpegArgs;
use crate::output_path::{OutputSuffix, resolve_output_path};
use crate::temp_files::ConcatList;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum MergeMode {
    #[default]
    Demuxer,
    Reencode,
}

#[derive(Debug, Clone, Default)]
pub struct MergeOptions {
    pub inputs: Vec<PathBuf>,
    pub output: Option<PathBuf>,
    pub mode: MergeMode,
    pub no_audio: bool,
    pub overwrite: bool,
}

/// A merge build. In demuxer mode it owns the concat list file, which must
/// outlive the ffmpeg process and is deleted when this value is dropped.
#[derive(Debug)]
pub struct MergeBuild {
    pub result: BuildResult,
    pub concat_list: Option<ConcatList>,
}

/// The concat filter graph for `count` inputs.
#[must_use]
pub fn concat_filter(count: usize, with_audio: bool) -> String {
    let pads: String = (0..count)
        .map(|i| if with_audio { format!("[{i}:v][{i}:a]") } else { format!("[{i}:v]") })
        .collect();
    if with_audio {
        format!("{pads}concat=n={count}:v=1:a=1[outv][outa]")
    } else {
        format!("{pads}concat=n={count}:v=1:a=0[outv]")
    }
}

/// Builds the merge arguments. `list_dir` is where the demuxer list file is
/// written; nothing is written in re-encode mode or when validation fails.
pub fn build_merge(options: &MergeOptions, list_dir: &Path) -> CoreResult<MergeBuild> {
    let first = match options.inputs.as_slice() {
        [first, _, ..] => first,
        _ => {
            return Err(invalid_options(format!(
                "Merging needs at least two inputs ({} given)",
                options.inputs.len()
            )));
        }
    };

    let output_path = resolve_output_path(
        first,
        options.output.as_deref(),
        &input_extension(first),
        OutputSuffix::Merged,
    );
    if options.inputs.iter().any(|input| *input == output_path) {
        return Err(invalid_options(format!(
            "Output {} is also one of the inputs",
            output_path.display()
        )));
    }

    let build = match options.mode {
        MergeMode::Demuxer => {
            // The demuxer resolves relative entries against the list file's directory.
            let entries = options
                .inputs
                .iter()
                .map(std::path::absolute)
                .collect::<Result<Vec<_>, _>>()?;
            let list = ConcatList::create(list_dir, &entries)?;
            let args = FfmpegArgs::new(options.overwrite)
                .option("-f", "concat")
                .option("-safe", "0")
                .input(list.path())
                .option("-c", "copy")
                .flag_if("-an", options.no_audio)
                .output(&output_path);
            MergeBuild { result: BuildResult::single(args, output_path), concat_list: Some(list) }
        }
        MergeMode::Reencode => {
            let with_audio = !options.no_audio;
            let mut args = FfmpegArgs::new(options.overwrite);
            for input in &options.inputs {
                args = args.input(input);
            }
            args = args
                .option("-filter_complex", concat_filter(options.inputs.len(), with_audio))
                .option("-map", "[outv]");
            if with_audio {
                args = args.option("-map", "[outa]");
            }
            args = args
                .option("-c:v", "libx264")
                .option("-crf", "23")
                .option("-preset", "medium");
            args = if with_audio { args.option("-c:a", "aac") } else { args.arg("-an") };
            MergeBuild { result: BuildResult::single(args.output(&output_path), output_path), concat_list: None }
        }
    };

    log_built("merge", &build.result);
    Ok(build)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::CoreError;

    fn two_inputs(mode: MergeMode) -> MergeOptions {
        MergeOptions {
            inputs: vec![PathBuf::from("/v/part1.mp4"), PathBuf::from("/v/part2.mp4")],
            mode,
            ..Default::default()
        }
    }

    #[test]
    fn test_needs_two_inputs() {
        let dir = tempfile::tempdir().unwrap();
        let options = MergeOptions { inputs: vec![PathBuf::from("/v/a.mp4")], ..Default::default() };
        assert!(matches!(build_merge(&options, dir.path()), Err(CoreError::InvalidOptions(_))));
        // nothing written on validation failure
        assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 0);
    }

    #[test]
    fn test_demuxer_mode() {
        let dir = tempfile::tempdir().unwrap();
        let mut options = two_inputs(MergeMode::Demuxer);
        options.overwrite = true;
        let build = build_merge(&options, dir.path()).unwrap();
        let list = build.concat_list.as_ref().unwrap();
        let list_path = list.path().to_string_lossy().into_owned();

        assert_eq!(
            build.result.args,
            vec!["-y", "-f", "concat", "-safe", "0", "-i", list_path.as_str(), "-c", "copy", "/v/part1_merged.mp4"]
        );
        assert_eq!(
            std::fs::read_to_string(list.path()).unwrap(),
            "file '/v/part1.mp4'\nfile '/v/part2.mp4'\n"
        );

        let path = list.path().to_path_buf();
        drop(build);
        assert!(!path.exists());
    }

    #[test]
    fn test_demuxer_list_holds_absolute_paths() {
        let dir = tempfile::tempdir().unwrap();
        let options = MergeOptions {
            inputs: vec![PathBuf::from("a.mp4"), PathBuf::from("clips/b.mp4")],
            ..Default::default()
        };
        let build = build_merge(&options, dir.path()).unwrap();
        let list = build.concat_list.as_ref().unwrap();

        let cwd = std::env::current_dir().unwrap();
        let expected = format!(
            "file '{}'\nfile '{}'\n",
            cwd.join("a.mp4").display(),
            cwd.join("clips/b.mp4").display()
        );
        assert_eq!(std::fs::read_to_string(list.path()).unwrap(), expected);
        // the output path stays relative to the first input as given
        assert_eq!(build.result.output_path, PathBuf::from("a_merged.mp4"));
    }

    #[test]
    fn test_reencode_filter_graph() {
        let dir = tempfile::tempdir().unwrap();
        let build = build_merge(&two_inputs(MergeMode::Reencode), dir.path()).unwrap();
        assert!(build.concat_list.is_none());
        assert_eq!(
            build.result.value_of("-filter_complex"),
            Some("[0:v][0:a][1:v][1:a]concat=n=2:v=1:a=1[outv][outa]")
        );
        assert_eq!(build.result.args.iter().filter(|a| *a == "-i").count(), 2);
        assert_eq!(build.result.args.iter().filter(|a| *a == "-map").count(), 2);
        assert_eq!(build.result.value_of("-c:a"), Some("aac"));
    }

    #[test]
    fn test_reencode_without_audio() {
        let dir = tempfile::tempdir().unwrap();
        let mut options = two_inputs(MergeMode::Reencode);
        options.inputs.push(PathBuf::from("/v/part3.mp4"));
        options.no_audio = true;
        let build = build_merge(&options, dir.path()).unwrap();
        assert_eq!(
            build.result.value_of("-filter_complex"),
            Some("[0:v][1:v][2:v]concat=n=3:v=1:a=0[outv]")
        );
        assert!(!build.result.contains("[outa]"));
        assert!(build.result.contains("-an"));
    }

    #[test]
    fn test_output_cannot_be_an_input() {
        let dir = tempfile::tempdir().unwrap();
        let mut options = two_inputs(MergeMode::Reencode);
        options.output = Some(PathBuf::from("/v/part2.mp4"));
        assert!(build_merge(&options, dir.path()).is_err());
    }
}
