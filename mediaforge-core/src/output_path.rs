//! Output path derivation.
//!
//! Pure path arithmetic; nothing here touches the filesystem. Collision with
//! an existing file is checked by the engine right before invocation.

use std::path::{Path, PathBuf};

use crate::utils::extension_lowercase;

/// Operation-specific name suffix used when the derived name would otherwise
/// equal the input name.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputSuffix {
    Converted,
    Compressed,
    Trimmed,
    Audio,
    Video,
    Frame,
    Merged,
    Thumb,
    Animated,
}

impl OutputSuffix {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Converted => "_converted",
            Self::Compressed => "_compressed",
            Self::Trimmed => "_trimmed",
            Self::Audio => "_audio",
            Self::Video => "_video",
            Self::Frame => "_frame",
            Self::Merged => "_merged",
            Self::Thumb => "_thumb",
            Self::Animated => "_animated",
        }
    }
}

/// Resolves the output path of a single-file operation.
///
/// An explicit output wins verbatim. Otherwise the input's stem is reused in
/// the same directory with `extension`; when that extension equals the input
/// extension the suffix is appended so the input is never targeted.
#[must_use]
pub fn resolve_output_path(
    input: &Path,
    explicit: Option<&Path>,
    extension: &str,
    suffix: OutputSuffix,
) -> PathBuf {
    if let Some(explicit) = explicit {
        return explicit.to_path_buf();
    }

    let extension = extension.trim_start_matches('.');
    let stem = file_stem(input);
    let same_extension = extension_lowercase(input)
        .is_some_and(|ext| ext == extension.to_ascii_lowercase());

    let file_name = if same_extension {
        format!("{stem}{}.{extension}", suffix.as_str())
    } else {
        format!("{stem}.{extension}")
    };
    input.with_file_name(file_name)
}

/// Resolves an output that is always suffixed, such as sequence templates
/// (`{stem}_thumb_%02d.jpg`) or grids (`{stem}_grid.jpg`). The pattern is
/// handed to ffmpeg unchanged.
#[must_use]
pub fn resolve_pattern_path(
    input: &Path,
    explicit: Option<&Path>,
    pattern_suffix: &str,
    extension: &str,
) -> PathBuf {
    if let Some(explicit) = explicit {
        return explicit.to_path_buf();
    }
    let extension = extension.trim_start_matches('.');
    input.with_file_name(format!("{}{pattern_suffix}.{extension}", file_stem(input)))
}

/// Whether a path is a printf-style sequence template rather than a single file.
#[must_use]
pub fn is_sequence_template(path: &Path) -> bool {
    path.to_string_lossy().contains('%')
}

fn file_stem(path: &Path) -> String {
    path.file_stem()
        .map(|stem| stem.to_string_lossy().into_owned())
        .unwrap_or_else(|| "output".to_string())
}
