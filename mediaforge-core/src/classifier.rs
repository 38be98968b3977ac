// ============================================================================
// mediaforge-core/src/classifier.rs
// ============================================================================
//
// DIAGNOSTIC CLASSIFIER: ffmpeg stderr -> (message, suggestion)
//
// ffmpeg reports failures as free text on stderr, usually ending with a
// generic "Conversion failed!" line. The classifier checks a priority-ordered
// table of known signatures (first match wins), then falls back to the most
// specific-looking error line, then to a generic message.

use once_cell::sync::Lazy;
use regex::{Regex, RegexBuilder};

/// Suggestion attached to anything the table does not recognize.
pub const VERBOSE_SUGGESTION: &str =
    "Re-run with -vv to see the full ffmpeg output for details.";

const GENERIC_MESSAGE: &str = "The ffmpeg operation failed";

/// Classified failure: what went wrong and what to try next.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Diagnosis {
    pub message: String,
    pub suggestion: String,
}

impl Diagnosis {
    fn new(message: impl Into<String>, suggestion: impl Into<String>) -> Self {
        Self { message: message.into(), suggestion: suggestion.into() }
    }
}

struct Signature {
    pattern: Regex,
    message: &'static str,
    suggestion: &'static str,
}

/// Known signatures, most specific first.
const SIGNATURES: &[(&str, &str, &str)] = &[
    (
        r"no such file or directory",
        "Input file not found or not readable",
        "Check the path and make sure the file exists.",
    ),
    (
        r"permission denied",
        "Permission denied while reading or writing a file",
        "Check file permissions on the input and the output directory.",
    ),
    (
        r"already exists\. (overwrite|exiting)|file '.*' already exists",
        "Output file already exists",
        "Pass --overwrite (-y) or choose another output path.",
    ),
    (
        r"unknown encoder|encoder .* not found",
        "The requested encoder is not available in this ffmpeg build",
        "Pick another codec or install an ffmpeg build that includes it (see `ffmpeg -encoders`).",
    ),
    (
        r"unknown decoder|decoder .* not found|no decoder for",
        "This ffmpeg build cannot decode the input",
        "Install a full ffmpeg build or convert the source with another tool first.",
    ),
    (
        r"invalid data found when processing input|moov atom not found|end of file while parsing",
        "The input file is corrupted or not a media file",
        "Make sure the file plays correctly; re-download or re-export it if needed.",
    ),
    (
        r"could not find tag for codec|codec not currently supported in container|incompatible with output",
        "The chosen codec cannot be stored in this container",
        "Pick a codec supported by the output format, or use a different format such as mkv.",
    ),
    (
        r"unsafe file name",
        "A file name in the merge list was rejected as unsafe",
        "Use plain file names or paths without special characters.",
    ),
    (
        r"stream specifier .* matches no streams|output file #0 does not contain any stream|does not contain any stream",
        "The input is missing a stream the operation needs",
        "Check the input with `mediaforge info`; for example, disable audio when the source has none.",
    ),
    (
        r"(error )?(initializing|reinitializing) (complex )?filters?|invalid argument.*filter|no such filter",
        "The filter graph could not be built",
        "Check resolution, frame rate and grid values; inputs may also need matching streams.",
    ),
    (
        r"height not divisible by 2|width not divisible by 2",
        "The encoder needs even frame dimensions",
        "Use a resolution with even width and height.",
    ),
    (
        r"no space left on device",
        "The disk is full",
        "Free some space or write the output to another drive.",
    ),
    (
        r"invalid duration specification|invalid time|time .* out of range",
        "A time value was not understood",
        "Use seconds (90), MM:SS (1:30) or HH:MM:SS (00:01:30).",
    ),
    (
        r"at least one output file must be specified",
        "No output file was given to ffmpeg",
        "Pass an output path.",
    ),
];

static TABLE: Lazy<Vec<Signature>> = Lazy::new(|| {
    SIGNATURES
        .iter()
        .map(|(pattern, message, suggestion)| Signature {
            pattern: RegexBuilder::new(pattern)
                .case_insensitive(true)
                .build()
                .expect("diagnostic signature patterns are valid"),
            message,
            suggestion,
        })
        .collect()
});

static COMPONENT_PREFIX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)^(\[[^\]]*\]\s*)+|^(error|fatal)\s*:\s*")
        .expect("component prefix pattern is valid")
});

const FAILURE_KEYWORDS: &[&str] = &[
    "error",
    "invalid",
    "failed",
    "unable",
    "cannot",
    "could not",
    "not found",
];

/// Classifies ffmpeg diagnostic output.
#[must_use]
pub fn classify(stderr: &str) -> Diagnosis {
    if let Some(signature) = TABLE.iter().find(|s| s.pattern.is_match(stderr)) {
        return Diagnosis::new(signature.message, signature.suggestion);
    }
    if let Some(line) = keyword_line(stderr) {
        return Diagnosis::new(line, VERBOSE_SUGGESTION);
    }
    Diagnosis::new(GENERIC_MESSAGE, VERBOSE_SUGGESTION)
}

/// Last line that mentions a failure keyword, ignoring the terminal
/// "Conversion failed!" and with component prefixes stripped.
fn keyword_line(stderr: &str) -> Option<String> {
    stderr
        .lines()
        .rev()
        .map(str::trim)
        .filter(|line| !line.is_empty() && !line.eq_ignore_ascii_case("conversion failed!"))
        .find(|line| {
            let lowered = line.to_ascii_lowercase();
            FAILURE_KEYWORDS.iter().any(|keyword| lowered.contains(keyword))
        })
        .map(strip_component_prefix)
        .filter(|line| !line.is_empty())
}

fn strip_component_prefix(line: &str) -> String {
    let mut current = line.trim().to_string();
    // prefixes can stack, e.g. "[libx264 @ 0x55] Error: ..."
    loop {
        let stripped = COMPONENT_PREFIX.replace(&current, "").trim().to_string();
        if stripped == current {
            return current;
        }
        current = stripped;
    }
}
