//! Size-targeted bitrate calculation.
//!
//! Single-pass encoding with an average bitrate and a capped rate is an
//! approximation: the output lands near the requested size, not on it. The 5%
//! container reservation and the 100 kbps floor are safety margins, not
//! encoder guarantees.

use crate::error::{CoreError, CoreResult, invalid_options};
use crate::presets::DEFAULT_AUDIO_BITRATE;
use crate::utils::{parse_bitrate, parse_size};

/// Share of the total bitrate left for audio and video after container overhead.
pub const CONTAINER_OVERHEAD_FACTOR: f64 = 0.95;

/// Lowest video bitrate ever targeted, in bits per second.
pub const MIN_VIDEO_BITRATE: u64 = 100_000;

/// Lowest audio bitrate targeted when compressing audio-only files.
pub const MIN_AUDIO_BITRATE: u64 = 32_000;

/// What a compress operation aims for. Exactly one mode is active.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum CompressTarget {
    /// Target output size in bytes.
    Size(u64),
    /// Explicit video bitrate in bits per second.
    Bitrate(u64),
    /// Percentage of the current overall bitrate, in (0, 100].
    Percent(f64),
}

impl CompressTarget {
    /// Builds the target from the three optional user inputs, rejecting zero
    /// or more than one selection and unparseable values.
    pub fn from_flags(
        size: Option<&str>,
        bitrate: Option<&str>,
        percent: Option<f64>,
    ) -> CoreResult<Self> {
        let selected = [size.is_some(), bitrate.is_some(), percent.is_some()]
            .iter()
            .filter(|set| **set)
            .count();
        if selected != 1 {
            return Err(invalid_options(format!(
                "Exactly one of target size, bitrate or percent must be given ({selected} given)"
            )));
        }

        if let Some(size) = size {
            let bytes = parse_size(size)
                .ok_or_else(|| invalid_options(format!("Invalid target size '{size}'")))?;
            return Ok(Self::Size(bytes));
        }
        if let Some(bitrate) = bitrate {
            let bps = parse_bitrate(bitrate)
                .ok_or_else(|| invalid_options(format!("Invalid bitrate '{bitrate}'")))?;
            return Ok(Self::Bitrate(bps));
        }
        Self::percent(percent.unwrap_or_default())
    }

    /// Percent mode, validated to lie in (0, 100].
    pub fn percent(percent: f64) -> CoreResult<Self> {
        if percent.is_finite() && percent > 0.0 && percent <= 100.0 {
            Ok(Self::Percent(percent))
        } else {
            Err(invalid_options(format!(
                "Percent must be greater than 0 and at most 100 (got {percent})"
            )))
        }
    }

    /// Whether this mode needs a probed duration.
    #[must_use]
    pub fn needs_duration(&self) -> bool {
        !matches!(self, Self::Bitrate(_))
    }
}

/// Inputs the calculator needs besides the target itself.
#[derive(Debug, Clone, Copy, Default)]
pub struct BitrateInputs {
    pub duration: Option<f64>,
    pub file_size: Option<u64>,
    /// bits per second; defaults to 128 kbps
    pub audio_bitrate: Option<u64>,
}

/// Video bitrate for a target size:
/// `max(100_000, target_bytes * 8 / duration * 0.95 - audio_bitrate)`.
pub fn bitrate_for_size(target_bytes: u64, duration: f64, audio_bitrate: u64) -> CoreResult<u64> {
    let duration = require_duration(Some(duration))?;
    let total = target_bytes as f64 * 8.0 / duration;
    let video = total * CONTAINER_OVERHEAD_FACTOR - audio_bitrate as f64;
    Ok(floor_bitrate(video))
}

/// Video bitrate for a percentage of the current overall bitrate:
/// `max(100_000, file_size * 8 / duration * percent / 100)`.
pub fn bitrate_for_percent(file_size: u64, duration: f64, percent: f64) -> CoreResult<u64> {
    let duration = require_duration(Some(duration))?;
    let current = file_size as f64 * 8.0 / duration;
    Ok(floor_bitrate(current * (percent / 100.0)))
}

/// Computes the video bitrate (bits per second) for a compress target.
pub fn calculate_video_bitrate(target: CompressTarget, inputs: BitrateInputs) -> CoreResult<u64> {
    let audio = inputs.audio_bitrate.unwrap_or(DEFAULT_AUDIO_BITRATE);
    let bitrate = match target {
        CompressTarget::Bitrate(bps) => bps,
        CompressTarget::Size(bytes) => {
            bitrate_for_size(bytes, require_duration(inputs.duration)?, audio)?
        }
        CompressTarget::Percent(percent) => {
            let duration = require_duration(inputs.duration)?;
            let size = inputs
                .file_size
                .ok_or_else(|| CoreError::MissingDuration("input (file size unknown)".into()))?;
            bitrate_for_percent(size, duration, percent)?
        }
    };
    log::debug!("Target {target:?} resolved to video bitrate {bitrate} bps");
    Ok(bitrate)
}

/// Computes the audio bitrate for compressing an audio-only file. The whole
/// budget goes to the audio stream, floored at 32 kbps.
pub fn calculate_audio_bitrate(target: CompressTarget, inputs: BitrateInputs) -> CoreResult<u64> {
    let total = match target {
        CompressTarget::Bitrate(bps) => bps as f64,
        CompressTarget::Size(bytes) => {
            bytes as f64 * 8.0 / require_duration(inputs.duration)? * CONTAINER_OVERHEAD_FACTOR
        }
        CompressTarget::Percent(percent) => {
            let duration = require_duration(inputs.duration)?;
            let size = inputs
                .file_size
                .ok_or_else(|| CoreError::MissingDuration("input (file size unknown)".into()))?;
            size as f64 * 8.0 / duration * (percent / 100.0)
        }
    };
    let bitrate = if total.is_finite() && total > MIN_AUDIO_BITRATE as f64 {
        total.round() as u64
    } else {
        MIN_AUDIO_BITRATE
    };
    log::debug!("Target {target:?} resolved to audio bitrate {bitrate} bps");
    Ok(bitrate)
}

fn require_duration(duration: Option<f64>) -> CoreResult<f64> {
    duration
        .filter(|d| d.is_finite() && *d > 0.0)
        .ok_or_else(|| CoreError::MissingDuration("input".into()))
}

fn floor_bitrate(bits_per_second: f64) -> u64 {
    if bits_per_second.is_finite() && bits_per_second > MIN_VIDEO_BITRATE as f64 {
        bits_per_second.round() as u64
    } else {
        MIN_VIDEO_BITRATE
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_size_formula() {
        // 10 MiB over 120 s: 10485760 * 8 / 120 = 699050.67; * 0.95 = 664098.13; - 128000
        let bitrate = bitrate_for_size(10 * 1024 * 1024, 120.0, 128_000).unwrap();
        assert_eq!(bitrate, 536_098);
    }

    #[test]
    fn test_size_floor() {
        // 1 MB over an hour is far below the floor
        assert_eq!(bitrate_for_size(1_000_000, 3600.0, 128_000).unwrap(), MIN_VIDEO_BITRATE);
    }

    #[test]
    fn test_percent_formula() {
        // 60 MB over 60 s = 8 Mbps; half of it is 4 Mbps
        assert_eq!(bitrate_for_percent(60_000_000, 60.0, 50.0).unwrap(), 4_000_000);
        assert_eq!(bitrate_for_percent(60_000_000, 60.0, 100.0).unwrap(), 8_000_000);
    }

    #[test]
    fn test_percent_floor() {
        // 100 KB over ten minutes is ~1.3 kbps; a tenth of that is far below the floor
        assert_eq!(bitrate_for_percent(100_000, 600.0, 10.0).unwrap(), MIN_VIDEO_BITRATE);
        let inputs = BitrateInputs { duration: Some(600.0), file_size: Some(100_000), audio_bitrate: None };
        assert_eq!(
            calculate_video_bitrate(CompressTarget::Percent(1.0), inputs).unwrap(),
            MIN_VIDEO_BITRATE
        );
    }

    #[test]
    fn test_audio_bitrate_for_targets() {
        let inputs = BitrateInputs { duration: Some(240.0), file_size: Some(9_600_000), audio_bitrate: None };
        // 9.6 MB over 240 s = 320 kbps
        assert_eq!(calculate_audio_bitrate(CompressTarget::Percent(50.0), inputs).unwrap(), 160_000);
        // 3 MB over 240 s = 100 kbps; 95% of it
        assert_eq!(calculate_audio_bitrate(CompressTarget::Size(3_000_000), inputs).unwrap(), 95_000);
        assert_eq!(calculate_audio_bitrate(CompressTarget::Bitrate(96_000), inputs).unwrap(), 96_000);
        assert_eq!(calculate_audio_bitrate(CompressTarget::Bitrate(8_000), inputs).unwrap(), MIN_AUDIO_BITRATE);
    }

    #[test]
    fn test_missing_duration() {
        assert!(matches!(bitrate_for_size(1, 0.0, 0), Err(CoreError::MissingDuration(_))));
        let result = calculate_video_bitrate(CompressTarget::Size(1_000_000), BitrateInputs::default());
        assert!(matches!(result, Err(CoreError::MissingDuration(_))));
    }

    #[test]
    fn test_explicit_bitrate_needs_no_duration() {
        let target = CompressTarget::from_flags(None, Some("2M"), None).unwrap();
        assert!(!target.needs_duration());
        assert_eq!(calculate_video_bitrate(target, BitrateInputs::default()).unwrap(), 2_000_000);
    }

    #[test]
    fn test_percent_without_file_size() {
        let inputs = BitrateInputs { duration: Some(10.0), ..Default::default() };
        let result = calculate_video_bitrate(CompressTarget::Percent(50.0), inputs);
        assert!(matches!(result, Err(CoreError::MissingDuration(_))));
    }

    #[test]
    fn test_from_flags_exclusivity() {
        assert!(matches!(CompressTarget::from_flags(None, None, None), Err(CoreError::InvalidOptions(_))));
        assert!(matches!(
            CompressTarget::from_flags(Some("10MB"), Some("2M"), None),
            Err(CoreError::InvalidOptions(_))
        ));
        assert!(matches!(
            CompressTarget::from_flags(Some("10MB"), None, Some(50.0)),
            Err(CoreError::InvalidOptions(_))
        ));
        assert_eq!(
            CompressTarget::from_flags(Some("10MB"), None, None).unwrap(),
            CompressTarget::Size(10 * 1024 * 1024)
        );
    }

    #[test]
    fn test_percent_range() {
        assert!(CompressTarget::percent(0.0).is_err());
        assert!(CompressTarget::percent(-5.0).is_err());
        assert!(CompressTarget::percent(100.5).is_err());
        assert!(CompressTarget::percent(f64::NAN).is_err());
        assert_eq!(CompressTarget::percent(100.0).unwrap(), CompressTarget::Percent(100.0));
        assert!(CompressTarget::from_flags(None, None, Some(150.0)).is_err());
    }
}
