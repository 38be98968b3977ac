//! Utility functions for parsing and formatting human units.
//!
//! This module provides the time, size and bitrate parsers used to turn user
//! input into numbers, and the formatters used to render numbers back into the
//! token forms ffmpeg expects.

use std::path::Path;

/// Formats seconds as HH:MM:SS (e.g., 3725.0 -> "01:02:05"). Returns "??:??:??" for invalid inputs.
#[must_use]
pub fn format_duration(seconds: f64) -> String {
    if seconds < 0.0 || !seconds.is_finite() {
        return "??:??:??".to_string();
    }

    let total_seconds = seconds as u64;
    let hours = total_seconds / 3600;
    let minutes = (total_seconds % 3600) / 60;
    let secs = total_seconds % 60;
    format!("{hours:02}:{minutes:02}:{secs:02}")
}

/// Formats seconds as an ffmpeg timestamp with millisecond precision (90.5 -> "00:01:30.500").
#[must_use]
pub fn format_timestamp(seconds: f64) -> String {
    let total_millis = (seconds.max(0.0) * 1000.0).round() as u64;
    let hours = total_millis / 3_600_000;
    let minutes = (total_millis % 3_600_000) / 60_000;
    let secs = (total_millis % 60_000) / 1000;
    let millis = total_millis % 1000;
    format!("{hours:02}:{minutes:02}:{secs:02}.{millis:03}")
}

/// Formats bytes with appropriate binary units (B, KiB, MiB, GiB).
#[must_use]
pub fn format_bytes(bytes: u64) -> String {
    const KIB: f64 = 1024.0;
    const MIB: f64 = KIB * 1024.0;
    const GIB: f64 = MIB * 1024.0;

    let bytes_f64 = bytes as f64;
    if bytes_f64 >= GIB {
        format!("{:.2} GiB", bytes_f64 / GIB)
    } else if bytes_f64 >= MIB {
        format!("{:.2} MiB", bytes_f64 / MIB)
    } else if bytes_f64 >= KIB {
        format!("{:.2} KiB", bytes_f64 / KIB)
    } else {
        format!("{bytes} B")
    }
}

/// Parses FFmpeg time string (HH:MM:SS.MS) to seconds. Returns None if invalid.
#[must_use]
pub fn parse_ffmpeg_time(time: &str) -> Option<f64> {
    let parts: Vec<&str> = time.split(':').collect();
    if parts.len() == 3 {
        let hours = parts[0].parse::<f64>().ok()?;
        let minutes = parts[1].parse::<f64>().ok()?;
        let seconds = parts[2].parse::<f64>().ok()?;
        Some(hours * 3600.0 + minutes * 60.0 + seconds)
    } else {
        None
    }
}

/// Parses a user time position: seconds (`90`, `12.5`), `MM:SS(.ms)` or
/// `HH:MM:SS(.ms)`. Negative or non-finite values are rejected.
#[must_use]
pub fn parse_time(input: &str) -> Option<f64> {
    let input = input.trim();
    if input.is_empty() {
        return None;
    }

    let mut total = 0.0;
    let parts: Vec<&str> = input.split(':').collect();
    if parts.len() > 3 {
        return None;
    }
    for part in &parts {
        let value = part.parse::<f64>().ok()?;
        if !value.is_finite() || value < 0.0 {
            return None;
        }
        total = total * 60.0 + value;
    }
    Some(total)
}

/// Parses a human size into bytes (`"10MB"`, `"700KB"`, `"1.5GB"`, `"123"`).
/// Multipliers are binary: 1 KB = 1024 bytes.
#[must_use]
pub fn parse_size(input: &str) -> Option<u64> {
    let (number, unit) = split_number_unit(input)?;
    let multiplier: f64 = match unit.to_ascii_lowercase().as_str() {
        "" | "b" => 1.0,
        "k" | "kb" | "kib" => 1024.0,
        "m" | "mb" | "mib" => 1024.0 * 1024.0,
        "g" | "gb" | "gib" => 1024.0 * 1024.0 * 1024.0,
        _ => return None,
    };
    let bytes = (number * multiplier).round();
    (bytes >= 1.0).then_some(bytes as u64)
}

/// Parses a human bitrate into bits per second (`"2M"`, `"500k"`, `"128kbps"`).
/// Multipliers are decimal, matching ffmpeg's own suffixes.
#[must_use]
pub fn parse_bitrate(input: &str) -> Option<u64> {
    let trimmed = input.trim();
    let lowered = trimmed.to_ascii_lowercase();
    let without_suffix = lowered.strip_suffix("bps").unwrap_or(&lowered);
    let (number, unit) = split_number_unit(without_suffix)?;
    let multiplier: f64 = match unit {
        "" => 1.0,
        "k" => 1_000.0,
        "m" => 1_000_000.0,
        "g" => 1_000_000_000.0,
        _ => return None,
    };
    let bits = (number * multiplier).round();
    (bits >= 1.0).then_some(bits as u64)
}

fn split_number_unit(input: &str) -> Option<(f64, &str)> {
    let input = input.trim();
    let split_at = input
        .find(|c: char| !(c.is_ascii_digit() || c == '.'))
        .unwrap_or(input.len());
    let (number, unit) = input.split_at(split_at);
    let number = number.parse::<f64>().ok()?;
    if !number.is_finite() || number <= 0.0 {
        return None;
    }
    Some((number, unit.trim()))
}

/// Renders bits per second as an ffmpeg kilobit token (1_500_000 -> "1500k").
#[must_use]
pub fn format_kbps(bits_per_second: u64) -> String {
    let kbps = (bits_per_second as f64 / 1000.0).round() as u64;
    format!("{kbps}k")
}

/// Renders a number with the shortest exact decimal form (2.0 -> "2", 0.16 -> "0.16").
#[must_use]
pub fn format_decimal(value: f64) -> String {
    format!("{value}")
}

/// Lowercased extension of a path, if any.
#[must_use]
pub fn extension_lowercase(path: &Path) -> Option<String> {
    path.extension()
        .and_then(|ext| ext.to_str())
        .map(str::to_ascii_lowercase)
}

/// Calculates the percentage size reduction from input to output.
/// Returns 0 if input_size is 0 to avoid division by zero.
#[must_use]
pub fn calculate_size_reduction(input_size: u64, output_size: u64) -> u64 {
    if input_size == 0 || output_size >= input_size {
        0
    } else {
        100 - ((output_size * 100) / input_size)
    }
}
