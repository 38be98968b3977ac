//! FFmpeg argument list builder utilities
//!
//! This module provides a builder pattern for constructing ffmpeg argument
//! lists. Lists are plain `Vec<String>` so they can be inspected in tests and
//! logged before a process is ever spawned.

use std::path::Path;

use crate::utils::format_decimal;

/// Builder for an ordered ffmpeg argument list.
///
/// The overwrite flag is decided at construction so `-y` is always the first
/// argument when set.
#[derive(Debug, Clone, Default)]
pub struct FfmpegArgs {
    args: Vec<String>,
}

impl FfmpegArgs {
    /// Starts a new list, with `-y` when `overwrite` is set.
    #[must_use]
    pub fn new(overwrite: bool) -> Self {
        let mut args = Vec::new();
        if overwrite {
            args.push("-y".to_string());
        }
        Self { args }
    }

    /// Appends a bare argument.
    #[must_use]
    pub fn arg(mut self, arg: impl Into<String>) -> Self {
        self.args.push(arg.into());
        self
    }

    /// Appends a flag and its value.
    #[must_use]
    pub fn option(mut self, flag: &str, value: impl Into<String>) -> Self {
        self.args.push(flag.to_string());
        self.args.push(value.into());
        self
    }

    /// Appends a flag and its value only when a value is present.
    #[must_use]
    pub fn option_if<T: Into<String>>(self, flag: &str, value: Option<T>) -> Self {
        match value {
            Some(value) => self.option(flag, value),
            None => self,
        }
    }

    /// Appends a bare flag only when `enabled`.
    #[must_use]
    pub fn flag_if(self, flag: &str, enabled: bool) -> Self {
        if enabled { self.arg(flag) } else { self }
    }

    /// Appends `-i <path>`.
    #[must_use]
    pub fn input(self, path: &Path) -> Self {
        self.option("-i", path.to_string_lossy())
    }

    /// Appends a time-valued flag (`-ss`, `-t`, `-to`) in decimal seconds.
    #[must_use]
    pub fn time(self, flag: &str, seconds: f64) -> Self {
        self.option(flag, format_decimal(seconds))
    }

    /// Appends `-vf <chain>` when the chain has any filter.
    #[must_use]
    pub fn video_filters(self, chain: VideoFilterChain) -> Self {
        self.option_if("-vf", chain.build())
    }

    /// Appends the output path and returns the finished list.
    #[must_use]
    pub fn output(mut self, path: &Path) -> Vec<String> {
        self.args.push(path.to_string_lossy().into_owned());
        self.args
    }
}

/// Builder for constructing video filter chains
#[derive(Debug, Default)]
pub struct VideoFilterChain {
    filters: Vec<String>,
}

impl VideoFilterChain {
    /// Creates a new empty filter chain
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a filter to the chain; empty strings are ignored
    #[must_use]
    pub fn add_filter(mut self, filter: impl Into<String>) -> Self {
        let filter = filter.into();
        if !filter.is_empty() {
            self.filters.push(filter);
        }
        self
    }

    /// Adds a filter when one is given
    #[must_use]
    pub fn add_optional(self, filter: Option<String>) -> Self {
        match filter {
            Some(filter) => self.add_filter(filter),
            None => self,
        }
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.filters.is_empty()
    }

    /// Builds the filter chain into a single filter string
    #[must_use]
    pub fn build(self) -> Option<String> {
        if self.filters.is_empty() {
            None
        } else {
            Some(self.filters.join(","))
        }
    }
}
