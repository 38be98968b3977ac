// mediaforge-cli/src/commands/presets.rs
//
// `presets`: print the built-in catalog so users know what names to pass.

use mediaforge_core::presets::{
    AUDIO_CODEC_ALIASES, FORMAT_PRESETS, FormatPreset, QUALITY_PRESETS, RESOLUTION_PRESETS, VIDEO_CODEC_ALIASES,
};
use mediaforge_core::utils::format_kbps;

use crate::output::{print_heading, print_info, print_section};

/// Execute the presets command
pub fn execute_presets() {
    print_heading("Formats");
    for preset in FORMAT_PRESETS {
        print_info(preset.name, format_line(preset));
    }

    print_heading("Quality");
    for quality in QUALITY_PRESETS {
        print_info(
            quality.name,
            format!("crf {}, {} preset, audio {}", quality.crf, quality.speed, format_kbps(quality.audio_bitrate)),
        );
    }

    print_heading("Resolutions");
    for resolution in RESOLUTION_PRESETS {
        print_info(resolution.label, format!("{}x{}", resolution.width, resolution.height));
    }

    print_heading("Codec aliases");
    print_section("Video");
    for (alias, encoder) in VIDEO_CODEC_ALIASES {
        print_info(alias, encoder);
    }
    print_section("Audio");
    for (alias, encoder) in AUDIO_CODEC_ALIASES {
        print_info(alias, encoder);
    }
}

fn format_line(preset: &FormatPreset) -> String {
    let codecs = if preset.is_audio_only() {
        preset.audio_codec.unwrap_or("-").to_string()
    } else {
        format!("{} / {}", preset.video_codec.unwrap_or("-"), preset.audio_codec.unwrap_or("none"))
    };
    format!("{:<28} .{} {}", preset.description, preset.extension, codecs)
}
