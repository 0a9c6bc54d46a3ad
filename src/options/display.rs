use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
/// Window and frame presentation settings.
pub struct DisplayOptions {
    /// Clear color as an sRGB hex string (`#rrggbb`).
    pub background: String,
    /// Supersampling factor (0 = auto by display DPI, 1 = native, 2 = 2x SSAA).
    pub render_scale: u32,
    /// Frame limit (0 = unlimited).
    pub target_fps: u32,
    /// Present with vsync.
    pub vsync: bool,
    /// Initial window width in logical pixels.
    pub window_width: u32,
    /// Initial window height in logical pixels.
    pub window_height: u32,
}

impl Default for DisplayOptions {
    fn default() -> Self {
        Self {
            background: "#151520".to_owned(),
            render_scale: 0,
            target_fps: 0,
            vsync: true,
            window_width: 1280,
            window_height: 800,
        }
    }
}

impl DisplayOptions {
    /// Background color converted to linear RGB.
    ///
    /// Falls back to black when the hex string is malformed.
    #[must_use]
    pub fn background_linear(&self) -> [f32; 3] {
        parse_hex_color(&self.background).map_or([0.0; 3], |srgb| {
            srgb.map(srgb_to_linear)
        })
    }
}

/// Parse `#rrggbb` (leading `#` optional) into sRGB components in [0, 1].
#[must_use]
pub fn parse_hex_color(hex: &str) -> Option<[f32; 3]> {
    let hex = hex.trim().trim_start_matches('#');
    if hex.len() != 6 || !hex.is_ascii() {
        return None;
    }
    let channel = |i: usize| {
        u8::from_str_radix(&hex[i..i + 2], 16)
            .ok()
            .map(|c| f32::from(c) / 255.0)
    };
    Some([channel(0)?, channel(2)?, channel(4)?])
}

fn srgb_to_linear(c: f32) -> f32 {
    if c <= 0.04045 {
        c / 12.92
    } else {
        ((c + 0.055) / 1.055).powf(2.4)
    }
}
