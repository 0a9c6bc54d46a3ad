//! Centralized scene options with TOML preset support.
//!
//! Every tweakable setting (field layout, camera, lighting, post-processing,
//! display, key bindings) lives here. Options serialize to/from TOML for view
//! presets stored in `assets/view_presets/`.

mod camera;
mod display;
mod field;
mod lighting;
mod post_processing;

use std::path::Path;

pub use camera::CameraOptions;
pub use display::{parse_hex_color, DisplayOptions};
pub use field::{FieldOptions, STRIDE_CEILING};
pub use lighting::LightingOptions;
pub use post_processing::{PostProcessingOptions, ToneMapping};
use serde::{Deserialize, Serialize};

use crate::error::CubefieldError;
use crate::input::KeyBindings;

/// Top-level options container. All sub-structs use `#[serde(default)]` so
/// partial TOML files (e.g. only overriding `[field]`) work correctly.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
#[serde(default)]
pub struct Options {
    /// Cube lattice layout and cursor response.
    pub field: FieldOptions,
    /// Camera placement and orbit controls.
    pub camera: CameraOptions,
    /// Ambient and spot lighting.
    pub lighting: LightingOptions,
    /// SSAO, bloom and tone mapping.
    pub post_processing: PostProcessingOptions,
    /// Window and presentation settings.
    pub display: DisplayOptions,
    /// Keyboard bindings for discrete commands.
    pub keybindings: KeyBindings,
}

impl Options {
    /// Parse options from a TOML string. Missing fields use defaults.
    ///
    /// # Errors
    ///
    /// Returns [`CubefieldError::OptionsParse`] for malformed TOML or
    /// mistyped values.
    pub fn from_toml(content: &str) -> Result<Self, CubefieldError> {
        toml::from_str(content)
            .map_err(|e| CubefieldError::OptionsParse(e.to_string()))
    }

    /// Load options from a TOML file. Missing fields use defaults.
    ///
    /// # Errors
    ///
    /// Returns [`CubefieldError::Io`] if the file cannot be read, or
    /// [`CubefieldError::OptionsParse`] if its contents do not parse.
    pub fn load(path: &Path) -> Result<Self, CubefieldError> {
        let content =
            std::fs::read_to_string(path).map_err(CubefieldError::Io)?;
        let opts = Self::from_toml(&content)?;
        log::info!("loaded options preset from {}", path.display());
        Ok(opts)
    }

    /// Save options to a TOML file (pretty-printed), creating parent
    /// directories as needed.
    ///
    /// # Errors
    ///
    /// Returns [`CubefieldError::Io`] on filesystem failure.
    pub fn save(&self, path: &Path) -> Result<(), CubefieldError> {
        let content = toml::to_string_pretty(self)
            .map_err(|e| CubefieldError::OptionsParse(e.to_string()))?;
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(CubefieldError::Io)?;
        }
        std::fs::write(path, content).map_err(CubefieldError::Io)
    }

    /// List available preset names (TOML file stems) in a directory.
    #[must_use]
    pub fn list_presets(dir: &Path) -> Vec<String> {
        let mut names = Vec::new();
        if let Ok(entries) = std::fs::read_dir(dir) {
            for entry in entries.flatten() {
                let path = entry.path();
                if path.extension().is_some_and(|ext| ext == "toml") {
                    if let Some(stem) =
                        path.file_stem().and_then(|s| s.to_str())
                    {
                        names.push(stem.to_owned());
                    }
                }
            }
        }
        names.sort();
        names
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::command::FieldCommand;

    #[test]
    fn default_round_trips_through_toml() {
        let opts = Options::default();
        let toml_str = toml::to_string_pretty(&opts).unwrap();
        let parsed = Options::from_toml(&toml_str).unwrap();
        assert_eq!(opts, parsed);
    }

    #[test]
    fn partial_toml_fills_defaults() {
        let toml_str = r"
[field]
stride = 6
";
        let opts = Options::from_toml(toml_str).unwrap();
        assert_eq!(opts.field.stride, 6);
        assert_eq!(opts.field.instance_count(), 216);
        assert_eq!(opts.field.gap, 0.1);
        assert_eq!(opts.camera.fovy, 20.0);
        assert_eq!(opts.post_processing.bloom_levels, 7);
        assert_eq!(opts.post_processing.tone_mapping, ToneMapping::Clamp);
    }

    #[test]
    fn preset_stride_is_bounded() {
        let opts = Options::from_toml("[field]\nstride = 5000\n").unwrap();
        assert_eq!(opts.field.clamped_stride(), 16);
        assert_eq!(opts.field.instance_count(), 4096);

        let opts =
            Options::from_toml("[field]\nstride = 5000\nmax_stride = 9000\n")
                .unwrap();
        assert_eq!(opts.field.stride_limit(), STRIDE_CEILING);
    }

    #[test]
    fn defaults_match_scene() {
        let opts = Options::default();
        assert_eq!(opts.camera.position, [15.0, 15.0, 15.0]);
        assert!(!opts.camera.enable_zoom);
        assert_eq!(opts.lighting.spot_position, [-10.0, 20.0, 20.0]);
        assert!((opts.lighting.ambient - std::f32::consts::FRAC_PI_2).abs() < 1e-6);
        assert_eq!(opts.post_processing.bloom_threshold, 2.0);
        assert_eq!(opts.display.background, "#151520");
    }

    #[test]
    fn malformed_toml_is_an_options_error() {
        let err = Options::from_toml("[field]\nstride = \"four\"").unwrap_err();
        assert!(matches!(err, CubefieldError::OptionsParse(_)));
    }

    #[test]
    fn keybinding_lookup() {
        let opts = Options::default();
        assert_eq!(
            opts.keybindings.lookup("KeyQ"),
            Some(FieldCommand::RecenterCamera)
        );
        assert_eq!(
            opts.keybindings.lookup("Equal"),
            Some(FieldCommand::GrowStride)
        );
        assert_eq!(opts.keybindings.lookup("KeyZ"), None);
    }

    #[test]
    fn rebound_key_survives_parse() {
        let toml_str = r#"
[keybindings.bindings]
Space = "toggle_rotation"
"#;
        let opts = Options::from_toml(toml_str).unwrap();
        assert_eq!(
            opts.keybindings.lookup("Space"),
            Some(FieldCommand::ToggleRotation)
        );
        assert_eq!(opts.keybindings.lookup("KeyP"), None);
    }

    #[test]
    fn background_hex_parses_to_linear() {
        let display = DisplayOptions::default();
        let [r, g, b] = display.background_linear();
        assert!(r > 0.0 && r < 0.02);
        assert!(b > r);
        assert_eq!(g, r);
        assert!(parse_hex_color("#zzzzzz").is_none());
        assert_eq!(parse_hex_color("ffffff"), Some([1.0, 1.0, 1.0]));
    }

    #[test]
    fn shipped_presets_parse() {
        let stock =
            Options::from_toml(include_str!("../../assets/view_presets/default.toml"))
                .unwrap();
        assert_eq!(stock.field, FieldOptions::default());
        assert_eq!(stock.camera, CameraOptions::default());
        assert_eq!(stock.keybindings, KeyBindings::default());
        assert_eq!(stock.display, DisplayOptions::default());
        assert!((stock.lighting.ambient - std::f32::consts::FRAC_PI_2).abs() < 1e-6);

        let dense =
            Options::from_toml(include_str!("../../assets/view_presets/dense.toml"))
                .unwrap();
        assert_eq!(dense.field.stride, 8);
        assert_eq!(dense.field.max_stride, 16);
        assert!(dense.camera.enable_zoom);
        assert_eq!(dense.post_processing.tone_mapping, ToneMapping::AcesFilmic);
        assert_eq!(dense.display, DisplayOptions::default());

        let names = Options::list_presets(Path::new(concat!(
            env!("CARGO_MANIFEST_DIR"),
            "/assets/view_presets"
        )));
        assert_eq!(names, vec!["default".to_owned(), "dense".to_owned()]);
    }

    #[test]
    fn save_and_load_preset() {
        let dir = std::env::temp_dir().join("cubefield-options-test");
        let path = dir.join("wide.toml");
        let mut opts = Options::default();
        opts.field.stride = 8;
        opts.save(&path).unwrap();
        let loaded = Options::load(&path).unwrap();
        assert_eq!(loaded.field.stride, 8);
        assert!(Options::list_presets(&dir).contains(&"wide".to_owned()));
        let _ = std::fs::remove_dir_all(&dir);
    }
}
