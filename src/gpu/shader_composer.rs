use std::borrow::Cow;

use naga_oil::compose::{
    ComposableModuleDescriptor, Composer, NagaModuleDescriptor, ShaderLanguage,
    ShaderType,
};

use crate::error::CubefieldError;

/// Every shader the renderer builds a pipeline from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Shader {
    /// Instanced rounded-box geometry pass (HDR color + normals).
    Cube,
    /// Depth-only cube pass from the spot light.
    CubeShadow,
    /// Hemisphere-kernel ambient occlusion.
    Ssao,
    /// 4×4 box blur over the raw AO term.
    SsaoBlur,
    /// Soft luminance threshold into the first bloom level.
    BloomThreshold,
    /// Separable Gaussian blur for one bloom level.
    BloomBlur,
    /// Tent-filtered additive upsample between bloom levels.
    BloomUpsample,
    /// AO, bloom, exposure and tone mapping into the swapchain.
    Composite,
}

impl Shader {
    /// All shaders, in pipeline creation order.
    pub const ALL: [Self; 8] = [
        Self::Cube,
        Self::CubeShadow,
        Self::Ssao,
        Self::SsaoBlur,
        Self::BloomThreshold,
        Self::BloomBlur,
        Self::BloomUpsample,
        Self::Composite,
    ];

    fn source(self) -> &'static str {
        match self {
            Self::Cube => include_str!("../../assets/shaders/raster/cube.wgsl"),
            Self::CubeShadow => {
                include_str!("../../assets/shaders/raster/cube_shadow.wgsl")
            }
            Self::Ssao => include_str!("../../assets/shaders/screen/ssao.wgsl"),
            Self::SsaoBlur => {
                include_str!("../../assets/shaders/screen/ssao_blur.wgsl")
            }
            Self::BloomThreshold => {
                include_str!("../../assets/shaders/screen/bloom_threshold.wgsl")
            }
            Self::BloomBlur => {
                include_str!("../../assets/shaders/screen/bloom_blur.wgsl")
            }
            Self::BloomUpsample => {
                include_str!("../../assets/shaders/screen/bloom_upsample.wgsl")
            }
            Self::Composite => {
                include_str!("../../assets/shaders/screen/composite.wgsl")
            }
        }
    }

    fn file_path(self) -> &'static str {
        match self {
            Self::Cube => "raster/cube.wgsl",
            Self::CubeShadow => "raster/cube_shadow.wgsl",
            Self::Ssao => "screen/ssao.wgsl",
            Self::SsaoBlur => "screen/ssao_blur.wgsl",
            Self::BloomThreshold => "screen/bloom_threshold.wgsl",
            Self::BloomBlur => "screen/bloom_blur.wgsl",
            Self::BloomUpsample => "screen/bloom_upsample.wgsl",
            Self::Composite => "screen/composite.wgsl",
        }
    }
}

/// Shared modules in dependency order: `(source, file_path)`.
const SHARED_MODULES: [(&str, &str); 3] = [
    (
        include_str!("../../assets/shaders/modules/fullscreen.wgsl"),
        "modules/fullscreen.wgsl",
    ),
    (
        include_str!("../../assets/shaders/modules/camera.wgsl"),
        "modules/camera.wgsl",
    ),
    (
        include_str!("../../assets/shaders/modules/lighting.wgsl"),
        "modules/lighting.wgsl",
    ),
];

/// Wraps `naga_oil::compose::Composer` to provide shader composition with
/// `#import` support.
///
/// Shared WGSL modules are registered once at construction. Consuming
/// shaders use `#import cubefield::module_name` to pull them in. The
/// composer produces `naga::Module` IR directly, skipping a WGSL re-parse
/// at pipeline creation.
pub struct ShaderComposer {
    composer: Composer,
}

impl ShaderComposer {
    /// Create a composer with every shared module registered.
    ///
    /// # Errors
    ///
    /// Returns [`CubefieldError::ShaderCompose`] if a shared module fails to
    /// parse.
    pub fn new() -> Result<Self, CubefieldError> {
        let mut composer = Composer::default();
        for (source, file_path) in SHARED_MODULES {
            let _ = composer
                .add_composable_module(ComposableModuleDescriptor {
                    source,
                    file_path,
                    language: ShaderLanguage::Wgsl,
                    ..Default::default()
                })
                .map_err(|e| {
                    CubefieldError::ShaderCompose(format!(
                        "module '{file_path}': {e}"
                    ))
                })?;
        }
        Ok(Self { composer })
    }

    /// Compose `shader` into a `wgpu::ShaderModule` ready for pipeline
    /// creation.
    ///
    /// # Errors
    ///
    /// Returns [`CubefieldError::ShaderCompose`] if composition fails.
    pub fn compose(
        &mut self,
        device: &wgpu::Device,
        shader: Shader,
    ) -> Result<wgpu::ShaderModule, CubefieldError> {
        let module = self.compose_naga(shader)?;
        Ok(device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some(shader.file_path()),
            source: wgpu::ShaderSource::Naga(Cow::Owned(module)),
        }))
    }

    /// Compose `shader` into naga IR without a device.
    ///
    /// # Errors
    ///
    /// Returns [`CubefieldError::ShaderCompose`] if composition fails.
    pub fn compose_naga(
        &mut self,
        shader: Shader,
    ) -> Result<naga::Module, CubefieldError> {
        let file_path = shader.file_path();
        self.composer
            .make_naga_module(NagaModuleDescriptor {
                source: shader.source(),
                file_path,
                shader_type: ShaderType::Wgsl,
                ..Default::default()
            })
            .map_err(|e| {
                CubefieldError::ShaderCompose(format!("'{file_path}': {e}"))
            })
    }
}

#[cfg(test)]
mod tests {
    use naga::valid::{Capabilities, ValidationFlags, Validator};

    use super::*;

    #[test]
    fn all_shaders_compose_and_validate() {
        let mut composer = ShaderComposer::new().unwrap();
        for shader in Shader::ALL {
            let module = composer
                .compose_naga(shader)
                .unwrap_or_else(|e| panic!("{shader:?}: {e}"));
            let _ = Validator::new(ValidationFlags::all(), Capabilities::empty())
                .validate(&module)
                .unwrap_or_else(|e| panic!("{shader:?} failed validation: {e:?}"));
        }
    }

    #[test]
    fn shaders_export_expected_entry_points() {
        let mut composer = ShaderComposer::new().unwrap();
        for shader in Shader::ALL {
            let module = composer.compose_naga(shader).unwrap();
            let names: Vec<&str> =
                module.entry_points.iter().map(|ep| ep.name.as_str()).collect();
            assert!(names.contains(&"vs_main"), "{shader:?} has no vs_main");
            if shader != Shader::CubeShadow {
                assert!(names.contains(&"fs_main"), "{shader:?} has no fs_main");
            }
        }
    }
}
