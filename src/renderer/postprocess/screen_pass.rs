//! Shared interface of the fullscreen passes.

use crate::gpu::render_context::RenderContext;
use crate::renderer::postprocess::post_process::SceneTargets;

/// Uniform interface for fullscreen passes that read the scene targets and
/// write into textures they own.
pub trait ScreenPass {
    /// Encode GPU commands for this pass.
    fn render(&self, encoder: &mut wgpu::CommandEncoder);
    /// Recreate resolution-dependent resources against freshly allocated
    /// scene targets.
    fn resize(&mut self, context: &RenderContext, targets: &SceneTargets);
}
