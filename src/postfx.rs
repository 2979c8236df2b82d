//! Post-process effect that swaps the engine's upscale pass for NGX.

use log::trace;
use ngx_upscaler_core::{
    CommandContext, Extent, FrameResources, GpuTexture, GraphicsDevice, QualityTier, RenderTargetPool, UpscaleRequest,
    Upscaler,
};

/// Where in the post-processing chain an effect runs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PostEffectLocation {
    BeforePostProcessing,
    AfterPostProcessing,
    /// Replaces the built-in upscaler.
    CustomUpscale,
}

/// Where the renderer performs its resolution upscale.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UpscaleLocation {
    BeforePostProcessing,
    AfterPostProcessing,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AntiAliasingMode {
    None,
    Fxaa,
    TemporalAa,
    Smaa,
}

/// The render task driving a view.
pub trait RenderTask {
    fn output_viewport_size(&self) -> Extent;
    /// Render resolution as a fraction of the output viewport.
    fn rendering_percentage(&self) -> f32;
    fn set_rendering_percentage(&mut self, percentage: f32);
}

/// Per-frame render list setup the effect may override before rendering.
pub trait RenderSetup {
    fn set_upscale_location(&mut self, location: UpscaleLocation);
    fn set_temporal_jitter(&mut self, enabled: bool);
    fn set_anti_aliasing(&mut self, mode: AntiAliasingMode);
}

/// Host objects borrowed for one `render` call.
pub struct PostFxContext<'a> {
    pub cmd: &'a mut dyn CommandContext,
    pub pool: &'a mut dyn RenderTargetPool,
    pub frame: &'a dyn FrameResources,
}

/// Jitter in pixels from the view's normalized temporal jitter.
pub fn pixel_jitter(frame: &dyn FrameResources) -> [f32; 2] {
    let jitter = frame.temporal_jitter();
    let screen = frame.screen_size();
    [
        jitter[0] * screen.width as f32 / 2.0,
        jitter[1] * screen.height as f32 / 2.0,
    ]
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UpscalePostFx {
    pub enabled: bool,
}

impl Default for UpscalePostFx {
    fn default() -> Self {
        Self { enabled: true }
    }
}

impl UpscalePostFx {
    pub const LOCATION: PostEffectLocation = PostEffectLocation::CustomUpscale;

    /// Finishes a deferred initialization if needed, then requires `Supported`.
    pub fn can_render(&self, upscaler: &mut Upscaler, device: &dyn GraphicsDevice) -> bool {
        self.enabled && upscaler.ensure_initialized(device).is_supported()
    }

    /// At full resolution there is nothing to upscale and the view keeps its
    /// own settings. Otherwise the upscale moves ahead of post-processing and
    /// NGX takes over anti-aliasing from jittered input.
    pub fn pre_render(&self, task: &dyn RenderTask, setup: &mut dyn RenderSetup) {
        if task.rendering_percentage() >= 1.0 {
            return;
        }
        setup.set_upscale_location(UpscaleLocation::BeforePostProcessing);
        setup.set_temporal_jitter(true);
        setup.set_anti_aliasing(AntiAliasingMode::None);
    }

    pub fn render(
        &self,
        upscaler: &mut Upscaler,
        ctx: &mut PostFxContext<'_>,
        input: &dyn GpuTexture,
        output: &dyn GpuTexture,
        quality: QualityTier,
        sharpness: f32,
    ) {
        let jitter_offset = pixel_jitter(ctx.frame);
        trace!("[PostFx] upscale {} -> {} jitter {:?}", input.size(), output.size(), jitter_offset);
        let request = UpscaleRequest { color: input, output, quality, jitter_offset, sharpness };
        upscaler.run(ctx.cmd, ctx.pool, ctx.frame, &request);
    }
}
