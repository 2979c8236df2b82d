//! Plugin shell around the core [`Upscaler`]: settings, lifecycle, quality
//! selection and the registered post effect.

use log::{info, warn};
use ngx_upscaler_core::{
    Extent, GpuTexture, GraphicsDevice, QualityTier, RecommendedSettings, SupportStatus, Upscaler,
};

use crate::postfx::{PostFxContext, RenderSetup, RenderTask, UpscalePostFx};
use crate::settings::UpscalerSettings;

pub struct UpscalerPlugin {
    settings: UpscalerSettings,
    upscaler: Upscaler,
    post_fx: Option<UpscalePostFx>,
    pub quality: QualityTier,
    /// Sharpening strength in [-1, 1]; clamped when used.
    pub sharpness: f32,
}

impl UpscalerPlugin {
    pub fn new(settings: UpscalerSettings) -> Self {
        Self::with_upscaler(settings, Upscaler::default())
    }

    pub fn with_upscaler(settings: UpscalerSettings, upscaler: Upscaler) -> Self {
        Self {
            quality: settings.quality,
            sharpness: settings.sharpness,
            settings,
            upscaler,
            post_fx: None,
        }
    }

    pub fn settings(&self) -> &UpscalerSettings {
        &self.settings
    }

    pub fn support_status(&self) -> SupportStatus {
        self.upscaler.support_status()
    }

    pub fn upscaler(&self) -> &Upscaler {
        &self.upscaler
    }

    pub fn upscaler_mut(&mut self) -> &mut Upscaler {
        &mut self.upscaler
    }

    /// The effect, once registered.
    pub fn post_fx(&self) -> Option<&UpscalePostFx> {
        self.post_fx.as_ref()
    }

    pub fn post_fx_mut(&mut self) -> Option<&mut UpscalePostFx> {
        self.post_fx.as_mut()
    }

    /// Probes the device (or defers the probe with `lazy_init`) and registers
    /// the post effect when the upscaler can run.
    pub fn initialize(&mut self, device: &dyn GraphicsDevice) -> SupportStatus {
        let identity = self.settings.identity();
        info!(
            "[Plugin] initializing upscaler with app id {}, project id '{}'",
            self.settings.app_id, self.settings.project_id
        );

        if self.settings.lazy_init {
            self.upscaler.defer_initialization(identity);
            self.post_fx = Some(UpscalePostFx::default());
            return self.upscaler.support_status();
        }

        let status = self.upscaler.initialize(device, &identity);
        if !status.is_supported() {
            warn!("[Plugin] upscaler is not supported on this platform: {}", status);
            return status;
        }
        self.post_fx = Some(UpscalePostFx::default());
        status
    }

    pub fn deinitialize(&mut self) {
        if self.post_fx.take().is_some() {
            info!("[Plugin] post effect unregistered");
        }
        self.upscaler.shutdown();
    }

    /// `quality` of `None` means the plugin's current quality.
    pub fn query_recommended_settings(&mut self, display: Extent, quality: Option<QualityTier>) -> RecommendedSettings {
        let quality = quality.unwrap_or(self.quality);
        self.upscaler.query(display, quality)
    }

    /// Sizes the task's render resolution to the recommended optimum and adopts
    /// the recommended sharpness.
    pub fn apply_recommended_settings(&mut self, task: Option<&mut dyn RenderTask>, quality: Option<QualityTier>) {
        let Some(task) = task else {
            return;
        };
        let output = task.output_viewport_size();
        let settings = self.query_recommended_settings(output, quality);
        task.set_rendering_percentage(settings.rendering_percentage(output));
        self.sharpness = settings.sharpness;
    }

    pub fn can_render(&mut self, device: &dyn GraphicsDevice) -> bool {
        match self.post_fx {
            Some(fx) => fx.can_render(&mut self.upscaler, device),
            None => false,
        }
    }

    pub fn pre_render(&self, task: &dyn RenderTask, setup: &mut dyn RenderSetup) {
        if let Some(fx) = &self.post_fx {
            fx.pre_render(task, setup);
        }
    }

    pub fn render(&mut self, ctx: &mut PostFxContext<'_>, input: &dyn GpuTexture, output: &dyn GpuTexture) {
        if let Some(fx) = self.post_fx {
            fx.render(&mut self.upscaler, ctx, input, output, self.quality, self.sharpness);
        }
    }
}
