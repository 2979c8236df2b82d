use log::{debug, error, info, warn};

use crate::error::UpscalerError;
use crate::gpu::{CommandContext, FrameResources, GpuTexture, GraphicsDevice, RenderTargetPool, RendererKind};
use crate::ngx::{sdk_backend_factory, BackendFactory, EvalInputs, FeatureHandle};
use crate::platform::OsCheck;
use crate::prober::{probe, BackendContext};
use crate::upscale::{AppIdentity, Extent, FrameParameters, QualityTier, RecommendedSettings, SupportStatus};

struct FeatureSlot {
    handle: FeatureHandle,
    params: FrameParameters,
}

enum UpscalerState {
    Uninitialized,
    /// Probe deferred until the first frame that needs it.
    Pending(AppIdentity),
    Initialized(BackendContext),
    FeatureReady(BackendContext, FeatureSlot),
    ShuttingDown,
}

/// Observable lifecycle phase.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UpscalerPhase {
    Uninitialized,
    Pending,
    Initialized,
    FeatureReady,
    ShuttingDown,
}

/// One frame's worth of upscaling work.
pub struct UpscaleRequest<'a> {
    /// Low resolution color.
    pub color: &'a dyn GpuTexture,
    pub output: &'a dyn GpuTexture,
    pub quality: QualityTier,
    /// Pixel-space jitter.
    pub jitter_offset: [f32; 2],
    pub sharpness: f32,
}

/// Owns the NGX backend, its parameter objects and the cached feature for
/// one rendering device. Single threaded; every call blocks.
pub struct Upscaler {
    state: UpscalerState,
    support: SupportStatus,
    last_error: Option<UpscalerError>,
    factory: BackendFactory,
    os_check: OsCheck,
}

impl Default for Upscaler {
    fn default() -> Self {
        Self::new(sdk_backend_factory())
    }
}

impl Upscaler {
    pub fn new(factory: BackendFactory) -> Self {
        Self {
            state: UpscalerState::Uninitialized,
            support: SupportStatus::NotSupported,
            last_error: None,
            factory,
            os_check: OsCheck::Host,
        }
    }

    pub fn with_os_check(mut self, os_check: OsCheck) -> Self {
        self.os_check = os_check;
        self
    }

    pub fn support_status(&self) -> SupportStatus {
        self.support
    }

    /// Why the last initialization or frame failed, if it did.
    pub fn last_error(&self) -> Option<&UpscalerError> {
        self.last_error.as_ref()
    }

    pub fn phase(&self) -> UpscalerPhase {
        match self.state {
            UpscalerState::Uninitialized => UpscalerPhase::Uninitialized,
            UpscalerState::Pending(_) => UpscalerPhase::Pending,
            UpscalerState::Initialized(_) => UpscalerPhase::Initialized,
            UpscalerState::FeatureReady(..) => UpscalerPhase::FeatureReady,
            UpscalerState::ShuttingDown => UpscalerPhase::ShuttingDown,
        }
    }

    pub fn is_pending(&self) -> bool {
        matches!(self.state, UpscalerState::Pending(_))
    }

    pub fn renderer(&self) -> Option<RendererKind> {
        match &self.state {
            UpscalerState::Initialized(ctx) | UpscalerState::FeatureReady(ctx, _) => Some(ctx.kind()),
            _ => None,
        }
    }

    /// Key of the live feature.
    pub fn cached_parameters(&self) -> Option<FrameParameters> {
        match &self.state {
            UpscalerState::FeatureReady(_, slot) => Some(slot.params),
            _ => None,
        }
    }

    /// Probes `device` and keeps the backend if the upscaler can run.
    /// Anything left from a previous initialization is shut down first.
    pub fn initialize(&mut self, device: &dyn GraphicsDevice, identity: &AppIdentity) -> SupportStatus {
        self.shutdown();

        let outcome = probe(device, identity, self.os_check, &self.factory);
        self.support = outcome.status;
        self.last_error = outcome.error;
        if let Some(ctx) = outcome.context {
            self.state = UpscalerState::Initialized(ctx);
        }
        self.support
    }

    /// Records the identity and probes on the first [`Upscaler::ensure_initialized`].
    pub fn defer_initialization(&mut self, identity: AppIdentity) {
        self.shutdown();
        self.support = SupportStatus::NotSupported;
        self.last_error = None;
        debug!("[Upscaler] initialization deferred until first use");
        self.state = UpscalerState::Pending(identity);
    }

    /// Completes a deferred initialization; otherwise just reports the status.
    pub fn ensure_initialized(&mut self, device: &dyn GraphicsDevice) -> SupportStatus {
        if let UpscalerState::Pending(identity) = &self.state {
            let identity = identity.clone();
            info!("[Upscaler] running deferred initialization");
            return self.initialize(device, &identity);
        }
        self.support
    }

    /// Returns the feature for `params`, creating it if the key changed.
    /// On failure the previous feature, if any, stays live and cached.
    pub fn ensure_feature(
        &mut self,
        cmd: &mut dyn CommandContext,
        params: FrameParameters,
    ) -> Result<FeatureHandle, UpscalerError> {
        match &self.state {
            UpscalerState::FeatureReady(_, slot) if slot.params == params => return Ok(slot.handle),
            UpscalerState::Initialized(_) | UpscalerState::FeatureReady(..) => {}
            _ => return Err(UpscalerError::NotInitialized),
        }

        let (mut ctx, previous) = match std::mem::replace(&mut self.state, UpscalerState::ShuttingDown) {
            UpscalerState::Initialized(ctx) => (ctx, None),
            UpscalerState::FeatureReady(ctx, slot) => (ctx, Some(slot)),
            other => {
                self.state = other;
                return Err(UpscalerError::NotInitialized);
            }
        };

        match ctx.create_feature(cmd, &params) {
            Ok(handle) => {
                if let Some(previous) = previous {
                    ctx.release_feature(previous.handle);
                }
                self.state = UpscalerState::FeatureReady(ctx, FeatureSlot { handle, params });
                Ok(handle)
            }
            Err(e) => {
                self.state = match previous {
                    Some(slot) => UpscalerState::FeatureReady(ctx, slot),
                    None => UpscalerState::Initialized(ctx),
                };
                Err(e)
            }
        }
    }

    /// Per-frame entry point. Failures skip this frame's upscale and are logged.
    pub fn run(
        &mut self,
        cmd: &mut dyn CommandContext,
        pool: &mut dyn RenderTargetPool,
        frame: &dyn FrameResources,
        request: &UpscaleRequest<'_>,
    ) {
        if let Err(e) = self.evaluate(cmd, pool, frame, request) {
            match e {
                UpscalerError::NotInitialized => debug!("[Upscaler] skipping frame: {}", e),
                _ => error!("[Upscaler] skipping frame: {}", e),
            }
            self.last_error = Some(e);
        }
    }

    /// [`Upscaler::run`] with the error returned instead of logged.
    pub fn evaluate(
        &mut self,
        cmd: &mut dyn CommandContext,
        pool: &mut dyn RenderTargetPool,
        frame: &dyn FrameResources,
        request: &UpscaleRequest<'_>,
    ) -> Result<(), UpscalerError> {
        let sharpness = request.sharpness.clamp(-1.0, 1.0);
        let params = FrameParameters {
            source_size: request.color.size(),
            destination_size: request.output.size(),
            quality: request.quality,
            use_sharpening: sharpness != 0.0,
        };

        let feature = self.ensure_feature(cmd, params)?;
        let UpscalerState::FeatureReady(ctx, _) = &mut self.state else {
            return Err(UpscalerError::NotInitialized);
        };
        let eval_params = ctx.eval_params().ok_or(UpscalerError::NotInitialized)?;

        // Render targets that cannot be bound for unordered access get a scratch copy.
        let scratch = if request.output.is_unordered_access() {
            None
        } else {
            Some(pool.acquire(&request.output.description().with_unordered_access())?)
        };
        let target: &dyn GpuTexture = match &scratch {
            Some(texture) => texture.as_ref(),
            None => request.output,
        };

        let source = params.source_size;
        let inputs = EvalInputs {
            color: request.color,
            depth: frame.depth_buffer(),
            motion_vectors: frame.motion_vectors(),
            output: target,
            render_subrect: source,
            jitter_offset: request.jitter_offset,
            sharpness,
            motion_vector_scale: [source.width as f32, source.height as f32],
            reset_history: frame.is_camera_cut(),
            frame_delta_ms: frame.unscaled_delta_seconds() * 1000.0,
        };

        let backend = ctx.backend_mut();
        backend.prepare_resources(cmd, &inputs);
        cmd.flush_state();
        let result = backend
            .evaluate(cmd, feature, eval_params, &inputs)
            .map_err(UpscalerError::EvaluateFailed);

        if result.is_ok() {
            cmd.clear_state();
            if let Some(texture) = &scratch {
                cmd.copy_texture(request.output, texture.as_ref());
            }
        }
        if let Some(texture) = scratch {
            pool.release(texture);
        }
        result
    }

    /// Suggested render resolutions for `display`. Falls back to the display
    /// size with no sharpening whenever the SDK cannot be asked or fails.
    pub fn query(&mut self, display: Extent, quality: QualityTier) -> RecommendedSettings {
        let ctx = match &mut self.state {
            UpscalerState::Initialized(ctx) | UpscalerState::FeatureReady(ctx, _) => ctx,
            _ => return RecommendedSettings::identity(display),
        };
        let caps = ctx.capabilities();
        match ctx.backend_mut().optimal_settings(caps, display, quality) {
            Ok(settings) => settings,
            Err(status) => {
                warn!("[Upscaler] optimal settings query for {} failed: {}", display, status);
                RecommendedSettings::identity(display)
            }
        }
    }

    /// Releases the feature, the parameter objects and the SDK, in that
    /// order. Safe to call repeatedly.
    pub fn shutdown(&mut self) {
        match std::mem::replace(&mut self.state, UpscalerState::ShuttingDown) {
            UpscalerState::Initialized(ctx) => {
                info!("[Upscaler] shutting down {:?} backend", ctx.kind());
                ctx.teardown(None);
            }
            UpscalerState::FeatureReady(ctx, slot) => {
                info!("[Upscaler] shutting down {:?} backend", ctx.kind());
                ctx.teardown(Some(slot.handle));
            }
            UpscalerState::Pending(_) => debug!("[Upscaler] dropping deferred initialization"),
            UpscalerState::Uninitialized | UpscalerState::ShuttingDown => {}
        }
        self.state = UpscalerState::Uninitialized;
    }
}

impl Drop for Upscaler {
    fn drop(&mut self) {
        self.shutdown();
    }
}
