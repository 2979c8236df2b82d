//! Texture marshaling and state transitions around the evaluate call.

use std::ffi::c_void;
use std::path::Path;

use ash::vk::Handle;
use ngx_sys::{NgxImageViewInfoVk, NgxResourceVk, VkImageSubresourceRange, WChar};

use super::params::ParameterMap;
use super::EvalInputs;
use crate::error::NgxStatus;
use crate::gpu::{CommandContext, GpuError, GpuTexture, ResourceState};

/// D3D12 wants the output writable and every input shader-readable before evaluation.
pub fn transition_for_evaluate(cmd: &mut dyn CommandContext, inputs: &EvalInputs<'_>) {
    cmd.set_resource_state(inputs.output, ResourceState::UNORDERED_ACCESS);
    cmd.set_resource_state(inputs.color, ResourceState::SHADER_READ);
    cmd.set_resource_state(inputs.depth, ResourceState::SHADER_READ);
    if let Some(motion_vectors) = inputs.motion_vectors {
        cmd.set_resource_state(motion_vectors, ResourceState::SHADER_READ);
    }
}

/// Runs a D3D12 evaluate, then makes the host rebind its descriptor heaps and
/// root signature, which NGX replaces on the list. The rebind happens on failure too.
pub fn evaluate_then_rebind(
    cmd: &mut dyn CommandContext,
    evaluate: impl FnOnce(&mut dyn CommandContext) -> NgxStatus,
) -> Result<(), NgxStatus> {
    let status = evaluate(cmd);
    cmd.force_rebind_descriptors();
    status.check()
}

/// NGX descriptor for a Vulkan texture. `None` in, `None` out, nothing is touched.
/// Read-write follows the texture's unordered-access flag.
pub fn vulkan_resource(texture: Option<&dyn GpuTexture>) -> Result<Option<NgxResourceVk>, GpuError> {
    let Some(texture) = texture else {
        return Ok(None);
    };
    let view = texture.vulkan_view().ok_or(GpuError::MissingVulkanView)?;
    let range = view.subresource_range;
    let info = NgxImageViewInfoVk {
        image_view: view.view.as_raw(),
        image: view.image.as_raw(),
        subresource_range: VkImageSubresourceRange {
            aspect_mask: range.aspect_mask.as_raw(),
            base_mip_level: range.base_mip_level,
            level_count: range.level_count,
            base_array_layer: range.base_array_layer,
            layer_count: range.layer_count,
        },
        format: view.format.as_raw(),
        width: view.width,
        height: view.height,
    };
    Ok(Some(NgxResourceVk::image_view(info, texture.is_unordered_access())))
}

/// Descriptors for one Vulkan evaluation. They must stay alive until the
/// evaluate call returns since NGX only receives pointers to them.
pub struct VulkanEvalResources {
    pub color: Option<NgxResourceVk>,
    pub depth: Option<NgxResourceVk>,
    pub motion_vectors: Option<NgxResourceVk>,
    pub output: Option<NgxResourceVk>,
}

impl VulkanEvalResources {
    pub fn marshal(inputs: &EvalInputs<'_>) -> Result<Self, GpuError> {
        Ok(Self {
            color: vulkan_resource(Some(inputs.color))?,
            depth: vulkan_resource(Some(inputs.depth))?,
            motion_vectors: vulkan_resource(inputs.motion_vectors)?,
            output: vulkan_resource(Some(inputs.output))?,
        })
    }

    /// Points Color, Output, Depth and MotionVectors at these descriptors.
    /// `self` has to stay put until the evaluate call returns.
    pub fn bind(&mut self, map: &mut impl ParameterMap) {
        map.set_ptr(ngx_sys::PARAM_COLOR, descriptor_ptr(&mut self.color));
        map.set_ptr(ngx_sys::PARAM_OUTPUT, descriptor_ptr(&mut self.output));
        map.set_ptr(ngx_sys::PARAM_DEPTH, descriptor_ptr(&mut self.depth));
        map.set_ptr(ngx_sys::PARAM_MOTION_VECTORS, descriptor_ptr(&mut self.motion_vectors));
    }
}

/// Pointer handed to `SetVoidPointer`; null for an absent descriptor.
pub fn descriptor_ptr(resource: &mut Option<NgxResourceVk>) -> *mut c_void {
    match resource {
        Some(resource) => resource as *mut NgxResourceVk as *mut c_void,
        None => std::ptr::null_mut(),
    }
}

/// NUL-terminated `wchar_t` string for the SDK's data path argument.
pub fn to_wide(path: &Path) -> Vec<WChar> {
    #[cfg(windows)]
    let mut wide: Vec<WChar> = {
        use std::os::windows::ffi::OsStrExt;
        path.as_os_str().encode_wide().collect()
    };
    #[cfg(not(windows))]
    let mut wide: Vec<WChar> = path.to_string_lossy().chars().map(|c| c as WChar).collect();
    wide.push(0);
    wide
}

#[cfg(test)]
mod tests {
    use ash::vk;

    use super::*;
    use crate::gpu::{TextureFlags, VulkanImageView};
    use crate::mock::{Command, Event, Journal, MockTexture, RecordingContext};
    use crate::ngx::params::tests::{MapParameters, Value};
    use crate::upscale::Extent;

    fn vk_texture(id: usize, width: u32, height: u32, flags: TextureFlags) -> MockTexture {
        let mut texture = MockTexture::new(id, width, height, flags);
        texture.vulkan = Some(VulkanImageView {
            image: vk::Image::from_raw(0x100 + id as u64),
            view: vk::ImageView::from_raw(0x200 + id as u64),
            format: vk::Format::R16G16B16A16_SFLOAT,
            subresource_range: vk::ImageSubresourceRange {
                aspect_mask: vk::ImageAspectFlags::COLOR,
                base_mip_level: 0,
                level_count: 1,
                base_array_layer: 0,
                layer_count: 1,
            },
            width,
            height,
        });
        texture
    }

    fn inputs<'a>(
        color: &'a MockTexture,
        depth: &'a MockTexture,
        motion_vectors: Option<&'a MockTexture>,
        output: &'a MockTexture,
    ) -> EvalInputs<'a> {
        EvalInputs {
            color,
            depth,
            motion_vectors: motion_vectors.map(|t| t as &dyn GpuTexture),
            output,
            render_subrect: color.size(),
            jitter_offset: [0.0, 0.0],
            sharpness: 0.0,
            motion_vector_scale: [color.width() as f32, color.height() as f32],
            reset_history: false,
            frame_delta_ms: 16.0,
        }
    }

    #[test]
    fn test_d3d12_transitions() {
        let color = MockTexture::new(1, 1280, 720, TextureFlags::SHADER_RESOURCE);
        let depth = MockTexture::new(2, 1280, 720, TextureFlags::DEPTH_STENCIL);
        let mv = MockTexture::new(3, 1280, 720, TextureFlags::SHADER_RESOURCE);
        let output = MockTexture::new(4, 2560, 1440, TextureFlags::UNORDERED_ACCESS);
        let mut cmd = RecordingContext::default();

        transition_for_evaluate(&mut cmd, &inputs(&color, &depth, Some(&mv), &output));
        assert_eq!(
            cmd.commands,
            vec![
                Command::SetState(4, 0x8),
                Command::SetState(1, 0xC0),
                Command::SetState(2, 0xC0),
                Command::SetState(3, 0xC0),
            ]
        );

        let mut cmd = RecordingContext::default();
        transition_for_evaluate(&mut cmd, &inputs(&color, &depth, None, &output));
        assert_eq!(cmd.commands.len(), 3);
    }

    #[test]
    fn test_null_texture_gives_null_descriptor() {
        let mut resource = vulkan_resource(None).unwrap();
        assert!(resource.is_none());
        assert!(descriptor_ptr(&mut resource).is_null());
    }

    #[test]
    fn test_vulkan_descriptor_contents() {
        let texture = vk_texture(7, 1920, 1080, TextureFlags::UNORDERED_ACCESS);
        let mut resource = vulkan_resource(Some(&texture)).unwrap();
        let info = resource.unwrap().image_view_info().unwrap();
        assert_eq!(info.image, 0x107);
        assert_eq!(info.image_view, 0x207);
        assert_eq!((info.width, info.height), (1920, 1080));
        assert_eq!(info.format, vk::Format::R16G16B16A16_SFLOAT.as_raw());
        assert_eq!(info.subresource_range.aspect_mask, vk::ImageAspectFlags::COLOR.as_raw());
        assert_eq!(info.subresource_range.layer_count, 1);
        assert!(resource.unwrap().read_write);
        assert!(!descriptor_ptr(&mut resource).is_null());
    }

    #[test]
    fn test_missing_view_is_an_error() {
        let texture = MockTexture::new(1, 64, 64, TextureFlags::SHADER_RESOURCE);
        assert!(matches!(vulkan_resource(Some(&texture)), Err(GpuError::MissingVulkanView)));
    }

    #[test]
    fn test_marshal_eval_resources() {
        let color = vk_texture(1, 1280, 720, TextureFlags::SHADER_RESOURCE);
        let depth = vk_texture(2, 1280, 720, TextureFlags::DEPTH_STENCIL);
        let output = vk_texture(3, 2560, 1440, TextureFlags::UNORDERED_ACCESS);
        let res = VulkanEvalResources::marshal(&inputs(&color, &depth, None, &output)).unwrap();
        assert!(res.motion_vectors.is_none());
        assert!(!res.color.unwrap().read_write);
        assert!(!res.depth.unwrap().read_write);
        assert!(res.output.unwrap().read_write);
        assert_eq!(res.output.unwrap().image_view_info().map(|i| i.width), Some(2560));
        assert_eq!(color.size(), Extent::new(1280, 720));
    }

    #[test]
    fn test_read_write_follows_unordered_access() {
        let color = vk_texture(1, 1280, 720, TextureFlags::SHADER_RESOURCE | TextureFlags::UNORDERED_ACCESS);
        let depth = vk_texture(2, 1280, 720, TextureFlags::DEPTH_STENCIL);
        let output = vk_texture(3, 2560, 1440, TextureFlags::RENDER_TARGET);
        let res = VulkanEvalResources::marshal(&inputs(&color, &depth, None, &output)).unwrap();
        assert!(res.color.unwrap().read_write);
        assert!(!res.depth.unwrap().read_write);
        assert!(!res.output.unwrap().read_write);
    }

    #[test]
    fn test_vulkan_bind_points_at_descriptors() {
        let color = vk_texture(1, 1280, 720, TextureFlags::SHADER_RESOURCE);
        let depth = vk_texture(2, 1280, 720, TextureFlags::DEPTH_STENCIL);
        let output = vk_texture(3, 2560, 1440, TextureFlags::UNORDERED_ACCESS);
        let mut res = VulkanEvalResources::marshal(&inputs(&color, &depth, None, &output)).unwrap();
        let mut map = MapParameters::default();
        res.bind(&mut map);

        let addr = |r: &Option<NgxResourceVk>| r.as_ref().map(|r| Value::Ptr(r as *const NgxResourceVk as usize));
        assert_eq!(map.get(ngx_sys::PARAM_COLOR), addr(&res.color));
        assert_eq!(map.get(ngx_sys::PARAM_OUTPUT), addr(&res.output));
        assert_eq!(map.get(ngx_sys::PARAM_DEPTH), addr(&res.depth));
        assert_eq!(map.get(ngx_sys::PARAM_MOTION_VECTORS), Some(Value::Ptr(0)));
    }

    #[test]
    fn test_rebind_follows_evaluate() {
        let journal = Journal::default();
        let mut cmd = RecordingContext::with_journal(&journal);
        let mut commands_at_evaluate = None;
        let result = evaluate_then_rebind(&mut cmd, |_| {
            commands_at_evaluate = Some(journal.borrow().len());
            NgxStatus::SUCCESS
        });
        assert_eq!(result, Ok(()));
        assert_eq!(commands_at_evaluate, Some(0));
        assert_eq!(journal.borrow().as_slice(), &[Event::Cmd(Command::Rebind)]);
    }

    #[test]
    fn test_rebind_even_when_evaluate_fails() {
        let mut cmd = RecordingContext::default();
        let result = evaluate_then_rebind(&mut cmd, |_| NgxStatus::INVALID_PARAMETER);
        assert_eq!(result, Err(NgxStatus::INVALID_PARAMETER));
        assert_eq!(cmd.commands, vec![Command::Rebind]);
    }

    #[test]
    fn test_wide_path_is_nul_terminated() {
        let wide = to_wide(Path::new("ngx"));
        assert_eq!(wide.len(), 4);
        assert_eq!(wide[0], 'n' as WChar);
        assert_eq!(wide[3], 0);
    }
}
