pub mod pipeline;

use std::sync::Arc;

use anyhow::Context;
use winit::window::Window;

use self::pipeline::UpscalePipeline;
use crate::canvas::Canvas;
use crate::driver::Presenter;

/// Core GPU state: device, queue, surface, upscale pipeline.
///
/// Fields drop top to bottom, so teardown runs in reverse acquisition order:
/// canvas texture and pipeline, then the surface, then the device.
pub struct GpuState {
    pub upscale: UpscalePipeline,
    pub surface: wgpu::Surface<'static>,
    pub surface_config: wgpu::SurfaceConfiguration,
    pub queue: wgpu::Queue,
    pub device: wgpu::Device,
}

impl GpuState {
    /// Initialize wgpu for `window` and a canvas texture of the given size.
    pub fn new(window: Arc<Window>, canvas_w: u32, canvas_h: u32) -> anyhow::Result<Self> {
        let size = window.inner_size();

        let instance = wgpu::Instance::new(&wgpu::InstanceDescriptor::default());

        let surface = instance
            .create_surface(window)
            .context("failed to create wgpu surface")?;

        let adapter = pollster::block_on(instance.request_adapter(&wgpu::RequestAdapterOptions {
            power_preference: wgpu::PowerPreference::LowPower,
            compatible_surface: Some(&surface),
            force_fallback_adapter: false,
        }))
        .context("no suitable GPU adapter found")?;

        log::info!(
            "GPU adapter: {:?} ({:?})",
            adapter.get_info().name,
            adapter.get_info().backend
        );

        let (device, queue) = pollster::block_on(adapter.request_device(
            &wgpu::DeviceDescriptor {
                label: Some("runcat_device"),
                required_features: wgpu::Features::empty(),
                required_limits: wgpu::Limits::default(),
                ..Default::default()
            },
        ))
        .context("failed to create wgpu device")?;

        let surface_caps = surface.get_capabilities(&adapter);

        let format = surface_caps
            .formats
            .iter()
            .find(|f| f.is_srgb())
            .copied()
            .or_else(|| surface_caps.formats.first().copied())
            .context("surface reports no texture formats")?;

        let alpha_mode = surface_caps
            .alpha_modes
            .first()
            .copied()
            .unwrap_or(wgpu::CompositeAlphaMode::Auto);

        // Fifo is vsync: one step per display refresh, always supported.
        let present_mode = wgpu::PresentMode::Fifo;

        log::info!(
            "Surface: format={:?}, alpha_mode={:?}, present_mode={:?}",
            format,
            alpha_mode,
            present_mode,
        );

        let surface_config = wgpu::SurfaceConfiguration {
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
            format,
            width: size.width.max(1),
            height: size.height.max(1),
            present_mode,
            alpha_mode,
            view_formats: vec![],
            desired_maximum_frame_latency: 2,
        };
        surface.configure(&device, &surface_config);

        let upscale = UpscalePipeline::new(&device, format, canvas_w, canvas_h);

        Ok(Self {
            upscale,
            surface,
            surface_config,
            queue,
            device,
        })
    }

    /// Resize the surface.
    pub fn resize(&mut self, width: u32, height: u32) {
        if width == 0 || height == 0 {
            return;
        }
        self.surface_config.width = width;
        self.surface_config.height = height;
        self.surface.configure(&self.device, &self.surface_config);
    }

    /// Acquire the next surface texture.
    /// Returns None if the surface is lost/outdated (caller should skip this frame).
    fn acquire(&self) -> Option<wgpu::SurfaceTexture> {
        match self.surface.get_current_texture() {
            Ok(output) => Some(output),
            Err(wgpu::SurfaceError::Lost | wgpu::SurfaceError::Outdated) => {
                self.surface.configure(&self.device, &self.surface_config);
                None
            }
            Err(wgpu::SurfaceError::OutOfMemory) => {
                log::error!("GPU out of memory");
                None
            }
            Err(e) => {
                log::warn!("Surface error: {e:?}");
                None
            }
        }
    }
}

impl Presenter for GpuState {
    /// Upload the canvas and draw it stretched over the whole window.
    fn present(&mut self, canvas: &Canvas) {
        self.upscale.upload(&self.queue, canvas.as_bytes());

        let Some(output) = self.acquire() else {
            return;
        };

        let view = output
            .texture
            .create_view(&wgpu::TextureViewDescriptor::default());

        let mut encoder = self
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("frame_encoder"),
            });

        {
            let mut render_pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("upscale_render_pass"),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view: &view,
                    resolve_target: None,
                    depth_slice: None,
                    ops: wgpu::Operations {
                        load: wgpu::LoadOp::Clear(wgpu::Color::BLACK),
                        store: wgpu::StoreOp::Store,
                    },
                })],
                depth_stencil_attachment: None,
                timestamp_writes: None,
                occlusion_query_set: None,
            });

            render_pass.set_pipeline(&self.upscale.pipeline);
            render_pass.set_bind_group(0, &self.upscale.bind_group, &[]);
            render_pass.draw(0..3, 0..1); // fullscreen triangle
        }

        self.queue.submit(std::iter::once(encoder.finish()));
        output.present();
    }
}
