//! Egui integration for the debug panel.
//!
//! This module provides egui UI support when the `egui` feature is enabled.

use std::sync::Arc;
use winit::window::Window;

/// Egui integration state.
///
/// Wraps egui context, winit state, and wgpu renderer.
pub(crate) struct EguiIntegration {
    pub ctx: egui::Context,
    state: egui_winit::State,
    renderer: egui_wgpu::Renderer,
}

/// Output from egui frame processing.
pub(crate) struct EguiFrameOutput {
    pub paint_jobs: Vec<egui::ClippedPrimitive>,
    pub textures_delta: egui::TexturesDelta,
    pub pixels_per_point: f32,
}

impl EguiIntegration {
    /// Create new egui integration.
    pub fn new(
        device: &wgpu::Device,
        output_format: wgpu::TextureFormat,
        window: &Arc<Window>,
    ) -> Self {
        let ctx = egui::Context::default();

        // Dark theme without shadows so the panel sits flat over the particles
        let mut style = egui::Style::default();
        style.visuals = egui::Visuals::dark();
        style.visuals.window_shadow = egui::Shadow::NONE;
        style.visuals.popup_shadow = egui::Shadow::NONE;
        ctx.set_style(style);

        let state = egui_winit::State::new(
            ctx.clone(),
            egui::ViewportId::ROOT,
            window.as_ref(),
            Some(window.scale_factor() as f32),
            None,
            None,
        );

        let renderer = egui_wgpu::Renderer::new(
            device,
            output_format,
            None,  // depth format
            1,     // msaa samples
            false, // dithering
        );

        Self { ctx, state, renderer }
    }

    /// Process a winit event.
    ///
    /// Returns true if egui consumed the event (don't pass to camera controls).
    pub fn on_window_event(&mut self, window: &Window, event: &winit::event::WindowEvent) -> bool {
        let response = self.state.on_window_event(window, event);
        response.consumed
    }

    /// Begin a new frame. Call before your UI code.
    pub fn begin_frame(&mut self, window: &Window) {
        let raw_input = self.state.take_egui_input(window);
        self.ctx.begin_pass(raw_input);
    }

    /// End the frame and get the output for rendering into a surface
    /// `target_width` physical pixels wide.
    pub fn end_frame(&mut self, window: &Window, target_width: u32) -> EguiFrameOutput {
        let full_output = self.ctx.end_pass();

        // Handle platform output (clipboard, cursor, etc.)
        self.state.handle_platform_output(window, full_output.platform_output);

        let pixels_per_point = target_pixels_per_point(
            full_output.pixels_per_point,
            target_width,
            window.inner_size().width,
        );
        let paint_jobs = self.ctx.tessellate(full_output.shapes, pixels_per_point);

        EguiFrameOutput {
            paint_jobs,
            textures_delta: full_output.textures_delta,
            pixels_per_point,
        }
    }

    /// Upload textures and buffers, then draw on top of `target`.
    pub fn render(
        &mut self,
        device: &wgpu::Device,
        queue: &wgpu::Queue,
        encoder: &mut wgpu::CommandEncoder,
        target: &wgpu::TextureView,
        output: EguiFrameOutput,
        size_in_pixels: [u32; 2],
    ) {
        let screen_descriptor = egui_wgpu::ScreenDescriptor {
            size_in_pixels,
            pixels_per_point: output.pixels_per_point,
        };

        for (id, image_delta) in &output.textures_delta.set {
            self.renderer.update_texture(device, queue, *id, image_delta);
        }
        self.renderer
            .update_buffers(device, queue, encoder, &output.paint_jobs, &screen_descriptor);

        {
            let mut pass = encoder
                .begin_render_pass(&wgpu::RenderPassDescriptor {
                    label: Some("Egui Pass"),
                    color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                        view: target,
                        resolve_target: None,
                        ops: wgpu::Operations {
                            load: wgpu::LoadOp::Load,
                            store: wgpu::StoreOp::Store,
                        },
                    })],
                    depth_stencil_attachment: None,
                    timestamp_writes: None,
                    occlusion_query_set: None,
                })
                .forget_lifetime();
            self.renderer
                .render(&mut pass, &output.paint_jobs, &screen_descriptor);
        }

        for id in &output.textures_delta.free {
            self.renderer.free_texture(id);
        }
    }
}

/// Pixels per point for drawing egui into a render target that is
/// `target_width` pixels wide while the window is `window_width` pixels wide.
///
/// egui lays out in window points. When the pixel ratio is capped the render
/// target is smaller than the window, so each point covers fewer target pixels.
pub(crate) fn target_pixels_per_point(egui_ppp: f32, target_width: u32, window_width: u32) -> f32 {
    if window_width == 0 {
        return egui_ppp;
    }
    egui_ppp * target_width as f32 / window_width as f32
}
