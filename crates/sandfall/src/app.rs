//! Window, input forwarding and frame presentation
//!
//! The window thread never touches simulation state. Pointer and keyboard
//! input goes to the simulation thread through its bounded queue; frames
//! come back through the render bridge, and each publish wakes the event
//! loop with an [`AppEvent::FrameReady`] user event.

use anyhow::Result;
use std::sync::Arc;
use web_time::Instant;
use winit::{
    application::ApplicationHandler,
    dpi::LogicalSize,
    event::{ElementState, MouseButton, WindowEvent},
    event_loop::{ActiveEventLoop, EventLoop},
    keyboard::{KeyCode, PhysicalKey},
    window::{Window, WindowAttributes, WindowId},
};

use sandfall_core::{Frame, InputEvent, InputForwarder, PointerEvent, SimulationHandle};

use crate::config::AppConfig;
use crate::render::Renderer;
use crate::ui::{show_hud, HudStats};

/// Events sent to the window thread from outside the event loop
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppEvent {
    /// The simulation published a new frame
    FrameReady,
}

/// Main application state
pub struct App {
    // Window and rendering
    window: Arc<Window>,
    renderer: Renderer,
    egui_ctx: egui::Context,
    egui_state: egui_winit::State,
    egui_renderer: egui_wgpu::Renderer,
    config: AppConfig,

    // Simulation
    simulation: SimulationHandle,
    frame: Frame,
    uploaded_sequence: u64,

    // Input state
    mouse_pos: Option<(f32, f32)>,
    pointer_down: bool,
    forwarder: InputForwarder,

    // Timing
    frame_count: u64,
    fps_update_time: Instant,
    fps: f32,
}

impl App {
    /// Create the window, renderer and simulation thread
    pub async fn new() -> Result<(Self, EventLoop<AppEvent>)> {
        let config = AppConfig::load();

        let event_loop = EventLoop::<AppEvent>::with_user_event().build()?;

        let window_attrs = WindowAttributes::default()
            .with_title(config.title.clone())
            .with_inner_size(LogicalSize::new(config.window_width, config.window_height));

        let window = Arc::new(event_loop.create_window(window_attrs)?);

        let grid_width = config.simulation.width;
        let grid_height = config.simulation.height;
        let renderer = Renderer::new(&window, grid_width as u32, grid_height as u32).await?;

        let proxy = event_loop.create_proxy();
        let simulation = sandfall_core::spawn(
            config.simulation.clone(),
            Box::new(move || {
                // Fails only once the event loop has exited
                let _ = proxy.send_event(AppEvent::FrameReady);
            }),
        )?;

        let egui_ctx = egui::Context::default();
        let egui_state = egui_winit::State::new(
            egui_ctx.clone(),
            egui::ViewportId::ROOT,
            &window,
            Some(window.scale_factor() as f32),
            None,
            None,
        );
        let egui_renderer = egui_wgpu::Renderer::new(
            &renderer.device,
            renderer.surface_format(),
            egui_wgpu::RendererOptions::default(),
        );

        Ok((
            Self {
                window,
                renderer,
                egui_ctx,
                egui_state,
                egui_renderer,
                config,
                simulation,
                frame: Frame::new(grid_width, grid_height),
                uploaded_sequence: 0,
                mouse_pos: None,
                pointer_down: false,
                forwarder: InputForwarder::new(),
                frame_count: 0,
                fps_update_time: Instant::now(),
                fps: 0.0,
            },
            event_loop,
        ))
    }

    /// Run the event loop, then stop the simulation thread
    pub fn run(event_loop: EventLoop<AppEvent>, mut app: Self) -> Result<()> {
        event_loop.run_app(&mut app)?;
        app.simulation
            .shutdown()
            .map_err(|_| anyhow::anyhow!("simulation thread panicked"))?;
        log::info!("Sandfall closed");
        Ok(())
    }

    /// Queue a press, release or reset; parked edges are retried on redraw
    fn send_edge(&mut self, event: InputEvent) {
        self.forwarder.send_edge(self.simulation.sender(), event);
    }

    /// Cursor position in grid coordinates
    fn pointer_cell(&self) -> Option<(f32, f32)> {
        self.mouse_pos
            .map(|(x, y)| self.renderer.screen_to_grid(x, y))
    }

    fn update_fps(&mut self) {
        let now = Instant::now();
        self.frame_count += 1;
        if now.duration_since(self.fps_update_time).as_secs_f32() >= 1.0 {
            self.fps = self.frame_count as f32;
            self.frame_count = 0;
            self.fps_update_time = now;
        }
    }

    /// Render frame
    fn render(&mut self) -> Result<()> {
        let sequence = self.simulation.bridge().read_into(&mut self.frame);
        if sequence != self.uploaded_sequence {
            self.renderer.update_grid_texture(
                &self.frame.grid,
                self.config.sand_color,
                self.config.background_color,
            );
            self.uploaded_sequence = sequence;
        }

        let hud = HudStats {
            fps: self.fps,
            frame: self.frame.stats,
            max_particles: self.config.simulation.max_particles,
        };
        let show = self.config.show_hud;

        let output = self.renderer.begin_frame()?;
        let view = output
            .texture
            .create_view(&wgpu::TextureViewDescriptor::default());

        let mut encoder =
            self.renderer
                .device
                .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                    label: Some("render_encoder"),
                });

        self.renderer.render_grid(&mut encoder, &view);

        let raw_input = self.egui_state.take_egui_input(&self.window);
        let full_output = self.egui_ctx.run(raw_input, |ctx| {
            if show {
                show_hud(ctx, &hud);
            }
        });

        self.egui_state
            .handle_platform_output(&self.window, full_output.platform_output);

        let paint_jobs = self
            .egui_ctx
            .tessellate(full_output.shapes, full_output.pixels_per_point);

        for (id, delta) in &full_output.textures_delta.set {
            self.egui_renderer.update_texture(
                &self.renderer.device,
                &self.renderer.queue,
                *id,
                delta,
            );
        }

        let screen_descriptor = egui_wgpu::ScreenDescriptor {
            size_in_pixels: [self.renderer.size().width, self.renderer.size().height],
            pixels_per_point: full_output.pixels_per_point,
        };

        self.egui_renderer.update_buffers(
            &self.renderer.device,
            &self.renderer.queue,
            &mut encoder,
            &paint_jobs,
            &screen_descriptor,
        );

        {
            let render_pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("egui_render_pass"),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view: &view,
                    resolve_target: None,
                    depth_slice: None,
                    ops: wgpu::Operations {
                        load: wgpu::LoadOp::Load,
                        store: wgpu::StoreOp::Store,
                    },
                })],
                depth_stencil_attachment: None,
                occlusion_query_set: None,
                timestamp_writes: None,
            });

            self.egui_renderer.render(
                &mut render_pass.forget_lifetime(),
                &paint_jobs,
                &screen_descriptor,
            );
        }

        for id in &full_output.textures_delta.free {
            self.egui_renderer.free_texture(id);
        }

        self.renderer
            .queue
            .submit(std::iter::once(encoder.finish()));
        self.renderer.end_frame(output);

        Ok(())
    }
}

impl ApplicationHandler<AppEvent> for App {
    fn resumed(&mut self, _event_loop: &ActiveEventLoop) {
        // Window is created up front
    }

    fn user_event(&mut self, _event_loop: &ActiveEventLoop, event: AppEvent) {
        match event {
            AppEvent::FrameReady => self.window.request_redraw(),
        }
    }

    fn window_event(
        &mut self,
        event_loop: &ActiveEventLoop,
        _window_id: WindowId,
        event: WindowEvent,
    ) {
        let egui_response = self.egui_state.on_window_event(&self.window, &event);
        if egui_response.consumed {
            return;
        }

        match event {
            WindowEvent::CloseRequested => {
                event_loop.exit();
            }
            WindowEvent::Resized(size) => {
                self.renderer.resize(size);
                self.window.request_redraw();
            }
            WindowEvent::RedrawRequested => {
                self.forwarder.flush(self.simulation.sender());
                self.update_fps();
                if let Err(e) = self.render() {
                    log::error!("Render error: {}", e);
                }
            }
            WindowEvent::CursorMoved { position, .. } => {
                self.mouse_pos = Some((position.x as f32, position.y as f32));
                if let Some((x, y)) = self.pointer_cell() {
                    // Moves are lossy: a dropped move is superseded by the next one
                    self.forwarder
                        .send_move(self.simulation.sender(), PointerEvent::moved(x, y));
                }
            }
            WindowEvent::CursorLeft { .. } => {
                if self.pointer_down {
                    if let Some((x, y)) = self.pointer_cell() {
                        self.send_edge(PointerEvent::release(x, y).into());
                    }
                    self.pointer_down = false;
                }
                self.mouse_pos = None;
            }
            WindowEvent::MouseInput {
                state,
                button: MouseButton::Left,
                ..
            } => {
                let Some((x, y)) = self.pointer_cell() else {
                    return;
                };
                let event = match state {
                    ElementState::Pressed => PointerEvent::press(x, y),
                    ElementState::Released => PointerEvent::release(x, y),
                };
                self.pointer_down = state == ElementState::Pressed;
                self.send_edge(event.into());
            }
            WindowEvent::KeyboardInput { event, .. } => {
                if event.state == ElementState::Pressed {
                    match event.physical_key {
                        PhysicalKey::Code(KeyCode::KeyC) => {
                            self.send_edge(InputEvent::Reset);
                        }
                        PhysicalKey::Code(KeyCode::Escape) => {
                            event_loop.exit();
                        }
                        _ => {}
                    }
                }
            }
            _ => {}
        }
    }
}
