//! # Application State Management
//!
//! The winit application handler of the viewer. It waits for the graphics
//! builder to deliver a device, then hands the device to an [`EngineState`]
//! and drives one input/update/render cycle per event-loop iteration.

pub mod graphics_resources_builder;
pub mod input_manager;
pub mod input_state;

use std::sync::Arc;

use graphics_resources_builder::{Graphics, GraphicsBuilder, MaybeGraphics};
use input_manager::InputManager;
use log::{error, info};

use winit::{
    application::ApplicationHandler,
    dpi::PhysicalSize,
    event::{DeviceEvent, DeviceId, ElementState, KeyEvent, WindowEvent},
    event_loop::{ActiveEventLoop, EventLoopProxy},
    keyboard::{KeyCode, PhysicalKey},
    window::{Window, WindowId},
};

use crate::engine_state::{config::EngineConfig, EngineState};

/// Viewer lifecycle: graphics initialization first, then the running engine.
pub struct ApplicationState {
    /// Graphics resources until they are handed to the engine
    graphics: MaybeGraphics,

    /// Set once the engine is running
    viewer: Option<RunningViewer>,

    /// Last size reported before the surface could be configured (web)
    pending_size: Option<PhysicalSize<u32>>,

    /// Configuration handed to the engine once graphics are ready
    config: EngineConfig,
}

/// Everything that exists once the engine is running.
struct RunningViewer {
    engine_state: EngineState,
    window: Arc<Window>,
    input_manager: InputManager,
    /// Start of the previous frame, for the camera's delta time
    last_frame: web_time::Instant,
}

/// Close button or Escape.
fn is_exit_request(event: &WindowEvent) -> bool {
    matches!(
        event,
        WindowEvent::CloseRequested
            | WindowEvent::KeyboardInput {
                event: KeyEvent {
                    state: ElementState::Pressed,
                    physical_key: PhysicalKey::Code(KeyCode::Escape),
                    ..
                },
                ..
            }
    )
}

impl ApplicationState {
    /// A viewer that will build its graphics through `proxy` on first resume.
    pub fn new(proxy: EventLoopProxy<Graphics>, config: EngineConfig) -> Self {
        Self {
            graphics: MaybeGraphics::Builder(GraphicsBuilder::new(proxy)),
            viewer: None,
            pending_size: None,
            config,
        }
    }

    /// Configures the surface at `size`, then starts the engine if possible.
    fn resized(&mut self, size: PhysicalSize<u32>) {
        let MaybeGraphics::Graphics(gfx) = &mut self.graphics else {
            return;
        };
        if size.width == 0 || size.height == 0 {
            return;
        }

        if let (Some(surface), Some(surface_config), Some(device)) =
            (&gfx.surface, &mut gfx.surface_config, &gfx.device)
        {
            surface_config.width = size.width;
            surface_config.height = size.height;
            surface.configure(device, surface_config);
            gfx.is_surface_configured = true;
        }
        self.start_engine();
    }

    /// Moves the graphics resources into a new engine once the surface is configured.
    fn start_engine(&mut self) {
        let MaybeGraphics::Graphics(gfx) = &mut self.graphics else {
            return;
        };
        if !gfx.is_surface_configured {
            return;
        }
        let Graphics {
            window: Some(window),
            surface: Some(surface),
            surface_config: Some(surface_config),
            device: Some(device),
            queue: Some(queue),
            is_surface_configured: true,
        } = std::mem::take(gfx)
        else {
            error!("Graphics resources are incomplete; cannot start the engine");
            return;
        };

        let engine_state = EngineState::new(surface, surface_config, device, queue, self.config.clone());
        info!("Engine started");

        self.viewer = Some(RunningViewer {
            engine_state,
            window,
            input_manager: InputManager::new(),
            last_frame: web_time::Instant::now(),
        });
        self.graphics = MaybeGraphics::Moved;
    }
}

impl ApplicationHandler<Graphics> for ApplicationState {
    fn window_event(&mut self, event_loop: &ActiveEventLoop, _window_id: WindowId, event: WindowEvent) {
        if is_exit_request(&event) {
            event_loop.exit();
            return;
        }

        let Some(viewer) = &mut self.viewer else {
            if let WindowEvent::Resized(size) = event {
                self.pending_size = Some(size);
                self.resized(size);
            }
            return;
        };

        viewer.input_manager.intake_input(&event);
        match event {
            WindowEvent::Resized(size) => viewer.engine_state.resize_surface(size),
            WindowEvent::Focused(false) => viewer.input_manager.release_all(),
            WindowEvent::RedrawRequested => viewer.engine_state.render(),
            _ => (),
        }
    }

    /// Raw mouse motion feeds the camera, independent of the cursor position.
    fn device_event(&mut self, _event_loop: &ActiveEventLoop, _device_id: DeviceId, event: DeviceEvent) {
        if let (Some(viewer), DeviceEvent::MouseMotion { delta }) = (&mut self.viewer, event) {
            viewer.input_manager.intake_mouse_motion(delta);
        }
    }

    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if let MaybeGraphics::Builder(builder) = &mut self.graphics {
            builder.build_and_send(event_loop);
        }
    }

    /// Receives the finished graphics resources from the builder.
    fn user_event(&mut self, _event_loop: &ActiveEventLoop, graphics: Graphics) {
        let is_surface_configured = graphics.is_surface_configured;
        self.graphics = MaybeGraphics::Graphics(graphics);

        if is_surface_configured {
            self.start_engine();
        } else if let Some(size) = self.pending_size {
            self.resized(size);
        }
    }

    /// One frame: input, camera and toggles, then a redraw request.
    fn about_to_wait(&mut self, _event_loop: &ActiveEventLoop) {
        let Some(viewer) = &mut self.viewer else {
            return;
        };
        let now = web_time::Instant::now();

        let input = viewer.input_manager.get_and_reset_processed_input();
        viewer.engine_state.set_input_commands(input);
        viewer.engine_state.process_input(now - viewer.last_frame);
        viewer.last_frame = now;

        viewer.window.request_redraw();
    }
}
