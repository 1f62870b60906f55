//! # Graphics Resources Builder
//!
//! Creates the window, surface and wgpu device. On native targets this blocks
//! on the adapter request; on the web it runs as a spawned future. Either way
//! the finished [`Graphics`] are delivered to the event loop as a user event.

use std::future::Future;
use std::sync::Arc;

use log::info;
use wgpu::{Device, Queue, Surface, SurfaceConfiguration};
use winit::{
    event_loop::{ActiveEventLoop, EventLoopProxy},
    window::Window,
};

#[cfg(target_family = "wasm")]
use {crate::CANVAS_ID, wasm_bindgen::UnwrapThrowExt};

/// The GPU resources the engine needs, handed over once initialization finishes.
#[derive(Default)]
pub struct Graphics {
    pub window: Option<Arc<Window>>,
    pub surface: Option<Surface<'static>>,
    pub surface_config: Option<SurfaceConfiguration>,
    pub device: Option<Device>,
    pub queue: Option<Queue>,
    /// False on the web until the canvas reports its first size.
    pub is_surface_configured: bool,
}

/// Asynchronously creates and initializes all required graphics resources.
///
/// # Panics
/// Device creation failures are fatal: no window, surface, adapter or device
/// means there is nothing to render with.
fn create_graphics(event_loop: &ActiveEventLoop) -> impl Future<Output = Graphics> + 'static {
    #[allow(unused_mut)]
    let mut window_attrs = Window::default_attributes().with_title("voxel chunk mesher");

    #[cfg(target_family = "wasm")]
    {
        use web_sys::wasm_bindgen::JsCast;
        use winit::platform::web::WindowAttributesExtWebSys;

        let window = web_sys::window().unwrap_throw();
        let document = window.document().unwrap_throw();
        let canvas = document.get_element_by_id(CANVAS_ID).unwrap_throw();
        let html_canvas_element = canvas.unchecked_into();
        window_attrs = window_attrs.with_canvas(Some(html_canvas_element));
    }

    let window = Arc::new(
        event_loop
            .create_window(window_attrs)
            .expect("failed to create window"),
    );

    let instance = wgpu::Instance::new(&wgpu::InstanceDescriptor {
        #[cfg(not(target_family = "wasm"))]
        backends: wgpu::Backends::PRIMARY,
        #[cfg(target_family = "wasm")]
        backends: wgpu::Backends::GL | wgpu::Backends::BROWSER_WEBGPU,
        flags: wgpu::InstanceFlags::empty(),
        backend_options: wgpu::BackendOptions::from_env_or_default(),
    });

    let surface = instance
        .create_surface(window.clone())
        .expect("failed to create surface");

    async move {
        let adapter = instance
            .request_adapter(&wgpu::RequestAdapterOptions {
                power_preference: wgpu::PowerPreference::default(),
                compatible_surface: Some(&surface),
                force_fallback_adapter: false,
            })
            .await
            .expect("no compatible GPU adapter");
        info!("Using adapter {:?}", adapter.get_info());

        let required_limits = if cfg!(target_family = "wasm") {
            wgpu::Limits::downlevel_webgl2_defaults()
        } else {
            wgpu::Limits::default()
        };

        let (device, queue) = adapter
            .request_device(&wgpu::DeviceDescriptor {
                required_features: wgpu::Features::empty(),
                required_limits,
                label: None,
                memory_hints: wgpu::MemoryHints::MemoryUsage,
                trace: wgpu::Trace::Off,
            })
            .await
            .expect("failed to create device");

        let size = window.inner_size();

        let surface_caps = surface.get_capabilities(&adapter);
        let surface_format = surface_caps
            .formats
            .iter()
            .find(|f| f.is_srgb())
            .copied()
            .unwrap_or(surface_caps.formats[0]);
        let surface_config = wgpu::SurfaceConfiguration {
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
            format: surface_format,
            width: size.width.max(1),
            height: size.height.max(1),
            present_mode: surface_caps.present_modes[0],
            alpha_mode: surface_caps.alpha_modes[0],
            view_formats: vec![],
            desired_maximum_frame_latency: 2,
        };

        let is_surface_configured = cfg!(not(target_family = "wasm"));
        if is_surface_configured {
            surface.configure(&device, &surface_config);
        }

        Graphics {
            window: Some(window),
            surface: Some(surface),
            surface_config: Some(surface_config),
            device: Some(device),
            queue: Some(queue),
            is_surface_configured,
        }
    }
}

/// Helper for the asynchronous initialization of graphics resources.
pub struct GraphicsBuilder {
    event_loop_proxy: Option<EventLoopProxy<Graphics>>,
}

/// The possible states of the graphics initialization process.
pub enum MaybeGraphics {
    /// State during asynchronous graphics initialization
    Builder(GraphicsBuilder),

    /// State when graphics resources are fully initialized and ready for use
    Graphics(Graphics),

    /// State after graphics resources have been moved to the engine
    Moved,
}

impl GraphicsBuilder {
    /// Creates a builder that reports back through `event_loop_proxy`.
    pub fn new(event_loop_proxy: EventLoopProxy<Graphics>) -> Self {
        Self {
            event_loop_proxy: Some(event_loop_proxy),
        }
    }

    /// Starts graphics initialization. Does nothing after the first call.
    pub fn build_and_send(&mut self, event_loop: &ActiveEventLoop) {
        let Some(event_loop_proxy) = self.event_loop_proxy.take() else {
            return;
        };

        #[cfg(target_family = "wasm")]
        {
            let gfx_fut = create_graphics(event_loop);
            wasm_bindgen_futures::spawn_local(async move {
                let gfx = gfx_fut.await;
                assert!(event_loop_proxy.send_event(gfx).is_ok());
            });
        }

        #[cfg(not(target_family = "wasm"))]
        {
            let gfx = pollster::block_on(create_graphics(event_loop));
            assert!(event_loop_proxy.send_event(gfx).is_ok());
        }
    }
}
