use std::error::Error;
use std::time::{Duration, Instant};

use pixels::{PixelsBuilder, SurfaceTexture};
use winit::dpi::PhysicalSize;
use winit::event::{ElementState, Event, KeyboardInput, MouseButton, VirtualKeyCode, WindowEvent};
use winit::event_loop::{ControlFlow, EventLoop};
use winit::window::{Window, WindowBuilder};

use crate::graphics::Renderer2d;
use crate::pixels_renderer::PixelsRenderer2d;
use crate::surface::SurfaceSize;

pub struct AppConfig {
    pub title: String,
    pub surface_size: SurfaceSize,
    pub vsync: Option<bool>,
    /// How often `AppHandler::on_idle` runs while no window events arrive.
    pub idle_interval: Duration,
}

pub struct AppContext {
    pub window: Window,
    pub renderer: PixelsRenderer2d,
    exit_requested: bool,
}

impl AppContext {
    /// Resizes the drawing surface and asks the window to match it.
    pub fn resize_surface(&mut self, size: SurfaceSize) -> Result<(), pixels::Error> {
        if size == self.renderer.size() {
            return Ok(());
        }
        self.renderer.resize_buffer(size)?;
        self.window
            .set_inner_size(PhysicalSize::new(size.width, size.height));
        self.window.request_redraw();
        Ok(())
    }

    pub fn request_redraw(&self) {
        self.window.request_redraw();
    }

    pub fn set_title(&self, title: &str) {
        self.window.set_title(title);
    }

    pub fn request_exit(&mut self) {
        self.exit_requested = true;
    }
}

/// Pointer input already mapped into surface coordinates.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PointerEvent {
    Moved { x: f32, y: f32 },
    Left,
    Clicked { x: f32, y: f32 },
}

pub trait AppHandler {
    fn init(&mut self, _ctx: &mut AppContext) -> Result<(), Box<dyn Error>> {
        Ok(())
    }

    fn on_pointer(&mut self, event: PointerEvent, ctx: &mut AppContext);

    fn on_key(&mut self, _key: VirtualKeyCode, _ctx: &mut AppContext) {}

    /// Runs between window events; the place to drain background work.
    fn on_idle(&mut self, _ctx: &mut AppContext) {}

    fn render(&mut self, gfx: &mut dyn Renderer2d);
}

pub fn run_app<H: AppHandler + 'static>(
    config: AppConfig,
    mut handler: H,
) -> Result<(), Box<dyn Error>> {
    let event_loop = EventLoop::new();
    let size = config.surface_size;
    let window = WindowBuilder::new()
        .with_title(config.title)
        .with_inner_size(PhysicalSize::new(size.width, size.height))
        .build(&event_loop)?;

    let window_size = window.inner_size();
    let surface_texture = SurfaceTexture::new(window_size.width, window_size.height, &window);
    let mut pixels_builder = PixelsBuilder::new(size.width, size.height, surface_texture);
    if let Some(vsync) = config.vsync {
        pixels_builder = pixels_builder.enable_vsync(vsync);
    }
    let renderer = PixelsRenderer2d::new(pixels_builder.build()?, size)?;

    let mut ctx = AppContext {
        window,
        renderer,
        exit_requested: false,
    };
    handler.init(&mut ctx)?;

    let idle_interval = config.idle_interval;
    let mut pointer: Option<(f32, f32)> = None;

    event_loop.run(move |event, _, control_flow| {
        *control_flow = ControlFlow::WaitUntil(Instant::now() + idle_interval);

        match &event {
            Event::WindowEvent { event, .. } => match event {
                WindowEvent::CloseRequested => {
                    *control_flow = ControlFlow::Exit;
                    return;
                }
                WindowEvent::Resized(size) => {
                    if let Err(err) = ctx.renderer.resize_surface(size.width, size.height) {
                        eprintln!("resize failed: {err}");
                    }
                    ctx.window.request_redraw();
                }
                WindowEvent::CursorMoved { position, .. } => {
                    match ctx.renderer.window_to_surface(position.x, position.y) {
                        Some((x, y)) => {
                            pointer = Some((x, y));
                            handler.on_pointer(PointerEvent::Moved { x, y }, &mut ctx);
                        }
                        None => {
                            if pointer.take().is_some() {
                                handler.on_pointer(PointerEvent::Left, &mut ctx);
                            }
                        }
                    }
                }
                WindowEvent::CursorLeft { .. } => {
                    pointer = None;
                    handler.on_pointer(PointerEvent::Left, &mut ctx);
                }
                WindowEvent::MouseInput {
                    state: ElementState::Released,
                    button: MouseButton::Left,
                    ..
                } => {
                    if let Some((x, y)) = pointer {
                        handler.on_pointer(PointerEvent::Clicked { x, y }, &mut ctx);
                    }
                }
                WindowEvent::KeyboardInput {
                    input:
                        KeyboardInput {
                            state: ElementState::Pressed,
                            virtual_keycode: Some(key),
                            ..
                        },
                    ..
                } => {
                    handler.on_key(*key, &mut ctx);
                }
                _ => {}
            },
            Event::RedrawRequested(_) => {
                ctx.renderer.draw_frame(|gfx| handler.render(gfx));
                if let Err(err) = ctx.renderer.present() {
                    eprintln!("present failed: {err}");
                }
            }
            Event::MainEventsCleared => {
                handler.on_idle(&mut ctx);
            }
            _ => {}
        }

        if ctx.exit_requested {
            *control_flow = ControlFlow::Exit;
        }
    });

    #[allow(unreachable_code)]
    Ok(())
}
