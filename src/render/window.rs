use std::sync::Arc;

use kurbo::Size;
use vello::wgpu;
use winit::{
  application::ApplicationHandler,
  event::{ElementState, KeyEvent, StartCause, WindowEvent},
  event_loop::{ActiveEventLoop, ControlFlow, EventLoop},
  keyboard::Key,
  platform::run_on_demand::EventLoopExtRunOnDemand,
  window::{Window, WindowId},
};

use crate::{
  Plot,
  error::{Error, Result},
  render::{GpuHandle, Render, RenderConfig},
  report::Surface,
};

/// Shows each presented plot in its own window and blocks until it is closed.
///
/// A single event loop is reused for every plot, so windows appear one after
/// another.
pub struct WindowSurface {
  event_loop: EventLoop<()>,
}

impl WindowSurface {
  pub fn new() -> Result<Self> {
    let event_loop = EventLoop::new().map_err(Error::render)?;
    event_loop.set_control_flow(ControlFlow::Wait);

    Ok(WindowSurface { event_loop })
  }
}

impl Surface for WindowSurface {
  fn present(&mut self, plot: &Plot) -> Result<()> {
    tracing::debug!(title = ?plot.title_text(), "opening window");

    let mut app = App { plot, stale: true, closed: false, render: None, init: None, error: None };
    self.event_loop.run_app_on_demand(&mut app).map_err(Error::render)?;

    match app.error {
      Some(err) => Err(err),
      None => Ok(()),
    }
  }
}

struct App<'a> {
  plot:   &'a Plot,
  stale:  bool,
  closed: bool,
  render: Option<Render>,

  init:  Option<Init>,
  error: Option<Error>,
}

struct Init {
  surface: wgpu::Surface<'static>,
  config:  wgpu::SurfaceConfiguration,
  handle:  GpuHandle,
  window:  Arc<Window>,

  blit:  wgpu::util::TextureBlitter,
  vello: vello::Renderer,
}

impl App<'_> {
  fn open(&mut self, event_loop: &ActiveEventLoop) {
    if self.init.is_some() || self.closed {
      return;
    }

    match Init::new(event_loop, self.plot) {
      Ok(init) => {
        init.window.request_redraw();
        self.init = Some(init);
      }
      Err(err) => self.fail(event_loop, err),
    }
  }

  fn close(&mut self, event_loop: &ActiveEventLoop) {
    self.closed = true;
    self.init = None;
    event_loop.exit();
  }

  fn fail(&mut self, event_loop: &ActiveEventLoop, err: Error) {
    self.error = Some(err);
    self.close(event_loop);
  }

  fn redraw(&mut self) -> Result<()> {
    let Some(init) = &mut self.init else { return Ok(()) };

    if self.render.is_none() || self.stale {
      self.stale = false;

      let scale = init.window.scale_factor();
      let render = self.render.get_or_insert_with(|| Render::new(scale));
      render.reset(scale);

      let size = Size::new(f64::from(init.config.width), f64::from(init.config.height)) / scale;
      self.plot.draw(render, size);

      init.handle.render_to_texture(
        &mut init.vello,
        render,
        &RenderConfig { width: init.config.width, height: init.config.height },
      )?;
    }

    init.present();
    Ok(())
  }
}

impl ApplicationHandler for App<'_> {
  fn new_events(&mut self, event_loop: &ActiveEventLoop, cause: StartCause) {
    if cause == StartCause::Init {
      self.open(event_loop);
    }
  }

  fn resumed(&mut self, event_loop: &ActiveEventLoop) { self.open(event_loop); }

  fn window_event(&mut self, event_loop: &ActiveEventLoop, _: WindowId, event: WindowEvent) {
    match event {
      WindowEvent::CloseRequested => self.close(event_loop),

      WindowEvent::KeyboardInput {
        event:
          KeyEvent { logical_key: Key::Character(c), state: ElementState::Pressed, .. },
        ..
      } if c.as_str() == "q" => self.close(event_loop),

      WindowEvent::Resized(new_size) => {
        if let Some(init) = &mut self.init {
          if new_size.width > 0 && new_size.height > 0 {
            init.config.width = new_size.width;
            init.config.height = new_size.height;
            init
              .handle
              .resize(&RenderConfig { width: init.config.width, height: init.config.height });
            init.surface.configure(&init.handle.device, &init.config);

            self.stale = true;
            init.window.request_redraw();
          }
        }
      }

      WindowEvent::ScaleFactorChanged { .. } => {
        self.stale = true;
        if let Some(init) = &self.init {
          init.window.request_redraw();
        }
      }

      WindowEvent::RedrawRequested => {
        if let Err(err) = self.redraw() {
          self.fail(event_loop, err);
        }
      }

      _ => (),
    }
  }
}

impl Init {
  fn new(event_loop: &ActiveEventLoop, plot: &Plot) -> Result<Self> {
    let window = event_loop
      .create_window(
        Window::default_attributes()
          .with_title(plot.title_text().unwrap_or("Plot"))
          .with_inner_size(winit::dpi::LogicalSize::new(800, 600))
          .with_min_inner_size(winit::dpi::LogicalSize::new(100, 100)),
      )
      .map_err(Error::render)?;
    let window = Arc::new(window);
    let size = window.inner_size();

    let instance = wgpu::Instance::new(&wgpu::InstanceDescriptor::default());
    let surface = instance.create_surface(window.clone()).map_err(Error::render)?;

    let adapter = pollster::block_on(instance.request_adapter(&wgpu::RequestAdapterOptions {
      compatible_surface: Some(&surface),
      ..Default::default()
    }))
    .map_err(Error::render)?;

    let surface_caps = surface.get_capabilities(&adapter);
    let surface_format = surface_caps
      .formats
      .iter()
      .copied()
      .find(|f| f.is_srgb())
      .or_else(|| surface_caps.formats.first().copied())
      .ok_or_else(|| Error::Render("surface has no supported formats".to_string()))?;
    let alpha_mode = surface_caps.alpha_modes.first().copied().unwrap_or_default();

    let handle = GpuHandle::new(
      &RenderConfig { width: size.width.max(1), height: size.height.max(1) },
      Some(adapter),
    )?;

    let config = wgpu::SurfaceConfiguration {
      usage: wgpu::TextureUsages::RENDER_ATTACHMENT | wgpu::TextureUsages::COPY_DST,
      format: surface_format,
      width: size.width.max(1),
      height: size.height.max(1),
      present_mode: wgpu::PresentMode::AutoNoVsync,
      alpha_mode,
      view_formats: vec![],
      desired_maximum_frame_latency: 2,
    };
    surface.configure(&handle.device, &config);

    let vello = handle.renderer()?;
    let blit = wgpu::util::TextureBlitter::new(&handle.device, config.format);

    Ok(Init { surface, config, handle, window, blit, vello })
  }

  fn present(&mut self) {
    let frame = match self.surface.get_current_texture() {
      Ok(frame) => frame,
      Err(wgpu::SurfaceError::Lost | wgpu::SurfaceError::Outdated) => {
        self.surface.configure(&self.handle.device, &self.config);
        self.window.request_redraw();
        return;
      }
      Err(e) => {
        tracing::warn!("dropped frame: {e}");
        return;
      }
    };

    let surface_view = frame.texture.create_view(&wgpu::TextureViewDescriptor::default());

    let mut encoder = self
      .handle
      .device
      .create_command_encoder(&wgpu::CommandEncoderDescriptor { label: Some("Render Encoder") });

    self.blit.copy(&self.handle.device, &mut encoder, &self.handle.view, &surface_view);

    self.handle.queue.submit(std::iter::once(encoder.finish()));

    frame.present();
  }
}
