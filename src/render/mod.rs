use kurbo::{Affine, Point, Shape, Stroke, Vec2};
use parley::{Alignment, FontWeight, Layout, PositionedLayoutItem, StyleProperty};
use peniko::{Brush, Color, Fill};
use vello::wgpu;

use crate::{
  error::{Error, Result},
  theme,
};

pub mod texture;
pub mod window;

pub(crate) struct Render {
  pub scene:      vello::Scene,
  pub background: Color,

  /// Logical to physical pixels.
  root:   Affine,
  font:   parley::FontContext,
  layout: parley::LayoutContext<Brush>,
}

pub(crate) struct GpuHandle {
  pub device:  wgpu::Device,
  pub queue:   wgpu::Queue,
  pub texture: wgpu::Texture,
  pub view:    wgpu::TextureView,
}

#[derive(Clone, Copy)]
pub(crate) struct RenderConfig {
  pub width:  u32,
  pub height: u32,
}

#[derive(Clone, Copy, Default, PartialEq, Eq, Debug)]
pub(crate) enum Align {
  #[default]
  Start,
  Center,
  End,
}

pub(crate) struct DrawText<'a> {
  pub text:             &'a str,
  pub size:             f32,
  pub weight:           FontWeight,
  pub brush:            Brush,
  pub position:         Point,
  pub transform:        Affine,
  pub horizontal_align: Align,
  pub vertical_align:   Align,
}

impl Default for DrawText<'_> {
  fn default() -> Self {
    DrawText {
      text:             "",
      size:             16.0,
      weight:           FontWeight::NORMAL,
      brush:            Brush::Solid(theme::TEXT_COLOR),
      position:         Point::ZERO,
      transform:        Affine::IDENTITY,
      horizontal_align: Align::Start,
      vertical_align:   Align::Start,
    }
  }
}

impl Align {
  fn offset(self, size: f64) -> f64 {
    match self {
      Align::Start => 0.0,
      Align::Center => -size / 2.0,
      Align::End => -size,
    }
  }
}

impl Render {
  pub fn new(scale: f64) -> Self {
    Render {
      scene:      vello::Scene::new(),
      background: theme::BACKGROUND,
      root:       Affine::scale(scale),
      font:       parley::FontContext::new(),
      layout:     parley::LayoutContext::new(),
    }
  }

  pub fn reset(&mut self, scale: f64) {
    self.scene.reset();
    self.root = Affine::scale(scale);
  }

  pub fn stroke(&mut self, shape: &impl Shape, transform: Affine, brush: &Brush, stroke: &Stroke) {
    self.scene.stroke(stroke, self.root * transform, brush, None, shape);
  }

  pub fn layout_text(&mut self, text: &DrawText) -> Layout<Brush> {
    let mut builder = self.layout.ranged_builder(&mut self.font, text.text, 1.0, true);

    builder.push_default(StyleProperty::FontSize(text.size));
    builder.push_default(StyleProperty::FontWeight(text.weight));
    builder.push_default(StyleProperty::Brush(text.brush.clone()));

    let mut layout = builder.build(text.text);
    layout.break_all_lines(None);
    layout.align(None, Alignment::Start, Default::default());
    layout
  }

  pub fn draw_text(&mut self, text: DrawText) {
    let layout = self.layout_text(&text);
    self.draw_text_layout(layout, text);
  }

  /// Draws `layout` so that its alignment anchor lands on `text.position`.
  /// `text.transform` is applied around that anchor.
  pub fn draw_text_layout(&mut self, layout: Layout<Brush>, text: DrawText) {
    let anchor = Vec2::new(
      text.horizontal_align.offset(f64::from(layout.width())),
      text.vertical_align.offset(f64::from(layout.height())),
    );
    let transform = self.root
      * Affine::translate(text.position.to_vec2())
      * text.transform
      * Affine::translate(anchor);

    for line in layout.lines() {
      for item in line.items() {
        let PositionedLayoutItem::GlyphRun(glyph_run) = item else { continue };

        let run = glyph_run.run();
        let mut x = glyph_run.offset();
        let baseline = glyph_run.baseline();

        self
          .scene
          .draw_glyphs(run.font())
          .brush(&glyph_run.style().brush)
          .hint(false)
          .transform(transform)
          .glyph_transform(
            run.synthesis().skew().map(|angle| Affine::skew(angle.to_radians().tan() as f64, 0.0)),
          )
          .font_size(run.font_size())
          .normalized_coords(run.normalized_coords())
          .draw(
            Fill::NonZero,
            glyph_run.glyphs().map(|glyph| {
              let gx = x + glyph.x;
              let gy = baseline + glyph.y;
              x += glyph.advance;
              vello::Glyph { id: glyph.id.into(), x: gx, y: gy }
            }),
          );
      }
    }
  }
}

impl GpuHandle {
  /// Opens a device on `adapter`, or on the default adapter when none is given.
  pub fn new(config: &RenderConfig, adapter: Option<wgpu::Adapter>) -> Result<Self> {
    let adapter = match adapter {
      Some(adapter) => adapter,
      None => {
        let instance = wgpu::Instance::new(&wgpu::InstanceDescriptor::default());
        pollster::block_on(instance.request_adapter(&wgpu::RequestAdapterOptions::default()))
          .map_err(Error::render)?
      }
    };
    tracing::debug!(adapter = ?adapter.get_info().name, "using GPU adapter");

    let (device, queue) = pollster::block_on(adapter.request_device(&wgpu::DeviceDescriptor {
      label:             None,
      required_features: wgpu::Features::empty(),
      required_limits:   wgpu::Limits::defaults(),
      memory_hints:      wgpu::MemoryHints::MemoryUsage,
      trace:             wgpu::Trace::Off,
    }))
    .map_err(Error::render)?;

    let max = device.limits().max_texture_dimension_2d;
    if config.width > max || config.height > max {
      return Err(Error::Render(format!(
        "{}x{} target is larger than the device limit of {max}",
        config.width, config.height
      )));
    }

    let (texture, view) = create_target(&device, config);
    Ok(GpuHandle { device, queue, texture, view })
  }

  pub fn resize(&mut self, config: &RenderConfig) {
    let (texture, view) = create_target(&self.device, config);
    self.texture = texture;
    self.view = view;
  }

  pub fn renderer(&self) -> Result<vello::Renderer> {
    vello::Renderer::new(&self.device, vello::RendererOptions::default()).map_err(Error::render)
  }

  /// Renders `render`'s scene into the target texture.
  pub fn render_to_texture(
    &self,
    renderer: &mut vello::Renderer,
    render: &Render,
    config: &RenderConfig,
  ) -> Result<()> {
    renderer
      .render_to_texture(
        &self.device,
        &self.queue,
        &render.scene,
        &self.view,
        &vello::RenderParams {
          base_color:          render.background,
          width:               config.width,
          height:              config.height,
          antialiasing_method: vello::AaConfig::Msaa16,
        },
      )
      .map_err(Error::render)
  }
}

fn create_target(device: &wgpu::Device, config: &RenderConfig) -> (wgpu::Texture, wgpu::TextureView) {
  let texture = device.create_texture(&wgpu::TextureDescriptor {
    label:           Some("Render Texture"),
    size:            config.extent_3d(),
    mip_level_count: 1,
    sample_count:    1,
    dimension:       wgpu::TextureDimension::D2,
    format:          wgpu::TextureFormat::Rgba8Unorm,
    usage:           wgpu::TextureUsages::STORAGE_BINDING
      | wgpu::TextureUsages::TEXTURE_BINDING
      | wgpu::TextureUsages::COPY_SRC,
    view_formats:    &[],
  });
  let view = texture.create_view(&wgpu::TextureViewDescriptor::default());

  (texture, view)
}

impl RenderConfig {
  pub fn extent_3d(&self) -> wgpu::Extent3d {
    wgpu::Extent3d {
      width:                 self.width,
      height:                self.height,
      depth_or_array_layers: 1,
    }
  }
}
