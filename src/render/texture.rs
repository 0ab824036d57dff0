use std::{
  fs,
  path::{Path, PathBuf},
  sync::mpsc,
};

use image::{ImageBuffer, Rgba};
use kurbo::Size;
use vello::wgpu;

use crate::{
  Plot,
  error::{Error, Result},
  render::{GpuHandle, Render, RenderConfig},
  report::Surface,
};

/// Largest image side accepted, matching wgpu's default texture limit.
pub const MAX_IMAGE_SIZE: u32 = 8192;

/// Writes each presented plot to `<dir>/<name>.png`.
pub struct ImageSurface {
  dir:     PathBuf,
  config:  RenderConfig,
  count:   usize,
  context: Option<ImageContext>,
}

struct ImageContext {
  handle:   GpuHandle,
  renderer: vello::Renderer,
  render:   Render,
}

impl ImageSurface {
  /// `size` is the side of the square output in pixels. It must be a
  /// multiple of 64 so image rows satisfy wgpu's copy alignment, and at most
  /// [`MAX_IMAGE_SIZE`].
  pub fn new(dir: impl Into<PathBuf>, size: u32) -> Result<Self> {
    if size == 0 || size % 64 != 0 {
      return Err(Error::Render(format!("image size {size} must be a positive multiple of 64")));
    }
    if size > MAX_IMAGE_SIZE {
      return Err(Error::Render(format!("image size {size} is larger than {MAX_IMAGE_SIZE}")));
    }

    let dir = dir.into();
    fs::create_dir_all(&dir)?;

    Ok(ImageSurface { dir, config: RenderConfig { width: size, height: size }, count: 0, context: None })
  }

  pub fn path_for(&self, plot: &Plot) -> PathBuf {
    let stem = match plot.name_text() {
      Some(name) => name.to_string(),
      None => format!("figure_{}", self.count + 1),
    };
    self.dir.join(format!("{stem}.png"))
  }

  fn context(&mut self) -> Result<&mut ImageContext> {
    let context = match self.context.take() {
      Some(context) => context,
      None => {
        let handle = GpuHandle::new(&self.config, None)?;
        let renderer = handle.renderer()?;
        ImageContext { handle, renderer, render: Render::new(1.0) }
      }
    };

    Ok(self.context.insert(context))
  }
}

impl Surface for ImageSurface {
  fn present(&mut self, plot: &Plot) -> Result<()> {
    let path = self.path_for(plot);
    let config = self.config;

    let context = self.context()?;
    context.render.reset(1.0);
    plot.draw(&mut context.render, Size::new(f64::from(config.width), f64::from(config.height)));
    context.handle.render_to_texture(&mut context.renderer, &context.render, &config)?;
    save(&context.handle, config, &path)?;

    self.count += 1;
    tracing::info!(path = %path.display(), "saved plot");
    Ok(())
  }
}

fn save(handle: &GpuHandle, config: RenderConfig, path: &Path) -> Result<()> {
  let buffer = handle.device.create_buffer(&wgpu::BufferDescriptor {
    label:              Some("Output Buffer"),
    size:               4 * u64::from(config.width) * u64::from(config.height),
    usage:              wgpu::BufferUsages::COPY_DST | wgpu::BufferUsages::MAP_READ,
    mapped_at_creation: false,
  });

  let mut encoder = handle.device.create_command_encoder(&wgpu::CommandEncoderDescriptor {
    label: Some("texture_buffer_copy_encoder"),
  });

  encoder.copy_texture_to_buffer(
    wgpu::TexelCopyTextureInfo {
      texture:   &handle.texture,
      mip_level: 0,
      origin:    wgpu::Origin3d::ZERO,
      aspect:    wgpu::TextureAspect::All,
    },
    wgpu::TexelCopyBufferInfo {
      buffer: &buffer,
      layout: wgpu::TexelCopyBufferLayout {
        offset:         0,
        bytes_per_row:  Some(4 * config.width),
        rows_per_image: Some(config.height),
      },
    },
    config.extent_3d(),
  );

  handle.queue.submit(std::iter::once(encoder.finish()));

  let slice = buffer.slice(..);
  let (tx, rx) = mpsc::channel();
  slice.map_async(wgpu::MapMode::Read, move |result| {
    let _ = tx.send(result);
  });
  handle.device.poll(wgpu::PollType::Wait).map_err(Error::render)?;
  rx.recv().map_err(Error::render)?.map_err(Error::render)?;

  let data = slice.get_mapped_range().to_vec();
  buffer.unmap();

  let image = ImageBuffer::<Rgba<u8>, _>::from_raw(config.width, config.height, data)
    .ok_or_else(|| Error::Render("mapped buffer is smaller than the image".to_string()))?;
  image.save(path).map_err(Error::render)
}
