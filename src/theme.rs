use color::{Oklch, OpaqueColor, Srgb};
use peniko::{Brush, Color};

pub struct LinearPalette {
  start: OpaqueColor<Oklch>,
  end:   OpaqueColor<Oklch>,
}

pub const ROCKET: LinearPalette =
  LinearPalette::new(OpaqueColor::new([0.6, 0.13, 250.0]), OpaqueColor::new([0.6, 0.17, 30.0]));

pub const TEXT_COLOR: Color = Color::from_rgb8(32, 32, 32);
pub const AXIS_COLOR: Color = Color::from_rgb8(128, 128, 128);
pub const BACKGROUND: Color = Color::WHITE;

impl LinearPalette {
  pub const fn new(start: OpaqueColor<Oklch>, end: OpaqueColor<Oklch>) -> Self {
    Self { start, end }
  }

  pub fn sample(&self, t: f32) -> OpaqueColor<Oklch> {
    let t = t.clamp(0.0, 1.0);
    self.start.lerp(self.end, t, color::HueDirection::Shorter)
  }

  pub fn brush(&self, t: f32) -> Brush {
    Brush::Solid(self.sample(t).convert::<Srgb>().with_alpha(1.0))
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn sample_clamps() {
    assert_eq!(ROCKET.sample(-1.0).components, ROCKET.sample(0.0).components);
    assert_eq!(ROCKET.sample(2.0).components, ROCKET.sample(1.0).components);
  }

  #[test]
  fn brush_endpoints_differ() {
    assert_ne!(ROCKET.brush(0.0), ROCKET.brush(1.0));
    assert_eq!(ROCKET.brush(1.5), ROCKET.brush(1.0));
  }
}
