use kurbo::Affine;

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Bounds {
  pub x: Range,
  pub y: Range,
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Range {
  pub min: f64,
  pub max: f64,
}

impl Bounds {
  pub const fn new(x: Range, y: Range) -> Self { Bounds { x, y } }

  pub const fn expand_by(self, fract: f64) -> Self {
    Bounds { x: self.x.expand_by(fract), y: self.y.expand_by(fract) }
  }

  pub fn union(&self, other: Bounds) -> Bounds {
    Bounds { x: self.x.union(other.x), y: self.y.union(other.y) }
  }

  /// Widens zero-sized ranges so the bounds can be mapped onto a viewport.
  pub fn drawable(self) -> Bounds { Bounds { x: self.x.drawable(), y: self.y.drawable() } }

  pub(crate) fn transform_to(&self, viewport: Bounds) -> Affine {
    let scale_x = viewport.x.size() / self.x.size();
    let scale_y = viewport.y.size() / self.y.size();
    let translate_x = viewport.x.min - self.x.min * scale_x;
    let translate_y = viewport.y.min - self.y.min * scale_y;

    Affine::new([scale_x, 0.0, 0.0, scale_y, translate_x, translate_y])
  }
}

impl Range {
  pub const fn new(min: f64, max: f64) -> Self { Range { min, max } }
  pub const fn size(&self) -> f64 { self.max - self.min }

  /// The smallest range covering `values`, or `None` if there are none.
  pub fn of(values: impl IntoIterator<Item = f64>) -> Option<Range> {
    values.into_iter().fold(None, |range, v| match range {
      None => Some(Range::new(v, v)),
      Some(r) => Some(Range::new(r.min.min(v), r.max.max(v))),
    })
  }

  pub const fn expand(self, amount: f64) -> Self {
    Range {
      min: self.min - amount * self.size().signum(),
      max: self.max + amount * self.size().signum(),
    }
  }
  pub const fn expand_by(self, fract: f64) -> Self { self.expand(self.size() * fract) }

  pub const fn contains(&self, value: &f64) -> bool {
    (*value >= self.min && *value <= self.max) || (*value <= self.min && *value >= self.max)
  }

  pub fn union(&self, other: Range) -> Range {
    if self.size() == 0.0 {
      other
    } else if other.size() == 0.0 {
      *self
    } else {
      Range { min: self.min.min(other.min), max: self.max.max(other.max) }
    }
  }

  pub fn drawable(self) -> Range {
    if self.size() == 0.0 { Range::new(self.min - 0.5, self.max + 0.5) } else { self }
  }

  pub fn nice_ticks(&self, count: u32) -> NiceTicksIter {
    if !(self.size() > 0.0 && self.size().is_finite()) {
      return NiceTicksIter::empty();
    }

    let step = (self.max - self.min) / f64::from(count);
    let k = step.log10().floor();
    let base = step / 10f64.powf(k);

    let nice_base = match base {
      b if b < 1.0 => 1.0,
      b if b < 2.0 => 2.0,
      b if b < 2.5 => 2.5,
      b if b < 5.0 => 5.0,
      _ => 10.0,
    };

    let step = nice_base * 10f64.powf(k);
    let lo = (self.min / step).floor() * step;
    let hi = (self.max / step).ceil() * step;

    // Steps below the float spacing at `lo` cannot be told apart.
    if !(lo.is_finite() && hi.is_finite() && lo + step > lo) {
      return NiceTicksIter::empty();
    }

    let len = (((hi - lo) / step).round() as usize + 1).min(MAX_TICKS);
    let precision = (-k as i32 + 4).max(0) as usize;
    NiceTicksIter { lo, step, index: 0, len, precision }
  }
}

const MAX_TICKS: usize = 1000;

pub struct NiceTicksIter {
  lo:        f64,
  step:      f64,
  index:     usize,
  len:       usize,
  precision: usize,
}

impl NiceTicksIter {
  const fn empty() -> Self { NiceTicksIter { lo: 0.0, step: 1.0, index: 0, len: 0, precision: 0 } }

  /// Digits after the decimal point needed to print each tick.
  pub fn label_precision(&self) -> usize { self.precision.saturating_sub(3) }
}

impl Iterator for NiceTicksIter {
  type Item = f64;
  fn next(&mut self) -> Option<Self::Item> {
    if self.index >= self.len {
      return None;
    }

    let value = self.lo + self.index as f64 * self.step;
    self.index += 1;

    let p = 10f64.powi(self.precision as i32);
    let rounded = (value * p).round() / p;
    Some(if rounded.is_finite() { rounded } else { value })
  }
}

#[cfg(test)]
mod tests {
  use kurbo::Point;

  use super::*;

  #[test]
  fn range_of_values() {
    assert_eq!(Range::of([3.0, 1.0, 2.0]), Some(Range::new(1.0, 3.0)));
    assert_eq!(Range::of([]), None);
  }

  #[test]
  fn nice_ticks_use_round_steps() {
    let ticks = Range::new(0.0, 100.0).nice_ticks(10).collect::<Vec<_>>();
    assert_eq!(ticks, [0.0, 20.0, 40.0, 60.0, 80.0, 100.0]);

    let ticks = Range::new(0.0, 3.0).nice_ticks(10).collect::<Vec<_>>();
    assert_eq!(ticks, [0.0, 0.5, 1.0, 1.5, 2.0, 2.5, 3.0]);
  }

  #[test]
  fn label_precision_follows_step() {
    assert_eq!(Range::new(0.0, 100.0).nice_ticks(10).label_precision(), 0);
    assert_eq!(Range::new(0.0, 3.0).nice_ticks(10).label_precision(), 2);
  }

  #[test]
  fn degenerate_ranges_have_no_ticks() {
    assert_eq!(Range::new(2.0, 2.0).nice_ticks(10).count(), 0);
  }

  #[test]
  fn ticks_end_when_step_is_below_float_spacing() {
    let range = Range::new(1e17, 1e17 + 32.0);
    assert!(range.nice_ticks(10).take(MAX_TICKS + 1).count() <= MAX_TICKS);
  }

  #[test]
  fn large_offsets_still_get_ticks() {
    let ticks = Range::new(1e9, 1e9 + 100.0).nice_ticks(10).collect::<Vec<_>>();
    assert_eq!(ticks.first(), Some(&1e9));
    assert_eq!(ticks.last(), Some(&(1e9 + 100.0)));
    assert_eq!(ticks.len(), 6);
  }

  #[test]
  fn drawable_widens_flat_ranges() {
    assert_eq!(Range::new(2.0, 2.0).drawable(), Range::new(1.5, 2.5));
    assert_eq!(Range::new(1.0, 4.0).drawable(), Range::new(1.0, 4.0));
  }

  #[test]
  fn union_ignores_empty() {
    let a = Range::new(1.0, 2.0);
    assert_eq!(Range::new(0.0, 0.0).union(a), a);
    assert_eq!(a.union(Range::new(0.0, 5.0)), Range::new(0.0, 5.0));
  }

  #[test]
  fn transform_maps_corners() {
    let data = Bounds::new(Range::new(0.0, 10.0), Range::new(0.0, 5.0));
    let viewport = Bounds::new(Range::new(100.0, 900.0), Range::new(900.0, 100.0));
    let transform = data.transform_to(viewport);

    assert_eq!(transform * Point::new(0.0, 0.0), Point::new(100.0, 900.0));
    assert_eq!(transform * Point::new(10.0, 5.0), Point::new(900.0, 100.0));
  }
}
