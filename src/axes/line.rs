use kurbo::{Affine, BezPath, Point, Stroke};
use peniko::{Brush, Color};
use polars::prelude::*;

use crate::{
  bounds::{Bounds, Range},
  render::Render,
};

/// A line through (x, y) samples, in row order.
pub struct LineAxes {
  points:  Vec<Point>,
  options: LineOptions,
}

pub struct LineOptions {
  pub width: f64,
  pub color: Brush,
}

impl Default for LineOptions {
  fn default() -> Self {
    LineOptions { width: 2.0, color: Brush::Solid(Color::from_rgb8(117, 158, 208)) }
  }
}

impl LineAxes {
  /// Reads both columns as `f64`. Rows where either value is missing are
  /// skipped.
  pub(crate) fn new(x: &Column, y: &Column) -> PolarsResult<Self> {
    if x.len() != y.len() {
      return Err(PolarsError::ShapeMismatch(
        format!("`{}` has {} rows but `{}` has {}", x.name(), x.len(), y.name(), y.len()).into(),
      ));
    }

    let x = x.cast(&DataType::Float64)?;
    let y = y.cast(&DataType::Float64)?;
    let points = x
      .f64()?
      .into_iter()
      .zip(y.f64()?.into_iter())
      .filter_map(|(x, y)| Some(Point::new(x?, y?)))
      .collect();

    Ok(LineAxes { points, options: LineOptions::default() })
  }

  pub fn points(&self) -> &[Point] { &self.points }
  pub fn options(&self) -> &LineOptions { &self.options }

  pub fn color(&mut self, color: Brush) -> &mut Self {
    self.options.color = color;
    self
  }

  /// `None` for an empty line.
  pub(crate) fn data_bounds(&self) -> Option<Bounds> {
    Some(Bounds::new(
      Range::of(self.points.iter().map(|p| p.x))?,
      Range::of(self.points.iter().map(|p| p.y))?,
    ))
  }

  pub(crate) fn draw(&self, render: &mut Render, transform: Affine) {
    let mut shape = BezPath::new();

    for (i, point) in self.points.iter().map(|&p| transform * p).enumerate() {
      if i == 0 {
        shape.move_to(point);
      } else {
        shape.line_to(point);
      }
    }

    let stroke = Stroke::new(self.options.width);
    render.stroke(&shape, Affine::IDENTITY, &self.options.color, &stroke);
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn pairs_rows_in_order() {
    let df = df! {
      "step" => &[1i64, 2, 3],
      "numTrees" => &[3.0, 3.0, 2.0],
    }
    .unwrap();

    let line = LineAxes::new(df.column("step").unwrap(), df.column("numTrees").unwrap()).unwrap();
    assert_eq!(line.points(), [Point::new(1.0, 3.0), Point::new(2.0, 3.0), Point::new(3.0, 2.0)]);
  }

  #[test]
  fn skips_missing_values() {
    let df = df! {
      "x" => &[Some(1.0), Some(2.0), None],
      "y" => &[Some(5.0), None, Some(7.0)],
    }
    .unwrap();

    let line = LineAxes::new(df.column("x").unwrap(), df.column("y").unwrap()).unwrap();
    assert_eq!(line.points(), [Point::new(1.0, 5.0)]);
  }

  #[test]
  fn empty_line_has_no_bounds() {
    let empty = Column::new("x".into(), Vec::<f64>::new());

    let line = LineAxes::new(&empty, &empty).unwrap();
    assert!(line.points().is_empty());
    assert!(line.data_bounds().is_none());
  }

  #[test]
  fn bounds_cover_all_points() {
    let x = Column::new("x".into(), [4.0, 1.0, 2.0]);
    let y = Column::new("y".into(), [0.0, -3.0, 8.0]);

    let line = LineAxes::new(&x, &y).unwrap();
    assert_eq!(
      line.data_bounds(),
      Some(Bounds::new(Range::new(1.0, 4.0), Range::new(-3.0, 8.0)))
    );
  }

  #[test]
  fn mismatched_lengths_are_rejected() {
    let x = Column::new("x".into(), [1.0, 2.0]);
    let y = Column::new("y".into(), [1.0]);

    assert!(LineAxes::new(&x, &y).is_err());
  }
}
