//! Line charts of Fibonacci heap evolution traces.
//!
//! A trace is a CSV file with one row per sampled extract-min step. [`Dataset`]
//! loads and validates it, and [`report::run`] draws the heap height, root list
//! size and cascading cut charts onto a [`Surface`]: a window, PNG files, or
//! anything else implementing the trait.

use kurbo::{Affine, Cap, Line, Point, Size, Stroke};
use parley::FontWeight;
use peniko::Brush;

use crate::render::{Align, DrawText, Render};

mod axes;
mod bounds;
pub mod dataset;
pub mod error;
mod render;
pub mod report;
pub mod theme;

pub use axes::{LineAxes, LineOptions};
pub use bounds::{Bounds, Range};
pub use dataset::Dataset;
pub use error::{Error, Result};
pub use render::{
  texture::{ImageSurface, MAX_IMAGE_SIZE},
  window::WindowSurface,
};
pub use report::{CHARTS, MetricChart, Surface};

/// Space around the plotting area, in logical pixels. The left margin grows
/// past this when the y tick labels are wide.
const MARGIN_LEFT: f64 = 100.0;
const MARGIN_RIGHT: f64 = 40.0;
const MARGIN_TOP: f64 = 70.0;
const MARGIN_BOTTOM: f64 = 80.0;

const TICKS: u32 = 10;
const TICK_LENGTH: f64 = 10.0;
const TICK_LABEL_GAP: f64 = 15.0;
const TICK_LABEL_SIZE: f32 = 12.0;
const AXIS_LABEL_SIZE: f32 = 18.0;
const AXIS_LABEL_GAP: f64 = 12.0;

/// Left margin and y label offset (both measured leftwards from the y axis)
/// for tick labels up to `widest_tick_label` pixels wide.
fn y_axis_offsets(widest_tick_label: f64) -> (f64, f64) {
  let label = TICK_LABEL_GAP + widest_tick_label + AXIS_LABEL_GAP;
  let margin = (label + f64::from(AXIS_LABEL_SIZE) * 1.5).max(MARGIN_LEFT);
  (margin, label)
}

#[derive(Default)]
pub struct Plot {
  name:    Option<String>,
  title:   Option<String>,
  x_label: Option<String>,
  y_label: Option<String>,

  axes: Vec<LineAxes>,
}

impl Plot {
  pub fn new() -> Plot { Plot::default() }

  /// Short identifier, used as the file stem when saving.
  pub fn name(&mut self, name: &str) -> &mut Self {
    self.name = Some(name.to_string());
    self
  }

  pub fn title(&mut self, title: &str) -> &mut Self {
    self.title = Some(title.to_string());
    self
  }

  pub fn x_label(&mut self, label: &str) -> &mut Self {
    self.x_label = Some(label.to_string());
    self
  }

  pub fn y_label(&mut self, label: &str) -> &mut Self {
    self.y_label = Some(label.to_string());
    self
  }

  pub fn name_text(&self) -> Option<&str> { self.name.as_deref() }
  pub fn title_text(&self) -> Option<&str> { self.title.as_deref() }
  pub fn x_label_text(&self) -> Option<&str> { self.x_label.as_deref() }
  pub fn y_label_text(&self) -> Option<&str> { self.y_label.as_deref() }

  pub fn lines(&self) -> &[LineAxes] { &self.axes }

  /// The union of every line padded by 10%. Flat or empty ranges are widened
  /// so the result is always drawable.
  pub fn data_bounds(&self) -> Bounds {
    self
      .axes
      .iter()
      .filter_map(LineAxes::data_bounds)
      .reduce(|a, b| a.union(b))
      .map(|b| b.expand_by(0.1))
      .unwrap_or(Bounds::new(Range::new(0.0, 1.0), Range::new(0.0, 1.0)))
      .drawable()
  }

  pub(crate) fn draw(&self, render: &mut Render, size: Size) {
    const TEXT_COLOR: Brush = Brush::Solid(theme::TEXT_COLOR);
    const LINE_COLOR: Brush = Brush::Solid(theme::AXIS_COLOR);

    let data_bounds = self.data_bounds();

    let y_ticks = data_bounds.y.nice_ticks(TICKS);
    let precision = y_ticks.label_precision();
    let y_ticks = y_ticks
      .map(|y| {
        let text = format!("{y:.precision$}");
        let layout = render.layout_text(&DrawText {
          text: &text,
          size: TICK_LABEL_SIZE,
          brush: TEXT_COLOR,
          ..Default::default()
        });
        (y, text, layout)
      })
      .collect::<Vec<_>>();
    let widest = y_ticks.iter().map(|(_, _, layout)| f64::from(layout.width())).fold(0.0, f64::max);
    let (margin_left, y_label_offset) = y_axis_offsets(widest);

    let viewport = Bounds::new(
      Range::new(margin_left, size.width - MARGIN_RIGHT),
      Range::new(size.height - MARGIN_BOTTOM, MARGIN_TOP),
    );
    let center_x = (viewport.x.min + viewport.x.max) / 2.0;
    let center_y = (viewport.y.min + viewport.y.max) / 2.0;

    if let Some(title) = &self.title {
      render.draw_text(DrawText {
        text: title,
        size: 24.0,
        weight: FontWeight::BOLD,
        brush: TEXT_COLOR,
        position: Point { x: center_x, y: viewport.y.max - 20.0 },
        horizontal_align: Align::Center,
        vertical_align: Align::End,
        ..Default::default()
      });
    }

    if let Some(x_label) = &self.x_label {
      render.draw_text(DrawText {
        text: x_label,
        size: AXIS_LABEL_SIZE,
        position: Point { x: center_x, y: viewport.y.min + 40.0 },
        brush: TEXT_COLOR,
        horizontal_align: Align::Center,
        vertical_align: Align::Start,
        ..Default::default()
      });
    }

    if let Some(y_label) = &self.y_label {
      render.draw_text(DrawText {
        text: y_label,
        size: AXIS_LABEL_SIZE,
        position: Point { x: viewport.x.min - y_label_offset, y: center_y },
        brush: TEXT_COLOR,
        transform: Affine::rotate(-std::f64::consts::FRAC_PI_2),
        horizontal_align: Align::Center,
        vertical_align: Align::End,
        ..Default::default()
      });
    }

    let border_stroke = Stroke::new(2.0);
    render.stroke(
      &Line::new(
        Point::new(viewport.x.min, viewport.y.min),
        Point::new(viewport.x.max, viewport.y.min),
      ),
      Affine::IDENTITY,
      &LINE_COLOR,
      &border_stroke,
    );
    render.stroke(
      &Line::new(
        Point::new(viewport.x.min, viewport.y.min),
        Point::new(viewport.x.min, viewport.y.max),
      ),
      Affine::IDENTITY,
      &LINE_COLOR,
      &border_stroke,
    );

    let transform = data_bounds.transform_to(viewport);
    let tick_stroke = border_stroke.clone().with_start_cap(Cap::Butt);

    for (y, text, layout) in y_ticks {
      let vy = (transform * Point::new(0.0, y)).y;
      if !viewport.y.contains(&vy) {
        continue;
      }

      render.stroke(
        &Line::new(Point::new(viewport.x.min, vy), Point::new(viewport.x.min - TICK_LENGTH, vy)),
        Affine::IDENTITY,
        &LINE_COLOR,
        &tick_stroke,
      );
      render.draw_text_layout(layout, DrawText {
        text: &text,
        size: TICK_LABEL_SIZE,
        position: Point { x: viewport.x.min - TICK_LABEL_GAP, y: vy },
        brush: TEXT_COLOR,
        horizontal_align: Align::End,
        vertical_align: Align::Center,
        ..Default::default()
      });
    }

    let iter = data_bounds.x.nice_ticks(TICKS);
    let precision = iter.label_precision();
    for (x, vx) in iter
      .map(|v| (v, (transform * Point::new(v, 0.0)).x))
      .filter(|(_, vx)| viewport.x.contains(vx))
    {
      render.stroke(
        &Line::new(Point::new(vx, viewport.y.min), Point::new(vx, viewport.y.min + TICK_LENGTH)),
        Affine::IDENTITY,
        &LINE_COLOR,
        &tick_stroke,
      );
      render.draw_text(DrawText {
        text: &format!("{x:.precision$}"),
        size: TICK_LABEL_SIZE,
        position: Point { x: vx, y: viewport.y.min + TICK_LABEL_GAP },
        brush: TEXT_COLOR,
        horizontal_align: Align::Center,
        vertical_align: Align::Start,
        ..Default::default()
      });
    }

    for line in &self.axes {
      line.draw(render, transform);
    }
  }
}
