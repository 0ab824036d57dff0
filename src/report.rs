//! The heap evolution report: three line charts drawn from one dataset.

use crate::{
  Plot,
  dataset::{CASCADING_CUTS, Dataset, HEAP_HEIGHT, NUM_TREES, STEP},
  error::{Error, Result},
  theme,
};

pub const X_LABEL: &str = "Extract-min step";

/// Somewhere plots are shown. Presenting may block, e.g. until a window is
/// closed.
pub trait Surface {
  fn present(&mut self, plot: &Plot) -> Result<()>;
}

/// One chart of the report: a metric column plotted against a step column.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct MetricChart {
  pub name:     &'static str,
  pub x_column: &'static str,
  pub y_column: &'static str,
  pub x_label:  &'static str,
  pub y_label:  &'static str,
  pub title:    &'static str,
  /// Position of the line color in the theme palette.
  pub hue:      f32,
}

pub const CHARTS: [MetricChart; 3] = [
  MetricChart {
    name:     "heap_height",
    x_column: STEP,
    y_column: HEAP_HEIGHT,
    x_label:  X_LABEL,
    y_label:  "Heap height estimate",
    title:    "Heap Height Evolution (Fibonacci Heap)",
    hue:      0.0,
  },
  MetricChart {
    name:     "num_trees",
    x_column: STEP,
    y_column: NUM_TREES,
    x_label:  X_LABEL,
    y_label:  "Number of trees",
    title:    "Root List Size Evolution (Fibonacci Heap)",
    hue:      0.5,
  },
  MetricChart {
    name:     "cascading_cuts",
    x_column: STEP,
    y_column: CASCADING_CUTS,
    x_label:  X_LABEL,
    y_label:  "Total cascading cuts",
    title:    "Cascading Cuts Over Time (Fibonacci Heap)",
    hue:      1.0,
  },
];

impl MetricChart {
  /// Builds the chart's plot without presenting it.
  pub fn plot(&self, dataset: &Dataset) -> Result<Plot> {
    let x = dataset.column(self.x_column)?;
    let y = dataset.column(self.y_column)?;

    let mut plot = Plot::new();
    plot.name(self.name).title(self.title).x_label(self.x_label).y_label(self.y_label);
    plot
      .line(x, y)
      .map_err(|e| Error::format(None, e.to_string()))?
      .color(theme::ROCKET.brush(self.hue));

    Ok(plot)
  }
}

/// Plots one metric and hands it to `surface`.
pub fn render_metric<S: Surface + ?Sized>(
  dataset: &Dataset,
  chart: &MetricChart,
  surface: &mut S,
) -> Result<()> {
  let plot = chart.plot(dataset)?;
  tracing::info!(chart = chart.name, points = dataset.len(), "rendering chart");
  surface.present(&plot)
}

/// Renders every chart in [`CHARTS`], in order. Stops at the first error;
/// charts presented before it stay presented.
pub fn run<S: Surface + ?Sized>(dataset: &Dataset, surface: &mut S) -> Result<()> {
  for chart in &CHARTS {
    render_metric(dataset, chart, surface)?;
  }

  Ok(())
}
