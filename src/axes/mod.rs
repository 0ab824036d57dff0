mod line;

pub use line::{LineAxes, LineOptions};

use crate::Plot;
use polars::prelude::*;

impl Plot {
  pub fn line(&mut self, x: &Column, y: &Column) -> PolarsResult<&mut LineAxes> {
    self.axes.push(LineAxes::new(x, y)?);
    let last = self.axes.len() - 1;
    Ok(&mut self.axes[last])
  }
}
