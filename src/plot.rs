//! Plotting seam.
//!
//! Models do not render anything themselves. They describe what should be
//! drawn as a [`PlotRequest`] and hand it to a caller-supplied [`Plotter`].

use crate::error::CorrelError;

/// Scatter of reference against target with an optional fitted curve.
#[derive(Clone, Debug, PartialEq)]
pub struct ScatterPlot {
    /// Plot title
    pub title: String,
    /// Horizontal axis label
    pub x_label: String,
    /// Vertical axis label
    pub y_label: String,
    /// Reference values
    pub x: Vec<f64>,
    /// Target values
    pub y: Vec<f64>,
    /// Fitted curve sampled as `(x, y)` points, ordered by `x`
    pub fit_line: Vec<(f64, f64)>,
}

impl ScatterPlot {
    /// Scatter with default axis labels and no fit line.
    pub fn new(title: impl Into<String>, x: Vec<f64>, y: Vec<f64>) -> Self {
        Self {
            title: title.into(),
            x_label: "Reference".to_string(),
            y_label: "Target".to_string(),
            x,
            y,
            fit_line: Vec::new(),
        }
    }

    /// Sample `f` at `n` evenly spaced points across the range of `x`.
    pub fn with_fit(mut self, n: usize, f: impl Fn(f64) -> f64) -> Self {
        let (lo, hi) = self
            .x
            .iter()
            .filter(|v| v.is_finite())
            .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), &v| (lo.min(v), hi.max(v)));
        if lo.is_finite() && n >= 2 {
            let step = (hi - lo) / (n - 1) as f64;
            self.fit_line = (0..n)
                .map(|i| {
                    let x = lo + step * i as f64;
                    (x, f(x))
                })
                .collect();
        }
        self
    }
}

/// Per-sector veer summary for a wind vane plot.
#[derive(Clone, Debug, PartialEq)]
pub struct WindVanePlot {
    /// Sector labels
    pub labels: Vec<String>,
    /// Average veer per sector in degrees (`NaN` for unfitted sectors)
    pub average_veer: Vec<f64>,
    /// Points used per sector
    pub counts: Vec<usize>,
}

/// What a model asks the plotter to draw.
#[derive(Clone, Debug, PartialEq)]
pub enum PlotRequest {
    /// Reference vs target scatter
    Scatter(ScatterPlot),
    /// Directional veer summary
    WindVane(WindVanePlot),
}

/// Rendering backend supplied by the caller.
pub trait Plotter {
    /// Draw one figure.
    fn draw(&mut self, request: PlotRequest) -> Result<(), CorrelError>;
}

/// Result of a plot call.
#[derive(Clone, Debug, PartialEq)]
pub enum PlotOutcome {
    /// Every figure was handed to the plotter
    Rendered,
    /// The model has no 2D representation; the message says why
    Unsupported(String),
}

impl PlotOutcome {
    /// True when the plotter was called.
    pub fn is_rendered(&self) -> bool {
        matches!(self, Self::Rendered)
    }
}

/// Plotter that keeps every request, for tests and deferred rendering.
#[derive(Clone, Debug, Default)]
pub struct RecordingPlotter {
    /// Requests in call order
    pub requests: Vec<PlotRequest>,
}

impl Plotter for RecordingPlotter {
    fn draw(&mut self, request: PlotRequest) -> Result<(), CorrelError> {
        self.requests.push(request);
        Ok(())
    }
}
