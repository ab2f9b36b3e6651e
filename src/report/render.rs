//! PNG rendering of planned charts.
//!
//! Charts are drawn into an in-memory RGB buffer with plotters and encoded
//! with the `image` crate. Text uses an embedded DejaVu Sans face, so no
//! system font lookup happens.

use image::{ImageFormat, RgbImage};
use plotters::coord::Shift;
use plotters::prelude::*;
use plotters::style::{FontStyle, register_font};
use std::fmt;
use std::ops::Range;
use std::path::{Path, PathBuf};
use std::sync::OnceLock;

use super::charts::Chart;

/// Font family every text element is drawn with.
const FONT_FAMILY: &str = "sans-serif";

static FONT_DATA: &[u8] = include_bytes!("../../assets/fonts/DejaVuSans.ttf");

/// Line colors per series index, cycled.
const SERIES_COLORS: [RGBColor; 6] = [
    RGBColor(2, 62, 255),
    RGBColor(255, 124, 0),
    RGBColor(26, 201, 56),
    RGBColor(232, 0, 11),
    RGBColor(139, 43, 226),
    RGBColor(159, 72, 0),
];

/// Error type for chart rendering failures.
#[derive(Debug)]
pub enum ChartError {
    /// The embedded font could not be registered.
    Font,
    /// Plotting failed.
    Draw(String),
    /// The drawn buffer did not match the requested dimensions.
    Buffer { width: u32, height: u32 },
    /// The image could not be encoded or written.
    Encode { path: PathBuf, message: String },
}

impl fmt::Display for ChartError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ChartError::Font => write!(f, "Failed to load embedded chart font"),
            ChartError::Draw(msg) => write!(f, "Failed to draw chart: {}", msg),
            ChartError::Buffer { width, height } => write!(f, "Chart buffer does not match {}x{}", width, height),
            ChartError::Encode { path, message } => write!(f, "Failed to write {}: {}", path.display(), message),
        }
    }
}

impl std::error::Error for ChartError {}

/// Register the embedded font once per process.
fn ensure_font() -> Result<(), ChartError> {
    static REGISTERED: OnceLock<bool> = OnceLock::new();
    let registered = *REGISTERED.get_or_init(|| register_font(FONT_FAMILY, FontStyle::Normal, FONT_DATA).is_ok());
    if registered { Ok(()) } else { Err(ChartError::Font) }
}

/// Draw a chart into an RGB image of the given size.
///
/// # Parameters
///
/// * `chart` - Planned chart
/// * `(width, height)` - Canvas size in pixels
pub fn render_chart(chart: &Chart, (width, height): (u32, u32)) -> Result<RgbImage, ChartError> {
    ensure_font()?;

    let mut buffer = vec![0u8; width as usize * height as usize * 3];
    {
        let root = BitMapBackend::with_buffer(&mut buffer, (width, height)).into_drawing_area();
        draw_chart(&root, chart).map_err(|e| ChartError::Draw(e.to_string()))?;
        root.present().map_err(|e| ChartError::Draw(e.to_string()))?;
    }

    RgbImage::from_raw(width, height, buffer).ok_or(ChartError::Buffer { width, height })
}

/// Render a chart and write it as a PNG file, replacing any existing file.
pub fn save_chart(chart: &Chart, size: (u32, u32), path: &Path) -> Result<(), ChartError> {
    let image = render_chart(chart, size)?;
    image.save_with_format(path, ImageFormat::Png).map_err(|e| ChartError::Encode {
        path: path.to_path_buf(),
        message: e.to_string(),
    })?;
    log::info!("Wrote {}", path.display());
    Ok(())
}

fn draw_chart<DB: DrawingBackend>(root: &DrawingArea<DB, Shift>, chart: &Chart) -> Result<(), DrawingAreaErrorKind<DB::ErrorType>> {
    root.fill(&WHITE)?;

    let (x_range, y_range) = axis_ranges(chart);
    let mut ctx = ChartBuilder::on(root)
        .caption(&chart.title, (FONT_FAMILY, 24).into_font())
        .margin(20)
        .x_label_area_size(50)
        .y_label_area_size(80)
        .build_cartesian_2d(x_range, y_range)?;

    ctx.configure_mesh()
        .x_desc(chart.x_label.as_str())
        .y_desc(chart.y_label.as_str())
        .label_style((FONT_FAMILY, 14).into_font())
        .axis_desc_style((FONT_FAMILY, 16).into_font())
        .draw()?;

    for (index, series) in chart.series.iter().enumerate() {
        let color = SERIES_COLORS[index % SERIES_COLORS.len()];
        ctx.draw_series(LineSeries::new(finite_points(&series.points), color.stroke_width(2)))?
            .label(series.label.as_str())
            .legend(move |(x, y)| PathElement::new(vec![(x, y), (x + 20, y)], color.stroke_width(2)));
    }

    if !chart.series.is_empty() {
        ctx.configure_series_labels()
            .position(SeriesLabelPosition::UpperRight)
            .background_style(&WHITE.mix(0.8))
            .border_style(&BLACK)
            .label_font((FONT_FAMILY, 14).into_font())
            .draw()?;
    }

    Ok(())
}

/// Axis ranges covering every point of every series.
///
/// The y axis starts at zero for non-negative data. Degenerate ranges are
/// widened so the chart always has a drawable extent. Non-finite points are
/// ignored.
fn axis_ranges(chart: &Chart) -> (Range<f64>, Range<f64>) {
    let mut points = chart.series.iter().flat_map(|s| finite_points(&s.points));
    let Some((x0, y0)) = points.next() else {
        return (0.0..1.0, 0.0..1.0);
    };

    let (mut x_min, mut x_max, mut y_min, mut y_max) = (x0, x0, y0, y0);
    for (x, y) in points {
        x_min = x_min.min(x);
        x_max = x_max.max(x);
        y_min = y_min.min(y);
        y_max = y_max.max(y);
    }

    let y_min = y_min.min(0.0);
    let y_max = if y_max > y_min { y_max + (y_max - y_min) * 0.05 } else { y_min + 1.0 };
    let x_max = if x_max > x_min { x_max } else { x_min + 1.0 };

    (x_min..x_max, y_min..y_max)
}

fn finite_points(points: &[(f64, f64)]) -> impl Iterator<Item = (f64, f64)> + '_ {
    points.iter().copied().filter(|(x, y)| x.is_finite() && y.is_finite())
}
