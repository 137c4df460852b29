//! Chart rendering: line charts written as standalone SVG artifacts.
//!
//! Artifacts are self-contained SVG documents so the desktop front end can
//! open them without a raster pipeline. One panel per column; the stacked
//! variant places every numeric column in its own panel of one document.

use std::fmt::Write as _;
use std::fs;
use std::path::Path;

use crate::error::AppError;
use crate::frame::{Column, Frame};

const WIDTH: f64 = 800.0;
const PANEL_HEIGHT: f64 = 280.0;
const MARGIN: f64 = 48.0;

/// Render a line chart of one numeric column to `out`.
///
/// The column must exist and carry at least one present numeric value; the
/// caller is expected to have checked both.
pub fn render_column(frame: &Frame, name: &str, out: &Path) -> Result<(), AppError> {
    let col = frame
        .column(name)
        .ok_or_else(|| AppError::Plot(format!("column '{name}' not found")))?;
    let values = col.numeric_values();
    if values.is_empty() {
        return Err(AppError::Plot(format!("column '{}' has no numeric values", col.name)));
    }

    let mut body = String::new();
    panel(&mut body, &col.name, &values, 0.0);
    write_svg(out, PANEL_HEIGHT, &body)
}

/// Render every numeric column as a stacked multi-panel line chart.
pub fn render_all_numeric(frame: &Frame, out: &Path) -> Result<(), AppError> {
    let numeric: Vec<&Column> = frame
        .numeric_columns()
        .into_iter()
        .filter(|c| !c.numeric_values().is_empty())
        .collect();
    if numeric.is_empty() {
        return Err(AppError::Plot("no numeric columns to plot".into()));
    }

    let mut body = String::new();
    for (i, col) in numeric.iter().enumerate() {
        panel(&mut body, &col.name, &col.numeric_values(), i as f64 * PANEL_HEIGHT);
    }
    write_svg(out, numeric.len() as f64 * PANEL_HEIGHT, &body)
}

fn write_svg(out: &Path, height: f64, body: &str) -> Result<(), AppError> {
    if let Some(parent) = out.parent() {
        fs::create_dir_all(parent)
            .map_err(|e| AppError::Plot(format!("cannot create {}: {e}", parent.display())))?;
    }
    let doc = format!(
        "<svg xmlns=\"http://www.w3.org/2000/svg\" width=\"{WIDTH}\" height=\"{height}\" \
         viewBox=\"0 0 {WIDTH} {height}\" font-family=\"sans-serif\">\n\
         <rect width=\"{WIDTH}\" height=\"{height}\" fill=\"white\"/>\n{body}</svg>\n"
    );
    fs::write(out, doc).map_err(|e| AppError::Plot(format!("cannot write {}: {e}", out.display())))
}

/// Append one chart panel at vertical `offset`: frame, title, y-range
/// labels, and the value polyline.
fn panel(body: &mut String, title: &str, values: &[f64], offset: f64) {
    let min = values.iter().cloned().fold(f64::INFINITY, f64::min);
    let max = values.iter().cloned().fold(f64::NEG_INFINITY, f64::max);
    // Constant series still get a visible span.
    let (min, max) = if (max - min).abs() < f64::EPSILON {
        (min - 1.0, max + 1.0)
    } else {
        (min, max)
    };

    let left = MARGIN;
    let right = WIDTH - MARGIN;
    let top = offset + MARGIN;
    let bottom = offset + PANEL_HEIGHT - MARGIN;

    let x_at = |i: usize| {
        let steps = (values.len() - 1).max(1) as f64;
        left + i as f64 * (right - left) / steps
    };
    let y_at = |v: f64| bottom - (v - min) / (max - min) * (bottom - top);

    let points: Vec<String> = values
        .iter()
        .enumerate()
        .map(|(i, v)| format!("{:.2},{:.2}", x_at(i), y_at(*v)))
        .collect();

    let _ = writeln!(
        body,
        "<rect x=\"{left}\" y=\"{top}\" width=\"{}\" height=\"{}\" fill=\"none\" stroke=\"#999\"/>",
        right - left,
        bottom - top
    );
    let _ = writeln!(
        body,
        "<text x=\"{left}\" y=\"{}\" font-size=\"16\">{}</text>",
        top - 12.0,
        xml_escape(title)
    );
    let _ = writeln!(
        body,
        "<text x=\"4\" y=\"{top}\" font-size=\"11\" fill=\"#555\">{}</text>",
        crate::frame::fmt_num(max)
    );
    let _ = writeln!(
        body,
        "<text x=\"4\" y=\"{bottom}\" font-size=\"11\" fill=\"#555\">{}</text>",
        crate::frame::fmt_num(min)
    );
    let _ = writeln!(
        body,
        "<polyline fill=\"none\" stroke=\"#1f77b4\" stroke-width=\"1.5\" points=\"{}\"/>",
        points.join(" ")
    );
}

fn xml_escape(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
}
