//! SVG chart rendering for training curves.
//!
//! Writes a single SVG with two side-by-side line panels: loss over epochs
//! and accuracy over epochs, each with train/test series. Hand-written SVG
//! keeps the output dependency-free and usable directly in reports.

use std::fs;
use std::path::Path;

use crate::utils::metrics::EpochMetrics;

const PANEL_WIDTH: f64 = 560.0;
const PANEL_HEIGHT: f64 = 420.0;
const MARGIN_TOP: f64 = 50.0;
const MARGIN_RIGHT: f64 = 30.0;
const MARGIN_BOTTOM: f64 = 60.0;
const MARGIN_LEFT: f64 = 70.0;

const COLOR_TRAIN: &str = "#e74c3c";
const COLOR_TEST: &str = "#3498db";
const COLOR_GRID: &str = "#ecf0f1";
const COLOR_AXIS: &str = "#2c3e50";
const COLOR_TEXT: &str = "#2c3e50";

/// A named line series within one panel
struct Series<'a> {
    name: &'a str,
    values: Vec<f64>,
    color: &'static str,
}

/// Render the loss/accuracy training curves to `path`.
///
/// `train` and `test` hold one record per completed epoch; the x-axis range
/// is derived from their length.
pub fn render_training_curves(
    train: &[EpochMetrics],
    test: &[EpochMetrics],
    path: &Path,
) -> std::io::Result<()> {
    let total_width = PANEL_WIDTH * 2.0;

    let mut svg = String::new();
    svg.push_str(&format!(
        r#"<svg xmlns="http://www.w3.org/2000/svg" viewBox="0 0 {} {}" width="{}" height="{}">"#,
        total_width, PANEL_HEIGHT, total_width, PANEL_HEIGHT
    ));
    svg.push_str(&format!(
        r#"<rect width="{}" height="{}" fill="white"/>"#,
        total_width, PANEL_HEIGHT
    ));

    let loss_series = [
        Series {
            name: "train loss",
            values: train.iter().map(|m| m.loss).collect(),
            color: COLOR_TRAIN,
        },
        Series {
            name: "test loss",
            values: test.iter().map(|m| m.loss).collect(),
            color: COLOR_TEST,
        },
    ];
    let max_loss = loss_series
        .iter()
        .flat_map(|s| s.values.iter().copied())
        .fold(0.0f64, f64::max);
    render_panel(
        &mut svg,
        0.0,
        "Loss",
        "loss",
        &loss_series,
        0.0,
        (max_loss * 1.05).max(1e-6),
    );

    let acc_series = [
        Series {
            name: "train acc",
            values: train.iter().map(|m| m.accuracy).collect(),
            color: COLOR_TRAIN,
        },
        Series {
            name: "test acc",
            values: test.iter().map(|m| m.accuracy).collect(),
            color: COLOR_TEST,
        },
    ];
    render_panel(&mut svg, PANEL_WIDTH, "Accuracy", "accuracy", &acc_series, 0.0, 1.0);

    svg.push_str("</svg>");

    fs::write(path, svg)
}

fn render_panel(
    svg: &mut String,
    offset_x: f64,
    title: &str,
    y_label: &str,
    series: &[Series<'_>],
    y_min: f64,
    y_max: f64,
) {
    let plot_width = PANEL_WIDTH - MARGIN_LEFT - MARGIN_RIGHT;
    let plot_height = PANEL_HEIGHT - MARGIN_TOP - MARGIN_BOTTOM;

    let num_points = series.iter().map(|s| s.values.len()).max().unwrap_or(0);
    let x_max = (num_points.saturating_sub(1)).max(1) as f64;

    // Title
    svg.push_str(&format!(
        r#"<text x="{}" y="30" text-anchor="middle" font-family="Arial, sans-serif" font-size="16" font-weight="bold" fill="{}">{}</text>"#,
        offset_x + PANEL_WIDTH / 2.0,
        COLOR_TEXT,
        escape_xml(title)
    ));

    // Grid lines and y-axis labels
    for i in 0..=5 {
        let y = MARGIN_TOP + plot_height - (i as f64 / 5.0) * plot_height;
        let value = y_min + (i as f64 / 5.0) * (y_max - y_min);

        svg.push_str(&format!(
            r#"<line x1="{}" y1="{}" x2="{}" y2="{}" stroke="{}" stroke-width="1"/>"#,
            offset_x + MARGIN_LEFT,
            y,
            offset_x + MARGIN_LEFT + plot_width,
            y,
            COLOR_GRID
        ));
        svg.push_str(&format!(
            r#"<text x="{}" y="{}" text-anchor="end" font-family="Arial, sans-serif" font-size="11" fill="{}">{:.2}</text>"#,
            offset_x + MARGIN_LEFT - 8.0,
            y + 4.0,
            COLOR_TEXT,
            value
        ));
    }

    // Axes
    svg.push_str(&format!(
        r#"<line x1="{}" y1="{}" x2="{}" y2="{}" stroke="{}" stroke-width="2"/>"#,
        offset_x + MARGIN_LEFT,
        MARGIN_TOP + plot_height,
        offset_x + MARGIN_LEFT + plot_width,
        MARGIN_TOP + plot_height,
        COLOR_AXIS
    ));
    svg.push_str(&format!(
        r#"<line x1="{}" y1="{}" x2="{}" y2="{}" stroke="{}" stroke-width="2"/>"#,
        offset_x + MARGIN_LEFT,
        MARGIN_TOP,
        offset_x + MARGIN_LEFT,
        MARGIN_TOP + plot_height,
        COLOR_AXIS
    ));

    // Axis labels
    svg.push_str(&format!(
        r#"<text x="{}" y="{}" text-anchor="middle" font-family="Arial, sans-serif" font-size="13" fill="{}">epoch</text>"#,
        offset_x + MARGIN_LEFT + plot_width / 2.0,
        PANEL_HEIGHT - 18.0,
        COLOR_TEXT
    ));
    svg.push_str(&format!(
        r#"<text x="{}" y="{}" text-anchor="middle" font-family="Arial, sans-serif" font-size="13" fill="{}" transform="rotate(-90 {} {})">{}</text>"#,
        offset_x + 20.0,
        PANEL_HEIGHT / 2.0,
        COLOR_TEXT,
        offset_x + 20.0,
        PANEL_HEIGHT / 2.0,
        escape_xml(y_label)
    ));

    // Series polylines and markers
    for s in series {
        if s.values.is_empty() {
            continue;
        }

        let mut path = String::new();
        for (i, &v) in s.values.iter().enumerate() {
            let x = offset_x + MARGIN_LEFT + (i as f64 / x_max) * plot_width;
            let y = MARGIN_TOP + plot_height
                - ((v - y_min) / (y_max - y_min)).clamp(0.0, 1.0) * plot_height;
            if i == 0 {
                path.push_str(&format!("M {} {}", x, y));
            } else {
                path.push_str(&format!(" L {} {}", x, y));
            }
        }
        svg.push_str(&format!(
            r#"<path d="{}" fill="none" stroke="{}" stroke-width="2.5"/>"#,
            path, s.color
        ));

        for (i, &v) in s.values.iter().enumerate() {
            let x = offset_x + MARGIN_LEFT + (i as f64 / x_max) * plot_width;
            let y = MARGIN_TOP + plot_height
                - ((v - y_min) / (y_max - y_min)).clamp(0.0, 1.0) * plot_height;
            svg.push_str(&format!(
                r#"<circle cx="{}" cy="{}" r="3.5" fill="{}" stroke="white" stroke-width="1.5"/>"#,
                x, y, s.color
            ));
        }
    }

    // Legend
    let mut legend_y = MARGIN_TOP + 8.0;
    for s in series {
        svg.push_str(&format!(
            r#"<rect x="{}" y="{}" width="12" height="12" fill="{}"/>"#,
            offset_x + PANEL_WIDTH - MARGIN_RIGHT - 100.0,
            legend_y,
            s.color
        ));
        svg.push_str(&format!(
            r#"<text x="{}" y="{}" font-family="Arial, sans-serif" font-size="11" fill="{}">{}</text>"#,
            offset_x + PANEL_WIDTH - MARGIN_RIGHT - 84.0,
            legend_y + 10.0,
            COLOR_TEXT,
            escape_xml(s.name)
        ));
        legend_y += 20.0;
    }
}

fn escape_xml(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&apos;")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::utils::metrics::Metrics;

    fn record(accuracy_hits: &[usize], loss: f64) -> EpochMetrics {
        let truth = vec![0; accuracy_hits.len()];
        let metrics = Metrics::from_predictions(accuracy_hits, &truth, 2);
        EpochMetrics::new(&metrics, loss)
    }

    #[test]
    fn test_training_curves_written() {
        let train = vec![record(&[0, 0, 1], 0.9), record(&[0, 0, 0], 0.5)];
        let test = vec![record(&[0, 1], 1.1), record(&[0, 0], 0.6)];

        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("curves.svg");
        render_training_curves(&train, &test, &path).unwrap();

        let content = std::fs::read_to_string(&path).unwrap();
        assert!(content.starts_with("<svg"));
        assert!(content.contains("Loss"));
        assert!(content.contains("Accuracy"));
        assert!(content.contains("train acc"));
    }

    #[test]
    fn test_single_epoch_does_not_divide_by_zero() {
        let train = vec![record(&[0], 0.7)];
        let test = vec![record(&[0], 0.8)];

        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("one_epoch.svg");
        render_training_curves(&train, &test, &path).unwrap();
        assert!(path.exists());
    }

    #[test]
    fn test_escape_xml() {
        assert_eq!(escape_xml("a<b>&"), "a&lt;b&gt;&amp;");
    }
}
