use std::{
    ops::Range,
    path::{Path, PathBuf},
};

use common::{
    config::Settings,
    plot::{ChartKind, Plot},
    sample::Dataset,
    util::{Figure, format_seconds, open_viewer, points, points_px},
};
use eyre::{Result, bail};
use plotters::{
    prelude::*,
    style::text_anchor::{HPos, Pos, VPos},
};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

const FONT: &str = "sans-serif";

/// Duration over configuration as a single line series
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct LineBasic {
    pub output: PathBuf,
    pub title: String,
    pub x_label: String,
    pub y_label: String,
    #[serde(default)]
    pub figure: Figure,
    /// Print each duration above its point
    #[serde(default)]
    pub annotate: bool,
    /// Open the image in a viewer once written
    #[serde(default)]
    pub show: bool,
}

impl Default for LineBasic {
    fn default() -> Self {
        Self {
            output: PathBuf::from("performance_plot.png"),
            title: "Image Processing Performance".to_owned(),
            x_label: "Number of Threads".to_owned(),
            y_label: "Execution Time (seconds)".to_owned(),
            figure: Figure::default(),
            annotate: true,
            show: false,
        }
    }
}

#[async_trait::async_trait]
#[typetag::serde]
impl Plot for LineBasic {
    fn kind(&self) -> ChartKind {
        ChartKind::Line
    }

    fn output(&self) -> &Path {
        &self.output
    }

    async fn plot(&self, dataset: &Dataset, filepath: &Path, settings: &Settings) -> Result<()> {
        let data = series(dataset);
        if data.is_empty() {
            bail!("Nothing to plot for {}", self.title);
        }
        self.draw(&data, filepath, settings.dpi())?;
        debug!("Wrote {} points to {filepath:?}", data.len());

        if settings.show(self.show) {
            if let Err(err) = open_viewer(filepath) {
                warn!("Could not display {filepath:?}: {err:#}");
            }
        }
        Ok(())
    }
}

/// (workers, seconds) in file order
pub fn series(dataset: &Dataset) -> Vec<(i64, f64)> {
    dataset
        .iter()
        .map(|s| (i64::from(s.configuration.workers()), s.duration))
        .collect()
}

/// Axis ranges with a 5% margin, extra headroom on top for annotations
pub fn axis_ranges(data: &[(i64, f64)]) -> (Range<i64>, Range<f64>) {
    let x_min = data.iter().map(|p| p.0).min().unwrap_or(0);
    let x_max = data.iter().map(|p| p.0).max().unwrap_or(0);
    let x_pad = ((x_max - x_min) / 20).max(1);

    let y_min = data.iter().map(|p| p.1).fold(f64::INFINITY, f64::min);
    let y_max = data.iter().map(|p| p.1).fold(f64::NEG_INFINITY, f64::max);
    let span = if y_max > y_min {
        y_max - y_min
    } else {
        y_max.abs().max(1.0)
    };
    (
        (x_min - x_pad)..(x_max + x_pad + 1),
        (y_min - span * 0.05)..(y_max + span * 0.12),
    )
}

impl LineBasic {
    fn draw(&self, data: &[(i64, f64)], filepath: &Path, dpi: u32) -> Result<()> {
        let root = BitMapBackend::new(filepath, self.figure.pixels(dpi)).into_drawing_area();
        root.fill(&WHITE)?;

        let (x_range, y_range) = axis_ranges(data);
        let mut chart = ChartBuilder::on(&root)
            .caption(&self.title, (FONT, points(14.0, dpi)).into_font())
            .margin(points_px(8.0, dpi))
            .x_label_area_size(points_px(36.0, dpi))
            .y_label_area_size(points_px(56.0, dpi))
            .build_cartesian_2d(x_range, y_range)?;

        chart
            .configure_mesh()
            .x_desc(self.x_label.as_str())
            .y_desc(self.y_label.as_str())
            .axis_desc_style((FONT, points(12.0, dpi)).into_font())
            .label_style((FONT, points(10.0, dpi)).into_font())
            .bold_line_style(BLACK.mix(0.15))
            .light_line_style(WHITE)
            .y_label_formatter(&|y| format!("{y:.2}"))
            .draw()?;

        chart.draw_series(LineSeries::new(
            data.iter().copied(),
            BLUE.stroke_width(points_px(1.5, dpi) as u32),
        ))?;
        let radius = points_px(4.0, dpi) as u32;
        chart.draw_series(
            data.iter()
                .map(|&point| Circle::new(point, radius, BLUE.filled())),
        )?;

        if self.annotate {
            let style = TextStyle::from((FONT, points(10.0, dpi)).into_font())
                .pos(Pos::new(HPos::Center, VPos::Bottom));
            let offset = points_px(10.0, dpi);
            chart.draw_series(data.iter().map(|&(x, y)| {
                EmptyElement::at((x, y)) + Text::new(format_seconds(y), (0, -offset), style.clone())
            }))?;
        }

        root.present()?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use common::sample::{Configuration, Sample};
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn series_uses_workers() {
        let dataset = Dataset::new(vec![
            Sample::new(Configuration::Count(1), 0.5),
            Sample::new(Configuration::hybrid(2, 2).unwrap(), 0.25),
        ]);
        assert_eq!(series(&dataset), vec![(1, 0.5), (4, 0.25)]);
    }

    #[test]
    fn ranges_contain_every_point() {
        let data = vec![(1, 2.0), (2, 1.0), (4, 0.5), (16, 0.2)];
        let (x, y) = axis_ranges(&data);
        for (px, py) in data {
            assert!(x.contains(&px));
            assert!(y.contains(&py));
        }
        assert_eq!(x, 0..18);
    }

    #[test]
    fn ranges_for_single_point() {
        let (x, y) = axis_ranges(&[(8, 0.0)]);
        assert_eq!(x, 7..10);
        assert!(y.start < 0.0 && y.end > 0.0);
    }

    #[test]
    fn serde_defaults() {
        let plot: LineBasic = serde_json::from_str(
            r#"{"output":"a.png","title":"t","x_label":"x","y_label":"y"}"#,
        )
        .unwrap();
        assert_eq!(plot.figure, Figure::default());
        assert!(!plot.annotate);
        assert!(!plot.show);
    }
}
