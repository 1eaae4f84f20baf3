use std::path::{Path, PathBuf};

use common::{
    config::Settings,
    plot::{ChartKind, Plot},
    sample::Dataset,
    util::{Figure, TAB10, format_seconds, points, points_px},
};
use eyre::{Result, bail};
use plotters::{
    prelude::*,
    style::text_anchor::{HPos, Pos, VPos},
};
use serde::{Deserialize, Serialize};
use tracing::debug;

pub mod layout;

use layout::{BarLayout, layout, y_ticks};

const FONT: &str = "sans-serif";
const LEGEND_TITLE: &str = "Parallel Workers";
const Y_TICKS: usize = 8;

fn default_figure() -> Figure {
    Figure::new(12.0, 7.0)
}

/// Bars clustered by total worker count, one colour per cluster
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct GroupedBar {
    pub output: PathBuf,
    pub title: String,
    pub x_label: String,
    pub y_label: String,
    #[serde(default = "default_figure")]
    pub figure: Figure,
}

impl Default for GroupedBar {
    fn default() -> Self {
        Self {
            output: PathBuf::from("hybrid_performance_plot.png"),
            title: "Hybrid MPI+Pthread Image Processing Performance".to_owned(),
            x_label: "Configuration (processes × threads)".to_owned(),
            y_label: "Average Execution Time (seconds)".to_owned(),
            figure: default_figure(),
        }
    }
}

#[async_trait::async_trait]
#[typetag::serde]
impl Plot for GroupedBar {
    fn kind(&self) -> ChartKind {
        ChartKind::GroupedBar
    }

    fn output(&self) -> &Path {
        &self.output
    }

    async fn plot(&self, dataset: &Dataset, filepath: &Path, settings: &Settings) -> Result<()> {
        let bars = layout(dataset);
        if bars.bars.is_empty() {
            bail!("Nothing to plot for {}", self.title);
        }
        debug!(
            "{} bars in {} groups over {} slots",
            bars.bars.len(),
            bars.groups.len(),
            bars.slots()
        );
        self.draw(&bars, filepath, settings.dpi())
    }
}

impl GroupedBar {
    fn draw(&self, bars: &BarLayout, filepath: &Path, dpi: u32) -> Result<()> {
        let root = BitMapBackend::new(filepath, self.figure.pixels(dpi)).into_drawing_area();
        root.fill(&WHITE)?;

        let x_range = bars.x_range();
        let y_max = bars.y_max();
        let ticks = y_ticks(y_max, Y_TICKS);
        let mut chart = ChartBuilder::on(&root)
            .caption(&self.title, (FONT, points(14.0, dpi)).into_font())
            .margin(points_px(8.0, dpi))
            .x_label_area_size(points_px(36.0, dpi))
            .y_label_area_size(points_px(56.0, dpi))
            .build_cartesian_2d(
                x_range.clone().with_key_points(bars.x_ticks()),
                (0f64..y_max).with_key_points(ticks.clone()),
            )?;

        let labels = bars.slot_labels();
        chart
            .configure_mesh()
            .disable_mesh()
            .x_label_formatter(&|x| {
                labels
                    .get(x.round().max(0.0) as usize)
                    .cloned()
                    .unwrap_or_default()
            })
            .x_desc(self.x_label.as_str())
            .y_desc(self.y_label.as_str())
            .axis_desc_style((FONT, points(12.0, dpi)).into_font())
            .label_style((FONT, points(9.0, dpi)).into_font())
            .y_label_formatter(&|y| format!("{y:.2}"))
            .draw()?;

        // Dashed y-grid under the bars
        let dash = points_px(3.0, dpi).max(1);
        for y in ticks.into_iter().filter(|y| *y > 0.0) {
            chart.draw_series(DashedLineSeries::new(
                [(x_range.start, y), (x_range.end, y)],
                dash,
                dash,
                BLACK.mix(0.3).stroke_width(1),
            ))?;
        }

        chart
            .draw_series(std::iter::empty::<Circle<(f64, f64), i32>>())?
            .label(LEGEND_TITLE);

        let legend_px = points_px(5.0, dpi);
        for (i, group) in bars.groups.iter().enumerate() {
            let color = TAB10[group.color];
            chart
                .draw_series(bars.bars.iter().filter(|b| b.group == i).map(|b| {
                    let span = b.span();
                    Rectangle::new([(span.start, 0.0), (span.end, b.duration)], color.filled())
                }))?
                .label(format!("{} workers", group.workers))
                .legend(move |(x, y)| {
                    Rectangle::new(
                        [(x, y - legend_px), (x + 2 * legend_px, y + legend_px)],
                        color.filled(),
                    )
                });
        }

        let style = TextStyle::from((FONT, points(9.0, dpi)).into_font())
            .pos(Pos::new(HPos::Center, VPos::Bottom));
        let offset = points_px(2.0, dpi);
        chart.draw_series(bars.bars.iter().map(|b| {
            EmptyElement::at((b.slot as f64, b.duration))
                + Text::new(format_seconds(b.duration), (0, -offset), style.clone())
        }))?;

        chart
            .configure_series_labels()
            .position(SeriesLabelPosition::UpperRight)
            .label_font((FONT, points(10.0, dpi)).into_font())
            .background_style(WHITE.mix(0.8))
            .border_style(BLACK.mix(0.3))
            .draw()?;

        root.present()?;
        Ok(())
    }
}
