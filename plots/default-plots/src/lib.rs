use std::path::{Path, PathBuf};

use common::{
    config::{Config, PlotJob, Settings},
    format::InputFormat,
    plot::{ChartKind, Plot, ensure_plot_dir},
    sample::Dataset,
    util::Figure,
};
use eyre::Result;
pub use grouped_bar::GroupedBar;
pub use line_basic::LineBasic;
use tracing::debug;

/// The plot a chart kind gets when nothing else is configured
pub fn default_plot(kind: ChartKind, output: &Path) -> Box<dyn Plot> {
    match kind {
        ChartKind::Line => Box::new(LineBasic {
            output: output.to_path_buf(),
            show: true,
            ..Default::default()
        }),
        ChartKind::GroupedBar => Box::new(GroupedBar {
            output: output.to_path_buf(),
            ..Default::default()
        }),
    }
}

/// Draws `dataset` as `chart_kind` into `output_path`.
/// `settings` picks the dpi and can override whether line charts open in a viewer.
pub async fn render(
    dataset: &Dataset,
    chart_kind: ChartKind,
    output_path: &Path,
    settings: &Settings,
) -> Result<()> {
    if let Some(parent) = output_path.parent() {
        ensure_plot_dir(parent).await?;
    }
    debug!("Rendering {chart_kind} chart to {output_path:?}");
    default_plot(chart_kind, output_path)
        .plot(dataset, output_path, settings)
        .await
}

fn line_job(name: &str, input: &str, format: InputFormat, plot: LineBasic) -> PlotJob {
    PlotJob {
        name: name.to_owned(),
        input: PathBuf::from(input),
        format,
        plot: Box::new(plot),
    }
}

/// The image processing experiments: pthread, MPI, OpenMP and hybrid MPI+pthread runs
pub fn builtin_config() -> Config {
    Config {
        name: "image-processing".to_owned(),
        settings: Settings::default(),
        jobs: vec![
            line_job(
                "pthread",
                "timing_results2.txt",
                InputFormat::whitespace_pair(),
                LineBasic {
                    output: PathBuf::from("performance_plot.png"),
                    title: "Image Processing Performance".to_owned(),
                    x_label: "Number of Threads".to_owned(),
                    y_label: "Execution Time (seconds)".to_owned(),
                    figure: Figure::new(8.0, 6.0),
                    annotate: false,
                    show: true,
                },
            ),
            line_job(
                "mpi",
                "mpi_average_timing_results.txt",
                InputFormat::csv_pair(),
                LineBasic {
                    output: PathBuf::from("mpi_performance_plot.png"),
                    title: "MPI Image Processing Performance".to_owned(),
                    x_label: "Number of Processes".to_owned(),
                    y_label: "Average Execution Time (seconds)".to_owned(),
                    figure: Figure::new(10.0, 6.0),
                    annotate: true,
                    show: false,
                },
            ),
            line_job(
                "openmp",
                "openmp_average_timing_results.txt",
                InputFormat::csv_pair(),
                LineBasic {
                    output: PathBuf::from("openmp_performance_plot.png"),
                    title: "OpenMP Image Processing Performance".to_owned(),
                    x_label: "Number of Threads".to_owned(),
                    y_label: "Average Execution Time (seconds)".to_owned(),
                    figure: Figure::new(10.0, 6.0),
                    annotate: true,
                    show: false,
                },
            ),
            PlotJob {
                name: "hybrid".to_owned(),
                input: PathBuf::from("hybrid_average_timing_results.txt"),
                format: InputFormat::hybrid_table(),
                plot: Box::new(GroupedBar::default()),
            },
        ],
    }
}
