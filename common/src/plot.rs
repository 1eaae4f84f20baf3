use core::fmt::{self, Debug};
use std::path::{Path, PathBuf};

use dyn_clone::{DynClone, clone_trait_object};
use eyre::{Context, Result, bail};
use serde::{Deserialize, Serialize};
use tokio::fs::create_dir_all;
use tracing::{debug, info};

use crate::{
    config::{PlotJob, Settings},
    load::load,
    sample::Dataset,
};

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ChartKind {
    #[default]
    Line,
    GroupedBar,
}

impl fmt::Display for ChartKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ChartKind::Line => write!(f, "line"),
            ChartKind::GroupedBar => write!(f, "grouped_bar"),
        }
    }
}

#[typetag::serde(tag = "type")]
#[async_trait::async_trait]
pub trait Plot: Debug + DynClone + Send + Sync {
    fn kind(&self) -> ChartKind;
    /// Image filename, relative to the plot directory
    fn output(&self) -> &Path;
    /// Renders the dataset
    ///
    /// Arguments:
    /// * `dataset` - Loaded samples, in file order
    /// * `filepath` - Where the image is written, its parent must exist
    /// * `settings` - The settings from the config yaml
    async fn plot(&self, dataset: &Dataset, filepath: &Path, settings: &Settings) -> Result<()>;
}
clone_trait_object!(Plot);

pub async fn ensure_plot_dir(dir: &Path) -> Result<()> {
    if !dir.as_os_str().is_empty() {
        create_dir_all(dir)
            .await
            .context(format!("Create plot dir {dir:?}"))?;
    }
    Ok(())
}

/// Load, then render, a single job. Returns the written image path
pub async fn run_job(job: &PlotJob, settings: &Settings) -> Result<PathBuf> {
    let dataset = load(&job.input, &job.format)
        .await
        .context(format!("Loading {:?} for job {}", job.input, job.name))?;
    info!("Loaded {} samples for {}", dataset.len(), job.name);
    if dataset.is_empty() {
        bail!("No samples in {:?}", job.input);
    }

    let plot_dir = settings.output_dir();
    ensure_plot_dir(&plot_dir).await?;
    let filepath = plot_dir.join(job.plot.output());
    debug!(
        "Rendering {} chart for {} to {filepath:?}",
        job.plot.kind(),
        job.name
    );
    job.plot
        .plot(&dataset, &filepath, settings)
        .await
        .context(format!("Plotting {}", job.name))?;
    Ok(filepath)
}
