use std::path::Path;

use common::{
    config::{Config, PlotJob},
    plot::run_job,
};
use eyre::{Context, Result, bail};
use regex::Regex;
use tokio::fs::{read_to_string, write};
use tracing::{debug, info, warn};

/// Reads the job config, falling back to the built-in experiments when the file is absent
pub async fn read_config(config_file: &Path) -> Result<Config> {
    if !config_file.exists() {
        info!("{config_file:?} not found, using built-in jobs");
        return Ok(default_plots::builtin_config());
    }
    let config: Config = serde_yml::from_str(
        &read_to_string(config_file)
            .await
            .context(format!("Reading {config_file:?}"))?,
    )
    .context(format!("Parsing {config_file:?}"))?;
    debug!("Loaded config {} with {} jobs", config.name, config.jobs.len());
    Ok(config)
}

pub fn select_jobs<'a>(config: &'a Config, filter: Option<&str>) -> Result<Vec<&'a PlotJob>> {
    let filter = filter.map(Regex::new).transpose()?;
    Ok(config
        .jobs
        .iter()
        .filter(|job| filter.as_ref().is_none_or(|re| re.is_match(&job.name)))
        .collect())
}

pub async fn plot(config_file: &Path, filter: Option<&str>, no_show: bool) -> Result<()> {
    let mut config = read_config(config_file).await?;
    if no_show {
        config.settings.show = Some(false);
    }

    let jobs = select_jobs(&config, filter)?;
    if jobs.is_empty() {
        warn!("No jobs matched {filter:?}");
    }
    for job in jobs {
        let filepath = run_job(job, &config.settings).await?;
        println!("Performance plot saved as '{}'", filepath.display());
    }
    Ok(())
}

pub async fn list_jobs(config_file: &Path) -> Result<()> {
    let config = read_config(config_file).await?;
    for job in &config.jobs {
        println!(
            "{} -> {} ({} chart, {})",
            job.name,
            job.input.display(),
            job.plot.kind(),
            config.settings.output_dir().join(job.plot.output()).display()
        );
    }
    Ok(())
}

pub async fn init_config(config_file: &Path, force: bool) -> Result<()> {
    if config_file.exists() && !force {
        bail!("{config_file:?} already exists, pass --force to overwrite");
    }
    write(
        config_file,
        serde_yml::to_string(&default_plots::builtin_config())?,
    )
    .await
    .context(format!("Writing {config_file:?}"))?;
    println!("Wrote built-in jobs to {}", config_file.display());
    Ok(())
}
