use std::path::PathBuf;

use clap::{Parser, Subcommand};
use eyre::Result;
use tracing::error;
use tracing_subscriber::{
    EnvFilter,
    fmt::{layer, time::ChronoLocal},
    layer::SubscriberExt,
    util::SubscriberInitExt,
};

mod jobs;

const MODULES: &[&str] = &["common", "line_basic", "grouped_bar", "default_plots"];

#[derive(Parser)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
    #[arg(short, long)]
    log: Vec<String>,
}

#[derive(Subcommand)]
enum Commands {
    /// List configured plot jobs
    Ls {
        #[arg(short, long, default_value = "plots.yaml")]
        config_file: PathBuf,
    },
    /// Render every configured plot
    Plot {
        #[arg(short, long, default_value = "plots.yaml")]
        config_file: PathBuf,
        /// Only run jobs whose name matches this regex
        #[arg(short, long)]
        filter: Option<String>,
        /// Never open rendered plots in a viewer
        #[arg(long, default_value_t = false)]
        no_show: bool,
    },
    /// Write the built-in jobs to a config file
    Init {
        #[arg(short, long, default_value = "plots.yaml")]
        config_file: PathBuf,
        #[arg(long, default_value_t = false)]
        force: bool,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let log_level = std::env::var("RUST_LOG").unwrap_or("warn".to_owned());
    let args = Cli::parse();
    let file_appender = tracing_appender::rolling::never(".", "log.log");
    let (non_blocking, _guard) = tracing_appender::non_blocking(file_appender);

    let mut env_filter = EnvFilter::new(format!("results_plotter={log_level}"));

    if !args.log.is_empty() {
        for log in &args.log {
            env_filter = env_filter.add_directive(log.parse()?);
        }
    }

    for module in MODULES {
        if !args.log.iter().any(|x| x.starts_with(module)) {
            env_filter = env_filter.add_directive(format!("{module}={log_level}").parse()?);
        }
    }

    tracing_subscriber::registry()
        .with(env_filter)
        .with(
            layer()
                .with_timer(ChronoLocal::new("%v %k:%M:%S %z".to_owned()))
                .compact(),
        )
        .with(layer().with_writer(non_blocking))
        .init();

    match args.command {
        Commands::Ls { config_file } => jobs::list_jobs(&config_file).await?,
        Commands::Plot {
            config_file,
            filter,
            no_show,
        } => {
            if let Err(err) = jobs::plot(&config_file, filter.as_deref(), no_show).await {
                error!("{err:#?}");
                return Err(err);
            }
        }
        Commands::Init { config_file, force } => jobs::init_config(&config_file, force).await?,
    };

    Ok(())
}
