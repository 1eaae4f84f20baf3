use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::{format::InputFormat, plot::Plot};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    pub name: String,
    #[serde(default)]
    pub settings: Settings,
    pub jobs: Vec<PlotJob>,
}

#[derive(Debug, Default, Clone, PartialEq, Serialize, Deserialize)]
pub struct Settings {
    pub dpi: Option<u32>,
    pub output_dir: Option<PathBuf>,
    /// Overrides every plot's own `show` flag
    pub show: Option<bool>,
}

impl Settings {
    pub const DEFAULT_DPI: u32 = 300;

    pub fn dpi(&self) -> u32 {
        self.dpi.unwrap_or(Self::DEFAULT_DPI)
    }

    pub fn output_dir(&self) -> PathBuf {
        self.output_dir.clone().unwrap_or_default()
    }

    pub fn show(&self, plot_default: bool) -> bool {
        self.show.unwrap_or(plot_default)
    }
}

/// One results file and how to draw it
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlotJob {
    pub name: String,
    pub input: PathBuf,
    #[serde(default)]
    pub format: InputFormat,
    pub plot: Box<dyn Plot>,
}
