use std::{path::Path, process::Command};

use eyre::{Context, Result, bail};
use plotters::style::RGBColor;
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Size of the rendered figure in inches
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Figure {
    pub width: f64,
    pub height: f64,
}

impl Default for Figure {
    fn default() -> Self {
        Self {
            width: 10.0,
            height: 6.0,
        }
    }
}

impl Figure {
    pub fn new(width: f64, height: f64) -> Self {
        Self { width, height }
    }

    /// Bitmap size at `dpi`
    pub fn pixels(&self, dpi: u32) -> (u32, u32) {
        let dpi = f64::from(dpi);
        (
            (self.width * dpi).round() as u32,
            (self.height * dpi).round() as u32,
        )
    }
}

/// Converts a font size in points to pixels at `dpi`
pub fn points(size: f64, dpi: u32) -> f64 {
    size * f64::from(dpi) / 72.0
}

/// Pixel length at `dpi` of a distance given in points, for offsets and strokes
pub fn points_px(size: f64, dpi: u32) -> i32 {
    points(size, dpi).round() as i32
}

/// The qualitative `tab10` palette
pub const TAB10: [RGBColor; 10] = [
    RGBColor(0x1f, 0x77, 0xb4),
    RGBColor(0xff, 0x7f, 0x0e),
    RGBColor(0x2c, 0xa0, 0x2c),
    RGBColor(0xd6, 0x27, 0x28),
    RGBColor(0x94, 0x67, 0xbd),
    RGBColor(0x8c, 0x56, 0x4b),
    RGBColor(0xe3, 0x77, 0xc2),
    RGBColor(0x7f, 0x7f, 0x7f),
    RGBColor(0xbc, 0xbd, 0x22),
    RGBColor(0x17, 0xbe, 0xcf),
];

/// Index into [`TAB10`] for the `i`-th of `n` evenly spaced samples over the colormap
pub fn tab10_index(i: usize, n: usize) -> usize {
    if n <= 1 {
        return 0;
    }
    let v = i as f64 / (n - 1) as f64;
    ((v * TAB10.len() as f64) as usize).min(TAB10.len() - 1)
}

pub fn tab10_sample(i: usize, n: usize) -> RGBColor {
    TAB10[tab10_index(i, n)]
}

/// Duration annotation text
pub fn format_seconds(secs: f64) -> String {
    format!("{secs:.4}s")
}

/// Hands a rendered image to the desktop's default viewer
pub fn open_viewer(path: &Path) -> Result<()> {
    let (program, args): (&str, &[&str]) = if cfg!(target_os = "macos") {
        ("open", &[])
    } else if cfg!(target_os = "windows") {
        ("cmd", &["/C", "start", ""])
    } else {
        ("xdg-open", &[])
    };
    debug!("Opening {path:?} with {program}");
    let status = Command::new(program)
        .args(args)
        .arg(path)
        .status()
        .context(format!("Spawn {program}"))?;
    if !status.success() {
        bail!("{program} exited with {status}");
    }
    Ok(())
}
