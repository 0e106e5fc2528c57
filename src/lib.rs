// Library exports for chartbind

pub mod binder;
pub mod chart;
pub mod classify;
pub mod config;
pub mod data;
pub mod error;
pub mod fetch;
pub mod graph;
pub mod html;
pub mod runtime;

pub use binder::{bind_dashboard, build_bar_spec, build_line_spec, build_pie_spec, Binding};
pub use chart::{ChartData, ChartKind, ChartSpec, Dashboard, Slice};
pub use classify::{classify_columns, ColumnRole, Columns};
pub use data::{Dataset, Record};
pub use error::BindError;

use serde::Deserialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Default, clap::ValueEnum)]
pub enum OutputFormat {
    #[serde(rename = "png")]
    #[default]
    Png,
    #[serde(rename = "svg")]
    Svg,
}

impl OutputFormat {
    pub fn extension(&self) -> &'static str {
        match self {
            OutputFormat::Png => "png",
            OutputFormat::Svg => "svg",
        }
    }
}

/// Largest accepted image side in pixels
pub const MAX_DIMENSION: u32 = 16_384;

/// Raster/vector output settings for the chart images.
///
/// `type` selects the format in config files, matching the CLI's `--format`.
#[derive(Debug, Clone, Deserialize)]
pub struct RenderOptions {
    #[serde(default = "RenderOptions::default_width")]
    pub width: u32,
    #[serde(default = "RenderOptions::default_height")]
    pub height: u32,
    #[serde(default, rename = "type")]
    pub format: OutputFormat,
}

impl RenderOptions {
    fn default_width() -> u32 { 800 }
    fn default_height() -> u32 { 600 }

    /// Byte length of an RGB pixel buffer of this size.
    pub fn rgb_buffer_len(&self) -> anyhow::Result<usize> {
        self.validate()?;
        (self.width as usize)
            .checked_mul(self.height as usize)
            .and_then(|n| n.checked_mul(3))
            .ok_or_else(|| {
                anyhow::anyhow!("Image size {}x{} is too large", self.width, self.height)
            })
    }

    pub fn validate(&self) -> anyhow::Result<()> {
        if self.width == 0 || self.height == 0 {
            anyhow::bail!(
                "Image width and height must be at least 1 (got {}x{})",
                self.width,
                self.height
            );
        }
        if self.width > MAX_DIMENSION || self.height > MAX_DIMENSION {
            anyhow::bail!(
                "Image width and height must be at most {} (got {}x{})",
                MAX_DIMENSION,
                self.width,
                self.height
            );
        }
        Ok(())
    }
}

impl Default for RenderOptions {
    fn default() -> Self {
        Self {
            width: Self::default_width(),
            height: Self::default_height(),
            format: OutputFormat::Png,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_zero_size_rejected() {
        let opts = RenderOptions { width: 0, ..RenderOptions::default() };
        assert!(opts.validate().is_err());
        assert!(opts.rgb_buffer_len().is_err());
    }

    #[test]
    fn test_buffer_len() {
        assert_eq!(RenderOptions::default().rgb_buffer_len().unwrap(), 800 * 600 * 3);
    }

    #[test]
    fn test_oversized_image_is_an_error() {
        let opts = RenderOptions {
            width: 40_000,
            height: 40_000,
            format: OutputFormat::Png,
        };
        assert!(opts.rgb_buffer_len().is_err());

        let opts = RenderOptions { width: u32::MAX, ..RenderOptions::default() };
        assert!(opts.validate().is_err());
    }
}
