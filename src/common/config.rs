use std::path::{Path, PathBuf};

use anyhow::{Context, bail};
use serde::{Deserialize, Serialize};

pub fn config_file() -> PathBuf {
    dirs::config_dir().unwrap_or_else(|| PathBuf::from(".")).join("tabdock.toml")
}

/// What "show" does for a hidden item toggled back on.
#[derive(Default, Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum ShowBehavior {
    /// Append as a tab of the focused panel. Only drags create splits.
    #[default]
    RetabFocused,
    /// Split the focused panel, like the earliest prototype did.
    SplitFocused,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct Settings {
    /// Manhattan distance (px) a pressed pointer must travel before a press
    /// becomes a drag.
    #[serde(default = "default_drag_threshold")]
    pub drag_threshold: f64,
    /// Fraction of a panel's extent, per axis, that classifies as an edge
    /// drop zone.
    #[serde(default = "default_edge_margin")]
    pub edge_margin: f64,
    #[serde(default)]
    pub show_behavior: ShowBehavior,
}

fn default_drag_threshold() -> f64 { 8.0 }
fn default_edge_margin() -> f64 { 0.25 }

impl Default for Settings {
    fn default() -> Self {
        Self {
            drag_threshold: default_drag_threshold(),
            edge_margin: default_edge_margin(),
            show_behavior: ShowBehavior::default(),
        }
    }
}

impl Settings {
    pub fn parse(contents: &str) -> anyhow::Result<Self> {
        let settings: Settings = toml::from_str(contents)?;
        settings.check()?;
        Ok(settings)
    }

    pub fn read(path: &Path) -> anyhow::Result<Self> {
        if !path.exists() {
            return Ok(Settings::default());
        }
        let contents = std::fs::read_to_string(path)
            .with_context(|| format!("reading {}", path.display()))?;
        Self::parse(&contents)
    }

    fn check(&self) -> anyhow::Result<()> {
        if !(self.drag_threshold >= 0.0) {
            bail!("drag_threshold must be non-negative, got {}", self.drag_threshold);
        }
        // Margins at or above 0.5 would leave no center zone.
        if !(self.edge_margin > 0.0 && self.edge_margin < 0.5) {
            bail!("edge_margin must be in (0, 0.5), got {}", self.edge_margin);
        }
        Ok(())
    }
}
