//! Diagram configuration.
//!
//! Every field has a default, so an empty document (or no config file at
//! all) gives the stock layout.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::dsl::parser::parse_document;
use crate::dsl::DslFormat;
use crate::error::{DiagramError, DiagramResult};

/// Direction in which ranks advance.
#[derive(Deserialize, Serialize, Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RankDir {
    /// Ranks advance along x.
    #[default]
    #[serde(rename = "LR")]
    LeftRight,
    /// Ranks advance along y.
    #[serde(rename = "TB")]
    TopBottom,
}

#[derive(Deserialize, Serialize, Debug, Clone, PartialEq)]
#[serde(default)]
pub struct LayoutConfig {
    pub rank_dir: RankDir,
    /// Gap between consecutive ranks, before edge spacing hints.
    pub rank_sep: f64,
    /// Gap between neighbouring nodes of one rank.
    pub node_sep: f64,
    /// Barycenter ordering sweeps.
    pub order_sweeps: usize,
    /// Add a sub-pixel random x offset to every node so renderers that
    /// cache view bounds notice the change.
    pub jitter: bool,
}

impl Default for LayoutConfig {
    fn default() -> Self {
        LayoutConfig {
            rank_dir: RankDir::LeftRight,
            rank_sep: 50.0,
            node_sep: 50.0,
            order_sweeps: 4,
            jitter: false,
        }
    }
}

#[derive(Deserialize, Serialize, Debug, Clone, PartialEq)]
#[serde(default)]
pub struct ViewportConfig {
    /// Height assumed for rows that have not been measured yet.
    pub estimated_row_height: f64,
    /// Extra rows rendered above and below the visible window.
    pub overscan: usize,
    /// Distance from the bottom within which the list keeps following new rows.
    pub follow_threshold: f64,
}

impl Default for ViewportConfig {
    fn default() -> Self {
        ViewportConfig {
            estimated_row_height: 20.0,
            overscan: 5,
            follow_threshold: 4.0,
        }
    }
}

#[derive(Deserialize, Serialize, Debug, Clone, Default, PartialEq)]
#[serde(default)]
pub struct DiagramConfig {
    pub layout: LayoutConfig,
    pub viewport: ViewportConfig,
}

impl DiagramConfig {
    pub fn parse(content: &str, format: DslFormat) -> DiagramResult<Self> {
        parse_document(content, format).map_err(DiagramError::ConfigParse)
    }

    pub fn from_file(path: impl AsRef<Path>) -> DiagramResult<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)?;
        let config = Self::parse(&content, DslFormat::from_path(path))?;
        tracing::debug!(path = %path.display(), "loaded diagram config");
        Ok(config)
    }
}
