use std::fmt;
use std::fs;
use std::io;
use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Pixel layout of the board. All values are surface pixels.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct LayoutConfig {
    pub cell_size: u32,
    pub padding: u32,
    pub dot_radius: u32,
    pub edge_width: u32,
    /// Max distance across an edge at which the pointer still selects it.
    pub hit_threshold: u32,
}

impl Default for LayoutConfig {
    fn default() -> Self {
        Self {
            cell_size: 80,
            padding: 40,
            dot_radius: 8,
            edge_width: 6,
            hit_threshold: 15,
        }
    }
}

/// Upper bound for `cell_size` and `padding`. Together with the grid size limit this keeps
/// every surface dimension far below `u32::MAX`.
pub const MAX_LAYOUT_PX: u32 = 1024;

impl LayoutConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        let invalid = |msg: String| -> Result<(), ConfigError> { Err(ConfigError::Invalid(msg)) };
        if self.cell_size == 0 || self.dot_radius == 0 || self.edge_width == 0 {
            return invalid(format!(
                "cell_size, dot_radius and edge_width must be non-zero: {self:?}"
            ));
        }
        if self.hit_threshold == 0 {
            return invalid("hit_threshold must be non-zero".to_string());
        }
        if self.cell_size > MAX_LAYOUT_PX || self.padding > MAX_LAYOUT_PX {
            return invalid(format!(
                "cell_size {} and padding {} must not exceed {MAX_LAYOUT_PX}",
                self.cell_size, self.padding
            ));
        }
        let half_cell = self.cell_size.div_ceil(2);
        if self.dot_radius >= half_cell {
            return invalid(format!(
                "dot radius {} must be less than half of cell_size {}",
                self.dot_radius, self.cell_size
            ));
        }
        if self.hit_threshold >= half_cell {
            return invalid(format!(
                "hit_threshold {} must be less than half of cell_size {}",
                self.hit_threshold, self.cell_size
            ));
        }
        if self.edge_width > self.cell_size {
            return invalid(format!(
                "edge_width {} must not exceed cell_size {}",
                self.edge_width, self.cell_size
            ));
        }
        if self.padding < self.dot_radius || self.padding < self.edge_width.div_ceil(2) {
            return invalid(format!(
                "padding {} must fit dot_radius {} and half of edge_width {}",
                self.padding, self.dot_radius, self.edge_width
            ));
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct ClientConfig {
    pub authority_url: String,
    pub game_id: String,
    /// How often the window loop drains finished sync requests.
    pub poll_interval_ms: u64,
    pub layout: LayoutConfig,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            authority_url: "http://127.0.0.1:5000".to_string(),
            game_id: "default".to_string(),
            poll_interval_ms: 16,
            layout: LayoutConfig::default(),
        }
    }
}

impl ClientConfig {
    pub fn load_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let bytes = fs::read(path).map_err(|e| ConfigError::Io {
            path: path.display().to_string(),
            source: e,
        })?;
        serde_json::from_slice(&bytes).map_err(|e| ConfigError::Parse {
            path: path.display().to_string(),
            source: e,
        })
    }

    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms.max(1))
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if !self.authority_url.starts_with("http://") {
            return Err(ConfigError::Invalid(format!(
                "authority_url must be an http:// url, got {:?}",
                self.authority_url
            )));
        }
        let id_ok = !self.game_id.is_empty()
            && self
                .game_id
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_');
        if !id_ok {
            return Err(ConfigError::Invalid(format!(
                "game_id must be non-empty [A-Za-z0-9_-], got {:?}",
                self.game_id
            )));
        }
        self.layout.validate()
    }
}

#[derive(Debug)]
pub enum ConfigError {
    Io { path: String, source: io::Error },
    Parse {
        path: String,
        source: serde_json::Error,
    },
    Invalid(String),
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::Io { path, source } => write!(f, "failed reading {path}: {source}"),
            ConfigError::Parse { path, source } => write!(f, "failed parsing {path}: {source}"),
            ConfigError::Invalid(msg) => write!(f, "invalid config: {msg}"),
        }
    }
}

impl std::error::Error for ConfigError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ConfigError::Io { source, .. } => Some(source),
            ConfigError::Parse { source, .. } => Some(source),
            ConfigError::Invalid(_) => None,
        }
    }
}
