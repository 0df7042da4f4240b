//! Client configuration
//!
//! ```toml
//! [api]
//! base_url = "http://localhost:8080/api"
//! timeout_secs = 30
//!
//! [store]
//! page_size = 20
//!
//! [formula]
//! max_length = 500
//!
//! [plate]
//! rows = 8
//! cols = 12
//! ```
//!
//! Every section and key is optional; missing ones take the defaults above.

use lims_formula::FormulaSandbox;
use lims_plate::{PlateGeometry, PositionError};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Configuration errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// File could not be read
    #[error("cannot read config file: {0}")]
    Io(#[from] std::io::Error),

    /// File is not valid TOML for this shape
    #[error("cannot parse config: {0}")]
    Parse(#[from] toml::de::Error),

    /// Values are out of range
    #[error("invalid config: {0}")]
    Invalid(String),
}

/// Backend endpoint settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ApiConfig {
    /// Base URL of the REST API
    pub base_url: String,
    /// Request timeout in seconds
    pub timeout_secs: u64,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:8080/api".to_string(),
            timeout_secs: 30,
        }
    }
}

/// Store settings
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct StoreConfig {
    /// Initial page size
    pub page_size: u32,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self { page_size: 20 }
    }
}

/// Formula sandbox settings
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FormulaConfig {
    /// Longest accepted formula, in characters
    pub max_length: usize,
}

impl Default for FormulaConfig {
    fn default() -> Self {
        Self {
            max_length: lims_formula::DEFAULT_MAX_LENGTH,
        }
    }
}

/// Default container geometry
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PlateConfig {
    /// Rows (A..)
    pub rows: usize,
    /// Columns (01..)
    pub cols: usize,
}

impl Default for PlateConfig {
    fn default() -> Self {
        let standard = PlateGeometry::STANDARD_96;
        Self {
            rows: standard.rows(),
            cols: standard.cols(),
        }
    }
}

/// Client configuration
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClientConfig {
    /// Backend endpoint
    pub api: ApiConfig,
    /// Stores
    pub store: StoreConfig,
    /// Formula sandbox
    pub formula: FormulaConfig,
    /// Default plate
    pub plate: PlateConfig,
}

impl ClientConfig {
    /// Create default configuration
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// With API base URL
    #[inline]
    #[must_use]
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.api.base_url = base_url.into();
        self
    }

    /// With page size
    #[inline]
    #[must_use]
    pub fn with_page_size(mut self, page_size: u32) -> Self {
        self.store.page_size = page_size;
        self
    }

    /// With formula length limit
    #[inline]
    #[must_use]
    pub fn with_formula_max_length(mut self, max_length: usize) -> Self {
        self.formula.max_length = max_length;
        self
    }

    /// With default plate geometry
    #[inline]
    #[must_use]
    pub fn with_plate(mut self, geometry: PlateGeometry) -> Self {
        self.plate = PlateConfig {
            rows: geometry.rows(),
            cols: geometry.cols(),
        };
        self
    }

    /// Parse and validate TOML
    ///
    /// # Errors
    /// `ConfigError::Parse` or `ConfigError::Invalid`.
    pub fn from_toml_str(text: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    /// Read, parse and validate a TOML file
    ///
    /// # Errors
    /// Any [`ConfigError`].
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path)?;
        let config = Self::from_toml_str(&text)?;
        tracing::debug!(path = %path.display(), "config loaded");
        Ok(config)
    }

    /// Check value ranges
    ///
    /// # Errors
    /// `ConfigError::Invalid` naming the first bad value.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.api.base_url.trim().is_empty() {
            return Err(ConfigError::Invalid("api.base_url is empty".to_string()));
        }
        if self.store.page_size == 0 {
            return Err(ConfigError::Invalid("store.page_size must be positive".to_string()));
        }
        if self.formula.max_length == 0 {
            return Err(ConfigError::Invalid("formula.max_length must be positive".to_string()));
        }
        self.geometry()
            .map_err(|e| ConfigError::Invalid(format!("plate: {e}")))?;
        Ok(())
    }

    /// Default plate geometry
    ///
    /// # Errors
    /// `PositionError::UnsupportedGeometry` for grids labels cannot address.
    pub fn geometry(&self) -> Result<PlateGeometry, PositionError> {
        PlateGeometry::new(self.plate.rows, self.plate.cols)
    }

    /// Sandbox with the configured limits
    #[must_use]
    pub fn sandbox(&self) -> FormulaSandbox {
        FormulaSandbox::new().with_max_length(self.formula.max_length)
    }
}
