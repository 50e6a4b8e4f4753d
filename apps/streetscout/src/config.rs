//! # Configuration Module
//!
//! Server settings, read from an optional TOML file.
//!
//! ```toml
//! [server]
//! host = "0.0.0.0"
//! port = 8082
//!
//! [listing]
//! default_page_size = 8
//!
//! [region]            # answer of the stub zip lookup
//! state = "MA"
//! county = "Middlesex"
//! town = "Chelmsford"
//!
//! [limits]
//! rate_limit = 100    # requests/second, 0 disables
//! ```
//!
//! Every section and key is optional. `STREETSCOUT_RATE_LIMIT` and
//! `STREETSCOUT_CORS_ORIGINS` are read from the environment when the router
//! is built and win over the file.

use serde::{Deserialize, Serialize};
use std::path::Path;
use streetscout_core::{
    FixedRegionLookup, Region, ScoutError, UpsertEngine,
    primitives::{DEFAULT_PAGE_SIZE, MAX_PAGE_SIZE, MIN_PAGE_SIZE},
};

/// Maximum config file size (1 MB).
const MAX_CONFIG_FILE_SIZE: u64 = 1024 * 1024;

// =============================================================================
// SECTIONS
// =============================================================================

/// `[server]` section.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 8082,
        }
    }
}

/// `[listing]` section.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ListingConfig {
    pub default_page_size: i64,
}

impl Default for ListingConfig {
    fn default() -> Self {
        Self {
            default_page_size: DEFAULT_PAGE_SIZE,
        }
    }
}

/// `[region]` section: the region every zip code resolves to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct RegionConfig {
    pub state: String,
    pub county: String,
    pub town: String,
}

impl Default for RegionConfig {
    fn default() -> Self {
        let region = FixedRegionLookup::default().region().clone();
        Self {
            state: region.state,
            county: region.county,
            town: region.town,
        }
    }
}

impl From<RegionConfig> for Region {
    fn from(config: RegionConfig) -> Self {
        Region::new(config.state, config.county, config.town)
    }
}

/// `[limits]` section.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct LimitsConfig {
    pub rate_limit: u32,
}

impl Default for LimitsConfig {
    fn default() -> Self {
        Self { rate_limit: 100 }
    }
}

// =============================================================================
// CONFIG
// =============================================================================

/// Complete application configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    pub server: ServerConfig,
    pub listing: ListingConfig,
    pub region: RegionConfig,
    pub limits: LimitsConfig,
}

impl Config {
    /// Parse a TOML document.
    pub fn from_toml_str(source: &str) -> Result<Self, ScoutError> {
        let config: Self = toml::from_str(source)
            .map_err(|e| ScoutError::SerializationError(format!("Invalid config: {}", e)))?;
        config.validate()?;
        Ok(config)
    }

    /// Load the file at `path`, or the defaults when no path is given.
    pub fn load(path: Option<&Path>) -> Result<Self, ScoutError> {
        let Some(path) = path else {
            return Ok(Self::default());
        };

        let metadata = std::fs::metadata(path).map_err(|e| {
            ScoutError::IoError(format!("Cannot read config '{}': {}", path.display(), e))
        })?;
        if metadata.len() > MAX_CONFIG_FILE_SIZE {
            return Err(ScoutError::IoError(format!(
                "Config file size {} bytes exceeds maximum allowed {} bytes",
                metadata.len(),
                MAX_CONFIG_FILE_SIZE
            )));
        }

        let source = std::fs::read_to_string(path).map_err(|e| {
            ScoutError::IoError(format!("Cannot read config '{}': {}", path.display(), e))
        })?;
        Self::from_toml_str(&source)
    }

    fn validate(&self) -> Result<(), ScoutError> {
        let size = self.listing.default_page_size;
        if !(MIN_PAGE_SIZE..=MAX_PAGE_SIZE).contains(&size) {
            return Err(ScoutError::InvalidField(format!(
                "listing.default_page_size must be within {}..={}, got {}",
                MIN_PAGE_SIZE, MAX_PAGE_SIZE, size
            )));
        }
        if self.server.host.trim().is_empty() {
            return Err(ScoutError::InvalidField("server.host is empty".to_string()));
        }
        Ok(())
    }

    /// Build an engine whose zip lookup answers the configured region.
    #[must_use]
    pub fn build_engine(&self) -> UpsertEngine {
        UpsertEngine::with_lookup(FixedRegionLookup::new(self.region.clone().into()))
    }

    /// `host:port` to bind.
    #[must_use]
    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.server.host, self.server.port)
    }
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn defaults() {
        let config = Config::default();
        assert_eq!(config.bind_addr(), "127.0.0.1:8082");
        assert_eq!(config.listing.default_page_size, 8);
        assert_eq!(config.region.town, "Chelmsford");
        assert_eq!(config.limits.rate_limit, 100);
    }

    #[test]
    fn empty_document_is_default() {
        let config = Config::from_toml_str("").expect("parse");
        assert_eq!(config, Config::default());
    }

    #[test]
    fn partial_sections_keep_other_defaults() {
        let config = Config::from_toml_str(
            r#"
            [server]
            port = 9000

            [region]
            town = "Lowell"
            "#,
        )
        .expect("parse");

        assert_eq!(config.server.port, 9000);
        assert_eq!(config.server.host, "127.0.0.1");
        assert_eq!(config.region.town, "Lowell");
        assert_eq!(config.region.state, "MA");
    }

    #[test]
    fn unknown_keys_are_rejected() {
        let result = Config::from_toml_str("[server]\nhots = \"x\"\n");
        assert!(matches!(result, Err(ScoutError::SerializationError(_))));
    }

    #[test]
    fn out_of_range_page_size_is_rejected() {
        let result = Config::from_toml_str("[listing]\ndefault_page_size = 500\n");
        assert!(matches!(result, Err(ScoutError::InvalidField(_))));
    }

    #[test]
    fn load_reads_file() {
        let mut file = tempfile::NamedTempFile::new().expect("tempfile");
        writeln!(file, "[limits]\nrate_limit = 0").expect("write");

        let config = Config::load(Some(file.path())).expect("load");
        assert_eq!(config.limits.rate_limit, 0);
    }

    #[test]
    fn load_missing_file_fails() {
        let result = Config::load(Some(Path::new("/definitely/not/here.toml")));
        assert!(matches!(result, Err(ScoutError::IoError(_))));
    }

    #[test]
    fn load_without_path_is_default() {
        assert_eq!(Config::load(None).expect("load"), Config::default());
    }

    #[test]
    fn engine_uses_configured_region() {
        let config = Config::from_toml_str("[region]\nstate = \"NH\"\n").expect("parse");
        let engine = config.build_engine();
        let outcome = engine
            .upsert_street(streetscout_core::StreetFields {
                zip: Some("03060".to_string()),
                name: Some("Main St".to_string()),
                ..Default::default()
            })
            .expect("upsert");

        let street = engine.fetch_street(&outcome.id).expect("fetch");
        assert_eq!(street.state(), Some("NH"));
    }
}
