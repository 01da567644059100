//! # Config Loader
//!
//! Configuration loading and parsing module.
//!
//! Responsibilities:
//! - Parse TOML/JSON configuration files
//! - Build the classic topology from environment variables
//! - Validate configuration legality
//! - Generate `RelayBlueprint`
//!
//! # Example
//!
//! ```no_run
//! use config_loader::ConfigLoader;
//! use std::path::Path;
//!
//! let blueprint = ConfigLoader::load_from_path(Path::new("relay.toml")).unwrap();
//! println!("Routes: {}", blueprint.routes.len());
//! ```

pub mod env;
mod parser;
mod validator;

pub use contracts::RelayBlueprint;
pub use parser::ConfigFormat;
pub use validator::validate;

use contracts::ContractError;
use std::path::Path;

/// Configuration loader
///
/// Provides static methods to load configuration from files, strings or the
/// process environment. Every entry point validates before returning.
pub struct ConfigLoader;

impl ConfigLoader {
    /// Load configuration from file path
    ///
    /// Automatically detects format from file extension (.toml / .json).
    ///
    /// # Errors
    /// - File read failure
    /// - Unsupported format
    /// - Parse failure
    /// - Validation failure
    pub fn load_from_path(path: &Path) -> Result<RelayBlueprint, ContractError> {
        let format = Self::detect_format(path)?;
        let content = Self::read_file(path)?;
        Self::load_from_str(&content, format)
    }

    /// Load configuration from string
    ///
    /// # Errors
    /// - Parse failure
    /// - Validation failure
    pub fn load_from_str(
        content: &str,
        format: ConfigFormat,
    ) -> Result<RelayBlueprint, ContractError> {
        Self::parse_and_validate(content, format)
    }

    /// Load configuration from the process environment
    ///
    /// See [`env`] for the recognized variables.
    pub fn load_from_env() -> Result<RelayBlueprint, ContractError> {
        Self::load_from_lookup(|key| std::env::var(key).ok())
    }

    /// Load configuration from an arbitrary variable lookup
    pub fn load_from_lookup<F>(lookup: F) -> Result<RelayBlueprint, ContractError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let blueprint = env::blueprint_from_lookup(lookup)?;
        validator::validate(&blueprint)?;
        Ok(blueprint)
    }

    /// Serialize RelayBlueprint to TOML string
    pub fn to_toml(blueprint: &RelayBlueprint) -> Result<String, ContractError> {
        toml::to_string_pretty(blueprint)
            .map_err(|e| ContractError::config_parse(format!("TOML serialize error: {e}")))
    }

    /// Serialize RelayBlueprint to JSON string
    pub fn to_json(blueprint: &RelayBlueprint) -> Result<String, ContractError> {
        serde_json::to_string_pretty(blueprint)
            .map_err(|e| ContractError::config_parse(format!("JSON serialize error: {e}")))
    }
}

impl ConfigLoader {
    /// Infer configuration format from file extension
    fn detect_format(path: &Path) -> Result<ConfigFormat, ContractError> {
        let ext = path.extension().and_then(|e| e.to_str()).ok_or_else(|| {
            ContractError::config_parse("cannot determine file format from extension")
        })?;

        ConfigFormat::from_extension(ext).ok_or_else(|| {
            ContractError::config_parse(format!("unsupported config format: .{ext}"))
        })
    }

    /// Read configuration file content
    fn read_file(path: &Path) -> Result<String, ContractError> {
        Ok(std::fs::read_to_string(path)?)
    }

    /// Parse and validate configuration content
    fn parse_and_validate(
        content: &str,
        format: ConfigFormat,
    ) -> Result<RelayBlueprint, ContractError> {
        let blueprint = parser::parse(content, format)?;
        validator::validate(&blueprint)?;
        Ok(blueprint)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    const MINIMAL_TOML: &str = r#"
[source]
brokers = "localhost:9092"
group = "relay"
topics = ["metrics"]

[[routes]]
name = "bosun"

[[routes.destinations]]
name = "bosun_datapoints"
endpoints = ["bosun-1:8070", "bosun-2:8070"]
path = "/api/put"
headers = ["Content-Encoding: gzip"]
accept_statuses = [204, 400]

[[routes.destinations]]
name = "bosun_metadata"
endpoints = ["bosun-1:8070", "bosun-2:8070"]
path = "/api/metadata/put"
headers = ["Content-Encoding: gzip"]
accept_statuses = [204, 400]
"#;

    #[test]
    fn test_load_from_str_toml() {
        let result = ConfigLoader::load_from_str(MINIMAL_TOML, ConfigFormat::Toml);
        assert!(result.is_ok(), "Failed: {:?}", result.err());
        let bp = result.unwrap();
        assert_eq!(bp.routes[0].name, "bosun");
        assert_eq!(bp.destination_count(), 2);
    }

    #[test]
    fn test_round_trip_toml() {
        let bp = ConfigLoader::load_from_str(MINIMAL_TOML, ConfigFormat::Toml).unwrap();
        let serialized = ConfigLoader::to_toml(&bp).unwrap();
        let bp2 = ConfigLoader::load_from_str(&serialized, ConfigFormat::Toml).unwrap();
        assert_eq!(bp.routes.len(), bp2.routes.len());
        assert_eq!(
            bp.routes[0].destinations[1].path,
            bp2.routes[0].destinations[1].path
        );
    }

    #[test]
    fn test_round_trip_json() {
        let bp = ConfigLoader::load_from_str(MINIMAL_TOML, ConfigFormat::Toml).unwrap();
        let json = ConfigLoader::to_json(&bp).unwrap();
        let bp2 = ConfigLoader::load_from_str(&json, ConfigFormat::Json).unwrap();
        assert_eq!(bp.source.brokers, bp2.source.brokers);
    }

    #[test]
    fn test_validation_runs_after_parse() {
        let content = MINIMAL_TOML.replacen(
            "[[routes]]\nname = \"bosun\"",
            "[[routes]]\nname = \"bosun\"\ndiscard_ratio = -2",
            1,
        );
        let result = ConfigLoader::load_from_str(&content, ConfigFormat::Toml);
        assert!(result.is_err());
        assert!(result.unwrap_err().to_string().contains("discard_ratio"));
    }

    #[test]
    fn test_load_from_path() {
        let mut file = tempfile::Builder::new().suffix(".toml").tempfile().unwrap();
        file.write_all(MINIMAL_TOML.as_bytes()).unwrap();

        let bp = ConfigLoader::load_from_path(file.path()).unwrap();
        assert_eq!(bp.routes.len(), 1);
    }

    #[test]
    fn test_unknown_extension() {
        let file = tempfile::Builder::new().suffix(".yaml").tempfile().unwrap();
        let err = ConfigLoader::load_from_path(file.path()).unwrap_err();
        assert!(err.to_string().contains("unsupported config format"));
    }

    #[test]
    fn test_load_from_lookup_validates() {
        // a complete source but no URL variables means no routes
        let result = ConfigLoader::load_from_lookup(|key| match key {
            env::KAFKA_BROKER => Some("kafka:9092".to_string()),
            env::KAFKA_CONSUMER_GROUP => Some("relay".to_string()),
            env::KAFKA_TOPIC => Some("metrics".to_string()),
            _ => None,
        });
        assert!(result.is_err());
        assert!(result.unwrap_err().to_string().contains("at least one route"));
    }
}
