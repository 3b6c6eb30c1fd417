//! Configuration types for seeding runs.
//!
//! A [`SeedConfig`] is assembled from its defaults, an optional JSON file and
//! environment overrides, in that order.

use std::path::Path;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use sqlx::postgres::PgConnectOptions;
use thiserror::Error;

/// Environment variable naming an optional JSON configuration file.
pub const CONFIG_FILE_VAR: &str = "SEED_CONFIG";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),
    #[error("Failed to parse config file: {0}")]
    Json(#[from] serde_json::Error),
    #[error("Invalid value {value:?} for {var}")]
    InvalidEnv { var: &'static str, value: String },
    #[error("Invalid database URL: {0}")]
    DatabaseUrl(#[source] sqlx::Error),
    #[error("Invalid configuration: {0}")]
    Invalid(String),
}

/// Ratios used to derive entity counts from the opportunity count.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
#[serde(default)]
pub struct CountRatios {
    /// Business partners generated per opportunity.
    pub partners_per_opportunity: f64,
    /// Cases generated per opportunity.
    pub cases_per_opportunity: f64,
}

impl Default for CountRatios {
    fn default() -> Self {
        Self {
            partners_per_opportunity: 1.25,
            cases_per_opportunity: 0.4,
        }
    }
}

/// Configuration for a seeding run.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SeedConfig {
    /// Database host.
    pub host: String,
    /// Database port.
    pub port: u16,
    /// Login role.
    pub username: String,
    /// Login password.
    #[serde(skip_serializing)]
    pub password: String,
    /// Database name.
    pub database: String,
    /// Schema qualifier for the four seeded tables.
    pub schema: String,
    /// Full connection URL. Takes precedence over the individual fields.
    #[serde(skip_serializing)]
    pub database_url: Option<String>,

    /// Number of opportunities to generate; other counts derive from it.
    pub opportunity_count: usize,
    /// Ratios for the derived counts.
    pub ratios: CountRatios,
    /// Probability that an opportunity gets a co-borrower.
    pub co_borrower_probability: f64,
    /// Probability that a case references an opportunity.
    pub case_opportunity_probability: f64,

    /// Fixed RNG seed for reproducible data. Random when unset.
    pub seed: Option<u64>,
    /// Rows between progress log lines.
    pub progress_interval: usize,

    /// Create the schema and tables before seeding.
    pub create_schema: bool,
    /// Delete previously seeded rows before seeding.
    pub clear_before_seed: bool,
    /// Generate into an in-memory store instead of the database.
    pub dry_run: bool,
}

impl Default for SeedConfig {
    fn default() -> Self {
        Self {
            host: "localhost".to_string(),
            port: 5432,
            username: "crm_user".to_string(),
            password: "crm_password".to_string(),
            database: "loan_crm".to_string(),
            schema: "public".to_string(),
            database_url: None,
            opportunity_count: 1_000_000,
            ratios: CountRatios::default(),
            co_borrower_probability: 0.4,
            case_opportunity_probability: 0.6,
            seed: None,
            progress_interval: 100_000,
            create_schema: false,
            clear_before_seed: false,
            dry_run: false,
        }
    }
}

impl SeedConfig {
    /// Loads the configuration from `SEED_CONFIG` (if set) and the process environment.
    pub fn load() -> Result<Self, ConfigError> {
        let mut config = match std::env::var(CONFIG_FILE_VAR) {
            Ok(path) => Self::from_file(path)?,
            Err(_) => Self::default(),
        };
        config.apply_overrides(|var| std::env::var(var).ok())?;
        config.validate()?;
        Ok(config)
    }

    /// Reads a JSON configuration file. Missing fields keep their defaults.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let raw = std::fs::read_to_string(path)?;
        Ok(serde_json::from_str(&raw)?)
    }

    /// Applies overrides from a variable lookup (normally the process environment).
    pub fn apply_overrides(
        &mut self,
        lookup: impl Fn(&str) -> Option<String>,
    ) -> Result<(), ConfigError> {
        if let Some(url) = lookup("DATABASE_URL") {
            self.database_url = Some(url);
        }
        if let Some(host) = lookup("SEED_DB_HOST") {
            self.host = host;
        }
        if let Some(port) = parse_var(&lookup, "SEED_DB_PORT")? {
            self.port = port;
        }
        if let Some(user) = lookup("SEED_DB_USER") {
            self.username = user;
        }
        if let Some(password) = lookup("SEED_DB_PASSWORD") {
            self.password = password;
        }
        if let Some(database) = lookup("SEED_DB_NAME") {
            self.database = database;
        }
        if let Some(schema) = lookup("SEED_DB_SCHEMA") {
            self.schema = schema;
        }
        if let Some(count) = parse_var(&lookup, "SEED_OPPORTUNITIES")? {
            self.opportunity_count = count;
        }
        if let Some(seed) = parse_var(&lookup, "SEED_RNG_SEED")? {
            self.seed = Some(seed);
        }
        if let Some(flag) = parse_flag(&lookup, "SEED_CREATE_SCHEMA")? {
            self.create_schema = flag;
        }
        if let Some(flag) = parse_flag(&lookup, "SEED_CLEAR")? {
            self.clear_before_seed = flag;
        }
        if let Some(flag) = parse_flag(&lookup, "SEED_DRY_RUN")? {
            self.dry_run = flag;
        }
        Ok(())
    }

    /// Checks probabilities, the schema identifier and the progress interval.
    pub fn validate(&self) -> Result<(), ConfigError> {
        for (name, p) in [
            ("co_borrower_probability", self.co_borrower_probability),
            (
                "case_opportunity_probability",
                self.case_opportunity_probability,
            ),
        ] {
            if !(0.0..=1.0).contains(&p) {
                return Err(ConfigError::Invalid(format!(
                    "{name} must be within [0, 1], got {p}"
                )));
            }
        }

        for (name, ratio) in [
            (
                "partners_per_opportunity",
                self.ratios.partners_per_opportunity,
            ),
            ("cases_per_opportunity", self.ratios.cases_per_opportunity),
        ] {
            if !ratio.is_finite() || ratio < 0.0 {
                return Err(ConfigError::Invalid(format!(
                    "{name} must be a non-negative number, got {ratio}"
                )));
            }
        }

        if !is_valid_identifier(&self.schema) {
            return Err(ConfigError::Invalid(format!(
                "schema {:?} is not a valid SQL identifier",
                self.schema
            )));
        }

        if self.progress_interval == 0 {
            return Err(ConfigError::Invalid(
                "progress_interval must be greater than zero".to_string(),
            ));
        }

        Ok(())
    }

    /// Number of business partners: `round(1.25 × O)` with default ratios.
    pub fn partner_count(&self) -> usize {
        derive_count(self.opportunity_count, self.ratios.partners_per_opportunity)
    }

    /// Number of cases: `round(0.4 × O)` with default ratios.
    pub fn case_count(&self) -> usize {
        derive_count(self.opportunity_count, self.ratios.cases_per_opportunity)
    }

    /// Builds Postgres connection options.
    pub fn connect_options(&self) -> Result<PgConnectOptions, ConfigError> {
        match &self.database_url {
            Some(url) => PgConnectOptions::from_str(url).map_err(ConfigError::DatabaseUrl),
            None => Ok(PgConnectOptions::new()
                .host(&self.host)
                .port(self.port)
                .username(&self.username)
                .password(&self.password)
                .database(&self.database)),
        }
    }

    /// Connection target without credentials, for log lines.
    pub fn target(&self) -> String {
        match &self.database_url {
            Some(_) => "DATABASE_URL".to_string(),
            None => format!("{}:{}/{}", self.host, self.port, self.database),
        }
    }
}

/// Derives a count from the opportunity count, rounding half away from zero.
pub fn derive_count(opportunity_count: usize, ratio: f64) -> usize {
    (opportunity_count as f64 * ratio).round() as usize
}

/// Returns true for an unquoted SQL identifier: a letter or underscore followed by
/// letters, digits or underscores.
pub fn is_valid_identifier(ident: &str) -> bool {
    let mut chars = ident.chars();
    match chars.next() {
        Some(c) if c.is_ascii_alphabetic() || c == '_' => {}
        _ => return false,
    }
    ident.len() <= 63 && chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
}

fn parse_var<T: FromStr>(
    lookup: &impl Fn(&str) -> Option<String>,
    var: &'static str,
) -> Result<Option<T>, ConfigError> {
    match lookup(var) {
        Some(value) => value
            .trim()
            .parse()
            .map(Some)
            .map_err(|_| ConfigError::InvalidEnv { var, value }),
        None => Ok(None),
    }
}

fn parse_flag(
    lookup: &impl Fn(&str) -> Option<String>,
    var: &'static str,
) -> Result<Option<bool>, ConfigError> {
    match lookup(var) {
        Some(value) => match value.trim().to_ascii_lowercase().as_str() {
            "1" | "true" | "yes" | "on" => Ok(Some(true)),
            "0" | "false" | "no" | "off" | "" => Ok(Some(false)),
            _ => Err(ConfigError::InvalidEnv { var, value }),
        },
        None => Ok(None),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |var: &str| map.get(var).cloned()
    }

    #[test]
    fn test_derived_counts() {
        let config = SeedConfig {
            opportunity_count: 10,
            ..Default::default()
        };
        assert_eq!(config.partner_count(), 13);
        assert_eq!(config.case_count(), 4);

        let config = SeedConfig::default();
        assert_eq!(config.partner_count(), 1_250_000);
        assert_eq!(config.case_count(), 400_000);
    }

    #[test]
    fn test_env_overrides() {
        let mut config = SeedConfig::default();
        config
            .apply_overrides(lookup_from(&[
                ("SEED_DB_HOST", "db.internal"),
                ("SEED_DB_PORT", "6543"),
                ("SEED_DB_SCHEMA", "crm"),
                ("SEED_OPPORTUNITIES", "250"),
                ("SEED_RNG_SEED", "7"),
                ("SEED_DRY_RUN", "true"),
                ("SEED_CLEAR", "0"),
            ]))
            .unwrap();

        assert_eq!(config.host, "db.internal");
        assert_eq!(config.port, 6543);
        assert_eq!(config.schema, "crm");
        assert_eq!(config.opportunity_count, 250);
        assert_eq!(config.seed, Some(7));
        assert!(config.dry_run);
        assert!(!config.clear_before_seed);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_malformed_env_value() {
        let mut config = SeedConfig::default();
        let err = config
            .apply_overrides(lookup_from(&[("SEED_DB_PORT", "not-a-port")]))
            .unwrap_err();
        assert!(matches!(
            err,
            ConfigError::InvalidEnv {
                var: "SEED_DB_PORT",
                ..
            }
        ));

        let err = config
            .apply_overrides(lookup_from(&[("SEED_DRY_RUN", "maybe")]))
            .unwrap_err();
        assert!(matches!(err, ConfigError::InvalidEnv { .. }));
    }

    #[test]
    fn test_validate_rejects_bad_values() {
        let config = SeedConfig {
            co_borrower_probability: 1.5,
            ..Default::default()
        };
        assert!(config.validate().is_err());

        let config = SeedConfig {
            schema: "public; DROP TABLE cases".to_string(),
            ..Default::default()
        };
        assert!(config.validate().is_err());

        let config = SeedConfig {
            progress_interval: 0,
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_identifier_rules() {
        assert!(is_valid_identifier("public"));
        assert!(is_valid_identifier("_crm2"));
        assert!(!is_valid_identifier(""));
        assert!(!is_valid_identifier("2crm"));
        assert!(!is_valid_identifier("crm.dbo"));
        assert!(!is_valid_identifier("crm\"x"));
    }

    #[test]
    fn test_partial_json_keeps_defaults() {
        let config: SeedConfig =
            serde_json::from_str(r#"{ "opportunity_count": 40, "schema": "dbo" }"#).unwrap();
        assert_eq!(config.opportunity_count, 40);
        assert_eq!(config.schema, "dbo");
        assert_eq!(config.port, 5432);
        assert_eq!(config.partner_count(), 50);
        assert_eq!(config.case_count(), 16);
    }
}
