//! # Configuration Module
//!
//! Handles loading and validating configuration from TOML files.

use serde::de::Error;
use serde::Deserialize;
use std::fs;
use std::path::Path;
use std::time::Duration;

use crate::error::{LoggerError, Result};

/// Main configuration structure
#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    pub app: AppConfig,
    pub lte: LteConfig,
    pub gnss: GnssConfig,
    pub dummy: DummyConfig,
    pub rest: RestConfig,
    pub simulator: SimulatorConfig,
    pub logging: LoggingConfig,
}

/// Which telemetry the application logs
#[derive(Debug, Deserialize, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum AppMode {
    /// Constant dummy frames, exercises the upload path
    Dummy,
    /// LTE link parameters
    Lte,
    /// GNSS fixes
    Gnss,
}

/// Application loop configuration
#[derive(Debug, Deserialize, Clone)]
pub struct AppConfig {
    #[serde(default = "default_mode")]
    pub mode: AppMode,

    #[serde(default = "default_sleep_time_s")]
    pub sleep_time_s: u64,
}

/// LTE subsystem configuration
#[derive(Debug, Deserialize, Clone)]
pub struct LteConfig {
    #[serde(default = "default_conn_timeout_s")]
    pub conn_timeout_s: u64,

    #[serde(default = "default_lte_data_timeout_s")]
    pub data_timeout_s: u64,

    #[serde(default)]
    pub use_psm: bool,

    #[serde(default)]
    pub use_edrx: bool,

    #[serde(default = "default_buf_size")]
    pub buf_size: usize,

    #[serde(default = "default_lte_upload_url")]
    pub upload_url: String,
}

/// GNSS subsystem configuration
#[derive(Debug, Deserialize, Clone)]
pub struct GnssConfig {
    #[serde(default = "default_gnss_data_timeout_s")]
    pub data_timeout_s: u64,

    #[serde(default = "default_buf_size")]
    pub buf_size: usize,

    #[serde(default = "default_gnss_upload_url")]
    pub upload_url: String,
}

/// Dummy data configuration
#[derive(Debug, Deserialize, Clone)]
pub struct DummyConfig {
    #[serde(default = "default_buf_size")]
    pub buf_size: usize,

    #[serde(default = "default_dummy_upload_url")]
    pub upload_url: String,
}

/// REST server configuration
#[derive(Debug, Deserialize, Clone)]
pub struct RestConfig {
    #[serde(default = "default_host")]
    pub host: String,

    #[serde(default = "default_port")]
    pub port: u16,

    #[serde(default = "default_tls")]
    pub tls: bool,

    #[serde(default = "default_accept_invalid_certs")]
    pub accept_invalid_certs: bool,

    #[serde(default)]
    pub api_key: String,

    #[serde(default = "default_content_type")]
    pub content_type: String,

    #[serde(default = "default_request_timeout_s")]
    pub request_timeout_s: u64,
}

/// Simulated modem configuration
#[derive(Debug, Deserialize, Clone)]
pub struct SimulatorConfig {
    #[serde(default = "default_event_delay_ms")]
    pub event_delay_ms: u64,

    #[serde(default)]
    pub roaming: bool,

    #[serde(default = "default_latitude")]
    pub latitude: f64,

    #[serde(default = "default_longitude")]
    pub longitude: f64,
}

/// Logging configuration
#[derive(Debug, Deserialize, Clone)]
pub struct LoggingConfig {
    #[serde(default = "default_log_level")]
    pub level: String,

    /// Directory for daily log files, empty for console only
    #[serde(default)]
    pub log_dir: String,
}

// Default value functions
fn default_mode() -> AppMode { AppMode::Lte }
fn default_sleep_time_s() -> u64 { 60 }

fn default_conn_timeout_s() -> u64 { 60 }
fn default_lte_data_timeout_s() -> u64 { 60 }
fn default_gnss_data_timeout_s() -> u64 { 300 }
fn default_buf_size() -> usize { 512 }
fn default_lte_upload_url() -> String { "/lte".to_string() }
fn default_gnss_upload_url() -> String { "/gnss".to_string() }
fn default_dummy_upload_url() -> String { "/dummy".to_string() }

fn default_host() -> String { "localhost".to_string() }
fn default_port() -> u16 { 443 }
fn default_tls() -> bool { true }
fn default_accept_invalid_certs() -> bool { true }
fn default_content_type() -> String { "application/json".to_string() }
fn default_request_timeout_s() -> u64 { 10 }

fn default_event_delay_ms() -> u64 { 200 }
fn default_latitude() -> f64 { -33.8688 }
fn default_longitude() -> f64 { 151.2093 }

fn default_log_level() -> String { "info".to_string() }

/// Accepted values for `logging.level`
const LOG_LEVELS: &[&str] = &["trace", "debug", "info", "warn", "error"];

fn invalid(msg: impl std::fmt::Display) -> LoggerError {
    LoggerError::Config(toml::de::Error::custom(msg))
}

impl AppConfig {
    pub fn sleep_time(&self) -> Duration {
        Duration::from_secs(self.sleep_time_s)
    }
}

impl LteConfig {
    /// How long to wait for network registration
    pub fn conn_timeout(&self) -> Duration {
        Duration::from_secs(self.conn_timeout_s)
    }

    /// How long to wait for the next LTE data update
    pub fn data_timeout(&self) -> Duration {
        Duration::from_secs(self.data_timeout_s)
    }
}

impl GnssConfig {
    /// How long to wait for a GNSS fix
    pub fn data_timeout(&self) -> Duration {
        Duration::from_secs(self.data_timeout_s)
    }
}

impl RestConfig {
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_s)
    }
}

impl SimulatorConfig {
    pub fn event_delay(&self) -> Duration {
        Duration::from_millis(self.event_delay_ms)
    }
}

impl Config {
    /// Load configuration from a TOML file
    ///
    /// # Arguments
    ///
    /// * `path` - Path to the configuration file
    ///
    /// # Returns
    ///
    /// * `Result<Config>` - Loaded and validated configuration
    ///
    /// # Errors
    ///
    /// Returns error if:
    /// - File cannot be read
    /// - TOML parsing fails
    /// - Validation fails
    ///
    /// # Examples
    ///
    /// ```no_run
    /// use cellular_logger::config::Config;
    ///
    /// let config = Config::load("config/default.toml")?;
    /// # Ok::<(), Box<dyn std::error::Error>>(())
    /// ```
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let contents = fs::read_to_string(path)?;
        Self::parse(&contents)
    }

    /// Parse and validate configuration from TOML text
    pub fn parse(contents: &str) -> Result<Self> {
        let config: Config = toml::from_str(contents)?;
        config.validate()?;
        Ok(config)
    }

    /// Validate configuration values
    ///
    /// # Errors
    ///
    /// Returns error if any configuration value is out of valid range
    pub fn validate(&self) -> Result<()> {
        if self.app.sleep_time_s > 86_400 {
            return Err(invalid("sleep_time_s must be between 0 and 86400"));
        }

        // Validate wait timeouts
        for (name, value) in [
            ("lte.conn_timeout_s", self.lte.conn_timeout_s),
            ("lte.data_timeout_s", self.lte.data_timeout_s),
            ("gnss.data_timeout_s", self.gnss.data_timeout_s),
        ] {
            if value == 0 || value > 3_600 {
                return Err(invalid(format!("{} must be between 1 and 3600", name)));
            }
        }

        // Validate output buffers and upload targets
        for (name, buf_size, url) in [
            ("lte", self.lte.buf_size, &self.lte.upload_url),
            ("gnss", self.gnss.buf_size, &self.gnss.upload_url),
            ("dummy", self.dummy.buf_size, &self.dummy.upload_url),
        ] {
            if !(64..=65_536).contains(&buf_size) {
                return Err(invalid(format!("{}.buf_size must be between 64 and 65536", name)));
            }
            if !url.starts_with('/') {
                return Err(invalid(format!("{}.upload_url must start with '/'", name)));
            }
        }

        // Validate REST server
        if self.rest.host.is_empty() {
            return Err(invalid("rest host cannot be empty"));
        }

        if self.rest.port == 0 {
            return Err(invalid("rest port must be greater than 0"));
        }

        if self.rest.content_type.is_empty() {
            return Err(invalid("rest content_type cannot be empty"));
        }

        if self.rest.request_timeout_s == 0 || self.rest.request_timeout_s > 300 {
            return Err(invalid("request_timeout_s must be between 1 and 300"));
        }

        // Validate simulator
        if self.simulator.event_delay_ms > 60_000 {
            return Err(invalid("event_delay_ms must be between 0 and 60000"));
        }

        if !(-90.0..=90.0).contains(&self.simulator.latitude) {
            return Err(invalid("latitude must be between -90 and 90"));
        }

        if !(-180.0..=180.0).contains(&self.simulator.longitude) {
            return Err(invalid("longitude must be between -180 and 180"));
        }

        // Validate log level
        if !LOG_LEVELS.contains(&self.logging.level.as_str()) {
            return Err(invalid(format!(
                "log level must be one of: {}",
                LOG_LEVELS.join(", ")
            )));
        }

        Ok(())
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;

    pub(crate) fn create_valid_config() -> Config {
        Config {
            app: AppConfig {
                mode: default_mode(),
                sleep_time_s: default_sleep_time_s(),
            },
            lte: LteConfig {
                conn_timeout_s: default_conn_timeout_s(),
                data_timeout_s: default_lte_data_timeout_s(),
                use_psm: false,
                use_edrx: false,
                buf_size: default_buf_size(),
                upload_url: default_lte_upload_url(),
            },
            gnss: GnssConfig {
                data_timeout_s: default_gnss_data_timeout_s(),
                buf_size: default_buf_size(),
                upload_url: default_gnss_upload_url(),
            },
            dummy: DummyConfig {
                buf_size: default_buf_size(),
                upload_url: default_dummy_upload_url(),
            },
            rest: RestConfig {
                host: default_host(),
                port: default_port(),
                tls: default_tls(),
                accept_invalid_certs: default_accept_invalid_certs(),
                api_key: String::new(),
                content_type: default_content_type(),
                request_timeout_s: default_request_timeout_s(),
            },
            simulator: SimulatorConfig {
                event_delay_ms: default_event_delay_ms(),
                roaming: false,
                latitude: default_latitude(),
                longitude: default_longitude(),
            },
            logging: LoggingConfig {
                level: default_log_level(),
                log_dir: String::new(),
            },
        }
    }

    #[test]
    fn test_default_config() {
        assert!(create_valid_config().validate().is_ok());
    }

    #[test]
    fn test_load_config_from_file() {
        use std::io::Write;
        use tempfile::NamedTempFile;

        let toml_content = r#"
[app]
mode = "gnss"

[lte]
use_psm = true

[gnss]

[dummy]

[rest]
host = "telemetry.example.com"
api_key = "secret"

[simulator]

[logging]
"#;

        let mut temp_file = NamedTempFile::new().unwrap();
        temp_file.write_all(toml_content.as_bytes()).unwrap();
        temp_file.flush().unwrap();

        let config = Config::load(temp_file.path()).unwrap();
        assert_eq!(config.app.mode, AppMode::Gnss);
        assert!(config.lte.use_psm);
        assert!(!config.lte.use_edrx);
        assert_eq!(config.rest.host, "telemetry.example.com");
        assert_eq!(config.rest.api_key, "secret");
        assert_eq!(config.gnss.data_timeout(), Duration::from_secs(300));
    }

    #[test]
    fn test_load_missing_file() {
        let result = Config::load("/nonexistent/cellular-logger.toml");
        assert!(matches!(result, Err(LoggerError::Io(_))));
    }

    #[test]
    fn test_parse_missing_section() {
        let result = Config::parse("[app]\n[lte]\n");
        assert!(matches!(result, Err(LoggerError::Config(_))));
    }

    #[test]
    fn test_parse_unknown_mode() {
        let toml_content = "[app]\nmode = \"wifi\"\n[lte]\n[gnss]\n[dummy]\n[rest]\n[simulator]\n[logging]\n";
        assert!(Config::parse(toml_content).is_err());
    }

    #[test]
    fn test_sleep_time_too_high() {
        let mut config = create_valid_config();
        config.app.sleep_time_s = 86_401;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_sleep_time_zero_allowed() {
        let mut config = create_valid_config();
        config.app.sleep_time_s = 0;
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_conn_timeout_zero() {
        let mut config = create_valid_config();
        config.lte.conn_timeout_s = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_lte_data_timeout_too_high() {
        let mut config = create_valid_config();
        config.lte.data_timeout_s = 3_601;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_gnss_data_timeout_zero() {
        let mut config = create_valid_config();
        config.gnss.data_timeout_s = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_buf_size_too_small() {
        let mut config = create_valid_config();
        config.lte.buf_size = 63;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_buf_size_too_large() {
        let mut config = create_valid_config();
        config.dummy.buf_size = 65_537;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_upload_url_without_slash() {
        let mut config = create_valid_config();
        config.gnss.upload_url = "gnss".to_string();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_empty_host() {
        let mut config = create_valid_config();
        config.rest.host = String::new();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_port_zero() {
        let mut config = create_valid_config();
        config.rest.port = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_empty_content_type() {
        let mut config = create_valid_config();
        config.rest.content_type = String::new();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_request_timeout_out_of_range() {
        let mut config = create_valid_config();
        config.rest.request_timeout_s = 0;
        assert!(config.validate().is_err());
        config.rest.request_timeout_s = 301;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_event_delay_too_high() {
        let mut config = create_valid_config();
        config.simulator.event_delay_ms = 60_001;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_latitude_out_of_range() {
        let mut config = create_valid_config();
        config.simulator.latitude = 90.5;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_longitude_out_of_range() {
        let mut config = create_valid_config();
        config.simulator.longitude = -180.5;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_invalid_log_level() {
        let mut config = create_valid_config();
        config.logging.level = "verbose".to_string();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_valid_log_levels() {
        for level in LOG_LEVELS {
            let mut config = create_valid_config();
            config.logging.level = level.to_string();
            assert!(config.validate().is_ok(), "Log level {} should be valid", level);
        }
    }

    #[test]
    fn test_duration_accessors() {
        let config = create_valid_config();
        assert_eq!(config.app.sleep_time(), Duration::from_secs(60));
        assert_eq!(config.lte.conn_timeout(), Duration::from_secs(60));
        assert_eq!(config.lte.data_timeout(), Duration::from_secs(60));
        assert_eq!(config.rest.request_timeout(), Duration::from_secs(10));
        assert_eq!(config.simulator.event_delay(), Duration::from_millis(200));
    }

    #[test]
    fn test_default_functions() {
        assert_eq!(default_mode(), AppMode::Lte);
        assert_eq!(default_sleep_time_s(), 60);
        assert_eq!(default_conn_timeout_s(), 60);
        assert_eq!(default_lte_data_timeout_s(), 60);
        assert_eq!(default_gnss_data_timeout_s(), 300);
        assert_eq!(default_buf_size(), 512);
        assert_eq!(default_lte_upload_url(), "/lte");
        assert_eq!(default_gnss_upload_url(), "/gnss");
        assert_eq!(default_dummy_upload_url(), "/dummy");
        assert_eq!(default_host(), "localhost");
        assert_eq!(default_port(), 443);
        assert!(default_tls());
        assert!(default_accept_invalid_certs());
        assert_eq!(default_content_type(), "application/json");
        assert_eq!(default_request_timeout_s(), 10);
        assert_eq!(default_event_delay_ms(), 200);
        assert_eq!(default_log_level(), "info");
    }
}
