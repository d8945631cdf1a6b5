//! Layered process settings.
//!
//! Sources, lowest precedence first: built-in defaults, an optional
//! `clinica.toml` (or the file named by `CLINICA_CONFIG`), then
//! environment variables prefixed `CLINICA__` with `__` as the nesting
//! separator, e.g. `CLINICA__AUTH__JWT_SECRET`.

use std::path::Path;
use std::str::FromStr;

use clinica_auth::AuthConfig;
use clinica_db::DbConfig;
use config::builder::DefaultState;
use config::{Config, ConfigBuilder, ConfigError, Environment, File};
use jsonwebtoken::Algorithm;
use serde::Deserialize;

#[derive(Debug, Clone, Deserialize)]
pub struct Settings {
    pub server: ServerSettings,
    pub database: DatabaseSettings,
    pub auth: AuthSettings,
    pub logging: LoggingSettings,
    pub mail: MailSettings,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServerSettings {
    pub host: String,
    pub port: u16,
}

#[derive(Debug, Clone, Deserialize)]
pub struct DatabaseSettings {
    pub url: String,
    pub namespace: String,
    pub database: String,
    pub username: Option<String>,
    pub password: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AuthSettings {
    /// No default: startup fails when it is missing.
    pub jwt_secret: String,
    pub jwt_algorithm: String,
    pub access_token_lifetime_secs: u64,
    pub pepper: Option<String>,
    pub min_password_length: usize,
}

#[derive(Debug, Clone, Deserialize)]
pub struct LoggingSettings {
    pub file: String,
    pub max_bytes: u64,
    pub backup_count: usize,
    pub level: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct MailSettings {
    pub from: String,
    /// Relay host; mail is only logged when unset.
    pub smtp_server: Option<String>,
    pub smtp_port: u16,
    pub username: Option<String>,
    pub password: Option<String>,
    /// Upgrade the connection with STARTTLS.
    pub use_tls: bool,
}

fn defaults() -> Result<ConfigBuilder<DefaultState>, ConfigError> {
    Config::builder()
        .set_default("server.host", "0.0.0.0")?
        .set_default("server.port", 8080)?
        .set_default("database.url", "ws://127.0.0.1:8000")?
        .set_default("database.namespace", "clinica")?
        .set_default("database.database", "main")?
        .set_default("auth.jwt_algorithm", "HS256")?
        .set_default("auth.access_token_lifetime_secs", 7200)?
        .set_default("auth.min_password_length", 8)?
        .set_default("logging.file", "logs/app.log")?
        .set_default("logging.max_bytes", 5 * 1024 * 1024)?
        .set_default("logging.backup_count", 5)?
        .set_default("logging.level", "info")?
        .set_default("mail.from", "nao-responda@clinica.local")?
        .set_default("mail.smtp_port", 587)?
        .set_default("mail.use_tls", true)
}

impl Settings {
    /// Load settings from defaults, the optional file and the environment.
    pub fn load() -> Result<Self, ConfigError> {
        let path = std::env::var("CLINICA_CONFIG").unwrap_or_else(|_| "clinica.toml".into());
        Self::load_from(Path::new(&path))
    }

    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        defaults()?
            .add_source(File::from(path).required(false))
            .add_source(
                Environment::with_prefix("CLINICA")
                    .prefix_separator("__")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?
            .try_deserialize()
    }

    pub fn db_config(&self) -> DbConfig {
        DbConfig {
            url: self.database.url.clone(),
            namespace: self.database.namespace.clone(),
            database: self.database.database.clone(),
            username: self.database.username.clone(),
            password: self.database.password.clone(),
        }
    }

    pub fn auth_config(&self) -> Result<AuthConfig, ConfigError> {
        let jwt_algorithm = Algorithm::from_str(&self.auth.jwt_algorithm).map_err(|e| {
            ConfigError::Message(format!(
                "invalid auth.jwt_algorithm {:?}: {e}",
                self.auth.jwt_algorithm
            ))
        })?;
        let config = AuthConfig {
            jwt_secret: self.auth.jwt_secret.clone(),
            jwt_algorithm,
            access_token_lifetime_secs: self.auth.access_token_lifetime_secs,
            pepper: self.auth.pepper.clone(),
            min_password_length: self.auth.min_password_length,
        };
        config
            .validate()
            .map_err(|e| ConfigError::Message(e.to_string()))?;
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use super::*;

    #[test]
    fn file_values_override_defaults() {
        let mut file = tempfile::Builder::new().suffix(".toml").tempfile().unwrap();
        writeln!(
            file,
            "[auth]\njwt_secret = \"from-file\"\njwt_algorithm = \"HS384\"\n\n\
             [server]\nport = 9100\n"
        )
        .unwrap();

        let settings = Settings::load_from(file.path()).unwrap();
        assert_eq!(settings.server.port, 9100);
        assert_eq!(settings.server.host, "0.0.0.0");
        assert_eq!(settings.logging.max_bytes, 5 * 1024 * 1024);
        assert_eq!(settings.logging.backup_count, 5);

        let auth = settings.auth_config().unwrap();
        assert_eq!(auth.jwt_secret, "from-file");
        assert_eq!(auth.jwt_algorithm, Algorithm::HS384);
        assert_eq!(auth.access_token_lifetime_secs, 7200);
    }

    #[test]
    fn default_listen_port_differs_from_database_port() {
        let mut file = tempfile::Builder::new().suffix(".toml").tempfile().unwrap();
        writeln!(file, "[auth]\njwt_secret = \"x\"\n").unwrap();
        let settings = Settings::load_from(file.path()).unwrap();
        assert_eq!(settings.server.port, 8080);
        assert!(
            !settings
                .database
                .url
                .ends_with(&format!(":{}", settings.server.port))
        );
    }

    #[test]
    fn smtp_fields_are_read_from_the_file() {
        let mut file = tempfile::Builder::new().suffix(".toml").tempfile().unwrap();
        writeln!(
            file,
            "[auth]\njwt_secret = \"x\"\n\n\
             [mail]\nfrom = \"clinica@hospital.org\"\nsmtp_server = \"smtp.hospital.org\"\n\
             smtp_port = 2525\nusername = \"clinica\"\npassword = \"segredo\"\nuse_tls = false\n"
        )
        .unwrap();

        let mail = Settings::load_from(file.path()).unwrap().mail;
        assert_eq!(mail.from, "clinica@hospital.org");
        assert_eq!(mail.smtp_server.as_deref(), Some("smtp.hospital.org"));
        assert_eq!(mail.smtp_port, 2525);
        assert_eq!(mail.username.as_deref(), Some("clinica"));
        assert_eq!(mail.password.as_deref(), Some("segredo"));
        assert!(!mail.use_tls);
    }

    #[test]
    fn smtp_is_off_by_default() {
        let mut file = tempfile::Builder::new().suffix(".toml").tempfile().unwrap();
        writeln!(file, "[auth]\njwt_secret = \"x\"\n").unwrap();

        let mail = Settings::load_from(file.path()).unwrap().mail;
        assert!(mail.smtp_server.is_none());
        assert_eq!(mail.smtp_port, 587);
        assert!(mail.use_tls);
    }

    #[test]
    fn asymmetric_algorithm_is_rejected() {
        let mut file = tempfile::Builder::new().suffix(".toml").tempfile().unwrap();
        writeln!(file, "[auth]\njwt_secret = \"x\"\njwt_algorithm = \"RS256\"\n").unwrap();

        let settings = Settings::load_from(file.path()).unwrap();
        assert!(settings.auth_config().is_err());
    }
}
