//! Config - Configurazione dell'applicazione caricata da variabili d'ambiente
//!
//! Il file `.env` (se presente) viene letto con `dotenv()`, poi ogni variabile
//! viene risolta tramite una funzione di lookup: in produzione è `std::env::var`,
//! nei test una semplice mappa.

use dotenv::dotenv;
use std::env;
use std::fmt;
use std::str::FromStr;
use thiserror::Error;
use tracing::{info, warn};

/// Valore segnaposto usato nei file `.env` di esempio, da cambiare sempre
pub const DEFAULT_SECRET: &str = "changethis";

/// Prefisso versionato di tutte le route REST
pub const API_V1_STR: &str = "/api/v1";

#[derive(Debug, Error, PartialEq)]
pub enum ConfigError {
    #[error("{0} must be set")]
    Missing(&'static str),

    #[error("invalid {key}: {reason}")]
    Invalid { key: &'static str, reason: String },

    #[error(
        "the value of {0} is \"changethis\", for security, please change it, at least for deployments"
    )]
    InsecureDefault(&'static str),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Environment {
    Local,
    Staging,
    Production,
}

impl FromStr for Environment {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.to_ascii_lowercase().as_str() {
            "local" => Ok(Environment::Local),
            "staging" => Ok(Environment::Staging),
            "production" => Ok(Environment::Production),
            other => Err(format!(
                "unknown environment '{other}', expected local, staging or production"
            )),
        }
    }
}

impl fmt::Display for Environment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Environment::Local => "local",
            Environment::Staging => "staging",
            Environment::Production => "production",
        };
        f.write_str(name)
    }
}

#[derive(Debug, Clone)]
pub struct Config {
    pub project_name: String,
    pub environment: Environment,
    pub secret_key: String,
    pub access_token_expire_minutes: i64,
    pub frontend_host: String,
    pub backend_cors_origins: Vec<String>,
    pub server_host: String,
    pub server_port: u16,

    pub database_url: Option<String>,
    pub postgres_server: String,
    pub postgres_port: u16,
    pub postgres_user: String,
    pub postgres_password: String,
    pub postgres_db: String,
    pub max_connections: u32,

    pub smtp_tls: bool,
    pub smtp_ssl: bool,
    pub smtp_port: u16,
    pub smtp_host: Option<String>,
    pub smtp_user: Option<String>,
    pub smtp_password: Option<String>,
    pub emails_from_email: Option<String>,
    pub emails_from_name: Option<String>,
    pub email_reset_token_expire_hours: i64,
    pub email_test_user: String,

    pub first_superuser: String,
    pub first_superuser_password: String,
}

impl Default for Config {
    /// Valori di sviluppo locale, gli stessi usati quando la variabile manca
    fn default() -> Self {
        Self {
            project_name: "Full Stack Project".to_string(),
            environment: Environment::Local,
            secret_key: DEFAULT_SECRET.to_string(),
            access_token_expire_minutes: 60 * 24 * 8,
            frontend_host: "http://localhost:5173".to_string(),
            backend_cors_origins: Vec::new(),
            server_host: "127.0.0.1".to_string(),
            server_port: 8000,
            database_url: None,
            postgres_server: "localhost".to_string(),
            postgres_port: 5432,
            postgres_user: "postgres".to_string(),
            postgres_password: String::new(),
            postgres_db: "app".to_string(),
            max_connections: 10,
            smtp_tls: true,
            smtp_ssl: false,
            smtp_port: 587,
            smtp_host: None,
            smtp_user: None,
            smtp_password: None,
            emails_from_email: None,
            emails_from_name: None,
            email_reset_token_expire_hours: 48,
            email_test_user: "test@example.com".to_string(),
            first_superuser: "admin@example.com".to_string(),
            first_superuser_password: DEFAULT_SECRET.to_string(),
        }
    }
}

impl Config {
    /// Carica la configurazione dalle variabili d'ambiente
    /// Chiama dotenv() automaticamente
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenv().ok();
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Costruisce la configurazione leggendo ogni chiave da `lookup`.
    /// Le stringhe vuote sono trattate come variabili non impostate.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());
        let defaults = Config::default();

        let project_name = get("PROJECT_NAME").unwrap_or(defaults.project_name);
        let environment = parse_or("ENVIRONMENT", get("ENVIRONMENT"), defaults.environment)?;

        let secret_key = get("SECRET_KEY").unwrap_or(defaults.secret_key);
        let access_token_expire_minutes = parse_or(
            "ACCESS_TOKEN_EXPIRE_MINUTES",
            get("ACCESS_TOKEN_EXPIRE_MINUTES"),
            defaults.access_token_expire_minutes,
        )?;

        let frontend_host = get("FRONTEND_HOST").unwrap_or(defaults.frontend_host);
        let backend_cors_origins = get("BACKEND_CORS_ORIGINS")
            .map(|raw| parse_cors(&raw))
            .unwrap_or_default();

        let server_host = get("SERVER_HOST").unwrap_or(defaults.server_host);
        let server_port = parse_or("SERVER_PORT", get("SERVER_PORT"), defaults.server_port)?;

        let max_connections = parse_or(
            "MAX_DB_CONNECTIONS",
            get("MAX_DB_CONNECTIONS"),
            defaults.max_connections,
        )?;

        let first_superuser =
            get("FIRST_SUPERUSER").ok_or(ConfigError::Missing("FIRST_SUPERUSER"))?;
        let first_superuser_password = get("FIRST_SUPERUSER_PASSWORD")
            .ok_or(ConfigError::Missing("FIRST_SUPERUSER_PASSWORD"))?;

        let config = Config {
            project_name,
            environment,
            secret_key,
            access_token_expire_minutes,
            frontend_host,
            backend_cors_origins,
            server_host,
            server_port,
            database_url: get("DATABASE_URL"),
            postgres_server: get("POSTGRES_SERVER").unwrap_or(defaults.postgres_server),
            postgres_port: parse_or("POSTGRES_PORT", get("POSTGRES_PORT"), defaults.postgres_port)?,
            postgres_user: get("POSTGRES_USER").unwrap_or(defaults.postgres_user),
            postgres_password: get("POSTGRES_PASSWORD").unwrap_or(defaults.postgres_password),
            postgres_db: get("POSTGRES_DB").unwrap_or(defaults.postgres_db),
            max_connections,
            smtp_tls: parse_or("SMTP_TLS", get("SMTP_TLS"), defaults.smtp_tls)?,
            smtp_ssl: parse_or("SMTP_SSL", get("SMTP_SSL"), defaults.smtp_ssl)?,
            smtp_port: parse_or("SMTP_PORT", get("SMTP_PORT"), defaults.smtp_port)?,
            smtp_host: get("SMTP_HOST"),
            smtp_user: get("SMTP_USER"),
            smtp_password: get("SMTP_PASSWORD"),
            emails_from_email: get("EMAILS_FROM_EMAIL"),
            emails_from_name: get("EMAILS_FROM_NAME"),
            email_reset_token_expire_hours: parse_or(
                "EMAIL_RESET_TOKEN_EXPIRE_HOURS",
                get("EMAIL_RESET_TOKEN_EXPIRE_HOURS"),
                defaults.email_reset_token_expire_hours,
            )?,
            email_test_user: get("EMAIL_TEST_USER").unwrap_or(defaults.email_test_user),
            first_superuser,
            first_superuser_password,
        };

        config.check_default_secrets()?;
        Ok(config)
    }

    /// Segreti lasciati a "changethis": warning in locale, errore altrove
    fn check_default_secrets(&self) -> Result<(), ConfigError> {
        let secrets = [
            ("SECRET_KEY", &self.secret_key),
            ("POSTGRES_PASSWORD", &self.postgres_password),
            ("FIRST_SUPERUSER_PASSWORD", &self.first_superuser_password),
        ];
        for (key, value) in secrets {
            if value != DEFAULT_SECRET {
                continue;
            }
            if self.environment == Environment::Local {
                warn!("{}", ConfigError::InsecureDefault(key));
            } else {
                return Err(ConfigError::InsecureDefault(key));
            }
        }
        Ok(())
    }

    /// URL di connessione: DATABASE_URL se presente, altrimenti composto dalle POSTGRES_*
    pub fn database_url(&self) -> String {
        match &self.database_url {
            Some(url) => url.clone(),
            None => format!(
                "postgres://{}:{}@{}:{}/{}",
                self.postgres_user,
                self.postgres_password,
                self.postgres_server,
                self.postgres_port,
                self.postgres_db
            ),
        }
    }

    /// Origini CORS configurate più il frontend, senza slash finale
    pub fn all_cors_origins(&self) -> Vec<String> {
        let mut origins: Vec<String> = self
            .backend_cors_origins
            .iter()
            .map(|o| o.trim_end_matches('/').to_string())
            .collect();
        let frontend = self.frontend_host.trim_end_matches('/').to_string();
        if !origins.contains(&frontend) {
            origins.push(frontend);
        }
        origins
    }

    pub fn emails_enabled(&self) -> bool {
        self.smtp_host.is_some() && self.emails_from_email.is_some()
    }

    /// Logga la configurazione (nascondendo i segreti)
    pub fn print_info(&self) {
        info!(
            project = %self.project_name,
            environment = %self.environment,
            address = %format!("{}:{}", self.server_host, self.server_port),
            database = %Self::mask_url(&self.database_url()),
            max_connections = self.max_connections,
            emails_enabled = self.emails_enabled(),
            "Server configuration"
        );
        if self.secret_key == DEFAULT_SECRET {
            warn!("SECRET_KEY is using the default value (insecure!)");
        }
    }

    /// Maschera l'URL del database per il logging
    fn mask_url(url: &str) -> String {
        if let Some(at_pos) = url.find('@') {
            if let Some(scheme_end) = url.find("://") {
                let scheme = &url[..scheme_end + 3];
                let after_at = &url[at_pos..];
                return format!("{}***{}", scheme, after_at);
            }
        }
        "***".to_string()
    }
}

fn parse_or<T>(key: &'static str, raw: Option<String>, default: T) -> Result<T, ConfigError>
where
    T: FromStr,
    T::Err: fmt::Display,
{
    match raw {
        None => Ok(default),
        Some(value) => value.trim().to_ascii_lowercase().parse::<T>().map_err(|e| ConfigError::Invalid {
            key,
            reason: e.to_string(),
        }),
    }
}

/// Accetta sia "a,b,c" sia una lista JSON `["a","b"]`
fn parse_cors(raw: &str) -> Vec<String> {
    let trimmed = raw.trim();
    if trimmed.starts_with('[') {
        if let Ok(list) = serde_json::from_str::<Vec<String>>(trimmed) {
            return list;
        }
    }
    trimmed
        .split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}
