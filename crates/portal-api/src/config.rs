// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! API server configuration.
//!
//! Values come from an optional YAML/TOML file, then from `PORTAL_*`
//! environment variables, nested with `__`:
//!
//! ```text
//! PORTAL_PORT=9090
//! PORTAL_TOKEN__SECRET=...
//! PORTAL_TOKEN__TTL_SECS=300
//! PORTAL_CREDENTIALS__SECRET=...
//! PORTAL_CREDENTIALS__TRUST=verified
//! ```
//!
//! `SHORT_TOKEN_SECRET` and `SHORT_TOKEN_TTL_SEC` are still honoured when
//! the corresponding `PORTAL_` value is not set.

use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use portal_core::signature::RECOMMENDED_SECRET_LEN;
use portal_core::{Clock, CredentialTrust, SigningSecret, TokenService, DEFAULT_TTL_SECS};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{info, warn};

/// Environment variable prefix.
pub const ENV_PREFIX: &str = "PORTAL";

/// Legacy name of the session signing secret variable.
pub const LEGACY_SECRET_VAR: &str = "SHORT_TOKEN_SECRET";

/// Legacy name of the session TTL variable.
pub const LEGACY_TTL_VAR: &str = "SHORT_TOKEN_TTL_SEC";

/// Longest accepted session token lifetime (one day).
pub const MAX_TTL_SECS: u64 = 86_400;

/// Environment variables as a map, for tests and embedding.
pub type EnvMap = config::Map<String, String>;

// =============================================================================
// ConfigError
// =============================================================================

/// Result type alias for configuration operations.
pub type ConfigResult<T> = Result<T, ConfigError>;

/// Configuration errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The file or environment could not be read or deserialized.
    #[error("Failed to load configuration: {0}")]
    Load(#[from] config::ConfigError),

    /// Configuration file does not exist.
    #[error("Configuration file not found: {}", path.display())]
    FileNotFound {
        /// Path that was given.
        path: PathBuf,
    },

    /// A required secret is empty.
    #[error("Missing secret '{field}' (set {env} or run with --dev-mode)")]
    MissingSecret {
        /// Config field.
        field: &'static str,
        /// Environment variable to set.
        env: &'static str,
    },

    /// A value is out of range.
    #[error("Validation failed for '{field}': {message}")]
    Validation {
        /// The field that failed validation.
        field: &'static str,
        /// Error message.
        message: String,
    },
}

impl ConfigError {
    fn validation(field: &'static str, message: impl Into<String>) -> Self {
        Self::Validation {
            field,
            message: message.into(),
        }
    }
}

// =============================================================================
// ApiConfig
// =============================================================================

/// Configuration for the API server.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ApiConfig {
    /// Server host address.
    pub host: IpAddr,
    /// Server port.
    pub port: u16,
    /// Session token settings.
    pub token: TokenConfig,
    /// Long-lived credential settings.
    pub credentials: CredentialConfig,
    /// Request timeout in seconds.
    pub request_timeout_secs: u64,
    /// CORS configuration.
    pub cors: CorsConfig,
    /// Audit logging configuration.
    pub audit: AuditConfig,
    /// Generate missing secrets instead of failing. Never use in production.
    pub dev_mode: bool,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            host: IpAddr::V4(Ipv4Addr::new(0, 0, 0, 0)),
            port: 8080,
            token: TokenConfig::default(),
            credentials: CredentialConfig::default(),
            request_timeout_secs: 30,
            cors: CorsConfig::default(),
            audit: AuditConfig::default(),
            dev_mode: false,
        }
    }
}

impl ApiConfig {
    /// Creates a new configuration with default values.
    pub fn new() -> Self {
        Self::default()
    }

    /// Loads configuration from an optional file and the process environment.
    pub fn load(path: Option<&Path>) -> ConfigResult<Self> {
        Self::load_with_env(path, None)
    }

    /// Loads configuration from an optional file and the given environment.
    ///
    /// `None` reads the process environment.
    pub fn load_with_env(path: Option<&Path>, env: Option<EnvMap>) -> ConfigResult<Self> {
        let mut builder = config::Config::builder();

        if let Some(path) = path {
            if !path.exists() {
                return Err(ConfigError::FileNotFound {
                    path: path.to_path_buf(),
                });
            }
            info!("Loading configuration from: {}", path.display());
            builder = builder.add_source(config::File::from(path).required(true));
        }

        builder = builder.add_source(
            config::Environment::with_prefix(ENV_PREFIX)
                .prefix_separator("_")
                .separator("__")
                .try_parsing(true)
                .source(env.clone()),
        );

        let mut loaded: ApiConfig = builder.build()?.try_deserialize()?;

        let lookup = |name: &str| match &env {
            Some(map) => map.get(name).cloned(),
            None => std::env::var(name).ok(),
        };
        loaded.apply_legacy_env(lookup);

        Ok(loaded)
    }

    /// Applies `SHORT_TOKEN_*` variables where the portal values are unset.
    fn apply_legacy_env(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        if self.token.secret.is_empty() {
            if let Some(secret) = lookup(LEGACY_SECRET_VAR).filter(|s| !s.is_empty()) {
                self.token.secret = secret;
            }
        }
        if self.token.ttl_secs == DEFAULT_TTL_SECS {
            if let Some(ttl) = lookup(LEGACY_TTL_VAR).and_then(|v| v.trim().parse().ok()) {
                self.token.ttl_secs = ttl;
            }
        }
    }

    /// Validates the configuration.
    pub fn validate(&self) -> ConfigResult<()> {
        if self.token.ttl_secs == 0 {
            return Err(ConfigError::validation("token.ttl_secs", "must be greater than 0"));
        }
        if self.token.ttl_secs > MAX_TTL_SECS {
            return Err(ConfigError::validation(
                "token.ttl_secs",
                format!("must be at most {}", MAX_TTL_SECS),
            ));
        }
        if self.request_timeout_secs == 0 {
            return Err(ConfigError::validation(
                "request_timeout_secs",
                "must be greater than 0",
            ));
        }
        if !self.dev_mode {
            if self.token.secret.is_empty() {
                return Err(ConfigError::MissingSecret {
                    field: "token.secret",
                    env: "PORTAL_TOKEN__SECRET",
                });
            }
            if self.credentials.trust == TrustMode::Verified && self.credentials.secret.is_empty()
            {
                return Err(ConfigError::MissingSecret {
                    field: "credentials.secret",
                    env: "PORTAL_CREDENTIALS__SECRET",
                });
            }
        }
        Ok(())
    }

    /// Validates the configuration and builds the token service.
    pub fn token_service(&self, clock: Arc<dyn Clock>) -> ConfigResult<TokenService> {
        self.validate()?;

        let secret = resolve_secret("token.secret", &self.token.secret, self.dev_mode);
        let credential_trust = match self.credentials.trust {
            TrustMode::Verified => CredentialTrust::Verified {
                secret: resolve_secret("credentials.secret", &self.credentials.secret, self.dev_mode),
            },
            TrustMode::ClaimsOnly => CredentialTrust::ClaimsOnly,
        };

        Ok(TokenService::builder(secret, credential_trust)
            .ttl_secs(self.token.ttl_secs)
            .clock(clock)
            .build())
    }

    /// Returns the socket address to bind to.
    pub fn socket_addr(&self) -> SocketAddr {
        SocketAddr::new(self.host, self.port)
    }

    /// Returns the request timeout.
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    /// Sets the host address.
    pub fn with_host(mut self, host: IpAddr) -> Self {
        self.host = host;
        self
    }

    /// Sets the port.
    pub fn with_port(mut self, port: u16) -> Self {
        self.port = port;
        self
    }

    /// Sets the session signing secret.
    pub fn with_token_secret(mut self, secret: impl Into<String>) -> Self {
        self.token.secret = secret.into();
        self
    }

    /// Sets the session token lifetime.
    pub fn with_ttl_secs(mut self, ttl_secs: u64) -> Self {
        self.token.ttl_secs = ttl_secs;
        self
    }

    /// Sets the identity provider secret and switches to verified credentials.
    pub fn with_credential_secret(mut self, secret: impl Into<String>) -> Self {
        self.credentials.secret = secret.into();
        self.credentials.trust = TrustMode::Verified;
        self
    }

    /// Sets the credential trust mode.
    pub fn with_trust(mut self, trust: TrustMode) -> Self {
        self.credentials.trust = trust;
        self
    }

    /// Enables or disables development mode.
    pub fn with_dev_mode(mut self, dev_mode: bool) -> Self {
        self.dev_mode = dev_mode;
        self
    }
}

fn resolve_secret(field: &str, configured: &str, dev_mode: bool) -> SigningSecret {
    if configured.is_empty() && dev_mode {
        warn!(
            field,
            "No secret configured; generated an ephemeral one (dev mode). Tokens will not survive a restart"
        );
        return SigningSecret::generate();
    }
    if configured.len() < RECOMMENDED_SECRET_LEN {
        warn!(
            field,
            length = configured.len(),
            "Secret is shorter than recommended ({} bytes)",
            RECOMMENDED_SECRET_LEN
        );
    }
    SigningSecret::from(configured)
}

// =============================================================================
// Sections
// =============================================================================

/// Session token settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TokenConfig {
    /// Signing secret.
    #[serde(skip_serializing)]
    pub secret: String,
    /// Lifetime in seconds.
    pub ttl_secs: u64,
}

impl Default for TokenConfig {
    fn default() -> Self {
        Self {
            secret: String::new(),
            ttl_secs: DEFAULT_TTL_SECS,
        }
    }
}

/// How long-lived credentials are checked.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TrustMode {
    /// Verify the credential signature.
    #[default]
    Verified,
    /// Read claims without verification (development only).
    ClaimsOnly,
}

/// Long-lived credential settings.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct CredentialConfig {
    /// Identity provider secret.
    #[serde(skip_serializing)]
    pub secret: String,
    /// Trust mode.
    pub trust: TrustMode,
}

/// CORS (Cross-Origin Resource Sharing) configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CorsConfig {
    /// Allowed origins. `*` allows any.
    pub allowed_origins: Vec<String>,
    /// Max age for preflight cache (seconds).
    pub max_age: u64,
}

impl Default for CorsConfig {
    fn default() -> Self {
        Self {
            allowed_origins: vec!["*".to_string()],
            max_age: 3600,
        }
    }
}

/// Audit logging configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AuditConfig {
    /// Whether audit events are emitted.
    pub enabled: bool,
    /// Whether successful module access is recorded as well as denials.
    pub log_granted: bool,
}

impl Default for AuditConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            log_granted: false,
        }
    }
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use portal_core::{CredentialIssuer, ManualClock, Role};
    use std::io::Write;
    use tempfile::NamedTempFile;

    const SECRET: &str = "config-test-secret-0123456789abcdef";
    const IDP_SECRET: &str = "config-test-idp-secret-0123456789abcd";

    fn env(pairs: &[(&str, &str)]) -> Option<EnvMap> {
        Some(
            pairs
                .iter()
                .map(|(k, v)| (k.to_string(), v.to_string()))
                .collect(),
        )
    }

    #[test]
    fn test_defaults() {
        let config = ApiConfig::load_with_env(None, env(&[])).unwrap();
        assert_eq!(config.port, 8080);
        assert_eq!(config.socket_addr().to_string(), "0.0.0.0:8080");
        assert_eq!(config.token.ttl_secs, 300);
        assert_eq!(config.credentials.trust, TrustMode::Verified);
        assert!(config.token.secret.is_empty());
    }

    #[test]
    fn test_env_overrides() {
        let config = ApiConfig::load_with_env(
            None,
            env(&[
                ("PORTAL_PORT", "9090"),
                ("PORTAL_TOKEN__SECRET", SECRET),
                ("PORTAL_TOKEN__TTL_SECS", "120"),
                ("PORTAL_CREDENTIALS__TRUST", "claims_only"),
                ("PORTAL_REQUEST_TIMEOUT_SECS", "5"),
            ]),
        )
        .unwrap();

        assert_eq!(config.port, 9090);
        assert_eq!(config.token.secret, SECRET);
        assert_eq!(config.token.ttl_secs, 120);
        assert_eq!(config.credentials.trust, TrustMode::ClaimsOnly);
        assert_eq!(config.request_timeout(), Duration::from_secs(5));
    }

    #[test]
    fn test_legacy_variables() {
        let config = ApiConfig::load_with_env(
            None,
            env(&[(LEGACY_SECRET_VAR, SECRET), (LEGACY_TTL_VAR, "60")]),
        )
        .unwrap();
        assert_eq!(config.token.secret, SECRET);
        assert_eq!(config.token.ttl_secs, 60);

        let config = ApiConfig::load_with_env(
            None,
            env(&[
                ("PORTAL_TOKEN__SECRET", "primary-secret-0123456789abcdef01234"),
                (LEGACY_SECRET_VAR, SECRET),
            ]),
        )
        .unwrap();
        assert_eq!(config.token.secret, "primary-secret-0123456789abcdef01234");
    }

    #[test]
    fn test_load_yaml_file() {
        let mut file = NamedTempFile::with_suffix(".yaml").unwrap();
        file.write_all(
            br#"
port: 7070
token:
  ttl_secs: 90
credentials:
  trust: claims_only
audit:
  log_granted: true
"#,
        )
        .unwrap();

        let config =
            ApiConfig::load_with_env(Some(file.path()), env(&[("PORTAL_PORT", "7071")])).unwrap();
        assert_eq!(config.port, 7071);
        assert_eq!(config.token.ttl_secs, 90);
        assert_eq!(config.credentials.trust, TrustMode::ClaimsOnly);
        assert!(config.audit.enabled);
        assert!(config.audit.log_granted);
    }

    #[test]
    fn test_missing_file() {
        let err = ApiConfig::load_with_env(Some(Path::new("/nonexistent/portal.yaml")), env(&[]))
            .unwrap_err();
        assert!(matches!(err, ConfigError::FileNotFound { .. }));
    }

    #[test]
    fn test_validation() {
        let missing = ApiConfig::new();
        assert!(matches!(
            missing.validate(),
            Err(ConfigError::MissingSecret {
                field: "token.secret",
                ..
            })
        ));

        let no_idp = ApiConfig::new().with_token_secret(SECRET);
        assert!(matches!(
            no_idp.validate(),
            Err(ConfigError::MissingSecret {
                field: "credentials.secret",
                ..
            })
        ));

        let claims_only = ApiConfig::new()
            .with_token_secret(SECRET)
            .with_trust(TrustMode::ClaimsOnly);
        assert!(claims_only.validate().is_ok());

        let zero_ttl = claims_only.clone().with_ttl_secs(0);
        assert!(matches!(
            zero_ttl.validate(),
            Err(ConfigError::Validation {
                field: "token.ttl_secs",
                ..
            })
        ));

        assert!(claims_only.clone().with_ttl_secs(MAX_TTL_SECS).validate().is_ok());
        let huge_ttl = claims_only.clone().with_ttl_secs(i64::MAX as u64);
        assert!(matches!(
            huge_ttl.validate(),
            Err(ConfigError::Validation {
                field: "token.ttl_secs",
                ..
            })
        ));
        assert!(huge_ttl.token_service(Arc::new(ManualClock::new(0))).is_err());

        assert!(ApiConfig::new().with_dev_mode(true).validate().is_ok());
    }

    #[test]
    fn test_token_service_from_config() {
        let clock = Arc::new(ManualClock::new(1_700_000_000));
        let config = ApiConfig::new()
            .with_token_secret(SECRET)
            .with_credential_secret(IDP_SECRET)
            .with_ttl_secs(45);

        let service = config.token_service(clock.clone()).unwrap();
        assert_eq!(service.ttl_secs(), 45);
        assert!(service.credential_trust().is_verified());

        let issuer = CredentialIssuer::with_clock(SigningSecret::from(IDP_SECRET), clock);
        let credential = issuer.issue(Role::User, "alice", None).unwrap();
        let minted = service.exchange(Some(&credential)).unwrap();
        assert_eq!(minted.claims.exp - minted.claims.iat, 45);
    }

    #[test]
    fn test_dev_mode_generates_secrets() {
        let clock = Arc::new(ManualClock::new(0));
        let config = ApiConfig::new().with_dev_mode(true);
        let a = config.token_service(clock.clone()).unwrap();
        let b = config.token_service(clock).unwrap();

        let token = a.mint(Role::Guest, "dev").unwrap().token;
        assert!(a.verify(&token).is_ok());
        assert!(b.verify(&token).is_err());
    }

    #[test]
    fn test_secrets_are_not_serialized() {
        let config = ApiConfig::new()
            .with_token_secret(SECRET)
            .with_credential_secret(IDP_SECRET);
        let json = serde_json::to_string(&config).unwrap();
        assert!(!json.contains(SECRET));
        assert!(!json.contains(IDP_SECRET));
    }
}
