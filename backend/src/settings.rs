//! Process configuration loaded via OrthoConfig.
//!
//! Values layer command-line flags over `CADINET_*` environment variables
//! over an optional configuration file. Boolean switches skip the CLI layer. The server converts them into
//! explicit values once at start-up; nothing reads the environment after.

use std::net::{Ipv4Addr, SocketAddr, SocketAddrV4};
use std::path::PathBuf;
use std::str::FromStr;

use ortho_config::OrthoConfig;
use serde::Deserialize;

use crate::domain::AuthSettings;
use crate::inbound::http::state::DEFAULT_MAX_UPLOAD_BYTES;

const DEFAULT_BIND_ADDR: SocketAddr = SocketAddr::V4(SocketAddrV4::new(Ipv4Addr::UNSPECIFIED, 8080));
const DEFAULT_DATA_DIR: &str = "./data";
const DEFAULT_SESSION_KEY_FILE: &str = "/var/run/secrets/session_key";

/// Which verifier strategy new and existing accounts use.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum AuthStrategyKind {
    #[default]
    Password,
    Token,
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown auth strategy {0:?}; expected \"password\" or \"token\"")]
pub struct UnknownAuthStrategy(String);

impl FromStr for AuthStrategyKind {
    type Err = UnknownAuthStrategy;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "password" => Ok(Self::Password),
            "token" => Ok(Self::Token),
            _ => Err(UnknownAuthStrategy(value.to_owned())),
        }
    }
}

/// Configuration values for the HTTP server and its stores.
#[derive(Debug, Clone, Deserialize, OrthoConfig)]
#[ortho_config(prefix = "CADINET")]
pub struct AppSettings {
    /// Socket address to listen on.
    pub bind_addr: Option<SocketAddr>,
    /// Root directory for records and artifacts.
    pub data_dir: Option<PathBuf>,
    /// Accept new registrations.
    ///
    /// Switches are read from the environment or file only: the generated
    /// CLI flag would always report `false` and mask both layers.
    #[ortho_config(default = true, skip_cli)]
    pub registration_enabled: bool,
    /// Refuse credentials over plain HTTP and mark cookies `Secure`.
    #[ortho_config(default = false, skip_cli)]
    pub require_secure_transport: bool,
    /// `password` or `token`.
    pub auth_strategy: Option<String>,
    /// File holding the session signing key material.
    pub session_key_file: Option<PathBuf>,
    /// Fall back to a random session key when the key file is unreadable.
    #[ortho_config(default = false, skip_cli)]
    pub allow_ephemeral_session_key: bool,
    /// Upper bound on request bodies, in bytes.
    pub max_upload_bytes: Option<usize>,
}

impl AppSettings {
    pub fn bind_addr(&self) -> SocketAddr {
        self.bind_addr.unwrap_or(DEFAULT_BIND_ADDR)
    }

    pub fn data_dir(&self) -> PathBuf {
        self.data_dir
            .clone()
            .unwrap_or_else(|| PathBuf::from(DEFAULT_DATA_DIR))
    }

    pub fn session_key_file(&self) -> PathBuf {
        self.session_key_file
            .clone()
            .unwrap_or_else(|| PathBuf::from(DEFAULT_SESSION_KEY_FILE))
    }

    pub fn max_upload_bytes(&self) -> usize {
        self.max_upload_bytes.unwrap_or(DEFAULT_MAX_UPLOAD_BYTES)
    }

    /// The configured strategy; unset means password.
    pub fn auth_strategy(&self) -> Result<AuthStrategyKind, UnknownAuthStrategy> {
        self.auth_strategy
            .as_deref()
            .map_or(Ok(AuthStrategyKind::default()), str::parse)
    }

    pub fn auth_settings(&self) -> AuthSettings {
        AuthSettings {
            registration_enabled: self.registration_enabled,
            require_secure_transport: self.require_secure_transport,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::ffi::OsString;

    use env_lock::lock_env;
    use rstest::rstest;

    const VARS: [&str; 8] = [
        "CADINET_BIND_ADDR",
        "CADINET_DATA_DIR",
        "CADINET_REGISTRATION_ENABLED",
        "CADINET_REQUIRE_SECURE_TRANSPORT",
        "CADINET_AUTH_STRATEGY",
        "CADINET_SESSION_KEY_FILE",
        "CADINET_ALLOW_EPHEMERAL_SESSION_KEY",
        "CADINET_MAX_UPLOAD_BYTES",
    ];

    fn load_from_empty_args() -> AppSettings {
        AppSettings::load_from_iter([OsString::from("cadinet")]).expect("config should load")
    }

    #[rstest]
    fn defaults_apply_when_unset() {
        let _guard = lock_env(VARS.map(|name| (name, None::<String>)));

        let settings = load_from_empty_args();
        assert_eq!(settings.bind_addr().to_string(), "0.0.0.0:8080");
        assert_eq!(settings.data_dir(), PathBuf::from(DEFAULT_DATA_DIR));
        assert_eq!(settings.session_key_file(), PathBuf::from(DEFAULT_SESSION_KEY_FILE));
        assert_eq!(settings.max_upload_bytes(), DEFAULT_MAX_UPLOAD_BYTES);
        assert_eq!(settings.auth_strategy(), Ok(AuthStrategyKind::Password));
        assert_eq!(settings.auth_settings(), AuthSettings::default());
        assert!(!settings.allow_ephemeral_session_key);
    }

    #[rstest]
    fn environment_overrides_are_respected() {
        let _guard = lock_env([
            ("CADINET_BIND_ADDR", Some("127.0.0.1:9000".to_owned())),
            ("CADINET_DATA_DIR", Some("/srv/cadinet".to_owned())),
            ("CADINET_REGISTRATION_ENABLED", Some("false".to_owned())),
            ("CADINET_REQUIRE_SECURE_TRANSPORT", Some("true".to_owned())),
            ("CADINET_AUTH_STRATEGY", Some("token".to_owned())),
            ("CADINET_SESSION_KEY_FILE", None),
            ("CADINET_ALLOW_EPHEMERAL_SESSION_KEY", None),
            ("CADINET_MAX_UPLOAD_BYTES", Some("1024".to_owned())),
        ]);

        let settings = load_from_empty_args();
        assert_eq!(settings.bind_addr().to_string(), "127.0.0.1:9000");
        assert_eq!(settings.data_dir(), PathBuf::from("/srv/cadinet"));
        assert_eq!(settings.max_upload_bytes(), 1024);
        assert_eq!(settings.auth_strategy(), Ok(AuthStrategyKind::Token));
        assert_eq!(
            settings.auth_settings(),
            AuthSettings {
                registration_enabled: false,
                require_secure_transport: true,
            }
        );
    }

    #[rstest]
    #[case(Some("true"), true)]
    #[case(Some("false"), false)]
    #[case(None, false)]
    fn ephemeral_key_switch_follows_environment(
        #[case] value: Option<&str>,
        #[case] expected: bool,
    ) {
        let _guard = lock_env(VARS.map(|name| {
            let value = (name == "CADINET_ALLOW_EPHEMERAL_SESSION_KEY")
                .then(|| value.map(str::to_owned))
                .flatten();
            (name, value)
        }));

        let settings = load_from_empty_args();
        assert_eq!(settings.allow_ephemeral_session_key, expected);
        assert!(settings.auth_settings().registration_enabled);
    }

    #[rstest]
    #[case("password", AuthStrategyKind::Password)]
    #[case(" Token ", AuthStrategyKind::Token)]
    fn strategy_names_parse(#[case] raw: &str, #[case] expected: AuthStrategyKind) {
        assert_eq!(raw.parse(), Ok(expected));
    }

    #[rstest]
    fn unknown_strategy_is_reported() {
        let err = "ldap".parse::<AuthStrategyKind>().expect_err("unknown strategy");
        assert!(err.to_string().contains("ldap"));
    }
}
