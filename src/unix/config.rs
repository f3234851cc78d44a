use crate::{PeerError, Result};
use std::path::PathBuf;

/// Environment variable holding the socket path for [`UnixPeerConfig::from_env`]
pub const SOCKET_PATH_VAR: &str = "STREAMPEER_SOCKET";
/// Environment variable holding the blocking mode for [`UnixPeerConfig::from_env`]
pub const BLOCKING_VAR: &str = "STREAMPEER_BLOCKING";

/// Unix domain stream peer configuration
///
/// # Examples
///
/// ```
/// use streampeer::UnixPeerConfig;
///
/// let config = UnixPeerConfig::default()
///     .with_socket_path("/tmp/app.sock".into())
///     .with_blocking(false);
/// assert!(!config.blocking);
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnixPeerConfig {
    /// Filesystem path of the listening socket to connect to
    pub socket_path: PathBuf,
    /// Whether reads and writes wait for completion
    pub blocking: bool,
}

impl Default for UnixPeerConfig {
    fn default() -> Self {
        Self {
            socket_path: "/tmp/streampeer.sock".into(),
            blocking: true,
        }
    }
}

impl UnixPeerConfig {
    /// Create configuration with specific socket path
    pub fn with_socket_path(mut self, path: PathBuf) -> Self {
        self.socket_path = path;
        self
    }

    /// Create configuration with specific blocking mode
    pub fn with_blocking(mut self, blocking: bool) -> Self {
        self.blocking = blocking;
        self
    }

    /// Build configuration from `STREAMPEER_SOCKET` and `STREAMPEER_BLOCKING`
    ///
    /// Unset variables keep their defaults.
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Build configuration from an arbitrary variable lookup
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();

        if let Some(path) = lookup(SOCKET_PATH_VAR) {
            if path.is_empty() {
                return Err(PeerError::Config(format!("{SOCKET_PATH_VAR} is empty")));
            }
            config.socket_path = path.into();
        }

        if let Some(value) = lookup(BLOCKING_VAR) {
            config.blocking = parse_bool(&value).ok_or_else(|| {
                PeerError::Config(format!("Invalid value for {BLOCKING_VAR}: {value:?}"))
            })?;
        }

        Ok(config)
    }
}

fn parse_bool(value: &str) -> Option<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |name| vars.get(name).cloned()
    }

    #[test]
    fn test_default_config() {
        let config = UnixPeerConfig::default();
        assert_eq!(config.socket_path, PathBuf::from("/tmp/streampeer.sock"));
        assert!(config.blocking);
    }

    #[test]
    fn test_builder() {
        let config = UnixPeerConfig::default()
            .with_socket_path("/run/x.sock".into())
            .with_blocking(false);
        assert_eq!(config.socket_path, PathBuf::from("/run/x.sock"));
        assert!(!config.blocking);
    }

    #[test]
    fn test_from_lookup_empty_uses_defaults() {
        let config = UnixPeerConfig::from_lookup(lookup(&[])).unwrap();
        assert_eq!(config, UnixPeerConfig::default());
    }

    #[test]
    fn test_from_lookup_overrides() {
        let config = UnixPeerConfig::from_lookup(lookup(&[
            (SOCKET_PATH_VAR, "/var/run/peer.sock"),
            (BLOCKING_VAR, "No"),
        ]))
        .unwrap();
        assert_eq!(config.socket_path, PathBuf::from("/var/run/peer.sock"));
        assert!(!config.blocking);
    }

    #[test]
    fn test_from_lookup_rejects_bad_bool() {
        let err = UnixPeerConfig::from_lookup(lookup(&[(BLOCKING_VAR, "maybe")])).unwrap_err();
        assert!(matches!(err, PeerError::Config(_)));
    }

    #[test]
    fn test_from_lookup_rejects_empty_path() {
        let err = UnixPeerConfig::from_lookup(lookup(&[(SOCKET_PATH_VAR, "")])).unwrap_err();
        assert!(matches!(err, PeerError::Config(_)));
    }
}
