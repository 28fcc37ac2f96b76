//! Bridge configuration.

use std::{path::PathBuf, time::Duration};

use serde::{Deserialize, Serialize};

use crate::Result;

/// Options for channel naming, framing and recovery.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct BridgeConfig {
    /// Prefix for generated channel names.
    pub pipe_prefix: String,
    /// Read buffer size in bytes; bounds a single message.
    pub buffer_size: usize,
    /// Script variable holding the client stub instance.
    pub client_var: String,
    /// Delay before re-binding after a transport failure.
    pub rebuild_backoff_ms: u64,
    /// Directory for Unix socket files. Defaults to the per-user runtime dir.
    pub runtime_dir: Option<PathBuf>,
}

impl Default for BridgeConfig {
    fn default() -> Self {
        Self {
            pipe_prefix: "AHK-PIPE-".to_string(),
            buffer_size: 65535,
            client_var: "A__PIPECLIENT".to_string(),
            rebuild_backoff_ms: 50,
            runtime_dir: None,
        }
    }
}

impl BridgeConfig {
    /// Parse a RON document such as `(buffer_size: 4096)`.
    pub fn from_ron(s: &str) -> Result<Self> {
        Ok(ron::from_str(s)?)
    }

    /// Rebuild delay as a `Duration`.
    pub fn rebuild_backoff(&self) -> Duration {
        Duration::from_millis(self.rebuild_backoff_ms)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn partial_ron() {
        let cfg = BridgeConfig::from_ron("(buffer_size: 128, runtime_dir: Some(\"/tmp/x\"))").unwrap();
        assert_eq!(cfg.buffer_size, 128);
        assert_eq!(cfg.pipe_prefix, "AHK-PIPE-");
        assert_eq!(cfg.runtime_dir, Some(PathBuf::from("/tmp/x")));
        assert_eq!(cfg.rebuild_backoff(), Duration::from_millis(50));
    }

    #[test]
    fn rejects_unknown() {
        assert!(BridgeConfig::from_ron("(buffer: 1)").is_err());
    }
}
