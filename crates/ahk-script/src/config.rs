//! Generator configuration.

use serde::{Deserialize, Serialize};

use crate::{Result, SendMode};

/// Options shared by every generation pass.
///
/// Loaded from RON; all fields are optional and fall back to the defaults
/// below.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct GeneratorConfig {
    /// Spaces per nesting level.
    pub indent_width: usize,
    /// Turn engine-level warnings (e.g. too many call arguments) into errors.
    pub strict: bool,
    /// Send mode seeded into hotkeys created by [`crate::Generator::hotkey`].
    pub send_mode: SendMode,
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        Self {
            indent_width: 4,
            strict: true,
            send_mode: SendMode::Input,
        }
    }
}

impl GeneratorConfig {
    /// Parse a RON document such as `(indent_width: 2, strict: false)`.
    pub fn from_ron(s: &str) -> Result<Self> {
        Ok(ron::from_str(s)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_fill_missing_fields() {
        let cfg = GeneratorConfig::from_ron("(indent_width: 2)").unwrap();
        assert_eq!(cfg.indent_width, 2);
        assert!(cfg.strict);
        assert_eq!(cfg.send_mode, SendMode::Input);
    }

    #[test]
    fn unknown_fields_rejected() {
        assert!(GeneratorConfig::from_ron("(indent: 2)").is_err());
    }

    #[test]
    fn send_mode_by_name() {
        let cfg = GeneratorConfig::from_ron("(send_mode: Play, strict: false)").unwrap();
        assert_eq!(cfg.send_mode, SendMode::Play);
        assert!(!cfg.strict);
    }
}
