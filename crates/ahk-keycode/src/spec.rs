use crate::{Key, labels};

// Aliases that only apply to parsing specs (not emitted by to_spec).
macro_rules! key_spec_aliases {
    ($m:ident, $arg:expr) => {
        $m! { $arg,
            Control => "ctrl",
            Alt => "alt",
            Windows => "win",
            LeftControl => "lctrl",
            RightControl => "rctrl",
            Escape => "esc",
            Enter => "return",
            Delete => "del",
            Insert => "ins",
            PrintScreen => "printscreen",
            PageUp => "pageup",
            PageDown => "pagedown",
            LeftButton => "lmb",
            RightButton => "rmb",
            MiddleButton => "mmb",
        }
    };
}

macro_rules! from_spec_match {
    ( $s:expr, $( $k:ident => $v:expr, )* ) => {{
        match $s {
            $( $v => Some(Key::$k), )*
            _ => None,
        }
    }}
}

/// Parses a key specification into a `Key`.
///
/// First tries a case-insensitive enum name (via `Key::from_name`), then the
/// AutoHotkey label (e.g. `PgUp`, `LButton`, `3`), then alias words.
pub fn from_spec(s: &str) -> Option<Key> {
    let s = s.trim();
    if let Some(k) = Key::from_name(s) {
        return Some(k);
    }
    if let some @ Some(_) = labels::from_label(s) {
        return some;
    }
    let lowered = s.to_ascii_lowercase();
    key_spec_aliases!(from_spec_match, lowered.as_str())
}

/// Returns the key specification string for a `Key`.
///
/// Uses the AutoHotkey label when there is one, then falls back to the
/// lowercased variant name.
pub fn to_spec(key: Key) -> String {
    match key.label() {
        Some(l) => l.to_string(),
        None => key.name().to_ascii_lowercase(),
    }
}

impl Key {
    /// Parses a key specification string into a `Key`.
    ///
    /// Accepts variant names and AutoHotkey labels case-insensitively, plus
    /// a handful of alias words (ctrl, alt, win, esc, del, lmb…).
    pub fn from_spec(s: &str) -> Option<Self> {
        from_spec(s)
    }

    /// Returns the key specification string for this `Key`.
    pub fn to_spec(self) -> String {
        to_spec(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_forms() {
        assert_eq!(Key::from_spec("numpad3"), Some(Key::Numpad3));
        assert_eq!(Key::from_spec("PgUp"), Some(Key::PageUp));
        assert_eq!(Key::from_spec("ctrl"), Some(Key::Control));
        assert_eq!(Key::from_spec("  Esc "), Some(Key::Escape));
        assert_eq!(Key::from_spec("5"), Some(Key::Num5));
        assert_eq!(Key::from_spec(""), None);
    }

    #[test]
    fn spec_roundtrip() {
        for &k in Key::ALL {
            assert_eq!(Key::from_spec(&k.to_spec()), Some(k), "{k:?}");
        }
    }
}
