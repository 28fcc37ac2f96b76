//! Escaping for AutoHotkey string literals.

/// Escape a string for use inside a double-quoted literal.
///
/// Backticks, CR, LF and TAB become backtick escapes and `"` is doubled.
/// Returns `None` for empty or whitespace-only input.
pub fn escape(msg: &str) -> Option<String> {
    if msg.trim().is_empty() {
        return None;
    }
    Some(
        msg.replace('`', "``")
            .replace('\r', "`r")
            .replace('\n', "`n")
            .replace('\t', "`t")
            .replace('"', "\"\""),
    )
}

/// Escape and wrap a string in double quotes.
///
/// An already-quoted string has its outer quotes stripped before escaping,
/// so quoting is idempotent on the outer layer.
pub fn quote(msg: &str) -> Option<String> {
    let inner = match msg.strip_prefix('"').and_then(|m| m.strip_suffix('"')) {
        Some(stripped) if msg.len() >= 2 => stripped,
        _ => msg,
    };
    escape(inner).map(|e| format!("\"{e}\""))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn escapes_specials() {
        assert_eq!(
            escape("a`b\"c\n\td").as_deref(),
            Some("a``b\"\"c`n`td")
        );
        assert_eq!(escape("   "), None);
        assert_eq!(escape(""), None);
    }

    #[test]
    fn quote_wraps_once() {
        assert_eq!(quote("^a UP").as_deref(), Some("\"^a UP\""));
        assert_eq!(quote("\"hi\"").as_deref(), Some("\"hi\""));
        assert_eq!(quote("say \"x\"").as_deref(), Some("\"say \"\"x\"\"\""));
    }
}
