//! Formatting helpers for individual script statements.
//!
//! Functions that need a key spelling return an empty string when the key
//! has none; callers treat empty output as "nothing to emit".

use std::time::Duration;

use ahk_keycode::{Direction, Key};

use crate::SendMode;

/// `%expr%` dereference.
pub fn expression(expr: &str) -> String {
    format!("%{expr}%")
}

/// `name := value` assignment.
pub fn set(name: &str, value: &str) -> String {
    format!("{name} := {value}")
}

/// `name(a,b,…)` function call.
pub fn func_call(name: &str, args: &[&str]) -> String {
    format!("{name}({})", args.join(","))
}

/// `Send, <text>`.
pub fn send_text(text: &str) -> String {
    format!("Send, {text}")
}

/// `SendMode <mode>` directive.
pub fn send_mode(mode: SendMode) -> String {
    format!("SendMode {}", mode.name())
}

/// Milliseconds, without a trailing `.0` for whole values.
fn millis(duration: Duration) -> String {
    let ms = duration.as_nanos() as f64 / 1_000_000.0;
    format!("{ms}")
}

/// `Sleep, <ms>`.
pub fn sleep(duration: Duration) -> String {
    format!("Sleep, {}", millis(duration))
}

/// `Send, {<label>[ Down|Up]}` for a single key.
pub fn send(key: Key, direction: Direction) -> String {
    let Some(label) = key.label() else {
        return String::new();
    };
    match direction.token() {
        Some(tok) => format!("Send, {{{label} {tok}}}"),
        None => format!("Send, {{{label}}}"),
    }
}

/// `Send, {a}{b}…` for a batch of keys. Keys without a label are skipped.
pub fn send_many(keys: &[Key]) -> String {
    let body: String = keys
        .iter()
        .filter_map(|k| k.label())
        .map(|l| format!("{{{l}}}"))
        .collect();
    if body.is_empty() {
        return String::new();
    }
    format!("Send, {body}")
}

/// `Click, {[x y ]<button>[ Down|Up]}` for a mouse button.
pub fn click(key: Key, direction: Direction, at: Option<(f32, f32)>) -> String {
    let Some(button) = key.click_label() else {
        return String::new();
    };
    let point = at.map(|(x, y)| format!("{x} {y} ")).unwrap_or_default();
    match direction.token() {
        Some(tok) => format!("Click, {{{point}{button} {tok}}}"),
        None => format!("Click, {{{point}{button}}}"),
    }
}

/// Repeated clicks: `Click`, `Click, 3`, or `Click, , <button>[, n]`.
pub fn click_times(key: Option<Key>, amount: u32) -> String {
    let Some(key) = key else {
        return if amount > 1 {
            format!("Click, {amount}")
        } else {
            "Click".to_string()
        };
    };
    match key.click_label() {
        Some(button) if amount > 1 => format!("Click, , {button}, {amount}"),
        Some(button) => format!("Click, , {button}"),
        None => String::new(),
    }
}

/// `MsgBox, <options>, <title>, <text>[, <timeout>]`.
pub fn msg_box(
    title: &str,
    text: &str,
    options: u32,
    timeout: Option<u32>,
    is_expression: bool,
) -> String {
    let deref = if is_expression { "% " } else { "" };
    let timeout = timeout.map(|t| format!(", {t}")).unwrap_or_default();
    format!("MsgBox, {options}, {title}, {deref}{text}{timeout}")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn send_forms() {
        assert_eq!(send(Key::A, Direction::Down), "Send, {a Down}");
        assert_eq!(send(Key::Num3, Direction::Both), "Send, {3}");
        assert_eq!(send(Key::Windows, Direction::Up), "");
        assert_eq!(send_many(&[Key::A, Key::Windows, Key::B]), "Send, {a}{b}");
        assert_eq!(send_many(&[]), "");
    }

    #[test]
    fn click_forms() {
        assert_eq!(
            click(Key::LeftButton, Direction::Down, None),
            "Click, {Left Down}"
        );
        assert_eq!(
            click(Key::RightButton, Direction::Both, Some((10.0, 20.5))),
            "Click, {10 20.5 Right}"
        );
        assert_eq!(click(Key::A, Direction::Down, None), "");
        assert_eq!(click_times(None, 1), "Click");
        assert_eq!(click_times(None, 2), "Click, 2");
        assert_eq!(click_times(Some(Key::MiddleButton), 3), "Click, , Middle, 3");
        assert_eq!(click_times(Some(Key::Q), 3), "");
    }

    #[test]
    fn sleep_millis() {
        assert_eq!(sleep(Duration::from_millis(500)), "Sleep, 500");
        assert_eq!(sleep(Duration::from_micros(1500)), "Sleep, 1.5");
        assert_eq!(sleep(Duration::from_secs(1)), "Sleep, 1000");
        assert_eq!(sleep(Duration::from_nanos(500)), "Sleep, 0.0005");
    }

    #[test]
    fn statements() {
        assert_eq!(set("v", "1"), "v := 1");
        assert_eq!(func_call("F", &["\"x\"", "2"]), "F(\"x\",2)");
        assert_eq!(send_mode(SendMode::Input), "SendMode Input");
        assert_eq!(expression("v"), "%v%");
        assert_eq!(msg_box("T", "v", 4, Some(3), true), "MsgBox, 4, T, % v, 3");
        assert_eq!(msg_box("T", "hi", 0, None, false), "MsgBox, 0, T, hi");
    }
}
