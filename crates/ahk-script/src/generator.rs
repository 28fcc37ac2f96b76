//! Walks an action sequence and produces script text.

use ahk_keycode::{Direction, Key};
use tracing::trace;

use crate::{
    Action, CallbackRegistry, GeneratorConfig, Hotkey, HotkeyCallback, KeyAction, Release, fmt,
};

/// Keys logically down during one generation pass.
///
/// Iteration follows first-held order, so trailing releases are
/// deterministic.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct HeldKeys {
    /// Held keys in the order they were first marked.
    order: Vec<Key>,
}

impl HeldKeys {
    /// Empty set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Mark `key` held. Re-marking keeps its original position.
    pub fn mark(&mut self, key: Key) {
        if !self.order.contains(&key) {
            self.order.push(key);
        }
    }

    /// Forget `key`.
    pub fn unmark(&mut self, key: Key) {
        self.order.retain(|k| *k != key);
    }

    /// Forget every key.
    pub fn clear(&mut self) {
        self.order.clear();
    }

    /// True if `key` is held.
    pub fn contains(&self, key: Key) -> bool {
        self.order.contains(&key)
    }

    /// Held keys in first-held order.
    pub fn keys(&self) -> &[Key] {
        &self.order
    }

    /// True when nothing is held.
    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    /// Apply a release action.
    pub fn apply_release(&mut self, release: &Release) {
        if release.is_all() {
            self.clear();
        } else {
            for k in release.released() {
                self.unmark(*k);
            }
        }
    }

    /// Apply a key action.
    ///
    /// Batch sends are inert. A timed press emits its own up, so it leaves
    /// the key released. Otherwise auto-release marks the key, then outside
    /// press mode the direction decides: down marks, up unmarks.
    pub fn apply_key(&mut self, action: &KeyAction) {
        let Some(key) = action.key() else {
            return;
        };
        if action.is_timed() {
            self.unmark(key);
            return;
        }
        if action.is_auto_release() {
            self.mark(key);
        }
        if !action.is_press() {
            match action.direction() {
                Direction::Down => self.mark(key),
                Direction::Up => self.unmark(key),
                Direction::Both => {}
            }
        }
    }
}

/// Turns action sequences into script text.
///
/// Holds the generator configuration and the registry hotkey callbacks are
/// registered into while building. Every generator owns a registry; clones
/// share it.
#[derive(Debug, Clone, Default)]
pub struct Generator {
    /// Formatting options.
    config: GeneratorConfig,
    /// Destination for hotkey callbacks.
    registry: CallbackRegistry,
}

impl Generator {
    /// Create a generator with a fresh callback registry.
    pub fn new(config: GeneratorConfig) -> Self {
        Self {
            config,
            registry: CallbackRegistry::new(),
        }
    }

    /// Register hotkey callbacks into the shared `registry` instead of the
    /// generator's own.
    pub fn with_registry(mut self, registry: CallbackRegistry) -> Self {
        self.registry = registry;
        self
    }

    /// Formatting options.
    pub fn config(&self) -> &GeneratorConfig {
        &self.config
    }

    /// The registry hotkey callbacks are registered into.
    pub fn registry(&self) -> &CallbackRegistry {
        &self.registry
    }

    /// Hotkey on `key` using the configured send mode.
    pub fn hotkey(&self, key: Key, modifiers: impl IntoIterator<Item = Key>) -> Hotkey {
        Hotkey::new(key, modifiers).send_mode(self.config.send_mode)
    }

    /// Hotkey on a key pair using the configured send mode.
    pub fn combo(&self, left: Key, right: Key, modifiers: impl IntoIterator<Item = Key>) -> Hotkey {
        Hotkey::combo(left, right, modifiers).send_mode(self.config.send_mode)
    }

    /// Record `callback` under `header`.
    pub(crate) fn register(&self, header: &str, callback: &HotkeyCallback) {
        self.registry.register(header, callback.clone());
    }

    /// Prefix every non-empty line of `text` with `level` indents and
    /// terminate each line with a newline.
    pub(crate) fn push_indented(&self, out: &mut String, text: &str, level: usize) {
        let pad = " ".repeat(self.config.indent_width * level);
        for line in text.lines() {
            if !line.is_empty() {
                out.push_str(&pad);
                out.push_str(line);
            }
            out.push('\n');
        }
    }

    /// Render a single action at nesting level zero.
    pub fn render(&self, action: &Action) -> String {
        match action {
            Action::Raw(code) => code.clone(),
            Action::Key(k) => k.render(),
            Action::Release(r) => r.render(),
            Action::Hotkey(h) => h.build(self),
        }
    }

    /// Generate text for `actions` at nesting `level`.
    ///
    /// Empty fragments are skipped. Every key still held after the last
    /// action gets a trailing `Send, {<key> Up}`, in first-held order.
    pub fn generate(&self, actions: &[Action], level: usize) -> String {
        let mut out = String::new();
        let mut held = HeldKeys::new();

        for action in actions {
            let text = self.render(action);
            if !text.is_empty() {
                self.push_indented(&mut out, &text, level);
            }
            match action {
                Action::Release(r) => held.apply_release(r),
                Action::Key(k) => held.apply_key(k),
                Action::Raw(_) | Action::Hotkey(_) => {}
            }
        }

        for key in held.keys() {
            let release = fmt::send(*key, Direction::Up);
            if !release.is_empty() {
                trace!(?key, "auto_release");
                self.push_indented(&mut out, &release, level);
            }
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::*;

    fn generate(actions: Vec<Action>) -> String {
        Generator::default().generate(&actions, 0)
    }

    #[test]
    fn unmatched_down_is_released() {
        let out = generate(vec![
            KeyAction::down(Key::Alt).into(),
            KeyAction::press(Key::Tab).into(),
        ]);
        assert_eq!(
            out,
            "Send, {Alt Down}\nSend, {Tab}\nSend, {Alt Up}\nSend, {Tab Up}\n"
        );
    }

    #[test]
    fn up_clears_held() {
        let out = generate(vec![
            KeyAction::down(Key::Shift).into(),
            KeyAction::up(Key::Shift).into(),
        ]);
        assert_eq!(out, "Send, {Shift Down}\nSend, {Shift Up}\n");
    }

    #[test]
    fn down_without_auto_release_still_held() {
        let out = generate(vec![KeyAction::down(Key::B).auto_release(false).into()]);
        assert_eq!(out, "Send, {b Down}\nSend, {b Up}\n");
    }

    #[test]
    fn timed_press_not_held() {
        let out = generate(vec![
            KeyAction::down_for(Key::A, Duration::from_millis(40)).into(),
        ]);
        assert_eq!(out, "Send, {a Down}\nSleep, 40\nSend, {a Up}\n");
        assert_eq!(out.lines().count(), 3);
    }

    #[test]
    fn trailing_releases_follow_first_held_order() {
        let out = generate(vec![
            KeyAction::down(Key::C).into(),
            KeyAction::down(Key::A).into(),
            KeyAction::down(Key::C).into(),
            KeyAction::down(Key::B).into(),
        ]);
        let tail: Vec<&str> = out.lines().skip(4).collect();
        assert_eq!(tail, ["Send, {c Up}", "Send, {a Up}", "Send, {b Up}"]);
    }

    #[test]
    fn release_all_with_no_keys() {
        let out = generate(vec![
            KeyAction::down(Key::A).into(),
            KeyAction::down(Key::B).into(),
            Release::all().into(),
        ]);
        assert_eq!(out, "Send, {a Down}\nSend, {b Down}\n");
    }

    #[test]
    fn release_listed_keys_only() {
        let out = generate(vec![
            KeyAction::down(Key::A).into(),
            KeyAction::down(Key::B).into(),
            Release::keys([Key::A]).into(),
        ]);
        assert!(out.ends_with("Send, {b Down}\nSend, {b Up}\n"));
        assert!(!out.contains("{a Up}"));
    }

    #[test]
    fn multi_and_raw_are_inert() {
        let out = generate(vec![
            KeyAction::send([Key::H, Key::I]).into(),
            Action::raw("x := 1"),
        ]);
        assert_eq!(out, "Send, {h}{i}\nx := 1\n");
    }

    #[test]
    fn indentation_applies_to_every_line() {
        let g = Generator::default();
        let out = g.generate(
            &[KeyAction::down_for(Key::A, Duration::from_millis(5)).into()],
            2,
        );
        for line in out.lines() {
            assert!(line.starts_with("        Send") || line.starts_with("        Sleep"));
        }
    }

    #[test]
    fn config_send_mode_seeds_hotkeys() {
        let g = Generator::new(GeneratorConfig {
            send_mode: crate::SendMode::Event,
            indent_width: 2,
            ..GeneratorConfig::default()
        });
        let out = g.hotkey(Key::F5, []).block(true).build(&g);
        assert_eq!(out, "F5::\n{\n  SendMode Event\n  return\n}\n");
    }

    #[test]
    fn held_keys_direct() {
        let mut h = HeldKeys::new();
        h.apply_key(&KeyAction::send([Key::A]));
        assert!(h.is_empty());
        h.apply_key(&KeyAction::press(Key::A));
        assert!(h.contains(Key::A));
        h.apply_key(&KeyAction::up(Key::A));
        assert!(h.is_empty());
    }
}
