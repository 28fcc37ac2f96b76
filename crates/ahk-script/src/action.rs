use std::time::Duration;

use ahk_keycode::{Direction, Key};

use crate::{Hotkey, fmt};

/// One step of a generated script.
///
/// The variant set is closed; the generator matches on it exhaustively.
#[derive(Debug, Clone)]
pub enum Action {
    /// Opaque text emitted verbatim.
    Raw(String),
    /// A keyboard or mouse event.
    Key(KeyAction),
    /// Drop keys from the held-key bookkeeping.
    Release(Release),
    /// A nested hotkey definition.
    Hotkey(Box<Hotkey>),
}

impl Action {
    /// Raw script text.
    pub fn raw(code: impl Into<String>) -> Self {
        Self::Raw(code.into())
    }

    /// `Sleep, <ms>`.
    pub fn sleep(duration: Duration) -> Self {
        Self::Raw(fmt::sleep(duration))
    }

    /// Click a mouse button `amount` times. Renders nothing for non-mouse keys.
    pub fn click(key: Key, amount: u32) -> Self {
        if !key.is_mouse() {
            return Self::Raw(String::new());
        }
        Self::Raw(fmt::click_times(Some(key), amount))
    }
}

impl From<KeyAction> for Action {
    fn from(a: KeyAction) -> Self {
        Self::Key(a)
    }
}

impl From<Release> for Action {
    fn from(r: Release) -> Self {
        Self::Release(r)
    }
}

impl From<Hotkey> for Action {
    fn from(h: Hotkey) -> Self {
        Self::Hotkey(Box::new(h))
    }
}

/// What a key action drives.
#[derive(Debug, Clone, PartialEq)]
enum Target {
    /// A single key sent with `Send`.
    Keyboard(Key),
    /// A mouse button driven with `Click`, optionally at a point.
    Mouse { key: Key, at: Option<(f32, f32)> },
    /// A batch of keys sent in one `Send`; never tracked as held.
    Multi(Vec<Key>),
}

/// A timed key press, click, or batch send.
#[derive(Debug, Clone, PartialEq)]
pub struct KeyAction {
    /// Key(s) and device.
    target: Target,
    /// Edge to emit when not in press mode.
    direction: Direction,
    /// Hold time for a timed press; zero means "not timed".
    duration: Duration,
    /// Release at end of sequence if still held.
    auto_release: bool,
    /// Emit a single down/up press.
    press: bool,
}

impl KeyAction {
    /// Constructor shared by the keyboard and mouse variants.
    fn single(
        target: Target,
        direction: Direction,
        duration: Duration,
        auto_release: bool,
        press: bool,
    ) -> Self {
        Self {
            target,
            direction,
            duration,
            auto_release,
            press,
        }
    }

    /// Key down, released automatically at the end of the sequence.
    pub fn down(key: Key) -> Self {
        Self::single(Target::Keyboard(key), Direction::Down, Duration::ZERO, true, false)
    }

    /// Key down held for `duration`, then up.
    pub fn down_for(key: Key, duration: Duration) -> Self {
        Self::single(Target::Keyboard(key), Direction::Down, duration, true, false)
    }

    /// Key up.
    pub fn up(key: Key) -> Self {
        Self::single(Target::Keyboard(key), Direction::Up, Duration::ZERO, false, false)
    }

    /// Single down/up press.
    pub fn press(key: Key) -> Self {
        Self::single(Target::Keyboard(key), Direction::Down, Duration::ZERO, true, true)
    }

    /// Send several keys in one statement.
    pub fn send(keys: impl IntoIterator<Item = Key>) -> Self {
        Self::single(
            Target::Multi(keys.into_iter().collect()),
            Direction::Both,
            Duration::ZERO,
            false,
            false,
        )
    }

    /// Mouse button down.
    pub fn mouse_down(key: Key) -> Self {
        Self::single(Target::Mouse { key, at: None }, Direction::Down, Duration::ZERO, true, false)
    }

    /// Mouse button down held for `duration`, then up.
    pub fn mouse_down_for(key: Key, duration: Duration) -> Self {
        Self::single(Target::Mouse { key, at: None }, Direction::Down, duration, true, false)
    }

    /// Mouse button up.
    pub fn mouse_up(key: Key) -> Self {
        Self::single(Target::Mouse { key, at: None }, Direction::Up, Duration::ZERO, false, false)
    }

    /// Mouse click.
    pub fn mouse_press(key: Key) -> Self {
        Self::single(Target::Mouse { key, at: None }, Direction::Down, Duration::ZERO, true, true)
    }

    /// Set whether a still-held key is released at the end of the sequence.
    pub fn auto_release(mut self, yes: bool) -> Self {
        self.auto_release = yes;
        self
    }

    /// Position a mouse action. No effect on keyboard actions.
    pub fn at(mut self, x: f32, y: f32) -> Self {
        if let Target::Mouse { at, .. } = &mut self.target {
            *at = Some((x, y));
        }
        self
    }

    /// The single key this action drives; `None` for batch sends.
    pub fn key(&self) -> Option<Key> {
        match &self.target {
            Target::Keyboard(k) | Target::Mouse { key: k, .. } => Some(*k),
            Target::Multi(_) => None,
        }
    }

    /// Pointer coordinates, for positioned mouse actions.
    pub fn coordinates(&self) -> Option<(f32, f32)> {
        match &self.target {
            Target::Mouse { at, .. } => *at,
            _ => None,
        }
    }

    /// Edge direction.
    pub fn direction(&self) -> Direction {
        self.direction
    }

    /// Hold time; zero when not timed.
    pub fn duration(&self) -> Duration {
        self.duration
    }

    /// True when the key is released at the end of the sequence if held.
    pub fn is_auto_release(&self) -> bool {
        self.auto_release
    }

    /// True for single down/up presses.
    pub fn is_press(&self) -> bool {
        self.press
    }

    /// True for batch sends.
    pub fn is_multi(&self) -> bool {
        matches!(self.target, Target::Multi(_))
    }

    /// True for a down that resolves its own up after a delay.
    pub fn is_timed(&self) -> bool {
        !self.is_multi() && !self.press && !self.duration.is_zero()
    }

    /// Render to script text. Empty when the key has no spelling for the
    /// device (e.g. a mouse action on a keyboard key). A timed press renders
    /// as three lines: down, sleep, up.
    pub fn render(&self) -> String {
        let edge = |dir: Direction| match &self.target {
            Target::Keyboard(k) => fmt::send(*k, dir),
            Target::Mouse { key, at } => fmt::click(*key, dir, *at),
            Target::Multi(_) => String::new(),
        };
        match &self.target {
            Target::Multi(keys) => fmt::send_many(keys),
            Target::Mouse { key, .. } if !key.is_mouse() => String::new(),
            _ if self.press => edge(Direction::Both),
            _ if !self.duration.is_zero() => {
                let down = edge(Direction::Down);
                if down.is_empty() {
                    return down;
                }
                [down, fmt::sleep(self.duration), edge(Direction::Up)].join("\n")
            }
            _ => edge(self.direction),
        }
    }
}

/// Marks keys as released so the generator does not emit a trailing up.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Release {
    /// Distinct keys, in first-listed order.
    keys: Vec<Key>,
    /// Clear every held key regardless of `keys`.
    all: bool,
}

impl Release {
    /// Release exactly these keys.
    pub fn keys(keys: impl IntoIterator<Item = Key>) -> Self {
        let mut out = Vec::new();
        for k in keys {
            if !out.contains(&k) {
                out.push(k);
            }
        }
        Self { keys: out, all: false }
    }

    /// Release everything held so far.
    pub fn all() -> Self {
        Self {
            keys: Vec::new(),
            all: true,
        }
    }

    /// Set the release-all flag.
    pub fn release_all(mut self, yes: bool) -> Self {
        self.all = yes;
        self
    }

    /// Keys named by this release.
    pub fn released(&self) -> &[Key] {
        &self.keys
    }

    /// True when every held key is released.
    pub fn is_all(&self) -> bool {
        self.all
    }

    /// Releases are bookkeeping only and render to nothing.
    pub fn render(&self) -> String {
        String::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn keyboard_edges() {
        assert_eq!(KeyAction::down(Key::A).render(), "Send, {a Down}");
        assert_eq!(KeyAction::up(Key::A).render(), "Send, {a Up}");
        assert_eq!(KeyAction::press(Key::Tab).render(), "Send, {Tab}");
    }

    #[test]
    fn timed_press_is_three_lines() {
        let a = KeyAction::down_for(Key::Space, Duration::from_millis(250));
        assert!(a.is_timed());
        assert_eq!(
            a.render(),
            "Send, {Space Down}\nSleep, 250\nSend, {Space Up}"
        );
    }

    #[test]
    fn multi_ignores_hold_semantics() {
        let a = KeyAction::send([Key::A, Key::B]);
        assert!(a.is_multi());
        assert!(!a.is_timed());
        assert_eq!(a.key(), None);
        assert_eq!(a.render(), "Send, {a}{b}");
    }

    #[test]
    fn mouse_domain_checked() {
        assert_eq!(KeyAction::mouse_press(Key::A).render(), "");
        assert_eq!(
            KeyAction::mouse_down(Key::LeftButton).at(5.0, 6.0).render(),
            "Click, {5 6 Left Down}"
        );
        assert_eq!(KeyAction::down(Key::Windows).render(), "");
        assert_eq!(KeyAction::down(Key::A).at(1.0, 1.0).coordinates(), None);
    }

    #[test]
    fn click_requires_mouse() {
        assert!(matches!(Action::click(Key::A, 2), Action::Raw(ref s) if s.is_empty()));
        assert!(matches!(Action::click(Key::LeftButton, 2), Action::Raw(ref s) if s == "Click, , Left, 2"));
    }

    #[test]
    fn release_dedups() {
        let r = Release::keys([Key::A, Key::B, Key::A]);
        assert_eq!(r.released(), &[Key::A, Key::B]);
        assert!(!r.is_all());
        assert!(Release::all().is_all());
        assert_eq!(r.render(), "");
    }
}
