use crate::Key;

// Central mapping between keys and the token AutoHotkey expects inside
// `Send {…}` and in hotkey headers. Keys missing here (e.g. `Windows`) have
// no sendable spelling.
macro_rules! ahk_label_map {
    ($m:ident, $arg:expr) => {
        $m! { $arg,
            LeftButton => "LButton",
            RightButton => "RButton",
            MiddleButton => "MButton",
            XButton1 => "XButton1",
            XButton2 => "XButton2",
            WheelDown => "WheelDown",
            WheelUp => "WheelUp",
            WheelLeft => "WheelLeft",
            WheelRight => "WheelRight",

            Num0 => "0",
            Num1 => "1",
            Num2 => "2",
            Num3 => "3",
            Num4 => "4",
            Num5 => "5",
            Num6 => "6",
            Num7 => "7",
            Num8 => "8",
            Num9 => "9",

            A => "a",
            B => "b",
            C => "c",
            D => "d",
            E => "e",
            F => "f",
            G => "g",
            H => "h",
            I => "i",
            J => "j",
            K => "k",
            L => "l",
            M => "m",
            N => "n",
            O => "o",
            P => "p",
            Q => "q",
            R => "r",
            S => "s",
            T => "t",
            U => "u",
            V => "v",
            W => "w",
            X => "x",
            Y => "y",
            Z => "z",

            Cancel => "Cancel",
            Backspace => "Back",
            Tab => "Tab",
            Clear => "Clear",
            Enter => "Enter",
            Shift => "Shift",
            Control => "Control",
            Alt => "Alt",
            Pause => "Pause",
            CapsLock => "CapsLock",
            Escape => "Escape",

            Space => "Space",
            PageUp => "PgUp",
            PageDown => "PgDown",
            End => "End",
            Home => "Home",
            LeftArrow => "Left",
            UpArrow => "Up",
            RightArrow => "Right",
            DownArrow => "Down",

            PrintScreen => "PrtSc",
            Insert => "Insert",
            Delete => "Delete",
            Help => "Help",
            LeftWindows => "LWin",
            RightWindows => "RWin",
            Apps => "Apps",
            Sleep => "Sleep",

            Numpad0 => "Numpad0",
            Numpad1 => "Numpad1",
            Numpad2 => "Numpad2",
            Numpad3 => "Numpad3",
            Numpad4 => "Numpad4",
            Numpad5 => "Numpad5",
            Numpad6 => "Numpad6",
            Numpad7 => "Numpad7",
            Numpad8 => "Numpad8",
            Numpad9 => "Numpad9",
            NumpadMultiply => "NumpadMult",
            NumpadAdd => "NumpadAdd",
            NumpadSubtract => "NumpadSub",
            NumpadDot => "NumpadDot",
            NumpadDivide => "NumpadDiv",
            NumpadEnter => "NumpadEnter",

            F1 => "F1",
            F2 => "F2",
            F3 => "F3",
            F4 => "F4",
            F5 => "F5",
            F6 => "F6",
            F7 => "F7",
            F8 => "F8",
            F9 => "F9",
            F10 => "F10",
            F11 => "F11",
            F12 => "F12",
            F13 => "F13",
            F14 => "F14",
            F15 => "F15",
            F16 => "F16",
            F17 => "F17",
            F18 => "F18",
            F19 => "F19",
            F20 => "F20",
            F21 => "F21",
            F22 => "F22",
            F23 => "F23",
            F24 => "F24",

            NumLock => "NumLock",
            ScrollLock => "ScrollLock",

            LeftShift => "LShift",
            RightShift => "RShift",
            LeftControl => "LControl",
            RightControl => "RControl",
            LeftAlt => "LAlt",
            RightAlt => "RAlt",

            BrowserBack => "Browser_Back",
            BrowserForward => "Browser_Forward",
            BrowserRefresh => "Browser_Refresh",
            BrowserStop => "Browser_Stop",
            BrowserSearch => "Browser_Search",
            BrowserFavorites => "Browser_Favorites",
            BrowserHome => "Browser_Home",
            VolumeMute => "Volume_Mute",
            VolumeDown => "Volume_Down",
            VolumeUp => "Volume_Up",
            MediaNext => "Media_Next",
            MediaPrev => "Media_Prev",
            MediaStop => "Media_Stop",
            MediaPlayPause => "Media_Play_Pause",
            LaunchMail => "Launch_Mail",
            LaunchMediaSelect => "Launch_Media_Select",
            LaunchApp1 => "Launch_App1",
            LaunchApp2 => "Launch_App2",
        }
    };
}

macro_rules! to_label_match {
    ( $key:expr, $( $k:ident => $s:expr, )* ) => {
        match $key {
            $( Key::$k => Some($s), )*
            _ => None,
        }
    }
}

macro_rules! from_label_match {
    ( $s:expr, $( $k:ident => $v:expr, )* ) => {{
        $(
            if $s.eq_ignore_ascii_case($v) {
                return Some(Key::$k);
            }
        )*
        None
    }}
}

pub(crate) fn from_label(s: &str) -> Option<Key> {
    ahk_label_map!(from_label_match, s)
}

impl Key {
    /// AutoHotkey token for this key, as used in `Send {…}` and hotkey
    /// headers. `None` when the key has no sendable spelling.
    pub fn label(self) -> Option<&'static str> {
        ahk_label_map!(to_label_match, self)
    }

    /// Button name accepted by the `Click` command. Only mouse buttons have one.
    pub fn click_label(self) -> Option<&'static str> {
        match self {
            Self::LeftButton => Some("Left"),
            Self::RightButton => Some("Right"),
            Self::MiddleButton => Some("Middle"),
            Self::XButton1 => Some("X1"),
            Self::XButton2 => Some("X2"),
            _ => None,
        }
    }

    /// Hotkey prefix symbol (`^`, `+`, `<!`…). `None` for non-modifiers.
    pub fn modifier_symbol(self) -> Option<&'static str> {
        match self {
            Self::Shift => Some("+"),
            Self::Control => Some("^"),
            Self::Alt => Some("!"),
            Self::Windows => Some("#"),
            Self::LeftWindows => Some("<#"),
            Self::RightWindows => Some(">#"),
            Self::LeftShift => Some("<+"),
            Self::RightShift => Some(">+"),
            Self::LeftControl => Some("<^"),
            Self::RightControl => Some(">^"),
            Self::LeftAlt => Some("<!"),
            Self::RightAlt => Some(">!"),
            _ => None,
        }
    }

    /// True for keys that may appear in a hotkey's modifier prefix.
    pub fn is_modifier(self) -> bool {
        self.modifier_symbol().is_some()
    }

    /// True for the clickable mouse buttons.
    pub fn is_mouse(self) -> bool {
        self.click_label().is_some()
    }

    /// True for keys with a sendable spelling that are not mouse buttons.
    pub fn is_keyboard(self) -> bool {
        self.label().is_some() && !self.is_mouse()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn labels() {
        assert_eq!(Key::A.label(), Some("a"));
        assert_eq!(Key::Num3.label(), Some("3"));
        assert_eq!(Key::Backspace.label(), Some("Back"));
        assert_eq!(Key::MediaPlayPause.label(), Some("Media_Play_Pause"));
        assert_eq!(Key::Windows.label(), None);
    }

    #[test]
    fn modifiers_and_mouse() {
        assert_eq!(Key::Control.modifier_symbol(), Some("^"));
        assert_eq!(Key::RightAlt.modifier_symbol(), Some(">!"));
        assert!(Key::Windows.is_modifier());
        assert!(!Key::A.is_modifier());

        assert!(Key::LeftButton.is_mouse());
        assert!(!Key::WheelUp.is_mouse());
        assert!(Key::WheelUp.label().is_some());
        assert!(Key::Space.is_keyboard());
        assert!(!Key::RightButton.is_keyboard());
        assert!(!Key::Windows.is_keyboard());
    }

    #[test]
    fn reverse_lookup() {
        assert_eq!(from_label("PgDown"), Some(Key::PageDown));
        assert_eq!(from_label("numpadmult"), Some(Key::NumpadMultiply));
        assert_eq!(from_label("7"), Some(Key::Num7));
        assert_eq!(from_label("nonsense"), None);
    }
}
