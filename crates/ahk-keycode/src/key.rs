use serde::{Deserialize, Serialize};

macro_rules! define_keys {
    ( $( $(#[$meta:meta])* $k:ident, )* ) => {
        /// Logical key identifier.
        ///
        /// Variants cover mouse buttons and wheel, the keyboard, modifiers and
        /// media keys. Engine spellings live in the label tables rather than
        /// in the variant names.
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        pub enum Key {
            $( $(#[$meta])* $k, )*
        }

        impl Key {
            /// Every key, in declaration order.
            pub const ALL: &'static [Self] = &[ $( Self::$k, )* ];

            /// The variant name, e.g. `"LeftButton"`.
            pub fn name(self) -> &'static str {
                match self {
                    $( Self::$k => stringify!($k), )*
                }
            }

            /// Case-insensitive lookup by variant name.
            pub fn from_name(s: &str) -> Option<Self> {
                $(
                    if s.eq_ignore_ascii_case(stringify!($k)) {
                        return Some(Self::$k);
                    }
                )*
                None
            }
        }
    };
}

define_keys! {
    // Mouse
    LeftButton,
    RightButton,
    MiddleButton,
    /// Browser back on most mice.
    XButton1,
    /// Browser forward on most mice.
    XButton2,
    WheelDown,
    WheelUp,
    WheelLeft,
    WheelRight,

    // General
    CapsLock,
    Space,
    Tab,
    Enter,
    Escape,
    Backspace,

    // Cursor control
    ScrollLock,
    Delete,
    Insert,
    Home,
    End,
    PageUp,
    PageDown,
    UpArrow,
    DownArrow,
    LeftArrow,
    RightArrow,

    // Numpad
    Numpad0,
    Numpad1,
    Numpad2,
    Numpad3,
    Numpad4,
    Numpad5,
    Numpad6,
    Numpad7,
    Numpad8,
    Numpad9,
    NumLock,
    NumpadDot,
    NumpadDivide,
    NumpadMultiply,
    NumpadAdd,
    NumpadSubtract,
    NumpadEnter,

    // Function row
    F1,
    F2,
    F3,
    F4,
    F5,
    F6,
    F7,
    F8,
    F9,
    F10,
    F11,
    F12,
    F13,
    F14,
    F15,
    F16,
    F17,
    F18,
    F19,
    F20,
    F21,
    F22,
    F23,
    F24,

    // Modifiers
    /// Either Windows key. Only usable as a hotkey modifier.
    Windows,
    LeftWindows,
    RightWindows,
    Control,
    Alt,
    Shift,
    LeftControl,
    RightControl,
    LeftShift,
    RightShift,
    LeftAlt,
    RightAlt,

    // Media
    BrowserBack,
    BrowserForward,
    BrowserRefresh,
    BrowserStop,
    BrowserSearch,
    BrowserFavorites,
    BrowserHome,
    VolumeMute,
    VolumeDown,
    VolumeUp,
    MediaNext,
    MediaPrev,
    MediaStop,
    MediaPlayPause,
    LaunchMail,
    LaunchMediaSelect,
    LaunchApp1,
    LaunchApp2,

    // Other
    Cancel,
    Clear,
    Pause,
    PrintScreen,
    Help,
    Apps,
    Sleep,

    // Number row
    Num0,
    Num1,
    Num2,
    Num3,
    Num4,
    Num5,
    Num6,
    Num7,
    Num8,
    Num9,

    // Alphabet
    A,
    B,
    C,
    D,
    E,
    F,
    G,
    H,
    I,
    J,
    K,
    L,
    M,
    N,
    O,
    P,
    Q,
    R,
    S,
    T,
    U,
    V,
    W,
    X,
    Y,
    Z,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn name_roundtrip() {
        for &k in Key::ALL {
            assert_eq!(Key::from_name(k.name()), Some(k));
        }
        assert_eq!(Key::from_name("leftbutton"), Some(Key::LeftButton));
        assert_eq!(Key::from_name("nope"), None);
    }

    #[test]
    fn serde_uses_variant_names() {
        let k: Key = ron::from_str("Numpad3").unwrap();
        assert_eq!(k, Key::Numpad3);
    }
}
