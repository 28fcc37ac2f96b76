//! ahk-keycode: logical key identifiers and their AutoHotkey spellings.
//!
//! - `Key`: Enum of every logical key the generator understands (mouse
//!   buttons, keyboard keys, modifiers, media keys).
//! - Label tables: `Key::label` (send/hotkey token), `Key::click_label`
//!   (mouse `Click` token), `Key::modifier_symbol` (hotkey prefix symbol).
//! - `Direction`: Down/Up/Both, with the token appended inside `Send {…}`.
//! - Spec helpers: `Key::from_spec`, `Key::to_spec`.
//!
//! All tables are static; lookups never allocate.

mod key;
pub use key::Key;

mod labels;

mod spec;

mod direction;
pub use direction::Direction;
