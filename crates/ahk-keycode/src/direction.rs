use serde::{Deserialize, Serialize};

/// Direction of a key event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum Direction {
    /// Key goes down.
    #[default]
    Down,
    /// Key goes up.
    Up,
    /// A full down/up press.
    Both,
}

impl Direction {
    /// True for the single-edge directions (`Down` and `Up`).
    pub fn is_edge(self) -> bool {
        matches!(self, Self::Down | Self::Up)
    }

    /// Token appended after a key label, e.g. `{a Down}`. `Both` has none.
    pub fn token(self) -> Option<&'static str> {
        match self {
            Self::Down => Some("Down"),
            Self::Up => Some("Up"),
            Self::Both => None,
        }
    }
}
