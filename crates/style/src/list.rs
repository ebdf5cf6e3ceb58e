//! Defines enums for CSS List properties.
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "kebab-case")]
#[derive(Default)]
pub enum ListStyleType {
    #[default]
    Disc,
    Circle,
    Square,
    Decimal,
    LowerAlpha,
    UpperAlpha,
    None,
}

impl ListStyleType {
    pub fn from_keyword(s: &str) -> Option<Self> {
        match s.to_ascii_lowercase().as_str() {
            "disc" => Some(Self::Disc),
            "circle" => Some(Self::Circle),
            "square" => Some(Self::Square),
            "decimal" => Some(Self::Decimal),
            "lower-alpha" | "lower-latin" => Some(Self::LowerAlpha),
            "upper-alpha" | "upper-latin" => Some(Self::UpperAlpha),
            "none" => Some(Self::None),
            _ => None,
        }
    }

    /// Marker text for the item at 1-based `ordinal`.
    pub fn marker(&self, ordinal: usize) -> Option<String> {
        let letter = |base: u8| {
            let idx = (ordinal.saturating_sub(1) % 26) as u8;
            (base + idx) as char
        };
        match self {
            Self::Disc => Some("\u{2022}".to_string()),
            Self::Circle => Some("\u{25E6}".to_string()),
            Self::Square => Some("\u{25AA}".to_string()),
            Self::Decimal => Some(format!("{}.", ordinal)),
            Self::LowerAlpha => Some(format!("{}.", letter(b'a'))),
            Self::UpperAlpha => Some(format!("{}.", letter(b'A'))),
            Self::None => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn markers_follow_type() {
        assert_eq!(ListStyleType::Disc.marker(3).as_deref(), Some("\u{2022}"));
        assert_eq!(ListStyleType::Decimal.marker(3).as_deref(), Some("3."));
        assert_eq!(ListStyleType::UpperAlpha.marker(2).as_deref(), Some("B."));
        assert_eq!(ListStyleType::None.marker(1), None);
    }
}
