use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "kebab-case")]
#[derive(Default)]
pub enum TextAlign {
    #[default]
    Left,
    Right,
    Center,
    Justify,
}

impl TextAlign {
    pub fn from_keyword(s: &str) -> Option<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "left" | "start" => Some(TextAlign::Left),
            "right" | "end" => Some(TextAlign::Right),
            "center" => Some(TextAlign::Center),
            "justify" => Some(TextAlign::Justify),
            _ => None,
        }
    }
}

/// Decoration lines. They propagate to descendants, so the cascade treats
/// them as inherited.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, Default)]
pub struct TextDecoration {
    pub underline: bool,
    pub line_through: bool,
}

impl TextDecoration {
    /// Parses `text-decoration`/`text-decoration-line`. Colors and styles in the
    /// shorthand are ignored.
    pub fn parse(value: &str) -> Self {
        let mut deco = TextDecoration::default();
        for word in value.split_whitespace() {
            match word.to_ascii_lowercase().as_str() {
                "underline" => deco.underline = true,
                "line-through" => deco.line_through = true,
                _ => {}
            }
        }
        deco
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "kebab-case")]
#[derive(Default)]
pub enum TextTransform {
    #[default]
    None,
    Uppercase,
    Lowercase,
    Capitalize,
}

impl TextTransform {
    pub fn from_keyword(s: &str) -> Option<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "none" => Some(Self::None),
            "uppercase" => Some(Self::Uppercase),
            "lowercase" => Some(Self::Lowercase),
            "capitalize" => Some(Self::Capitalize),
            _ => None,
        }
    }

    pub fn apply(&self, text: &str) -> String {
        match self {
            Self::None => text.to_string(),
            Self::Uppercase => text.to_uppercase(),
            Self::Lowercase => text.to_lowercase(),
            Self::Capitalize => {
                let mut out = String::with_capacity(text.len());
                let mut at_word_start = true;
                for c in text.chars() {
                    if at_word_start && c.is_alphabetic() {
                        out.extend(c.to_uppercase());
                    } else {
                        out.push(c);
                    }
                    at_word_start = c.is_whitespace();
                }
                out
            }
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "kebab-case")]
#[derive(Default)]
pub enum WhiteSpace {
    #[default]
    Normal,
    NoWrap,
    Pre,
    PreWrap,
    PreLine,
}

impl WhiteSpace {
    pub fn from_keyword(s: &str) -> Option<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "normal" => Some(Self::Normal),
            "nowrap" => Some(Self::NoWrap),
            "pre" => Some(Self::Pre),
            "pre-wrap" | "break-spaces" => Some(Self::PreWrap),
            "pre-line" => Some(Self::PreLine),
            _ => None,
        }
    }

    pub fn collapses_spaces(&self) -> bool {
        matches!(self, Self::Normal | Self::NoWrap | Self::PreLine)
    }

    pub fn preserves_newlines(&self) -> bool {
        matches!(self, Self::Pre | Self::PreWrap | Self::PreLine)
    }

    pub fn wraps(&self) -> bool {
        !matches!(self, Self::NoWrap | Self::Pre)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decoration_reads_line_keywords() {
        let deco = TextDecoration::parse("underline dotted red");
        assert!(deco.underline);
        assert!(!deco.line_through);
        assert_eq!(TextDecoration::parse("none"), TextDecoration::default());
    }

    #[test]
    fn capitalize_uppercases_word_starts() {
        assert_eq!(TextTransform::Capitalize.apply("quarterly revenue up"), "Quarterly Revenue Up");
        assert_eq!(TextTransform::Uppercase.apply("q3"), "Q3");
    }
}
