use serde::{de, Deserialize, Deserializer, Serialize};

#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq, Hash)]
#[derive(Default)]
pub enum FontWeight {
    Thin,
    Light,
    #[default]
    Regular,
    Medium,
    SemiBold,
    Bold,
    Black,
    Numeric(u16),
}

impl FontWeight {
    /// Returns the numeric weight value (100-900 scale).
    pub fn numeric_value(&self) -> u16 {
        match self {
            FontWeight::Thin => 100,
            FontWeight::Light => 300,
            FontWeight::Regular => 400,
            FontWeight::Medium => 500,
            FontWeight::SemiBold => 600,
            FontWeight::Bold => 700,
            FontWeight::Black => 900,
            FontWeight::Numeric(n) => *n,
        }
    }

    /// Presentation text only knows bold or not; 600 and up counts as bold.
    pub fn is_bold(&self) -> bool {
        self.numeric_value() >= 600
    }

    /// Parses a `font-weight` value. `bolder` and `lighter` resolve against
    /// the parent's weight.
    pub fn parse(s: &str, parent: FontWeight) -> Result<Self, String> {
        match s.trim().to_ascii_lowercase().as_str() {
            "thin" => Ok(FontWeight::Thin),
            "light" => Ok(FontWeight::Light),
            "regular" | "normal" => Ok(FontWeight::Regular),
            "medium" => Ok(FontWeight::Medium),
            "semibold" => Ok(FontWeight::SemiBold),
            "bold" => Ok(FontWeight::Bold),
            "black" => Ok(FontWeight::Black),
            "bolder" => Ok(match parent.numeric_value() {
                0..=349 => FontWeight::Regular,
                350..=549 => FontWeight::Bold,
                _ => FontWeight::Black,
            }),
            "lighter" => Ok(match parent.numeric_value() {
                0..=549 => FontWeight::Thin,
                550..=749 => FontWeight::Regular,
                _ => FontWeight::Bold,
            }),
            other => other
                .parse::<u16>()
                .ok()
                .filter(|n| (1..=1000).contains(n))
                .map(FontWeight::Numeric)
                .ok_or_else(|| format!("Invalid font weight: '{}'", s)),
        }
    }
}

impl<'de> Deserialize<'de> for FontWeight {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum FontWeightDef {
            Str(String),
            Num(u16),
        }

        match FontWeightDef::deserialize(deserializer)? {
            FontWeightDef::Str(s) => Self::parse(&s, FontWeight::Regular).map_err(de::Error::custom),
            FontWeightDef::Num(n) => Ok(FontWeight::Numeric(n)),
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[derive(Default)]
pub enum FontStyle {
    #[default]
    Normal,
    Italic,
    Oblique,
}

impl FontStyle {
    pub fn from_keyword(s: &str) -> Option<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "normal" => Some(FontStyle::Normal),
            "italic" => Some(FontStyle::Italic),
            v if v.starts_with("oblique") => Some(FontStyle::Oblique),
            _ => None,
        }
    }

    pub fn is_italic(&self) -> bool {
        !matches!(self, FontStyle::Normal)
    }
}

/// Splits a `font-family` list into unquoted family names.
pub fn parse_font_family(value: &str) -> Vec<String> {
    value
        .split(',')
        .map(|f| f.trim().trim_matches(|c| c == '"' || c == '\'').trim().to_string())
        .filter(|f| !f.is_empty())
        .collect()
}

/// Generic family keywords that never name a concrete face.
pub fn is_generic_family(name: &str) -> bool {
    matches!(
        name.to_ascii_lowercase().as_str(),
        "serif" | "sans-serif" | "monospace" | "cursive" | "fantasy" | "system-ui"
            | "ui-sans-serif" | "ui-serif" | "ui-monospace" | "-apple-system"
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_keywords_and_numbers() {
        assert_eq!(FontWeight::parse("bold", FontWeight::Regular).unwrap(), FontWeight::Bold);
        assert_eq!(FontWeight::parse("600", FontWeight::Regular).unwrap(), FontWeight::Numeric(600));
        assert!(FontWeight::parse("heavy", FontWeight::Regular).is_err());
        assert!(FontWeight::Numeric(600).is_bold());
        assert!(!FontWeight::Medium.is_bold());
    }

    #[test]
    fn bolder_is_relative_to_parent() {
        assert_eq!(FontWeight::parse("bolder", FontWeight::Regular).unwrap(), FontWeight::Bold);
        assert_eq!(FontWeight::parse("bolder", FontWeight::Bold).unwrap(), FontWeight::Black);
    }

    #[test]
    fn family_list_is_unquoted() {
        assert_eq!(
            parse_font_family("'Open Sans', \"Helvetica Neue\", sans-serif"),
            vec!["Open Sans", "Helvetica Neue", "sans-serif"]
        );
        assert!(is_generic_family("Sans-Serif"));
    }
}
