// Rain color palette
//
// The rain is drawn in one of a fixed set of ANSI colors, switchable at
// runtime with /color. Settled response text is always bold white so it
// stays readable against whatever the rain color is.

use ratatui::style::Color;

/// Colors accepted by the /color command
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RainColor {
    #[default]
    Green,
    Red,
    Blue,
    Cyan,
    Magenta,
    Yellow,
    White,
}

impl RainColor {
    pub const ALL: [RainColor; 7] = [
        RainColor::Green,
        RainColor::Red,
        RainColor::Blue,
        RainColor::Cyan,
        RainColor::Magenta,
        RainColor::Yellow,
        RainColor::White,
    ];

    /// Lowercase name as typed in /color and the config file
    pub fn name(self) -> &'static str {
        match self {
            RainColor::Green => "green",
            RainColor::Red => "red",
            RainColor::Blue => "blue",
            RainColor::Cyan => "cyan",
            RainColor::Magenta => "magenta",
            RainColor::Yellow => "yellow",
            RainColor::White => "white",
        }
    }

    /// Parse a color name (case-insensitive)
    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|c| c.name() == name.trim().to_ascii_lowercase())
    }

    /// Comma-separated list of all accepted names, for error messages
    pub fn names() -> String {
        Self::ALL
            .into_iter()
            .map(|c| c.name())
            .collect::<Vec<_>>()
            .join(", ")
    }

    /// Color of the rain body (trail characters)
    pub fn body(self) -> Color {
        match self {
            RainColor::Green => Color::Green,
            RainColor::Red => Color::Red,
            RainColor::Blue => Color::Blue,
            RainColor::Cyan => Color::Cyan,
            RainColor::Magenta => Color::Magenta,
            RainColor::Yellow => Color::Yellow,
            RainColor::White => Color::Gray,
        }
    }

    /// Color of the bright stream head
    pub fn head(self) -> Color {
        match self {
            RainColor::Green => Color::LightGreen,
            RainColor::Red => Color::LightRed,
            RainColor::Blue => Color::LightBlue,
            RainColor::Cyan => Color::LightCyan,
            RainColor::Magenta => Color::LightMagenta,
            RainColor::Yellow => Color::LightYellow,
            RainColor::White => Color::White,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_every_listed_name() {
        for color in RainColor::ALL {
            assert_eq!(RainColor::from_name(color.name()), Some(color));
        }
    }

    #[test]
    fn parsing_is_case_insensitive_and_trims() {
        assert_eq!(RainColor::from_name(" Cyan "), Some(RainColor::Cyan));
        assert_eq!(RainColor::from_name("GREEN"), Some(RainColor::Green));
    }

    #[test]
    fn rejects_unknown_names() {
        assert_eq!(RainColor::from_name("chartreuse"), None);
        assert_eq!(RainColor::from_name(""), None);
    }

    #[test]
    fn names_lists_all_colors() {
        let names = RainColor::names();
        for color in RainColor::ALL {
            assert!(names.contains(color.name()));
        }
    }
}
