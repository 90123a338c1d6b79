use crossterm::style::{Color, Stylize};
use multiverse_catalog::types::CharacterStatus;

/// Whether stdout is a terminal that understands basic ANSI colors.
pub fn stdout_supports_color() -> bool {
    supports_color::on(supports_color::Stream::Stdout).is_some_and(|level| level.has_basic)
}

/// Color associated with a character status.
pub fn status_color(status: CharacterStatus) -> Color {
    match status {
        CharacterStatus::Alive => Color::Green,
        CharacterStatus::Dead => Color::Red,
        CharacterStatus::Unknown => Color::DarkGrey,
    }
}

/// The status as text, colored if `colored` is set.
pub fn paint_status(status: CharacterStatus, colored: bool) -> String {
    if colored {
        status.to_string().with(status_color(status)).to_string()
    } else {
        status.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn uncolored_status_is_plain_text() {
        assert_eq!(paint_status(CharacterStatus::Dead, false), "Dead");
    }

    #[test]
    fn colored_status_keeps_text() {
        let painted = paint_status(CharacterStatus::Alive, true);
        assert!(painted.contains("Alive"));
    }
}
