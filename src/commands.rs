// Slash-command parsing
//
// Anything the user submits that starts with '/' goes through here instead
// of the chat path. Parsing is pure; the App applies the resulting command
// to session and config state.

use crate::theme::RainColor;

/// Commands recognized at the prompt
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// /help - show the help overlay
    Help,
    /// /q - quit the program
    Quit,
    /// /clear - drop the conversation, keep the system prompt
    Clear,
    /// /save - dump the transcript to a text file
    Save,
    /// /model <name> - switch the completion model
    Model(String),
    /// /system - show session information
    System,
    /// /color <name> - change the rain color
    Color(RainColor),
}

/// Parse a slash-command line. The caller has already checked the leading
/// '/'. Errors are user-facing one-liners.
pub fn parse(input: &str) -> Result<Command, String> {
    let mut parts = input.trim().splitn(2, char::is_whitespace);
    let head = parts.next().unwrap_or_default();
    let rest = parts.next().unwrap_or_default().trim();

    match head {
        "/help" => Ok(Command::Help),
        "/q" => Ok(Command::Quit),
        "/clear" => Ok(Command::Clear),
        "/save" => Ok(Command::Save),
        "/system" => Ok(Command::System),
        "/model" => {
            if rest.is_empty() {
                Err("/model needs a name, e.g. /model gpt-4o".to_string())
            } else {
                Ok(Command::Model(rest.to_string()))
            }
        }
        "/color" => match RainColor::from_name(rest) {
            Some(color) => Ok(Command::Color(color)),
            None if rest.is_empty() => {
                Err(format!("/color needs one of: {}", RainColor::names()))
            }
            None => Err(format!(
                "Unknown color '{}'. Available: {}",
                rest,
                RainColor::names()
            )),
        },
        other => Err(format!("Unknown command {}. Try /help.", other)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_bare_commands() {
        assert_eq!(parse("/help"), Ok(Command::Help));
        assert_eq!(parse("/q"), Ok(Command::Quit));
        assert_eq!(parse("/clear"), Ok(Command::Clear));
        assert_eq!(parse("/save"), Ok(Command::Save));
        assert_eq!(parse("/system"), Ok(Command::System));
    }

    #[test]
    fn parses_model_with_argument() {
        assert_eq!(
            parse("/model gpt-4o"),
            Ok(Command::Model("gpt-4o".to_string()))
        );
        assert!(parse("/model").is_err());
        assert!(parse("/model   ").is_err());
    }

    #[test]
    fn parses_color_names() {
        assert_eq!(parse("/color cyan"), Ok(Command::Color(RainColor::Cyan)));
        assert_eq!(parse("/color Red"), Ok(Command::Color(RainColor::Red)));
    }

    #[test]
    fn color_errors_list_the_palette() {
        let err = parse("/color").unwrap_err();
        assert!(err.contains("green"));
        let err = parse("/color mauve").unwrap_err();
        assert!(err.contains("mauve"));
        assert!(err.contains("magenta"));
    }

    #[test]
    fn unknown_commands_point_at_help() {
        let err = parse("/frobnicate").unwrap_err();
        assert!(err.contains("/frobnicate"));
        assert!(err.contains("/help"));
    }

    #[test]
    fn surrounding_whitespace_is_ignored() {
        assert_eq!(parse("  /q  "), Ok(Command::Quit));
        assert_eq!(
            parse("/model  gpt-4o  "),
            Ok(Command::Model("gpt-4o".to_string()))
        );
    }
}
