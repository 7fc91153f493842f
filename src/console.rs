//! Terminal presentation layer: turns typed lines into commands and state
//! snapshots into text.

use crate::controller::{ListeningState, VoiceSearchState};
use crate::search::VehicleRecord;

pub const HELP: &str = "\
Commands:
  voice | v        start a voice search (type what you would say on the next line)
  cancel | c       stop listening
  help | ?         show this help
  quit | q | exit  leave
Anything else is searched as a registration number.";

/// What the operator asked for.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConsoleCommand {
    Voice,
    Cancel,
    Help,
    Quit,
    /// Manual search text, as typed.
    Search(String),
    /// Blank line.
    Empty,
}

impl ConsoleCommand {
    /// Commands that still act while a voice search waits for its
    /// transcript line.
    pub fn is_control(&self) -> bool {
        matches!(
            self,
            ConsoleCommand::Voice | ConsoleCommand::Cancel | ConsoleCommand::Quit
        )
    }
}

/// Interpret one line typed at the prompt.  Keywords are case-insensitive.
pub fn parse_line(line: &str) -> ConsoleCommand {
    let line = line.trim();
    match line.to_ascii_lowercase().as_str() {
        "" => ConsoleCommand::Empty,
        "voice" | "v" => ConsoleCommand::Voice,
        "cancel" | "c" => ConsoleCommand::Cancel,
        "help" | "?" => ConsoleCommand::Help,
        "quit" | "q" | "exit" => ConsoleCommand::Quit,
        _ => ConsoleCommand::Search(line.to_string()),
    }
}

/// Display lines for a state snapshot.
pub fn render(state: &VoiceSearchState) -> Vec<String> {
    let mut lines = Vec::new();

    if let Some(message) = &state.message {
        let marker = match state.listening {
            ListeningState::Listening => "🎙",
            ListeningState::Idle => "·",
        };
        lines.push(format!("{marker} {message}"));
    }

    if state.searching {
        lines.push("… searching".to_string());
    }
    if let Some(record) = &state.result {
        lines.push(describe(record));
    }
    if let Some(message) = state.error_message() {
        lines.push(format!("✗ {message}"));
    }

    lines
}

fn describe(record: &VehicleRecord) -> String {
    let mut line = format!(
        "✓ {}: {} {} {} | ₹{:.0} | {} km | {}, {} | owner: {}",
        record.reg,
        record.year,
        record.brand,
        record.model,
        record.price,
        record.kms,
        record.fuel,
        record.transmission,
        record.owner,
    );
    if record.is_sold {
        line.push_str(" | SOLD");
    }
    line
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::controller::StatusMessage;
    use crate::search::vehicle::sample_record;
    use crate::search::SearchError;

    #[test]
    fn keywords_are_recognised() {
        assert_eq!(parse_line("voice"), ConsoleCommand::Voice);
        assert_eq!(parse_line(" V "), ConsoleCommand::Voice);
        assert_eq!(parse_line("Cancel"), ConsoleCommand::Cancel);
        assert_eq!(parse_line("?"), ConsoleCommand::Help);
        assert_eq!(parse_line("exit"), ConsoleCommand::Quit);
        assert_eq!(parse_line("   "), ConsoleCommand::Empty);
    }

    #[test]
    fn other_text_is_a_search() {
        assert_eq!(
            parse_line(" mh 12 ab 1234\n"),
            ConsoleCommand::Search("mh 12 ab 1234".into())
        );
    }

    #[test]
    fn restart_cancel_and_quit_bypass_the_transcript() {
        assert!(parse_line("voice").is_control());
        assert!(parse_line("c").is_control());
        assert!(parse_line("quit").is_control());
        assert!(!parse_line("mh 12 ab 1234").is_control());
        assert!(!parse_line("help").is_control());
    }

    #[test]
    fn renders_listening_state() {
        let state = VoiceSearchState {
            listening: ListeningState::Listening,
            message: Some(StatusMessage::Listening),
            ..VoiceSearchState::default()
        };
        let lines = render(&state);
        assert_eq!(lines.len(), 1);
        assert!(lines[0].starts_with("🎙"));
    }

    #[test]
    fn renders_result_and_sold_flag() {
        let mut record = sample_record("MH12AB1234");
        record.is_sold = true;
        let state = VoiceSearchState {
            result: Some(record),
            ..VoiceSearchState::default()
        };

        let lines = render(&state);
        assert_eq!(lines.len(), 1);
        assert!(lines[0].contains("MH12AB1234"));
        assert!(lines[0].contains("Honda City"));
        assert!(lines[0].ends_with("SOLD"));
    }

    #[test]
    fn renders_error() {
        let state = VoiceSearchState {
            error: Some(SearchError::NotFound(Some("Vehicle not found".into()))),
            ..VoiceSearchState::default()
        };
        assert_eq!(render(&state), vec!["✗ Vehicle not found".to_string()]);
    }

    #[test]
    fn default_state_renders_nothing() {
        assert!(render(&VoiceSearchState::default()).is_empty());
    }
}
