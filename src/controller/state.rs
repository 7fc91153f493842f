//! Voice search state machine and the snapshot published to the UI.
//!
//! [`ListeningState`] is the recognition half of the state machine.
//! [`VoiceSearchState`] is the single source of truth for everything the
//! presentation layer shows: listening indicator, status message, current
//! result and current error.  The controller replaces it atomically on every
//! transition, and observers read it through a `tokio::sync::watch` channel.

use std::fmt;

use crate::search::{SearchError, VehicleRecord};

// ---------------------------------------------------------------------------
// ListeningState
// ---------------------------------------------------------------------------

/// Whether a recognition activation is currently capturing speech.
///
/// ```text
/// Idle ──start_voice_search──▶ Listening
///      ◀──result / error / end / cancel──
/// ```
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ListeningState {
    #[default]
    Idle,
    Listening,
}

impl ListeningState {
    pub fn is_listening(self) -> bool {
        self == ListeningState::Listening
    }

    /// A short label for status bars.
    pub fn label(self) -> &'static str {
        match self {
            ListeningState::Idle => "Idle",
            ListeningState::Listening => "Listening",
        }
    }
}

// ---------------------------------------------------------------------------
// StatusMessage
// ---------------------------------------------------------------------------

/// The transient status line shown next to the microphone button.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StatusMessage {
    /// Recognition is running.
    Listening,
    /// A transcript arrived; the search fires after the grace period.
    Heard(String),
    /// A transcript arrived but contained nothing to search for.
    NothingHeard,
    /// Recognition reported an error code such as `"no-speech"`.
    RecognitionFailed(String),
    /// The operator cancelled the voice search.
    Cancelled,
}

impl StatusMessage {
    /// `true` for messages reporting that the attempt went wrong.
    pub fn is_failure(&self) -> bool {
        matches!(
            self,
            StatusMessage::NothingHeard | StatusMessage::RecognitionFailed(_)
        )
    }
}

impl fmt::Display for StatusMessage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StatusMessage::Listening => write!(f, "Listening… say the registration number"),
            StatusMessage::Heard(transcript) => write!(f, "Heard: {transcript}"),
            StatusMessage::NothingHeard => {
                write!(f, "Didn't catch a registration number, please try again")
            }
            StatusMessage::RecognitionFailed(code) => {
                write!(f, "Voice recognition failed ({code}), please try again")
            }
            StatusMessage::Cancelled => write!(f, "Voice search cancelled"),
        }
    }
}

// ---------------------------------------------------------------------------
// VoiceSearchState
// ---------------------------------------------------------------------------

/// Snapshot of the voice search interaction.
///
/// After a search completes exactly one of `result` / `error` is `Some`;
/// while a search is running both are `None` and `searching` is `true`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct VoiceSearchState {
    pub listening: ListeningState,

    /// Status line; `None` until the first voice attempt.
    pub message: Option<StatusMessage>,

    /// Vehicle found by the most recent completed search.
    pub result: Option<VehicleRecord>,

    /// Why the most recent completed search found nothing.
    pub error: Option<SearchError>,

    /// A gateway lookup is in flight.
    pub searching: bool,
}

impl VoiceSearchState {
    /// Text for the result-area error display.
    pub fn error_message(&self) -> Option<String> {
        self.error.as_ref().map(SearchError::user_message)
    }

    /// Start of a search: forget the previous outcome.
    pub(crate) fn begin_search(&mut self) {
        self.result = None;
        self.error = None;
        self.searching = true;
    }

    /// End of a search: record exactly one outcome.
    pub(crate) fn finish_search(&mut self, outcome: Result<VehicleRecord, SearchError>) {
        self.searching = false;
        match outcome {
            Ok(record) => {
                self.result = Some(record);
                self.error = None;
            }
            Err(err) => {
                self.result = None;
                self.error = Some(err);
            }
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::search::vehicle::sample_record;

    #[test]
    fn default_state_is_idle_and_empty() {
        let state = VoiceSearchState::default();
        assert_eq!(state.listening, ListeningState::Idle);
        assert!(state.message.is_none());
        assert!(state.result.is_none());
        assert!(state.error.is_none());
        assert!(!state.searching);
    }

    #[test]
    fn labels() {
        assert_eq!(ListeningState::Idle.label(), "Idle");
        assert_eq!(ListeningState::Listening.label(), "Listening");
        assert!(ListeningState::Listening.is_listening());
        assert!(!ListeningState::Idle.is_listening());
    }

    #[test]
    fn heard_message_shows_transcript() {
        let msg = StatusMessage::Heard("MH 12 AB 1234".into());
        assert_eq!(msg.to_string(), "Heard: MH 12 AB 1234");
        assert!(!msg.is_failure());
    }

    #[test]
    fn recognition_failure_is_a_failure_notice() {
        let msg = StatusMessage::RecognitionFailed("no-speech".into());
        assert!(msg.is_failure());
        assert!(msg.to_string().contains("no-speech"));
        assert!(StatusMessage::NothingHeard.is_failure());
        assert!(!StatusMessage::Cancelled.is_failure());
    }

    #[test]
    fn begin_search_clears_previous_outcome() {
        let mut state = VoiceSearchState {
            result: Some(sample_record("MH12AB1234")),
            error: Some(SearchError::NotFound(None)),
            ..VoiceSearchState::default()
        };

        state.begin_search();

        assert!(state.result.is_none());
        assert!(state.error.is_none());
        assert!(state.searching);
    }

    #[test]
    fn finish_search_sets_exactly_one_outcome() {
        let mut state = VoiceSearchState::default();
        state.begin_search();
        state.finish_search(Ok(sample_record("MH12AB1234")));
        assert!(state.result.is_some() && state.error.is_none() && !state.searching);

        state.begin_search();
        state.finish_search(Err(SearchError::NotFound(Some("Vehicle not found".into()))));
        assert!(state.result.is_none());
        assert_eq!(state.error_message().as_deref(), Some("Vehicle not found"));
        assert!(!state.searching);
    }
}
