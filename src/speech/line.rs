//! Terminal-backed recognition source.
//!
//! [`LineRecognizer`] stands in for a microphone when the console runs
//! without a speech engine: after the controller starts it, the next line
//! the operator types is treated as the spoken transcript.  A blank line is
//! reported as `"no-speech"`, like a recogniser that heard only silence.

use std::sync::Mutex;

use crate::speech::recognition::{
    EventSink, RecognitionConfig, RecognitionError, RecognitionSource,
};

/// Error code reported for a blank line.
pub const NO_SPEECH: &str = "no-speech";
/// Error code reported when the operator aborts an activation.
pub const ABORTED: &str = "aborted";

/// Recognition source fed one line at a time by the console loop.
#[derive(Debug, Default)]
pub struct LineRecognizer {
    active: Mutex<Option<EventSink>>,
}

impl LineRecognizer {
    pub fn new() -> Self {
        Self::default()
    }

    /// `true` between `start` and the next [`feed_line`](Self::feed_line) /
    /// [`abort`](Self::abort).
    pub fn is_listening(&self) -> bool {
        self.lock().is_some()
    }

    /// Deliver `line` as the transcript of the current activation.
    ///
    /// Returns `false` when no activation is waiting, so the caller can treat
    /// the line as an ordinary command instead.
    pub fn feed_line(&self, line: &str) -> bool {
        let Some(sink) = self.lock().take() else {
            return false;
        };

        let transcript = line.trim();
        if transcript.is_empty() {
            sink.error(NO_SPEECH);
        } else {
            sink.result(transcript);
        }
        sink.ended();
        true
    }

    /// End the current activation without a transcript.
    pub fn abort(&self) {
        if let Some(sink) = self.lock().take() {
            sink.error(ABORTED);
            sink.ended();
        }
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Option<EventSink>> {
        // The guarded value is a plain Option; a poisoned lock still holds a
        // usable one.
        self.active.lock().unwrap_or_else(|e| e.into_inner())
    }
}

impl RecognitionSource for LineRecognizer {
    fn is_available(&self) -> bool {
        true
    }

    fn start(&self, config: &RecognitionConfig, sink: EventSink) -> Result<(), RecognitionError> {
        log::debug!(
            "recognition: line input activation {} ({})",
            sink.activation(),
            config.language
        );

        sink.started();
        if let Some(previous) = self.lock().replace(sink) {
            previous.ended();
        }
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
