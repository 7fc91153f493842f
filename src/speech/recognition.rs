//! Recognition capability trait and the per-activation event adapter.
//!
//! # Overview
//!
//! [`RecognitionSource`] is the capability the controller depends on.  It is
//! object-safe and `Send + Sync` so it can be held behind an
//! `Arc<dyn RecognitionSource>`; platforms without speech input plug in a
//! source whose [`is_available`](RecognitionSource::is_available) is `false`.
//!
//! A source never calls back into the controller.  Every activation receives
//! its own [`EventSink`], which stamps each lifecycle event with the
//! activation id and queues it for the controller loop.  Events stamped with
//! an old id are discarded there, so a source that keeps talking after being
//! restarted cannot disturb the new attempt.
//!
//! [`MockRecognizer`] (available under `#[cfg(test)]`) records every `start`
//! call and hands the test the sink, so tests drive the lifecycle by hand.

use thiserror::Error;
use tokio::sync::mpsc;

use crate::config::VoiceConfig;

// ---------------------------------------------------------------------------
// RecognitionError
// ---------------------------------------------------------------------------

/// Errors a recognition source can report when asked to start.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RecognitionError {
    /// The platform has no speech input.
    #[error("speech recognition is not available")]
    Unavailable,

    /// The source exists but refused to start (device busy, permission …).
    #[error("could not start speech recognition: {0}")]
    StartFailed(String),
}

// ---------------------------------------------------------------------------
// RecognitionConfig
// ---------------------------------------------------------------------------

/// Parameters for one recognition activation.
///
/// The controller always asks for a single final transcript:
/// `continuous` and `interim_results` are `false` unless the config file
/// overrides them.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecognitionConfig {
    /// BCP-47 locale, e.g. `"en-IN"`.
    pub language: String,
    pub continuous: bool,
    pub interim_results: bool,
}

impl From<&VoiceConfig> for RecognitionConfig {
    fn from(config: &VoiceConfig) -> Self {
        Self {
            language: config.language.clone(),
            continuous: config.continuous,
            interim_results: config.interim_results,
        }
    }
}

impl Default for RecognitionConfig {
    fn default() -> Self {
        Self::from(&VoiceConfig::default())
    }
}

// ---------------------------------------------------------------------------
// Events
// ---------------------------------------------------------------------------

/// Identifies one `start_voice_search` activation.  Strictly increasing.
pub type ActivationId = u64;

/// Lifecycle events of a single activation, delivered in the order
/// `Started → (Result | Error) → Ended`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RecognitionEvent {
    Started,
    /// Best-guess final transcript.
    Result(String),
    /// Platform error code, e.g. `"no-speech"`, `"not-allowed"`.
    Error(String),
    Ended,
}

/// A [`RecognitionEvent`] stamped with the activation that produced it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecognitionSignal {
    pub activation: ActivationId,
    pub event: RecognitionEvent,
}

// ---------------------------------------------------------------------------
// EventSink
// ---------------------------------------------------------------------------

/// Hands a recognition source's events to the controller.
///
/// Cheap to clone.  Sending never blocks and never fails loudly: once the
/// controller is gone the events are simply dropped.
#[derive(Debug, Clone)]
pub struct EventSink {
    activation: ActivationId,
    tx: mpsc::UnboundedSender<RecognitionSignal>,
}

impl EventSink {
    pub fn new(activation: ActivationId, tx: mpsc::UnboundedSender<RecognitionSignal>) -> Self {
        Self { activation, tx }
    }

    /// The activation this sink belongs to.
    pub fn activation(&self) -> ActivationId {
        self.activation
    }

    pub fn started(&self) {
        self.emit(RecognitionEvent::Started);
    }

    pub fn result(&self, transcript: impl Into<String>) {
        self.emit(RecognitionEvent::Result(transcript.into()));
    }

    pub fn error(&self, code: impl Into<String>) {
        self.emit(RecognitionEvent::Error(code.into()));
    }

    pub fn ended(&self) {
        self.emit(RecognitionEvent::Ended);
    }

    fn emit(&self, event: RecognitionEvent) {
        let signal = RecognitionSignal {
            activation: self.activation,
            event,
        };
        if self.tx.send(signal).is_err() {
            log::debug!(
                "recognition: controller gone, dropping event of activation {}",
                self.activation
            );
        }
    }
}

// ---------------------------------------------------------------------------
// RecognitionSource trait
// ---------------------------------------------------------------------------

/// Object-safe, thread-safe interface for speech recognition capabilities.
///
/// # Contract
///
/// - `start` returns promptly; the transcript arrives later through `sink`.
/// - Calling `start` again abandons the previous activation.  The source may
///   keep emitting on the old sink; the controller ignores it.
pub trait RecognitionSource: Send + Sync {
    /// Whether the capability exists on this platform at all.
    fn is_available(&self) -> bool;

    /// Begin one activation.
    fn start(&self, config: &RecognitionConfig, sink: EventSink) -> Result<(), RecognitionError>;
}

// Compile-time assertion: Box<dyn RecognitionSource> must be constructible.
const _: fn() = || {
    fn _assert_object_safe(_: Box<dyn RecognitionSource>) {}
};

// ---------------------------------------------------------------------------
// MockRecognizer  (test-only)
// ---------------------------------------------------------------------------

/// A test double that records activations and exposes their sinks.
#[cfg(test)]
pub struct MockRecognizer {
    available: bool,
    start_error: Option<RecognitionError>,
    starts: std::sync::Mutex<Vec<(RecognitionConfig, EventSink)>>,
}

#[cfg(test)]
impl MockRecognizer {
    /// An available source that starts successfully.
    pub fn available() -> Self {
        Self {
            available: true,
            start_error: None,
            starts: std::sync::Mutex::new(Vec::new()),
        }
    }

    /// A platform without speech input.
    pub fn unavailable() -> Self {
        Self {
            available: false,
            ..Self::available()
        }
    }

    /// An available source whose `start` always fails with `error`.
    pub fn failing(error: RecognitionError) -> Self {
        Self {
            start_error: Some(error),
            ..Self::available()
        }
    }

    /// Sink of the most recent activation.
    pub fn sink(&self) -> EventSink {
        self.starts
            .lock()
            .unwrap()
            .last()
            .map(|(_, sink)| sink.clone())
            .expect("recognizer was never started")
    }

    /// Config passed to every `start` call, oldest first.
    pub fn configs(&self) -> Vec<RecognitionConfig> {
        self.starts
            .lock()
            .unwrap()
            .iter()
            .map(|(config, _)| config.clone())
            .collect()
    }

    pub fn start_count(&self) -> usize {
        self.starts.lock().unwrap().len()
    }
}

#[cfg(test)]
impl RecognitionSource for MockRecognizer {
    fn is_available(&self) -> bool {
        self.available
    }

    fn start(&self, config: &RecognitionConfig, sink: EventSink) -> Result<(), RecognitionError> {
        if !self.available {
            return Err(RecognitionError::Unavailable);
        }
        if let Some(err) = &self.start_error {
            return Err(err.clone());
        }
        self.starts.lock().unwrap().push((config.clone(), sink));
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
