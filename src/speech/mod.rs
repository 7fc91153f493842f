//! Speech capabilities used by the voice search controller.
//!
//! # Architecture
//!
//! ```text
//!  RecognitionSource ──start(config, EventSink)──┐
//!        │                                       │
//!        └─ Started / Result / Error / Ended ──▶ EventSink ──▶ controller inbox
//!
//!  controller ──speak(summary)──▶ SpeechAnnouncer   (fire-and-forget)
//! ```
//!
//! Both capabilities are injected as trait objects so the controller can be
//! driven by the terminal ([`LineRecognizer`]), by a real engine, or by test
//! doubles, and so platforms without speech output can pass
//! [`NullAnnouncer`].

pub mod announcer;
pub mod line;
pub mod recognition;

// ── Public re-exports ──────────────────────────────────────────────────────

pub use announcer::{AnnounceError, CommandAnnouncer, NullAnnouncer, SpeechAnnouncer};
pub use line::LineRecognizer;
pub use recognition::{
    ActivationId, EventSink, RecognitionConfig, RecognitionError, RecognitionEvent,
    RecognitionSignal, RecognitionSource,
};

// test-only re-export so the controller tests can import MockRecognizer
// without `use crate::speech::recognition::MockRecognizer`.
#[cfg(test)]
pub use recognition::MockRecognizer;
