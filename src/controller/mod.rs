//! Voice search controller for the vehicle registry.
//!
//! This module wires recognition → normalization → delayed search →
//! announcement and exposes the state the presentation layer renders.
//!
//! # Architecture
//!
//! ```text
//! VoiceSearchHandle ──Command (mpsc)──┐
//! EventSink ──RecognitionSignal──────┼──▶ VoiceSearchController::run()  ← tokio task
//! timer / search tasks ──Internal────┘          │
//!                                               ├─ start_voice_search → recognizer.start
//!                                               ├─ Result(t)  → PendingSearch (800 ms)
//!                                               ├─ SearchDue  → gateway.search (spawned)
//!                                               └─ SearchDone → result | error, announce
//!
//! watch::Receiver<VoiceSearchState> ←── read by the UI on every change
//! ```
//!
//! # Quick start
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use vehicle_voice_search::config::AppConfig;
//! use vehicle_voice_search::controller::VoiceSearchController;
//! use vehicle_voice_search::search::HttpSearchGateway;
//! use vehicle_voice_search::speech::{CommandAnnouncer, LineRecognizer};
//!
//! #[tokio::main(flavor = "current_thread")]
//! async fn main() {
//!     let config = AppConfig::default();
//!     let (controller, handle) = VoiceSearchController::new(
//!         &config.voice,
//!         Arc::new(LineRecognizer::new()),
//!         Arc::new(HttpSearchGateway::from_config(&config.gateway)),
//!         Arc::new(CommandAnnouncer::from_config(&config.announcer).await),
//!     );
//!     tokio::spawn(controller.run());
//!
//!     handle.start_voice_search().await.unwrap();
//! }
//! ```

pub mod runner;
pub mod state;

// ---------------------------------------------------------------------------
// Public re-exports
// ---------------------------------------------------------------------------

pub use runner::{VoiceSearchController, VoiceSearchError, VoiceSearchHandle};
pub use state::{ListeningState, StatusMessage, VoiceSearchState};
