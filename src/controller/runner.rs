//! Voice search controller — drives recognition → normalize → delayed search
//! → announce.
//!
//! [`VoiceSearchController`] owns the [`VoiceSearchState`] and reacts to three
//! inboxes, one message at a time:
//!
//! * commands from [`VoiceSearchHandle`]s (start, manual search, cancel),
//! * recognition events delivered through [`EventSink`]s,
//! * its own timer firings and search completions.
//!
//! # Flow
//!
//! ```text
//! start_voice_search ─▶ recognizer.start(config, sink)        [Listening]
//!   Started          ─▶ Listening
//!   Result(t)        ─▶ key = normalize(t), schedule PendingSearch  [Idle]
//!   Error(code)      ─▶ failure notice, PendingSearch dropped       [Idle]
//!   Ended            ─▶ Idle, activation closed
//!
//! PendingSearch fires ─▶ clear result/error ─▶ gateway.search(key)
//!   Ok(record)  ─▶ result = record, announcer.speak(summary)
//!   Err(e)      ─▶ error = e
//! ```
//!
//! Every async continuation carries the id it was started under (activation
//! id, pending ticket, search ticket).  A continuation whose id is no longer
//! current is dropped, so superseded attempts can never touch the state.

use std::sync::Arc;
use std::time::Duration;

use thiserror::Error;
use tokio::sync::{mpsc, oneshot, watch};
use tokio::task::JoinHandle;

use crate::config::VoiceConfig;
use crate::search::{SearchError, SearchGateway, SearchKey, VehicleRecord};
use crate::speech::{
    ActivationId, EventSink, RecognitionConfig, RecognitionEvent, RecognitionSignal,
    RecognitionSource, SpeechAnnouncer,
};

use super::state::{ListeningState, StatusMessage, VoiceSearchState};

// ---------------------------------------------------------------------------
// VoiceSearchError
// ---------------------------------------------------------------------------

/// Errors returned by [`VoiceSearchHandle`] commands.
///
/// Search failures are not in here: they land in
/// [`VoiceSearchState::error`] as a [`SearchError`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum VoiceSearchError {
    /// No speech recognition on this system.  Nothing changed.
    #[error("Voice search is not supported on this system")]
    CapabilityUnavailable,

    /// The recognition source refused to start.
    #[error("Voice recognition failed: {0}")]
    RecognitionFailure(String),

    /// The manual search text contained nothing but whitespace.
    #[error("Enter a registration number to search")]
    EmptyQuery,

    /// The controller task has stopped.
    #[error("voice search controller is not running")]
    ControllerClosed,
}

// ---------------------------------------------------------------------------
// Messages
// ---------------------------------------------------------------------------

#[derive(Debug)]
enum Command {
    StartVoiceSearch {
        reply: oneshot::Sender<Result<(), VoiceSearchError>>,
    },
    Search {
        key: SearchKey,
    },
    Cancel,
}

#[derive(Debug)]
enum Internal {
    /// The grace period of pending search `ticket` elapsed.
    SearchDue { ticket: u64 },
    /// The gateway answered search `ticket`.
    SearchDone {
        ticket: u64,
        outcome: Result<VehicleRecord, SearchError>,
    },
}

// ---------------------------------------------------------------------------
// PendingSearch / InFlightSearch
// ---------------------------------------------------------------------------

/// "Search for `key` once the grace period is over."  Dropping it cancels
/// the timer.
struct PendingSearch {
    ticket: u64,
    key: SearchKey,
    timer: JoinHandle<()>,
}

impl Drop for PendingSearch {
    fn drop(&mut self) {
        self.timer.abort();
    }
}

/// A gateway lookup that has not answered yet.  Dropping it aborts the task.
struct InFlightSearch {
    ticket: u64,
    task: JoinHandle<()>,
}

impl Drop for InFlightSearch {
    fn drop(&mut self) {
        self.task.abort();
    }
}

// ---------------------------------------------------------------------------
// VoiceSearchHandle
// ---------------------------------------------------------------------------

/// Cheap-to-clone front end of a running [`VoiceSearchController`].
///
/// The controller stops once every handle has been dropped.
#[derive(Clone)]
pub struct VoiceSearchHandle {
    commands: mpsc::Sender<Command>,
    state: watch::Receiver<VoiceSearchState>,
}

impl VoiceSearchHandle {
    /// Begin a voice search attempt.
    ///
    /// Fails with [`VoiceSearchError::CapabilityUnavailable`] (state
    /// untouched) when the platform has no recognizer, and with
    /// [`VoiceSearchError::RecognitionFailure`] when the recognizer refused
    /// to start.
    pub async fn start_voice_search(&self) -> Result<(), VoiceSearchError> {
        let (reply, rx) = oneshot::channel();
        self.send(Command::StartVoiceSearch { reply }).await?;
        rx.await.map_err(|_| VoiceSearchError::ControllerClosed)?
    }

    /// Manual search.  `text` is normalized; blank text is rejected here and
    /// never reaches the controller.  A pending voice-triggered search is
    /// cancelled.
    pub async fn search(&self, text: &str) -> Result<(), VoiceSearchError> {
        let key = SearchKey::parse(text).ok_or(VoiceSearchError::EmptyQuery)?;
        self.send(Command::Search { key }).await
    }

    /// Stop listening and drop any pending voice-triggered search.
    pub async fn cancel(&self) -> Result<(), VoiceSearchError> {
        self.send(Command::Cancel).await
    }

    /// Current snapshot.
    pub fn state(&self) -> VoiceSearchState {
        self.state.borrow().clone()
    }

    /// Receiver that is notified on every state transition.
    pub fn subscribe(&self) -> watch::Receiver<VoiceSearchState> {
        self.state.clone()
    }

    async fn send(&self, command: Command) -> Result<(), VoiceSearchError> {
        self.commands
            .send(command)
            .await
            .map_err(|_| VoiceSearchError::ControllerClosed)
    }
}

// ---------------------------------------------------------------------------
// VoiceSearchController
// ---------------------------------------------------------------------------

/// Drives the voice search interaction.
///
/// Create with [`VoiceSearchController::new`], then spawn
/// [`run`](Self::run) as a tokio task.
///
/// ```rust,no_run
/// use std::sync::Arc;
/// use vehicle_voice_search::config::AppConfig;
/// use vehicle_voice_search::controller::VoiceSearchController;
/// use vehicle_voice_search::search::HttpSearchGateway;
/// use vehicle_voice_search::speech::{LineRecognizer, NullAnnouncer};
///
/// # async fn example() {
/// let config = AppConfig::default();
/// let (controller, handle) = VoiceSearchController::new(
///     &config.voice,
///     Arc::new(LineRecognizer::new()),
///     Arc::new(HttpSearchGateway::from_config(&config.gateway)),
///     Arc::new(NullAnnouncer),
/// );
/// tokio::spawn(controller.run());
///
/// handle.search("mh 12 ab 1234").await.unwrap();
/// # }
/// ```
pub struct VoiceSearchController {
    machine: Machine,
    commands: mpsc::Receiver<Command>,
    recognition_rx: mpsc::UnboundedReceiver<RecognitionSignal>,
    internal_rx: mpsc::UnboundedReceiver<Internal>,
}

impl VoiceSearchController {
    /// Create a controller and the first handle to it.
    ///
    /// # Arguments
    ///
    /// * `config`     — locale for the recognizer and the search grace period.
    /// * `recognizer` — speech input capability.
    /// * `gateway`    — vehicle lookup backend.
    /// * `announcer`  — speech output capability.
    pub fn new(
        config: &VoiceConfig,
        recognizer: Arc<dyn RecognitionSource>,
        gateway: Arc<dyn SearchGateway>,
        announcer: Arc<dyn SpeechAnnouncer>,
    ) -> (Self, VoiceSearchHandle) {
        let (command_tx, commands) = mpsc::channel(16);
        let (recognition_tx, recognition_rx) = mpsc::unbounded_channel();
        let (internal_tx, internal_rx) = mpsc::unbounded_channel();
        let (state_tx, state_rx) = watch::channel(VoiceSearchState::default());

        let machine = Machine {
            recognizer,
            gateway,
            announcer,
            recognition: RecognitionConfig::from(config),
            search_delay: config.search_delay(),
            state: state_tx,
            activation: 0,
            activation_open: false,
            pending: None,
            in_flight: None,
            next_ticket: 0,
            recognition_tx,
            internal_tx,
        };

        let controller = Self {
            machine,
            commands,
            recognition_rx,
            internal_rx,
        };
        let handle = VoiceSearchHandle {
            commands: command_tx,
            state: state_rx,
        };
        (controller, handle)
    }

    /// Run until every [`VoiceSearchHandle`] has been dropped.
    pub async fn run(self) {
        let Self {
            mut machine,
            mut commands,
            mut recognition_rx,
            mut internal_rx,
        } = self;

        loop {
            tokio::select! {
                biased;

                Some(signal) = recognition_rx.recv() => machine.on_recognition(signal),
                Some(internal) = internal_rx.recv() => machine.on_internal(internal),
                command = commands.recv() => match command {
                    Some(command) => machine.on_command(command),
                    None => break,
                },
            }
        }

        log::info!("controller: all handles dropped, shutting down");
    }
}

// ---------------------------------------------------------------------------
// Machine — the state machine proper
// ---------------------------------------------------------------------------

struct Machine {
    recognizer: Arc<dyn RecognitionSource>,
    gateway: Arc<dyn SearchGateway>,
    announcer: Arc<dyn SpeechAnnouncer>,
    recognition: RecognitionConfig,
    search_delay: Duration,

    state: watch::Sender<VoiceSearchState>,

    /// Id of the newest activation; older ones are stale.
    activation: ActivationId,
    /// `false` once the newest activation ended or was cancelled.
    activation_open: bool,

    pending: Option<PendingSearch>,
    in_flight: Option<InFlightSearch>,
    next_ticket: u64,

    recognition_tx: mpsc::UnboundedSender<RecognitionSignal>,
    internal_tx: mpsc::UnboundedSender<Internal>,
}

impl Machine {
    // -----------------------------------------------------------------------
    // Dispatch
    // -----------------------------------------------------------------------

    fn on_command(&mut self, command: Command) {
        match command {
            Command::StartVoiceSearch { reply } => {
                let outcome = self.start_voice_search();
                let _ = reply.send(outcome);
            }
            Command::Search { key } => {
                log::debug!("controller: manual search for {key}");
                self.cancel_pending();
                self.execute_search(key);
            }
            Command::Cancel => self.cancel(),
        }
    }

    fn on_internal(&mut self, internal: Internal) {
        match internal {
            Internal::SearchDue { ticket } => self.on_search_due(ticket),
            Internal::SearchDone { ticket, outcome } => self.on_search_done(ticket, outcome),
        }
    }

    // -----------------------------------------------------------------------
    // Commands
    // -----------------------------------------------------------------------

    fn start_voice_search(&mut self) -> Result<(), VoiceSearchError> {
        if !self.recognizer.is_available() {
            log::warn!("controller: no speech recognition available");
            return Err(VoiceSearchError::CapabilityUnavailable);
        }

        self.cancel_pending();
        self.activation += 1;
        self.activation_open = true;

        let sink = EventSink::new(self.activation, self.recognition_tx.clone());
        log::debug!("controller: starting activation {}", self.activation);

        match self.recognizer.start(&self.recognition, sink) {
            Ok(()) => {
                self.publish(|s| {
                    s.listening = ListeningState::Listening;
                    s.message = Some(StatusMessage::Listening);
                });
                Ok(())
            }
            Err(e) => {
                log::warn!("controller: recognizer failed to start: {e}");
                self.activation_open = false;
                let reason = e.to_string();
                self.publish(|s| {
                    s.listening = ListeningState::Idle;
                    s.message = Some(StatusMessage::RecognitionFailed(reason.clone()));
                });
                Err(VoiceSearchError::RecognitionFailure(reason))
            }
        }
    }

    fn cancel(&mut self) {
        log::debug!("controller: voice search cancelled");
        self.cancel_pending();
        self.activation_open = false;
        self.publish(|s| {
            s.listening = ListeningState::Idle;
            s.message = Some(StatusMessage::Cancelled);
        });
    }

    // -----------------------------------------------------------------------
    // Recognition events
    // -----------------------------------------------------------------------

    fn on_recognition(&mut self, signal: RecognitionSignal) {
        if signal.activation != self.activation || !self.activation_open {
            log::debug!(
                "controller: ignoring {:?} from stale activation {}",
                signal.event,
                signal.activation
            );
            return;
        }

        match signal.event {
            RecognitionEvent::Started => self.publish(|s| {
                s.listening = ListeningState::Listening;
                s.message = Some(StatusMessage::Listening);
            }),

            RecognitionEvent::Result(transcript) => {
                let transcript = transcript.trim().to_string();
                match SearchKey::parse(&transcript) {
                    Some(key) => {
                        log::info!("controller: heard {transcript:?} → {key}");
                        self.publish(|s| {
                            s.listening = ListeningState::Idle;
                            s.message = Some(StatusMessage::Heard(transcript));
                        });
                        self.schedule_search(key);
                    }
                    None => {
                        self.cancel_pending();
                        self.publish(|s| {
                            s.listening = ListeningState::Idle;
                            s.message = Some(StatusMessage::NothingHeard);
                        });
                    }
                }
            }

            RecognitionEvent::Error(code) => {
                log::warn!("controller: recognition error {code:?}");
                // The last event decides: an earlier transcript is dropped.
                self.cancel_pending();
                self.publish(|s| {
                    s.listening = ListeningState::Idle;
                    s.message = Some(StatusMessage::RecognitionFailed(code));
                });
            }

            RecognitionEvent::Ended => {
                self.activation_open = false;
                self.publish(|s| s.listening = ListeningState::Idle);
            }
        }
    }

    // -----------------------------------------------------------------------
    // Pending search
    // -----------------------------------------------------------------------

    fn schedule_search(&mut self, key: SearchKey) {
        let ticket = self.take_ticket();
        let delay = self.search_delay;
        let tx = self.internal_tx.clone();

        let timer = tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            let _ = tx.send(Internal::SearchDue { ticket });
        });

        // Replacing drops (and so aborts) the previous pending search.
        if let Some(previous) = self.pending.replace(PendingSearch { ticket, key, timer }) {
            log::debug!("controller: pending search for {} superseded", previous.key);
        }
    }

    fn cancel_pending(&mut self) {
        if let Some(pending) = self.pending.take() {
            log::debug!("controller: pending search for {} cancelled", pending.key);
        }
    }

    fn on_search_due(&mut self, ticket: u64) {
        match self.pending.take() {
            Some(pending) if pending.ticket == ticket => {
                let key = pending.key.clone();
                self.execute_search(key);
            }
            other => {
                log::debug!("controller: stale search timer {ticket}");
                self.pending = other;
            }
        }
    }

    // -----------------------------------------------------------------------
    // Search execution (voice and manual)
    // -----------------------------------------------------------------------

    fn execute_search(&mut self, key: SearchKey) {
        let ticket = self.take_ticket();
        let gateway = Arc::clone(&self.gateway);
        let tx = self.internal_tx.clone();

        self.publish(|s| s.begin_search());

        let task = tokio::spawn(async move {
            let outcome = gateway.search(&key).await;
            let _ = tx.send(Internal::SearchDone { ticket, outcome });
        });

        // An older lookup still running is aborted and its answer ignored.
        self.in_flight = Some(InFlightSearch { ticket, task });
    }

    fn on_search_done(&mut self, ticket: u64, outcome: Result<VehicleRecord, SearchError>) {
        match self.in_flight.take() {
            Some(search) if search.ticket == ticket => {}
            other => {
                log::debug!("controller: dropping answer of superseded search {ticket}");
                self.in_flight = other;
                return;
            }
        }

        match &outcome {
            Ok(record) => {
                log::info!("controller: found {}", record.reg);
                self.announce(record);
            }
            Err(e) => log::info!("controller: search failed: {e}"),
        }

        self.publish(|s| s.finish_search(outcome));
    }

    fn announce(&self, record: &VehicleRecord) {
        if !self.announcer.is_available() {
            log::debug!("controller: no announcer, skipping spoken summary");
            return;
        }
        if let Err(e) = self.announcer.speak(&record.spoken_summary()) {
            log::warn!("controller: announcement failed: {e}");
        }
    }

    // -----------------------------------------------------------------------
    // Helpers
    // -----------------------------------------------------------------------

    fn take_ticket(&mut self) -> u64 {
        self.next_ticket += 1;
        self.next_ticket
    }

    /// Apply one transition; observers see it as a single update.
    fn publish(&self, update: impl FnOnce(&mut VoiceSearchState)) {
        self.state.send_modify(update);
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
