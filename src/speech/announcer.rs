//! Speech output for found vehicles.
//!
//! Announcements are a convenience: the controller calls
//! [`SpeechAnnouncer::speak`] and moves on.  It never waits for playback and
//! never shows an announcer failure to the user.

use std::process::Stdio;

use thiserror::Error;

use crate::config::AnnouncerConfig;

// ---------------------------------------------------------------------------
// AnnounceError
// ---------------------------------------------------------------------------

#[derive(Debug, Error)]
pub enum AnnounceError {
    /// No speech output on this system.
    #[error("speech output is not available")]
    Unavailable,

    /// The TTS program could not be launched.
    #[error("failed to launch `{program}`: {message}")]
    Spawn { program: String, message: String },
}

// ---------------------------------------------------------------------------
// SpeechAnnouncer trait
// ---------------------------------------------------------------------------

/// Best-effort text-to-speech sink.
pub trait SpeechAnnouncer: Send + Sync {
    fn is_available(&self) -> bool;

    /// Start speaking `text` and return immediately.
    fn speak(&self, text: &str) -> Result<(), AnnounceError>;
}

// ---------------------------------------------------------------------------
// NullAnnouncer
// ---------------------------------------------------------------------------

/// Announcer for systems without speech output, or with announcements
/// switched off.
#[derive(Debug, Default, Clone, Copy)]
pub struct NullAnnouncer;

impl SpeechAnnouncer for NullAnnouncer {
    fn is_available(&self) -> bool {
        false
    }

    fn speak(&self, _text: &str) -> Result<(), AnnounceError> {
        Err(AnnounceError::Unavailable)
    }
}

// ---------------------------------------------------------------------------
// CommandAnnouncer
// ---------------------------------------------------------------------------

/// Speaks through an external TTS program such as `espeak-ng` or `say`.
#[derive(Debug, Clone)]
pub struct CommandAnnouncer {
    program: String,
    args: Vec<String>,
    available: bool,
}

impl CommandAnnouncer {
    /// Build from config, probing once whether `config.program` runs.
    ///
    /// The probe is a child process awaited on the runtime, so it never
    /// stalls other tasks.
    pub async fn from_config(config: &AnnouncerConfig) -> Self {
        let available = probe(&config.program).await;
        if !available {
            log::warn!(
                "announcer: `{}` not found, vehicle summaries will not be spoken",
                config.program
            );
        }

        Self {
            program: config.program.clone(),
            args: config.args.clone(),
            available,
        }
    }

    /// `program args… text`
    fn command(&self, text: &str) -> tokio::process::Command {
        let mut cmd = tokio::process::Command::new(&self.program);
        cmd.args(&self.args)
            .arg(text)
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null());
        cmd
    }
}

/// `true` when `program --version` can be executed.
async fn probe(program: &str) -> bool {
    let status = tokio::process::Command::new(program)
        .arg("--version")
        .stdin(Stdio::null())
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .status()
        .await;

    match status {
        Ok(_) => true,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => false,
        Err(e) => {
            log::debug!("announcer: probing `{program}` failed: {e}");
            false
        }
    }
}

impl SpeechAnnouncer for CommandAnnouncer {
    fn is_available(&self) -> bool {
        self.available
    }

    fn speak(&self, text: &str) -> Result<(), AnnounceError> {
        if !self.available {
            return Err(AnnounceError::Unavailable);
        }

        let spawn_error = |message: String| AnnounceError::Spawn {
            program: self.program.clone(),
            message,
        };

        // Spawning a tokio child and reaping it both need a runtime.
        let runtime = tokio::runtime::Handle::try_current().map_err(|e| spawn_error(e.to_string()))?;
        let mut child = self
            .command(text)
            .spawn()
            .map_err(|e| spawn_error(e.to_string()))?;

        let program = self.program.clone();
        runtime.spawn(async move {
            match child.wait().await {
                Ok(status) if !status.success() => {
                    log::warn!("announcer: `{program}` exited with {status}");
                }
                Ok(_) => {}
                Err(e) => log::warn!("announcer: waiting for `{program}` failed: {e}"),
            }
        });
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
