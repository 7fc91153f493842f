//! Application entry point — vehicle registry voice search console.
//!
//! # Startup sequence
//!
//! 1. Initialise logging.
//! 2. Load [`AppConfig`] from disk (returns default on first run).
//! 3. Create a current-thread [`tokio`] runtime; the controller is a single
//!    event loop and needs nothing more.
//! 4. Build the registry gateway, the announcer and the line recognizer.
//! 5. Spawn the voice search controller and a task printing state changes.
//! 6. Read commands from stdin until `quit` or end of input.

use std::sync::Arc;

use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::sync::watch;
use vehicle_voice_search::{
    config::AppConfig,
    console::{parse_line, render, ConsoleCommand, HELP},
    controller::{VoiceSearchController, VoiceSearchState},
    search::HttpSearchGateway,
    speech::{CommandAnnouncer, LineRecognizer, NullAnnouncer, SpeechAnnouncer},
};

fn main() -> anyhow::Result<()> {
    // 1. Logging
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    log::info!("vehicle voice search starting up");

    // 2. Configuration
    let config = AppConfig::load().unwrap_or_else(|e| {
        log::warn!("Failed to load config ({e}); using defaults");
        AppConfig::default()
    });

    // 3. Runtime
    let rt = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()?;

    rt.block_on(run(config))
}

async fn run(config: AppConfig) -> anyhow::Result<()> {
    // 4. Collaborators
    let recognizer = Arc::new(LineRecognizer::new());
    let gateway = Arc::new(HttpSearchGateway::from_config(&config.gateway));
    let announcer: Arc<dyn SpeechAnnouncer> = if config.announcer.enabled {
        Arc::new(CommandAnnouncer::from_config(&config.announcer).await)
    } else {
        Arc::new(NullAnnouncer)
    };

    log::info!("registry: {}", config.gateway.base_url);

    // 5. Controller + state printer
    let (controller, handle) =
        VoiceSearchController::new(&config.voice, recognizer.clone(), gateway, announcer);
    let controller_task = tokio::spawn(controller.run());
    let printer_task = tokio::spawn(print_changes(handle.subscribe()));

    // 6. Console loop
    println!("{HELP}");
    let mut lines = BufReader::new(tokio::io::stdin()).lines();

    while let Some(line) = lines.next_line().await? {
        let command = parse_line(&line);

        // While listening, the typed line is the "spoken" transcript.
        if !command.is_control() && recognizer.feed_line(&line) {
            continue;
        }

        match command {
            ConsoleCommand::Voice => {
                // Restarting ends the activation still waiting for a line.
                recognizer.abort();
                if let Err(e) = handle.start_voice_search().await {
                    eprintln!("{e}");
                }
            }
            ConsoleCommand::Cancel => {
                handle.cancel().await?;
                recognizer.abort();
            }
            ConsoleCommand::Search(text) => {
                if let Err(e) = handle.search(&text).await {
                    eprintln!("{e}");
                }
            }
            ConsoleCommand::Help => println!("{HELP}"),
            ConsoleCommand::Quit => break,
            ConsoleCommand::Empty => {}
        }
    }

    // Dropping the last handle stops the controller, which ends the printer.
    drop(handle);
    controller_task.await?;
    printer_task.await?;
    log::info!("bye");
    Ok(())
}

/// Print the lines of every new state snapshot that were not on screen in
/// the previous one.
async fn print_changes(mut rx: watch::Receiver<VoiceSearchState>) {
    let mut shown: Vec<String> = Vec::new();
    while rx.changed().await.is_ok() {
        let lines = render(&rx.borrow_and_update());
        for line in lines.iter().filter(|l| !shown.contains(l)) {
            println!("{line}");
        }
        shown = lines;
    }
}
