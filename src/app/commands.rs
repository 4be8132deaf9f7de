//! Subcommand implementations
//!
//! Everything here is routine glue around the engine: mapping management
//! for the configuration surface, a status probe, and the long-running
//! `run` loop wiring detections to the mapping store and an optional
//! external player.

use crate::app::cli::config::AppConfig;
use crate::core::error_handling::log_error_with_context;
use crate::core::services::get_notification_service;
use crate::core::shutdown::ShutdownCoordinator;
use crate::mappings::api::MappingStore;
use crate::notifications::api::{Event, EventFilter, SystemEvent, SystemEventType};
use crate::scanner::api::ScannerManager;
use colored::Colorize;
use std::sync::Arc;
use tokio::sync::Mutex;

const RESOLVER_SUBSCRIBER_ID: &str = "playback-resolver";

/// `tagvcr add <TAG> <TARGET>`
pub fn add(config: &AppConfig, tag: &str, target: &str) -> i32 {
    let mut store = MappingStore::load(&config.mappings.file);
    match store.add(tag, target) {
        Ok(()) => {
            println!("Mapped {} -> {}", tag.trim(), target.trim());
            0
        }
        Err(e) => {
            log_error_with_context(&e, "Adding mapping");
            1
        }
    }
}

/// `tagvcr remove <TAG>`
pub fn remove(config: &AppConfig, tag: &str) -> i32 {
    let mut store = MappingStore::load(&config.mappings.file);
    if store.remove(tag) {
        println!("Removed mapping for {}", tag.trim());
        0
    } else {
        println!("No mapping found for {}", tag.trim());
        1
    }
}

/// `tagvcr list`
pub fn list(config: &AppConfig) -> i32 {
    let store = MappingStore::load(&config.mappings.file);
    let mut entries = store.list();
    entries.sort();

    if entries.is_empty() {
        println!("No RFID mappings configured.");
        return 0;
    }

    println!("{}", "Current RFID mappings:".bold());
    for (tag, target) in entries {
        println!("  {tag:<12} -> {target}");
    }
    0
}

/// `tagvcr status`: probe the configured hardware once and report.
pub async fn status(config: &AppConfig) -> i32 {
    let manager = ScannerManager::new(config.rfid.clone());
    manager.initialize().await;

    let status = manager.scanner_status();
    if status.connected {
        println!("Scanner status: {}", "connected".green());
        println!("  {}", status.details);
    } else {
        println!("Scanner status: {}", "not connected".red());
        println!("  Check the reader wiring and configuration, then try again.");
    }

    manager.dispose().await;
    if status.connected {
        0
    } else {
        1
    }
}

/// `tagvcr run`: scan until a shutdown signal, resolving each detected tag
/// through the mapping store.
pub async fn run(config: AppConfig) -> i32 {
    let store = Arc::new(Mutex::new(MappingStore::load(&config.mappings.file)));
    let manager = ScannerManager::new(config.rfid.clone());

    // Subscribe before the scanner can emit anything
    let receiver = {
        let mut notifications = get_notification_service().await;
        notifications.subscribe(
            RESOLVER_SUBSCRIBER_ID.to_string(),
            EventFilter::TagOnly,
            "app::commands::run".to_string(),
        )
    };
    let mut receiver = match receiver {
        Ok(rx) => rx,
        Err(e) => {
            log_error_with_context(&e, "Registering playback resolver");
            return 1;
        }
    };

    let resolver_store = Arc::clone(&store);
    let player_command = config.player.command.clone();
    let resolver = tokio::spawn(async move {
        while let Some(event) = receiver.recv().await {
            let Event::Tag(tag) = event else { continue };

            let target = resolver_store
                .lock()
                .await
                .lookup(&tag.tag_id)
                .map(str::to_string);

            match target {
                Some(target) => {
                    log::info!("Tag {} resolved to {}", tag.tag_id, target);
                    launch_player(player_command.as_deref(), &target);
                }
                None => {
                    log::info!(
                        "No mapping configured for tag {} (add one with 'tagvcr add')",
                        tag.tag_id
                    );
                }
            }
        }
    });

    publish_system_event(SystemEvent::new(SystemEventType::Startup)).await;

    manager.initialize().await;
    manager.start_scanning().await;

    if !manager.is_enabled() {
        log::warn!("Running without RFID detection; mapping management stays available");
    }

    // Block until a shutdown signal arrives
    let _ = ShutdownCoordinator::guard(|mut shutdown_rx| async move {
        let _ = shutdown_rx.recv().await;
        Ok::<(), std::convert::Infallible>(())
    })
    .await;

    log::info!("Shutting down");
    publish_system_event(SystemEvent::with_message(
        SystemEventType::Shutdown,
        "signal received".to_string(),
    ))
    .await;

    manager.stop_scanning();
    manager.dispose().await;

    // Dropping the subscription closes the resolver's channel, letting it
    // drain any queued detections and exit
    get_notification_service()
        .await
        .unsubscribe(RESOLVER_SUBSCRIBER_ID);
    if tokio::time::timeout(std::time::Duration::from_secs(2), resolver)
        .await
        .is_err()
    {
        log::warn!("Playback resolver did not drain in time");
    }

    0
}

async fn publish_system_event(event: SystemEvent) {
    let mut notifications = get_notification_service().await;
    if let Err(e) = notifications.publish(Event::System(event)).await {
        log::debug!("System event delivery incomplete: {e}");
    }
}

/// Spawn the configured player with the target path appended.
///
/// Playback is an external collaborator; a spawn failure is logged and
/// never affects the engine.
fn launch_player(command: Option<&str>, target: &str) {
    let Some(command) = command else {
        log::info!("No player command configured; would play {target}");
        return;
    };

    let mut parts = command.split_whitespace();
    let Some(program) = parts.next() else {
        log::warn!("Player command is blank; skipping playback");
        return;
    };

    match std::process::Command::new(program)
        .args(parts)
        .arg(target)
        .spawn()
    {
        Ok(child) => log::info!("Launched player (pid {})", child.id()),
        Err(e) => log::warn!("Failed to launch player '{command}': {e}"),
    }
}
