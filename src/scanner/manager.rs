//! Scanner Manager
//!
//! Coordinator owning the backend instance and the scan loop lifecycle.
//! The loop runs as one tokio task for the lifetime between
//! `start_scanning` and `stop_scanning`/`dispose`; it is the sole owner of
//! the open hardware handle and the debounce state. Hardware polls happen
//! under `block_in_place` because backend reads block up to the per-attempt
//! timeout.
//!
//! Accepted reads are published as `Event::Tag` through the notification
//! service; see `notifications::manager` for the delivery contract.

use crate::notifications::api::{
    get_notification_service, Event, ScannerEvent, ScannerEventType, TagEvent,
};
use crate::scanner::backend::ScannerBackend;
use crate::scanner::contactless::ContactlessBackend;
use crate::scanner::debounce::DebounceFilter;
use crate::scanner::error::{ScanError, ScanResult};
use crate::scanner::serial::SerialBackend;
use crate::scanner::types::{
    BackendKind, ScannerConfig, ScannerStatus, DEBOUNCE_WINDOW, ERROR_BACKOFF, IDLE_TICK,
    READ_TIMEOUT,
};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Instant;
use tokio::task::JoinHandle;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum ScanState {
    Idle,
    Running,
    Stopping,
}

pub struct ScannerManager {
    config: ScannerConfig,
    state: Mutex<ScanState>,
    /// Open backend between `initialize` and `start_scanning`; the scan
    /// loop takes ownership for its lifetime
    backend: Mutex<Option<Box<dyn ScannerBackend>>>,
    backend_details: Mutex<Option<String>>,
    connected: AtomicBool,
    cancel: Arc<AtomicBool>,
    task: tokio::sync::Mutex<Option<JoinHandle<()>>>,
}

impl ScannerManager {
    pub fn new(config: ScannerConfig) -> Arc<Self> {
        Arc::new(Self {
            config,
            state: Mutex::new(ScanState::Idle),
            backend: Mutex::new(None),
            backend_details: Mutex::new(None),
            connected: AtomicBool::new(false),
            cancel: Arc::new(AtomicBool::new(false)),
            task: tokio::sync::Mutex::new(None),
        })
    }

    /// Resolve the backend from configuration and attempt to open it.
    ///
    /// Never fails the caller: when no interface could be opened the engine
    /// stays disabled for the rest of the run and the host application
    /// continues without tag-triggered playback.
    pub async fn initialize(&self) {
        if !self.config.enabled {
            log::info!("RFID scanning disabled by configuration");
            self.publish_scanner_event(ScannerEvent::with_details(
                ScannerEventType::Disabled,
                "disabled by configuration".to_string(),
            ))
            .await;
            return;
        }

        log::info!("Initializing RFID scanner ({:?})...", self.config.backend);
        let opened = tokio::task::block_in_place(|| self.open_backend());

        match opened {
            Ok(backend) => {
                self.install_backend(backend);
                let details = self.details_snapshot();
                log::info!("RFID scanner connected: {details}");
                self.publish_scanner_event(ScannerEvent::with_details(
                    ScannerEventType::Connected,
                    details,
                ))
                .await;
            }
            Err(e) => {
                log::warn!("No RFID scanner detected, RFID functionality disabled: {e}");
                self.publish_scanner_event(ScannerEvent::with_details(
                    ScannerEventType::Disabled,
                    e.to_string(),
                ))
                .await;
            }
        }
    }

    fn open_backend(&self) -> ScanResult<Box<dyn ScannerBackend>> {
        match self.config.backend {
            BackendKind::Serial => Ok(Box::new(SerialBackend::open(
                &self.config.serial_ports,
                self.config.baud_rate,
            )?)),
            BackendKind::Contactless => Ok(Box::new(ContactlessBackend::open(
                self.config.bus_id,
                self.config.chip_select_line,
                self.config.reset_pin,
            )?)),
        }
    }

    /// Hand the manager an already-open backend.
    ///
    /// Used by `initialize` and by callers wiring an alternative backend
    /// (tests drive the loop with a scripted fake through this).
    pub fn install_backend(&self, backend: Box<dyn ScannerBackend>) {
        let details = backend.description();
        *self.backend_details.lock().unwrap_or_else(|e| e.into_inner()) = Some(details);
        *self.backend.lock().unwrap_or_else(|e| e.into_inner()) = Some(backend);
        self.connected.store(true, Ordering::Release);
    }

    /// Start the scan loop. Idempotent: calling while already running logs
    /// a notice and changes nothing.
    pub async fn start_scanning(self: &Arc<Self>) {
        {
            let state = self.state.lock().unwrap_or_else(|e| e.into_inner());
            if *state == ScanState::Running {
                log::info!("RFID scanning is already running");
                return;
            }
        }

        let backend = self
            .backend
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .take();
        let Some(backend) = backend else {
            log::warn!("RFID scanner is not connected; scanning not started");
            return;
        };

        self.cancel.store(false, Ordering::Release);
        *self.state.lock().unwrap_or_else(|e| e.into_inner()) = ScanState::Running;

        let manager = Arc::clone(self);
        let handle = tokio::spawn(async move {
            manager.scan_loop(backend).await;
        });
        *self.task.lock().await = Some(handle);

        log::info!("RFID scanning started");
    }

    /// Request cancellation of the scan loop and return immediately.
    ///
    /// Cooperative: the loop observes the flag between iterations, bounded
    /// by the per-attempt read timeout.
    pub fn stop_scanning(&self) {
        let mut state = self.state.lock().unwrap_or_else(|e| e.into_inner());
        if *state != ScanState::Running {
            log::debug!("Stop requested but scanning is not running");
            return;
        }
        *state = ScanState::Stopping;
        self.cancel.store(true, Ordering::Release);
        log::info!("RFID scanning stop requested");
    }

    /// Stop scanning and release the backend. Always safe to call more than
    /// once; release failures are logged and never propagated so host
    /// teardown is never blocked.
    pub async fn dispose(&self) {
        self.cancel.store(true, Ordering::Release);

        let handle = self.task.lock().await.take();
        if let Some(handle) = handle {
            match tokio::time::timeout(std::time::Duration::from_secs(3), handle).await {
                Ok(Ok(())) => {}
                Ok(Err(e)) => log::warn!("Scan loop task ended abnormally: {e}"),
                Err(_) => log::warn!("Scan loop did not stop within the grace period"),
            }
        }

        // Backend that was initialized but never started scanning
        let backend = self
            .backend
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .take();
        if let Some(mut backend) = backend {
            tokio::task::block_in_place(|| backend.close());
        }

        self.connected.store(false, Ordering::Release);
        *self.state.lock().unwrap_or_else(|e| e.into_inner()) = ScanState::Idle;
    }

    /// Whether a hardware interface was successfully opened this run
    pub fn is_enabled(&self) -> bool {
        self.connected.load(Ordering::Acquire)
    }

    /// Connection snapshot for the status surface
    pub fn scanner_status(&self) -> ScannerStatus {
        let connected = self.is_enabled();
        let details = if connected {
            self.details_snapshot()
        } else {
            "not connected".to_string()
        };
        ScannerStatus { connected, details }
    }

    fn details_snapshot(&self) -> String {
        self.backend_details
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .clone()
            .unwrap_or_else(|| "not connected".to_string())
    }

    async fn publish_scanner_event(&self, event: ScannerEvent) {
        let mut manager = get_notification_service().await;
        if let Err(e) = manager.publish(Event::Scanner(event)).await {
            log::debug!("Scanner event delivery incomplete: {e}");
        }
    }

    /// The poll-debounce-emit cycle. Sole owner of the backend handle and
    /// the debounce state until cancellation.
    async fn scan_loop(self: Arc<Self>, mut backend: Box<dyn ScannerBackend>) {
        let mut debounce = DebounceFilter::new(DEBOUNCE_WINDOW);

        self.publish_scanner_event(ScannerEvent::new(ScannerEventType::Started))
            .await;

        while !self.cancel.load(Ordering::Acquire) {
            let read = tokio::task::block_in_place(|| backend.read_once(READ_TIMEOUT));

            match read {
                Ok(Some(raw_tag)) => {
                    if debounce.accept(&raw_tag, Instant::now()) {
                        log::info!("RFID tag detected: {raw_tag}");

                        let event = Event::Tag(TagEvent::new(raw_tag));
                        let mut manager = get_notification_service().await;
                        if let Err(e) = manager.publish(event).await {
                            log::warn!("Tag event delivery incomplete: {e}");
                        }
                        drop(manager);

                        let cooldown = backend.cooldown();
                        if !cooldown.is_zero() {
                            tokio::time::sleep(cooldown).await;
                        }
                    }
                }
                Ok(None) => {}
                Err(ScanError::Disabled { message }) => {
                    log::warn!("Scan loop ending, backend disabled: {message}");
                    break;
                }
                Err(e) => {
                    // Per-attempt errors are non-fatal; retried next tick
                    log::warn!("Error reading RFID tag: {e}");
                    tokio::time::sleep(ERROR_BACKOFF).await;
                }
            }

            tokio::time::sleep(IDLE_TICK).await;
        }

        tokio::task::block_in_place(|| backend.close());
        self.connected.store(false, Ordering::Release);
        *self.state.lock().unwrap_or_else(|e| e.into_inner()) = ScanState::Idle;

        self.publish_scanner_event(ScannerEvent::new(ScannerEventType::Stopped))
            .await;
        log::info!("RFID scanning stopped");
    }
}
