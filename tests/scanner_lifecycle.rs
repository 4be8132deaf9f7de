//! Engine lifecycle tests driving the scan loop with a scripted backend
//! and observing it through the notification service, the way the host
//! application does.
//!
//! The notification service is a process-wide singleton, so tests that
//! publish through it run serially with unique subscriber ids.

use serial_test::serial;
use std::collections::VecDeque;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tagvcr::notifications::api::{
    get_notification_service, Event, EventFilter, ScannerEventType,
};
use tagvcr::scanner::api::{
    BackendKind, ScanError, ScanResult, ScannerBackend, ScannerConfig, ScannerManager,
};

/// Scripted backend: yields the queued reads in order, then nothing.
struct ScriptedBackend {
    reads: VecDeque<ScanResult<Option<String>>>,
    closed: Arc<AtomicBool>,
}

impl ScriptedBackend {
    fn boxed(reads: Vec<ScanResult<Option<String>>>) -> (Box<dyn ScannerBackend>, Arc<AtomicBool>) {
        let closed = Arc::new(AtomicBool::new(false));
        let backend = Box::new(Self {
            reads: reads.into(),
            closed: closed.clone(),
        });
        (backend, closed)
    }
}

impl ScannerBackend for ScriptedBackend {
    fn read_once(&mut self, _timeout: Duration) -> ScanResult<Option<String>> {
        self.reads.pop_front().unwrap_or(Ok(None))
    }

    fn close(&mut self) {
        self.closed.store(true, Ordering::Release);
    }

    fn description(&self) -> String {
        "scripted backend".to_string()
    }
}

fn offline_config() -> ScannerConfig {
    ScannerConfig {
        backend: BackendKind::Serial,
        serial_ports: vec!["/dev/tagvcr-integration-nope".to_string()],
        ..ScannerConfig::default()
    }
}

/// Allocate a pseudo-terminal and return the master fd (kept open so the
/// slave side stays openable) plus the slave device path. The slave behaves
/// like any tty, so the serial backend opens it for real.
#[cfg(unix)]
fn open_pty() -> (std::os::fd::OwnedFd, String) {
    use std::os::fd::FromRawFd;

    unsafe {
        let master = libc::posix_openpt(libc::O_RDWR | libc::O_NOCTTY);
        assert!(master >= 0, "posix_openpt failed");
        assert_eq!(libc::grantpt(master), 0, "grantpt failed");
        assert_eq!(libc::unlockpt(master), 0, "unlockpt failed");

        let name = libc::ptsname(master);
        assert!(!name.is_null(), "ptsname failed");
        let path = std::ffi::CStr::from_ptr(name)
            .to_string_lossy()
            .into_owned();

        (std::os::fd::OwnedFd::from_raw_fd(master), path)
    }
}

async fn recv_with_timeout(
    rx: &mut tagvcr::notifications::api::EventReceiver,
) -> Option<Event> {
    tokio::time::timeout(Duration::from_secs(2), rx.recv())
        .await
        .ok()
        .flatten()
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
#[serial]
async fn test_detections_flow_from_backend_to_subscriber() {
    let mut rx = get_notification_service()
        .await
        .subscribe(
            "it-detections".to_string(),
            EventFilter::TagOnly,
            "integration-test".to_string(),
        )
        .unwrap();

    let manager = ScannerManager::new(offline_config());
    let (backend, _closed) = ScriptedBackend::boxed(vec![
        Ok(Some("04A1B2C3".to_string())),
        // Same tag again inside the debounce window: suppressed
        Ok(Some("04A1B2C3".to_string())),
        // A different tag goes through immediately
        Ok(Some("09F8E7D6".to_string())),
    ]);
    manager.install_backend(backend);
    manager.start_scanning().await;

    let first = recv_with_timeout(&mut rx).await.expect("first detection");
    match first {
        Event::Tag(tag) => assert_eq!(tag.tag_id, "04A1B2C3"),
        other => panic!("unexpected event: {:?}", other),
    }

    let second = recv_with_timeout(&mut rx).await.expect("second detection");
    match second {
        Event::Tag(tag) => assert_eq!(tag.tag_id, "09F8E7D6"),
        other => panic!("unexpected event: {:?}", other),
    }

    manager.stop_scanning();
    manager.dispose().await;

    // The duplicate read never produced an event
    assert!(rx.try_recv().is_err());

    get_notification_service().await.unsubscribe("it-detections");
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
#[serial]
async fn test_lifecycle_events_bracket_the_scan_loop() {
    let mut rx = get_notification_service()
        .await
        .subscribe(
            "it-lifecycle".to_string(),
            EventFilter::ScannerOnly,
            "integration-test".to_string(),
        )
        .unwrap();

    let manager = ScannerManager::new(offline_config());
    let (backend, closed) = ScriptedBackend::boxed(vec![]);
    manager.install_backend(backend);

    manager.start_scanning().await;
    let started = recv_with_timeout(&mut rx).await.expect("started event");
    match started {
        Event::Scanner(e) => assert_eq!(e.event_type, ScannerEventType::Started),
        other => panic!("unexpected event: {:?}", other),
    }

    manager.stop_scanning();
    manager.dispose().await;

    let stopped = recv_with_timeout(&mut rx).await.expect("stopped event");
    match stopped {
        Event::Scanner(e) => assert_eq!(e.event_type, ScannerEventType::Stopped),
        other => panic!("unexpected event: {:?}", other),
    }

    assert!(closed.load(Ordering::Acquire), "backend must be released");
    get_notification_service().await.unsubscribe("it-lifecycle");
}

#[cfg(unix)]
#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
#[serial]
async fn test_later_candidate_activates_the_engine() {
    // Two missing paths, then a live pty: the walk must skip the absent
    // devices and activate on the third candidate.
    let (_master, slave_path) = open_pty();
    let config = ScannerConfig {
        backend: BackendKind::Serial,
        serial_ports: vec![
            "/dev/tagvcr-integration-nope0".to_string(),
            "/dev/tagvcr-integration-nope1".to_string(),
            slave_path.clone(),
        ],
        ..ScannerConfig::default()
    };

    let manager = ScannerManager::new(config);
    manager.initialize().await;

    assert!(manager.is_enabled(), "engine must activate on the pty");
    let status = manager.scanner_status();
    assert!(status.connected);
    assert!(
        status.details.contains(&slave_path),
        "status must name the winning candidate, got: {}",
        status.details
    );

    manager.dispose().await;
    assert!(!manager.is_enabled());
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
#[serial]
async fn test_backend_failure_emits_disabled_event() {
    let mut rx = get_notification_service()
        .await
        .subscribe(
            "it-disabled".to_string(),
            EventFilter::ScannerOnly,
            "integration-test".to_string(),
        )
        .unwrap();

    // No hardware behind these paths: initialize degrades, never errors
    let manager = ScannerManager::new(offline_config());
    manager.initialize().await;
    assert!(!manager.is_enabled());

    let event = recv_with_timeout(&mut rx).await.expect("disabled event");
    match event {
        Event::Scanner(e) => assert_eq!(e.event_type, ScannerEventType::Disabled),
        other => panic!("unexpected event: {:?}", other),
    }

    manager.dispose().await;
    get_notification_service().await.unsubscribe("it-disabled");
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
#[serial]
async fn test_read_error_then_recovery_still_detects() {
    let mut rx = get_notification_service()
        .await
        .subscribe(
            "it-recovery".to_string(),
            EventFilter::TagOnly,
            "integration-test".to_string(),
        )
        .unwrap();

    let manager = ScannerManager::new(offline_config());
    let (backend, _closed) = ScriptedBackend::boxed(vec![
        Err(ScanError::hardware("transient bus fault")),
        Ok(Some("0BADCAFE".to_string())),
    ]);
    manager.install_backend(backend);
    manager.start_scanning().await;

    // The error costs one backoff period but the loop keeps going
    let detection = tokio::time::timeout(Duration::from_secs(5), rx.recv())
        .await
        .ok()
        .flatten()
        .expect("detection after transient error");
    match detection {
        Event::Tag(tag) => assert_eq!(tag.tag_id, "0BADCAFE"),
        other => panic!("unexpected event: {:?}", other),
    }

    manager.stop_scanning();
    manager.dispose().await;
    get_notification_service().await.unsubscribe("it-recovery");
}
