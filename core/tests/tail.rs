//! Filesystem behavior of the tailing reader: startup replay, live
//! appends, truncation resync, replay skipping, and clean shutdown.
//!
//! Appends are detected by the reader's poll tick even where the OS
//! watcher is inert, so these tests only rely on generous timeouts.

use std::fs::OpenOptions;
use std::io::Write;
use std::path::Path;
use std::time::Duration;

use slain_core::tail::{LogTailer, TailMessage};
use slain_core::GameEvent;
use tokio::sync::mpsc::Receiver;
use tokio::time::timeout;

const WAIT: Duration = Duration::from_secs(10);

const DEATH_LINE: &str =
    "2025/01/02 03:04:05 12345 abcdef [INFO Client 1] : Player123 has been slain.\n";
const LEVEL_LINE: &str =
    "2025/01/02 03:04:00 12345 abcdef [INFO Client 1] : Player123 (Witch) is now level 2\n";
const NOISE_LINE: &str = "2025/01/02 03:03:59 12345 abcdef [INFO Client 1] : Tip of the day\n";

fn append(path: &Path, content: &str) {
    let mut file = OpenOptions::new().append(true).open(path).unwrap();
    file.write_all(content.as_bytes()).unwrap();
    file.flush().unwrap();
}

async fn next_message(rx: &mut Receiver<TailMessage>) -> TailMessage {
    timeout(WAIT, rx.recv())
        .await
        .expect("timed out waiting for tail message")
        .expect("tail channel closed unexpectedly")
}

/// Drain messages until StartupComplete, returning the startup events.
async fn collect_startup(rx: &mut Receiver<TailMessage>) -> Vec<GameEvent> {
    let mut events = Vec::new();
    loop {
        match next_message(rx).await {
            TailMessage::Event { event, is_startup } => {
                assert!(is_startup, "expected only startup events before the marker");
                events.push(event);
            }
            TailMessage::StartupComplete => return events,
        }
    }
}

async fn next_live_event(rx: &mut Receiver<TailMessage>) -> GameEvent {
    match next_message(rx).await {
        TailMessage::Event { event, is_startup } => {
            assert!(!is_startup, "expected a live event after startup");
            event
        }
        TailMessage::StartupComplete => panic!("unexpected second StartupComplete"),
    }
}

#[tokio::test]
async fn startup_replays_existing_content_then_tails_appends() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("Client.txt");
    std::fs::write(&path, format!("{NOISE_LINE}{LEVEL_LINE}{DEATH_LINE}")).unwrap();

    let (handle, mut rx) = LogTailer::new(&path).start().unwrap();

    let startup = collect_startup(&mut rx).await;
    assert_eq!(startup.len(), 2, "noise line must not classify");
    assert!(matches!(startup[0], GameEvent::LevelUp { .. }));
    assert!(matches!(startup[1], GameEvent::Death { .. }));

    append(
        &path,
        "2025/01/02 03:06:00 12345 abcdef [INFO Client 1] : Player123 has been slain.\n",
    );
    let event = next_live_event(&mut rx).await;
    assert!(matches!(event, GameEvent::Death { ref name, .. } if name == "Player123"));

    handle.stop().await;
}

#[tokio::test]
async fn appended_lines_are_delivered_exactly_once() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("Client.txt");
    std::fs::write(&path, "").unwrap();

    let (handle, mut rx) = LogTailer::new(&path).start().unwrap();
    assert!(collect_startup(&mut rx).await.is_empty());

    // Two appends in separate passes; each line must come through once.
    append(&path, LEVEL_LINE);
    assert!(matches!(
        next_live_event(&mut rx).await,
        GameEvent::LevelUp { level: 2, .. }
    ));

    append(&path, DEATH_LINE);
    assert!(matches!(next_live_event(&mut rx).await, GameEvent::Death { .. }));

    // Nothing further: no duplicate processing of already-seen bytes.
    handle.stop().await;
    let mut remaining = 0;
    while let Some(message) = rx.recv().await {
        if matches!(message, TailMessage::Event { .. }) {
            remaining += 1;
        }
    }
    assert_eq!(remaining, 0, "no events may arrive after the two appends");
}

#[tokio::test]
async fn truncation_resyncs_from_the_start_of_the_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("Client.txt");
    std::fs::write(&path, format!("{LEVEL_LINE}{DEATH_LINE}")).unwrap();

    let (handle, mut rx) = LogTailer::new(&path).start().unwrap();
    assert_eq!(collect_startup(&mut rx).await.len(), 2);

    // Replace the file with strictly shorter content, as a rotation would.
    std::fs::write(
        &path,
        "2025/01/03 09:00:00 1 a [INFO Client 1] : Reborn has been slain.\n",
    )
    .unwrap();

    let event = next_live_event(&mut rx).await;
    assert!(
        matches!(event, GameEvent::Death { ref name, .. } if name == "Reborn"),
        "shrunken file must be re-read from offset 0, got {event:?}"
    );

    handle.stop().await;
}

#[tokio::test]
async fn skip_replay_starts_at_end_of_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("Client.txt");
    std::fs::write(&path, format!("{LEVEL_LINE}{DEATH_LINE}")).unwrap();

    let (handle, mut rx) = LogTailer::new(&path).skip_replay().start().unwrap();
    assert!(
        collect_startup(&mut rx).await.is_empty(),
        "skip_replay must not emit historical events"
    );

    append(&path, DEATH_LINE);
    assert!(matches!(next_live_event(&mut rx).await, GameEvent::Death { .. }));

    handle.stop().await;
}

#[tokio::test]
async fn stop_ends_the_stream() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("Client.txt");
    std::fs::write(&path, "").unwrap();

    let (handle, mut rx) = LogTailer::new(&path).start().unwrap();
    assert!(collect_startup(&mut rx).await.is_empty());

    handle.stop().await;

    // Sender side is gone once stop returns; the channel drains to None.
    while let Some(message) = timeout(WAIT, rx.recv()).await.expect("channel should close") {
        panic!("no message may follow stop(), got {message:?}");
    }
}

#[tokio::test]
async fn missing_file_retries_until_it_appears() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("Client.txt");

    // File does not exist yet: startup replay fails softly.
    let (handle, mut rx) = LogTailer::new(&path).start().unwrap();
    assert!(collect_startup(&mut rx).await.is_empty());

    std::fs::write(&path, DEATH_LINE).unwrap();
    assert!(matches!(next_live_event(&mut rx).await, GameEvent::Death { .. }));

    handle.stop().await;
}
