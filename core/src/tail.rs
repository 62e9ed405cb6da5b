//! Incremental tailing of the game client log.
//!
//! Startup performs one full pass over the file's existing content and
//! flags everything it finds as replay. After that, only the newly
//! appended byte range `[offset, size)` is read on each pass. A shrink in
//! file size is treated as rotation and resynced from offset 0, never as
//! an error.

use std::fs;
use std::io::SeekFrom;
use std::path::{Path, PathBuf};
use std::time::Duration;

use memchr::memchr_iter;
use memmap2::Mmap;
use notify::{Config, RecommendedWatcher, RecursiveMode, Watcher};
use rayon::prelude::*;
use tokio::fs::File;
use tokio::io::{AsyncReadExt, AsyncSeekExt};
use tokio::sync::{mpsc, watch};
use tokio::task::JoinHandle;
use tokio::time::{Instant, MissedTickBehavior, interval};

use crate::error::Result;
use crate::log::{GameEvent, LineClassifier};

/// Minimum interval between two read passes. Change notifications that
/// arrive faster than this are deferred to the next poll tick, not
/// dropped, and the poll tick also catches appends the watcher missed.
pub const READ_THROTTLE: Duration = Duration::from_secs(1);

const CHANNEL_CAPACITY: usize = 1024;

#[derive(Debug, Clone)]
pub enum TailMessage {
    Event {
        event: GameEvent,
        /// Replayed from pre-existing file content rather than observed live.
        is_startup: bool,
    },
    /// All historical lines have been processed; live tailing begins.
    StartupComplete,
}

pub struct LogTailer {
    path: PathBuf,
    classifier: LineClassifier,
    replay_existing: bool,
}

/// Handle to a running tail task. Dropping the handle tears the watch
/// down as well; `stop` additionally waits for the task to finish so no
/// message can arrive afterwards.
pub struct TailerHandle {
    stop_tx: watch::Sender<bool>,
    task: JoinHandle<()>,
    // Keeps the OS watch registration alive for the task's lifetime.
    _watcher: RecommendedWatcher,
}

impl TailerHandle {
    /// Stop tailing. Safe to call mid-pass; once this returns, no further
    /// messages will be sent. Callers should keep draining (or drop) the
    /// receiver until then.
    pub async fn stop(self) {
        let _ = self.stop_tx.send(true);
        let _ = self.task.await;
    }
}

impl LogTailer {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            classifier: LineClassifier::new(),
            replay_existing: true,
        }
    }

    /// Skip the startup replay and begin tailing at the current end of
    /// file. Used when aggregated state was restored from disk and
    /// re-reading history would double-count it.
    pub fn skip_replay(mut self) -> Self {
        self.replay_existing = false;
        self
    }

    /// Spawn the tail task. Historical events arrive first (unless replay
    /// is skipped), then `StartupComplete`, then live events.
    pub fn start(self) -> Result<(TailerHandle, mpsc::Receiver<TailMessage>)> {
        let (tx, rx) = mpsc::channel(CHANNEL_CAPACITY);
        let (stop_tx, stop_rx) = watch::channel(false);
        let (notify_tx, notify_rx) = mpsc::channel(64);

        // Watch the parent directory: the log file itself may be replaced
        // wholesale on rotation, which would orphan a file-level watch.
        let file_name = self.path.file_name().map(|n| n.to_os_string());
        let mut watcher = RecommendedWatcher::new(
            move |res: notify::Result<notify::Event>| {
                let Ok(event) = res else { return };
                let ours = event
                    .paths
                    .iter()
                    .any(|p| p.file_name().map(|n| n.to_os_string()) == file_name);
                if ours {
                    let _ = notify_tx.blocking_send(());
                }
            },
            Config::default(),
        )?;
        let watch_dir = self
            .path
            .parent()
            .filter(|p| !p.as_os_str().is_empty())
            .unwrap_or(Path::new("."))
            .to_path_buf();
        watcher.watch(&watch_dir, RecursiveMode::NonRecursive)?;

        let task = tokio::spawn(tail_loop(self, tx, stop_rx, notify_rx));

        Ok((
            TailerHandle {
                stop_tx,
                task,
                _watcher: watcher,
            },
            rx,
        ))
    }
}

async fn tail_loop(
    tailer: LogTailer,
    tx: mpsc::Sender<TailMessage>,
    mut stop_rx: watch::Receiver<bool>,
    mut notify_rx: mpsc::Receiver<()>,
) {
    let LogTailer {
        path,
        classifier,
        replay_existing,
    } = tailer;

    let mut offset = if replay_existing {
        match replay_file(&path, &classifier, &tx).await {
            Ok(size) => size,
            Err(err) => {
                tracing::warn!(
                    "[TAIL] startup replay of {} failed: {err}; starting from offset 0",
                    path.display()
                );
                0
            }
        }
    } else {
        fs::metadata(&path).map(|m| m.len()).unwrap_or(0)
    };

    if tx.send(TailMessage::StartupComplete).await.is_err() {
        return;
    }

    let mut ticker = interval(READ_THROTTLE);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
    let mut last_pass = Instant::now();

    loop {
        tokio::select! {
            _ = stop_rx.changed() => break,
            _ = ticker.tick() => {
                if last_pass.elapsed() >= READ_THROTTLE {
                    offset = run_pass(&path, &classifier, &tx, offset).await;
                    last_pass = Instant::now();
                }
            }
            received = notify_rx.recv() => {
                if received.is_none() {
                    // Watcher gone; the poll tick still covers appends.
                    continue;
                }
                if last_pass.elapsed() >= READ_THROTTLE {
                    offset = run_pass(&path, &classifier, &tx, offset).await;
                    last_pass = Instant::now();
                }
                // Otherwise deferred: the next tick re-checks the file.
            }
        }

        if tx.is_closed() {
            break;
        }
    }

    tracing::debug!("[TAIL] stopped watching {}", path.display());
}

/// Full pass over the file's current contents. Line splitting and
/// classification run over a memory map; event order is preserved.
/// Returns the end position, which becomes the initial tail offset.
async fn replay_file(
    path: &Path,
    classifier: &LineClassifier,
    tx: &mpsc::Sender<TailMessage>,
) -> std::io::Result<u64> {
    let file = fs::File::open(path)?;
    if file.metadata()?.len() == 0 {
        // Mapping a zero-length file is invalid; there is nothing to
        // replay anyway.
        return Ok(0);
    }
    let mmap = unsafe { Mmap::map(&file)? };
    let bytes = mmap.as_ref();
    let end_pos = bytes.len() as u64;

    // Find all line boundaries
    let mut line_ranges: Vec<(usize, usize)> = Vec::new();
    let mut start = 0;
    for end in memchr_iter(b'\n', bytes) {
        if end > start {
            line_ranges.push((start, end));
        }
        start = end + 1;
    }
    if start < bytes.len() {
        line_ranges.push((start, bytes.len()));
    }

    let events: Vec<GameEvent> = line_ranges
        .par_iter()
        .filter_map(|&(start, end)| {
            let line = String::from_utf8_lossy(&bytes[start..end]);
            let line = line.trim();
            if line.is_empty() {
                return None;
            }
            classifier.classify(line)
        })
        .collect();

    tracing::info!(
        "[TAIL] replayed {} lines ({} events) from {}",
        line_ranges.len(),
        events.len(),
        path.display()
    );

    for event in events {
        if tx
            .send(TailMessage::Event {
                event,
                is_startup: true,
            })
            .await
            .is_err()
        {
            break;
        }
    }

    Ok(end_pos)
}

/// One incremental read pass. Returns the new committed offset; on error
/// the old offset is kept so the next pass retries the same byte range.
async fn run_pass(
    path: &Path,
    classifier: &LineClassifier,
    tx: &mpsc::Sender<TailMessage>,
    offset: u64,
) -> u64 {
    match read_delta(path, classifier, tx, offset).await {
        Ok(new_offset) => new_offset,
        Err(err) => {
            tracing::warn!("[TAIL] read pass failed: {err}; will retry from offset {offset}");
            offset
        }
    }
}

async fn read_delta(
    path: &Path,
    classifier: &LineClassifier,
    tx: &mpsc::Sender<TailMessage>,
    mut offset: u64,
) -> std::io::Result<u64> {
    let size = tokio::fs::metadata(path).await?.len();

    if size < offset {
        // File replaced or truncated: resync from the top.
        tracing::info!(
            "[TAIL] {} shrank from {offset} to {size} bytes; re-reading from start",
            path.display()
        );
        offset = 0;
    }
    if size == offset {
        return Ok(offset);
    }

    let mut file = File::open(path).await?;
    file.seek(SeekFrom::Start(offset)).await?;
    let mut buf = vec![0u8; (size - offset) as usize];
    file.read_exact(&mut buf).await?;

    for raw_line in buf.split(|&b| b == b'\n') {
        let line = String::from_utf8_lossy(raw_line);
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        if let Some(event) = classifier.classify(line) {
            let message = TailMessage::Event {
                event,
                is_startup: false,
            };
            if tx.send(message).await.is_err() {
                break;
            }
        }
    }

    // Unconditional advance: a partial trailing line was already handed
    // to the classifier, and no byte is ever read twice.
    Ok(size)
}
