//! Log producers: follow files or stdin on tokio tasks and hand batches of
//! lines to the event loop over an mpsc channel.
//!
//! Nothing here touches the page. Lines are stamped with a leading RFC3339
//! timestamp when they carry one, otherwise with their arrival time.

use std::io::SeekFrom;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Local};
use tokio::fs::File;
use tokio::io::{AsyncBufReadExt, AsyncSeekExt, BufReader};
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use crate::config::TailConfig;
use crate::error::TailError;

/// Upper bound on lines per message so one huge file can't stall a tick.
const MAX_BATCH: usize = 512;

/// Quiet period after which buffered stdin lines are flushed.
const STDIN_FLUSH: Duration = Duration::from_millis(50);

// ── Types ────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Source {
    File(PathBuf),
    Stdin,
}

impl Source {
    pub fn name(&self) -> SourceName {
        match self {
            Self::File(path) => SourceName::for_path(path),
            Self::Stdin => SourceName {
                short: "stdin".to_string(),
                full: "stdin".to_string(),
            },
        }
    }
}

/// Label for where a line came from, in the two lengths the page can show.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceName {
    pub short: String,
    pub full: String,
}

impl SourceName {
    pub fn for_path(path: &Path) -> Self {
        let full = path.display().to_string();
        let short = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| full.clone());
        Self { short, full }
    }
}

#[derive(Debug, Clone)]
pub struct LogLine {
    pub source: Arc<SourceName>,
    pub timestamp: DateTime<Local>,
    pub text: String,
}

#[derive(Debug)]
pub enum TailMessage {
    Lines(Vec<LogLine>),
    /// The source will produce no more lines.
    Ended(Arc<SourceName>),
    Failed(Arc<SourceName>, String),
}

// ── Parsing ──────────────────────────────────────────────────────────────────

/// Split a leading RFC3339 timestamp off `raw`. Lines without one get `now`.
pub fn parse_line(raw: &str, now: DateTime<Local>) -> (DateTime<Local>, String) {
    let raw = raw.trim_end_matches(['\n', '\r']);
    if let Some((head, rest)) = raw.split_once(char::is_whitespace) {
        if let Ok(ts) = DateTime::parse_from_rfc3339(head) {
            return (ts.with_timezone(&Local), rest.trim_start().to_string());
        }
    } else if let Ok(ts) = DateTime::parse_from_rfc3339(raw) {
        return (ts.with_timezone(&Local), String::new());
    }
    (now, raw.to_string())
}

fn to_line(source: &Arc<SourceName>, raw: &str) -> LogLine {
    let (timestamp, text) = parse_line(raw, Local::now());
    LogLine {
        source: Arc::clone(source),
        timestamp,
        text,
    }
}

// ── Producers ────────────────────────────────────────────────────────────────

/// Spawn one task per source. Each task reports `Ended` or `Failed` when done.
pub fn spawn_sources(
    sources: Vec<Source>,
    config: &TailConfig,
    tx: mpsc::Sender<TailMessage>,
) -> Vec<JoinHandle<()>> {
    sources
        .into_iter()
        .map(|source| {
            let tx = tx.clone();
            let config = config.clone();
            tokio::spawn(async move {
                let name = Arc::new(source.name());
                let result = match &source {
                    Source::File(path) => tail_file(path, &name, &config, &tx).await,
                    Source::Stdin => tail_stdin(&name, &tx).await,
                };
                let done = match result {
                    Ok(()) => {
                        info!("source {} ended", name.full);
                        TailMessage::Ended(name)
                    }
                    Err(TailError::ChannelClosed) => return,
                    Err(e) => {
                        warn!("source {} failed: {}", name.full, e);
                        TailMessage::Failed(name, e.to_string())
                    }
                };
                let _ = tx.send(done).await;
            })
        })
        .collect()
}

async fn send_batch(
    tx: &mpsc::Sender<TailMessage>,
    batch: &mut Vec<LogLine>,
) -> Result<(), TailError> {
    if batch.is_empty() {
        return Ok(());
    }
    let lines = std::mem::take(batch);
    debug!("sending {} lines", lines.len());
    tx.send(TailMessage::Lines(lines))
        .await
        .map_err(|_| TailError::ChannelClosed)
}

/// Read `path` and, when following, poll it for appended lines. A file that
/// shrinks is treated as rotated and read again from the start.
pub async fn tail_file(
    path: &Path,
    name: &Arc<SourceName>,
    config: &TailConfig,
    tx: &mpsc::Sender<TailMessage>,
) -> Result<(), TailError> {
    let file = File::open(path).await.map_err(|source| TailError::Open {
        path: path.to_path_buf(),
        source,
    })?;
    let mut reader = BufReader::new(file);
    let read_err = |source: std::io::Error| TailError::Read {
        source_name: name.full.clone(),
        source,
    };

    let mut pos = if config.from_start {
        0
    } else {
        reader.seek(SeekFrom::End(0)).await.map_err(read_err)?
    };

    let poll = Duration::from_millis(config.poll_interval_ms.max(1));
    let mut batch = Vec::new();
    let mut raw = String::new();
    loop {
        raw.clear();
        let n = reader.read_line(&mut raw).await.map_err(read_err)?;
        if n > 0 && raw.ends_with('\n') {
            pos += n as u64;
            batch.push(to_line(name, &raw));
            if batch.len() >= MAX_BATCH {
                send_batch(tx, &mut batch).await?;
            }
            continue;
        }
        if n > 0 {
            // partial line at EOF; rewind and wait for the rest
            reader
                .seek(SeekFrom::Start(pos))
                .await
                .map_err(read_err)?;
            if !config.follow {
                batch.push(to_line(name, &raw));
            }
        }
        send_batch(tx, &mut batch).await?;
        if !config.follow {
            return Ok(());
        }

        tokio::time::sleep(poll).await;
        if tx.is_closed() {
            return Err(TailError::ChannelClosed);
        }
        let len = tokio::fs::metadata(path).await.map_err(read_err)?.len();
        if len < pos {
            warn!("{} shrank from {} to {} bytes, rereading", path.display(), pos, len);
            pos = reader.seek(SeekFrom::Start(0)).await.map_err(read_err)?;
        }
    }
}

/// Read stdin until it closes. Lines are flushed once input goes quiet.
pub async fn tail_stdin(
    name: &Arc<SourceName>,
    tx: &mpsc::Sender<TailMessage>,
) -> Result<(), TailError> {
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    let read_err = |source: std::io::Error| TailError::Read {
        source_name: name.full.clone(),
        source,
    };

    let mut batch = Vec::new();
    loop {
        match tokio::time::timeout(STDIN_FLUSH, lines.next_line()).await {
            Ok(Ok(Some(raw))) => {
                batch.push(to_line(name, &raw));
                if batch.len() >= MAX_BATCH {
                    send_batch(tx, &mut batch).await?;
                }
            }
            Ok(Ok(None)) => {
                send_batch(tx, &mut batch).await?;
                return Ok(());
            }
            Ok(Err(e)) => {
                send_batch(tx, &mut batch).await?;
                return Err(read_err(e));
            }
            Err(_) => send_batch(tx, &mut batch).await?,
        }
    }
}
