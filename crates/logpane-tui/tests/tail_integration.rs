//! Integration tests for the file producers and the page they feed.
//!
//! Files are written to temp dirs; producers run on the tokio test runtime.

use std::io::Write;
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::mpsc;

use logpane_tui::config::{Config, TailConfig};
use logpane_tui::page::{LogsPage, PageOptions, SourceFormat};
use logpane_tui::tail::{self, LogLine, Source, SourceName, TailMessage};

fn once() -> TailConfig {
    TailConfig {
        follow: false,
        from_start: true,
        poll_interval_ms: 10,
    }
}

fn following() -> TailConfig {
    TailConfig {
        follow: true,
        ..once()
    }
}

async fn next_lines(rx: &mut mpsc::Receiver<TailMessage>) -> Vec<LogLine> {
    match tokio::time::timeout(Duration::from_secs(5), rx.recv()).await {
        Ok(Some(TailMessage::Lines(lines))) => lines,
        other => panic!("expected lines, got {:?}", other),
    }
}

#[tokio::test]
async fn test_reads_whole_file_once() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    writeln!(file, "2024-02-01T08:00:00Z boot").unwrap();
    writeln!(file, "no timestamp here").unwrap();
    write!(file, "2024-02-01T08:00:02Z trailing without newline").unwrap();
    file.flush().unwrap();

    let (tx, mut rx) = mpsc::channel(16);
    let name = Arc::new(SourceName::for_path(file.path()));
    tail::tail_file(file.path(), &name, &once(), &tx).await.unwrap();

    let lines = next_lines(&mut rx).await;
    let texts: Vec<&str> = lines.iter().map(|l| l.text.as_str()).collect();
    assert_eq!(texts, vec!["boot", "no timestamp here", "trailing without newline"]);
    assert!(lines.iter().all(|l| Arc::ptr_eq(&l.source, &name)));
}

#[tokio::test]
async fn test_follow_picks_up_appends() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    writeln!(file, "first").unwrap();
    file.flush().unwrap();

    let (tx, mut rx) = mpsc::channel(16);
    let handles = tail::spawn_sources(
        vec![Source::File(file.path().to_path_buf())],
        &following(),
        tx,
    );

    assert_eq!(next_lines(&mut rx).await[0].text, "first");

    write!(file, "sec").unwrap();
    file.flush().unwrap();
    tokio::time::sleep(Duration::from_millis(50)).await;
    writeln!(file, "ond").unwrap();
    file.flush().unwrap();

    // a partial line is held until its newline arrives
    assert_eq!(next_lines(&mut rx).await[0].text, "second");

    for h in handles {
        h.abort();
    }
}

#[tokio::test]
async fn test_missing_file_reports_failure() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("absent.log");

    let (tx, mut rx) = mpsc::channel(16);
    tail::spawn_sources(vec![Source::File(path.clone())], &once(), tx);

    match tokio::time::timeout(Duration::from_secs(5), rx.recv()).await {
        Ok(Some(TailMessage::Failed(name, error))) => {
            assert_eq!(name.short, "absent.log");
            assert!(error.starts_with("cannot open"), "{error}");
        }
        other => panic!("expected failure, got {:?}", other),
    }
}

#[tokio::test]
async fn test_ended_source_after_lines() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    writeln!(file, "only line").unwrap();
    file.flush().unwrap();

    let (tx, mut rx) = mpsc::channel(16);
    tail::spawn_sources(vec![Source::File(file.path().to_path_buf())], &once(), tx);

    let mut page = LogsPage::new(PageOptions {
        sources: SourceFormat::Short,
        ..PageOptions::default()
    });
    page.append(next_lines(&mut rx).await);
    match rx.recv().await {
        Some(TailMessage::Ended(name)) => page.mark_source_ended(&name),
        other => panic!("expected end, got {:?}", other),
    }

    let rendered = logpane_core::Record::render(&page.view().all_rows()[0]);
    assert!(rendered.ends_with("[ended] only line"), "{rendered}");
}

#[tokio::test]
async fn test_interleaved_files_are_ordered() {
    let dir = tempfile::tempdir().unwrap();
    let a = dir.path().join("a.log");
    let b = dir.path().join("b.log");
    std::fs::write(&a, "2024-01-01T00:00:01Z a1\n2024-01-01T00:00:03Z a3\n").unwrap();
    std::fs::write(&b, "2024-01-01T00:00:02Z b2\n").unwrap();

    let (tx, mut rx) = mpsc::channel(16);
    tail::spawn_sources(vec![Source::File(a), Source::File(b)], &once(), tx);

    let mut page = LogsPage::new(PageOptions {
        sources: SourceFormat::None,
        ..PageOptions::default()
    });
    let mut ended = 0;
    while ended < 2 {
        match tokio::time::timeout(Duration::from_secs(5), rx.recv()).await {
            Ok(Some(TailMessage::Lines(lines))) => page.append(lines),
            Ok(Some(TailMessage::Ended(_))) => ended += 1,
            other => panic!("unexpected {:?}", other),
        }
    }

    let texts: Vec<String> = page
        .view()
        .visible_rows()
        .iter()
        .map(|l| l.text.clone())
        .collect();
    assert_eq!(texts, vec!["a1", "b2", "a3"]);

    page.reverse_order();
    assert_eq!(page.view().visible_rows()[0].text, "a3");
}

#[test]
fn test_config_written_on_first_load() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("nested").join("config.toml");

    let config = Config::load_from(&path).unwrap();
    assert!(path.exists());
    assert!(config.tail.follow);

    let content = std::fs::read_to_string(&path).unwrap();
    assert!(content.contains("poll_interval_ms = 250"));

    std::fs::write(&path, "[tail]\nfollow = false\n").unwrap();
    let reloaded = Config::load_from(&path).unwrap();
    assert!(!reloaded.tail.follow);
    assert_eq!(reloaded.tail.poll_interval_ms, 250);
}
