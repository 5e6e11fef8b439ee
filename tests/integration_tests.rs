//! Integration tests for the dispatch pipeline
//!
//! These tests verify:
//! - Threshold filtering into a real file
//! - File round trips
//! - Socket destinations that never connect, or lose their peer
//! - FIFO delivery and graceful shutdown through the dispatch worker
//! - Isolation between file and socket destinations

use fanout_logger::destinations::{FileDestination, SocketDestination};
use fanout_logger::stats::StatsCollector;
use fanout_logger::{run_dispatcher, Destination, Dispatcher, Logger, Severity};
use std::fs;
use std::io::{BufRead, BufReader};
use std::net::TcpListener;
use std::thread;
use std::time::Duration;
use tempfile::TempDir;

/// Strip the timestamp and level, leaving the message text.
fn message_of(line: &str) -> &str {
    line.split_once("] ").map(|(_, msg)| msg).unwrap_or_default()
}

fn closed_port() -> u16 {
    let listener = TcpListener::bind("127.0.0.1:0").expect("Failed to bind");
    listener.local_addr().expect("Failed to read address").port()
}

#[test]
fn test_level_filtering() {
    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    let log_file = temp_dir.path().join("test_log.txt");

    let logger = Logger::new(Severity::Warning);
    logger.add_file_destination(&log_file);

    logger.log(Severity::Error, "Error msg");
    logger.log(Severity::Warning, "Warning msg");
    logger.log(Severity::Info, "Info msg");

    let content = fs::read_to_string(&log_file).expect("Failed to read log file");
    assert!(content.contains("Error msg"));
    assert!(content.contains("Warning msg"));
    assert!(!content.contains("Info msg"));
    assert_eq!(content.lines().count(), 2);
}

#[test]
fn test_line_format_in_file() {
    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    let log_file = temp_dir.path().join("format.log");

    let logger = Logger::new(Severity::Info);
    logger.add_file_destination(&log_file);
    logger.warning("disk almost full");

    let content = fs::read_to_string(&log_file).expect("Failed to read log file");
    let line = content.strip_suffix('\n').expect("line must be newline-terminated");

    let (timestamp, rest) = line.split_at(19);
    assert_eq!(rest, " [Warning] disk almost full");
    assert!(
        chrono::NaiveDateTime::parse_from_str(timestamp, fanout_logger::TIMESTAMP_FORMAT).is_ok(),
        "bad timestamp {:?}",
        timestamp
    );
}

#[test]
fn test_tab_and_backslash_reach_file_unchanged() {
    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    let log_file = temp_dir.path().join("verbatim.log");

    let logger = Logger::new(Severity::Info);
    logger.add_file_destination(&log_file);
    logger.info("col1\tcol2 path C:\\new");

    let content = fs::read_to_string(&log_file).expect("Failed to read log file");
    assert!(content.ends_with(" [Info] col1\tcol2 path C:\\new\n"), "got {:?}", content);
}

#[test]
fn test_file_destination_round_trip() {
    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    let log_file = temp_dir.path().join("test_file_dest.txt");

    {
        let file = FileDestination::open(&log_file);
        file.write_log_line("Hello File").expect("write failed");
    }

    let content = fs::read_to_string(&log_file).expect("Failed to read log file");
    assert_eq!(content.lines().next(), Some("Hello File"));
    assert_eq!(content, "Hello File\n");
}

#[test]
fn test_socket_destination_without_server() {
    let socket = SocketDestination::connect("127.0.0.1", closed_port());

    for _ in 0..10 {
        assert!(socket.write_log_line("Test over socket").is_ok());
        assert!(!socket.is_connected());
    }
}

#[test]
fn test_fifo_through_dispatcher() {
    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    let log_file = temp_dir.path().join("fifo.log");

    let logger = Logger::new(Severity::Info);
    logger.add_file_destination(&log_file);

    run_dispatcher(&logger, |producer| {
        producer.log(Severity::Info, "T1").expect("enqueue failed");
        producer.log(Severity::Error, "T2").expect("enqueue failed");
        producer.log(Severity::Warning, "T3").expect("enqueue failed");
    })
    .expect("dispatcher failed");

    let content = fs::read_to_string(&log_file).expect("Failed to read log file");
    let messages: Vec<&str> = content.lines().map(message_of).collect();
    assert_eq!(messages, vec!["T1", "T2", "T3"]);
}

#[test]
fn test_graceful_shutdown_delivers_everything() {
    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    let log_file = temp_dir.path().join("shutdown_test.log");

    let logger = Logger::new(Severity::Info);
    logger.add_file_destination(&log_file);

    let dispatched = thread::scope(|scope| {
        let dispatcher = Dispatcher::spawn(scope, &logger).expect("spawn failed");
        let producer = dispatcher.producer();
        for i in 0..200 {
            producer.log(Severity::Info, format!("Message {}", i)).expect("enqueue failed");
        }
        dispatcher.shutdown().expect("shutdown failed")
    });

    assert_eq!(dispatched, 200);
    let content = fs::read_to_string(&log_file).expect("Failed to read log file");
    assert_eq!(content.lines().count(), 200, "All messages should be written before shutdown");
    assert_eq!(content.lines().last().map(message_of), Some("Message 199"));
}

#[test]
fn test_level_change_between_tasks() {
    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    let log_file = temp_dir.path().join("level_change.log");

    let logger = Logger::new(Severity::Error);
    logger.add_file_destination(&log_file);

    run_dispatcher(&logger, |producer| {
        producer.log(Severity::Info, "before").expect("enqueue failed");
    })
    .expect("dispatcher failed");

    logger.set_level(Severity::Info);

    run_dispatcher(&logger, |producer| {
        producer.log(Severity::Info, "after").expect("enqueue failed");
    })
    .expect("dispatcher failed");

    let content = fs::read_to_string(&log_file).expect("Failed to read log file");
    let messages: Vec<&str> = content.lines().map(message_of).collect();
    assert_eq!(messages, vec!["after"]);
}

#[test]
fn test_socket_receives_formatted_lines() {
    let listener = TcpListener::bind("127.0.0.1:0").expect("Failed to bind");
    let port = listener.local_addr().expect("Failed to read address").port();

    let reader = thread::spawn(move || {
        let (stream, _) = listener.accept().expect("accept failed");
        BufReader::new(stream)
            .lines()
            .map(|line| line.expect("read failed"))
            .collect::<Vec<_>>()
    });

    {
        let logger = Logger::builder()
            .level(Severity::Warning)
            .socket("127.0.0.1", port)
            .build()
            .expect("build failed");

        run_dispatcher(&logger, |producer| {
            producer.log(Severity::Error, "first").expect("enqueue failed");
            producer.log(Severity::Info, "filtered").expect("enqueue failed");
            producer.log(Severity::Warning, "second").expect("enqueue failed");
        })
        .expect("dispatcher failed");
    }

    let lines = reader.join().expect("reader panicked");
    assert_eq!(lines.len(), 2);
    assert!(lines[0].ends_with(" [Error] first"));
    assert!(lines[1].ends_with(" [Warning] second"));
}

#[test]
fn test_file_unaffected_by_unreachable_socket() {
    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    let log_file = temp_dir.path().join("isolation.log");

    let logger = Logger::builder()
        .level(Severity::Info)
        .file(&log_file)
        .socket("127.0.0.1", closed_port())
        .build()
        .expect("build failed");
    assert_eq!(logger.destination_count(), 2);
    assert_eq!(logger.active_destination_count(), 1);

    run_dispatcher(&logger, |producer| {
        for i in 0..20 {
            producer.log(Severity::Info, format!("line {}", i)).expect("enqueue failed");
        }
    })
    .expect("dispatcher failed");

    let content = fs::read_to_string(&log_file).expect("Failed to read log file");
    assert_eq!(content.lines().count(), 20);
}

#[test]
fn test_file_continues_after_socket_peer_disappears() {
    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    let log_file = temp_dir.path().join("peer_lost.log");

    let listener = TcpListener::bind("127.0.0.1:0").expect("Failed to bind");
    let port = listener.local_addr().expect("Failed to read address").port();

    let logger = Logger::builder()
        .level(Severity::Info)
        .file(&log_file)
        .socket("127.0.0.1", port)
        .build()
        .expect("build failed");
    assert_eq!(logger.active_destination_count(), 2);

    let (peer, _) = listener.accept().expect("accept failed");
    logger.info("while connected");
    drop(peer);
    drop(listener);

    // The kernel may accept a write or two after the peer closed
    let mut sent = 1;
    while logger.active_destination_count() == 2 && sent < 200 {
        logger.info(format!("after close {}", sent));
        sent += 1;
        thread::sleep(Duration::from_millis(5));
    }
    assert_eq!(logger.active_destination_count(), 1, "socket should have gone inert");
    assert!(logger.metrics().destination_failures() >= 1);

    for i in 0..5 {
        logger.error(format!("after failure {}", i));
    }

    let content = fs::read_to_string(&log_file).expect("Failed to read log file");
    assert_eq!(content.lines().count(), sent + 5);
    assert!(content.contains("after failure 4"));
}

#[test]
fn test_stats_consumer_behind_socket() {
    let listener = TcpListener::bind("127.0.0.1:0").expect("Failed to bind");
    let port = listener.local_addr().expect("Failed to read address").port();

    let consumer = thread::spawn(move || {
        let (stream, _) = listener.accept().expect("accept failed");
        let mut stats = StatsCollector::new();
        for line in BufReader::new(stream).lines() {
            stats.record(&line.expect("read failed"));
        }
        stats.snapshot()
    });

    {
        let logger = Logger::builder()
            .level(Severity::Info)
            .socket("127.0.0.1", port)
            .build()
            .expect("build failed");

        run_dispatcher(&logger, |producer| {
            producer.log(Severity::Error, "e1").expect("enqueue failed");
            producer.log(Severity::Warning, "w1").expect("enqueue failed");
            producer.log(Severity::Info, "i1").expect("enqueue failed");
            producer.log(Severity::Info, "i2").expect("enqueue failed");
        })
        .expect("dispatcher failed");
    }

    let snapshot = consumer.join().expect("consumer panicked");
    assert_eq!(snapshot.total_messages, 4);
    assert_eq!(snapshot.errors, 1);
    assert_eq!(snapshot.warnings, 1);
    assert_eq!(snapshot.infos, 2);
    assert_eq!(snapshot.messages_last_hour, 4);
}
