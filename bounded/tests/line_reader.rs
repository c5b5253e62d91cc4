//! Integration tests for LineReader against different source shapes.
//!
//! Run with: cargo test -p giztoy-bounded --test line_reader
//! Set RUST_LOG=trace to see truncation and end-of-input events.

use std::io::{self, Read};

use giztoy_bounded::{Error, LineReader};
use tracing_subscriber::EnvFilter;

const REPORT: &str = r#"[+] triage v1.0.0
[+] image cmdline: ./target/app @@
[+] profiling target...
[+] target profile: time=233.509096ms, mem=1KB
[+] processing 1 testcases
{
  "bucket": {
    "strategy": "afltriage",
    "strategy_result": "b6ddbbeed2004ab4e3095bc588be36a0"
  },
  "registers": [
    { "name": "rax", "value": 140737343975424 },
    { "name": "rip", "pretty_value": "0x555555693755 <LLVMFuzzerTestOneInput+533>" }
  ],

  "result": "SUCCESS"
}
[+] stats [crashes: 1 (unique 1), no crash: 0, timeout: 0, errored: 0]"#;

fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

/// Delivers exactly one line (with its newline) per read call.
struct LineByLine {
    data: Vec<u8>,
}

impl LineByLine {
    fn new(s: &str) -> Self {
        LineByLine {
            data: s.as_bytes().to_vec(),
        }
    }
}

impl Read for LineByLine {
    fn read(&mut self, dst: &mut [u8]) -> io::Result<usize> {
        let end = match self.data.iter().position(|&b| b == b'\n') {
            Some(i) => i + 1,
            None => self.data.len(),
        };
        let n = end.min(dst.len());
        dst[..n].copy_from_slice(&self.data[..n]);
        self.data.drain(..n);
        Ok(n)
    }
}

/// Delivers one byte per read call.
struct Trickle<'a>(&'a [u8]);

impl Read for Trickle<'_> {
    fn read(&mut self, dst: &mut [u8]) -> io::Result<usize> {
        match (self.0.split_first(), dst.first_mut()) {
            (Some((&b, rest)), Some(slot)) => {
                *slot = b;
                self.0 = rest;
                Ok(1)
            }
            _ => Ok(0),
        }
    }
}

/// Reads every line, returning them and the error that ended the stream.
fn collect_lines<R: Read>(reader: &mut LineReader<R>, buf: &mut [u8]) -> (Vec<String>, Error) {
    let mut lines = Vec::new();
    loop {
        match reader.read_line(buf) {
            Ok(line) => lines.push(String::from_utf8_lossy(&buf[..line.len]).into_owned()),
            Err(e) => return (lines, e),
        }
    }
}

#[test]
fn test_round_trip_small_blocks() {
    init_tracing();
    let expected: Vec<&str> = REPORT.split('\n').collect();

    for block_size in [1, 3, 16, 64, 4096] {
        let mut reader = LineReader::new(REPORT.as_bytes(), block_size).unwrap();
        let mut buf = [0u8; 256];

        let (lines, err) = collect_lines(&mut reader, &mut buf);
        assert!(err.is_eof(), "block {}: ended with {:?}", block_size, err);
        assert_eq!(lines, expected, "block {}", block_size);
        assert!(reader.buffered().is_empty());
    }
}

#[test]
fn test_round_trip_line_by_line_source() {
    let expected: Vec<&str> = REPORT.split('\n').collect();
    let mut reader = LineReader::new(LineByLine::new(REPORT), 4096).unwrap();
    let mut buf = [0u8; 8192];

    let (lines, err) = collect_lines(&mut reader, &mut buf);
    assert!(err.is_eof());
    assert_eq!(lines, expected);
}

#[test]
fn test_round_trip_trickle_source() {
    let expected: Vec<&str> = REPORT.split('\n').collect();
    let mut reader = LineReader::new(Trickle(REPORT.as_bytes()), 8).unwrap();
    let mut buf = [0u8; 128];

    let (lines, err) = collect_lines(&mut reader, &mut buf);
    assert!(err.is_eof());
    assert_eq!(lines, expected);
}

#[test]
fn test_truncation_keeps_line_boundaries() {
    init_tracing();
    let expected: Vec<&str> = REPORT.split('\n').collect();
    let mut reader = LineReader::new(REPORT.as_bytes(), 4096).unwrap();
    let mut buf = [0u8; 10];

    for want in &expected {
        let line = reader.read_line(&mut buf).unwrap();
        let got = &buf[..line.len];
        assert!(
            want.as_bytes().starts_with(got),
            "line {:?} does not start with {:?}",
            want,
            String::from_utf8_lossy(got)
        );
        assert_eq!(line.len + line.discarded, want.len());
    }
    assert!(reader.read_line(&mut buf).unwrap_err().is_eof());
}

#[test]
fn test_truncation_with_trickle_source() {
    let mut reader = LineReader::new(Trickle(b"abcdefghij\nk\n"), 4).unwrap();
    let mut buf = [0u8; 3];

    let line = reader.read_line(&mut buf).unwrap();
    assert_eq!(&buf[..line.len], b"abc");
    assert_eq!(line.discarded, 7);

    let line = reader.read_line(&mut buf).unwrap();
    assert_eq!(&buf[..line.len], b"k");
    assert!(!line.is_truncated());
}

#[test]
fn test_partial_final_line_then_eof() {
    let mut reader = LineReader::new(LineByLine::new("first\nlast"), 4).unwrap();
    let mut buf = [0u8; 16];

    assert_eq!(reader.read(&mut buf).unwrap(), 5);
    assert_eq!(reader.read(&mut buf).unwrap(), 4);
    assert_eq!(&buf[..4], b"last");
    for _ in 0..3 {
        assert!(matches!(reader.read(&mut buf), Err(Error::Eof)));
    }
}

#[test]
fn test_read_folds_truncation_into_error() {
    let mut reader = LineReader::new(REPORT.as_bytes(), 32).unwrap();
    let mut buf = [0u8; 24];

    // "[+] triage v1.0.0" fits, the cmdline line does not.
    assert_eq!(reader.read(&mut buf).unwrap(), 17);
    match reader.read(&mut buf) {
        Err(Error::LineTooLong { discarded }) => {
            assert_eq!(discarded, "[+] image cmdline: ./target/app @@".len() - 24);
        }
        other => panic!("expected LineTooLong, got {:?}", other),
    }
    assert_eq!(reader.read(&mut buf).unwrap(), "[+] profiling target...".len());
}

#[test]
fn test_lines_iterator_over_report() {
    let mut reader = LineReader::new(LineByLine::new(REPORT), 64).unwrap();
    let mut ok = 0;
    let mut too_long = 0;

    for line in reader.lines(40) {
        match line {
            Ok(_) => ok += 1,
            Err(Error::LineTooLong { .. }) => too_long += 1,
            Err(e) => panic!("unexpected error: {}", e),
        }
    }

    let total = REPORT.split('\n').count();
    let long = REPORT.split('\n').filter(|l| l.len() > 40).count();
    assert_eq!(ok, total - long);
    assert_eq!(too_long, long);
}

#[test]
fn test_source_error_surfaces_once_lines_are_drained() {
    struct Flaky {
        served: bool,
    }

    impl Read for Flaky {
        fn read(&mut self, dst: &mut [u8]) -> io::Result<usize> {
            if self.served {
                return Err(io::Error::new(io::ErrorKind::TimedOut, "stalled"));
            }
            self.served = true;
            let data = b"one\ntwo\nthr";
            dst[..data.len()].copy_from_slice(data);
            Ok(data.len())
        }
    }

    let mut reader = LineReader::new(Flaky { served: false }, 32).unwrap();
    let mut buf = [0u8; 32];

    let (lines, err) = collect_lines(&mut reader, &mut buf);
    assert_eq!(lines, ["one", "two", "thr"]);
    match err {
        Error::Source(e) => assert_eq!(e.kind(), io::ErrorKind::TimedOut),
        other => panic!("expected source error, got {:?}", other),
    }
    assert!(matches!(reader.read_line(&mut buf), Err(Error::Source(_))));
}

/// Lines as the reader should produce them: split on '\n', without the
/// empty segment after a trailing newline.
fn expected_lines(input: &[u8]) -> Vec<Vec<u8>> {
    let mut lines: Vec<Vec<u8>> = input.split(|&b| b == b'\n').map(<[u8]>::to_vec).collect();
    if lines.last().is_some_and(|l| l.is_empty()) {
        lines.pop();
    }
    lines
}

mod properties {
    use super::*;
    use proptest::prelude::*;

    fn text() -> impl Strategy<Value = Vec<u8>> {
        prop::collection::vec(prop_oneof![Just(b'a'), Just(b'b'), Just(b'\n')], 0..200)
    }

    proptest! {
        #[test]
        fn prop_splits_like_split(input in text(), block_size in 1usize..17) {
            let mut reader = LineReader::new(&input[..], block_size).unwrap();
            let mut buf = vec![0u8; input.len()];

            let mut lines = Vec::new();
            let err = loop {
                match reader.read_line(&mut buf) {
                    Ok(line) => {
                        prop_assert_eq!(line.discarded, 0);
                        lines.push(buf[..line.len].to_vec());
                    }
                    Err(e) => break e,
                }
            };

            prop_assert!(err.is_eof());
            prop_assert_eq!(lines, expected_lines(&input));
        }

        #[test]
        fn prop_truncation_accounts_for_every_byte(
            input in text(),
            block_size in 1usize..17,
            buf_len in 0usize..8,
        ) {
            let mut reader = LineReader::new(&input[..], block_size).unwrap();
            let mut buf = vec![0u8; buf_len];

            for want in expected_lines(&input) {
                let line = reader.read_line(&mut buf).unwrap();
                prop_assert_eq!(&buf[..line.len], &want[..line.len]);
                prop_assert_eq!(line.len + line.discarded, want.len());
            }
            prop_assert!(reader.read_line(&mut buf).unwrap_err().is_eof());
        }
    }
}
