use std::fmt::Display;
use std::io::BufRead;

use futures::{Stream, TryStreamExt};
use tracing::{info, warn};

use crate::codec::decode_line;
use crate::scanner::LogScanner;

/// Line sources that drive a scanner to completion
///
/// A read error ends the scan early: it is logged and the lines seen so far
/// stay valid, so callers always get a usable (possibly partial) result.
/// Invalid UTF-8 is not a read error; pair `scan_stream` with
/// [`LogLineCodec`](crate::LogLineCodec) to get the same lossy decoding
/// from async sources.
impl LogScanner {
    /// Scan a blocking reader until EOF or the first read error
    ///
    /// Lines are decoded lossily.
    pub fn scan_reader<R: BufRead>(&mut self, reader: R) -> u64 {
        let before = self.lines_scanned();

        for line in reader.split(b'\n') {
            match line {
                Ok(raw) => self.scan_line(&decode_line(&raw)),
                Err(e) => {
                    warn!(
                        error = %e,
                        lines = self.lines_scanned(),
                        "log read failed, keeping partial scan"
                    );
                    break;
                }
            }
        }

        let read = self.lines_scanned() - before;
        info!(lines = read, "log scan finished");
        read
    }

    /// Scan an async stream of lines until it ends or yields an error
    pub async fn scan_stream<S, E>(&mut self, stream: S) -> u64
    where
        S: Stream<Item = Result<String, E>>,
        E: Display,
    {
        let before = self.lines_scanned();
        let mut lines = std::pin::pin!(stream);

        loop {
            match lines.try_next().await {
                Ok(Some(line)) => self.scan_line(&line),
                Ok(None) => {
                    // Stream ended
                    break;
                }
                Err(e) => {
                    warn!(
                        error = %e,
                        lines = self.lines_scanned(),
                        "log stream failed, keeping partial scan"
                    );
                    break;
                }
            }
        }

        let read = self.lines_scanned() - before;
        info!(lines = read, "log scan finished");
        read
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::{self, Cursor, Read};

    /// Reader that fails after serving its prefix
    struct FailingReader {
        prefix: Cursor<Vec<u8>>,
    }

    impl Read for FailingReader {
        fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
            match self.prefix.read(buf)? {
                0 => Err(io::Error::other("connection reset")),
                n => Ok(n),
            }
        }
    }

    #[test]
    fn test_scan_reader_reads_all_lines() {
        let mut scanner = LogScanner::new(0);
        scanner.register_literal("my error").unwrap();

        let read = scanner.scan_reader(Cursor::new("line1\nlong my error line\nline3"));
        assert_eq!(read, 3);
        assert!(scanner.contains("my error"));
    }

    #[test]
    fn test_scan_reader_strips_crlf() {
        let mut scanner = LogScanner::new(100);
        scanner.scan_reader(Cursor::new("a\r\nb\r\n"));
        assert_eq!(scanner.trimmed_tail(), "a\nb");
    }

    #[test]
    fn test_scan_reader_keeps_partial_result_on_error() {
        let mut scanner = LogScanner::new(0);
        scanner.register_literal("before").unwrap();
        scanner.register_literal("after").unwrap();

        let reader = io::BufReader::new(FailingReader {
            prefix: Cursor::new(b"before\n".to_vec()),
        });
        let read = scanner.scan_reader(reader);

        assert_eq!(read, 1);
        assert!(scanner.contains("before"));
        assert!(!scanner.contains("after"));
        assert!(!scanner.is_empty());
    }

    #[test]
    fn test_scan_reader_continues_past_invalid_utf8() {
        let mut scanner = LogScanner::new(100);
        scanner.register_literal("after").unwrap();

        let read = scanner.scan_reader(Cursor::new(b"ok\n\xff\xfe\nafter\n".to_vec()));
        assert_eq!(read, 3);
        assert!(scanner.contains("after"));
        assert_eq!(scanner.trimmed_tail(), "ok\n\u{fffd}\u{fffd}\nafter");
    }

    #[tokio::test]
    async fn test_scan_stream_reads_all_lines() {
        let mut scanner = LogScanner::new(0);
        scanner.register_regex("status [0-9]+").unwrap();

        let lines = futures::stream::iter(vec![
            Ok::<_, io::Error>("starting".to_string()),
            Ok("Received response status 500".to_string()),
        ]);
        let read = scanner.scan_stream(lines).await;

        assert_eq!(read, 2);
        assert_eq!(scanner.captured("status [0-9]+"), Some("status 500"));
    }

    #[tokio::test]
    async fn test_scan_stream_with_lossy_codec() {
        use crate::codec::LogLineCodec;
        use tokio_util::codec::FramedRead;

        let mut scanner = LogScanner::new(0);
        scanner.register_literal("signature").unwrap();

        let raw: &[u8] = b"start\r\nbinary \xff\x00 noise\nsignature here\n";
        let read = scanner
            .scan_stream(FramedRead::new(raw, LogLineCodec::new()))
            .await;

        assert_eq!(read, 3);
        assert!(scanner.contains("signature"));
    }

    #[tokio::test]
    async fn test_scan_stream_stops_at_first_error() {
        let mut scanner = LogScanner::new(0);
        scanner.register_literal("late").unwrap();

        let lines = futures::stream::iter(vec![
            Ok("early".to_string()),
            Err(io::Error::other("timed out")),
            Ok("late".to_string()),
        ]);
        let read = scanner.scan_stream(lines).await;

        assert_eq!(read, 1);
        assert!(!scanner.contains("late"));
        assert!(!scanner.is_empty());
    }
}
