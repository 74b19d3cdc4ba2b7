use crate::core::bus::message::Record;
use crate::domain::error::{BridgeError, BridgeResult};

/// Incremental delimiter-based splitter over the active connection's byte
/// stream. Partial trailing bytes are buffered and prefixed onto the next
/// chunk. Each connection gets a fresh framer; there is no carryover between
/// connections.
pub struct LineFramer {
    delimiter: Vec<u8>,
    buffer: Vec<u8>,
    max_frame_bytes: usize,
}

impl LineFramer {
    pub fn new(delimiter: impl Into<Vec<u8>>, max_frame_bytes: usize) -> Self {
        let delimiter = delimiter.into();
        debug_assert!(!delimiter.is_empty());
        Self {
            delimiter,
            buffer: Vec::new(),
            max_frame_bytes,
        }
    }

    /// Feed a chunk of bytes, returning every complete record it terminates.
    ///
    /// An unterminated residue larger than `max_frame_bytes` is a
    /// `FramingOverflow`; the caller is expected to tear the connection down.
    pub fn push(&mut self, chunk: &[u8]) -> BridgeResult<Vec<Record>> {
        self.buffer.extend_from_slice(chunk);

        let mut records = Vec::new();
        while let Some(pos) = find_delimiter(&self.buffer, &self.delimiter) {
            let frame: Vec<u8> = self.buffer.drain(..pos + self.delimiter.len()).collect();
            let payload = &frame[..pos];
            records.push(Record::new(String::from_utf8_lossy(payload).into_owned()));
        }

        if self.buffer.len() > self.max_frame_bytes {
            self.buffer.clear();
            return Err(BridgeError::FramingOverflow {
                limit: self.max_frame_bytes,
            });
        }

        Ok(records)
    }

    /// Bytes currently buffered without a terminating delimiter.
    pub fn pending(&self) -> usize {
        self.buffer.len()
    }
}

fn find_delimiter(haystack: &[u8], needle: &[u8]) -> Option<usize> {
    if haystack.len() < needle.len() {
        return None;
    }
    haystack
        .windows(needle.len())
        .position(|window| window == needle)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn framer() -> LineFramer {
        LineFramer::new("\r\n".as_bytes().to_vec(), 64 * 1024)
    }

    #[test]
    fn test_two_chunks_yield_complete_records_only() {
        let mut framer = framer();

        let records = framer.push(b"A\r\nB\r\n").unwrap();
        assert_eq!(records, vec![Record::new("A"), Record::new("B")]);

        let records = framer.push(b"C").unwrap();
        assert!(records.is_empty());
        assert_eq!(framer.pending(), 1);

        let records = framer.push(b"\r\n").unwrap();
        assert_eq!(records, vec![Record::new("C")]);
        assert_eq!(framer.pending(), 0);
    }

    #[test]
    fn test_delimiter_split_across_chunks() {
        let mut framer = framer();
        assert!(framer.push(b"1,2,3,4\r").unwrap().is_empty());
        let records = framer.push(b"\n").unwrap();
        assert_eq!(records, vec![Record::new("1,2,3,4")]);
    }

    #[test]
    fn test_empty_records_are_preserved() {
        let mut framer = framer();
        let records = framer.push(b"\r\n\r\n").unwrap();
        assert_eq!(records, vec![Record::new(""), Record::new("")]);
    }

    #[test]
    fn test_overflow_forces_error() {
        let mut framer = LineFramer::new("\r\n".as_bytes().to_vec(), 8);
        let err = framer.push(b"0123456789").unwrap_err();
        assert!(matches!(err, BridgeError::FramingOverflow { limit: 8 }));
        // A terminated frame within the limit is fine.
        assert_eq!(framer.push(b"ok\r\n").unwrap(), vec![Record::new("ok")]);
    }
}
