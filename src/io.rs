//! io provides the line-oriented source/sink abstraction the window engine
//! runs against, plus a real file-backed implementation with the
//! atomic-replace semantics the CLI uses.
//!
//! Ported from `fileio.c`: lines are read with CR, LF, and CRLF all
//! accepted as terminators and normalized away. `read_line`'s `while (count
//! < size)` loop stops the instant its buffer fills without consuming the
//! rest of the physical line, so an over-length physical line is split into
//! several logical lines rather than truncated-with-discard; this port
//! reproduces that by stopping at `MAX_LINE_LENGTH` bytes without reading
//! past it, leaving the remainder (including the real terminator) for the
//! next call. Output is always written with a trailing `\n`.

use crate::config::MAX_LINE_LENGTH;
use crate::error::Error;
use std::fs::File;
use std::io::{BufRead, BufReader, BufWriter, Read, Write};
use std::path::{Path, PathBuf};

/// LineSource yields the physical lines of an input, one at a time.
pub trait LineSource {
    /// next_line returns the next line with its terminator stripped, or
    /// `None` at end of input.
    fn next_line(&mut self) -> Result<Option<String>, Error>;
}

/// LineSink accepts output lines, one at a time.
pub trait LineSink {
    /// write_line emits `line` followed by a single `\n`.
    fn write_line(&mut self, line: &str) -> Result<(), Error>;
}

/// FileLineSource reads lines from a buffered file, normalizing line
/// endings and truncating over-length lines.
pub struct FileLineSource {
    reader: BufReader<File>,
}

impl FileLineSource {
    /// open buffers `path` for line-oriented reading.
    pub fn open(path: &Path) -> Result<FileLineSource, Error> {
        let file = File::open(path).map_err(|_| Error::FileNotFound(path.display().to_string()))?;
        Ok(FileLineSource {
            reader: BufReader::new(file),
        })
    }
}

impl LineSource for FileLineSource {
    fn next_line(&mut self) -> Result<Option<String>, Error> {
        read_normalized_line(&mut self.reader)
    }
}

/// read_normalized_line reads one logical line, treating `\r`, `\n`, and
/// `\r\n` all as terminators. Once `MAX_LINE_LENGTH` bytes have been
/// accumulated without a terminator, it stops without consuming anything
/// further, so the unread remainder of the physical line (including its
/// terminator) is picked up by the next call as its own logical line —
/// matching `read_line`'s `while (count < size)` boundary exactly.
fn read_normalized_line<R: BufRead>(reader: &mut R) -> Result<Option<String>, Error> {
    let mut out = Vec::new();
    let mut saw_any = false;

    while out.len() < MAX_LINE_LENGTH {
        let mut byte = [0u8; 1];
        match reader.read(&mut byte) {
            Ok(0) => break,
            Ok(_) => {}
            Err(_) => return Ok(None),
        }
        saw_any = true;
        match byte[0] {
            b'\n' => break,
            b'\r' => {
                let mut peek = [0u8; 1];
                if reader.fill_buf().map(|b| b.first().copied()).unwrap_or(None) == Some(b'\n') {
                    let _ = reader.read(&mut peek);
                }
                break;
            }
            b => out.push(b),
        }
    }

    if !saw_any {
        return Ok(None);
    }
    Ok(Some(String::from_utf8_lossy(&out).into_owned()))
}

/// AtomicFileSink buffers output to a sibling `.tmp` file and replaces the
/// original only once every line has been written successfully.
pub struct AtomicFileSink {
    writer: BufWriter<File>,
    tmp_path: PathBuf,
    final_path: PathBuf,
}

impl AtomicFileSink {
    /// create opens `<path>.tmp` for writing.
    pub fn create(path: &Path) -> Result<AtomicFileSink, Error> {
        let tmp_path = tmp_path_for(path);
        let file = File::create(&tmp_path).map_err(|_| Error::FileNotFound(tmp_path.display().to_string()))?;
        Ok(AtomicFileSink {
            writer: BufWriter::new(file),
            tmp_path,
            final_path: path.to_path_buf(),
        })
    }

    /// commit flushes the buffered output, deletes the original file, and
    /// renames the temp file over it (`spec.md` §6.5: write-tmp,
    /// delete-original, rename-over).
    pub fn commit(mut self) -> Result<(), Error> {
        self.writer
            .flush()
            .map_err(|_| Error::FileNotFound(self.tmp_path.display().to_string()))?;
        let _ = std::fs::remove_file(&self.final_path);
        std::fs::rename(&self.tmp_path, &self.final_path)
            .map_err(|_| Error::FileNotFound(self.final_path.display().to_string()))
    }
}

impl LineSink for AtomicFileSink {
    fn write_line(&mut self, line: &str) -> Result<(), Error> {
        self.writer
            .write_all(line.as_bytes())
            .and_then(|_| self.writer.write_all(b"\n"))
            .map_err(|_| Error::FileNotFound(self.tmp_path.display().to_string()))
    }
}

fn tmp_path_for(path: &Path) -> PathBuf {
    let mut s = path.as_os_str().to_owned();
    s.push(".tmp");
    PathBuf::from(s)
}

/// InMemorySource/InMemorySink back the scenario tests without touching the
/// filesystem.
pub struct InMemorySource {
    lines: std::collections::VecDeque<String>,
}

impl InMemorySource {
    pub fn new(lines: Vec<&str>) -> InMemorySource {
        InMemorySource {
            lines: lines.into_iter().map(|l| l.to_string()).collect(),
        }
    }
}

impl LineSource for InMemorySource {
    fn next_line(&mut self) -> Result<Option<String>, Error> {
        Ok(self.lines.pop_front())
    }
}

#[derive(Default)]
pub struct InMemorySink {
    pub lines: Vec<String>,
}

impl LineSink for InMemorySink {
    fn write_line(&mut self, line: &str) -> Result<(), Error> {
        self.lines.push(line.to_string());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    #[test]
    fn normalizes_crlf_and_lf() {
        let mut r = Cursor::new(b"one\r\ntwo\nthree".to_vec());
        assert_eq!(read_normalized_line(&mut r).unwrap(), Some("one".to_string()));
        assert_eq!(read_normalized_line(&mut r).unwrap(), Some("two".to_string()));
        assert_eq!(read_normalized_line(&mut r).unwrap(), Some("three".to_string()));
        assert_eq!(read_normalized_line(&mut r).unwrap(), None);
    }

    #[test]
    fn splits_overlong_line_across_reads() {
        // Mirrors `read_line`'s `while (count < size)` boundary: the
        // unconsumed tail of the physical line, terminator included,
        // surfaces as its own logical line on the next read.
        let long = "x".repeat(MAX_LINE_LENGTH + 20);
        let mut r = Cursor::new(format!("{}\n", long).into_bytes());
        let first = read_normalized_line(&mut r).unwrap().unwrap();
        assert_eq!(first.len(), MAX_LINE_LENGTH);
        let second = read_normalized_line(&mut r).unwrap().unwrap();
        assert_eq!(second, "x".repeat(20));
        assert_eq!(read_normalized_line(&mut r).unwrap(), None);
    }

    #[test]
    fn in_memory_roundtrip() {
        let mut src = InMemorySource::new(vec!["a", "b"]);
        let mut sink = InMemorySink::default();
        while let Some(line) = src.next_line().unwrap() {
            sink.write_line(&line).unwrap();
        }
        assert_eq!(sink.lines, vec!["a", "b"]);
    }
}
