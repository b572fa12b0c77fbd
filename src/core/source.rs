//! Line sources feeding the event assembler.
//!
//! A [`Source`] names where raw audit text comes from. [`LineSource`] turns
//! it into a stream of lines with the trailing newline removed, and knows
//! how to rewind for [`crate::core::parser::AuParser::reset`].

use crate::util::config::AuditdConfig;
use crate::util::constants;
use crate::util::error::{AuparseError, Result};
use std::fmt;
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::{Path, PathBuf};

/// Where the parser reads audit records from.
pub enum Source {
    /// One in-memory buffer of newline-separated records.
    Buffer(String),
    /// Several buffers, read in order.
    BufferArray(Vec<String>),
    /// One log file.
    File(PathBuf),
    /// Several log files, read in the given order.
    FileArray(Vec<PathBuf>),
    /// The system audit logs named by the default `auditd.conf`, oldest
    /// rotation first.
    Logs,
    /// Like [`Source::Logs`] with an explicit `auditd.conf` path.
    LogsFrom(PathBuf),
    /// An already-open stream. It is read once; resetting does not rewind it.
    Reader(Box<dyn BufRead>),
}

impl fmt::Debug for Source {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Buffer(b) => f.debug_tuple("Buffer").field(&b.len()).finish(),
            Self::BufferArray(b) => f.debug_tuple("BufferArray").field(&b.len()).finish(),
            Self::File(p) => f.debug_tuple("File").field(p).finish(),
            Self::FileArray(p) => f.debug_tuple("FileArray").field(p).finish(),
            Self::Logs => f.write_str("Logs"),
            Self::LogsFrom(p) => f.debug_tuple("LogsFrom").field(p).finish(),
            Self::Reader(_) => f.write_str("Reader"),
        }
    }
}

enum Input {
    Buffers {
        buffers: Vec<String>,
        index: usize,
        offset: usize,
    },
    Files {
        paths: Vec<PathBuf>,
        index: usize,
        reader: Option<BufReader<File>>,
    },
    Stream(Box<dyn BufRead>),
}

/// A [`Source`] opened for line-by-line reading.
pub struct LineSource {
    input: Input,
}

impl fmt::Debug for LineSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let kind = match &self.input {
            Input::Buffers { index, .. } => format!("buffers at {index}"),
            Input::Files { paths, index, .. } => format!("file {index} of {}", paths.len()),
            Input::Stream(_) => "stream".to_string(),
        };
        f.debug_tuple("LineSource").field(&kind).finish()
    }
}

impl LineSource {
    /// Prepare `source` for reading.
    ///
    /// File-backed sources are checked up front so that a missing or
    /// unreadable file is reported here rather than mid-traversal.
    ///
    /// # Errors
    /// [`AuparseError::SourceOpen`] if a file cannot be opened,
    /// [`AuparseError::Config`] if the system log set cannot be located,
    /// [`AuparseError::InvalidArgument`] for an empty file list.
    pub fn open(source: Source) -> Result<Self> {
        let input = match source {
            Source::Buffer(buffer) => Input::Buffers {
                buffers: vec![buffer],
                index: 0,
                offset: 0,
            },
            Source::BufferArray(buffers) => Input::Buffers {
                buffers,
                index: 0,
                offset: 0,
            },
            Source::File(path) => open_files(vec![path])?,
            Source::FileArray(paths) => open_files(paths)?,
            Source::Logs => open_logs(Path::new(constants::DEFAULT_AUDITD_CONF))?,
            Source::LogsFrom(config) => open_logs(&config)?,
            Source::Reader(reader) => Input::Stream(reader),
        };
        Ok(Self { input })
    }

    /// Return the next line without its line terminator, or `None` at the
    /// end of the source.
    ///
    /// # Errors
    /// I/O failures from the underlying file or stream.
    pub fn next_line(&mut self) -> Result<Option<String>> {
        match &mut self.input {
            Input::Buffers {
                buffers,
                index,
                offset,
            } => Ok(next_buffer_line(buffers, index, offset)),
            Input::Files {
                paths,
                index,
                reader,
            } => loop {
                if reader.is_none() {
                    let Some(path) = paths.get(*index) else {
                        return Ok(None);
                    };
                    tracing::debug!("Opening audit log {}", path.display());
                    *reader = Some(BufReader::new(open_file(path)?));
                }
                if let Some(r) = reader.as_mut() {
                    if let Some(line) = read_stream_line(r)? {
                        return Ok(Some(line));
                    }
                }
                *reader = None;
                *index += 1;
            },
            Input::Stream(reader) => read_stream_line(reader.as_mut()),
        }
    }

    /// Rewind to the start of the source. A stream cannot be rewound and
    /// is left where it is.
    pub fn rewind(&mut self) {
        match &mut self.input {
            Input::Buffers { index, offset, .. } => {
                *index = 0;
                *offset = 0;
            }
            Input::Files { index, reader, .. } => {
                *index = 0;
                *reader = None;
            }
            Input::Stream(_) => {
                tracing::debug!("Reset requested on a stream source; nothing to rewind");
            }
        }
    }
}

fn open_file(path: &Path) -> Result<File> {
    File::open(path).map_err(|source| AuparseError::SourceOpen {
        path: path.to_path_buf(),
        source,
    })
}

fn open_files(paths: Vec<PathBuf>) -> Result<Input> {
    if paths.is_empty() {
        return Err(AuparseError::InvalidArgument(
            "file list source is empty".into(),
        ));
    }
    for path in &paths {
        open_file(path)?;
    }
    Ok(Input::Files {
        paths,
        index: 0,
        reader: None,
    })
}

fn open_logs(config_path: &Path) -> Result<Input> {
    let config = AuditdConfig::load(config_path)?;
    open_files(config.rotated_log_files()?)
}

fn next_buffer_line(buffers: &[String], index: &mut usize, offset: &mut usize) -> Option<String> {
    while let Some(buffer) = buffers.get(*index) {
        if *offset >= buffer.len() {
            *index += 1;
            *offset = 0;
            continue;
        }
        let rest = &buffer[*offset..];
        let line = match rest.find('\n') {
            Some(end) => {
                *offset += end + 1;
                &rest[..end]
            }
            None => {
                *offset = buffer.len();
                rest
            }
        };
        return Some(line.strip_suffix('\r').unwrap_or(line).to_string());
    }
    None
}

fn read_stream_line(reader: &mut dyn BufRead) -> Result<Option<String>> {
    let mut buf = Vec::new();
    if reader.read_until(b'\n', &mut buf)? == 0 {
        return Ok(None);
    }
    if buf.last() == Some(&b'\n') {
        buf.pop();
        if buf.last() == Some(&b'\r') {
            buf.pop();
        }
    }
    Ok(Some(String::from_utf8_lossy(&buf).into_owned()))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn drain(source: &mut LineSource) -> Vec<String> {
        let mut lines = Vec::new();
        while let Some(line) = source.next_line().expect("read") {
            lines.push(line);
        }
        lines
    }

    #[test]
    fn test_buffer_lines_and_partial_tail() {
        let mut src = LineSource::open(Source::Buffer("a\n\nb\r\nc".into())).expect("open");
        assert_eq!(drain(&mut src), vec!["a", "", "b", "c"]);
    }

    #[test]
    fn test_buffer_array_continues_across_buffers() {
        let mut src =
            LineSource::open(Source::BufferArray(vec!["a\n".into(), String::new(), "b".into()]))
                .expect("open");
        assert_eq!(drain(&mut src), vec!["a", "b"]);
    }

    #[test]
    fn test_rewind_buffers() {
        let mut src = LineSource::open(Source::Buffer("x\ny\n".into())).expect("open");
        assert_eq!(drain(&mut src).len(), 2);
        src.rewind();
        assert_eq!(drain(&mut src), vec!["x", "y"]);
    }

    #[test]
    fn test_stream_is_read_once() {
        let reader = std::io::Cursor::new(b"one\ntwo\n".to_vec());
        let mut src = LineSource::open(Source::Reader(Box::new(reader))).expect("open");
        assert_eq!(drain(&mut src), vec!["one", "two"]);
        src.rewind();
        assert!(drain(&mut src).is_empty());
    }

    #[test]
    fn test_missing_file_is_reported_at_open() {
        let err = LineSource::open(Source::File("/nonexistent_auparse/audit.log".into()))
            .err()
            .expect("missing file must fail");
        assert!(err.to_string().contains("/nonexistent_auparse/audit.log"));
    }

    #[test]
    fn test_empty_file_list_rejected() {
        assert!(LineSource::open(Source::FileArray(Vec::new())).is_err());
    }
}
