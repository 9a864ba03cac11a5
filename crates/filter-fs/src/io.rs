//! Stream handles with standard-stream awareness
//!
//! The filter engine reads from a [`Source`] and writes to a [`Sink`]. Both
//! traits report whether the handle is one of the process's standard streams
//! so callers can release every other handle on every exit path while leaving
//! stdin/stdout/stderr open.

use std::fs::{self, File};
use std::io::{self, BufWriter, Cursor, Read, Stderr, StderrLock, Stdin, StdinLock, Stdout, StdoutLock, Write};
use std::path::{Path, PathBuf};

use crate::{Error, Result};

/// A readable byte stream.
pub trait Source: Read {
    /// Whether this handle is the process's standard input.
    fn is_standard_stream(&self) -> bool {
        false
    }
}

/// A writable byte stream that can be released explicitly.
pub trait Sink: Write {
    /// Whether this handle is the process's standard output or error.
    fn is_standard_stream(&self) -> bool {
        false
    }

    /// Flush and release the underlying handle, reporting any deferred error.
    fn close(&mut self) -> io::Result<()> {
        self.flush()
    }
}

impl Source for File {}
impl Source for &[u8] {}
impl<T: AsRef<[u8]>> Source for Cursor<T> {}

impl Source for Stdin {
    fn is_standard_stream(&self) -> bool {
        true
    }
}

impl Source for StdinLock<'_> {
    fn is_standard_stream(&self) -> bool {
        true
    }
}

impl<R: Source + ?Sized> Source for Box<R> {
    fn is_standard_stream(&self) -> bool {
        (**self).is_standard_stream()
    }
}

impl<R: Source + ?Sized> Source for &mut R {
    fn is_standard_stream(&self) -> bool {
        (**self).is_standard_stream()
    }
}

impl Sink for File {
    fn close(&mut self) -> io::Result<()> {
        self.flush()?;
        self.sync_all()
    }
}

impl Sink for Vec<u8> {}

impl Sink for Stdout {
    fn is_standard_stream(&self) -> bool {
        true
    }
}

impl Sink for StdoutLock<'_> {
    fn is_standard_stream(&self) -> bool {
        true
    }
}

impl Sink for Stderr {
    fn is_standard_stream(&self) -> bool {
        true
    }
}

impl Sink for StderrLock<'_> {
    fn is_standard_stream(&self) -> bool {
        true
    }
}

impl<W: Sink> Sink for BufWriter<W> {
    fn is_standard_stream(&self) -> bool {
        self.get_ref().is_standard_stream()
    }

    fn close(&mut self) -> io::Result<()> {
        self.flush()?;
        self.get_mut().close()
    }
}

impl<W: Sink + ?Sized> Sink for Box<W> {
    fn is_standard_stream(&self) -> bool {
        (**self).is_standard_stream()
    }

    fn close(&mut self) -> io::Result<()> {
        (**self).close()
    }
}

impl<W: Sink + ?Sized> Sink for &mut W {
    fn is_standard_stream(&self) -> bool {
        (**self).is_standard_stream()
    }

    fn close(&mut self) -> io::Result<()> {
        (**self).close()
    }
}

/// Open a file for reading.
///
/// A missing file is reported as [`Error::NotFound`].
pub fn open_input(path: &Path) -> Result<File> {
    File::open(path).map_err(|e| Error::io(path, e))
}

/// Create (or truncate) a file for writing, creating parent directories.
pub fn create_output(path: &Path) -> Result<File> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent).map_err(|e| Error::Io {
            path: parent.to_path_buf(),
            source: e,
        })?;
    }
    File::create(path).map_err(|e| Error::Io {
        path: path.to_path_buf(),
        source: e,
    })
}

/// Build a deferred output factory for `path`.
///
/// Nothing touches the filesystem until the returned closure is called, so
/// the target may be the same file that is still being read. The file is
/// buffered; bytes reach it on flush or close.
pub fn output_factory(path: impl Into<PathBuf>) -> impl FnOnce() -> Result<BufWriter<File>> {
    let path = path.into();
    move || create_output(&path).map(BufWriter::new)
}

/// Read a source to its end and release it.
///
/// Standard input is left open; dropping a std handle never closes the
/// underlying descriptor.
pub fn read_fully<R: Source>(mut input: R) -> io::Result<Vec<u8>> {
    let mut buffer = Vec::new();
    let outcome = input.read_to_end(&mut buffer);
    if input.is_standard_stream() {
        tracing::trace!("Leaving standard input open");
    }
    drop(input);
    outcome.map(|_| buffer)
}

/// Release a sink after the primary write has finished.
///
/// Standard streams are flushed but never closed. Close failures on other
/// sinks are logged and swallowed.
pub fn close_quietly<W: Sink>(mut sink: W) {
    if sink.is_standard_stream() {
        if let Err(e) = sink.flush() {
            tracing::warn!(error = %e, "Unable to flush standard stream");
        }
        return;
    }
    if let Err(e) = sink.close() {
        tracing::warn!(error = %e, "Unable to close output stream");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct FailingClose;

    impl Write for FailingClose {
        fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
            Ok(buf.len())
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    impl Sink for FailingClose {
        fn close(&mut self) -> io::Result<()> {
            Err(io::Error::other("close failed"))
        }
    }

    #[test]
    fn std_handles_are_standard_streams() {
        assert!(Source::is_standard_stream(&io::stdin()));
        assert!(Sink::is_standard_stream(&io::stdout()));
        assert!(Sink::is_standard_stream(&io::stderr()));
        assert!(Sink::is_standard_stream(&BufWriter::new(io::stdout())));
    }

    #[test]
    fn buffers_are_not_standard_streams() {
        assert!(!Source::is_standard_stream(&Cursor::new(b"x".to_vec())));
        assert!(!Sink::is_standard_stream(&Vec::<u8>::new()));
    }

    #[test]
    fn close_failure_is_swallowed() {
        close_quietly(FailingClose);
    }

    #[test]
    fn read_fully_returns_all_bytes() {
        let bytes = read_fully(Cursor::new(b"line one\nline two".to_vec())).unwrap();
        assert_eq!(bytes, b"line one\nline two");
    }

    #[test]
    fn output_factory_is_lazy() {
        let dir = tempfile::tempdir().unwrap();
        let target = dir.path().join("nested").join("out.txt");

        let factory = output_factory(&target);
        assert!(!target.exists());

        factory().unwrap();
        assert!(target.is_file());
    }

    #[test]
    fn factory_output_is_buffered_until_flush() {
        let dir = tempfile::tempdir().unwrap();
        let target = dir.path().join("out.txt");

        let mut sink = output_factory(&target)().unwrap();
        sink.write_all(b"line\n").unwrap();
        assert_eq!(fs::read(&target).unwrap(), b"");

        sink.flush().unwrap();
        assert_eq!(fs::read(&target).unwrap(), b"line\n");
    }

    #[test]
    fn closing_buffered_file_writes_pending_bytes() {
        let dir = tempfile::tempdir().unwrap();
        let target = dir.path().join("out.txt");

        let mut sink = output_factory(&target)().unwrap();
        sink.write_all(b"pending").unwrap();
        close_quietly(sink);

        assert_eq!(fs::read(&target).unwrap(), b"pending");
    }
}
