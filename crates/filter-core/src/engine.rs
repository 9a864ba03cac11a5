//! Line-by-line stream filtering
//!
//! The engine reads its whole input into a line buffer and releases the input
//! before it asks the output factory for a sink. Callers hand over a factory
//! rather than an open stream so the output may be the very file being read:
//!
//! ```no_run
//! use filter_core::{LineFilterEngine, PropertySource};
//! use std::path::Path;
//!
//! let engine = LineFilterEngine::default();
//! let sources = [PropertySource::from_entries("env", [("host", "db.internal")])];
//! // In-place: input and output name the same file.
//! engine.filter_file(Path::new("app.conf"), Path::new("app.conf"), &sources)?;
//! # Ok::<(), filter_core::Error>(())
//! ```

use std::borrow::Cow;
use std::io::Write;
use std::path::Path;

use encoding_rs::{Encoding, UTF_8, UTF_16BE, UTF_16LE};
use filter_fs::path as fs_path;
use filter_fs::{io, text};
use filter_fs::{Sink, Source};

use crate::{Error, PlaceholderResolver, PropertySource, Result, SystemPropertiesMode};

pub const DEFAULT_FILE_ENCODING: &str = "UTF-8";
pub const DEFAULT_FLUSH_LINE_THRESHOLD: usize = 200;

/// Filters byte streams line by line through a [`PlaceholderResolver`].
#[derive(Debug, Clone)]
pub struct LineFilterEngine {
    resolver: PlaceholderResolver,
    mode: SystemPropertiesMode,
    encoding: &'static Encoding,
    flush_line_threshold: usize,
}

impl Default for LineFilterEngine {
    fn default() -> Self {
        Self::new(PlaceholderResolver::default())
    }
}

/// Look up a WHATWG encoding label such as `UTF-8` or `windows-1252`.
pub(crate) fn encoding_for_label(label: &str) -> Result<&'static Encoding> {
    Encoding::for_label(label.trim().as_bytes())
        .ok_or_else(|| Error::configuration(format!("Unable to use file encoding '{label}'")))
}

impl LineFilterEngine {
    pub fn new(resolver: PlaceholderResolver) -> Self {
        Self {
            resolver,
            mode: SystemPropertiesMode::default(),
            encoding: UTF_8,
            flush_line_threshold: DEFAULT_FLUSH_LINE_THRESHOLD,
        }
    }

    pub fn with_mode(mut self, mode: SystemPropertiesMode) -> Self {
        self.mode = mode;
        self
    }

    /// Use the encoding named by `label` for both reading and writing.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Configuration`] for an unknown label.
    pub fn with_encoding(mut self, label: &str) -> Result<Self> {
        self.encoding = encoding_for_label(label)?;
        Ok(self)
    }

    /// Flush the sink after every `threshold` lines.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Configuration`] for a zero threshold.
    pub fn with_flush_line_threshold(mut self, threshold: usize) -> Result<Self> {
        if threshold == 0 {
            return Err(Error::configuration("Flush line threshold must be at least 1"));
        }
        self.flush_line_threshold = threshold;
        Ok(self)
    }

    pub fn resolver(&self) -> &PlaceholderResolver {
        &self.resolver
    }

    pub fn mode(&self) -> SystemPropertiesMode {
        self.mode
    }

    pub fn encoding_name(&self) -> &'static str {
        self.encoding.name()
    }

    pub fn flush_line_threshold(&self) -> usize {
        self.flush_line_threshold
    }

    /// Filter `input` into the sink produced by `output`.
    ///
    /// The input is read to its end and released, and every line resolved,
    /// before `output` is called. A resolution failure therefore leaves the
    /// target untouched. The sink is released on every path after it has
    /// been obtained; standard streams are flushed but never closed.
    ///
    /// # Errors
    ///
    /// - [`Error::Io`] when reading or writing fails
    /// - any resolution error from [`PlaceholderResolver::resolve`]
    /// - whatever the output factory reports
    pub fn filter<R, W, E, F>(&self, input: R, output: F, sources: &[PropertySource]) -> Result<()>
    where
        R: Source,
        W: Sink,
        E: Into<Error>,
        F: FnOnce() -> std::result::Result<W, E>,
    {
        let bytes = io::read_fully(input).map_err(|e| Error::io("reading filter input", e))?;
        let (decoded, has_bom) = self.decode(&bytes);

        let filtered = text::split_lines(&decoded)
            .into_iter()
            .map(|line| self.resolver.resolve(line, sources, self.mode))
            .collect::<Result<Vec<_>>>()?;
        tracing::debug!(
            lines = filtered.len(),
            encoding = self.encoding.name(),
            "Buffered and resolved filter input"
        );

        let sink = output().map_err(Into::into)?;
        self.write_lines(&filtered, has_bom, sink)
    }

    /// Filter the file at `input` into `output`, which may be the same path.
    ///
    /// Parent directories of `output` are created as needed.
    ///
    /// # Errors
    ///
    /// Returns [`Error::ResourceNotFound`] if `input` does not exist.
    pub fn filter_file(&self, input: &Path, output: &Path, sources: &[PropertySource]) -> Result<()> {
        let in_place = fs_path::same_entry(input, output);
        tracing::debug!(?input, ?output, in_place, "Filtering file");
        let source = io::open_input(input)?;
        self.filter(source, io::output_factory(output), sources)
    }

    /// Filter `input` and return the decoded result.
    pub fn filter_to_string<R: Source>(&self, input: R, sources: &[PropertySource]) -> Result<String> {
        let mut buffer = Vec::new();
        self.filter(input, || Ok::<_, Error>(&mut buffer), sources)?;
        Ok(self.decode(&buffer).0.into_owned())
    }

    /// Filter the process's standard input to its standard output.
    pub fn filter_standard_streams(&self, sources: &[PropertySource]) -> Result<()> {
        self.filter(std::io::stdin(), || Ok::<_, Error>(std::io::stdout()), sources)
    }

    /// Decode `bytes`, reporting whether a BOM for this encoding was removed.
    fn decode<'a>(&self, bytes: &'a [u8]) -> (Cow<'a, str>, bool) {
        let has_bom = Encoding::for_bom(bytes).is_some_and(|(found, _)| found == self.encoding);
        let (text, had_errors) = self.encoding.decode_with_bom_removal(bytes);
        if had_errors {
            tracing::warn!(
                encoding = self.encoding.name(),
                "Malformed input bytes replaced while decoding"
            );
        }
        (text, has_bom)
    }

    /// Encode `line`, reporting whether any character was unmappable.
    ///
    /// UTF-16 is written as UTF-16 in the configured byte order.
    fn encode<'a>(&self, line: &'a str) -> (Cow<'a, [u8]>, bool) {
        if self.encoding == UTF_16LE {
            let bytes = line.encode_utf16().flat_map(u16::to_le_bytes).collect();
            return (Cow::Owned(bytes), false);
        }
        if self.encoding == UTF_16BE {
            let bytes = line.encode_utf16().flat_map(u16::to_be_bytes).collect();
            return (Cow::Owned(bytes), false);
        }
        let (bytes, _, had_errors) = self.encoding.encode(line);
        (bytes, had_errors)
    }

    fn bom(&self) -> &'static [u8] {
        if self.encoding == UTF_16LE {
            b"\xFF\xFE"
        } else if self.encoding == UTF_16BE {
            b"\xFE\xFF"
        } else if self.encoding == UTF_8 {
            b"\xEF\xBB\xBF"
        } else {
            b""
        }
    }

    fn write_lines<W: Sink>(&self, lines: &[String], has_bom: bool, mut sink: W) -> Result<()> {
        let outcome = self.write_all(lines, has_bom, &mut sink);
        io::close_quietly(sink);
        outcome
    }

    fn write_all<W: Write>(&self, lines: &[String], has_bom: bool, sink: &mut W) -> Result<()> {
        if has_bom {
            sink.write_all(self.bom())
                .map_err(|e| Error::io("writing filter output", e))?;
        }

        let mut unmappable = false;
        let mut line_buffer = String::new();

        for (index, line) in lines.iter().enumerate() {
            line_buffer.clear();
            line_buffer.push_str(line);
            line_buffer.push('\n');

            let (bytes, had_errors) = self.encode(&line_buffer);
            unmappable |= had_errors;
            sink.write_all(&bytes)
                .map_err(|e| Error::io("writing filter output", e))?;

            if (index + 1) % self.flush_line_threshold == 0 {
                sink.flush()
                    .map_err(|e| Error::io("flushing filter output", e))?;
            }
        }

        if unmappable {
            tracing::warn!(
                encoding = self.encoding.name(),
                "Characters not representable in the output encoding were escaped"
            );
        }
        sink.flush()
            .map_err(|e| Error::io("flushing filter output", e))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn sources() -> Vec<PropertySource> {
        vec![PropertySource::from_entries("test", [("name", "world")])]
    }

    #[test]
    fn every_line_gets_a_terminator() {
        let engine = LineFilterEngine::default();
        let out = engine
            .filter_to_string("hello ${name}\r\nbye".as_bytes(), &sources())
            .unwrap();
        assert_eq!(out, "hello world\nbye\n");
    }

    #[test]
    fn lone_carriage_return_ends_a_line() {
        let out = LineFilterEngine::default()
            .filter_to_string("a=${name}\rb=${name}\r".as_bytes(), &sources())
            .unwrap();
        assert_eq!(out, "a=world\nb=world\n");
    }

    #[test]
    fn empty_input_produces_empty_output() {
        let out = LineFilterEngine::default()
            .filter_to_string(&b""[..], &sources())
            .unwrap();
        assert_eq!(out, "");
    }

    #[test]
    fn zero_flush_threshold_is_rejected() {
        let err = LineFilterEngine::default()
            .with_flush_line_threshold(0)
            .unwrap_err();
        assert!(matches!(err, Error::Configuration { .. }));
    }

    #[test]
    fn unknown_encoding_is_rejected() {
        let err = LineFilterEngine::default()
            .with_encoding("klingon-8")
            .unwrap_err();
        assert!(matches!(err, Error::Configuration { .. }));
    }

    #[test]
    fn output_factory_not_called_when_resolution_fails() {
        let engine = LineFilterEngine::default();
        let looping = [PropertySource::from_entries("loop", [("a", "${a}")])];
        let mut called = false;

        let err = engine
            .filter(
                "${a}".as_bytes(),
                || {
                    called = true;
                    Ok::<_, Error>(Vec::new())
                },
                &looping,
            )
            .unwrap_err();

        assert!(matches!(err, Error::CircularPlaceholder { .. }));
        assert!(!called);
    }

    #[test]
    fn latin1_round_trip() {
        let engine = LineFilterEngine::default()
            .with_encoding("ISO-8859-1")
            .unwrap();
        let input: &[u8] = b"caf\xe9 ${name}";
        let out = engine.filter_to_string(input, &sources()).unwrap();
        assert_eq!(out, "caf\u{e9} world\n");
    }
}
