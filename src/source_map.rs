//! Source text storage and per-line slicing for diagnostics.
//!
//! A [`SourceMap`] owns the raw text of a single compiled file together with
//! the byte offset of the start of each line, computed once up front so that
//! error reporting can turn a `(line, column)` pair back into the text of
//! that line without re-scanning the file.

/// A file's source text plus a line-offset index for diagnostics.
#[derive(Debug, Clone)]
pub struct SourceMap {
    /// Path as given on the command line, or a synthetic name for in-memory sources.
    path: String,
    /// Full source text, with CRLF already normalized to LF.
    text: String,
    /// Byte offset of the first character of each line (1-indexed lines, so
    /// `line_starts[0]` is always 0).
    line_starts: Vec<usize>,
}

impl SourceMap {
    /// Builds a source map for `text`, normalizing `\r\n` to `\n` as the
    /// lexer does internally for line counting.
    pub fn new(path: impl Into<String>, text: impl Into<String>) -> Self {
        let text = text.into().replace("\r\n", "\n");
        let mut line_starts = vec![0];
        for (i, ch) in text.char_indices() {
            if ch == '\n' {
                line_starts.push(i + 1);
            }
        }
        Self {
            path: path.into(),
            text,
            line_starts,
        }
    }

    /// The path this source was read from.
    pub fn path(&self) -> &str {
        &self.path
    }

    /// The full normalized source text.
    pub fn text(&self) -> &str {
        &self.text
    }

    /// Returns the text of the given 1-based line number, without the
    /// trailing newline.
    pub fn line(&self, line: u32) -> &str {
        let idx = (line as usize).saturating_sub(1);
        let Some(&start) = self.line_starts.get(idx) else {
            return "";
        };
        let end = self
            .line_starts
            .get(idx + 1)
            .map(|&s| s - 1)
            .unwrap_or(self.text.len());
        self.text[start..end.max(start)].trim_end_matches('\n')
    }

    /// Total number of lines in the source.
    pub fn line_count(&self) -> usize {
        self.line_starts.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn slices_single_line() {
        let sm = SourceMap::new("a.svgs", "hello world");
        assert_eq!(sm.line(1), "hello world");
        assert_eq!(sm.line(2), "");
    }

    #[test]
    fn slices_multiple_lines() {
        let sm = SourceMap::new("a.svgs", "one\ntwo\nthree");
        assert_eq!(sm.line(1), "one");
        assert_eq!(sm.line(2), "two");
        assert_eq!(sm.line(3), "three");
    }

    #[test]
    fn normalizes_crlf() {
        let sm = SourceMap::new("a.svgs", "one\r\ntwo\r\n");
        assert_eq!(sm.line(1), "one");
        assert_eq!(sm.line(2), "two");
        assert_eq!(sm.line_count(), 3);
    }
}
