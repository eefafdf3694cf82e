//! Byte-offset to line/column mapping.

/// Precomputed line starts for a source text.
///
/// Lines and columns are 1-based; columns count characters, not bytes,
/// so diagnostics align on non-ASCII source.
#[derive(Clone, Debug)]
pub struct LineOffsetTable {
    /// Byte offset of the start of each line.
    line_starts: Vec<u32>,
}

impl LineOffsetTable {
    pub fn new(source: &str) -> Self {
        let mut line_starts = vec![0u32];
        for (i, b) in source.bytes().enumerate() {
            if b == b'\n' {
                line_starts.push(u32::try_from(i + 1).unwrap_or(u32::MAX));
            }
        }
        LineOffsetTable { line_starts }
    }

    /// The 1-based line containing a byte offset.
    pub fn line(&self, offset: u32) -> u32 {
        match self.line_starts.binary_search(&offset) {
            Ok(idx) => u32::try_from(idx + 1).unwrap_or(u32::MAX),
            Err(idx) => u32::try_from(idx).unwrap_or(u32::MAX),
        }
    }

    /// The 1-based (line, column) of a byte offset.
    pub fn line_col(&self, source: &str, offset: u32) -> (u32, u32) {
        let line = self.line(offset);
        let start = self.line_starts[(line - 1) as usize];
        let slice = &source[start as usize..(offset as usize).min(source.len())];
        let col = u32::try_from(slice.chars().count() + 1).unwrap_or(u32::MAX);
        (line, col)
    }

    /// Byte offset of the start of a 1-based line.
    pub fn line_start(&self, line: u32) -> Option<u32> {
        self.line_starts.get((line.checked_sub(1)?) as usize).copied()
    }

    /// The text of a 1-based line, without its newline.
    pub fn line_text<'a>(&self, source: &'a str, line: u32) -> Option<&'a str> {
        let start = self.line_start(line)? as usize;
        let rest = source.get(start..)?;
        Some(rest.split('\n').next().unwrap_or(rest).trim_end_matches('\r'))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn maps_offsets_to_lines() {
        let src = "ab\ncd\nef";
        let table = LineOffsetTable::new(src);
        assert_eq!(table.line_col(src, 0), (1, 1));
        assert_eq!(table.line_col(src, 1), (1, 2));
        assert_eq!(table.line_col(src, 3), (2, 1));
        assert_eq!(table.line_col(src, 7), (3, 2));
    }

    #[test]
    fn line_text_strips_newline() {
        let src = "first\nsecond\n";
        let table = LineOffsetTable::new(src);
        assert_eq!(table.line_text(src, 1), Some("first"));
        assert_eq!(table.line_text(src, 2), Some("second"));
    }
}
