//! Source position tracking and generated-code mapping.
//!
//! This crate provides the span types shared by every layer of the lowering
//! compiler, the table that maps generated code back to the template it came
//! from, and the [`CodeWriter`] used by the emitters.

mod writer;

pub use writer::{CodeWriter, LinePragma};

use smol_str::SmolStr;
use std::fmt;

/// A region of a source document.
///
/// Lines and characters are 0-indexed; `absolute_index` is a byte offset.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "camelCase"))]
pub struct SourceSpan {
    /// Path of the document the span belongs to, if known.
    pub file_path: Option<SmolStr>,
    /// Byte offset of the first character.
    pub absolute_index: u32,
    /// Line of the first character.
    pub line_index: u32,
    /// Column of the first character.
    pub character_index: u32,
    /// Length in bytes.
    pub length: u32,
}

impl SourceSpan {
    /// Create a span with an associated file.
    pub fn new(
        file_path: impl Into<SmolStr>,
        absolute_index: u32,
        line_index: u32,
        character_index: u32,
        length: u32,
    ) -> Self {
        Self {
            file_path: Some(file_path.into()),
            absolute_index,
            line_index,
            character_index,
            length,
        }
    }

    /// Create a span from a start location and a length.
    pub fn at(file_path: Option<SmolStr>, start: SourceLocation, length: u32) -> Self {
        Self {
            file_path,
            absolute_index: start.absolute_index,
            line_index: start.line_index,
            character_index: start.character_index,
            length,
        }
    }

    /// The location of the first character.
    pub fn start(&self) -> SourceLocation {
        SourceLocation {
            absolute_index: self.absolute_index,
            line_index: self.line_index,
            character_index: self.character_index,
        }
    }

    /// Byte offset one past the last character.
    #[inline]
    pub const fn end_index(&self) -> u32 {
        self.absolute_index + self.length
    }

    /// Check whether a byte offset falls inside the span.
    #[inline]
    pub const fn contains_offset(&self, offset: u32) -> bool {
        self.absolute_index <= offset && offset < self.absolute_index + self.length
    }
}

impl fmt::Display for SourceSpan {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}({},{})",
            self.file_path.as_deref().unwrap_or("<unknown>"),
            self.line_index + 1,
            self.character_index + 1
        )
    }
}

/// A single position in a document.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SourceLocation {
    /// Byte offset.
    pub absolute_index: u32,
    /// 0-indexed line.
    pub line_index: u32,
    /// 0-indexed column.
    pub character_index: u32,
}

impl SourceLocation {
    /// Create a new location.
    #[inline]
    pub const fn new(absolute_index: u32, line_index: u32, character_index: u32) -> Self {
        Self {
            absolute_index,
            line_index,
            character_index,
        }
    }

    /// Location after `text` has been written starting here.
    pub fn advance(self, text: &str) -> Self {
        let mut location = self;
        for c in text.chars() {
            location.absolute_index += c.len_utf8() as u32;
            if c == '\n' {
                location.line_index += 1;
                location.character_index = 0;
            } else {
                location.character_index += 1;
            }
        }
        location
    }
}

/// A line index for converting byte offsets in a template into spans.
#[derive(Debug, Clone)]
pub struct LineIndex {
    /// Byte offsets of the start of each line.
    line_starts: Vec<u32>,
    /// Total length of the source.
    len: u32,
}

impl LineIndex {
    /// Create a new line index from source text.
    pub fn new(text: &str) -> Self {
        let mut line_starts = vec![0];
        for (i, c) in text.char_indices() {
            if c == '\n' {
                line_starts.push((i + 1) as u32);
            }
        }
        Self {
            line_starts,
            len: text.len() as u32,
        }
    }

    /// Location of a byte offset, clamped to the end of the text.
    pub fn location(&self, offset: u32) -> SourceLocation {
        let offset = offset.min(self.len);
        let line = self
            .line_starts
            .partition_point(|&start| start <= offset)
            .saturating_sub(1);
        SourceLocation::new(offset, line as u32, offset - self.line_starts[line])
    }

    /// Build a span covering `start..end` in `file_path`.
    pub fn span(&self, file_path: Option<SmolStr>, start: u32, end: u32) -> SourceSpan {
        let start = self.location(start);
        let end = end.clamp(start.absolute_index, self.len);
        SourceSpan::at(file_path, start, end - start.absolute_index)
    }

    /// Get the number of lines.
    pub fn line_count(&self) -> usize {
        self.line_starts.len()
    }
}

/// A mapping from a span of generated code back to the template.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SourceMapping {
    /// Where the text came from.
    pub original: SourceSpan,
    /// Where the text was written in the generated document.
    pub generated: SourceSpan,
}

/// Source mappings of one generated document, ordered by generated offset.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SourceMap {
    mappings: Vec<SourceMapping>,
}

impl SourceMap {
    /// Create a new empty source map.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a mapping, keeping the table sorted by generated offset.
    pub fn add_mapping(&mut self, mapping: SourceMapping) {
        let pos = self.mappings.partition_point(|m| {
            m.generated.absolute_index <= mapping.generated.absolute_index
        });
        self.mappings.insert(pos, mapping);
    }

    /// Find the mapping covering a generated offset.
    pub fn find_original(&self, generated_offset: u32) -> Option<&SourceMapping> {
        let idx = self
            .mappings
            .partition_point(|m| m.generated.absolute_index <= generated_offset);
        self.mappings[..idx]
            .iter()
            .rev()
            .find(|m| m.generated.contains_offset(generated_offset))
    }

    /// Map a generated offset to an offset in the original document.
    pub fn to_original_offset(&self, generated_offset: u32) -> Option<u32> {
        self.find_original(generated_offset).map(|m| {
            let delta = generated_offset - m.generated.absolute_index;
            m.original.absolute_index + delta.min(m.original.length.saturating_sub(1))
        })
    }

    /// Get all mappings.
    pub fn mappings(&self) -> &[SourceMapping] {
        &self.mappings
    }

    /// Check if the source map is empty.
    pub fn is_empty(&self) -> bool {
        self.mappings.is_empty()
    }

    /// Get the number of mappings.
    pub fn len(&self) -> usize {
        self.mappings.len()
    }
}
