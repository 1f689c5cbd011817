//! Source files, their parsed trees, and the shared position space.
//!
//! Every file parsed during one extraction is registered in a single
//! [`SourceSet`], which hands out a disjoint range of global offsets per
//! file. A [`Pos`] therefore identifies a byte in any file of the extraction
//! and can be turned back into a human-readable [`Position`].
//!
//! ```text
//!  base=1          base=14               base=40
//!  ├── a.go (12) ──┤├── b.go (25) ──────┤├── c.go ...
//! ```
//!
//! Registration is append-only: a file's range and line table never change
//! once written, so workers can register files concurrently.

// Byte offsets are usize in tree-sitter; positions are stored as u32 for
// compactness. No practical source file has 4 billion lines.
#![allow(clippy::cast_possible_truncation)]

use std::sync::{Arc, PoisonError, RwLock};

use tree_sitter::{Node, Tree};

use crate::error::ParseError;

/// A byte offset in the global position space of a [`SourceSet`].
///
/// `Pos(0)` is never assigned to a file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Pos(pub usize);

impl Pos {
    /// The "no position" value.
    pub const NONE: Pos = Pos(0);

    /// Returns `true` if this position may belong to a file.
    #[must_use]
    pub fn is_valid(self) -> bool {
        self != Self::NONE
    }
}

/// A resolved position: file name, 1-based line and column (in bytes).
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Position {
    /// Name of the file.
    pub file: String,
    /// Line number (1-indexed).
    pub line: u32,
    /// Column number (1-indexed, counted in bytes).
    pub column: u32,
}

impl std::fmt::Display for Position {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}:{}:{}", self.file, self.line, self.column)
    }
}

/// A file registered in a [`SourceSet`].
#[derive(Debug)]
pub struct SourceFile {
    name: String,
    base: usize,
    size: usize,
    /// Byte offset of the first byte of every line.
    line_starts: Vec<usize>,
}

impl SourceFile {
    fn new(name: &str, base: usize, content: &[u8]) -> Self {
        let line_starts = std::iter::once(0)
            .chain(
                content
                    .iter()
                    .enumerate()
                    .filter(|&(_, b)| *b == b'\n')
                    .map(|(i, _)| i + 1),
            )
            .collect();

        Self {
            name: name.to_string(),
            base,
            size: content.len(),
            line_starts,
        }
    }

    /// Name the file was registered under.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// First global offset of this file.
    #[must_use]
    pub fn base(&self) -> usize {
        self.base
    }

    /// Size of the file in bytes.
    #[must_use]
    pub fn size(&self) -> usize {
        self.size
    }

    /// Number of lines in the file.
    #[must_use]
    pub fn line_count(&self) -> usize {
        self.line_starts.len()
    }

    /// Global position of a byte offset within this file.
    ///
    /// Offsets past the end are clamped to the end-of-file position.
    #[must_use]
    pub fn pos(&self, offset: usize) -> Pos {
        Pos(self.base + offset.min(self.size))
    }

    /// Returns `true` if `pos` falls inside this file (end-of-file included).
    #[must_use]
    pub fn contains(&self, pos: Pos) -> bool {
        (self.base..=self.base + self.size).contains(&pos.0)
    }

    /// Resolve a byte offset within this file.
    #[must_use]
    pub fn position(&self, offset: usize) -> Position {
        let offset = offset.min(self.size);
        let line = self.line_starts.partition_point(|&start| start <= offset);
        let column = offset - self.line_starts[line - 1];

        Position {
            file: self.name.clone(),
            line: line as u32,
            column: column as u32 + 1,
        }
    }
}

/// Shared position bookkeeping for all files of one extraction.
///
/// Cheap to share behind an [`Arc`]; registration takes a short write lock.
#[derive(Debug, Default)]
pub struct SourceSet {
    files: RwLock<Vec<Arc<SourceFile>>>,
}

impl SourceSet {
    /// Create an empty set.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a file and allocate its range of global offsets.
    ///
    /// Ranges are allocated in registration order and leave one offset of
    /// padding after each file, so end-of-file positions stay unambiguous.
    pub fn add_file(&self, name: &str, content: &[u8]) -> Arc<SourceFile> {
        let mut files = self.files.write().unwrap_or_else(PoisonError::into_inner);
        let base = files.last().map_or(1, |last| last.base + last.size + 1);
        let file = Arc::new(SourceFile::new(name, base, content));
        files.push(Arc::clone(&file));
        file
    }

    /// Number of registered files.
    #[must_use]
    pub fn len(&self) -> usize {
        self.files
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    /// Returns `true` if no file has been registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Find the file a global position belongs to.
    #[must_use]
    pub fn file(&self, pos: Pos) -> Option<Arc<SourceFile>> {
        if !pos.is_valid() {
            return None;
        }

        let files = self.files.read().unwrap_or_else(PoisonError::into_inner);
        let index = files.partition_point(|f| f.base <= pos.0);
        let candidate = files.get(index.checked_sub(1)?)?;
        candidate.contains(pos).then(|| Arc::clone(candidate))
    }

    /// Resolve a global position to file, line and column.
    #[must_use]
    pub fn position(&self, pos: Pos) -> Option<Position> {
        let file = self.file(pos)?;
        Some(file.position(pos.0 - file.base))
    }
}

/// One file of a repository after the parser stage.
///
/// Exactly one of tree and error is present: a tree when parsing succeeded,
/// an error when it didn't. Items never change after creation.
#[derive(Debug)]
pub struct SourceItem {
    name: String,
    raw: Vec<u8>,
    file: Option<Arc<SourceFile>>,
    outcome: Result<Tree, ParseError>,
}

impl SourceItem {
    /// An item whose contents parsed into `tree`.
    #[must_use]
    pub fn parsed(name: String, raw: Vec<u8>, file: Arc<SourceFile>, tree: Tree) -> Self {
        Self {
            name,
            raw,
            file: Some(file),
            outcome: Ok(tree),
        }
    }

    /// An item that failed to be read or parsed.
    ///
    /// `file` is `None` when the contents were never read.
    #[must_use]
    pub fn failed(
        name: String,
        raw: Vec<u8>,
        file: Option<Arc<SourceFile>>,
        error: ParseError,
    ) -> Self {
        Self {
            name,
            raw,
            file,
            outcome: Err(error),
        }
    }

    /// File name, unique within the repository.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Raw contents (empty if the file could not be read).
    #[must_use]
    pub fn raw(&self) -> &[u8] {
        &self.raw
    }

    /// Registration in the extraction's [`SourceSet`], if the file was read.
    #[must_use]
    pub fn source_file(&self) -> Option<&Arc<SourceFile>> {
        self.file.as_ref()
    }

    /// The syntax tree, present only when parsing succeeded.
    #[must_use]
    pub fn tree(&self) -> Option<&Tree> {
        self.outcome.as_ref().ok()
    }

    /// The recorded error, present only when parsing failed.
    #[must_use]
    pub fn error(&self) -> Option<&ParseError> {
        self.outcome.as_ref().err()
    }

    /// Returns `true` if the item carries a tree.
    #[must_use]
    pub fn is_parsed(&self) -> bool {
        self.outcome.is_ok()
    }

    /// Text of `node`, or `None` if it is not valid UTF-8.
    #[must_use]
    pub fn text<'a>(&'a self, node: &Node<'_>) -> Option<&'a str> {
        node.utf8_text(&self.raw).ok()
    }

    /// Global position of the first byte of `node`.
    #[must_use]
    pub fn pos(&self, node: &Node<'_>) -> Pos {
        self.file
            .as_ref()
            .map_or(Pos::NONE, |file| file.pos(node.start_byte()))
    }

    /// Resolved position of the first byte of `node`.
    #[must_use]
    pub fn position(&self, node: &Node<'_>) -> Option<Position> {
        self.file
            .as_ref()
            .map(|file| file.position(node.start_byte()))
    }
}
