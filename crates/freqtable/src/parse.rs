//! Concurrent parser stage and collector.
//!
//! ## Architecture
//!
//! ```text
//! ┌───────────────────────────────────────────────────────────────────┐
//! │  Caller                │  Dispatcher thread     │  rayon workers   │
//! │  ──────                │  ─────────────────     │  ─────────────   │
//! │  send names ───────────┼→ recv() name           │                  │
//! │  drop sender           │  spawn task ───────────┼→ read bytes      │
//! │                        │  ...                   │  register in set │
//! │                        │  wait for all tasks    │  parse           │
//! │  collect() ←───────────┼────────────────────────┼─ send SourceItem │
//! │  join dispatcher       │  drop output sender    │                  │
//! └───────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Every name received yields exactly one [`SourceItem`]; completion order
//! is whatever the workers produce. The output channel closes only after the
//! last dispatched task has sent its item.
//!
//! [`ParseHandle::collect`] is the collector: it drains the output into one
//! `Vec` and only returns once the stage has finished.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc::{self, Receiver, Sender};
use std::thread::{self, JoinHandle};

use rayon::ThreadPool;
use tracing::{debug, trace};

use crate::error::{Error, ParseError, ParseErrorKind, Result};
use crate::retrieval::ClonedRepository;
use crate::source::{SourceFile, SourceItem, SourceSet};

/// Cooperative cancellation flag shared between a caller and an extraction.
///
/// Cancelling stops the parser stage from dispatching further files; parses
/// already dispatched run to completion.
#[derive(Debug, Clone, Default)]
pub struct Cancellation {
    cancelled: Arc<AtomicBool>,
}

impl Cancellation {
    /// Create a flag that is not cancelled.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Request cancellation.
    pub fn cancel(&self) {
        self.cancelled.store(true, Ordering::SeqCst);
    }

    /// Returns `true` once [`cancel`](Self::cancel) has been called.
    #[must_use]
    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::SeqCst)
    }
}

/// Converts raw file contents into syntax trees, one task per file.
#[derive(Clone)]
pub struct ParseStage {
    language: tree_sitter::Language,
    sources: Arc<SourceSet>,
    pool: Option<Arc<ThreadPool>>,
    cancellation: Cancellation,
}

impl ParseStage {
    /// Create a stage parsing with `language` into the shared `sources`.
    #[must_use]
    pub fn new(language: tree_sitter::Language, sources: Arc<SourceSet>) -> Self {
        Self {
            language,
            sources,
            pool: None,
            cancellation: Cancellation::new(),
        }
    }

    /// Run parse tasks on `pool` instead of the global rayon pool.
    #[must_use]
    pub fn with_pool(mut self, pool: Arc<ThreadPool>) -> Self {
        self.pool = Some(pool);
        self
    }

    /// Stop dispatching once `cancellation` is set.
    #[must_use]
    pub fn with_cancellation(mut self, cancellation: Cancellation) -> Self {
        self.cancellation = cancellation;
        self
    }

    /// Start the stage.
    ///
    /// Names are read from `names` until its sender is dropped (or the stage
    /// is cancelled); contents are read from `repository` by the workers.
    #[must_use]
    pub fn spawn(
        self,
        repository: Arc<dyn ClonedRepository>,
        names: Receiver<String>,
    ) -> ParseHandle {
        let (sender, items) = mpsc::channel();

        let dispatcher = thread::spawn(move || self.dispatch(&repository, names, sender));

        ParseHandle { items, dispatcher }
    }

    /// Dispatcher thread body.
    ///
    /// Returns the number of dispatched files once every task has finished.
    /// `sender` is dropped on return, which closes the output channel as soon
    /// as the last worker has dropped its clone.
    // Receiver is consumed by the loop, Sender dropped on return.
    #[allow(clippy::needless_pass_by_value)]
    fn dispatch(
        &self,
        repository: &Arc<dyn ClonedRepository>,
        names: Receiver<String>,
        sender: Sender<SourceItem>,
    ) -> usize {
        let body = move |scope: &rayon::Scope<'_>| {
            let mut dispatched = 0;
            for name in names {
                if self.cancellation.is_cancelled() {
                    debug!(dispatched, "Parser stage cancelled, closing input");
                    break;
                }
                dispatched += 1;

                let repository = Arc::clone(repository);
                let sources = Arc::clone(&self.sources);
                let language = self.language.clone();
                let sender = sender.clone();
                scope.spawn(move |_| {
                    let item = parse_file(&*repository, &sources, &language, name);
                    if let Err(e) = sender.send(item) {
                        trace!(file = %e.0.name(), "Collector went away, dropping item");
                    }
                });
            }
            dispatched
        };

        let dispatched = match &self.pool {
            Some(pool) => pool.scope(body),
            None => rayon::scope(body),
        };

        debug!(dispatched, "Parser stage finished");
        dispatched
    }
}

/// Running parser stage.
///
/// Dropping the handle without collecting lets the stage run to completion
/// in the background; its items are discarded.
pub struct ParseHandle {
    items: Receiver<SourceItem>,
    dispatcher: JoinHandle<usize>,
}

impl ParseHandle {
    /// Drain every item the stage produces, blocking until it finishes.
    ///
    /// # Errors
    ///
    /// Returns `Error::Internal` if a parse worker or the dispatcher panicked.
    pub fn collect(self) -> Result<Vec<SourceItem>> {
        let items: Vec<SourceItem> = self.items.into_iter().collect();

        match self.dispatcher.join() {
            Ok(dispatched) => {
                trace!(dispatched, collected = items.len(), "Collector drained stage");
                Ok(items)
            }
            Err(panic_payload) => {
                let msg = if let Some(s) = panic_payload.downcast_ref::<&str>() {
                    format!("Parser stage panicked: {s}")
                } else if let Some(s) = panic_payload.downcast_ref::<String>() {
                    format!("Parser stage panicked: {s}")
                } else {
                    "Parser stage panicked with unknown payload".to_string()
                };
                tracing::error!(panic_msg = %msg, "Parser stage thread panicked");
                Err(Error::Internal(msg))
            }
        }
    }
}

/// Read, register and parse one file.
fn parse_file(
    repository: &dyn ClonedRepository,
    sources: &SourceSet,
    language: &tree_sitter::Language,
    name: String,
) -> SourceItem {
    let raw = match repository.file(&name) {
        Ok(raw) => raw,
        Err(e) => {
            let error = ParseError::unreadable(name.clone(), &e);
            return SourceItem::failed(name, Vec::new(), None, error);
        }
    };

    let file = sources.add_file(&name, &raw);
    match parse_tree(&file, &raw, language) {
        Ok(tree) => {
            trace!(file = %name, bytes = raw.len(), "Parsed file");
            SourceItem::parsed(name, raw, file, tree)
        }
        Err(error) => {
            trace!(file = %name, error = %error, "File failed to parse");
            SourceItem::failed(name, raw, Some(file), error)
        }
    }
}

/// Parse `raw` and turn an erroneous tree into a [`ParseError`].
fn parse_tree(
    file: &SourceFile,
    raw: &[u8],
    language: &tree_sitter::Language,
) -> std::result::Result<tree_sitter::Tree, ParseError> {
    let mut parser = tree_sitter::Parser::new();
    parser
        .set_language(language)
        .map_err(|e| ParseError::new(file.name(), ParseErrorKind::Parser, e.to_string()))?;

    let tree = parser.parse(raw, None).ok_or_else(|| {
        ParseError::new(
            file.name(),
            ParseErrorKind::Parser,
            "parser produced no tree",
        )
    })?;

    if tree.root_node().has_error() {
        return Err(first_syntax_error(&tree, file, raw));
    }
    if language.id_for_node_kind(PACKAGE_CLAUSE, true) != 0 {
        check_package_clause(&tree, file)?;
    }

    Ok(tree)
}

/// Node kind of a package clause, in grammars that have one.
const PACKAGE_CLAUSE: &str = "package_clause";

/// Grammars with package clauses accept files without one; the language doesn't.
fn check_package_clause(
    tree: &tree_sitter::Tree,
    file: &SourceFile,
) -> std::result::Result<(), ParseError> {
    let root = tree.root_node();
    let mut cursor = root.walk();
    let first = root
        .named_children(&mut cursor)
        .find(|node| node.kind() != "comment");

    match first {
        Some(node) if node.kind() == PACKAGE_CLAUSE => Ok(()),
        Some(node) => Err(ParseError::syntax(
            file.position(node.start_byte()),
            format!("expected `package`, found `{}`", node.kind()),
        )),
        None => Err(ParseError::syntax(
            file.position(file.size()),
            "expected `package`, found end of file",
        )),
    }
}

/// Longest snippet of offending source quoted in a syntax error.
const MAX_SNIPPET_LEN: usize = 32;

/// Describe the first ERROR or MISSING node in pre-order.
fn first_syntax_error(tree: &tree_sitter::Tree, file: &SourceFile, raw: &[u8]) -> ParseError {
    let mut cursor = tree.walk();
    loop {
        let node = cursor.node();
        if node.is_missing() {
            return ParseError::syntax(
                file.position(node.start_byte()),
                format!("missing `{}`", node.kind()),
            );
        }
        if node.is_error() {
            let text = String::from_utf8_lossy(&raw[node.byte_range()]);
            let first_line = text.lines().next().unwrap_or_default().trim();
            let snippet: String = first_line.chars().take(MAX_SNIPPET_LEN).collect();
            return ParseError::syntax(
                file.position(node.start_byte()),
                format!("unexpected `{snippet}`"),
            );
        }

        // Only descend into subtrees that contain the error.
        if node.has_error() && cursor.goto_first_child() {
            continue;
        }
        loop {
            if cursor.goto_next_sibling() {
                break;
            }
            if !cursor.goto_parent() {
                return ParseError::syntax(file.position(0), "invalid syntax");
            }
        }
    }
}
