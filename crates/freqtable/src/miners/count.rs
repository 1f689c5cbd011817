//! Word counting over identifiers.

use tree_sitter::Node;

use crate::casing;
use crate::mine::{FrequencyMap, Miner, Visit};
use crate::source::SourceItem;

/// Node kinds whose text is an identifier in the Go grammar.
const IDENTIFIER_KINDS: &[&str] = &[
    "identifier",
    "field_identifier",
    "type_identifier",
    "package_identifier",
    "label_name",
];

/// Counts the words that make up every identifier.
///
/// Identifiers are split conservatively (see [`casing::split`]) and each
/// word is lower-cased before counting, so `parseFile` and `fileName` both
/// contribute to `file`.
#[derive(Debug, Clone, Default)]
pub struct CountMiner {
    counts: FrequencyMap,
}

impl CountMiner {
    /// Create a miner with no counts.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn count(&mut self, identifier: &str) {
        for word in casing::words(identifier) {
            *self.counts.entry(word).or_default() += 1;
        }
    }
}

impl Miner for CountMiner {
    fn name(&self) -> &str {
        "count"
    }

    fn visit(&mut self, node: Node<'_>, item: &SourceItem) -> Visit {
        if IDENTIFIER_KINDS.contains(&node.kind()) {
            match item.text(&node) {
                Some(text) => self.count(text),
                None => tracing::trace!(
                    file = item.name(),
                    byte_range = ?node.byte_range(),
                    "Skipping identifier that is not valid UTF-8"
                ),
            }
        }
        Visit::Children
    }

    fn results(self: Box<Self>) -> FrequencyMap {
        self.counts
    }
}
