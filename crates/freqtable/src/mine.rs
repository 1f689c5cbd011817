//! Visitor contract and traversal driver.
//!
//! A [`Miner`] is a stateful visitor supplied by the caller. The driver owns
//! the walk: it visits every node of a tree in deterministic pre-order and
//! asks the miner, node by node, whether to descend into the children.
//! Items without a tree are skipped entirely.
//!
//! Miners accumulate across files and are driven sequentially by a single
//! thread; they need `Send` (to be created on one thread and driven on
//! another) but never `Sync`.

use std::collections::HashMap;
use std::sync::Arc;

use tree_sitter::Node;

use crate::source::SourceItem;

/// Token to occurrence count. No ordering guarantee.
pub type FrequencyMap = HashMap<String, u64>;

/// Creates a fresh miner for every extraction.
pub type MinerFactory = Arc<dyn Fn() -> Box<dyn Miner> + Send + Sync>;

/// Factory for a miner type that starts out as its `Default` value.
#[must_use]
pub fn factory_of<M: Miner + Default + 'static>() -> MinerFactory {
    Arc::new(|| -> Box<dyn Miner> { Box::new(M::default()) })
}

/// What the driver should do after visiting a node.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Visit {
    /// Keep going with the same miner into the node's children.
    Children,
    /// Prune: don't visit this node's children.
    Skip,
}

/// A caller-supplied analysis pass over syntax trees.
pub trait Miner: Send {
    /// Stable label identifying the miner.
    fn name(&self) -> &str;

    /// Called once per node, in pre-order, for every parsed item.
    fn visit(&mut self, node: Node<'_>, item: &SourceItem) -> Visit;

    /// Accumulated mapping.
    ///
    /// Consumes the miner: results are read exactly once, after every item
    /// has been visited.
    fn results(self: Box<Self>) -> FrequencyMap;
}

/// Counters reported by [`mine`].
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct MiningStats {
    /// Items whose tree was walked.
    pub files_mined: usize,
    /// Items skipped because they carry no tree.
    pub files_skipped: usize,
    /// Total calls to [`Miner::visit`].
    pub nodes_visited: usize,
}

/// Walk one item's tree in pre-order.
///
/// Returns the number of visited nodes; zero if the item has no tree.
pub fn walk(item: &SourceItem, miner: &mut dyn Miner) -> usize {
    let Some(tree) = item.tree() else {
        return 0;
    };

    let mut visited = 0;
    let mut cursor = tree.walk();
    loop {
        visited += 1;
        let descend = miner.visit(cursor.node(), item) == Visit::Children;
        if descend && cursor.goto_first_child() {
            continue;
        }

        loop {
            if cursor.goto_next_sibling() {
                break;
            }
            if !cursor.goto_parent() {
                return visited;
            }
        }
    }
}

/// Drive `miner` over every item that carries a tree.
pub fn mine(items: &[SourceItem], miner: &mut dyn Miner) -> MiningStats {
    let mut stats = MiningStats::default();

    for item in items {
        if !item.is_parsed() {
            stats.files_skipped += 1;
            continue;
        }
        stats.nodes_visited += walk(item, miner);
        stats.files_mined += 1;
    }

    tracing::debug!(
        miner = miner.name(),
        files = stats.files_mined,
        skipped = stats.files_skipped,
        nodes = stats.nodes_visited,
        "Mining pass completed"
    );

    stats
}
