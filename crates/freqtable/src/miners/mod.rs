//! Built-in miners.
//!
//! Each miner implements [`Miner`](crate::Miner). Callers are free to bring
//! their own; nothing in the pipeline depends on this module.

pub mod count;

pub use count::CountMiner;
