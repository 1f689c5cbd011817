//! # Freqtable: Token Frequency Tables for Source Repositories
//!
//! Freqtable clones a repository, parses its source files with tree-sitter
//! and drives a caller-supplied [`Miner`] over every syntax tree, producing
//! one word frequency map for the whole repository.
//!
//! ## Pipeline
//!
//! ```text
//! Cloner ─→ FileSelector ─→ ParseStage ─→ collect ─→ Miner
//! (clone,     (eligible       (one rayon     (all items   (sequential,
//!  list)       names)          task/file)     first)       pre-order)
//! ```
//!
//! - Retrieval failures end the extraction immediately
//! - Parse failures are recorded per file and judged by the [`ParsePolicy`]
//! - Mining only starts once every file has been parsed
//!
//! ## Quick Start
//!
//! ```no_run
//! use std::sync::Arc;
//!
//! use freqtable::{CountMiner, GitCloner, Processor, ProcessorConfig, factory_of};
//!
//! let config = ProcessorConfig::new(Arc::new(GitCloner::new()), factory_of::<CountMiner>());
//! let processor = Processor::new(config)?;
//!
//! let frequencies = processor.extract("https://github.com/eroatta/freqtable")?;
//! println!("{} distinct words", frequencies.len());
//! # Ok::<(), freqtable::Error>(())
//! ```
//!
//! The surrounding use case ([`CreateFrequencyTableUsecase`]) stores the
//! result through a [`FrequencyTableRepository`].

pub mod casing;
mod entity;
mod error;
mod mine;
pub mod miners;
mod parse;
mod processor;
pub mod retrieval;
mod select;
mod source;
pub mod storage;
mod usecase;

pub use entity::FrequencyTable;
pub use error::{Error, ParseError, ParseErrorKind, Result};
pub use mine::{FrequencyMap, Miner, MinerFactory, MiningStats, Visit, factory_of, mine, walk};
pub use miners::CountMiner;
pub use parse::{Cancellation, ParseHandle, ParseStage};
pub use processor::{Extraction, ExtractionStats, ParsePolicy, Processor, ProcessorConfig, Stage};
pub use retrieval::{
    ClonedRepository, Cloner, GitCloner, MemoryCloner, MemoryRepository, RepositoryDescriptor,
    RetrievalError,
};
pub use select::FileSelector;
pub use source::{Pos, Position, SourceFile, SourceItem, SourceSet};
pub use storage::{FrequencyTableRepository, InMemoryRepository, SqliteRepository};
pub use usecase::{CreateFrequencyTable, CreateFrequencyTableUsecase, WordCountExtractor};
