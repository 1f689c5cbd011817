//! Extraction orchestrator.
//!
//! A [`Processor`] sequences one extraction through its stages:
//!
//! ```text
//! Idle → Retrieving → Parsing → Aggregating → Mining → Done
//!            │                       │
//!            └───────→ Failed ←──────┘
//! ```
//!
//! Retrieval must fully complete before parsing starts, and every item is
//! collected before the miner sees the first tree. Nothing is retried: a
//! failed extraction ends in [`Stage::Failed`] and reports a single error.

use std::fmt;
use std::str::FromStr;
use std::sync::Arc;
use std::sync::mpsc;

use rayon::ThreadPool;
use tracing::{debug, info, warn};

use crate::error::{Error, ParseError, ParseErrorKind, Result};
use crate::mine::{FrequencyMap, MinerFactory, mine};
use crate::parse::{Cancellation, ParseStage};
use crate::retrieval::{ClonedRepository, Cloner, RepositoryDescriptor, RetrievalError};
use crate::select::FileSelector;
use crate::source::{SourceItem, SourceSet};

/// Stage of an extraction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Stage {
    /// Not started.
    Idle,
    /// Cloning the repository and selecting eligible files.
    Retrieving,
    /// Parser stage running.
    Parsing,
    /// Every item collected; parse failures are being judged.
    Aggregating,
    /// Miner driven over the parsed trees.
    Mining,
    /// Finished with a frequency map.
    Done,
    /// Finished with an error.
    Failed,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Idle => "idle",
            Self::Retrieving => "retrieving",
            Self::Parsing => "parsing",
            Self::Aggregating => "aggregating",
            Self::Mining => "mining",
            Self::Done => "done",
            Self::Failed => "failed",
        };
        f.write_str(name)
    }
}

/// What recorded parse failures mean for the extraction.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ParsePolicy {
    /// Any failed file fails the extraction.
    #[default]
    Fatal,
    /// Failed files are logged and left out of mining.
    Tolerant,
    /// Fail only when files failed and none parsed.
    RequireAny,
}

impl fmt::Display for ParsePolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Fatal => f.write_str("fatal"),
            Self::Tolerant => f.write_str("tolerant"),
            Self::RequireAny => f.write_str("require-any"),
        }
    }
}

impl FromStr for ParsePolicy {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "fatal" => Ok(Self::Fatal),
            "tolerant" => Ok(Self::Tolerant),
            "require-any" | "require_any" => Ok(Self::RequireAny),
            other => Err(Error::Config(format!(
                "unknown parse policy '{other}' (expected fatal, tolerant or require-any)"
            ))),
        }
    }
}

/// Settings for a [`Processor`].
#[derive(Clone)]
pub struct ProcessorConfig {
    cloner: Arc<dyn Cloner>,
    miner: MinerFactory,
    selector: FileSelector,
    parse_policy: ParsePolicy,
    max_workers: Option<usize>,
    language: tree_sitter::Language,
}

impl ProcessorConfig {
    /// Configuration with the default selector (`.go` files), the Go
    /// grammar, the [`ParsePolicy::Fatal`] policy and no worker cap.
    #[must_use]
    pub fn new(cloner: Arc<dyn Cloner>, miner: MinerFactory) -> Self {
        Self {
            cloner,
            miner,
            selector: FileSelector::default(),
            parse_policy: ParsePolicy::default(),
            max_workers: None,
            language: tree_sitter_go::LANGUAGE.into(),
        }
    }

    /// Only files with one of these extensions are parsed.
    #[must_use]
    pub fn with_extensions<I, S>(mut self, extensions: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        self.selector = FileSelector::with_extensions(extensions);
        self
    }

    /// Replace the file selector.
    #[must_use]
    pub fn with_selector(mut self, selector: FileSelector) -> Self {
        self.selector = selector;
        self
    }

    /// Set the parse failure policy.
    #[must_use]
    pub fn with_parse_policy(mut self, policy: ParsePolicy) -> Self {
        self.parse_policy = policy;
        self
    }

    /// Cap the number of concurrent parse workers.
    ///
    /// Without a cap, parse tasks run on the global rayon pool.
    #[must_use]
    pub fn with_max_workers(mut self, max_workers: usize) -> Self {
        self.max_workers = Some(max_workers);
        self
    }

    /// Parse with a different tree-sitter grammar.
    #[must_use]
    pub fn with_language(mut self, language: tree_sitter::Language) -> Self {
        self.language = language;
        self
    }

    /// The configured parse policy.
    #[must_use]
    pub fn parse_policy(&self) -> ParsePolicy {
        self.parse_policy
    }

    /// The configured file selector.
    #[must_use]
    pub fn selector(&self) -> &FileSelector {
        &self.selector
    }
}

impl fmt::Debug for ProcessorConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ProcessorConfig")
            .field("selector", &self.selector)
            .field("parse_policy", &self.parse_policy)
            .field("max_workers", &self.max_workers)
            .finish_non_exhaustive()
    }
}

/// Counters describing one extraction.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct ExtractionStats {
    /// Files in the repository listing.
    pub files_listed: usize,
    /// Files that passed the selector.
    pub files_selected: usize,
    /// Items drained from the parser stage.
    pub items_collected: usize,
    /// Items whose tree the miner walked.
    pub items_mined: usize,
    /// Nodes handed to the miner.
    pub nodes_visited: usize,
    /// Parse failures left out of mining under a lenient policy.
    pub parse_errors_tolerated: usize,
}

/// Outcome of one extraction.
#[derive(Debug)]
pub struct Extraction {
    url: String,
    stage: Stage,
    repository: Option<RepositoryDescriptor>,
    stats: ExtractionStats,
    result: Result<FrequencyMap>,
}

impl Extraction {
    /// Locator the extraction ran against.
    #[must_use]
    pub fn url(&self) -> &str {
        &self.url
    }

    /// Final stage: [`Stage::Done`] or [`Stage::Failed`].
    #[must_use]
    pub fn stage(&self) -> Stage {
        self.stage
    }

    /// Descriptor of the cloned repository, if retrieval got that far.
    #[must_use]
    pub fn repository(&self) -> Option<&RepositoryDescriptor> {
        self.repository.as_ref()
    }

    /// Counters gathered along the way.
    #[must_use]
    pub fn stats(&self) -> &ExtractionStats {
        &self.stats
    }

    /// The frequency map, or the error that ended the extraction.
    ///
    /// # Errors
    ///
    /// Returns the error if the extraction failed.
    pub fn result(&self) -> std::result::Result<&FrequencyMap, &Error> {
        self.result.as_ref()
    }

    /// Consume the extraction and keep only its result.
    ///
    /// # Errors
    ///
    /// Returns the error if the extraction failed.
    pub fn into_result(self) -> Result<FrequencyMap> {
        self.result
    }
}

/// Bookkeeping for an extraction in flight.
struct Progress<'a> {
    url: &'a str,
    stage: Stage,
    repository: Option<RepositoryDescriptor>,
    stats: ExtractionStats,
}

impl<'a> Progress<'a> {
    fn new(url: &'a str) -> Self {
        Self {
            url,
            stage: Stage::Idle,
            repository: None,
            stats: ExtractionStats::default(),
        }
    }

    fn enter(&mut self, stage: Stage) {
        debug!(url = %self.url, from = %self.stage, to = %stage, "Extraction stage transition");
        self.stage = stage;
    }

    fn cancelled(&self) -> Error {
        Error::Cancelled {
            url: self.url.to_string(),
            stage: self.stage,
        }
    }

    fn retrieval(&self, source: RetrievalError) -> Error {
        Error::Retrieval {
            url: self.url.to_string(),
            source,
        }
    }

    fn finish(mut self, result: Result<FrequencyMap>) -> Extraction {
        match &result {
            Ok(frequencies) => {
                self.enter(Stage::Done);
                info!(
                    url = %self.url,
                    files = self.stats.files_selected,
                    mined = self.stats.items_mined,
                    tolerated = self.stats.parse_errors_tolerated,
                    words = frequencies.len(),
                    "Extraction completed"
                );
            }
            Err(e) => {
                let failed_in = e.stage().unwrap_or(self.stage);
                self.enter(Stage::Failed);
                info!(url = %self.url, stage = %failed_in, error = %e, "Extraction failed");
            }
        }

        Extraction {
            url: self.url.to_string(),
            stage: self.stage,
            repository: self.repository,
            stats: self.stats,
            result,
        }
    }
}

/// Runs extractions.
///
/// A processor is immutable and can run any number of extractions, one after
/// the other or concurrently. Every extraction gets a fresh miner and a fresh
/// [`SourceSet`].
#[derive(Debug)]
pub struct Processor {
    config: ProcessorConfig,
    pool: Option<Arc<ThreadPool>>,
}

impl Processor {
    /// Create a processor.
    ///
    /// # Errors
    ///
    /// Returns `Error::Config` if the worker cap is zero or the parse worker
    /// pool cannot be built.
    pub fn new(config: ProcessorConfig) -> Result<Self> {
        let pool = match config.max_workers {
            None => None,
            Some(0) => {
                return Err(Error::Config("max workers must be at least 1".to_string()));
            }
            Some(workers) => {
                let pool = rayon::ThreadPoolBuilder::new()
                    .num_threads(workers)
                    .thread_name(|i| format!("freqtable-parse-{i}"))
                    .build()
                    .map_err(|e| Error::Config(format!("cannot build parse worker pool: {e}")))?;
                Some(Arc::new(pool))
            }
        };

        Ok(Self { config, pool })
    }

    /// The processor's configuration.
    #[must_use]
    pub fn config(&self) -> &ProcessorConfig {
        &self.config
    }

    /// Extract the frequency map of the repository at `url`.
    ///
    /// # Errors
    ///
    /// Returns the error that ended the extraction; see [`Error::stage`].
    pub fn extract(&self, url: &str) -> Result<FrequencyMap> {
        self.run(url).into_result()
    }

    /// Run one extraction and report how it went.
    #[must_use]
    pub fn run(&self, url: &str) -> Extraction {
        self.run_with_cancellation(url, &Cancellation::new())
    }

    /// Run one extraction that stops early once `cancellation` is set.
    ///
    /// Cancellation is checked before retrieval, before parsing and after
    /// collection. A cancelled parser stage stops dispatching; files already
    /// dispatched are parsed and discarded.
    #[must_use]
    pub fn run_with_cancellation(&self, url: &str, cancellation: &Cancellation) -> Extraction {
        let mut progress = Progress::new(url);
        let result = self.execute(&mut progress, cancellation);
        progress.finish(result)
    }

    fn execute(
        &self,
        progress: &mut Progress<'_>,
        cancellation: &Cancellation,
    ) -> Result<FrequencyMap> {
        if cancellation.is_cancelled() {
            return Err(progress.cancelled());
        }

        progress.enter(Stage::Retrieving);
        let (repository, selected) = self.retrieve(progress)?;

        if cancellation.is_cancelled() {
            return Err(progress.cancelled());
        }

        progress.enter(Stage::Parsing);
        let items = self.parse(repository, &selected, cancellation)?;
        progress.stats.items_collected = items.len();

        progress.enter(Stage::Aggregating);
        if cancellation.is_cancelled() {
            return Err(progress.cancelled());
        }
        if items.len() != selected.len() {
            return Err(Error::Internal(format!(
                "collected {} items for {} selected files",
                items.len(),
                selected.len()
            )));
        }
        self.aggregate(progress, &items)?;

        progress.enter(Stage::Mining);
        let mut miner = (self.config.miner)();
        let mining = mine(&items, miner.as_mut());
        progress.stats.items_mined = mining.files_mined;
        progress.stats.nodes_visited = mining.nodes_visited;

        Ok(miner.results())
    }

    /// Clone, list and select.
    fn retrieve(
        &self,
        progress: &mut Progress<'_>,
    ) -> Result<(Arc<dyn ClonedRepository>, Vec<String>)> {
        let repository: Arc<dyn ClonedRepository> = Arc::from(
            self.config
                .cloner
                .clone_repository(progress.url)
                .map_err(|e| progress.retrieval(e))?,
        );
        progress.repository = Some(repository.descriptor().clone());

        let names = repository.filenames().map_err(|e| progress.retrieval(e))?;
        progress.stats.files_listed = names.len();

        let selected = self.config.selector.select(names);
        progress.stats.files_selected = selected.len();

        debug!(
            url = %progress.url,
            revision = %repository.descriptor().revision,
            listed = progress.stats.files_listed,
            selected = progress.stats.files_selected,
            "Repository retrieved"
        );

        Ok((repository, selected))
    }

    /// Feed the parser stage and collect every item.
    fn parse(
        &self,
        repository: Arc<dyn ClonedRepository>,
        selected: &[String],
        cancellation: &Cancellation,
    ) -> Result<Vec<SourceItem>> {
        let sources = Arc::new(SourceSet::new());
        let mut stage = ParseStage::new(self.config.language.clone(), Arc::clone(&sources))
            .with_cancellation(cancellation.clone());
        if let Some(pool) = &self.pool {
            stage = stage.with_pool(Arc::clone(pool));
        }

        let (names, input) = mpsc::channel();
        let handle = stage.spawn(repository, input);
        for name in selected {
            if names.send(name.clone()).is_err() {
                break;
            }
        }
        drop(names);

        let items = handle.collect()?;
        debug!(
            collected = items.len(),
            registered = sources.len(),
            "Parser stage drained"
        );
        Ok(items)
    }

    /// Judge the recorded failures against the parse policy.
    fn aggregate(&self, progress: &mut Progress<'_>, items: &[SourceItem]) -> Result<()> {
        if let Some(unreadable) = items
            .iter()
            .filter_map(SourceItem::error)
            .find(|e| e.kind == ParseErrorKind::Unreadable)
        {
            return Err(progress.retrieval(RetrievalError::Unreadable {
                name: unreadable.file.clone(),
                message: unreadable.message.clone(),
            }));
        }

        let errors: Vec<ParseError> = items.iter().filter_map(SourceItem::error).cloned().collect();
        if errors.is_empty() {
            return Ok(());
        }

        let parsed = items.len() - errors.len();
        let fatal = match self.config.parse_policy {
            ParsePolicy::Fatal => true,
            ParsePolicy::Tolerant => false,
            ParsePolicy::RequireAny => parsed == 0,
        };
        if fatal {
            return Err(Error::Parse {
                url: progress.url.to_string(),
                errors,
                total: items.len(),
            });
        }

        for error in &errors {
            warn!(
                url = %progress.url,
                file = %error.file,
                error = %error,
                "Skipping file that failed to parse"
            );
        }
        progress.stats.parse_errors_tolerated = errors.len();
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mine::factory_of;
    use crate::miners::CountMiner;
    use crate::retrieval::{MemoryCloner, MemoryRepository};
    use rstest::rstest;

    const URL: &str = "https://github.com/eroatta/freqtable";

    fn processor(files: &[(&str, &str)], policy: ParsePolicy) -> Processor {
        let repository = files
            .iter()
            .fold(MemoryRepository::new(), |repo, (name, content)| {
                repo.with_file(*name, *content)
            });
        processor_for(repository, policy)
    }

    fn processor_for(repository: MemoryRepository, policy: ParsePolicy) -> Processor {
        let cloner = MemoryCloner::new().with_repository(URL, repository);
        let config = ProcessorConfig::new(Arc::new(cloner), factory_of::<CountMiner>())
            .with_parse_policy(policy);
        Processor::new(config).expect("processor should build")
    }

    #[test]
    fn valid_file_is_mined() {
        let processor = processor(&[("a.go", "package main\n\nvar tok = 1\n")], ParsePolicy::Fatal);

        let extraction = processor.run(URL);

        assert_eq!(extraction.stage(), Stage::Done);
        let frequencies = extraction.result().expect("extraction should succeed");
        assert_eq!(frequencies.get("tok"), Some(&1));
        assert_eq!(frequencies.get("main"), Some(&1));
        assert_eq!(extraction.stats().items_mined, 1);
        assert!(extraction.stats().nodes_visited > 0);
    }

    #[test]
    fn invalid_file_fails_under_fatal_policy() {
        let processor = processor(&[("a.go", "not valid ???")], ParsePolicy::Fatal);

        let extraction = processor.run(URL);

        assert_eq!(extraction.stage(), Stage::Failed);
        let error = extraction.result().expect_err("extraction should fail");
        assert!(matches!(error, Error::Parse { errors, total: 1, .. } if errors.len() == 1));
        assert_eq!(error.stage(), Some(Stage::Aggregating));
    }

    #[test]
    fn invalid_file_is_left_out_under_tolerant_policy() {
        let processor = processor(
            &[
                ("a.go", "package valid\n"),
                ("b.go", "package broken\n\nfunc ??? {\n"),
            ],
            ParsePolicy::Tolerant,
        );

        let extraction = processor.run(URL);

        assert_eq!(extraction.stage(), Stage::Done);
        let frequencies = extraction.result().expect("extraction should succeed");
        assert_eq!(frequencies.get("valid"), Some(&1));
        assert!(!frequencies.contains_key("broken"));
        assert_eq!(extraction.stats().parse_errors_tolerated, 1);
        assert_eq!(extraction.stats().items_collected, 2);
        assert_eq!(extraction.stats().items_mined, 1);
    }

    #[test]
    fn unreachable_repository_fails_before_parsing() {
        let cloner = MemoryCloner::new();
        let config = ProcessorConfig::new(Arc::new(cloner), factory_of::<CountMiner>());
        let processor = Processor::new(config).expect("processor should build");

        let extraction = processor.run("https://example.com/missing");

        assert_eq!(extraction.stage(), Stage::Failed);
        assert!(extraction.repository().is_none());
        assert_eq!(extraction.stats(), &ExtractionStats::default());
        let error = extraction.result().expect_err("extraction should fail");
        assert_eq!(error.stage(), Some(Stage::Retrieving));
        assert_eq!(
            error.to_string(),
            "error cloning repository https://example.com/missing"
        );
    }

    #[test]
    fn listing_failure_is_a_retrieval_error() {
        let repository = MemoryRepository::new()
            .with_file("a.go", "package a")
            .with_listing_error("index is corrupt");
        let processor = processor_for(repository, ParsePolicy::Tolerant);

        let extraction = processor.run(URL);

        assert_eq!(extraction.stage(), Stage::Failed);
        assert!(extraction.repository().is_some());
        assert_eq!(extraction.stats().items_collected, 0);
        let error = extraction.result().expect_err("extraction should fail");
        assert!(matches!(error, Error::Retrieval { .. }));
    }

    #[test]
    fn unreadable_file_fails_regardless_of_policy() {
        let repository = MemoryRepository::new()
            .with_file("a.go", "package a")
            .with_unreadable_file("b.go");
        let processor = processor_for(repository, ParsePolicy::Tolerant);

        let error = processor.extract(URL).expect_err("extraction should fail");

        match error {
            Error::Retrieval {
                source: RetrievalError::Unreadable { name, .. },
                ..
            } => assert_eq!(name, "b.go"),
            other => panic!("expected unreadable file error, got {other:?}"),
        }
    }

    #[test]
    fn no_eligible_files_yields_empty_map() {
        let processor = processor(
            &[("README.md", "# freqtable"), ("Makefile", "all:")],
            ParsePolicy::Fatal,
        );

        let extraction = processor.run(URL);

        assert_eq!(extraction.stage(), Stage::Done);
        assert!(extraction.result().expect("extraction should succeed").is_empty());
        assert_eq!(extraction.stats().files_listed, 2);
        assert_eq!(extraction.stats().files_selected, 0);
    }

    #[rstest]
    #[case::one_parses(&[("a.go", "package a\n"), ("b.go", "package ???\n")], Stage::Done)]
    #[case::none_parse(&[("a.go", "package ???\n"), ("b.go", "func (\n")], Stage::Failed)]
    #[case::all_parse(&[("a.go", "package a\n")], Stage::Done)]
    fn require_any_fails_only_without_any_tree(
        #[case] files: &[(&str, &str)],
        #[case] expected: Stage,
    ) {
        let processor = processor(files, ParsePolicy::RequireAny);

        assert_eq!(processor.run(URL).stage(), expected);
    }

    #[test]
    fn extraction_is_idempotent() {
        let files: Vec<(String, String)> = (0..20)
            .map(|i| {
                let signature = "(reqCount int) int { return reqCount }";
                let source = format!("package pkg\n\nfunc handleRequest{i}{signature}\n");
                (format!("pkg/f{i}.go"), source)
            })
            .collect();
        let borrowed: Vec<(&str, &str)> = files
            .iter()
            .map(|(n, c)| (n.as_str(), c.as_str()))
            .collect();
        let processor = processor(&borrowed, ParsePolicy::Fatal);

        let first = processor.extract(URL).expect("first extraction");
        let second = processor.extract(URL).expect("second extraction");

        assert_eq!(first, second);
        assert_eq!(first["pkg"], 20);
        assert_eq!(first["req"], 40);
    }

    #[test]
    fn every_selected_file_is_collected() {
        let processor = processor(
            &[
                ("a.go", "package a\n"),
                ("b.go", "package ???\n"),
                ("c.go", "package c\n"),
                ("notes.txt", "not go"),
            ],
            ParsePolicy::Tolerant,
        );

        let extraction = processor.run(URL);

        assert_eq!(extraction.stats().files_listed, 4);
        assert_eq!(extraction.stats().files_selected, 3);
        assert_eq!(extraction.stats().items_collected, 3);
    }

    #[test]
    fn cancelled_before_start_never_retrieves() {
        let processor = processor(&[("a.go", "package a\n")], ParsePolicy::Fatal);
        let cancellation = Cancellation::new();
        cancellation.cancel();

        let extraction = processor.run_with_cancellation(URL, &cancellation);

        assert_eq!(extraction.stage(), Stage::Failed);
        assert!(extraction.repository().is_none());
        let error = extraction.result().expect_err("extraction should fail");
        assert!(matches!(error, Error::Cancelled { stage: Stage::Idle, .. }));
    }

    /// Cancels the extraction as soon as the first file is read.
    struct CancellingCloner {
        cancellation: Cancellation,
        files: usize,
    }

    struct CancellingRepository {
        descriptor: RepositoryDescriptor,
        cancellation: Cancellation,
        files: usize,
    }

    impl Cloner for CancellingCloner {
        fn clone_repository(
            &self,
            url: &str,
        ) -> std::result::Result<Box<dyn ClonedRepository>, RetrievalError> {
            Ok(Box::new(CancellingRepository {
                descriptor: RepositoryDescriptor::new(url, "cancel"),
                cancellation: self.cancellation.clone(),
                files: self.files,
            }))
        }
    }

    impl ClonedRepository for CancellingRepository {
        fn descriptor(&self) -> &RepositoryDescriptor {
            &self.descriptor
        }

        fn filenames(&self) -> std::result::Result<Vec<String>, RetrievalError> {
            Ok((0..self.files).map(|i| format!("f{i}.go")).collect())
        }

        fn file(&self, name: &str) -> std::result::Result<Vec<u8>, RetrievalError> {
            self.cancellation.cancel();
            Ok(format!("package {}\n", name.trim_end_matches(".go")).into_bytes())
        }
    }

    #[test]
    fn cancellation_during_parsing_fails_after_collection() {
        let cancellation = Cancellation::new();
        let cloner = CancellingCloner {
            cancellation: cancellation.clone(),
            files: 200,
        };
        let config = ProcessorConfig::new(Arc::new(cloner), factory_of::<CountMiner>());
        let processor = Processor::new(config).expect("processor should build");

        let extraction = processor.run_with_cancellation(URL, &cancellation);

        assert_eq!(extraction.stage(), Stage::Failed);
        assert!(extraction.repository().is_some());
        assert_eq!(extraction.stats().files_selected, 200);
        assert!(extraction.stats().items_collected >= 1);
        assert_eq!(extraction.stats().items_mined, 0);
        // Cancellation wins over the completeness check: never an internal error.
        let error = extraction.result().expect_err("extraction should fail");
        assert!(
            matches!(error, Error::Cancelled { stage: Stage::Aggregating, .. }),
            "unexpected error: {error:?}"
        );
        assert_eq!(error.stage(), Some(Stage::Aggregating));
    }

    #[test]
    fn worker_cap_runs_on_dedicated_pool() {
        let cloner = MemoryCloner::new().with_repository(
            URL,
            MemoryRepository::new()
                .with_file("a.go", "package a\n")
                .with_file("b.go", "package b\n"),
        );
        let config = ProcessorConfig::new(Arc::new(cloner), factory_of::<CountMiner>())
            .with_max_workers(1);
        let processor = Processor::new(config).expect("processor should build");

        let frequencies = processor.extract(URL).expect("extraction should succeed");

        assert_eq!(frequencies.len(), 2);
    }

    #[test]
    fn zero_workers_is_a_config_error() {
        let config = ProcessorConfig::new(Arc::new(MemoryCloner::new()), factory_of::<CountMiner>())
            .with_max_workers(0);

        assert!(matches!(Processor::new(config), Err(Error::Config(_))));
    }

    #[test]
    fn custom_extensions_select_other_files() {
        let cloner = MemoryCloner::new().with_repository(
            URL,
            MemoryRepository::new()
                .with_file("a.go", "package a\n")
                .with_file("b.gotmpl", "package b\n"),
        );
        let config = ProcessorConfig::new(Arc::new(cloner), factory_of::<CountMiner>())
            .with_extensions([".gotmpl"]);
        let processor = Processor::new(config).expect("processor should build");

        let frequencies = processor.extract(URL).expect("extraction should succeed");

        assert_eq!(frequencies.get("b"), Some(&1));
        assert!(!frequencies.contains_key("a"));
    }

    #[rstest]
    #[case("fatal", ParsePolicy::Fatal)]
    #[case("Tolerant", ParsePolicy::Tolerant)]
    #[case("require-any", ParsePolicy::RequireAny)]
    #[case("require_any", ParsePolicy::RequireAny)]
    fn parse_policy_from_str(#[case] input: &str, #[case] expected: ParsePolicy) {
        assert_eq!(input.parse::<ParsePolicy>().expect("valid policy"), expected);
    }

    #[test]
    fn unknown_parse_policy_is_rejected() {
        assert!(matches!("lenient".parse::<ParsePolicy>(), Err(Error::Config(_))));
    }

    #[test]
    fn stage_display_is_lower_case() {
        assert_eq!(Stage::Aggregating.to_string(), "aggregating");
        assert_eq!(ParsePolicy::RequireAny.to_string(), "require-any");
    }
}
