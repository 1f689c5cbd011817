//! Terminal output of the `extract` command.

use std::io::{self, Write};

use colored::Colorize;
use freqtable::{Extraction, FrequencyMap};

/// What to print.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OutputOptions {
    /// Words shorter than this (in characters) are left out.
    pub min_word_len: usize,
    /// Print at most this many words.
    pub limit: Option<usize>,
}

impl Default for OutputOptions {
    /// Hides single-letter words, prints everything else.
    fn default() -> Self {
        Self {
            min_word_len: 2,
            limit: None,
        }
    }
}

/// Words by descending count, ties broken alphabetically.
#[must_use]
pub fn ranked<'a>(frequencies: &'a FrequencyMap, options: &OutputOptions) -> Vec<(&'a str, u64)> {
    let mut words: Vec<(&str, u64)> = frequencies
        .iter()
        .filter(|(word, _)| word.chars().count() >= options.min_word_len)
        .map(|(word, times)| (word.as_str(), *times))
        .collect();
    words.sort_unstable_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(b.0)));
    if let Some(limit) = options.limit {
        words.truncate(limit);
    }
    words
}

/// Print a summary of `extraction` followed by its ranked words.
///
/// # Errors
///
/// Returns any error from writing to `out`.
pub fn write_extraction(
    out: &mut impl Write,
    extraction: &Extraction,
    options: &OutputOptions,
) -> io::Result<()> {
    let revision = extraction
        .repository()
        .map_or_else(|| "unknown revision".to_string(), |r| r.revision.clone());
    writeln!(
        out,
        "{} {} ({})",
        "Frequency table for".bold(),
        extraction.url().bold(),
        revision.dimmed()
    )?;

    let stats = extraction.stats();
    writeln!(
        out,
        "{} files listed, {} selected, {} mined, {} skipped",
        stats.files_listed, stats.files_selected, stats.items_mined, stats.parse_errors_tolerated
    )?;

    let Ok(frequencies) = extraction.result() else {
        return Ok(());
    };

    let words = ranked(frequencies, options);
    let width = words
        .iter()
        .map(|(_, times)| times.to_string().len())
        .max()
        .unwrap_or(1);
    writeln!(out)?;
    for (word, times) in &words {
        writeln!(out, "{}  {word}", format!("{times:>width$}").cyan())?;
    }
    writeln!(
        out,
        "\n{} distinct words, {} shown",
        frequencies.len(),
        words.len()
    )?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use freqtable::{
        CountMiner, MemoryCloner, MemoryRepository, Processor, ProcessorConfig, factory_of,
    };

    fn frequencies() -> FrequencyMap {
        FrequencyMap::from([
            ("table".to_string(), 3),
            ("frequency".to_string(), 2),
            ("word".to_string(), 3),
            ("i".to_string(), 9),
        ])
    }

    #[test]
    fn single_letters_are_hidden_by_default() {
        let frequencies = frequencies();

        let words = ranked(&frequencies, &OutputOptions::default());

        assert_eq!(words, vec![("table", 3), ("word", 3), ("frequency", 2)]);
    }

    #[test]
    fn limit_and_min_length_apply() {
        let frequencies = frequencies();
        let options = OutputOptions {
            min_word_len: 1,
            limit: Some(2),
        };

        assert_eq!(ranked(&frequencies, &options), vec![("i", 9), ("table", 3)]);
    }

    #[test]
    fn extraction_is_printed_with_summary() {
        colored::control::set_override(false);
        let url = "https://github.com/eroatta/freqtable";
        let cloner = MemoryCloner::new().with_repository(
            url,
            MemoryRepository::new()
                .with_revision("4f2a9c1")
                .with_file("main.go", "package main\n\nvar tableWord, x = 1, 2\n"),
        );
        let config = ProcessorConfig::new(Arc::new(cloner), factory_of::<CountMiner>());
        let extraction = Processor::new(config).expect("processor").run(url);
        let mut out = Vec::new();

        write_extraction(&mut out, &extraction, &OutputOptions::default()).expect("write");

        let text = String::from_utf8(out).expect("UTF-8 output");
        assert!(text.starts_with(&format!("Frequency table for {url} (4f2a9c1)")));
        assert!(text.contains("1 files listed, 1 selected, 1 mined, 0 skipped"));
        assert!(text.contains("1  table\n"));
        assert!(!text.contains("  x\n"));
        assert!(text.contains("4 distinct words, 3 shown"));
    }
}
