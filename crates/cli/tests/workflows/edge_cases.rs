//! Corpus-size and configuration edge cases

use crate::common::TestCorpus;
use crate::sieve;
use anyhow::Result;
use sieve_cli::run_select;
use sieve_core::{CancelFlag, IdentifierMode};

#[test]
fn test_divisor_larger_than_corpus_writes_empty_output() -> Result<()> {
    let corpus = TestCorpus::clustered(1, 3);
    let summary = run_select(&corpus.config(5, 0), &CancelFlag::new(), false)?;

    assert!(summary.selected.is_empty());
    assert!(corpus.output_path().exists());
    assert!(corpus.read_output().is_empty());
    Ok(())
}

#[test]
fn test_single_file_divisor_one() -> Result<()> {
    let corpus = TestCorpus::empty();
    corpus.write("only.txt", b"the one and only document");

    let summary = run_select(&corpus.config(1, 0), &CancelFlag::new(), false)?;
    assert_eq!(summary.selected, vec!["only.txt"]);
    Ok(())
}

#[test]
fn test_empty_corpus_is_an_error() {
    let corpus = TestCorpus::empty();
    let err = run_select(&corpus.config(1, 0), &CancelFlag::new(), false).unwrap_err();

    assert!(err.to_string().contains("empty"));
    assert!(!corpus.output_path().exists());
}

#[test]
fn test_corrupt_cache_is_rebuilt() -> Result<()> {
    let corpus = TestCorpus::clustered(2, 5);
    std::fs::write(corpus.cache_path(), b"garbage")?;

    let summary = run_select(&corpus.config(5, 4), &CancelFlag::new(), false)?;
    assert_eq!(summary.corpus_size, 10);
    assert!(sieve_core::store::load(&corpus.cache_path()).is_ok());
    Ok(())
}

#[test]
fn test_basename_collisions_overwrite() -> Result<()> {
    let corpus = TestCorpus::empty();
    corpus.write("left/same.txt", b"left side document body");
    corpus.write("right/same.txt", b"right side document body");
    corpus.write("unique.txt", b"a file with a unique name");

    let mut config = corpus.config(1, 0);
    config.identifier = IdentifierMode::Basename;
    let summary = run_select(&config, &CancelFlag::new(), false)?;

    assert_eq!(summary.corpus_size, 2);
    let mut chosen = summary.selected.clone();
    chosen.sort();
    assert_eq!(chosen, vec!["same.txt", "unique.txt"]);
    Ok(())
}

#[test]
fn test_flat_enumeration_ignores_subdirectories() -> Result<()> {
    let corpus = TestCorpus::clustered(2, 2);
    corpus.write("top.txt", b"top level document");

    let mut config = corpus.config(1, 0);
    config.recursive = false;
    let summary = run_select(&config, &CancelFlag::new(), false)?;
    assert_eq!(summary.selected, vec!["top.txt"]);
    Ok(())
}

#[test]
fn test_binary_rejects_zero_divisor() -> Result<()> {
    let corpus = TestCorpus::clustered(1, 2);
    let corpus_dir = corpus.corpus_dir();

    let result = sieve!(
        corpus.root(),
        "select",
        "-i",
        corpus_dir.to_str().unwrap(),
        "-t",
        "0",
        "--no-cache"
    )
    .assert_failure()?;

    assert!(result.contains_stderr("times_less"));
    assert!(!corpus.root().join("chosen_files.txt").exists());
    Ok(())
}

#[test]
fn test_binary_rejects_missing_input_dir() -> Result<()> {
    let corpus = TestCorpus::empty();
    let result = sieve!(corpus.root(), "select", "-i", "does-not-exist", "--no-cache")
        .assert_failure()?;

    assert!(result.contains_stderr("does-not-exist"));
    Ok(())
}
