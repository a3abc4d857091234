//! Full selection runs

use crate::common::fixtures::clusters_of;
use crate::common::TestCorpus;
use crate::sieve;
use anyhow::Result;
use sieve_cli::run_select;
use sieve_core::CancelFlag;
use std::collections::HashSet;

#[test]
fn test_selection_spans_clusters() -> Result<()> {
    let corpus = TestCorpus::clustered(4, 5);
    let summary = run_select(&corpus.config(5, 3), &CancelFlag::new(), false)?;

    assert_eq!(summary.corpus_size, 20);
    assert_eq!(summary.selected.len(), 4);
    // One pick from each cluster
    assert_eq!(clusters_of(&summary.selected).len(), 4);
    assert_eq!(corpus.read_output(), summary.selected);
    Ok(())
}

#[test]
fn test_success_clears_checkpoint_and_keeps_cache() -> Result<()> {
    let corpus = TestCorpus::clustered(3, 4);
    run_select(&corpus.config(2, 9), &CancelFlag::new(), false)?;

    assert!(!corpus.checkpoint_path().exists());
    assert!(corpus.cache_path().exists());
    let output = corpus.read_output();
    assert_eq!(output.len(), 6);
    assert_eq!(output.iter().collect::<HashSet<_>>().len(), 6);
    Ok(())
}

#[test]
fn test_same_seed_reuses_cache_and_repeats_selection() -> Result<()> {
    let corpus = TestCorpus::clustered(3, 6);
    let config = corpus.config(3, 42);

    let first = run_select(&config, &CancelFlag::new(), false)?;
    let cache_bytes = std::fs::read(corpus.cache_path())?;

    let second = run_select(&config, &CancelFlag::new(), false)?;
    assert_eq!(first.selected, second.selected);
    // Load-only path does not rewrite the cache
    assert_eq!(std::fs::read(corpus.cache_path())?, cache_bytes);
    Ok(())
}

#[test]
fn test_sequential_matches_parallel() -> Result<()> {
    let corpus = TestCorpus::clustered(5, 4);
    let parallel = run_select(&corpus.config(4, 1), &CancelFlag::new(), false)?;

    let mut config = corpus.config(4, 1);
    config.parallel = false;
    let sequential = run_select(&config, &CancelFlag::new(), false)?;

    assert_eq!(parallel.selected, sequential.selected);
    Ok(())
}

#[test]
fn test_binary_select_writes_output() -> Result<()> {
    let corpus = TestCorpus::clustered(4, 5);
    let corpus_dir = corpus.corpus_dir();
    let cache = corpus.cache_path();
    let checkpoint = corpus.checkpoint_path();
    let output = corpus.output_path();

    sieve!(
        corpus.root(),
        "select",
        "-i",
        corpus_dir.to_str().unwrap(),
        "-t",
        "5",
        "--seed",
        "3",
        "--cache",
        cache.to_str().unwrap(),
        "--checkpoint",
        checkpoint.to_str().unwrap(),
        "-o",
        output.to_str().unwrap()
    )
    .assert_success()?;

    let chosen = corpus.read_output();
    assert_eq!(chosen.len(), 4);
    assert_eq!(clusters_of(&chosen).len(), 4);
    assert!(!checkpoint.exists());
    Ok(())
}

#[test]
fn test_binary_hash_then_select_from_cache() -> Result<()> {
    let corpus = TestCorpus::clustered(2, 5);
    let corpus_dir = corpus.corpus_dir();
    let cache = corpus.cache_path();

    sieve!(
        corpus.root(),
        "hash",
        "-i",
        corpus_dir.to_str().unwrap(),
        "--cache",
        cache.to_str().unwrap(),
        "-q"
    )
    .assert_success()?;
    assert!(cache.exists());

    // Corpus files removed: selection must come entirely from the cache
    for entry in std::fs::read_dir(&corpus_dir)? {
        std::fs::remove_dir_all(entry?.path())?;
    }
    let summary = run_select(&corpus.config(5, 0), &CancelFlag::new(), false)?;
    assert_eq!(summary.corpus_size, 10);
    assert_eq!(summary.selected.len(), 2);
    Ok(())
}

#[test]
fn test_binary_second_corpus_ignores_first_corpus() -> Result<()> {
    let corpus = TestCorpus::empty();
    for (dir, prefix) in [("a", "alpha"), ("b", "beta")] {
        let path = corpus.root().join(dir);
        std::fs::create_dir_all(&path)?;
        for i in 1..=5 {
            let body = format!("{} document number {} {}", prefix, i, prefix.repeat(i * 7));
            std::fs::write(path.join(format!("{}{}.txt", dir, i)), body)?;
        }
    }

    // Default config: no cache flag on either run
    sieve!(corpus.root(), "select", "-q", "-i", "a", "-t", "1", "--seed", "1", "-o", "outA.txt")
        .assert_success()?;
    sieve!(corpus.root(), "select", "-q", "-i", "b", "-t", "1", "--seed", "1", "-o", "outB.txt")
        .assert_success()?;

    let chosen: Vec<String> = std::fs::read_to_string(corpus.root().join("outB.txt"))?
        .lines()
        .map(str::to_string)
        .collect();
    assert_eq!(chosen.len(), 5);
    assert!(chosen.iter().all(|id| id.starts_with('b')));
    Ok(())
}
