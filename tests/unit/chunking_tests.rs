/*!
 * Tests for splitting documents into units and stitching units into batches
 */

use booktrans::errors::TranslationError;
use booktrans::translation::{Assembler, ChunkSplitter, OverlapStitcher, Unit};
use crate::common;
use crate::common::mock_providers::CharTokenizer;

fn texts(units: &[Unit]) -> Vec<&str> {
    units.iter().map(|u| u.text.as_str()).collect()
}

/// Every unit stays under the hard ceiling
#[test]
fn test_split_withLongParagraph_shouldRespectHardCeiling() {
    let tokenizer = CharTokenizer;
    let paragraph = "x".repeat(95);
    let splitter = ChunkSplitter::new(&tokenizer, 10, "\n\n");

    let units = splitter.split(&paragraph).unwrap();

    assert!(units.iter().all(|u| u.token_count <= 10));
    assert!(units.iter().all(|u| u.token_count == u.text.chars().count()));
    assert_eq!(units.iter().map(|u| u.text.as_str()).collect::<String>(), paragraph);
}

/// Splitting happens at the character midpoint, regardless of word boundaries
#[test]
fn test_split_withOversizedParagraph_shouldBisectAtMidpoint() {
    let tokenizer = CharTokenizer;
    let splitter = ChunkSplitter::new(&tokenizer, 5, "\n\n");

    let units = splitter.split("abcdefgh\n\nok").unwrap();

    assert_eq!(texts(&units), vec!["abcd", "efgh", "ok"]);
}

/// Paragraphs under the ceiling are kept whole, in order
#[test]
fn test_split_withShortParagraphs_shouldKeepParagraphs() {
    let tokenizer = CharTokenizer;
    let splitter = ChunkSplitter::new(&tokenizer, 100, "\n\n");

    let units = splitter.split(&common::sample_latex_document()).unwrap();

    assert_eq!(units.len(), 3);
    assert!(units[0].text.starts_with(r"\section{"));
    assert!(units[2].text.ends_with("real."));
}

/// A character that alone exceeds the ceiling cannot be split
#[test]
fn test_split_withCeilingBelowOneCharacter_shouldFail() {
    let tokenizer = CharTokenizer;
    let splitter = ChunkSplitter::new(&tokenizer, 0, "\n\n");

    assert!(matches!(
        splitter.split("abc"),
        Err(TranslationError::FragmentTooLarge { limit: 0, .. })
    ));
}

/// Batch contents never exceed the soft ceiling
#[test]
fn test_stitch_withVariousCeilings_shouldRespectSoftCeiling() {
    let tokenizer = CharTokenizer;
    let document = common::lettered_paragraphs(12, 3);
    let units = ChunkSplitter::new(&tokenizer, 10, "\n\n").split(&document).unwrap();

    for max_len in [3, 5, 8, 13, 40] {
        let batches = OverlapStitcher::new(&tokenizer, max_len, 4, "\n\n").stitch(&units).unwrap();
        for batch in &batches {
            assert!(batch.token_count <= max_len, "batch {} over {}", batch.index, max_len);
        }
    }
}

/// Every batch after the first carries overlap, the first never does
#[test]
fn test_stitch_withOverlap_shouldPrefixAllButFirstBatch() {
    let tokenizer = CharTokenizer;
    let units = ChunkSplitter::new(&tokenizer, 10, "\n\n")
        .split(&common::lettered_paragraphs(6, 4))
        .unwrap();

    let batches = OverlapStitcher::new(&tokenizer, 4, 3, "\n\n").stitch(&units).unwrap();

    assert_eq!(batches.len(), 6);
    assert!(batches[0].overlap.is_none());
    for batch in &batches[1..] {
        let overlap = batch.overlap.as_deref().unwrap_or("");
        assert!(!overlap.is_empty());
        assert!(overlap.chars().count() <= 3);
        assert!(batch.text().ends_with(&batch.content));
    }
    assert_eq!(batches[1].overlap.as_deref(), Some("aaa"));
    assert_eq!(batches[1].text(), "aaa\n\nbbbb");
}

/// Zero overlap produces no prefixes at all
#[test]
fn test_stitch_withZeroOverlap_shouldNotPrefix() {
    let tokenizer = CharTokenizer;
    let units = ChunkSplitter::new(&tokenizer, 10, "\n\n")
        .split(&common::lettered_paragraphs(4, 4))
        .unwrap();

    let batches = OverlapStitcher::new(&tokenizer, 4, 0, "\n\n").stitch(&units).unwrap();

    assert!(batches.iter().all(|b| b.overlap.is_none()));
}

/// Joining batch contents gives back the original document
#[test]
fn test_stitch_thenAssemble_shouldPreserveOrder() {
    let tokenizer = CharTokenizer;
    let document = format!("{}\n\n\n\n{}", common::sample_latex_document(), common::lettered_paragraphs(5, 7));
    let units = ChunkSplitter::new(&tokenizer, 100, "\n\n").split(&document).unwrap();
    let batches = OverlapStitcher::new(&tokenizer, 120, 5, "\n\n").stitch(&units).unwrap();

    let contents: Vec<&str> = batches.iter().map(|b| b.content.as_str()).collect();
    let indices: Vec<usize> = batches.iter().map(|b| b.index).collect();

    assert_eq!(Assembler::new("\n\n").assemble(&contents), document);
    assert_eq!(indices, (0..batches.len()).collect::<Vec<_>>());
    assert_eq!(batches.iter().map(|b| b.unit_count).sum::<usize>(), units.len());
}

/// A unit over the soft ceiling becomes its own batch without an empty one in front
#[test]
fn test_stitch_withOversizedFirstUnit_shouldNotEmitEmptyBatch() {
    let tokenizer = CharTokenizer;
    let units = vec![Unit::new("abcdefgh", 8), Unit::new("ij", 2)];

    let batches = OverlapStitcher::new(&tokenizer, 5, 0, "\n\n").stitch(&units).unwrap();

    assert_eq!(batches.len(), 2);
    assert_eq!(batches[0].content, "abcdefgh");
    assert_eq!(batches[0].unit_count, 1);
    assert_eq!(batches[1].content, "ij");
}

/// An empty document still yields one (blank) batch
#[test]
fn test_stitch_withEmptyDocument_shouldYieldSingleBlankBatch() {
    let tokenizer = CharTokenizer;
    let units = ChunkSplitter::new(&tokenizer, 10, "\n\n").split("").unwrap();
    let batches = OverlapStitcher::new(&tokenizer, 10, 2, "\n\n").stitch(&units).unwrap();

    assert_eq!(batches.len(), 1);
    assert!(batches[0].is_blank());
}
