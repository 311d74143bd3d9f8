/*!
 * Tests for document retrieval and storage of translated documents
 */

use booktrans::app_config::StorageConfig;
use booktrans::document_source::{DefaultDocumentSource, DocumentLocation, DocumentSource};
use booktrans::errors::SourceError;
use booktrans::storage::{object_key, BlobStore, LocalBlobStore};
use crate::common;

/// Local paths and file URLs are read from disk
#[tokio::test]
async fn test_defaultSource_withLocalFile_shouldReadDocument() -> anyhow::Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let path = common::create_test_file(temp_dir.path(), "book.tex", &common::sample_latex_document())?;

    let source = DefaultDocumentSource::default();
    let content = source.fetch(&path.to_string_lossy()).await?;

    assert_eq!(content, common::sample_latex_document());
    Ok(())
}

/// Unknown schemes are rejected before any I/O
#[test]
fn test_defaultSource_withUnsupportedScheme_shouldFail() {
    let source = DefaultDocumentSource::default();

    let error = tokio_test::assert_err!(tokio_test::block_on(source.fetch("s3://bucket/book.tex")));

    assert!(matches!(error, SourceError::UnsupportedLocation(_)));
}

/// Location parsing distinguishes remote and local documents
#[test]
fn test_documentLocation_parse_shouldClassifyLocations() {
    assert!(matches!(DocumentLocation::parse("http://example.com/a.tex"), Ok(DocumentLocation::Remote(_))));
    assert!(matches!(DocumentLocation::parse("./a.tex"), Ok(DocumentLocation::Local(_))));
    assert!(matches!(DocumentLocation::parse("file:///tmp/a.tex"), Ok(DocumentLocation::Local(_))));
}

/// Stored documents land under the configured directory with a timestamped key
#[tokio::test]
async fn test_localBlobStore_withConfig_shouldStoreUnderOutputDir() -> anyhow::Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let config = StorageConfig {
        output_dir: temp_dir.path().join("translations").to_string_lossy().to_string(),
        ..StorageConfig::default()
    };

    let store = LocalBlobStore::from_config(&config);
    let key = object_key(&config);
    let stored = store.put(&key, "\\section{Hello}", "application/x-tex").await?;

    assert_eq!(stored.key, key);
    let written = std::fs::read_to_string(temp_dir.path().join("translations").join(&key))?;
    assert_eq!(written, "\\section{Hello}");
    Ok(())
}
