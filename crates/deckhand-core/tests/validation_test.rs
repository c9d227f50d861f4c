//! Integration tests for media path validation.
//!
//! Exercises filename fallback and re-validation against a relocated
//! image directory, with real files on disk.

use std::fs;
use std::path::Path;

use deckhand_core::{Document, DocumentError, Media, Section, SubSection, Table};

fn document_with_media(image_dir: &Path, media_path: &str) -> Document {
    let mut doc = Document::new(image_dir);
    let mut section = Section::new("Results", "Findings");
    section
        .content
        .push(SubSection::new("Overview", "Numbers went up").into());
    section
        .content
        .push(Media::new(media_path, "results chart").into());
    doc.sections.push(section);
    doc
}

#[test]
fn validate_resolves_bare_filename_against_image_dir() {
    let dir = tempfile::tempdir().unwrap();
    fs::write(dir.path().join("chart.png"), b"png").unwrap();

    let mut doc = document_with_media(dir.path(), "chart.png");
    doc.validate_medias(None).unwrap();

    let resolved = doc.iter_medias().next().unwrap().media_path().unwrap();
    assert_eq!(resolved, dir.path().join("chart.png"));
}

#[test]
fn validate_is_idempotent() {
    let dir = tempfile::tempdir().unwrap();
    fs::write(dir.path().join("chart.png"), b"png").unwrap();

    let mut doc = document_with_media(dir.path(), "chart.png");
    doc.validate_medias(None).unwrap();
    let first = doc
        .iter_medias()
        .next()
        .unwrap()
        .media_path()
        .unwrap()
        .to_path_buf();

    doc.validate_medias(None).unwrap();
    let second = doc.iter_medias().next().unwrap().media_path().unwrap();
    assert_eq!(first, second.to_path_buf());
}

#[test]
fn validate_against_relocated_image_dir() {
    let old_dir = tempfile::tempdir().unwrap();
    fs::write(old_dir.path().join("chart.png"), b"png").unwrap();

    let mut doc = document_with_media(old_dir.path(), "chart.png");
    doc.validate_medias(None).unwrap();

    // move the file to a new directory, then re-validate against it
    let new_dir = tempfile::tempdir().unwrap();
    fs::rename(
        old_dir.path().join("chart.png"),
        new_dir.path().join("chart.png"),
    )
    .unwrap();

    doc.validate_medias(Some(new_dir.path())).unwrap();
    assert_eq!(doc.image_dir, new_dir.path());
    let resolved = doc.iter_medias().next().unwrap().media_path().unwrap();
    assert_eq!(resolved, new_dir.path().join("chart.png"));
}

#[test]
fn validate_fails_on_dangling_media() {
    let dir = tempfile::tempdir().unwrap();
    let mut doc = document_with_media(dir.path(), "missing.png");

    let err = doc.validate_medias(None).unwrap_err();
    assert!(matches!(err, DocumentError::MediaNotFound { .. }));
}

#[test]
fn validate_fails_on_missing_image_dir() {
    let dir = tempfile::tempdir().unwrap();
    let mut doc = document_with_media(dir.path(), "chart.png");

    let err = doc
        .validate_medias(Some(Path::new("/no/such/dir")))
        .unwrap_err();
    assert!(matches!(err, DocumentError::ImageDirNotFound { .. }));
}

#[test]
fn validate_skips_tables_without_snapshots() {
    let dir = tempfile::tempdir().unwrap();
    let mut doc = Document::new(dir.path());
    let mut section = Section::new("Data", "Tabular results");
    section
        .content
        .push(Table::new("| a | b |\n|---|---|\n| 1 | 2 |", "raw numbers").into());
    doc.sections.push(section);

    doc.validate_medias(None).unwrap();
    assert!(doc.iter_medias().next().unwrap().media_path().is_none());
}

#[test]
fn serialized_document_round_trips_through_json() {
    let dir = tempfile::tempdir().unwrap();
    fs::write(dir.path().join("chart.png"), b"png").unwrap();

    let mut doc = document_with_media(dir.path(), "chart.png");
    doc.metadata
        .insert("title".to_string(), "Quarterly".to_string());
    doc.validate_medias(None).unwrap();

    let json = serde_json::to_string_pretty(&doc).unwrap();
    let mut back: Document = serde_json::from_str(&json).unwrap();

    assert_eq!(back.metadata["title"], "Quarterly");
    assert_eq!(back.len(), doc.len());
    // a deserialized document validates cleanly against the same dir
    back.validate_medias(None).unwrap();
}
