//! Integration tests for the comparer engine.
//!
//! These tests drive the public API end to end:
//! - Discovery, comparison and extraction through `ImageComparer`
//! - Full runs with reconciliation, review and cancellation
//! - The single-flight guard

use assert_fs::prelude::*;
use duplicate_image_comparer::core::pipeline::{
    ComparerProperties, ComparerSettings, ImageComparer, Reconciliation, ReviewDecision,
    RunOutcome, RunRequest,
};
use duplicate_image_comparer::core::scanner::ScanMode;
use duplicate_image_comparer::error::ComparerError;
use duplicate_image_comparer::events::{
    null_sender, Event, EventChannel, PipelineEvent, PipelineStage, PropertyName,
};
use image::{Rgb, RgbImage};
use predicates::prelude::*;
use std::path::{Path, PathBuf};

fn gradient() -> RgbImage {
    RgbImage::from_fn(64, 64, |x, y| {
        let v = (x * 4) as u8;
        Rgb([v, v, (y * 2) as u8])
    })
}

fn write_image(path: &Path, image: &RgbImage) -> PathBuf {
    image.save(path).unwrap();
    path.to_path_buf()
}

fn solid(path: &Path, value: u8) -> PathBuf {
    write_image(path, &RgbImage::from_pixel(20, 20, Rgb([value, 255 - value, 64])))
}

fn comparer(perceptual: bool, pixel: bool) -> ImageComparer {
    ImageComparer::with_settings(
        ComparerSettings {
            perceptual_hash: perceptual,
            pixel_by_pixel: pixel,
            ..Default::default()
        },
        null_sender(),
    )
}

#[test]
fn empty_directory_has_no_duplicates() {
    let temp = assert_fs::TempDir::new().unwrap();
    let comparer = comparer(true, true);

    let files = comparer.load_files(&[temp.path().to_path_buf()]).unwrap();
    comparer.set_input(files).unwrap();
    let result = comparer.process().unwrap();

    assert!(result.grouping.is_empty());
    assert!(result.duplicates.is_empty());
}

#[test]
fn corrupt_files_are_skipped_not_fatal() {
    let temp = assert_fs::TempDir::new().unwrap();
    temp.child("corrupt.jpg")
        .write_binary(b"this is not a valid image file")
        .unwrap();
    solid(temp.child("a.png").path(), 10);
    solid(temp.child("b.png").path(), 10);
    let comparer = comparer(false, true);

    let files = comparer.load_files(&[temp.path().to_path_buf()]).unwrap();
    comparer.set_input(files).unwrap();
    let result = comparer.process().unwrap();

    assert_eq!(result.skipped.len(), 1);
    assert!(result.skipped[0].path.ends_with("corrupt.jpg"));
    assert_eq!(result.duplicates, vec![temp.child("b.png").path().to_path_buf()]);
}

#[test]
fn nonexistent_root_fails_discovery() {
    let comparer = comparer(true, true);

    let result = comparer.load_files(&[PathBuf::from("/nonexistent/path/that/does/not/exist")]);

    assert!(matches!(result, Err(ComparerError::Scan(_))));
    assert!(!comparer.is_processing());
}

#[test]
fn disabled_algorithms_find_nothing() {
    let temp = assert_fs::TempDir::new().unwrap();
    let files: Vec<_> = (0..4)
        .map(|i| solid(temp.child(format!("{}.png", i)).path(), 1))
        .collect();
    let comparer = comparer(false, false);
    comparer.set_input(files).unwrap();

    let result = comparer.process().unwrap();

    assert_eq!(result.grouping.len(), 4);
    assert!(result.duplicates.is_empty());
}

#[test]
fn perceptual_and_pixel_refine_each_other() {
    let temp = assert_fs::TempDir::new().unwrap();
    let a = write_image(temp.child("a.png").path(), &gradient());
    let b = write_image(temp.child("b.png").path(), &gradient());
    let mut near = gradient();
    near.put_pixel(32, 32, Rgb([129, 129, 64]));
    let d = write_image(temp.child("d.png").path(), &near);
    let files = vec![a, b.clone(), d];

    let perceptual = comparer(true, false);
    perceptual.set_input(files.clone()).unwrap();
    let loose = perceptual.process().unwrap();
    assert_eq!(loose.duplicates.len(), 2, "d should be perceptually similar to a");

    let both = comparer(true, true);
    both.set_input(files).unwrap();
    let strict = both.process().unwrap();

    assert_eq!(strict.grouping.len(), 2);
    assert_eq!(strict.duplicates, vec![b]);
}

#[test]
fn flat_mode_ignores_subdirectories() {
    let temp = assert_fs::TempDir::new().unwrap();
    temp.child("nested").create_dir_all().unwrap();
    solid(temp.child("a.png").path(), 1);
    solid(temp.child("nested/b.png").path(), 1);
    let comparer = comparer(false, true);
    comparer.set_mode(ScanMode::NotRecursive).unwrap();

    let files = comparer.load_files(&[temp.path().to_path_buf()]).unwrap();

    assert_eq!(files.len(), 1);
}

#[test]
fn full_run_deletes_duplicates_only() {
    let temp = assert_fs::TempDir::new().unwrap();
    solid(temp.child("a.png").path(), 7);
    solid(temp.child("b.png").path(), 7);
    solid(temp.child("c.png").path(), 7);
    solid(temp.child("unique.png").path(), 200);
    let comparer = comparer(false, true);

    let outcome = comparer
        .run(
            RunRequest::new(vec![temp.path().to_path_buf()]).reconcile(Reconciliation::Delete),
            |_| {},
        )
        .unwrap()
        .wait()
        .unwrap();

    match outcome {
        RunOutcome::Completed { summary, .. } => {
            assert_eq!(summary.total_files, 4);
            assert_eq!(summary.duplicate_groups, 1);
            assert_eq!(summary.reconciled, 2);
        }
        other => panic!("Expected completion, got {:?}", other),
    }
    temp.child("a.png").assert(predicate::path::exists());
    temp.child("b.png").assert(predicate::path::missing());
    temp.child("c.png").assert(predicate::path::missing());
    temp.child("unique.png").assert(predicate::path::exists());
}

#[test]
fn full_run_emits_stages_in_order() {
    let temp = assert_fs::TempDir::new().unwrap();
    solid(temp.child("a.png").path(), 3);
    let (sender, receiver) = EventChannel::new();
    let comparer = ImageComparer::with_events(sender);

    comparer
        .run(RunRequest::new(vec![temp.path().to_path_buf()]), |_| {})
        .unwrap()
        .wait()
        .unwrap();
    drop(comparer);

    let events: Vec<Event> = receiver.iter().collect();
    let stages: Vec<_> = events
        .iter()
        .filter_map(|e| match e {
            Event::Pipeline(PipelineEvent::StageCompleted { stage }) => Some(*stage),
            _ => None,
        })
        .collect();
    assert_eq!(
        stages,
        vec![
            PipelineStage::Discovery,
            PipelineStage::Comparison,
            PipelineStage::Review,
            PipelineStage::Reconciliation,
        ]
    );
    let processing_changes = events
        .iter()
        .filter(|e| matches!(e, Event::Property(c) if c.name == PropertyName::Processing))
        .count();
    assert_eq!(processing_changes, 2);
}

#[test]
fn declined_run_keeps_every_file() {
    let temp = assert_fs::TempDir::new().unwrap();
    let dest = assert_fs::TempDir::new().unwrap();
    solid(temp.child("a.png").path(), 9);
    solid(temp.child("b.png").path(), 9);
    let comparer = comparer(false, true);

    let outcome = comparer
        .run(
            RunRequest::new(vec![temp.path().to_path_buf()])
                .reconcile(Reconciliation::MoveTo(dest.path().to_path_buf()))
                .review(|_| ReviewDecision::Cancel),
            |_| {},
        )
        .unwrap()
        .wait()
        .unwrap();

    assert!(matches!(outcome, RunOutcome::Declined { .. }));
    temp.child("b.png").assert(predicate::path::exists());
    dest.child("b.png").assert(predicate::path::missing());
    assert!(!comparer.is_processing());
}

#[test]
fn operations_fail_fast_while_a_run_holds_the_lock() {
    let temp = assert_fs::TempDir::new().unwrap();
    let a = solid(temp.child("a.png").path(), 5);
    let b = solid(temp.child("b.png").path(), 5);
    let comparer = comparer(false, true);
    comparer.set_input(vec![a.clone(), b.clone()]).unwrap();

    let mut session = comparer.lock().unwrap();
    session.process().unwrap();

    assert!(matches!(comparer.process(), Err(ComparerError::AlreadyProcessing)));
    assert!(matches!(
        comparer.load_files(&[temp.path().to_path_buf()]),
        Err(ComparerError::AlreadyProcessing)
    ));
    assert!(matches!(
        comparer.delete_files(&[b.clone()]),
        Err(ComparerError::AlreadyProcessing)
    ));
    assert!(matches!(
        comparer.set_pixel_by_pixel(false),
        Err(ComparerError::AlreadyProcessing)
    ));

    assert_eq!(session.input(), vec![a, b.clone()]);
    assert_eq!(session.output(), vec![b]);
    drop(session);

    assert!(comparer.output().is_empty());
    assert!(comparer.lock().is_ok());
}

#[test]
fn load_then_process_leaves_output_readable() {
    let temp = assert_fs::TempDir::new().unwrap();
    solid(temp.child("A.png").path(), 30);
    let b = solid(temp.child("B.png").path(), 30);
    solid(temp.child("C.png").path(), 150);
    let comparer = comparer(false, true);

    let loaded = comparer.load_files(&[temp.path().to_path_buf()]).unwrap();
    assert_eq!(comparer.input().len(), 3);
    let result = comparer.process().unwrap();

    assert_eq!(loaded.len(), 3);
    assert_eq!(result.grouping.len(), 2);
    assert_eq!(comparer.output(), vec![b]);

    let moved_to = assert_fs::TempDir::new().unwrap();
    comparer.move_files(moved_to.path(), &comparer.output()).unwrap();

    moved_to.child("B.png").assert(predicate::path::exists());
    assert!(comparer.input().is_empty());
    assert!(comparer.output().is_empty());
}

#[test]
fn repeated_processing_is_stable() {
    let temp = assert_fs::TempDir::new().unwrap();
    let files: Vec<_> = (0..6)
        .map(|i| solid(temp.child(format!("{}.png", i)).path(), (i % 3) as u8 * 40))
        .collect();
    let comparer = comparer(true, true);

    comparer.set_input(files.clone()).unwrap();
    let first = comparer.process().unwrap().duplicates;
    comparer.set_input(files).unwrap();
    let second = comparer.process().unwrap().duplicates;

    assert_eq!(first, second);
    assert_eq!(first.len(), 3);
}
