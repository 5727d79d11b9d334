//! Builds records (file + signatures) in parallel.

use crate::core::hasher::{AlgorithmSet, FastDecoder, Signature};
use crate::error::HashError;
use crate::events::{Event, EventSender, HashEvent, HashProgress};
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};

/// A file paired with the signatures of one comparison pass
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageRecord {
    path: PathBuf,
    ordinal: usize,
    /// One signature per enabled algorithm, in refinement order
    signatures: Vec<Signature>,
}

impl ImageRecord {
    pub fn new(path: PathBuf, ordinal: usize, signatures: Vec<Signature>) -> Self {
        Self {
            path,
            ordinal,
            signatures,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Position of the file in discovery order
    pub fn ordinal(&self) -> usize {
        self.ordinal
    }

    pub fn signatures(&self) -> &[Signature] {
        &self.signatures
    }

    /// Signature computed by the algorithm at `pass` in the chain
    pub fn signature(&self, pass: usize) -> Option<&Signature> {
        self.signatures.get(pass)
    }
}

/// A file left out of every group because it could not be decoded
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SkippedFile {
    pub path: PathBuf,
    pub reason: String,
}

/// Decode each file once and compute every enabled signature.
///
/// Runs on the rayon pool. Output keeps discovery order; failures are
/// returned separately and never abort the batch. With no algorithm enabled
/// nothing is decoded.
pub fn build_records(
    files: &[PathBuf],
    algorithms: &AlgorithmSet,
    events: &EventSender,
) -> (Vec<ImageRecord>, Vec<SkippedFile>) {
    let total = files.len();
    events.send(Event::Hash(HashEvent::Started { total_files: total }));

    if algorithms.is_empty() {
        let records: Vec<ImageRecord> = files
            .iter()
            .enumerate()
            .map(|(ordinal, path)| ImageRecord::new(path.clone(), ordinal, Vec::new()))
            .collect();
        events.send(Event::Hash(HashEvent::Completed {
            total_records: records.len(),
            skipped: 0,
        }));
        return (records, Vec::new());
    }

    let completed = AtomicUsize::new(0);

    let outcomes: Vec<Result<ImageRecord, SkippedFile>> = files
        .par_iter()
        .enumerate()
        .map(|(ordinal, path)| {
            let outcome = compute_signatures(path, algorithms)
                .map(|signatures| ImageRecord::new(path.clone(), ordinal, signatures))
                .map_err(|e| {
                    tracing::warn!(path = %path.display(), error = %e, "Skipping undecodable file");
                    events.send(Event::Hash(HashEvent::Skipped {
                        path: path.clone(),
                        reason: e.to_string(),
                    }));
                    SkippedFile {
                        path: path.clone(),
                        reason: e.to_string(),
                    }
                });

            let done = completed.fetch_add(1, Ordering::SeqCst) + 1;
            events.send(Event::Hash(HashEvent::Progress(HashProgress {
                completed: done,
                total,
                current_path: path.clone(),
            })));

            outcome
        })
        .collect();

    let mut records = Vec::with_capacity(outcomes.len());
    let mut skipped = Vec::new();
    for outcome in outcomes {
        match outcome {
            Ok(record) => records.push(record),
            Err(skip) => skipped.push(skip),
        }
    }

    events.send(Event::Hash(HashEvent::Completed {
        total_records: records.len(),
        skipped: skipped.len(),
    }));

    (records, skipped)
}

fn compute_signatures(path: &Path, algorithms: &AlgorithmSet) -> Result<Vec<Signature>, HashError> {
    let image = FastDecoder::decode(path)?;
    let signatures = algorithms
        .iter()
        .map(|algorithm| algorithm.signature(&image))
        .collect::<Result<Vec<_>, _>>()?;

    tracing::debug!(
        path = %path.display(),
        signatures = %signatures.iter().map(|s| s.to_string()).collect::<Vec<_>>().join(" "),
        "Signed"
    );

    Ok(signatures)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::hasher::{AlgorithmKind, HasherConfig};
    use crate::events::{null_sender, EventChannel};
    use image::{Rgb, RgbImage};
    use std::fs;
    use tempfile::TempDir;

    fn write_png(dir: &Path, name: &str, value: u8) -> PathBuf {
        let path = dir.join(name);
        RgbImage::from_pixel(8, 8, Rgb([value, value, value]))
            .save(&path)
            .unwrap();
        path
    }

    #[test]
    fn records_keep_discovery_order() {
        let temp_dir = TempDir::new().unwrap();
        let files: Vec<_> = (0..12u8)
            .map(|i| write_png(temp_dir.path(), &format!("{:02}.png", i), i * 10))
            .collect();
        let algorithms = HasherConfig::new().pixel_by_pixel(true).build();

        let (records, skipped) = build_records(&files, &algorithms, &null_sender());

        assert!(skipped.is_empty());
        let ordinals: Vec<_> = records.iter().map(|r| r.ordinal()).collect();
        assert_eq!(ordinals, (0..12).collect::<Vec<_>>());
        assert_eq!(records[3].path(), files[3].as_path());
    }

    #[test]
    fn one_signature_per_algorithm() {
        let temp_dir = TempDir::new().unwrap();
        let files = vec![write_png(temp_dir.path(), "a.png", 1)];
        let algorithms = HasherConfig::new()
            .perceptual_hash(true)
            .pixel_by_pixel(true)
            .build();

        let (records, _) = build_records(&files, &algorithms, &null_sender());

        let kinds: Vec<_> = records[0].signatures().iter().map(|s| s.algorithm()).collect();
        assert_eq!(
            kinds,
            vec![AlgorithmKind::PerceptualHash, AlgorithmKind::PixelByPixel]
        );
    }

    #[test]
    fn undecodable_files_are_skipped_and_reported() {
        let temp_dir = TempDir::new().unwrap();
        let good = write_png(temp_dir.path(), "good.png", 5);
        let bad = temp_dir.path().join("bad.png");
        fs::write(&bad, b"not an image").unwrap();
        let algorithms = HasherConfig::new().pixel_by_pixel(true).build();
        let (sender, receiver) = EventChannel::new();

        let (records, skipped) = build_records(&[bad.clone(), good.clone()], &algorithms, &sender);
        drop(sender);

        assert_eq!(records.len(), 1);
        assert_eq!(records[0].path(), good.as_path());
        assert_eq!(records[0].ordinal(), 1);
        assert_eq!(skipped.len(), 1);
        assert_eq!(skipped[0].path, bad);
        assert!(receiver
            .iter()
            .any(|e| matches!(e, Event::Hash(HashEvent::Skipped { .. }))));
    }

    #[test]
    fn no_algorithms_means_no_decoding() {
        let files = vec![PathBuf::from("/does/not/exist.png")];

        let (records, skipped) = build_records(&files, &AlgorithmSet::new(), &null_sender());

        assert_eq!(records.len(), 1);
        assert!(records[0].signatures().is_empty());
        assert!(skipped.is_empty());
    }
}
