//! # Comparator Module
//!
//! Groups records by signature equality and picks the duplicates.
//!
//! ## How It Works
//! 1. Decode every file once and compute each enabled signature
//! 2. Partition by the first algorithm's signature
//! 3. Split every bucket again by each further algorithm (never merge)
//! 4. Keep the first member of each multi-member group, mark the rest
//!
//! With no algorithm enabled every file is its own group, so nothing is a
//! duplicate.

mod extract;
mod record;

pub use extract::{extract_duplicates, originals};
pub use record::{build_records, ImageRecord, SkippedFile};

use crate::core::hasher::{AlgorithmSet, Signature};
use crate::events::{CompareEvent, Event, EventSender};
use std::collections::HashMap;
use std::path::PathBuf;

/// Key identifying one group
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum GroupKey {
    /// No algorithm ran; the file's discovery ordinal
    Unique(usize),
    /// Signatures shared by every member, in refinement order
    Signatures(Vec<Signature>),
}

/// Records sharing one key, in discovery order
#[derive(Debug, Clone)]
pub struct Group {
    key: GroupKey,
    members: Vec<ImageRecord>,
}

impl Group {
    pub fn key(&self) -> &GroupKey {
        &self.key
    }

    pub fn members(&self) -> &[ImageRecord] {
        &self.members
    }

    pub fn len(&self) -> usize {
        self.members.len()
    }

    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }

    /// A singleton group has no duplicates
    pub fn has_duplicates(&self) -> bool {
        self.members.len() > 1
    }

    /// The member kept by the keep-first policy
    pub fn original(&self) -> Option<&ImageRecord> {
        self.members.first()
    }

    /// Members after the original
    pub fn duplicates(&self) -> &[ImageRecord] {
        self.members.get(1..).unwrap_or(&[])
    }
}

/// Result of grouping: groups ordered by the discovery ordinal of their first member
#[derive(Debug, Clone, Default)]
pub struct Grouping {
    groups: Vec<Group>,
}

impl Grouping {
    pub fn groups(&self) -> &[Group] {
        &self.groups
    }

    /// Members of the group with the given key
    pub fn get(&self, key: &GroupKey) -> Option<&[ImageRecord]> {
        self.groups
            .iter()
            .find(|g| &g.key == key)
            .map(|g| g.members.as_slice())
    }

    /// Groups with more than one member
    pub fn duplicate_groups(&self) -> impl Iterator<Item = &Group> + '_ {
        self.groups.iter().filter(|g| g.has_duplicates())
    }

    /// Number of groups, singletons included
    pub fn len(&self) -> usize {
        self.groups.len()
    }

    pub fn is_empty(&self) -> bool {
        self.groups.is_empty()
    }
}

/// Outcome of one `compare` call
#[derive(Debug, Clone, Default)]
pub struct ComparisonResult {
    pub grouping: Grouping,
    /// Extracted duplicates, in discovery order
    pub duplicates: Vec<PathBuf>,
    /// Files left out of every group
    pub skipped: Vec<SkippedFile>,
}

/// Build records for `files` and group them with `algorithms`
pub fn compare(
    files: &[PathBuf],
    algorithms: &AlgorithmSet,
    events: &EventSender,
) -> ComparisonResult {
    let (records, skipped) = build_records(files, algorithms, events);

    events.send(Event::Compare(CompareEvent::Started {
        total_records: records.len(),
        algorithms: algorithms.len(),
    }));

    let grouping = group_records(records, algorithms, events);
    let duplicates = extract_duplicates(&grouping);
    let duplicate_groups = grouping.duplicate_groups().count();

    tracing::info!(
        files = files.len(),
        skipped = skipped.len(),
        groups = grouping.len(),
        duplicate_groups,
        duplicates = duplicates.len(),
        algorithms = ?algorithms,
        "Comparison finished"
    );
    events.send(Event::Compare(CompareEvent::Completed {
        total_groups: grouping.len(),
        duplicate_groups,
        total_duplicates: duplicates.len(),
    }));

    ComparisonResult {
        grouping,
        duplicates,
        skipped,
    }
}

/// Group already-signed records, one refinement pass per algorithm
pub fn group_records(
    records: Vec<ImageRecord>,
    algorithms: &AlgorithmSet,
    events: &EventSender,
) -> Grouping {
    if algorithms.is_empty() {
        let groups = records
            .into_iter()
            .map(|record| Group {
                key: GroupKey::Unique(record.ordinal()),
                members: vec![record],
            })
            .collect();
        return Grouping { groups };
    }

    let mut buckets: Vec<(Vec<Signature>, Vec<ImageRecord>)> = if records.is_empty() {
        Vec::new()
    } else {
        vec![(Vec::new(), records)]
    };

    let mut unsigned = Vec::new();
    for (pass, algorithm) in algorithms.iter().enumerate() {
        let mut refined = Vec::with_capacity(buckets.len());
        for (prefix, members) in buckets {
            refined.extend(partition(prefix, members, pass, &mut unsigned));
        }
        buckets = refined;

        tracing::debug!(algorithm = %algorithm.kind(), buckets = buckets.len(), "Refinement pass done");
        events.send(Event::Compare(CompareEvent::PassCompleted {
            algorithm: algorithm.kind().to_string(),
            groups: buckets.len(),
        }));
    }

    let mut groups: Vec<Group> = buckets
        .into_iter()
        .map(|(signatures, members)| Group {
            key: GroupKey::Signatures(signatures),
            members,
        })
        .chain(unsigned.into_iter().map(|record| Group {
            key: GroupKey::Unique(record.ordinal()),
            members: vec![record],
        }))
        .collect();
    groups.sort_by_key(|g| g.members.first().map(|r| r.ordinal()));

    Grouping { groups }
}

/// Split one bucket by the signature computed at `pass`, keeping member order.
///
/// A record without a signature for `pass` cannot match anything and is
/// moved to `unsigned`.
fn partition(
    prefix: Vec<Signature>,
    members: Vec<ImageRecord>,
    pass: usize,
    unsigned: &mut Vec<ImageRecord>,
) -> Vec<(Vec<Signature>, Vec<ImageRecord>)> {
    let mut index: HashMap<Signature, usize> = HashMap::new();
    let mut parts: Vec<(Vec<Signature>, Vec<ImageRecord>)> = Vec::new();

    for record in members {
        let Some(signature) = record.signature(pass).cloned() else {
            tracing::warn!(path = %record.path().display(), pass, "Record has no signature for this pass, kept on its own");
            unsigned.push(record);
            continue;
        };

        match index.get(&signature) {
            Some(&slot) => parts[slot].1.push(record),
            None => {
                index.insert(signature.clone(), parts.len());
                let mut key = prefix.clone();
                key.push(signature);
                parts.push((key, vec![record]));
            }
        }
    }

    parts
}
