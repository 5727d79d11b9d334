//! Keep-first duplicate extraction.

use super::{Grouping, ImageRecord};
use std::collections::{HashMap, HashSet};
use std::path::{Path, PathBuf};

/// Files to reconcile: every member after the first of each multi-member group.
///
/// A file chosen as the original of one group is never reported as a
/// duplicate, even if another group lists it. The result is distinct and in
/// discovery order; an empty result means no duplicates were found.
pub fn extract_duplicates(grouping: &Grouping) -> Vec<PathBuf> {
    let mut originals: HashSet<&Path> = HashSet::new();
    let mut marked: HashMap<&Path, usize> = HashMap::new();

    for group in grouping.duplicate_groups() {
        let mut members = group.members().iter();
        let Some(original) = members.next() else {
            continue;
        };
        originals.insert(original.path());

        for record in members {
            if originals.contains(record.path()) {
                continue;
            }
            marked.entry(record.path()).or_insert(record.ordinal());
        }
    }

    marked.retain(|path, _| !originals.contains(path));

    let mut duplicates: Vec<(&Path, usize)> = marked.into_iter().collect();
    duplicates.sort_by_key(|&(path, ordinal)| (ordinal, path));

    tracing::debug!(
        groups = grouping.duplicate_groups().count(),
        duplicates = duplicates.len(),
        "Extracted duplicates"
    );

    duplicates
        .into_iter()
        .map(|(path, _)| path.to_path_buf())
        .collect()
}

/// Originals kept by [`extract_duplicates`], one per multi-member group
pub fn originals(grouping: &Grouping) -> Vec<&ImageRecord> {
    grouping
        .duplicate_groups()
        .filter_map(|group| group.original())
        .collect()
}
