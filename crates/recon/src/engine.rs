use std::collections::{HashMap, HashSet};

use crate::error::ReconError;
use crate::fallback;
use crate::grammar::{self, split_extension};
use crate::model::{ComparisonKey, DocumentRecord, ReconStats, ReconciliationResult, StorageFile};
use crate::revision::{canonicalize, RevisionKey};

// ---------------------------------------------------------------------------
// Keys
// ---------------------------------------------------------------------------

/// Join key of a register item. `None` for an empty filename or base name.
///
/// A grammar match supplies the base name even when the parsed name failed
/// validation; only a non-matching name goes through the fallback.
pub fn register_key(record: &DocumentRecord) -> Option<ComparisonKey> {
    let filename = record.filename.trim();
    if filename.is_empty() {
        return None;
    }

    let parsed = grammar::parse(filename, "", "");
    if parsed.matched() && !parsed.valid {
        log::debug!("register name '{filename}' matched but invalid: {}", parsed.reject_reason);
    }
    let base_name_key = if parsed.matched() {
        parsed.base_name_key
    } else {
        fallback::base_name(filename)
    };
    if base_name_key.is_empty() {
        return None;
    }

    Some(ComparisonKey {
        base_name_key,
        revision: canonicalize(&record.revision_raw),
    })
}

/// Join key of a storage file, from its pre-parsed name or the fallback.
pub fn storage_key(file: &StorageFile) -> Option<ComparisonKey> {
    let filename = file.filename.trim();
    if filename.is_empty() {
        return None;
    }

    let (base_name_key, revision) = if file.parsed.matched() {
        let revision = if file.parsed.revision_raw.is_empty() {
            RevisionKey::empty()
        } else {
            canonicalize(&file.parsed.revision_raw)
        };
        (file.parsed.base_name_key.clone(), revision)
    } else {
        let (stem, _) = split_extension(filename);
        let revision = fallback::extract_revision(stem)
            .map(|r| RevisionKey::from_raw(&r))
            .unwrap_or_default();
        (fallback::base_name(filename), revision)
    };
    if base_name_key.is_empty() {
        return None;
    }

    Some(ComparisonKey {
        base_name_key,
        revision,
    })
}

// ---------------------------------------------------------------------------
// Reconcile
// ---------------------------------------------------------------------------

/// Three-way diff of a register snapshot against a storage snapshot.
///
/// Register items missing an exact `(base, revision)` hit are register-only.
/// Storage files nobody matched are storage-only unless their revision sorts
/// strictly below the register's highest revision for the same base, in which
/// case they are superseded and dropped.
pub fn reconcile(register: &[DocumentRecord], storage: &[StorageFile]) -> ReconciliationResult {
    let mut stats = ReconStats {
        register_items: register.len(),
        storage_files: storage.len(),
        ..ReconStats::default()
    };

    // Register keys and the highest expected revision per base.
    let mut register_keys: Vec<(&DocumentRecord, ComparisonKey)> = Vec::with_capacity(register.len());
    let mut max_revision: HashMap<String, RevisionKey> = HashMap::new();
    for record in register {
        let Some(key) = register_key(record) else {
            log::warn!("register item skipped: unusable filename '{}'", record.filename);
            stats.register_skipped += 1;
            continue;
        };
        let current = max_revision
            .entry(key.base_name_key.clone())
            .or_insert_with(|| key.revision.clone());
        if key.revision > *current {
            *current = key.revision.clone();
        }
        register_keys.push((record, key));
    }

    // Storage index, first occurrence of each filename wins.
    let mut seen: HashSet<&str> = HashSet::new();
    let mut storage_keys: Vec<(&StorageFile, ComparisonKey)> = Vec::with_capacity(storage.len());
    for file in storage {
        if !seen.insert(file.filename.as_str()) {
            log::warn!("duplicate storage filename '{}' ({}) collapsed", file.filename, file.id);
            stats.storage_duplicates += 1;
            continue;
        }
        let Some(key) = storage_key(file) else {
            log::warn!("storage file skipped: unusable filename '{}'", file.filename);
            stats.storage_skipped += 1;
            continue;
        };
        storage_keys.push((file, key));
    }

    let mut index: HashMap<&ComparisonKey, Vec<usize>> = HashMap::new();
    for (i, (_, key)) in storage_keys.iter().enumerate() {
        index.entry(key).or_default().push(i);
    }

    // Exact matches.
    let mut found = vec![false; storage_keys.len()];
    let mut register_only = Vec::new();
    for (record, key) in &register_keys {
        match index.get(key) {
            Some(hits) => {
                stats.matched_register += 1;
                for &i in hits {
                    found[i] = true;
                }
            }
            None => register_only.push((*record).clone()),
        }
    }
    stats.matched_storage = found.iter().filter(|f| **f).count();

    // Unmatched storage, minus superseded revisions.
    let mut storage_only = Vec::new();
    for ((file, key), _) in storage_keys.iter().zip(&found).filter(|(_, found)| !**found) {
        let superseded = max_revision
            .get(&key.base_name_key)
            .is_some_and(|max| key.revision < *max);
        if superseded {
            log::debug!(
                "{} superseded (revision '{}' below register '{}')",
                file.filename,
                key.revision,
                max_revision.get(&key.base_name_key).map(|m| m.as_str()).unwrap_or("")
            );
            stats.superseded += 1;
        } else {
            storage_only.push((*file).clone());
        }
    }

    stats.register_only = register_only.len();
    stats.storage_only = storage_only.len();

    ReconciliationResult {
        register_only,
        storage_only,
        revision_mismatch: Vec::new(),
        stats,
    }
}

/// Reconcile, refusing an empty register when storage is not empty.
pub fn run(
    register: &[DocumentRecord],
    storage: &[StorageFile],
) -> Result<ReconciliationResult, ReconError> {
    if register.is_empty() {
        if storage.is_empty() {
            return Ok(ReconciliationResult::default());
        }
        return Err(ReconError::EmptyRegister {
            storage_files: storage.len(),
        });
    }

    let result = reconcile(register, storage);
    let s = &result.stats;
    log::info!(
        "reconciled {} register items against {} storage files: {} matched, {} register-only, {} storage-only, {} superseded",
        s.register_items,
        s.storage_files,
        s.matched_register,
        s.register_only,
        s.storage_only,
        s.superseded
    );
    Ok(result)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
