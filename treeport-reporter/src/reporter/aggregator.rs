// Copyright (c) The treeport Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Tracks families of nested scopes until every member has completed.
//!
//! A *family* is a top-level scope together with every scope nested within it, keyed by the
//! top-level segment of their qualified names. A family is created when the first nested scope
//! starts, and it becomes ready once a class summary has been received for every scope name that
//! started within it.

use smol_str::SmolStr;
use std::{
    collections::{HashMap, HashSet, hash_map::Entry},
    sync::{Mutex, MutexGuard, PoisonError},
};
use tracing::{debug, warn};

/// The bookkeeping for a family that hasn't completed yet.
///
/// Entries themselves live in the reporter's tree; only names and counts are kept here.
#[derive(Debug)]
pub(super) struct PendingFamily {
    /// Qualified names of the scopes that have started, including the top-level scope.
    scope_names: HashSet<String>,
    /// Qualified names of the scopes that have completed.
    completed: HashSet<String>,
    /// The number of test entries received so far.
    member_count: usize,
}

impl PendingFamily {
    fn new(root: &SmolStr) -> Self {
        let mut scope_names = HashSet::new();
        scope_names.insert(root.to_string());
        Self {
            scope_names,
            completed: HashSet::new(),
            member_count: 0,
        }
    }

    fn is_ready(&self) -> bool {
        self.completed.len() == self.scope_names.len()
    }

    pub(super) fn completed_count(&self) -> usize {
        self.completed.len()
    }

    pub(super) fn member_count(&self) -> usize {
        self.member_count
    }
}

/// The state of a family after a scope within it completed.
#[derive(Debug)]
pub(super) enum Readiness {
    /// The family is still waiting for other scopes.
    Pending { received: usize, expected: usize },

    /// Every scope in the family has completed. The family has been evicted from the registry and
    /// is returned to the caller.
    Ready(PendingFamily),

    /// No nested scope within this family ever started: the completed scope is a family of one.
    Untracked,
}

/// A registry of pending families, shared by every thread that reports events.
///
/// Every method holds the registry lock for the duration of the call, so registration and the
/// record-then-check-then-evict sequence are atomic. Exactly one call observes a family becoming
/// ready.
#[derive(Debug, Default)]
pub(super) struct FamilyRegistry {
    families: Mutex<HashMap<SmolStr, PendingFamily>>,
}

impl FamilyRegistry {
    pub(super) fn new() -> Self {
        Self::default()
    }

    /// Registers a nested scope that is starting, creating its family if necessary.
    pub(super) fn register(&self, root: &SmolStr, qualified_name: &str) {
        let mut families = self.lock();
        let family = families
            .entry(root.clone())
            .or_insert_with(|| PendingFamily::new(root));
        if family.scope_names.insert(qualified_name.to_owned()) {
            debug!(
                "family {root}: registered {qualified_name} ({} scopes known)",
                family.scope_names.len()
            );
        }
    }

    /// Records that the scope `scope_name`, with `member_count` test entries, completed within the
    /// family of `root`.
    pub(super) fn complete(
        &self,
        root: &SmolStr,
        scope_name: &str,
        member_count: usize,
    ) -> Readiness {
        let mut families = self.lock();
        let Entry::Occupied(mut entry) = families.entry(root.clone()) else {
            return Readiness::Untracked;
        };

        let family = entry.get_mut();
        if !family.completed.insert(scope_name.to_owned()) {
            warn!(
                "family {root}: scope {scope_name} completed more than once, not counting it again"
            );
        }
        family.member_count += member_count;

        if family.is_ready() {
            Readiness::Ready(entry.remove())
        } else {
            Readiness::Pending {
                received: family.completed.len(),
                expected: family.scope_names.len(),
            }
        }
    }

    /// Returns the number of families that are still waiting for scopes to complete.
    pub(super) fn pending_count(&self) -> usize {
        self.lock().len()
    }

    /// Evicts every pending family, returning their top-level names in sorted order.
    pub(super) fn drain(&self) -> Vec<SmolStr> {
        let mut roots: Vec<_> = self.lock().drain().map(|(root, _)| root).collect();
        roots.sort_unstable();
        roots
    }

    fn lock(&self) -> MutexGuard<'_, HashMap<SmolStr, PendingFamily>> {
        self.families.lock().unwrap_or_else(PoisonError::into_inner)
    }
}
