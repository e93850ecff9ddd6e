// Copyright (c) The treeport Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

use super::{
    Theme,
    aggregator::{FamilyRegistry, Readiness},
    displayer::TreeDisplayer,
    events::{Emission, FamilyStats, ReportEntry, ReportEvent},
    sink::ReportSink,
};
use crate::{config::ReporterOptions, errors::WriteEventError, names::ScopePath, tree::{Node, Tree}};
use smol_str::SmolStr;
use std::sync::{Mutex, MutexGuard, PoisonError};
use tracing::{debug, warn};

/// Tree reporter builder.
#[derive(Clone, Debug, Default)]
pub struct TreeReporterBuilder {
    options: ReporterOptions,
    should_colorize: bool,
}

impl TreeReporterBuilder {
    /// Creates a new builder with the given options.
    pub fn new(options: ReporterOptions) -> Self {
        Self {
            options,
            should_colorize: false,
        }
    }

    /// Set to true if the reporter should colorize output.
    pub fn set_colorize(&mut self, should_colorize: bool) -> &mut Self {
        self.should_colorize = should_colorize;
        self
    }

    /// Sets the glyphs used to draw the tree, overriding the options.
    pub fn set_theme(&mut self, theme: Theme) -> &mut Self {
        self.options.theme = theme;
        self
    }

    /// Sets whether to hide passing tests, overriding the options.
    pub fn set_hide_successes(&mut self, hide_successes: bool) -> &mut Self {
        self.options.hide_successes = hide_successes;
        self
    }

    /// Creates a new tree reporter that writes to `sink`.
    pub fn build<S: ReportSink>(&self, sink: S) -> TreeReporter<S> {
        TreeReporter {
            tree: Mutex::new(Tree::new()),
            families: FamilyRegistry::new(),
            displayer: TreeDisplayer::new(self.options.clone(), self.should_colorize),
            sink,
        }
    }
}

/// Consumes scope events, buffers nested families until they complete, and renders each family
/// exactly once.
///
/// A `TreeReporter` is constructed once per run through a [`TreeReporterBuilder`]. It can be
/// shared across threads: events for different scopes may be reported concurrently.
pub struct TreeReporter<S> {
    tree: Mutex<Tree>,
    families: FamilyRegistry,
    displayer: TreeDisplayer,
    sink: S,
}

impl<S: ReportSink> TreeReporter<S> {
    /// Reports an event from the execution engine.
    ///
    /// Starting events never print anything; they return [`Emission::Buffered`], or
    /// [`Emission::Ignored`] if the scope name is malformed.
    pub fn write_event(&self, event: ReportEvent) -> Result<Emission, WriteEventError> {
        match event {
            ReportEvent::ScopeStarting { qualified_name } => {
                Ok(match self.on_scope_starting(&qualified_name) {
                    Some(family) => Emission::Buffered { family },
                    None => Emission::Ignored,
                })
            }
            ReportEvent::ScopeCompleted {
                class_summary,
                members,
            } => self.on_scope_completed(class_summary, members),
        }
    }

    /// Records that a scope is about to run.
    ///
    /// Returns the family the scope belongs to, or `None` if the name is malformed.
    pub fn on_scope_starting(&self, qualified_name: &str) -> Option<SmolStr> {
        let Some(path) = ScopePath::parse(qualified_name) else {
            debug!("ignoring starting scope with malformed name {qualified_name:?}");
            return None;
        };

        self.lock_tree().insert(&path);
        if path.is_nested() {
            self.families.register(path.root(), qualified_name);
        }
        Some(path.root().clone())
    }

    /// Records a completed scope along with the test entries it contains.
    ///
    /// If this completes the scope's family, the family is rendered to the sink and
    /// [`Emission::Rendered`] is returned. Otherwise the entries are buffered until the rest of the
    /// family completes.
    ///
    /// If the family was already printed by a concurrent completion of the same top-level scope,
    /// nothing is printed and [`Emission::Ignored`] is returned.
    ///
    /// # Panics
    ///
    /// Panics if a family becomes ready but its top-level scope is no longer in the tree.
    pub fn on_scope_completed(
        &self,
        class_summary: ReportEntry,
        members: Vec<ReportEntry>,
    ) -> Result<Emission, WriteEventError> {
        let Some(path) = ScopePath::parse(&class_summary.scope_name) else {
            debug!(
                "ignoring completed scope with malformed name {:?}",
                class_summary.scope_name
            );
            return Ok(Emission::Ignored);
        };
        let root = path.root().clone();
        let scope_name = class_summary.scope_name.clone();
        let member_count = members.len();

        // Attach everything to the tree before checking readiness, so that whichever thread
        // observes the family becoming ready sees every member's entries.
        {
            let mut tree = self.lock_tree();
            for member in members {
                match ScopePath::parse(&member.scope_name) {
                    Some(member_path) => tree.insert(&member_path).push_entry(member),
                    None => debug!(
                        "ignoring test {} with malformed scope name {:?}",
                        member.report_name(),
                        member.scope_name
                    ),
                }
            }
            tree.insert(&path).set_class_summary(class_summary);
        }

        match self.families.complete(&root, &scope_name, member_count) {
            Readiness::Pending { received, expected } => {
                debug!("family {root}: buffered {path} ({received}/{expected} scopes completed)");
                Ok(Emission::Buffered { family: root })
            }
            Readiness::Ready(pending) => {
                debug!(
                    "family {root}: ready with {} scopes and {} tests",
                    pending.completed_count(),
                    pending.member_count(),
                );
                let Some(family) = self.prune_family(&root) else {
                    panic!("family {root} is ready but missing from the tree");
                };
                self.emit(root, family)
            }
            Readiness::Untracked => self.emit_untracked(root),
        }
    }

    /// Returns the number of families still waiting for nested scopes to complete.
    pub fn pending_families(&self) -> usize {
        self.families.pending_count()
    }

    /// Ends the current print session: discards every pending family and clears the tree.
    ///
    /// Returns the top-level names of families that never completed, in sorted order.
    pub fn finish(&self) -> Vec<SmolStr> {
        let pending = self.families.drain();
        for root in &pending {
            warn!("family {root} never completed, discarding its buffered results");
        }
        self.lock_tree().clear();
        pending
    }

    /// Returns the sink this reporter writes to.
    pub fn sink(&self) -> &S {
        &self.sink
    }

    fn prune_family(&self, root: &SmolStr) -> Option<Node> {
        self.lock_tree().prune(std::slice::from_ref(root))
    }

    /// Prints a family of one. Two threads completing the same scope may both get here, and
    /// only the first finds the family in the tree.
    fn emit_untracked(&self, root: SmolStr) -> Result<Emission, WriteEventError> {
        let Some(family) = self.prune_family(&root) else {
            warn!("family {root} was already printed, ignoring its repeated completion");
            return Ok(Emission::Ignored);
        };
        self.emit(root, family)
    }

    fn emit(&self, root: SmolStr, family: Node) -> Result<Emission, WriteEventError> {
        let stats = FamilyStats::from_family(&family);
        // Render without holding the tree lock: other families can keep reporting meanwhile.
        let tree = Tree::from_family(family);
        self.displayer.render(&tree, &self.sink)?;
        Ok(Emission::Rendered {
            family: root,
            stats,
        })
    }

    fn lock_tree(&self) -> MutexGuard<'_, Tree> {
        self.tree.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl<S> Drop for TreeReporter<S> {
    fn drop(&mut self) {
        let pending = self.families.pending_count();
        if pending > 0 {
            debug!("tree reporter dropped with {pending} families still pending");
        }
    }
}
