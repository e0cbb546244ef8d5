//! Shared bookkeeping of one monitor tree.
//!
//! A [`TrackingContext`] maps the label of every property changed through a
//! monitor to the value that property held before its first change. All
//! monitors created for nested values of one root share the same context.

use crate::config::MonitorConfig;
use crate::error::{MonitorError, Result};
use crate::monitor::Monitor;
use parking_lot::Mutex;
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;
use tracing::{debug, warn};
use vigil_core::{deep_clone, parse_length, PathLabel, Value, LENGTH};

/// Replacement for the structural cloner used by [`TrackingContext::clone_monitor`].
pub type CloneFn = Arc<dyn Fn(&Monitor) -> Value + Send + Sync>;

/// Options of [`TrackingContext::clone_monitor`].
#[derive(Clone)]
pub struct CloneOptions {
    /// Clone nested composites too (default `true`).
    pub recursive: bool,
    /// Produce the cloned data with this function instead of [`deep_clone`].
    pub clone_fn: Option<CloneFn>,
}

impl CloneOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn shallow() -> Self {
        Self {
            recursive: false,
            clone_fn: None,
        }
    }

    pub fn with_clone_fn<F>(mut self, clone_fn: F) -> Self
    where
        F: Fn(&Monitor) -> Value + Send + Sync + 'static,
    {
        self.clone_fn = Some(Arc::new(clone_fn));
        self
    }
}

impl Default for CloneOptions {
    fn default() -> Self {
        Self {
            recursive: true,
            clone_fn: None,
        }
    }
}

impl fmt::Debug for CloneOptions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CloneOptions")
            .field("recursive", &self.recursive)
            .field("clone_fn", &self.clone_fn.is_some())
            .finish()
    }
}

/// One recorded change.
#[derive(Clone, Debug)]
struct Change {
    label: String,
    /// `None` if the property did not exist.
    original: Option<Value>,
    /// Recorded for an index vacated by shrinking a sequence's length rather
    /// than written explicitly. Restored on roll back but not listed.
    implicit: bool,
}

#[derive(Debug, Default)]
struct ContextState {
    /// In recording order.
    changes: Vec<Change>,
    relaxed: bool,
}

impl ContextState {
    fn position(&self, label: &str) -> Option<usize> {
        self.changes.iter().position(|change| change.label == label)
    }

    fn explicit(&self) -> impl Iterator<Item = &Change> {
        self.changes.iter().filter(|change| !change.implicit)
    }
}

/// State of the change list before a [`TrackingContext::track`] call.
#[derive(Debug)]
pub(crate) struct TrackMark {
    recorded: usize,
    promoted: Option<usize>,
}

/// A planned restoration of one property.
struct Restore {
    container: Value,
    name: String,
    original: Option<Value>,
}

impl Restore {
    fn apply(self) -> Result<()> {
        match self.original {
            Some(original) => self.container.set_property(&self.name, original)?,
            None => self.container.remove_property(&self.name)?,
        }
        Ok(())
    }
}

/// Change tracking shared by every monitor of one tree.
pub struct TrackingContext {
    root: Value,
    config: Arc<MonitorConfig>,
    labels: PathLabel,
    state: Mutex<ContextState>,
}

impl TrackingContext {
    pub(crate) fn new(root: Value, config: Arc<MonitorConfig>) -> Arc<Self> {
        Arc::new(Self {
            labels: PathLabel::new(config.separator.clone()),
            root,
            config,
            state: Mutex::new(ContextState::default()),
        })
    }

    /// Monitor of the root value this context was created for.
    pub fn monitor(self: &Arc<Self>) -> Monitor {
        Monitor::attach(self.root.clone(), Arc::clone(&self.config), Arc::clone(self))
    }

    pub fn has_changed(&self) -> bool {
        self.state.lock().explicit().next().is_some()
    }

    /// Changed labels with their original values, in the order of their
    /// first change. `None` marks a property that did not exist before.
    pub fn changed(&self) -> Vec<(String, Option<Value>)> {
        self.state
            .lock()
            .explicit()
            .map(|change| (change.label.clone(), change.original.clone()))
            .collect()
    }

    pub fn changed_labels(&self) -> Vec<String> {
        self.state
            .lock()
            .explicit()
            .map(|change| change.label.clone())
            .collect()
    }

    pub fn contains(&self, label: &str) -> bool {
        self.state.lock().explicit().any(|change| change.label == label)
    }

    /// Original value of a changed property.
    ///
    /// Returns `None` if `label` is not tracked and `Some(None)` if the
    /// property did not exist before its change.
    pub fn original(&self, label: &str) -> Option<Option<Value>> {
        self.state
            .lock()
            .explicit()
            .find(|change| change.label == label)
            .map(|change| change.original.clone())
    }

    pub fn relaxed(&self) -> bool {
        self.state.lock().relaxed
    }

    /// Suppress (or stop suppressing) repeated-change diagnostics.
    pub fn relax(self: &Arc<Self>, relaxed: bool) -> Monitor {
        self.state.lock().relaxed = relaxed;
        self.monitor()
    }

    /// Forget all tracked changes, keeping the current values.
    pub fn commit(self: &Arc<Self>) -> Monitor {
        let dropped = {
            let mut state = self.state.lock();
            let dropped = state.changes.len();
            state.changes.clear();
            dropped
        };
        debug!(changes = dropped, "committed tracked changes");
        self.monitor()
    }

    /// Restore every changed property to its original value and forget the
    /// changes.
    ///
    /// Deeper labels are restored before shallower ones and changes to the
    /// same container in reverse order. Every target is resolved before the
    /// first restoration, so a label that can no longer be reached fails with
    /// [`MonitorError::PathNotFound`] and leaves everything untouched.
    pub fn roll_back(self: &Arc<Self>) -> Result<Monitor> {
        let restored = {
            let mut state = self.state.lock();
            let restores = self.plan(&state.changes)?;
            let restored = restores.len();
            for restore in restores {
                restore.apply()?;
            }
            state.changes.clear();
            restored
        };
        debug!(restored, "rolled back tracked changes");
        Ok(self.monitor())
    }

    /// Monitor a copy of the root value with a fresh context that starts
    /// out with this context's changes and relaxed flag.
    pub fn clone_monitor(self: &Arc<Self>, options: CloneOptions) -> Result<Monitor> {
        let data = match &options.clone_fn {
            Some(clone_fn) => clone_fn(&self.monitor()),
            None => deep_clone(&self.root, options.recursive),
        };

        let config = MonitorConfig {
            context: None,
            ..(*self.config).clone()
        };
        let clone = Monitor::wrap(data, config)?;

        let (changes, relaxed) = {
            let source = self.state.lock();
            (source.changes.clone(), source.relaxed)
        };
        // originals are copied like the data so the two trees never restore
        // into the same composite
        let changes = changes
            .into_iter()
            .map(|change| Change {
                original: change
                    .original
                    .map(|original| deep_clone(&original, options.recursive)),
                ..change
            })
            .collect();

        let target = clone.context();
        {
            let mut state = target.state.lock();
            state.changes = changes;
            state.relaxed = relaxed;
        }
        debug!(
            recursive = options.recursive,
            custom = options.clone_fn.is_some(),
            "cloned monitor"
        );
        Ok(clone)
    }

    /// Record the change of property `name` of `monitor`'s value from
    /// `current` to `value`.
    pub(crate) fn track(
        &self,
        monitor: &Monitor,
        name: &str,
        label: &str,
        current: Option<Value>,
        value: &Value,
    ) -> Result<TrackMark> {
        let container = monitor.value();
        let config = monitor.config();
        let mut state = self.state.lock();
        let mut mark = TrackMark {
            recorded: state.changes.len(),
            promoted: None,
        };

        match state.position(label) {
            Some(index) if state.changes[index].implicit => {
                state.changes[index].implicit = false;
                mark.promoted = Some(index);
            }
            Some(_) => {
                let adjusts_length = name == LENGTH && container.is_sequence();
                if !state.relaxed && !adjusts_length {
                    if config.warn {
                        warn!(label, "replacing previously changed property without prior saving");
                    }
                    if config.fail {
                        return Err(MonitorError::RepeatedChange {
                            label: label.to_string(),
                        });
                    }
                }
            }
            None => state.changes.push(Change {
                label: label.to_string(),
                original: current,
                implicit: false,
            }),
        }

        if name == LENGTH {
            if let (Some(old), Ok(new)) = (container.sequence_len(), parse_length(value)) {
                for index in new..old {
                    let index = index.to_string();
                    let vacated = monitor.labels().join(monitor.prefix(), &index);
                    if state.position(&vacated).is_none() {
                        state.changes.push(Change {
                            label: vacated,
                            original: container.get_property(&index),
                            implicit: true,
                        });
                    }
                }
            }
        }

        Ok(mark)
    }

    /// Undo the bookkeeping of a [`TrackingContext::track`] call whose write
    /// failed.
    pub(crate) fn untrack(&self, mark: TrackMark) {
        let mut state = self.state.lock();
        state.changes.truncate(mark.recorded);
        if let Some(change) = mark.promoted.and_then(|index| state.changes.get_mut(index)) {
            change.implicit = true;
        }
    }

    /// Resolve the container of every change, deepest first.
    fn plan(&self, changes: &[Change]) -> Result<Vec<Restore>> {
        let prefix = self.config.prefix.as_str();
        let relative = changes
            .iter()
            .map(|change| {
                change
                    .label
                    .strip_prefix(prefix)
                    .ok_or_else(|| MonitorError::PathNotFound(change.label.clone()))
            })
            .collect::<Result<Vec<&str>>>()?;
        let recorded: HashMap<&str, usize> = relative
            .iter()
            .enumerate()
            .map(|(index, label)| (*label, index))
            .collect();

        let mut order: Vec<usize> = (0..changes.len()).collect();
        order.sort_by(|&a, &b| {
            self.labels
                .depth(relative[b])
                .cmp(&self.labels.depth(relative[a]))
                .then(b.cmp(&a))
        });

        let mut restores = Vec::with_capacity(order.len());
        for index in order {
            let Some(container) = self.locate(index, relative[index], &recorded, changes)? else {
                continue;
            };
            let change = &changes[index];
            if !container.is_composite() {
                return Err(MonitorError::PathNotFound(change.label.clone()));
            }
            let name = self.labels.last_segment(relative[index]);
            let probe = change.original.as_ref().unwrap_or(&Value::Null);
            container.check_assignable(name, probe)?;
            restores.push(Restore {
                container,
                name: name.to_string(),
                original: change.original.clone(),
            });
        }
        Ok(restores)
    }

    /// Find the value holding the property changed by `changes[index]` as it
    /// was when that change was recorded.
    ///
    /// An ancestor replaced after the change is followed through its recorded
    /// original. `None` means the change lies below an ancestor that did not
    /// exist then and needs no restoration.
    fn locate(
        &self,
        index: usize,
        label: &str,
        recorded: &HashMap<&str, usize>,
        changes: &[Change],
    ) -> Result<Option<Value>> {
        let mut container = self.root.clone();
        let mut window = changes.len();

        for (ancestor, segment) in self.labels.ancestors(label).into_iter().zip(self.labels.split(label)) {
            container = match recorded.get(ancestor) {
                Some(&later) if later > index && later < window => {
                    window = later;
                    match &changes[later].original {
                        Some(original) => original.clone(),
                        None => return Ok(None),
                    }
                }
                _ => container
                    .get_property(segment)
                    .ok_or_else(|| MonitorError::PathNotFound(changes[index].label.clone()))?,
            };
        }

        Ok(Some(container))
    }
}

impl fmt::Debug for TrackingContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let state = self.state.lock();
        f.debug_struct("TrackingContext")
            .field("prefix", &self.config.prefix)
            .field("changed", &state.explicit().map(|c| &c.label).collect::<Vec<_>>())
            .field("relaxed", &state.relaxed)
            .finish()
    }
}
