// src/registry.rs
//! # Visibility/Loading Registry
//! Keyed state machine for per-symbol sub-resources (news).
//!
//! Every key carries one [`SubResourceState`] and one [`Visibility`]. The two
//! are orthogonal: a key may be `Hidden` while `Loaded` (collapsed) or `Shown`
//! while `Loading`. Keys that were never touched read as
//! `NotFetched` + `Hidden`.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use tracing::debug;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum SubResourceState<T> {
    NotFetched,
    Loading,
    Loaded { items: Vec<T> },
    Failed { message: String },
}

impl<T> SubResourceState<T> {
    pub fn is_loading(&self) -> bool {
        matches!(self, SubResourceState::Loading)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Visibility {
    #[default]
    Hidden,
    Shown,
}

/// What to do when a `Failed` key is revealed again.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FailedNewsPolicy {
    /// Treat `Failed` like `NotFetched`: revealing re-fetches.
    #[default]
    Retry,
    /// Reveal the failure as-is; no new request.
    KeepFailed,
}

/// Result of a toggle, telling the caller whether a fetch must be issued.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ToggleOutcome {
    /// Now `Shown` and `Loading`; the caller must issue the fetch.
    Fetch,
    /// Now `Shown`, cached state reused.
    Reveal,
    /// Now `Hidden`.
    Hide,
    /// Control disabled while loading; nothing changed.
    Busy,
}

#[derive(Debug, Clone)]
struct Entry<T> {
    state: SubResourceState<T>,
    visibility: Visibility,
}

impl<T> Default for Entry<T> {
    fn default() -> Self {
        Self {
            state: SubResourceState::NotFetched,
            visibility: Visibility::Hidden,
        }
    }
}

#[derive(Debug, Clone)]
pub struct SubResourceRegistry<T> {
    entries: HashMap<String, Entry<T>>,
    policy: FailedNewsPolicy,
}

impl<T: Clone> Default for SubResourceRegistry<T> {
    fn default() -> Self {
        Self::new(FailedNewsPolicy::default())
    }
}

impl<T: Clone> SubResourceRegistry<T> {
    pub fn new(policy: FailedNewsPolicy) -> Self {
        Self {
            entries: HashMap::new(),
            policy,
        }
    }

    pub fn policy(&self) -> FailedNewsPolicy {
        self.policy
    }

    pub fn state(&self, key: &str) -> SubResourceState<T> {
        self.entries
            .get(key)
            .map(|e| e.state.clone())
            .unwrap_or(SubResourceState::NotFetched)
    }

    pub fn visibility(&self, key: &str) -> Visibility {
        self.entries
            .get(key)
            .map(|e| e.visibility)
            .unwrap_or_default()
    }

    /// The toggle control is enabled unless the key is loading.
    pub fn is_control_enabled(&self, key: &str) -> bool {
        !self
            .entries
            .get(key)
            .is_some_and(|e| e.state.is_loading())
    }

    pub fn toggle(&mut self, key: &str) -> ToggleOutcome {
        let policy = self.policy;
        let entry = self.entries.entry(key.to_string()).or_default();

        let fetchable = match entry.state {
            SubResourceState::NotFetched => true,
            SubResourceState::Failed { .. } => policy == FailedNewsPolicy::Retry,
            SubResourceState::Loading | SubResourceState::Loaded { .. } => false,
        };

        let outcome = match entry.visibility {
            Visibility::Shown if entry.state.is_loading() => ToggleOutcome::Busy,
            Visibility::Shown => {
                entry.visibility = Visibility::Hidden;
                ToggleOutcome::Hide
            }
            Visibility::Hidden if fetchable => {
                entry.state = SubResourceState::Loading;
                entry.visibility = Visibility::Shown;
                ToggleOutcome::Fetch
            }
            Visibility::Hidden => {
                entry.visibility = Visibility::Shown;
                ToggleOutcome::Reveal
            }
        };

        debug!(key, ?outcome, "sub-resource toggle");
        outcome
    }

    /// Mark `key` as loading without touching visibility. Returns `false`
    /// when a fetch is already in flight for it.
    pub fn start(&mut self, key: &str) -> bool {
        let entry = self.entries.entry(key.to_string()).or_default();
        if entry.state.is_loading() {
            return false;
        }
        entry.state = SubResourceState::Loading;
        true
    }

    /// Store a successful fetch. Returns `false` (and changes nothing) when
    /// the key is not loading.
    pub fn complete(&mut self, key: &str, items: Vec<T>) -> bool {
        self.settle(key, SubResourceState::Loaded { items })
    }

    pub fn fail(&mut self, key: &str, message: impl Into<String>) -> bool {
        self.settle(
            key,
            SubResourceState::Failed {
                message: message.into(),
            },
        )
    }

    fn settle(&mut self, key: &str, next: SubResourceState<T>) -> bool {
        match self.entries.get_mut(key) {
            Some(e) if e.state.is_loading() => {
                e.state = next;
                true
            }
            _ => {
                debug!(key, "dropping result for a key that is not loading");
                false
            }
        }
    }

    /// Keys in lexical order with their current state.
    pub fn snapshot(&self) -> Vec<(String, Visibility, SubResourceState<T>)> {
        let mut out: Vec<_> = self
            .entries
            .iter()
            .map(|(k, e)| (k.clone(), e.visibility, e.state.clone()))
            .collect();
        out.sort_by(|a, b| a.0.cmp(&b.0));
        out
    }
}
