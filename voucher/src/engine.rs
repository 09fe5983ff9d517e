//! SearchEngine - incremental search and selection over the roster
//!
//! State is four fields (query, suggestions, selection, highlight) behind one
//! mutex. Every operation mutates that state synchronously and publishes a
//! snapshot on a watch channel the view subscribes to.
//!
//! Debounce Architecture:
//! `set_query` stores the text and (re)starts a single debounce timer owned by
//! the engine. Replacing the timer cancels the old `CancellationToken` while the
//! state lock is held, and a fired timer claims its slot under the same lock
//! before applying results. A timer that lost the race therefore never writes,
//! so an evaluation for an older query can not overwrite a newer one.

use std::sync::{Arc, Weak};
use std::time::Duration;

use once_cell::sync::Lazy;
use parking_lot::Mutex;
use tokio::sync::watch;
use tokio_util::sync::CancellationToken;
use tracing::debug;

use crate::debounce::{Debouncer, DEFAULT_DEBOUNCE};
use crate::interface::{HighlightDirection, SearchState};
use crate::models::StudentRecord;
use crate::roster::Roster;
use crate::search::{self, normalize_query, Evaluation};

/// Global fallback Tokio runtime for when the engine is driven outside any runtime context.
/// Shared across all engines and never dropped.
static FALLBACK_RUNTIME: Lazy<tokio::runtime::Runtime> = Lazy::new(|| {
    tokio::runtime::Builder::new_multi_thread()
        .worker_threads(1)
        .thread_name("voucher-debounce")
        .enable_all()
        .build()
        .expect("Failed to create fallback tokio runtime")
});

struct EngineInner {
    state: SearchState,
    roster: Roster,
    debouncer: Debouncer,
    /// Selection came from `select_explicit`, not from an evaluation
    explicit: bool,
    evaluations: u64,
    last_evaluated: Option<String>,
}

impl EngineInner {
    fn apply_evaluation(&mut self, query: &str) {
        let Evaluation { suggestions, selection } = search::evaluate(&self.roster, query);
        debug!(
            query,
            suggestions = suggestions.len(),
            selected = selection.is_some(),
            "Evaluated query"
        );
        self.state.suggestions = suggestions;
        self.state.selection = selection;
        self.state.highlight = None;
        self.explicit = false;
        self.evaluations += 1;
        self.last_evaluated = Some(query.to_string());
    }

    fn select(&mut self, record: StudentRecord) {
        // A pending evaluation would replace the explicit choice
        self.debouncer.cancel();
        let id = record.id_string();
        debug!(id = id.as_str(), "Selected record");
        self.state.query = id;
        self.state.selection = Some(record);
        self.state.suggestions.clear();
        self.state.highlight = None;
        self.explicit = true;
    }
}

struct Shared {
    inner: Mutex<EngineInner>,
    updates: watch::Sender<SearchState>,
}

impl Shared {
    fn publish(&self, inner: &EngineInner) {
        self.updates.send_replace(inner.state.clone());
    }

    /// Debounce callback
    fn fire(&self, token: &CancellationToken) {
        let mut inner = self.inner.lock();
        if !inner.debouncer.complete(token) {
            debug!("Dropping superseded evaluation");
            return;
        }
        let query = normalize_query(&inner.state.query);
        inner.apply_evaluation(&query);
        self.publish(&inner);
    }
}

/// Debounced search engine. Cloning yields another handle to the same state.
#[derive(Clone)]
pub struct SearchEngine {
    shared: Arc<Shared>,
}

impl SearchEngine {
    pub fn new(roster: Roster) -> Self {
        Self::with_debounce(roster, DEFAULT_DEBOUNCE)
    }

    pub fn with_debounce(roster: Roster, delay: Duration) -> Self {
        let (updates, _) = watch::channel(SearchState::default());
        Self {
            shared: Arc::new(Shared {
                inner: Mutex::new(EngineInner {
                    state: SearchState::default(),
                    roster,
                    debouncer: Debouncer::new(delay),
                    explicit: false,
                    evaluations: 0,
                    last_evaluated: None,
                }),
                updates,
            }),
        }
    }

    /// Get a tokio runtime handle - uses current runtime if available, otherwise global fallback
    fn runtime_handle() -> tokio::runtime::Handle {
        tokio::runtime::Handle::try_current()
            .unwrap_or_else(|_| FALLBACK_RUNTIME.handle().clone())
    }

    fn schedule_evaluation(&self, inner: &mut EngineInner) {
        let shared: Weak<Shared> = Arc::downgrade(&self.shared);
        inner
            .debouncer
            .schedule(&Self::runtime_handle(), move |token| {
                if let Some(shared) = shared.upgrade() {
                    shared.fire(&token);
                }
            });
    }

    // ─────────────────────────────────────────────────────────────────────────────
    // Operations
    // ─────────────────────────────────────────────────────────────────────────────

    /// Store the raw text now and evaluate it once input has been quiet for
    /// the debounce window.
    pub fn set_query(&self, raw: impl Into<String>) {
        let mut inner = self.shared.inner.lock();
        inner.state.query = raw.into();
        inner.explicit = false;
        self.schedule_evaluation(&mut inner);
        self.shared.publish(&inner);
    }

    /// Pick a record from the list (click or Enter). The only way to select a
    /// record that is not an exact textual match.
    pub fn select_explicit(&self, record: StudentRecord) {
        let mut inner = self.shared.inner.lock();
        inner.select(record);
        self.shared.publish(&inner);
    }

    /// Move the keyboard cursor; clamps at both ends. No-op without suggestions.
    pub fn move_highlight(&self, direction: HighlightDirection) {
        let mut inner = self.shared.inner.lock();
        let len = inner.state.suggestions.len();
        if len == 0 {
            return;
        }
        let next = match (direction, inner.state.highlight) {
            (HighlightDirection::Down, None) => 0,
            (HighlightDirection::Down, Some(i)) => (i + 1).min(len - 1),
            (HighlightDirection::Up, None) => 0,
            (HighlightDirection::Up, Some(i)) => i.saturating_sub(1),
        };
        inner.state.highlight = Some(next);
        self.shared.publish(&inner);
    }

    /// Select the highlighted suggestion, if any. Returns the selected record.
    pub fn confirm_highlighted(&self) -> Option<StudentRecord> {
        let mut inner = self.shared.inner.lock();
        let record = inner.state.highlighted().cloned()?;
        inner.select(record.clone());
        self.shared.publish(&inner);
        Some(record)
    }

    /// Reset to the empty state, dropping any pending evaluation.
    pub fn clear(&self) {
        let mut inner = self.shared.inner.lock();
        inner.debouncer.cancel();
        inner.state = SearchState::default();
        inner.explicit = false;
        self.shared.publish(&inner);
    }

    /// Hide the list (focus loss, outside click). Query and selection stay.
    pub fn dismiss_suggestions(&self) {
        let mut inner = self.shared.inner.lock();
        inner.state.suggestions.clear();
        inner.state.highlight = None;
        self.shared.publish(&inner);
    }

    /// Swap in a reloaded roster and re-evaluate the current query against it.
    ///
    /// An explicit pick is kept as is: its query is the record's id, which may
    /// not survive re-evaluation (ids with upper-case letters never match).
    pub fn set_roster(&self, roster: Roster) {
        let mut inner = self.shared.inner.lock();
        debug!(records = roster.len(), explicit = inner.explicit, "Roster replaced");
        inner.roster = roster;
        if !inner.explicit {
            self.schedule_evaluation(&mut inner);
        }
    }

    // ─────────────────────────────────────────────────────────────────────────────
    // Observation
    // ─────────────────────────────────────────────────────────────────────────────

    pub fn state(&self) -> SearchState {
        self.shared.inner.lock().state.clone()
    }

    pub fn query(&self) -> String {
        self.shared.inner.lock().state.query.clone()
    }

    pub fn suggestions(&self) -> Vec<StudentRecord> {
        self.shared.inner.lock().state.suggestions.clone()
    }

    /// Read-only snapshot of the current selection for the action buttons
    pub fn selection(&self) -> Option<StudentRecord> {
        self.shared.inner.lock().state.selection.clone()
    }

    pub fn highlight(&self) -> Option<usize> {
        self.shared.inner.lock().state.highlight
    }

    pub fn roster(&self) -> Roster {
        self.shared.inner.lock().roster.clone()
    }

    /// Receive a snapshot after every state change
    pub fn subscribe(&self) -> watch::Receiver<SearchState> {
        self.shared.updates.subscribe()
    }

    pub fn is_pending(&self) -> bool {
        self.shared.inner.lock().debouncer.is_pending()
    }

    /// Wait until no evaluation is pending and return the resulting state
    pub async fn settled(&self) -> SearchState {
        let mut updates = self.subscribe();
        loop {
            {
                let inner = self.shared.inner.lock();
                if !inner.debouncer.is_pending() {
                    return inner.state.clone();
                }
            }
            if updates.changed().await.is_err() {
                return self.state();
            }
        }
    }

    pub fn debounce_delay(&self) -> Duration {
        self.shared.inner.lock().debouncer.delay()
    }

    /// Number of debounced evaluations applied so far
    pub fn evaluation_count(&self) -> u64 {
        self.shared.inner.lock().evaluations
    }

    /// Normalized query of the last applied evaluation
    pub fn last_evaluated_query(&self) -> Option<String> {
        self.shared.inner.lock().last_evaluated.clone()
    }
}
