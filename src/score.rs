//! High score persistence
//!
//! One decimal integer per game under `"<variant>_high_score"`. Reads
//! tolerate missing or corrupt values (treated as zero); failed writes keep
//! the high score in memory for the rest of the page's life.

use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;

use serde::{Deserialize, Serialize};

use crate::consts::{HIGH_SCORE_SUFFIX, HIGH_SCORE_TOAST_MS};
use crate::platform::{KeyValueStore, Notifier};
use crate::variant::VariantKind;

/// Outcome of offering a finished run's score
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScoreRecord {
    pub is_new_high_score: bool,
    pub stored_high_score: u64,
}

/// Storage key for a game's high score
pub fn high_score_key(kind: VariantKind) -> String {
    format!("{}{}", kind.id(), HIGH_SCORE_SUFFIX)
}

/// High score ledger shared by every session of a host.
///
/// Cloning is cheap and clones share the in-memory fallback.
#[derive(Clone)]
pub struct ScoreBook {
    store: Rc<dyn KeyValueStore>,
    notifier: Rc<dyn Notifier>,
    /// Scores that could not be written durably
    unsaved: Rc<RefCell<HashMap<VariantKind, u64>>>,
}

impl ScoreBook {
    pub fn new(store: Rc<dyn KeyValueStore>, notifier: Rc<dyn Notifier>) -> Self {
        Self {
            store,
            notifier,
            unsaved: Rc::new(RefCell::new(HashMap::new())),
        }
    }

    pub fn store(&self) -> &Rc<dyn KeyValueStore> {
        &self.store
    }

    /// Current high score; missing or unparseable data counts as zero
    pub fn high_score(&self, kind: VariantKind) -> u64 {
        let key = high_score_key(kind);
        let stored = match self.store.get(&key) {
            None => 0,
            Some(raw) => match raw.trim().parse::<u64>() {
                Ok(v) => v,
                Err(_) => {
                    log::warn!("Ignoring corrupt high score under '{}': {:?}", key, raw);
                    0
                }
            },
        };
        let unsaved = self.unsaved.borrow().get(&kind).copied().unwrap_or(0);
        stored.max(unsaved)
    }

    /// Offer a score. Only a strictly greater score replaces the stored one.
    pub fn record_score(&self, kind: VariantKind, score: u64) -> ScoreRecord {
        let current = self.high_score(kind);
        if score <= current {
            return ScoreRecord {
                is_new_high_score: false,
                stored_high_score: current,
            };
        }

        let key = high_score_key(kind);
        match self.store.set(&key, &score.to_string()) {
            Ok(()) => {
                self.unsaved.borrow_mut().remove(&kind);
                log::info!("New {} high score: {}", kind.id(), score);
            }
            Err(e) => {
                log::warn!("Keeping {} high score {} in memory only: {}", kind.id(), score, e);
                self.unsaved.borrow_mut().insert(kind, score);
            }
        }

        // Fire-and-forget; persistence is already settled
        self.notifier.notify(
            &format!("New {} high score: {}!", kind.title(), score),
            "success",
            HIGH_SCORE_TOAST_MS,
        );

        ScoreRecord {
            is_new_high_score: true,
            stored_high_score: score,
        }
    }
}
