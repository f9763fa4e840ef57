//! Host-owned registry of live game sessions
//!
//! The host keeps one registry and refers to sessions by handle. Every session
//! shares the registry's high score book and settings.

use std::collections::HashMap;
use std::fmt;
use std::rc::Rc;

use serde::{Deserialize, Serialize};

use crate::error::EngineError;
use crate::input::RawInput;
use crate::platform::{KeyValueStore, Notifier, Surface};
use crate::score::ScoreBook;
use crate::session::{GameSession, SessionConfig};
use crate::settings::EngineSettings;
use crate::variant::VariantKind;

/// Opaque id tying a session to the host's surface
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct SessionHandle(pub u32);

impl fmt::Display for SessionHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "session-{}", self.0)
    }
}

pub struct SessionRegistry {
    sessions: HashMap<SessionHandle, GameSession>,
    next_id: u32,
    scores: ScoreBook,
    settings: EngineSettings,
}

impl SessionRegistry {
    /// Registry backed by `store`, with settings loaded from it
    pub fn new(store: Rc<dyn KeyValueStore>, notifier: Rc<dyn Notifier>) -> Self {
        let settings = EngineSettings::load(store.as_ref());
        Self {
            sessions: HashMap::new(),
            next_id: 1,
            scores: ScoreBook::new(store, notifier),
            settings,
        }
    }

    pub fn with_settings(mut self, settings: EngineSettings) -> Self {
        self.settings = settings.sanitized();
        self
    }

    pub fn settings(&self) -> &EngineSettings {
        &self.settings
    }

    pub fn scores(&self) -> &ScoreBook {
        &self.scores
    }

    /// Create a session for `kind` using the registry's settings
    pub fn create(
        &mut self,
        kind: VariantKind,
        surface: Option<Box<dyn Surface>>,
    ) -> Result<SessionHandle, EngineError> {
        let config = SessionConfig::new(kind).with_settings(self.settings.clone());
        self.create_with(config, surface)
    }

    pub fn create_with(
        &mut self,
        config: SessionConfig,
        surface: Option<Box<dyn Surface>>,
    ) -> Result<SessionHandle, EngineError> {
        let handle = SessionHandle(self.next_id);
        self.next_id = self.next_id.wrapping_add(1);
        let session = GameSession::new(handle, config, surface, self.scores.clone())?;
        self.sessions.insert(handle, session);
        Ok(handle)
    }

    pub fn get(&self, handle: SessionHandle) -> Option<&GameSession> {
        self.sessions.get(&handle)
    }

    pub fn get_mut(&mut self, handle: SessionHandle) -> Option<&mut GameSession> {
        self.sessions.get_mut(&handle)
    }

    /// Stop and drop a session. Returns false when it was already gone.
    pub fn destroy(&mut self, handle: SessionHandle) -> bool {
        match self.sessions.remove(&handle) {
            Some(mut session) => {
                session.destroy();
                true
            }
            None => false,
        }
    }

    /// Route a raw event to one session
    pub fn handle_input(&mut self, handle: SessionHandle, raw: &RawInput) -> bool {
        match self.sessions.get_mut(&handle) {
            Some(session) => {
                session.handle_input(raw);
                true
            }
            None => false,
        }
    }

    /// The page lost focus or was hidden
    pub fn focus_lost(&mut self) {
        for session in self.sessions.values_mut() {
            session.focus_lost();
        }
    }

    /// Drive every live session for one render opportunity
    pub fn frame(&mut self, elapsed_ms: f64) {
        for session in self.sessions.values_mut() {
            session.frame(elapsed_ms);
        }
        // Sessions destroyed through `get_mut` leave at the end of the frame
        self.sessions.retain(|_, s| !s.is_destroyed());
    }

    /// Live handles, oldest first
    pub fn handles(&self) -> Vec<SessionHandle> {
        let mut handles: Vec<SessionHandle> = self.sessions.keys().copied().collect();
        handles.sort();
        handles
    }

    pub fn len(&self) -> usize {
        self.sessions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sessions.is_empty()
    }
}
