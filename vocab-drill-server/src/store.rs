use std::collections::HashMap;
use std::time::{Duration, Instant};

use uuid::Uuid;

use vocab_drill_core::error::QuizError;
use vocab_drill_core::quiz::QuizSession;

/// Everything the server keeps for one client between requests.
pub struct SessionData {
	/// Parsed uploads as (file name, terms), in upload order.
	/// Replaced wholesale by each upload request.
	pub uploads: Vec<(String, Vec<String>)>,
	/// The quiz engine state.
	pub session: QuizSession,
	/// Last time this session was touched, for expiry.
	last_access: Instant,
}

impl SessionData {
	fn new() -> Self {
		Self {
			uploads: Vec::new(),
			session: QuizSession::new(),
			last_access: Instant::now(),
		}
	}
}

/// In-memory session store keyed by an opaque cookie value.
///
/// The store is held behind a `Mutex` by the server, so access to any
/// one session is serialized: two requests carrying the same identifier
/// cannot interleave their read-modify-write cycles and lose counter
/// updates.
///
/// Sessions expire after an idle TTL. An expired session is dropped and
/// surfaced as [`QuizError::SessionNotFound`], never silently
/// re-created; the client must restart the flow with a new upload.
pub struct SessionStore {
	sessions: HashMap<String, SessionData>,
	ttl: Duration,
}

impl SessionStore {
	/// Creates an empty store whose sessions expire after `ttl` of
	/// inactivity.
	pub fn new(ttl: Duration) -> Self {
		Self { sessions: HashMap::new(), ttl }
	}

	/// Creates a fresh session and returns its identifier.
	///
	/// Expired sessions are evicted here, so the store cannot grow past
	/// the set of clients seen within one TTL window.
	pub fn create(&mut self) -> String {
		self.evict_expired();

		let id = Uuid::new_v4().to_string();
		self.sessions.insert(id.clone(), SessionData::new());
		id
	}

	/// Looks up a live session and refreshes its idle timer.
	///
	/// # Errors
	/// Returns [`QuizError::SessionNotFound`] if the identifier is
	/// unknown or the session sat idle past the TTL.
	pub fn get_mut(&mut self, id: &str) -> Result<&mut SessionData, QuizError> {
		if let Some(data) = self.sessions.get(id) {
			if data.last_access.elapsed() > self.ttl {
				self.sessions.remove(id);
				return Err(QuizError::SessionNotFound);
			}
		}

		match self.sessions.get_mut(id) {
			Some(data) => {
				data.last_access = Instant::now();
				Ok(data)
			}
			None => Err(QuizError::SessionNotFound),
		}
	}

	/// Drops a session. Unknown identifiers are ignored.
	pub fn remove(&mut self, id: &str) {
		self.sessions.remove(id);
	}

	fn evict_expired(&mut self) {
		let ttl = self.ttl;
		self.sessions.retain(|_, data| data.last_access.elapsed() <= ttl);
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn unknown_session_is_not_found() {
		let mut store = SessionStore::new(Duration::from_secs(60));
		assert_eq!(store.get_mut("nope").err(), Some(QuizError::SessionNotFound));
	}

	#[test]
	fn created_sessions_are_retrievable() {
		let mut store = SessionStore::new(Duration::from_secs(60));
		let id = store.create();
		assert!(store.get_mut(&id).is_ok());
	}

	#[test]
	fn expired_sessions_are_surfaced_not_recreated() {
		let mut store = SessionStore::new(Duration::from_secs(0));
		let id = store.create();
		std::thread::sleep(Duration::from_millis(5));
		assert_eq!(store.get_mut(&id).err(), Some(QuizError::SessionNotFound));
		// Still gone on the second try
		assert_eq!(store.get_mut(&id).err(), Some(QuizError::SessionNotFound));
	}

	#[test]
	fn remove_is_idempotent() {
		let mut store = SessionStore::new(Duration::from_secs(60));
		let id = store.create();
		store.remove(&id);
		store.remove(&id);
		assert_eq!(store.get_mut(&id).err(), Some(QuizError::SessionNotFound));
	}
}
