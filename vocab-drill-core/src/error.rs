use thiserror::Error;

/// Errors produced by the quiz engine.
///
/// Every variant is recoverable at the boundary: each maps to a
/// client-visible message and an unsuccessful response. None of them
/// should ever abort the process, and the engine never retries on its
/// own; re-fetching a question is a caller concern.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum QuizError {
	/// The uploaded payload could not be decoded as text.
	#[error("Vocabulary file is not valid UTF-8 text")]
	Parse,

	/// The merged vocabulary holds fewer than 2 terms, so no pair exists.
	#[error("Not enough vocabulary words")]
	NoVocabulary,

	/// A question was requested from a list too short to sample from.
	///
	/// With a single term there is no even/odd position pair and the
	/// rejection-sampling loop would never terminate.
	#[error("At least two vocabulary terms are required to draw a question")]
	InsufficientVocabulary,

	/// The submitted question reference is missing or does not address
	/// a gradable position in the current vocabulary list.
	#[error("Invalid question reference: {0}")]
	InvalidReference(String),

	/// The operation is not valid in the current session state,
	/// ex. submitting an answer after the quiz completed.
	#[error("Operation not allowed: {0}")]
	SessionState(String),

	/// The session is missing or has expired. It is never silently
	/// re-created; the client must restart the flow.
	#[error("Session not found or expired")]
	SessionNotFound,
}
