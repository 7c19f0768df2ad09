use rand::Rng;

use serde::{Deserialize, Serialize};

use crate::error::QuizError;
use super::grading;
use super::question::{Question, QuizStyle};
use super::vocabulary::VocabList;

/// Termination policy of a quiz session.
///
/// # Variants
/// - `Continuous`: the quiz never ends on its own; the advisory total
///   is the number of pairs.
/// - `FixedCount`: the quiz ends after a requested number of answers.
/// - `Exhaustive`: the quiz ends after as many answers as there are
///   pairs in the vocabulary.
#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum QuizMode {
	Continuous,
	FixedCount,
	Exhaustive,
}

/// Lifecycle of a session.
#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq)]
enum Phase {
	Uninitialized,
	Configured,
	InProgress,
	Complete,
}

/// Values reported when a quiz starts.
#[derive(Serialize, Clone, Copy, Debug, PartialEq, Eq)]
pub struct Started {
	/// Number of complete pairs in the active vocabulary.
	pub total_pairs: usize,
	/// Number of questions the session will serve (advisory for
	/// continuous mode).
	pub total_questions: usize,
}

/// Outcome of asking for the next question.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum NextOutcome {
	/// A question to serve, with 1-based progress.
	Question {
		question: Question,
		number: usize,
		total: usize,
	},
	/// The mode's termination condition holds; no more questions.
	QuizComplete,
}

/// Result of recording one submitted answer.
#[derive(Serialize, Clone, Debug, PartialEq, Eq)]
pub struct Answered {
	/// Whether the answer matched after normalization.
	pub is_correct: bool,
	/// The expected term, verbatim.
	pub expected_answer: String,
	/// Running number of correct answers, this one included.
	pub correct_count: usize,
}

/// Progress counters, readable in any state.
#[derive(Serialize, Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Stats {
	pub answered_count: usize,
	pub total_questions: usize,
	pub correct_count: usize,
}

/// One quiz session: state machine plus engine orchestration.
///
/// The session is an explicit value: the caller reads it from its store,
/// invokes one operation, and writes it back. The engine itself keeps no
/// ambient state and performs no I/O, so every operation completes
/// synchronously.
///
/// ## Lifecycle
/// `Uninitialized` → (load_vocabulary) → `Configured` → (start) →
/// `InProgress` → `Complete`, with `reset` returning to `Uninitialized`
/// from anywhere. Restarting from `Complete` is allowed as long as the
/// vocabulary is still loaded.
///
/// ## Invariants
/// - `correct_count <= answered_count`
/// - The active vocabulary is replaced wholesale, never mutated in place
/// - Counters only move through `start` (reset to zero) and
///   `submit_answer` (incremented)
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
pub struct QuizSession {
	phase: Phase,
	style: QuizStyle,
	mode: QuizMode,
	answered_count: usize,
	correct_count: usize,
	total_questions: usize,
	vocab: Option<VocabList>,
}

impl QuizSession {
	/// Creates an uninitialized session with no vocabulary.
	pub fn new() -> Self {
		Self {
			phase: Phase::Uninitialized,
			style: QuizStyle::Recall,
			mode: QuizMode::Continuous,
			answered_count: 0,
			correct_count: 0,
			total_questions: 0,
			vocab: None,
		}
	}

	/// Installs a freshly merged vocabulary list, replacing any previous
	/// one, and moves the session to `Configured`.
	///
	/// Counters are cleared: a new list invalidates every outstanding
	/// question reference.
	pub fn load_vocabulary(&mut self, vocab: VocabList) {
		self.vocab = Some(vocab);
		self.answered_count = 0;
		self.correct_count = 0;
		self.total_questions = 0;
		self.phase = Phase::Configured;
	}

	/// Starts (or restarts) the quiz.
	///
	/// # Parameters
	/// - `style`: recall or multiple-choice.
	/// - `mode`: termination policy.
	/// - `requested_count`: number of questions, used only by
	///   `FixedCount`; other modes derive their total from the pair
	///   count.
	///
	/// # Errors
	/// Returns [`QuizError::SessionState`] if no vocabulary is loaded.
	pub fn start(
		&mut self,
		style: QuizStyle,
		mode: QuizMode,
		requested_count: usize,
	) -> Result<Started, QuizError> {
		let vocab = self
			.vocab
			.as_ref()
			.ok_or_else(|| QuizError::SessionState("No vocabulary loaded".to_owned()))?;

		self.style = style;
		self.mode = mode;
		self.total_questions = match mode {
			QuizMode::FixedCount => requested_count,
			QuizMode::Exhaustive | QuizMode::Continuous => vocab.pair_count(),
		};
		self.answered_count = 0;
		self.correct_count = 0;
		self.phase = Phase::InProgress;

		Ok(Started {
			total_pairs: vocab.pair_count(),
			total_questions: self.total_questions,
		})
	}

	/// Serves the next question, or reports completion once the mode's
	/// termination condition holds.
	///
	/// # Behavior
	/// - Continuous mode never terminates on its own.
	/// - Other modes complete exactly when `answered_count` reaches
	///   `total_questions`; asking again after that re-reports
	///   completion.
	/// - Progress is 1-based: the question is numbered
	///   `answered_count + 1`. Counters are not touched here; only
	///   `submit_answer` advances them.
	///
	/// # Errors
	/// Returns [`QuizError::SessionState`] if the quiz was never
	/// started, [`QuizError::InsufficientVocabulary`] if the list is too
	/// short to sample from.
	pub fn next_question<R: Rng>(&mut self, rng: &mut R) -> Result<NextOutcome, QuizError> {
		let vocab = match self.phase {
			Phase::InProgress | Phase::Complete => self
				.vocab
				.as_ref()
				.ok_or_else(|| QuizError::SessionState("No vocabulary loaded".to_owned()))?,
			Phase::Uninitialized | Phase::Configured => {
				return Err(QuizError::SessionState("Quiz has not been started".to_owned()));
			}
		};

		if self.mode != QuizMode::Continuous && self.answered_count >= self.total_questions {
			self.phase = Phase::Complete;
			return Ok(NextOutcome::QuizComplete);
		}

		let question = Question::draw(vocab, self.style, rng)?;
		Ok(NextOutcome::Question {
			question,
			number: self.answered_count + 1,
			total: self.total_questions,
		})
	}

	/// Records a submitted answer.
	///
	/// Grades the answer against the pair addressed by `reference`,
	/// increments `answered_count` unconditionally and `correct_count`
	/// on a match.
	///
	/// # Errors
	/// - [`QuizError::SessionState`] if the quiz is not in progress; a
	///   late submission against a completed quiz is rejected, not
	///   counted.
	/// - [`QuizError::InvalidReference`] if `reference` does not address
	///   a gradable position.
	pub fn submit_answer(&mut self, reference: usize, answer: &str) -> Result<Answered, QuizError> {
		match self.phase {
			Phase::InProgress => (),
			Phase::Complete => {
				return Err(QuizError::SessionState(
					"Answer submitted after the quiz completed".to_owned(),
				));
			}
			Phase::Uninitialized | Phase::Configured => {
				return Err(QuizError::SessionState("Quiz has not been started".to_owned()));
			}
		}

		let vocab = self
			.vocab
			.as_ref()
			.ok_or_else(|| QuizError::SessionState("No vocabulary loaded".to_owned()))?;

		let grade = grading::grade(vocab, self.style, reference, answer)?;

		self.answered_count += 1;
		if grade.is_correct {
			self.correct_count += 1;
		}

		Ok(Answered {
			is_correct: grade.is_correct,
			expected_answer: grade.expected_answer,
			correct_count: self.correct_count,
		})
	}

	/// Returns the progress counters.
	///
	/// Valid in any state; all zero before the first start. Reading
	/// twice with no mutation in between returns identical values.
	pub fn stats(&self) -> Stats {
		Stats {
			answered_count: self.answered_count,
			total_questions: self.total_questions,
			correct_count: self.correct_count,
		}
	}

	/// Discards all state, vocabulary included, returning the session
	/// to `Uninitialized`.
	pub fn reset(&mut self) {
		*self = Self::new();
	}
}

impl Default for QuizSession {
	fn default() -> Self {
		Self::new()
	}
}
