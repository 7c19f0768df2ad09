use rand::Rng;
use rand::seq::SliceRandom;

use serde::{Deserialize, Serialize};

use crate::error::QuizError;
use super::vocabulary::VocabList;

/// Maximum number of candidates in a multiple-choice question,
/// correct answer included.
const MAX_OPTIONS: usize = 4;

/// Maximum number of random draws when collecting distractors.
///
/// Bounds the collection loop when the data holds fewer than
/// `MAX_OPTIONS - 1` distinct distractors.
const MAX_OPTION_DRAWS: usize = 50;

/// Quiz style: how a question is asked and answered.
///
/// # Variants
/// - `Recall`: the learner types the target term.
/// - `MultipleChoice`: the learner picks the target term among
///   2 to 4 shuffled candidates.
#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum QuizStyle {
	Recall,
	MultipleChoice,
}

/// One served quiz question.
///
/// A question does not store its expected answer. It carries a
/// *reference position* into the vocabulary list that produced it; the
/// grader recovers the expected term through this position later. The
/// reference is only meaningful against that same list instance.
#[derive(Serialize, Clone, Debug, PartialEq, Eq)]
pub struct Question {
	/// Opaque position into the vocabulary list, echoed back on submission.
	reference: usize,
	/// The source term shown to the learner.
	prompt: String,
	/// Shuffled candidate targets, present only for multiple-choice.
	options: Option<Vec<String>>,
}

impl Question {
	/// Draws one random question from the vocabulary list.
	///
	/// # Parameters
	/// - `vocab`: the active vocabulary list, at least 2 terms.
	/// - `style`: recall or multiple-choice.
	/// - `rng`: the random source. Injected so drawing is reproducible
	///   with a seeded generator.
	///
	/// # Behavior
	/// - `Recall`: picks a random odd position `r`; the prompt is the
	///   term at `r - 1` and the reference is `r` (the position holding
	///   the expected answer itself).
	/// - `MultipleChoice`: picks a random even position `r`; the prompt
	///   is the term at `r`, the reference is `r`, and the expected
	///   answer is the term at `r + 1`, hidden among shuffled distractors.
	///
	/// # Errors
	/// Returns [`QuizError::InsufficientVocabulary`] if the list holds
	/// fewer than 2 terms. Checked before sampling: with a single term
	/// no position of the required parity exists and the rejection loop
	/// would never terminate.
	pub fn draw<R: Rng>(vocab: &VocabList, style: QuizStyle, rng: &mut R) -> Result<Self, QuizError> {
		if vocab.len() < 2 {
			return Err(QuizError::InsufficientVocabulary);
		}

		match style {
			QuizStyle::Recall => Self::draw_recall(vocab, rng),
			QuizStyle::MultipleChoice => Self::draw_multiple_choice(vocab, rng),
		}
	}

	/// Returns the reference position carried by this question.
	pub fn reference(&self) -> usize {
		self.reference
	}

	/// Returns the prompt shown to the learner.
	pub fn prompt(&self) -> &str {
		&self.prompt
	}

	/// Returns the candidate set, `None` for recall questions.
	pub fn options(&self) -> Option<&[String]> {
		self.options.as_deref()
	}

	/// Recall style: prompt with a source term, expect the typed target.
	fn draw_recall<R: Rng>(vocab: &VocabList, rng: &mut R) -> Result<Self, QuizError> {
		let mut r = random_odd(vocab.len(), rng);
		// Clamp to the largest valid odd position, should not happen
		if r >= vocab.len() {
			r = vocab.len() - 1;
			if r % 2 == 0 {
				r -= 1;
			}
		}

		let prompt = vocab
			.term(r - 1)
			.ok_or_else(|| QuizError::InvalidReference(format!("No term at position {}", r - 1)))?
			.to_owned();

		Ok(Self { reference: r, prompt, options: None })
	}

	/// Multiple-choice style: prompt with a source term, offer the
	/// target among shuffled distractors.
	fn draw_multiple_choice<R: Rng>(vocab: &VocabList, rng: &mut R) -> Result<Self, QuizError> {
		let r = random_even_clamped(vocab.len(), rng);

		let prompt = vocab
			.term(r)
			.ok_or_else(|| QuizError::InvalidReference(format!("No term at position {}", r)))?
			.to_owned();
		let correct = vocab
			.term(r + 1)
			.ok_or_else(|| QuizError::InvalidReference(format!("No term at position {}", r + 1)))?
			.to_owned();

		let mut options = vec![correct];
		let mut draws = 0;
		while options.len() < MAX_OPTIONS && draws < MAX_OPTION_DRAWS {
			let candidate_position = random_even_clamped(vocab.len(), rng);
			if let Some(distractor) = vocab.term(candidate_position + 1) {
				if options.iter().all(|existing| existing != distractor) {
					options.push(distractor.to_owned());
				}
			}
			draws += 1;
		}
		options.shuffle(rng);

		Ok(Self { reference: r, prompt, options: Some(options) })
	}
}

/// Picks a uniformly random odd position in `[0, len - 1]` by rejection
/// sampling.
///
/// Terminates with probability 1 for `len >= 2` (position 1 is always
/// odd and in range). Callers must enforce `len >= 2`.
fn random_odd<R: Rng>(len: usize, rng: &mut R) -> usize {
	let mut r = rng.random_range(0..len);
	while r % 2 == 0 {
		r = rng.random_range(0..len);
	}
	r
}

/// Picks a uniformly random even position by rejection sampling,
/// clamped to `len - 2` when it would address the last element or
/// beyond.
///
/// The clamp keeps an odd trailing term from ever being prompted as a
/// question subject. Callers must enforce `len >= 2`.
fn random_even_clamped<R: Rng>(len: usize, rng: &mut R) -> usize {
	let mut r = rng.random_range(0..len);
	while r % 2 != 0 {
		r = rng.random_range(0..len);
	}
	if r >= len - 1 {
		r = len - 2;
	}
	r
}
