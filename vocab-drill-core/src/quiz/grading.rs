use serde::Serialize;

use crate::error::QuizError;
use super::question::QuizStyle;
use super::vocabulary::VocabList;

/// Result of grading one submitted answer.
#[derive(Serialize, Clone, Debug, PartialEq, Eq)]
pub struct Grade {
	/// Whether the submitted answer matched after normalization.
	pub is_correct: bool,
	/// The expected term, verbatim as it appears in the vocabulary list.
	pub expected_answer: String,
}

/// Grades a submitted answer against the pair addressed by `reference`.
///
/// # Behavior
/// - The expected term depends on the style: recall stores the answer at
///   the reference position itself; multiple-choice stores the prompt
///   there and the answer at `reference + 1`.
/// - Both sides are trimmed and case-folded before comparison. Accents
///   and internal whitespace are compared literally.
///
/// # Errors
/// Returns [`QuizError::InvalidReference`] if the reference does not
/// address a gradable position in `vocab`.
pub fn grade(
	vocab: &VocabList,
	style: QuizStyle,
	reference: usize,
	answer: &str,
) -> Result<Grade, QuizError> {
	let expected_position = match style {
		QuizStyle::Recall => reference,
		QuizStyle::MultipleChoice => reference + 1,
	};

	let expected = vocab
		.term(expected_position)
		.ok_or_else(|| {
			QuizError::InvalidReference(format!(
				"Position {} is out of bounds for {} terms",
				expected_position,
				vocab.len()
			))
		})?
		.to_owned();

	let is_correct = normalize(answer) == normalize(&expected);

	Ok(Grade { is_correct, expected_answer: expected })
}

/// Trims surrounding whitespace and case-folds for comparison.
fn normalize(term: &str) -> String {
	term.trim().to_lowercase()
}

#[cfg(test)]
mod tests {
	use super::*;

	fn vocab() -> VocabList {
		VocabList::merge(vec![
			vec!["chat".to_owned(), "cat".to_owned(), "chien".to_owned(), "dog".to_owned()],
		])
		.unwrap()
	}

	#[test]
	fn recall_expects_the_term_at_the_reference_itself() {
		let grade = grade(&vocab(), QuizStyle::Recall, 1, "cat").unwrap();
		assert!(grade.is_correct);
		assert_eq!(grade.expected_answer, "cat");
	}

	#[test]
	fn multiple_choice_expects_the_term_after_the_reference() {
		let grade = grade(&vocab(), QuizStyle::MultipleChoice, 2, "dog").unwrap();
		assert!(grade.is_correct);
		assert_eq!(grade.expected_answer, "dog");
	}

	#[test]
	fn comparison_ignores_case_and_surrounding_whitespace() {
		let vocab = vocab();
		let spaced = grade(&vocab, QuizStyle::Recall, 1, " Cat ").unwrap();
		let folded = grade(&vocab, QuizStyle::Recall, 1, "cat").unwrap();
		assert!(spaced.is_correct);
		assert_eq!(spaced.is_correct, folded.is_correct);
	}

	#[test]
	fn internal_whitespace_is_compared_literally() {
		let vocab = VocabList::merge(vec![
			vec!["bonne nuit".to_owned(), "good night".to_owned()],
		])
		.unwrap();
		assert!(!grade(&vocab, QuizStyle::Recall, 1, "goodnight").unwrap().is_correct);
		assert!(grade(&vocab, QuizStyle::Recall, 1, "Good Night").unwrap().is_correct);
	}

	#[test]
	fn wrong_answer_reports_the_expected_term() {
		let grade = grade(&vocab(), QuizStyle::Recall, 1, "dog").unwrap();
		assert!(!grade.is_correct);
		assert_eq!(grade.expected_answer, "cat");
	}

	#[test]
	fn out_of_bounds_reference_is_rejected() {
		let vocab = vocab();
		assert!(matches!(
			grade(&vocab, QuizStyle::Recall, 4, "cat"),
			Err(QuizError::InvalidReference(_))
		));
		// Multiple-choice grades at reference + 1, so the last position
		// is already out of bounds as a reference
		assert!(matches!(
			grade(&vocab, QuizStyle::MultipleChoice, 3, "cat"),
			Err(QuizError::InvalidReference(_))
		));
	}
}
