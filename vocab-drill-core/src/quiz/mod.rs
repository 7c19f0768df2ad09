//! Top-level module for the quiz session engine.
//!
//! This crate provides a vocabulary-drill quiz engine, including:
//! - Ordered vocabulary lists built from uploaded text (`VocabList`)
//! - Random question drawing in two styles (`question`)
//! - Answer grading against a question reference (`grading`)
//! - Session state machine and orchestration (`QuizSession`)

/// Ordered vocabulary list parsed from uploaded word-pair files.
///
/// Handles header stripping, blank-line removal, and concatenating
/// multiple sources in upload order.
pub mod vocabulary;

/// Question drawing for both quiz styles.
///
/// Selects a random pair by rejection sampling over list positions and
/// shapes it into a prompt, a reference position, and (for the
/// multiple-choice style) a shuffled candidate set.
pub mod question;

/// Answer grading.
///
/// Recovers the expected term from the vocabulary list through the
/// question reference and compares it to the submitted answer after
/// normalization.
pub mod grading;

/// Session state machine and engine orchestration.
///
/// Tracks style, mode, and progress counters, owns the active
/// vocabulary list, and decides when the quiz completes.
pub mod session;

pub use grading::Grade;
pub use question::{Question, QuizStyle};
pub use session::{QuizMode, QuizSession};
pub use vocabulary::VocabList;
