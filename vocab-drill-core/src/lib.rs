//! Vocabulary-drill quiz engine library.
//!
//! This crate provides the full quiz session engine including:
//! - Vocabulary parsing and merging of uploaded word-pair lists
//! - Random question drawing (recall and multiple-choice styles)
//! - Answer grading with whitespace/case normalization
//! - Session state tracking across three termination modes
//!
//! The engine is pure computation over in-memory state plus an injected
//! random source. No I/O, no ambient state: callers own the session value
//! and persist it between operations.

/// Core quiz components: vocabulary, question drawing, grading, sessions.
pub mod quiz;

/// Error taxonomy shared by every engine operation.
pub mod error;
