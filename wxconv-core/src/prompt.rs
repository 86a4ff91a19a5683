//! Operator confirmation
//!
//! The pipeline asks before deleting an existing output directory. How the
//! question is answered (terminal prompt, `--yes`, a test double) is up to the
//! caller.

/// Answers yes/no questions before destructive steps
pub trait Confirm {
    fn confirm(&mut self, question: &str) -> bool;
}

/// Answers yes to every question
#[derive(Debug, Clone, Copy, Default)]
pub struct AssumeYes;

impl Confirm for AssumeYes {
    fn confirm(&mut self, question: &str) -> bool {
        tracing::debug!("Auto-confirmed: {}", question);
        true
    }
}

/// Interpret a typed answer; only `y` (any case) accepts
pub fn is_affirmative(answer: &str) -> bool {
    answer.trim().eq_ignore_ascii_case("y")
}
