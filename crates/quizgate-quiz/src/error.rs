//! Error types for the quiz layer.

use quizgate_token::QuestionId;

/// Errors from loading the question bank or playing a question.
#[derive(Debug, thiserror::Error)]
pub enum QuizError {
    /// No question with this ID exists in the bank.
    #[error("question {0} not found")]
    QuestionNotFound(QuestionId),

    /// Every question in the bank has already been answered.
    #[error("no more questions available")]
    Exhausted,

    /// The question was answered earlier in this session.
    #[error("question {0} already answered")]
    AlreadyAnswered(QuestionId),

    /// The bank file couldn't be read.
    #[error("failed to read question bank: {0}")]
    Io(#[from] std::io::Error),

    /// The bank file isn't valid JSON of the expected shape.
    #[error("failed to parse question bank: {0}")]
    Parse(#[from] serde_json::Error),

    /// The bank parsed but breaks an invariant.
    #[error("invalid question bank: {0}")]
    InvalidBank(String),
}
