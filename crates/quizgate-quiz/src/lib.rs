//! The quiz side of Quizgate: questions, answers, scores.
//!
//! All per-user state lives in the [`SessionPayload`](quizgate_token::SessionPayload)
//! carried by the session token. This crate reads and updates that payload;
//! the HTTP layer is responsible for decoding it from the request and
//! writing it back.
//!
//! # Key types
//!
//! - [`QuestionBank`] — immutable set of questions, loaded at boot
//! - [`PublicQuestion`] — a question without its answer key
//! - [`next_question`], [`submit_answer`], [`score_report`] — play

mod bank;
mod error;
mod logic;

pub use bank::{Answer, AnswerKey, PublicQuestion, Question, QuestionBank, QuestionType};
pub use error::QuizError;
pub use logic::{AnswerOutcome, ScoreReport, next_question, score_report, submit_answer};
