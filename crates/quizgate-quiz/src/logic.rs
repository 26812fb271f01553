//! Quiz play against a session payload.
//!
//! These functions are pure with respect to the payload: the caller decodes
//! it from the request's token, passes it in, and writes the mutated value
//! back into the response. Nothing here knows about tokens or HTTP.

use quizgate_token::{QuestionId, SessionPayload};
use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::{Answer, PublicQuestion, QuestionBank, QuizError};

/// The result of answering a question.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnswerOutcome {
    pub correct: bool,
    pub score: u32,
    pub explanation: String,
}

/// Score summary for `GET /api/score`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScoreReport {
    pub score: u32,
    pub answered: usize,
}

/// Picks a question the session hasn't seen yet.
///
/// # Errors
/// [`QuizError::Exhausted`] once every question has been answered.
pub fn next_question<R: Rng + ?Sized>(
    bank: &QuestionBank,
    payload: &SessionPayload,
    rng: &mut R,
) -> Result<PublicQuestion, QuizError> {
    bank.pick_unanswered(payload, rng)
        .map(|q| q.public())
        .ok_or(QuizError::Exhausted)
}

/// Checks an answer and updates the payload.
///
/// A question counts once: the first answer consumes it, right or wrong.
/// The payload is left untouched on error.
pub fn submit_answer(
    bank: &QuestionBank,
    payload: &mut SessionPayload,
    question_id: QuestionId,
    answer: Answer,
) -> Result<AnswerOutcome, QuizError> {
    let question = bank
        .get(question_id)
        .ok_or(QuizError::QuestionNotFound(question_id))?;

    if !payload.mark_answered(question_id) {
        return Err(QuizError::AlreadyAnswered(question_id));
    }

    let correct = question.key.accepts(answer);
    if correct {
        payload.score = payload.score.saturating_add(1);
    }

    tracing::debug!(
        identity = %payload.identity,
        question = %question_id,
        correct,
        score = payload.score,
        "answer recorded"
    );

    Ok(AnswerOutcome {
        correct,
        score: payload.score,
        explanation: question.explanation.clone(),
    })
}

/// The session's score and how many questions it has answered.
pub fn score_report(payload: &SessionPayload) -> ScoreReport {
    ScoreReport {
        score: payload.score,
        answered: payload.answered_questions.len(),
    }
}
