//! The question bank: an immutable set of questions loaded at boot.

use std::collections::HashSet;
use std::path::Path;

use quizgate_token::{QuestionId, SessionPayload};
use rand::Rng;
use rand::seq::IndexedRandom;
use serde::{Deserialize, Serialize};

use crate::QuizError;

const BUILTIN_QUESTIONS: &str = include_str!("../questions.json");

/// The two question formats.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum QuestionType {
    MultipleChoice,
    TrueFalse,
}

/// What counts as a correct answer, tagged by question type.
///
/// On disk this is flattened into the question object:
///
/// ```text
/// {"id": 1, "type": "multiple_choice", "options": [..], "correct_answer": 2, ..}
/// {"id": 2, "type": "true_false", "correct_answer": false, ..}
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum AnswerKey {
    MultipleChoice {
        options: Vec<String>,
        correct_answer: usize,
    },
    TrueFalse {
        correct_answer: bool,
    },
}

impl AnswerKey {
    pub fn question_type(&self) -> QuestionType {
        match self {
            Self::MultipleChoice { .. } => QuestionType::MultipleChoice,
            Self::TrueFalse { .. } => QuestionType::TrueFalse,
        }
    }

    /// An answer of the wrong shape is simply wrong.
    pub fn accepts(&self, answer: Answer) -> bool {
        match (self, answer) {
            (Self::MultipleChoice { correct_answer, .. }, Answer::Choice(i)) => {
                *correct_answer == i
            }
            (Self::TrueFalse { correct_answer }, Answer::Flag(b)) => *correct_answer == b,
            _ => false,
        }
    }
}

/// A submitted answer: an option index or a true/false flag.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Answer {
    Flag(bool),
    Choice(usize),
}

/// One question in the bank.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Question {
    pub id: QuestionId,
    pub question: String,
    #[serde(default)]
    pub explanation: String,
    #[serde(flatten)]
    pub key: AnswerKey,
}

impl Question {
    /// The client-facing view, without the answer key.
    pub fn public(&self) -> PublicQuestion {
        let options = match &self.key {
            AnswerKey::MultipleChoice { options, .. } => Some(options.clone()),
            AnswerKey::TrueFalse { .. } => None,
        };
        PublicQuestion {
            id: self.id,
            kind: self.key.question_type(),
            question: self.question.clone(),
            options,
        }
    }
}

/// A question as sent to the client. The correct answer and explanation
/// are withheld until the question has been answered.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PublicQuestion {
    pub id: QuestionId,
    #[serde(rename = "type")]
    pub kind: QuestionType,
    pub question: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub options: Option<Vec<String>>,
}

#[derive(Deserialize)]
struct BankFile {
    questions: Vec<Question>,
}

/// All questions the quiz service can ask.
///
/// Built once at boot and shared read-only by every request.
#[derive(Debug, Clone)]
pub struct QuestionBank {
    questions: Vec<Question>,
}

impl QuestionBank {
    /// Builds a bank, checking that IDs are unique and every
    /// multiple-choice key points at one of at least two options.
    pub fn new(questions: Vec<Question>) -> Result<Self, QuizError> {
        if questions.is_empty() {
            return Err(QuizError::InvalidBank("no questions".into()));
        }

        let mut seen = HashSet::new();
        for q in &questions {
            if !seen.insert(q.id) {
                return Err(QuizError::InvalidBank(format!("duplicate id {}", q.id)));
            }
            if let AnswerKey::MultipleChoice {
                options,
                correct_answer,
            } = &q.key
            {
                if options.len() < 2 {
                    return Err(QuizError::InvalidBank(format!(
                        "{} needs at least two options",
                        q.id
                    )));
                }
                if *correct_answer >= options.len() {
                    return Err(QuizError::InvalidBank(format!(
                        "{} correct answer {} out of range",
                        q.id, correct_answer
                    )));
                }
            }
        }

        Ok(Self { questions })
    }

    /// Parses `{"questions": [..]}`.
    pub fn from_json_str(json: &str) -> Result<Self, QuizError> {
        let file: BankFile = serde_json::from_str(json)?;
        Self::new(file.questions)
    }

    /// The bank compiled into the binary.
    pub fn builtin() -> Result<Self, QuizError> {
        Self::from_json_str(BUILTIN_QUESTIONS)
    }

    /// Reads and parses a bank file.
    pub async fn load(path: impl AsRef<Path>) -> Result<Self, QuizError> {
        let text = tokio::fs::read_to_string(path.as_ref()).await?;
        let bank = Self::from_json_str(&text)?;
        tracing::info!(
            path = %path.as_ref().display(),
            questions = bank.len(),
            "question bank loaded"
        );
        Ok(bank)
    }

    pub fn get(&self, id: QuestionId) -> Option<&Question> {
        self.questions.iter().find(|q| q.id == id)
    }

    /// Picks a random question the session hasn't answered yet.
    pub fn pick_unanswered<R: Rng + ?Sized>(
        &self,
        payload: &SessionPayload,
        rng: &mut R,
    ) -> Option<&Question> {
        let available: Vec<&Question> = self
            .questions
            .iter()
            .filter(|q| !payload.has_answered(q.id))
            .collect();
        available.choose(rng).copied()
    }

    pub fn len(&self) -> usize {
        self.questions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.questions.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Question> {
        self.questions.iter()
    }
}
