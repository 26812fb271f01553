//! Plays the built-in bank end to end through session tokens, the way the
//! quiz service does: decode, play, re-encode, repeat.

use std::time::Duration;

use quizgate_quiz::{
    Answer, AnswerKey, QuestionBank, QuizError, next_question, score_report, submit_answer,
};
use quizgate_token::{SessionPayload, SigningSecret, TokenCodec};

fn codec() -> TokenCodec {
    TokenCodec::new(
        SigningSecret::new("quiz-flow-secret").unwrap(),
        Duration::from_secs(1800),
    )
}

#[test]
fn test_full_game_through_tokens_answers_every_question_once() {
    let bank = QuestionBank::builtin().unwrap();
    let codec = codec();
    let mut token = codec.issue(&SessionPayload::new("admin")).unwrap();
    let expires_at = codec.decode_claims(token.as_str()).unwrap().expires_at;
    let mut rng = rand::rng();

    for round in 1..=bank.len() {
        let mut payload = codec.decode(token.as_str()).unwrap();

        let public = next_question(&bank, &payload, &mut rng).unwrap();
        let question = bank.get(public.id).unwrap();
        let answer = match &question.key {
            AnswerKey::MultipleChoice { correct_answer, .. } => Answer::Choice(*correct_answer),
            AnswerKey::TrueFalse { correct_answer } => Answer::Flag(*correct_answer),
        };

        let outcome = submit_answer(&bank, &mut payload, public.id, answer).unwrap();
        assert!(outcome.correct);
        assert_eq!(outcome.score as usize, round);

        token = codec.encode(&payload, expires_at).unwrap();
    }

    let payload = codec.decode(token.as_str()).unwrap();
    let report = score_report(&payload);
    assert_eq!(report.score as usize, bank.len());
    assert_eq!(report.answered, bank.len());
    assert!(matches!(
        next_question(&bank, &payload, &mut rng),
        Err(QuizError::Exhausted)
    ));
}

#[test]
fn test_stale_token_replay_cannot_double_score_within_fresh_token() {
    let bank = QuestionBank::builtin().unwrap();
    let codec = codec();
    let token = codec.issue(&SessionPayload::new("user1")).unwrap();
    let q = bank.iter().next().unwrap();
    let answer = match &q.key {
        AnswerKey::MultipleChoice { correct_answer, .. } => Answer::Choice(*correct_answer),
        AnswerKey::TrueFalse { correct_answer } => Answer::Flag(*correct_answer),
    };

    let mut payload = codec.decode(token.as_str()).unwrap();
    submit_answer(&bank, &mut payload, q.id, answer).unwrap();
    let refreshed = codec.issue(&payload).unwrap();

    let mut again = codec.decode(refreshed.as_str()).unwrap();
    let err = submit_answer(&bank, &mut again, q.id, answer).unwrap_err();

    assert!(matches!(err, QuizError::AlreadyAnswered(_)));
    assert_eq!(again.score, 1);
}
