use std::time::Duration;

use crate::quiz::Question;

/// One quiz attempt, moved by value through the answer flow. A fresh
/// (`Default`) session has no questions and represents the idle state.
#[derive(Debug, Clone, Default, serde::Serialize, serde::Deserialize)]
pub struct QuizSession {
    pub questions: Vec<Question>,
    pub current: usize,
    pub score: usize,
    pub history: Vec<AnsweredRecord>,
}

#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct AnsweredRecord {
    pub question: String,
    pub response: String,
    pub correct: bool,
    pub explanation: String,
}

/// Outcome of a single answer, including how long the feedback should stay
/// on screen before the next question.
#[derive(Debug, Clone)]
pub struct Verdict {
    pub correct: bool,
    pub explanation: String,
    pub delay: Duration,
}

impl QuizSession {
    pub fn new(questions: Vec<Question>) -> Self {
        Self {
            questions,
            current: 0,
            score: 0,
            history: Vec::new(),
        }
    }

    pub fn current_question(&self) -> Option<&Question> {
        self.questions.get(self.current)
    }

    pub fn total(&self) -> usize {
        self.questions.len()
    }

    pub fn is_complete(&self) -> bool {
        self.current >= self.questions.len()
    }

    /// Grades `response` against the current question and advances. Answers
    /// arriving after the last question are ignored and return no verdict.
    pub fn answer(mut self, response: &str) -> (Self, Option<Verdict>) {
        let Some(question) = self.questions.get(self.current) else {
            return (self, None);
        };

        let correct = grade(response, &question.answer);
        let explanation = question.explanation.clone();

        self.history.push(AnsweredRecord {
            question: question.question.clone(),
            response: response.to_string(),
            correct,
            explanation: explanation.clone(),
        });
        if correct {
            self.score += 1;
        }
        self.current += 1;

        let verdict = Verdict {
            correct,
            explanation,
            delay: feedback_delay(correct),
        };
        (self, Some(verdict))
    }

    pub fn rank(&self) -> &'static str {
        rank(self.score, self.questions.len())
    }
}

/// Sole correctness rule: trimmed, lowercase string equality. Multiple-choice
/// answers are compared by option text, never by index.
pub fn grade(response: &str, answer: &str) -> bool {
    response.trim().to_lowercase() == answer.trim().to_lowercase()
}

/// A miss keeps the explanation on screen a second longer than a hit.
pub fn feedback_delay(correct: bool) -> Duration {
    if correct {
        Duration::from_millis(1500)
    } else {
        Duration::from_millis(2500)
    }
}

/// Percent is integer division, so boundaries truncate (3/7 -> 42).
pub fn rank(score: usize, total: usize) -> &'static str {
    if total == 0 {
        return "Try Again";
    }
    match score * 100 / total {
        100.. => "Quiz Master",
        80..=99 => "Expert",
        60..=79 => "Advanced",
        40..=59 => "Intermediate",
        20..=39 => "Beginner",
        _ => "Try Again",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::quiz::QuestionKind;

    fn capitals_quiz() -> Vec<Question> {
        vec![
            Question::new(
                QuestionKind::OneWord,
                "Capital of France?".into(),
                "Paris".into(),
                "Paris has been the capital since 987.".into(),
            ),
            Question::new(
                QuestionKind::Mcq,
                "Capital of Japan?".into(),
                "Tokyo".into(),
                "Tokyo replaced Kyoto in 1868.".into(),
            )
            .with_options(vec!["Tokyo".into(), "Kyoto".into(), "Osaka".into()]),
            Question::new(
                QuestionKind::Fill,
                "The capital of Italy is ____.".into(),
                "Rome".into(),
                "Rome, since unification in 1871.".into(),
            ),
        ]
    }

    #[test]
    fn grading_ignores_case_and_whitespace() {
        for response in ["Paris", "paris", " Paris ", "PARIS"] {
            assert!(grade(response, "Paris"), "{response:?} should be correct");
        }
        assert!(!grade("Lyon", "Paris"));
    }

    #[test]
    fn answer_appends_history_and_scores() {
        let session = QuizSession::new(capitals_quiz());
        let (session, verdict) = session.answer("paris");
        assert!(verdict.unwrap().correct);
        let (session, verdict) = session.answer("Osaka");
        let verdict = verdict.unwrap();
        assert!(!verdict.correct);
        assert_eq!(verdict.explanation, "Tokyo replaced Kyoto in 1868.");

        assert_eq!(session.current, 2);
        assert_eq!(session.history.len(), session.current);
        assert_eq!(session.score, 1);
        assert_eq!(
            session.score,
            session.history.iter().filter(|r| r.correct).count()
        );
    }

    #[test]
    fn session_completes_after_last_question() {
        let mut session = QuizSession::new(capitals_quiz());
        for response in ["Paris", "Tokyo", "Rome"] {
            assert!(!session.is_complete());
            let (next, verdict) = session.answer(response);
            assert!(verdict.is_some());
            session = next;
        }
        assert!(session.is_complete());
        assert_eq!(session.score, 3);
        assert_eq!(session.rank(), "Quiz Master");
    }

    #[test]
    fn answers_after_completion_are_ignored() {
        let mut session = QuizSession::new(capitals_quiz());
        for response in ["Paris", "Tokyo", "Rome"] {
            session = session.answer(response).0;
        }
        let (session, verdict) = session.answer("anything");
        assert!(verdict.is_none());
        assert_eq!(session.current, 3);
        assert_eq!(session.history.len(), 3);
        assert_eq!(session.score, 3);
    }

    #[test]
    fn restart_discards_everything() {
        let mut session = QuizSession::new(capitals_quiz());
        session = session.answer("Paris").0;
        session = QuizSession::default();
        assert!(session.questions.is_empty());
        assert_eq!(session.current, 0);
        assert_eq!(session.score, 0);
        assert!(session.history.is_empty());
    }

    #[test]
    fn feedback_pause_is_longer_after_a_miss() {
        assert_eq!(feedback_delay(true), Duration::from_millis(1500));
        assert_eq!(feedback_delay(false), Duration::from_millis(2500));
    }

    #[test]
    fn rank_boundaries() {
        assert_eq!(rank(5, 5), "Quiz Master");
        assert_eq!(rank(4, 5), "Expert");
        assert_eq!(rank(3, 5), "Advanced");
        assert_eq!(rank(2, 5), "Intermediate");
        assert_eq!(rank(1, 5), "Beginner");
        assert_eq!(rank(0, 5), "Try Again");
    }

    #[test]
    fn rank_percent_truncates() {
        // 3/7 = 42.86% -> 42
        assert_eq!(rank(3, 7), "Intermediate");
        // 4/7 = 57.1% -> 57
        assert_eq!(rank(4, 7), "Intermediate");
        assert_eq!(rank(0, 0), "Try Again");
    }
}
