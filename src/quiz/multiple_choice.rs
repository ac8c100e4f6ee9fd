use std::collections::BTreeMap;

use crate::quiz::error::LeaderboardError;
use crate::quiz::leaderboard::{Board, LeaderboardRow, LeaderboardStore};
use crate::quiz::session::Session;
use crate::quiz::{DifficultyCounts, Question, POINTS_PER_CORRECT};

/// Position in the unit's fixed question list.
#[derive(Debug, Clone, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct QuizProgress {
    pub current: usize,
    pub answers: BTreeMap<usize, String>,
    pub counts: DifficultyCounts,
}

impl QuizProgress {
    fn restart(&mut self) {
        *self = QuizProgress::default();
    }
}

#[derive(Debug)]
pub enum QuizStep {
    /// Nothing selected; re-render the same question.
    Ignored,
    Advanced { correct: bool, next: usize },
    Finished(QuizCompletion),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QuizFeedback {
    FirstAttempt,
    Improved,
    Maintained,
    Declined,
}

impl QuizFeedback {
    /// A previous score of 0 counts as no previous attempt.
    pub fn compare(previous: Option<u32>, score: u32) -> Self {
        match previous.unwrap_or(0) {
            0 => QuizFeedback::FirstAttempt,
            previous if score > previous => QuizFeedback::Improved,
            previous if score == previous => QuizFeedback::Maintained,
            _ => QuizFeedback::Declined,
        }
    }

    pub fn message(&self) -> &'static str {
        match self {
            QuizFeedback::FirstAttempt => "This is your first quiz! Keep it up!",
            QuizFeedback::Improved => "🌟 Great job! You've improved your score!",
            QuizFeedback::Maintained => "You maintained your score. Keep it up!",
            QuizFeedback::Declined => {
                "Don't be discouraged! Try to improve your score next time."
            }
        }
    }
}

#[derive(Debug)]
pub struct QuizCompletion {
    pub score: u32,
    pub feedback: QuizFeedback,
    pub row: LeaderboardRow,
    /// Set when the leaderboard could not be rewritten.
    pub save_error: Option<LeaderboardError>,
}

/// Switching units restarts the attempt; re-selecting the same unit keeps it.
pub fn select_unit(session: &mut Session, unit: u8) {
    if session.unit != Some(unit) {
        log::debug!("{} switched to unit {}", session.username, unit);
        session.unit = Some(unit);
        session.quiz.restart();
    }
}

/// Drives one unit's multiple-choice attempt.
pub struct QuizController<'a> {
    unit: u8,
    questions: &'a [Question],
    leaderboard: &'a LeaderboardStore,
}

impl<'a> QuizController<'a> {
    pub fn new(unit: u8, questions: &'a [Question], leaderboard: &'a LeaderboardStore) -> Self {
        Self {
            unit,
            questions,
            leaderboard,
        }
    }

    pub fn total(&self) -> usize {
        self.questions.len()
    }

    /// The question being answered, or `None` for an empty unit.
    ///
    /// An index left past the end by a shrunken question file is pulled back to 0.
    pub fn current_question(&self, session: &mut Session) -> Option<&'a Question> {
        if session.quiz.current >= self.questions.len() {
            session.quiz.current = 0;
        }
        self.questions.get(session.quiz.current)
    }

    pub fn submit(&self, session: &mut Session, selection: Option<&str>) -> QuizStep {
        let Some(question) = self.current_question(session) else {
            return QuizStep::Ignored;
        };
        let selection = match selection.map(str::trim) {
            Some(selection) if !selection.is_empty() && question.has_option(selection) => {
                selection
            }
            _ => return QuizStep::Ignored,
        };

        let index = session.quiz.current;
        let correct = question.is_correct(selection);
        session.quiz.answers.insert(index, selection.to_string());
        if correct {
            session.quiz.counts.record(question.difficulty);
        }

        session.quiz.current += 1;
        if session.quiz.current < self.questions.len() {
            return QuizStep::Advanced {
                correct,
                next: session.quiz.current,
            };
        }

        QuizStep::Finished(self.finish(session))
    }

    /// Correct answers in the recorded answer set, times ten.
    pub fn score(&self, answers: &BTreeMap<usize, String>) -> u32 {
        let correct = self
            .questions
            .iter()
            .enumerate()
            .filter(|(i, q)| answers.get(i).is_some_and(|a| q.is_correct(a)))
            .count() as u32;
        correct * POINTS_PER_CORRECT
    }

    fn finish(&self, session: &mut Session) -> QuizCompletion {
        let score = self.score(&session.quiz.answers);
        session.score = score;

        let row = LeaderboardRow::new(
            &session.username,
            score,
            Some(format!("Quiz {}", self.unit)),
            session.quiz.counts,
        );
        let save_error = self
            .leaderboard
            .append_and_save(Board::Quiz, row.clone())
            .err();
        if let Some(err) = &save_error {
            log::error!("Failed to save quiz leaderboard: {}", err);
        }

        let feedback = QuizFeedback::compare(session.previous_quiz_score, score);
        session.previous_quiz_score = Some(score);
        session.quiz.restart();

        log::info!(
            "{} finished unit {} with {} points",
            session.username,
            self.unit,
            score
        );

        QuizCompletion {
            score,
            feedback,
            row,
            save_error,
        }
    }
}
