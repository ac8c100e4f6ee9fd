//! Fill-in-the-blank flow: ten slots, each generated by the oracle on demand.

use std::collections::BTreeMap;

use rand::seq::SliceRandom;
use rand::Rng;

use crate::quiz::ai_helper::QuizHelper;
use crate::quiz::error::{LeaderboardError, MalformedResponse};
use crate::quiz::leaderboard::{Board, LeaderboardRow, LeaderboardStore};
use crate::quiz::oracle::Reply;
use crate::quiz::session::Session;
use crate::quiz::{BlankQuestion, Difficulty, DifficultyCounts, POINTS_PER_CORRECT};

pub const SLOTS: usize = 10;

const QUESTION_MARKER: &str = "Question:";
const ANSWER_MARKER: &str = "Answer:";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Topic {
    OperatingSystem,
    ArtificialIntelligence,
    PythonProgramming,
}

impl Topic {
    pub const ALL: [Topic; 3] = [
        Topic::OperatingSystem,
        Topic::ArtificialIntelligence,
        Topic::PythonProgramming,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            Topic::OperatingSystem => "Operating System",
            Topic::ArtificialIntelligence => "Artificial Intelligence",
            Topic::PythonProgramming => "Python Programming",
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct BlankProgress {
    pub current: usize,
    pub questions: BTreeMap<usize, BlankQuestion>,
    pub counts: DifficultyCounts,
    /// Set once the oracle answered in an unparseable shape.
    pub halted: bool,
}

impl BlankProgress {
    pub fn current_question(&self) -> Option<&BlankQuestion> {
        self.questions.get(&self.current)
    }

    pub fn is_finished(&self) -> bool {
        self.current >= SLOTS
    }

    pub fn restart(&mut self) {
        *self = BlankProgress::default();
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedBlank {
    pub question: String,
    pub answer: String,
}

/// Reads `Question: <text> Answer: <text>` out of an oracle reply.
pub fn parse_response(response: &str) -> Result<ParsedBlank, MalformedResponse> {
    let (_, after_question) = response
        .split_once(QUESTION_MARKER)
        .ok_or(MalformedResponse)?;
    let (question, answer) = after_question
        .split_once(ANSWER_MARKER)
        .ok_or(MalformedResponse)?;

    // A second "Answer:" ends the answer.
    let answer = answer
        .split_once(ANSWER_MARKER)
        .map_or(answer, |(first, _)| first);
    let question = question.trim();
    let answer = answer.trim();
    if question.is_empty() || answer.is_empty() {
        return Err(MalformedResponse);
    }

    Ok(ParsedBlank {
        question: question.to_string(),
        answer: answer.to_string(),
    })
}

pub fn draw_request<R: Rng + ?Sized>(rng: &mut R) -> (Difficulty, Topic) {
    // Both arrays are non-empty constants.
    let difficulty = *Difficulty::ALL.choose(rng).unwrap_or(&Difficulty::Easy);
    let topic = *Topic::ALL.choose(rng).unwrap_or(&Topic::OperatingSystem);
    (difficulty, topic)
}

#[derive(Debug)]
pub enum Slot {
    Ready {
        index: usize,
        question: BlankQuestion,
        /// Oracle notice from generating this slot, if any.
        notice: Option<String>,
    },
    Malformed {
        notice: Option<String>,
    },
    Halted,
    Finished,
}

/// Returns the question for the current slot, generating it first if needed.
pub async fn prepare(session: &mut Session, helper: &QuizHelper) -> Slot {
    let progress = &mut session.blanks;
    if progress.halted {
        return Slot::Halted;
    }
    if progress.is_finished() {
        return Slot::Finished;
    }

    let index = progress.current;
    if let Some(question) = progress.current_question() {
        return Slot::Ready {
            index,
            question: question.clone(),
            notice: None,
        };
    }

    let (difficulty, topic) = draw_request(&mut rand::thread_rng());
    let reply = helper.generate_blank(difficulty, topic).await;

    match parse_response(&reply.text) {
        Ok(parsed) => {
            let question = BlankQuestion {
                text: parsed.question,
                answer: parsed.answer,
                difficulty,
            };
            progress.questions.insert(index, question.clone());
            Slot::Ready {
                index,
                question,
                notice: reply.notice,
            }
        }
        Err(err) => {
            log::warn!("Slot {} halted: {} ({:?})", index, err, reply.text);
            progress.halted = true;
            Slot::Malformed {
                notice: reply.notice,
            }
        }
    }
}

#[derive(Debug)]
pub enum BlankAnswer {
    Correct,
    Incorrect {
        correct_answer: String,
        explanation: Reply,
    },
}

#[derive(Debug)]
pub struct AnswerOutcome {
    pub result: BlankAnswer,
    pub finished: bool,
}

/// Grades `input` against the current slot and moves on either way.
///
/// Returns `None` when there is no generated question to answer.
pub async fn answer(
    session: &mut Session,
    helper: &QuizHelper,
    input: &str,
) -> Option<AnswerOutcome> {
    if session.blanks.halted || session.blanks.is_finished() {
        return None;
    }
    let question = session.blanks.current_question()?.clone();

    let result = if question.accepts(input) {
        session.score += POINTS_PER_CORRECT;
        session.blanks.counts.record(question.difficulty);
        BlankAnswer::Correct
    } else {
        let explanation = helper.explain_blank_answer(&question).await;
        BlankAnswer::Incorrect {
            correct_answer: question.answer,
            explanation,
        }
    };

    session.blanks.current += 1;
    Some(AnswerOutcome {
        result,
        finished: session.blanks.is_finished(),
    })
}

/// Hint for the current slot; leaves the flow untouched.
pub async fn hint(session: &Session, helper: &QuizHelper) -> Option<Reply> {
    let question = session.blanks.current_question()?;
    Some(helper.hint_for_blank(question).await)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScoreBand {
    Outstanding,
    Great,
    Fair,
    NeedsPractice,
    TryAgain,
}

impl ScoreBand {
    pub fn classify(score: u32) -> Self {
        match score {
            90..=u32::MAX => ScoreBand::Outstanding,
            70..=89 => ScoreBand::Great,
            50..=69 => ScoreBand::Fair,
            30..=49 => ScoreBand::NeedsPractice,
            _ => ScoreBand::TryAgain,
        }
    }

    pub fn message(&self, score: u32) -> String {
        match self {
            ScoreBand::Outstanding => format!(
                "🌟 Outstanding! You scored {}/100. Truly exceptional work!",
                score
            ),
            ScoreBand::Great => format!(
                "👍 Great Job! You scored {}/100. Keep aiming higher!",
                score
            ),
            ScoreBand::Fair => format!(
                "📈 Fair Attempt! You scored {}/100. Keep practicing and you'll improve!",
                score
            ),
            ScoreBand::NeedsPractice => format!(
                "⚡ Needs More Practice. You scored {}/100. Don't give up!",
                score
            ),
            ScoreBand::TryAgain => format!(
                "🛠️ Try Again. You scored {}/100. Failure is part of success!",
                score
            ),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScoreChange {
    FirstAttempt,
    Improved(u32),
    Decreased(u32),
    Matched,
}

impl ScoreChange {
    pub fn between(previous: Option<u32>, score: u32) -> Self {
        match previous {
            None => ScoreChange::FirstAttempt,
            Some(previous) if score > previous => ScoreChange::Improved(score - previous),
            Some(previous) if score < previous => ScoreChange::Decreased(previous - score),
            Some(_) => ScoreChange::Matched,
        }
    }

    pub fn message(&self, score: u32) -> String {
        match self {
            ScoreChange::FirstAttempt => format!(
                "This was your first attempt! 🎉 Well done scoring {}/100!",
                score
            ),
            ScoreChange::Improved(diff) => format!(
                "📈 You improved by {} points compared to your last attempt!",
                diff
            ),
            ScoreChange::Decreased(diff) => format!(
                "📉 Your score decreased by {} points. Reflect and bounce back!",
                diff
            ),
            ScoreChange::Matched => {
                "⚡ You matched your previous score! Consistency is impressive!".to_string()
            }
        }
    }
}

#[derive(Debug)]
pub struct BlankCompletion {
    pub score: u32,
    pub band: ScoreBand,
    pub change: ScoreChange,
    pub row: LeaderboardRow,
    pub save_error: Option<LeaderboardError>,
}

/// Records a finished run using the session's cumulative score, then resets
/// the flow so the next visit starts a new attempt.
pub fn finish(session: &mut Session, leaderboard: &LeaderboardStore) -> BlankCompletion {
    let score = session.score;
    let row = LeaderboardRow::new(&session.username, score, None, session.blanks.counts);

    let previous = match leaderboard.load(Board::FillInTheBlank) {
        Ok(table) => table.last_score_for(&session.username),
        Err(err) => {
            log::error!("Failed to read fill-in-the-blank leaderboard: {}", err);
            None
        }
    };
    let save_error = leaderboard
        .append_and_save(Board::FillInTheBlank, row.clone())
        .err();
    if let Some(err) = &save_error {
        log::error!("Failed to save fill-in-the-blank leaderboard: {}", err);
    }

    session.blanks.restart();
    log::info!(
        "{} finished fill-in-the-blank with {} points",
        session.username,
        score
    );

    BlankCompletion {
        score,
        band: ScoreBand::classify(score),
        change: ScoreChange::between(previous, score),
        row,
        save_error,
    }
}
