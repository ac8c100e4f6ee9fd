pub mod ai_helper;
pub mod error;
pub mod fill_blank;
pub mod leaderboard;
pub mod multiple_choice;
pub mod oracle;
pub mod session;
pub mod store;

/// Points awarded for every correct answer, in both flows.
pub const POINTS_PER_CORRECT: u32 = 10;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Difficulty {
    Easy,
    Medium,
    Difficult,
}

impl Difficulty {
    pub const ALL: [Difficulty; 3] = [Difficulty::Easy, Difficulty::Medium, Difficulty::Difficult];

    pub fn as_str(&self) -> &'static str {
        match self {
            Difficulty::Easy => "easy",
            Difficulty::Medium => "medium",
            Difficulty::Difficult => "difficult",
        }
    }

    /// Capitalized form shown as "Difficulty Level: ..."
    pub fn title(&self) -> &'static str {
        match self {
            Difficulty::Easy => "Easy",
            Difficulty::Medium => "Medium",
            Difficulty::Difficult => "Difficult",
        }
    }
}

/// A multiple-choice record as stored in `unit{N}.json`.
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct Question {
    #[serde(rename = "question")]
    pub text: String,
    pub options: Vec<String>,
    pub answer: String,
    pub difficulty: Difficulty,
}

impl Question {
    pub fn is_correct(&self, selection: &str) -> bool {
        self.answer == selection
    }

    pub fn has_option(&self, selection: &str) -> bool {
        self.options.iter().any(|option| option == selection)
    }
}

/// A fill-in-the-blank item synthesized by the oracle for one slot.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct BlankQuestion {
    pub text: String,
    pub answer: String,
    pub difficulty: Difficulty,
}

impl BlankQuestion {
    /// Case-insensitive match; only the user's input is trimmed.
    pub fn accepts(&self, input: &str) -> bool {
        input.trim().to_lowercase() == self.answer.to_lowercase()
    }
}

/// Correct answers per difficulty for the running attempt.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct DifficultyCounts {
    pub easy: u32,
    pub medium: u32,
    pub difficult: u32,
}

impl DifficultyCounts {
    pub fn record(&mut self, difficulty: Difficulty) {
        match difficulty {
            Difficulty::Easy => self.easy += 1,
            Difficulty::Medium => self.medium += 1,
            Difficulty::Difficult => self.difficult += 1,
        }
    }

    pub fn get(&self, difficulty: Difficulty) -> u32 {
        match difficulty {
            Difficulty::Easy => self.easy,
            Difficulty::Medium => self.medium,
            Difficulty::Difficult => self.difficult,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn difficulty_reads_lowercase_json() {
        let parsed: Vec<Difficulty> =
            serde_json::from_str(r#"["easy", "medium", "difficult"]"#).unwrap();
        assert_eq!(parsed, Difficulty::ALL.to_vec());
        assert!(serde_json::from_str::<Difficulty>(r#""hard""#).is_err());
    }

    #[test]
    fn blank_answer_ignores_case_and_surrounding_whitespace() {
        let blank = BlankQuestion {
            text: "The capital of France is ____.".to_string(),
            answer: "Paris".to_string(),
            difficulty: Difficulty::Easy,
        };
        for input in ["Paris", " paris ", "PARIS"] {
            assert!(blank.accepts(input), "{input:?} should match");
        }
        assert!(!blank.accepts("Pari s"));
        assert!(!blank.accepts(""));
    }

    #[test]
    fn counts_track_each_difficulty() {
        let mut counts = DifficultyCounts::default();
        counts.record(Difficulty::Easy);
        counts.record(Difficulty::Difficult);
        counts.record(Difficulty::Difficult);
        assert_eq!(counts.get(Difficulty::Easy), 1);
        assert_eq!(counts.get(Difficulty::Medium), 0);
        assert_eq!(counts.get(Difficulty::Difficult), 2);
    }
}
