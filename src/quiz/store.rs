use std::fs::File;
use std::io::BufReader;
use std::ops::RangeInclusive;
use std::path::{Path, PathBuf};

use crate::quiz::error::QuestionStoreError;
use crate::quiz::Question;

pub const UNITS: RangeInclusive<u8> = 1..=5;

/// Read-only access to the per-unit question files.
#[derive(Debug, Clone)]
pub struct QuestionStore {
    data_dir: PathBuf,
}

impl QuestionStore {
    pub fn new(data_dir: impl Into<PathBuf>) -> Self {
        Self {
            data_dir: data_dir.into(),
        }
    }

    pub fn unit_path(&self, unit: u8) -> PathBuf {
        self.data_dir.join(format!("unit{}.json", unit))
    }

    /// Loads every question of `unit`, in file order.
    ///
    /// Each record's `answer` must be the literal text of one of its options.
    pub fn load_unit(&self, unit: u8) -> Result<Vec<Question>, QuestionStoreError> {
        if !UNITS.contains(&unit) {
            return Err(QuestionStoreError::UnknownUnit(unit));
        }

        let path = self.unit_path(unit);
        if !path.exists() {
            log::warn!("Question file {} is missing", path.display());
            return Err(QuestionStoreError::NotFound(path));
        }

        let reader = BufReader::new(File::open(&path)?);
        let questions: Vec<Question> = serde_json::from_reader(reader)?;

        if let Some(index) = questions.iter().position(|q| !q.has_option(&q.answer)) {
            return Err(QuestionStoreError::AnswerNotInOptions { index });
        }

        log::debug!("Loaded {} questions for unit {}", questions.len(), unit);
        Ok(questions)
    }
}
