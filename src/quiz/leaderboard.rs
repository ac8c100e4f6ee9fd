//! Spreadsheet-style leaderboards, one CSV file per flow.
//!
//! Every update reads the whole file, appends one row and rewrites it.
//! Nothing serializes concurrent writers: if two attempts finish at the same
//! moment the last rewrite wins.

use std::path::{Path, PathBuf};

use crate::quiz::error::LeaderboardError;
use crate::quiz::DifficultyCounts;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Board {
    Quiz,
    FillInTheBlank,
}

impl Board {
    pub const ALL: [Board; 2] = [Board::Quiz, Board::FillInTheBlank];

    pub fn label(&self) -> &'static str {
        match self {
            Board::Quiz => "Quiz",
            Board::FillInTheBlank => "Fill in the Blank",
        }
    }

    /// Keyboard text; distinct from the page buttons.
    pub fn button(&self) -> String {
        format!("🏆 {}", self.label())
    }

    pub fn from_button(text: &str) -> Option<Board> {
        Board::ALL
            .into_iter()
            .find(|board| board.button() == text.trim())
    }

    pub fn file_name(&self) -> &'static str {
        match self {
            Board::Quiz => "quiz_leaderboard.csv",
            Board::FillInTheBlank => "fill_leaderboard.csv",
        }
    }

    pub fn columns(&self) -> &'static [&'static str] {
        match self {
            Board::Quiz => &["Name", "Score", "Quiz", "Easy", "Medium", "Difficult"],
            Board::FillInTheBlank => &["Name", "Score", "Easy", "Medium", "Difficult"],
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, serde::Deserialize)]
pub struct LeaderboardRow {
    #[serde(rename = "Name")]
    pub name: String,
    #[serde(rename = "Score")]
    pub score: u32,
    #[serde(rename = "Quiz", default)]
    pub quiz: Option<String>,
    #[serde(rename = "Easy")]
    pub easy: u32,
    #[serde(rename = "Medium")]
    pub medium: u32,
    #[serde(rename = "Difficult")]
    pub difficult: u32,
}

impl LeaderboardRow {
    pub fn new(name: &str, score: u32, quiz: Option<String>, counts: DifficultyCounts) -> Self {
        Self {
            name: name.to_string(),
            score,
            quiz,
            easy: counts.easy,
            medium: counts.medium,
            difficult: counts.difficult,
        }
    }

    fn record(&self, board: Board) -> Vec<String> {
        let mut record = vec![self.name.clone(), self.score.to_string()];
        if board == Board::Quiz {
            record.push(self.quiz.clone().unwrap_or_default());
        }
        record.extend([
            self.easy.to_string(),
            self.medium.to_string(),
            self.difficult.to_string(),
        ]);
        record
    }
}

/// The full contents of one leaderboard file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Leaderboard {
    board: Board,
    rows: Vec<LeaderboardRow>,
}

impl Leaderboard {
    pub fn empty(board: Board) -> Self {
        Self {
            board,
            rows: Vec::new(),
        }
    }

    pub fn board(&self) -> Board {
        self.board
    }

    pub fn rows(&self) -> &[LeaderboardRow] {
        &self.rows
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn push(&mut self, row: LeaderboardRow) {
        self.rows.push(row);
    }

    /// Score of the most recent row for `name`, in file order.
    pub fn last_score_for(&self, name: &str) -> Option<u32> {
        self.rows
            .iter()
            .rev()
            .find(|row| row.name == name)
            .map(|row| row.score)
    }

    /// Rows by descending score; ties keep file order.
    pub fn ranked(&self) -> Vec<&LeaderboardRow> {
        let mut ranked: Vec<&LeaderboardRow> = self.rows.iter().collect();
        ranked.sort_by(|a, b| b.score.cmp(&a.score));
        ranked
    }
}

#[derive(Debug, Clone)]
pub struct LeaderboardStore {
    dir: PathBuf,
}

impl LeaderboardStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn path(&self, board: Board) -> PathBuf {
        self.dir.join(board.file_name())
    }

    pub fn exists(&self, board: Board) -> bool {
        self.path(board).exists()
    }

    /// An absent file reads as an empty table.
    pub fn load(&self, board: Board) -> Result<Leaderboard, LeaderboardError> {
        let path = self.path(board);
        if !path.exists() {
            return Ok(Leaderboard::empty(board));
        }

        let mut reader = csv::Reader::from_path(&path)?;
        let mut table = Leaderboard::empty(board);
        for row in reader.deserialize() {
            table.push(row?);
        }
        Ok(table)
    }

    pub fn save(&self, table: &Leaderboard) -> Result<(), LeaderboardError> {
        write_table(&self.path(table.board), table)
    }

    pub fn append_and_save(
        &self,
        board: Board,
        row: LeaderboardRow,
    ) -> Result<Leaderboard, LeaderboardError> {
        let mut table = self.load(board)?;
        log::info!(
            "Recording {} points for {} on the {} leaderboard",
            row.score,
            row.name,
            board.label()
        );
        table.push(row);
        self.save(&table)?;
        Ok(table)
    }
}

fn write_table(path: &Path, table: &Leaderboard) -> Result<(), LeaderboardError> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)?;
        }
    }

    let mut writer = csv::Writer::from_path(path)?;
    writer.write_record(table.board.columns())?;
    for row in &table.rows {
        writer.write_record(row.record(table.board))?;
    }
    writer.flush()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(name: &str, score: u32, quiz: Option<&str>) -> LeaderboardRow {
        LeaderboardRow {
            name: name.to_string(),
            score,
            quiz: quiz.map(str::to_string),
            easy: 1,
            medium: 0,
            difficult: 2,
        }
    }

    #[test]
    fn missing_file_loads_empty_table() {
        let dir = tempfile::tempdir().unwrap();
        let store = LeaderboardStore::new(dir.path());

        let table = store.load(Board::Quiz).unwrap();

        assert!(table.is_empty());
        assert!(!store.exists(Board::Quiz));
    }

    #[test]
    fn append_keeps_existing_rows() {
        let dir = tempfile::tempdir().unwrap();
        let store = LeaderboardStore::new(dir.path());
        store
            .append_and_save(Board::Quiz, row("Ada", 30, Some("Quiz 1")))
            .unwrap();
        store
            .append_and_save(Board::Quiz, row("Linus", 10, Some("Quiz 2")))
            .unwrap();
        let before = store.load(Board::Quiz).unwrap();

        let after = store
            .append_and_save(Board::Quiz, row("Grace", 50, Some("Quiz 5")))
            .unwrap();

        assert_eq!(after.rows().len(), before.rows().len() + 1);
        assert_eq!(&after.rows()[..before.rows().len()], before.rows());
        assert_eq!(store.load(Board::Quiz).unwrap(), after);
    }

    #[test]
    fn fill_board_omits_quiz_column() {
        let dir = tempfile::tempdir().unwrap();
        let store = LeaderboardStore::new(dir.path());
        store
            .append_and_save(Board::FillInTheBlank, row("Ada", 70, None))
            .unwrap();

        let contents = std::fs::read_to_string(store.path(Board::FillInTheBlank)).unwrap();
        let mut lines = contents.lines();
        assert_eq!(lines.next(), Some("Name,Score,Easy,Medium,Difficult"));
        assert_eq!(lines.next(), Some("Ada,70,1,0,2"));

        let table = store.load(Board::FillInTheBlank).unwrap();
        assert_eq!(table.rows()[0].quiz, None);
    }

    #[test]
    fn quiz_board_keeps_quiz_label() {
        let dir = tempfile::tempdir().unwrap();
        let store = LeaderboardStore::new(dir.path());
        store
            .append_and_save(Board::Quiz, row("Ada", 20, Some("Quiz 3")))
            .unwrap();

        let contents = std::fs::read_to_string(store.path(Board::Quiz)).unwrap();
        assert_eq!(contents.lines().next(), Some("Name,Score,Quiz,Easy,Medium,Difficult"));
        let table = store.load(Board::Quiz).unwrap();
        assert_eq!(table.rows()[0].quiz.as_deref(), Some("Quiz 3"));
    }

    #[test]
    fn board_buttons_do_not_collide_with_pages() {
        for board in Board::ALL {
            assert_eq!(Board::from_button(&board.button()), Some(board));
            assert_eq!(crate::quiz::session::Page::from_button(&board.button()), None);
        }
        assert_eq!(Board::from_button("Quiz"), None);
    }

    #[test]
    fn last_score_uses_latest_matching_row() {
        let mut table = Leaderboard::empty(Board::FillInTheBlank);
        table.push(row("Ada", 40, None));
        table.push(row("Linus", 90, None));
        table.push(row("Ada", 60, None));

        assert_eq!(table.last_score_for("Ada"), Some(60));
        assert_eq!(table.last_score_for("Grace"), None);
    }

    #[test]
    fn ranking_is_descending_and_stable() {
        let mut table = Leaderboard::empty(Board::Quiz);
        table.push(row("first", 20, None));
        table.push(row("top", 50, None));
        table.push(row("second", 20, None));

        let names: Vec<&str> = table.ranked().iter().map(|r| r.name.as_str()).collect();
        assert_eq!(names, vec!["top", "first", "second"]);
    }
}
