use crate::quiz::error::SessionError;
use crate::quiz::fill_blank::BlankProgress;
use crate::quiz::multiple_choice::QuizProgress;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub enum Page {
    #[default]
    Home,
    Quiz,
    FillInTheBlank,
    Leaderboard,
    Doubt,
}

impl Page {
    pub const ALL: [Page; 5] = [
        Page::Home,
        Page::Quiz,
        Page::FillInTheBlank,
        Page::Leaderboard,
        Page::Doubt,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            Page::Home => "Home",
            Page::Quiz => "Quiz",
            Page::FillInTheBlank => "Fill in the Blank",
            Page::Leaderboard => "Leaderboard",
            Page::Doubt => "Doubt",
        }
    }

    /// Navigation keyboard text. The icon keeps it apart from plain answers
    /// such as a name or a blank that happens to read "Quiz".
    pub fn button(&self) -> &'static str {
        match self {
            Page::Home => "🏠 Home",
            Page::Quiz => "📝 Quiz",
            Page::FillInTheBlank => "✍️ Fill in the Blank",
            Page::Leaderboard => "📊 Leaderboard",
            Page::Doubt => "❓ Doubt",
        }
    }

    pub fn from_button(text: &str) -> Option<Page> {
        Page::ALL.into_iter().find(|page| page.button() == text.trim())
    }
}

/// Everything one chat knows about its user between messages.
#[derive(Debug, Clone, Default, serde::Serialize, serde::Deserialize)]
pub struct Session {
    pub username: String,
    /// Shared by both flows; always a multiple of 10.
    pub score: u32,
    pub previous_quiz_score: Option<u32>,
    pub page: Page,
    pub unit: Option<u8>,
    pub quiz: QuizProgress,
    pub blanks: BlankProgress,
}

impl Session {
    /// Starts a session on the Quiz page, the way submitting the Home form does.
    pub fn start(name: &str) -> Result<Self, SessionError> {
        let mut session = Session::default();
        session.rename(name)?;
        Ok(session)
    }

    pub fn rename(&mut self, name: &str) -> Result<(), SessionError> {
        let name = name.trim();
        if name.is_empty() {
            return Err(SessionError::EmptyName);
        }
        self.username = name.to_string();
        self.page = Page::Quiz;
        Ok(())
    }

    pub fn navigate(&mut self, page: Page) {
        self.page = page;
    }
}
