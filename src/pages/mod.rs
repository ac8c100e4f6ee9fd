//! Chat rendering of the five pages. Every handler receives the chat's
//! [`Session`], mutates it through the quiz controllers and stores it back
//! into the dialogue.

pub mod doubt;
pub mod fill_blank;
pub mod home;
pub mod leaderboard;
pub mod quiz;

use teloxide::prelude::*;
use teloxide::types::{ChatAction, KeyboardButton, KeyboardMarkup};

use crate::quiz::ai_helper::QuizHelper;
use crate::quiz::leaderboard::LeaderboardStore;
use crate::quiz::session::{Page, Session};
use crate::quiz::store::QuestionStore;
use crate::{HandlerResult, QuizDialogue, State};

pub type PageResult<T> = Result<T, Box<dyn std::error::Error + Send + Sync>>;

/// Shared, read-mostly services handed to every handler through `dptree`.
pub struct AppContext {
    pub questions: QuestionStore,
    pub leaderboards: LeaderboardStore,
    pub helper: QuizHelper,
}

/// Builds a reply keyboard from page-specific rows plus the navigation rows.
pub fn keyboard<I, S>(rows: I) -> KeyboardMarkup
where
    I: IntoIterator<Item = Vec<S>>,
    S: Into<String>,
{
    let mut buttons: Vec<Vec<KeyboardButton>> = rows
        .into_iter()
        .map(|row| row.into_iter().map(KeyboardButton::new).collect())
        .filter(|row: &Vec<KeyboardButton>| !row.is_empty())
        .collect();

    let pages = Page::ALL;
    let (first, second) = pages.split_at(3);
    for half in [first, second] {
        buttons.push(
            half.iter()
                .map(|page| KeyboardButton::new(page.button()))
                .collect(),
        );
    }
    KeyboardMarkup::new(buttons)
}

pub fn nav_keyboard() -> KeyboardMarkup {
    keyboard(Vec::<Vec<String>>::new())
}

pub async fn save(dialogue: &QuizDialogue, session: Session) -> HandlerResult {
    dialogue.update(State::Active(session)).await?;
    Ok(())
}

/// Shows the "typing…" indicator while the oracle is busy.
pub async fn typing(bot: &Bot, chat_id: ChatId) {
    // Cosmetic only
    let _ = bot.send_chat_action(chat_id, ChatAction::Typing).await;
}

pub async fn send_notice(bot: &Bot, chat_id: ChatId, notice: Option<String>) -> HandlerResult {
    if let Some(notice) = notice {
        bot.send_message(chat_id, format!("⚠️ {}", notice)).await?;
    }
    Ok(())
}

/// Switches page, like picking an entry in the navigation bar.
pub async fn open(
    app: &AppContext,
    bot: &Bot,
    dialogue: &QuizDialogue,
    mut session: Session,
    page: Page,
    chat_id: ChatId,
) -> HandlerResult {
    log::debug!("{} opened {}", session.username, page.label());
    session.navigate(page);
    show(app, bot, dialogue, session, chat_id).await
}

/// Renders the active page without interpreting any input.
pub async fn show(
    app: &AppContext,
    bot: &Bot,
    dialogue: &QuizDialogue,
    session: Session,
    chat_id: ChatId,
) -> HandlerResult {
    match session.page {
        Page::Home => home::show(bot, dialogue, session, chat_id).await,
        Page::Quiz => quiz::show(app, bot, dialogue, session, chat_id).await,
        Page::FillInTheBlank => fill_blank::show(app, bot, dialogue, session, chat_id).await,
        Page::Leaderboard => leaderboard::show(bot, dialogue, session, chat_id).await,
        Page::Doubt => doubt::show(bot, dialogue, session, chat_id).await,
    }
}

/// Routes a message to the active page.
pub async fn handle(
    app: &AppContext,
    bot: &Bot,
    dialogue: &QuizDialogue,
    session: Session,
    msg: &Message,
) -> HandlerResult {
    if let Some(page) = msg.text().and_then(Page::from_button) {
        return open(app, bot, dialogue, session, page, msg.chat.id).await;
    }

    let Some(text) = msg.text() else {
        return show(app, bot, dialogue, session, msg.chat.id).await;
    };

    match session.page {
        Page::Home => home::handle(app, bot, dialogue, session, msg.chat.id, text).await,
        Page::Quiz => quiz::handle(app, bot, dialogue, session, msg.chat.id, text).await,
        Page::FillInTheBlank => {
            fill_blank::handle(app, bot, dialogue, session, msg.chat.id, text).await
        }
        Page::Leaderboard => {
            leaderboard::handle(app, bot, dialogue, session, msg.chat.id, text).await
        }
        Page::Doubt => doubt::handle(app, bot, dialogue, session, msg.chat.id, text).await,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn labels(markup: &KeyboardMarkup) -> Vec<Vec<String>> {
        markup
            .keyboard
            .iter()
            .map(|row| row.iter().map(|button| button.text.clone()).collect())
            .collect()
    }

    #[test]
    fn navigation_rows_follow_page_rows() {
        let markup = keyboard(vec![vec!["Hint"], vec![]]);
        assert_eq!(
            labels(&markup),
            vec![
                vec!["Hint".to_string()],
                vec![
                    "🏠 Home".to_string(),
                    "📝 Quiz".to_string(),
                    "✍️ Fill in the Blank".to_string()
                ],
                vec!["📊 Leaderboard".to_string(), "❓ Doubt".to_string()],
            ]
        );
    }
}
