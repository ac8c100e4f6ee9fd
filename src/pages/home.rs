use teloxide::prelude::*;

use crate::pages::{nav_keyboard, quiz, save, AppContext};
use crate::quiz::session::Session;
use crate::{HandlerResult, QuizDialogue};

pub const WELCOME_TEXT: &str = "🎮 Welcome to AI Gamification Platform!\n\nThis platform enhances learning using AI-driven quizzes, fill-in-the-blanks, and gamification elements like leaderboards.";
pub const NAME_PROMPT: &str = "Enter Your Name to Start the Quiz";

pub async fn show(
    bot: &Bot,
    dialogue: &QuizDialogue,
    session: Session,
    chat_id: ChatId,
) -> HandlerResult {
    bot.send_message(chat_id, format!("{}\n\n{}", WELCOME_TEXT, NAME_PROMPT))
        .reply_markup(nav_keyboard())
        .await?;
    save(dialogue, session).await
}

/// A name sent from Home replaces the current one and opens the quiz.
pub async fn handle(
    app: &AppContext,
    bot: &Bot,
    dialogue: &QuizDialogue,
    mut session: Session,
    chat_id: ChatId,
    text: &str,
) -> HandlerResult {
    if let Err(err) = session.rename(text) {
        bot.send_message(chat_id, err.to_string()).await?;
        return Ok(());
    }

    log::info!("Chat {} is now playing as {}", chat_id, session.username);
    quiz::show(app, bot, dialogue, session, chat_id).await
}
