use teloxide::prelude::*;

use crate::pages::{nav_keyboard, save, send_notice, typing, AppContext};
use crate::quiz::session::Session;
use crate::{HandlerResult, QuizDialogue};

pub async fn show(
    bot: &Bot,
    dialogue: &QuizDialogue,
    session: Session,
    chat_id: ChatId,
) -> HandlerResult {
    bot.send_message(
        chat_id,
        "❓ Ask Your Doubt\n\nHave a question or doubt related to your subject? Ask below and let the AI help you out!",
    )
    .reply_markup(nav_keyboard())
    .await?;
    save(dialogue, session).await
}

pub async fn handle(
    app: &AppContext,
    bot: &Bot,
    dialogue: &QuizDialogue,
    session: Session,
    chat_id: ChatId,
    text: &str,
) -> HandlerResult {
    if text.trim().is_empty() {
        bot.send_message(chat_id, "Please enter a question before submitting.")
            .await?;
        return Ok(());
    }

    typing(bot, chat_id).await;
    let reply = app.helper.answer_doubt(text).await;
    send_notice(bot, chat_id, reply.notice).await?;
    bot.send_message(chat_id, format!("Here's the AI's response:\n\n{}", reply.text))
        .reply_markup(nav_keyboard())
        .await?;
    save(dialogue, session).await
}
