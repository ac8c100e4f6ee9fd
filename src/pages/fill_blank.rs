use teloxide::prelude::*;
use teloxide::types::KeyboardMarkup;

use crate::pages::{keyboard, save, send_notice, typing, AppContext, PageResult};
use crate::quiz::error::MalformedResponse;
use crate::quiz::fill_blank::{self, BlankAnswer, BlankCompletion, Slot, SLOTS};
use crate::quiz::leaderboard::LeaderboardStore;
use crate::quiz::session::Session;
use crate::{HandlerResult, QuizDialogue};

const HINT: &str = "Hint";
const RESTART: &str = "Restart";

fn blank_keyboard() -> KeyboardMarkup {
    keyboard(vec![vec![HINT, RESTART]])
}

fn restart_keyboard() -> KeyboardMarkup {
    keyboard(vec![vec![RESTART]])
}

pub async fn show(
    app: &AppContext,
    bot: &Bot,
    dialogue: &QuizDialogue,
    mut session: Session,
    chat_id: ChatId,
) -> HandlerResult {
    bot.send_message(chat_id, "✍️ Fill in the Blank!").await?;
    render_slot(app, bot, dialogue, &mut session, chat_id).await?;
    save(dialogue, session).await
}

pub async fn handle(
    app: &AppContext,
    bot: &Bot,
    dialogue: &QuizDialogue,
    mut session: Session,
    chat_id: ChatId,
    text: &str,
) -> HandlerResult {
    match text.trim() {
        RESTART => {
            log::info!("{} restarted fill-in-the-blank", session.username);
            session.blanks.restart();
            render_slot(app, bot, dialogue, &mut session, chat_id).await?;
        }
        HINT => {
            typing(bot, chat_id).await;
            match fill_blank::hint(&session, &app.helper).await {
                Some(reply) => {
                    send_notice(bot, chat_id, reply.notice).await?;
                    bot.send_message(chat_id, format!("💡 Hint: {}", reply.text))
                        .reply_markup(blank_keyboard())
                        .await?;
                }
                None => render_slot(app, bot, dialogue, &mut session, chat_id).await?,
            }
        }
        _ => {
            typing(bot, chat_id).await;
            let Some(outcome) = fill_blank::answer(&mut session, &app.helper, text).await else {
                render_slot(app, bot, dialogue, &mut session, chat_id).await?;
                return save(dialogue, session).await;
            };

            match outcome.result {
                BlankAnswer::Correct => {
                    bot.send_message(chat_id, "✅ Correct!").await?;
                }
                BlankAnswer::Incorrect {
                    correct_answer,
                    explanation,
                } => {
                    send_notice(bot, chat_id, explanation.notice).await?;
                    bot.send_message(
                        chat_id,
                        format!(
                            "❌ Incorrect.\n✅ Correct Answer: {}\n\n🧠 Explanation: {}",
                            correct_answer, explanation.text
                        ),
                    )
                    .await?;
                }
            }

            if outcome.finished {
                complete(app, bot, dialogue, &mut session, chat_id).await?;
            } else {
                render_slot(app, bot, dialogue, &mut session, chat_id).await?;
            }
        }
    }
    save(dialogue, session).await
}

async fn render_slot(
    app: &AppContext,
    bot: &Bot,
    dialogue: &QuizDialogue,
    session: &mut Session,
    chat_id: ChatId,
) -> HandlerResult {
    if session.blanks.current_question().is_none() {
        typing(bot, chat_id).await;
    }

    match fill_blank::prepare(session, &app.helper).await {
        Slot::Ready {
            index,
            question,
            notice,
        } => {
            send_notice(bot, chat_id, notice).await?;
            bot.send_message(
                chat_id,
                format!(
                    "Difficulty Level: {}\n\nQuestion {} of {}: {}",
                    question.difficulty.title(),
                    index + 1,
                    SLOTS,
                    question.text
                ),
            )
            .reply_markup(blank_keyboard())
            .await?;
        }
        Slot::Malformed { notice } => {
            send_notice(bot, chat_id, notice).await?;
            bot.send_message(chat_id, format!("⚠️ {}", MalformedResponse))
                .reply_markup(restart_keyboard())
                .await?;
        }
        Slot::Halted => {
            bot.send_message(
                chat_id,
                format!("⚠️ {} Press Restart to begin a new round.", MalformedResponse),
            )
            .reply_markup(restart_keyboard())
            .await?;
        }
        Slot::Finished => complete(app, bot, dialogue, session, chat_id).await?,
    }
    Ok(())
}

/// Records the round and stores the reset session before anything is sent.
async fn finish_round(
    leaderboards: &LeaderboardStore,
    dialogue: &QuizDialogue,
    session: &mut Session,
) -> PageResult<BlankCompletion> {
    let done = fill_blank::finish(session, leaderboards);
    save(dialogue, session.clone()).await?;
    Ok(done)
}

async fn complete(
    app: &AppContext,
    bot: &Bot,
    dialogue: &QuizDialogue,
    session: &mut Session,
    chat_id: ChatId,
) -> HandlerResult {
    let done = finish_round(&app.leaderboards, dialogue, session).await?;
    log::debug!("Leaderboard row: {:?}", done.row);

    bot.send_message(
        chat_id,
        format!("🎉 You've completed all {} fill-in-the-blank questions!", SLOTS),
    )
    .await?;
    if done.save_error.is_some() {
        bot.send_message(chat_id, "⚠️ Your result could not be saved to the leaderboard.")
            .await?;
    }
    bot.send_message(
        chat_id,
        format!(
            "📊 Final Feedback:\n\n{}\n\n{}",
            done.band.message(done.score),
            done.change.message(done.score)
        ),
    )
    .reply_markup(restart_keyboard())
    .await?;
    Ok(())
}
