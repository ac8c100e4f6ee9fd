use teloxide::prelude::*;
use teloxide::types::KeyboardMarkup;

use crate::pages::{keyboard, save, send_notice, typing, AppContext, PageResult};
use crate::quiz::multiple_choice::{self, QuizController, QuizStep};
use crate::quiz::session::Session;
use crate::quiz::store::UNITS;
use crate::quiz::Question;
use crate::{HandlerResult, QuizDialogue};

const HINT: &str = "Hint";

fn unit_button(unit: u8) -> String {
    format!("Unit {}", unit)
}

fn parse_unit(text: &str) -> Option<u8> {
    let unit = text.trim().strip_prefix("Unit ")?.trim().parse().ok()?;
    UNITS.contains(&unit).then_some(unit)
}

fn unit_row() -> Vec<String> {
    UNITS.map(unit_button).collect()
}

fn question_keyboard(question: &Question) -> KeyboardMarkup {
    let mut rows: Vec<Vec<String>> = question
        .options
        .iter()
        .map(|option| vec![option.clone()])
        .collect();
    rows.push(vec![HINT.to_string()]);
    rows.push(unit_row());
    keyboard(rows)
}

pub async fn show(
    app: &AppContext,
    bot: &Bot,
    dialogue: &QuizDialogue,
    mut session: Session,
    chat_id: ChatId,
) -> HandlerResult {
    bot.send_message(
        chat_id,
        format!("📝 Quiz Time! Welcome, {}!", session.username),
    )
    .await?;
    render(app, bot, &mut session, chat_id).await?;
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
    if let Some(unit) = parse_unit(text) {
        multiple_choice::select_unit(&mut session, unit);
        render(app, bot, &mut session, chat_id).await?;
        return save(dialogue, session).await;
    }

    let Some(unit) = session.unit else {
        render(app, bot, &mut session, chat_id).await?;
        return save(dialogue, session).await;
    };
    let Some(questions) = load(app, bot, unit, chat_id).await? else {
        return save(dialogue, session).await;
    };
    let quiz = QuizController::new(unit, &questions, &app.leaderboards);

    if text.trim() == HINT {
        if let Some(question) = quiz.current_question(&mut session) {
            typing(bot, chat_id).await;
            let reply = app.helper.hint_for_question(question).await;
            send_notice(bot, chat_id, reply.notice).await?;
            bot.send_message(chat_id, format!("💡 Hint: {}", reply.text))
                .reply_markup(question_keyboard(question))
                .await?;
        }
        return save(dialogue, session).await;
    }

    match submit(&quiz, dialogue, &mut session, text).await? {
        QuizStep::Ignored => {}
        QuizStep::Advanced { correct, next } => {
            log::debug!("{} answered (correct: {}), next is {}", session.username, correct, next);
        }
        QuizStep::Finished(done) => {
            log::debug!("Leaderboard row: {:?}", done.row);
            bot.send_message(
                chat_id,
                format!(
                    "🎉 Quiz Completed! Your final score: {}\n\n{}",
                    done.score,
                    done.feedback.message()
                ),
            )
            .await?;
            if done.save_error.is_some() {
                bot.send_message(chat_id, "⚠️ Your result could not be saved to the leaderboard.")
                    .await?;
            }
        }
    }

    render_question(bot, &quiz, &mut session, chat_id).await?;
    save(dialogue, session).await
}

/// Grades `text`; a finished attempt is stored before anything is sent.
async fn submit(
    quiz: &QuizController<'_>,
    dialogue: &QuizDialogue,
    session: &mut Session,
    text: &str,
) -> PageResult<QuizStep> {
    let step = quiz.submit(session, Some(text));
    if let QuizStep::Finished(_) = step {
        save(dialogue, session.clone()).await?;
    }
    Ok(step)
}

/// Loads the unit's questions, telling the user when there are none.
async fn load(
    app: &AppContext,
    bot: &Bot,
    unit: u8,
    chat_id: ChatId,
) -> PageResult<Option<Vec<Question>>> {
    let questions = match app.questions.load_unit(unit) {
        Ok(questions) => questions,
        Err(err) => {
            log::warn!("Unit {} unavailable: {}", unit, err);
            bot.send_message(chat_id, format!("⚠️ {}", err)).await?;
            Vec::new()
        }
    };

    if questions.is_empty() {
        bot.send_message(chat_id, "No questions available for this unit.")
            .reply_markup(keyboard(vec![unit_row()]))
            .await?;
        return Ok(None);
    }
    Ok(Some(questions))
}

async fn render(app: &AppContext, bot: &Bot, session: &mut Session, chat_id: ChatId) -> HandlerResult {
    let Some(unit) = session.unit else {
        bot.send_message(chat_id, "Choose a Unit for the Quiz")
            .reply_markup(keyboard(vec![unit_row()]))
            .await?;
        return Ok(());
    };

    if let Some(questions) = load(app, bot, unit, chat_id).await? {
        let quiz = QuizController::new(unit, &questions, &app.leaderboards);
        render_question(bot, &quiz, session, chat_id).await?;
    }
    Ok(())
}

async fn render_question(
    bot: &Bot,
    quiz: &QuizController<'_>,
    session: &mut Session,
    chat_id: ChatId,
) -> HandlerResult {
    let Some(question) = quiz.current_question(session) else {
        return Ok(());
    };
    bot.send_message(
        chat_id,
        format!(
            "Question {} of {}: {}",
            session.quiz.current + 1,
            quiz.total(),
            question.text
        ),
    )
    .reply_markup(question_keyboard(question))
    .await?;
    Ok(())
}
