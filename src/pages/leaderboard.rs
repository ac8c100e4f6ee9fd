use teloxide::prelude::*;
use teloxide::types::KeyboardMarkup;

use crate::pages::{keyboard, save, AppContext};
use crate::quiz::leaderboard::{Board, Leaderboard};
use crate::quiz::session::Session;
use crate::{HandlerResult, QuizDialogue};

/// Keeps a rendered table under Telegram's message size limit.
const MAX_ROWS: usize = 50;
const BAR_WIDTH: usize = 10;

fn board_keyboard() -> KeyboardMarkup {
    keyboard(vec![Board::ALL.iter().map(Board::button).collect::<Vec<_>>()])
}

fn render_table(table: &Leaderboard) -> String {
    let ranked = table.ranked();
    let mut lines = vec![format!("🏆 {} Leaderboard", table.board().label())];
    for (position, row) in ranked.iter().take(MAX_ROWS).enumerate() {
        let quiz = row
            .quiz
            .as_deref()
            .map(|quiz| format!(" ({})", quiz))
            .unwrap_or_default();
        lines.push(format!(
            "{}. {} | {}{} | Easy {} · Medium {} · Difficult {}",
            position + 1,
            row.name,
            row.score,
            quiz,
            row.easy,
            row.medium,
            row.difficult
        ));
    }
    if ranked.len() > MAX_ROWS {
        lines.push(format!("… and {} more", ranked.len() - MAX_ROWS));
    }
    lines.join("\n")
}

/// Text progress bar for `score` out of 100, capped at full.
fn progress_bar(score: u32) -> String {
    let ratio = (score as f64 / 100.0).min(1.0);
    let filled = (ratio * BAR_WIDTH as f64).round() as usize;
    format!(
        "[{}{}] {}%",
        "█".repeat(filled),
        "░".repeat(BAR_WIDTH - filled),
        (ratio * 100.0).round() as u32
    )
}

fn personal_summary(session: &Session) -> String {
    format!(
        "Your Score: {}\n{}\nYour Badges: No badges yet",
        session.score,
        progress_bar(session.score)
    )
}

pub async fn show(
    bot: &Bot,
    dialogue: &QuizDialogue,
    session: Session,
    chat_id: ChatId,
) -> HandlerResult {
    bot.send_message(
        chat_id,
        format!("🏆 Leaderboard\n\nSelect Leaderboard\n\n{}", personal_summary(&session)),
    )
    .reply_markup(board_keyboard())
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
    let Some(board) = Board::from_button(text) else {
        return show(bot, dialogue, session, chat_id).await;
    };

    const NO_DATA: &str = "No leaderboard data available for this section.";
    let body = if !app.leaderboards.exists(board) {
        NO_DATA.to_string()
    } else {
        match app.leaderboards.load(board) {
            Ok(table) if table.is_empty() => NO_DATA.to_string(),
            Ok(table) => render_table(&table),
            Err(err) => {
                log::error!("Failed to read {} leaderboard: {}", board.label(), err);
                format!("⚠️ Could not read the leaderboard: {}", err)
            }
        }
    };

    bot.send_message(chat_id, format!("{}\n\n{}", body, personal_summary(&session)))
        .reply_markup(board_keyboard())
        .await?;
    save(dialogue, session).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::quiz::leaderboard::LeaderboardRow;
    use crate::quiz::DifficultyCounts;

    #[test]
    fn progress_bar_caps_at_full() {
        assert_eq!(progress_bar(0), "[░░░░░░░░░░] 0%");
        assert_eq!(progress_bar(50), "[█████░░░░░] 50%");
        assert_eq!(progress_bar(250), "[██████████] 100%");
    }

    #[test]
    fn summary_shows_score_bar_and_badges() {
        let mut session = Session::start("Ada").unwrap();
        session.score = 70;
        assert_eq!(
            personal_summary(&session),
            "Your Score: 70\n[███████░░░] 70%\nYour Badges: No badges yet"
        );
    }

    #[test]
    fn table_lists_highest_scores_first() {
        let mut table = Leaderboard::empty(Board::Quiz);
        let counts = DifficultyCounts {
            easy: 1,
            medium: 1,
            difficult: 0,
        };
        table.push(LeaderboardRow::new("Ada", 20, Some("Quiz 1".to_string()), counts));
        table.push(LeaderboardRow::new("Grace", 40, Some("Quiz 2".to_string()), counts));

        let rendered = render_table(&table);
        let lines: Vec<&str> = rendered.lines().collect();

        assert_eq!(lines[0], "🏆 Quiz Leaderboard");
        assert!(lines[1].starts_with("1. Grace | 40 (Quiz 2)"));
        assert!(lines[2].starts_with("2. Ada | 20 (Quiz 1)"));
    }
}
