mod config;
mod pages;
mod quiz;

use std::sync::Arc;

use config::Config;
use dotenv::dotenv;
use pages::AppContext;
use quiz::{
    ai_helper::QuizHelper, leaderboard::LeaderboardStore, oracle::GeminiOracle,
    session::Session, store::QuestionStore,
};
use teloxide::{
    dispatching::dialogue::{serializer::Json, ErasedStorage, SqliteStorage, Storage},
    prelude::*,
};

pub type QuizDialogue = Dialogue<State, ErasedStorage<State>>;
pub type HandlerResult = Result<(), Box<dyn std::error::Error + Send + Sync>>;

#[derive(Clone, Default, serde::Serialize, serde::Deserialize)]
pub enum State {
    #[default]
    Start,
    ReceiveFullName,
    Active(Session),
}

type SessionStorage = std::sync::Arc<ErasedStorage<State>>;

#[tokio::main]
async fn main() {
    dotenv().ok();
    pretty_env_logger::init();
    log::info!("Starting quiz bot...");

    let config = match Config::from_env() {
        Ok(config) => config,
        Err(err) => {
            log::error!("Invalid configuration: {}", err);
            return;
        }
    };

    let oracle = match GeminiOracle::new(&config.oracle) {
        Ok(oracle) => oracle,
        Err(err) => {
            log::error!("Unable to build the oracle client: {}", err);
            return;
        }
    };

    log::info!("Opening session storage at {}", config.session_db);
    let storage: SessionStorage = match SqliteStorage::open(&config.session_db, Json).await {
        Ok(storage) => storage.erase(),
        Err(err) => {
            log::error!("Unable to open session storage: {}", err);
            return;
        }
    };

    log::info!(
        "Questions from {}, leaderboards in {}",
        config.data_dir.display(),
        config.leaderboard_dir.display()
    );
    let app = Arc::new(AppContext {
        questions: QuestionStore::new(config.data_dir.clone()),
        leaderboards: LeaderboardStore::new(config.leaderboard_dir.clone()),
        helper: QuizHelper::new(Arc::new(oracle)),
    });

    let bot = Bot::from_env();

    Dispatcher::builder(
        bot,
        Update::filter_message()
            .enter_dialogue::<Message, ErasedStorage<State>, State>()
            .branch(dptree::case![State::Start].endpoint(start))
            .branch(dptree::case![State::ReceiveFullName].endpoint(receive_full_name))
            .branch(dptree::case![State::Active(session)].endpoint(active)),
    )
    .dependencies(dptree::deps![storage, app])
    .enable_ctrlc_handler()
    .build()
    .dispatch()
    .await;
}

const GREETING_TEXT: &str = "🎮 AI-Driven Gamification in Teaching & Learning

Welcome to the AI Gamification Learning Experience! 🚀
Enhance your AI knowledge through interactive lessons, quizzes and leaderboards.
- 📖 Learn AI concepts in a structured way.
- 🏆 Take quizzes and climb the leaderboard.
- 🎯 Test your skills and track your progress.";

async fn start(bot: Bot, dialogue: QuizDialogue, msg: Message) -> HandlerResult {
    bot.send_message(
        msg.chat.id,
        format!("{}\n\n{}", GREETING_TEXT, pages::home::NAME_PROMPT),
    )
    .await?;

    dialogue.update(State::ReceiveFullName).await?;
    Ok(())
}

async fn receive_full_name(
    app: Arc<AppContext>,
    bot: Bot,
    dialogue: QuizDialogue,
    msg: Message,
) -> HandlerResult {
    let session = match Session::start(msg.text().unwrap_or_default()) {
        Ok(session) => session,
        Err(err) => {
            bot.send_message(msg.chat.id, err.to_string()).await?;
            return Ok(());
        }
    };

    log::info!("Chat {} joined as {}", msg.chat.id, session.username);
    pages::quiz::show(&app, &bot, &dialogue, session, msg.chat.id).await
}

async fn active(
    app: Arc<AppContext>,
    bot: Bot,
    dialogue: QuizDialogue,
    session: Session,
    msg: Message,
) -> HandlerResult {
    pages::handle(&app, &bot, &dialogue, session, &msg).await
}
