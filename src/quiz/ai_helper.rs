use std::sync::Arc;

use crate::quiz::fill_blank::Topic;
use crate::quiz::oracle::{self, Oracle, Reply};
use crate::quiz::{BlankQuestion, Difficulty, Question};

/// Builds every prompt the bot sends and forwards it to the oracle.
#[derive(Clone)]
pub struct QuizHelper {
    oracle: Arc<dyn Oracle>,
}

impl QuizHelper {
    pub fn new(oracle: Arc<dyn Oracle>) -> Self {
        Self { oracle }
    }

    /// Multiple-choice hints send the bare question text.
    pub async fn hint_for_question(&self, question: &Question) -> Reply {
        log::info!("Generating hint for question: {:?}", question.text);
        self.ask(&question.text).await
    }

    pub async fn generate_blank(&self, difficulty: Difficulty, topic: Topic) -> Reply {
        log::info!(
            "Generating {} fill-in-the-blank question about {}",
            difficulty.as_str(),
            topic.label()
        );
        let prompt = format!(
            "Generate a {} fill-in-the-blank question with a single blank and answer for the topic: {}. Respond in the format: Question: ... Answer: ...",
            difficulty.as_str(),
            topic.label()
        );
        self.ask(&prompt).await
    }

    pub async fn hint_for_blank(&self, blank: &BlankQuestion) -> Reply {
        let prompt = format!(
            "Give me a hint for this fill-in-the-blank question: {}",
            blank.text
        );
        self.ask(&prompt).await
    }

    pub async fn explain_blank_answer(&self, blank: &BlankQuestion) -> Reply {
        let prompt = format!(
            "Explain why the correct answer to this fill-in-the-blank question is: {}",
            blank.answer
        );
        self.ask(&prompt).await
    }

    pub async fn answer_doubt(&self, doubt: &str) -> Reply {
        self.ask(doubt).await
    }

    async fn ask(&self, prompt: &str) -> Reply {
        oracle::complete(self.oracle.as_ref(), prompt).await
    }
}
