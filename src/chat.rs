//! Question answering over the scheme list.
//!
//! Each question is grounded with [`build_context`](crate::context::build_context),
//! answered by the assistant, logged to `query_log`, and recorded in the
//! caller's [`Session`]. The session is owned by the caller (the CLI or an
//! HTTP client) and passed in on every request.

use anyhow::Result;
use serde::{Deserialize, Serialize};

use crate::assistant::{is_source_language, SOURCE_LANGUAGE};
use crate::config::Config;
use crate::context::build_context;
use crate::portal::Portal;

/// Returned instead of a model answer when no API key is configured.
pub const LIMITED_MODE_NOTICE: &str = "The AI assistant is unavailable because no API key is \
configured. The schemes listed below best match your question.";

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ChatTurn {
    pub question: String,
    pub answer: String,
}

/// Per-user chat state, carried by the caller between requests.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Session {
    #[serde(default = "default_language")]
    pub language: String,
    #[serde(default)]
    pub history: Vec<ChatTurn>,
}

fn default_language() -> String {
    SOURCE_LANGUAGE.to_string()
}

impl Default for Session {
    fn default() -> Self {
        Self {
            language: default_language(),
            history: Vec::new(),
        }
    }
}

impl Session {
    pub fn with_language(language: &str) -> Self {
        Self {
            language: language.to_string(),
            history: Vec::new(),
        }
    }

    fn record(&mut self, turn: ChatTurn, max_turns: usize) {
        self.history.push(turn);
        if self.history.len() > max_turns {
            let excess = self.history.len() - max_turns;
            self.history.drain(..excess);
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct SourceRef {
    pub id: i64,
    pub title: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct ChatReply {
    pub answer: String,
    pub sources: Vec<SourceRef>,
    pub used_fallback_context: bool,
    pub limited_mode: bool,
}

impl Portal {
    /// Answer `question` for `session`, updating its history.
    pub async fn chat(&self, session: &mut Session, question: &str) -> Result<ChatReply> {
        let schemes = self.store().get_all().await?;
        let chat_cfg = &self.config().chat;
        let context = build_context(
            &schemes,
            question,
            chat_cfg.top_k,
            chat_cfg.fallback_context_chars,
        );

        let sources: Vec<SourceRef> = context
            .source_ids
            .iter()
            .filter_map(|id| schemes.iter().find(|s| s.id == *id))
            .map(|s| SourceRef {
                id: s.id,
                title: s.title.clone(),
            })
            .collect();

        let answer = if self.limited_mode() {
            LIMITED_MODE_NOTICE.to_string()
        } else {
            let answer = self
                .assistant()
                .answer_question(question, &context.text)
                .await;
            if is_source_language(&session.language) {
                answer
            } else {
                self.assistant()
                    .translate_field(&answer, &session.language)
                    .await
            }
        };

        self.store().log_query(question, &answer).await?;
        session.record(
            ChatTurn {
                question: question.to_string(),
                answer: answer.clone(),
            },
            chat_cfg.history_turns,
        );

        Ok(ChatReply {
            answer,
            sources,
            used_fallback_context: context.used_fallback,
            limited_mode: self.limited_mode(),
        })
    }
}

/// CLI entry point for `saral chat`.
pub async fn run_chat(config: &Config, question: &str, language: &str) -> Result<()> {
    let portal = Portal::open(config).await?;
    let mut session = Session::with_language(language);

    let reply = portal.chat(&mut session, question).await?;

    println!("{}", reply.answer);
    if !reply.sources.is_empty() {
        println!();
        println!("Sources:");
        for s in &reply.sources {
            println!("  [{}] {}", s.id, s.title);
        }
    } else if reply.used_fallback_context {
        println!();
        println!("(no scheme matched your keywords; answered from the general list)");
    }

    portal.close().await;
    Ok(())
}
