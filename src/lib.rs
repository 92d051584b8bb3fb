//! # SARAL
//!
//! A welfare-scheme information portal. SARAL collects government welfare
//! schemes from public listing pages (falling back to a bundled seed set),
//! stores them in SQLite, and serves them through a CLI and a JSON HTTP API
//! with translation, plain-language simplification and grounded question
//! answering backed by a hosted text-generation model.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────┐   ┌─────────────┐   ┌──────────┐
//! │  Scraper    │──▶│   Store     │──▶│  SQLite  │
//! │ live / seed │   │ insert_all  │   │ schemes  │
//! └─────────────┘   └──────┬──────┘   └──────────┘
//!                          │
//!                   ┌──────┴──────┐   ┌──────────┐
//!                   │   Portal    │──▶│ Assistant│──▶ Gemini
//!                   │ chat/trans. │   │ limiter  │
//!                   └──────┬──────┘   └──────────┘
//!                 ┌────────┴────────┐
//!                 ▼                 ▼
//!            ┌──────────┐     ┌──────────┐
//!            │   CLI    │     │   HTTP   │
//!            │ (saral)  │     │  (axum)  │
//!            └──────────┘     └──────────┘
//! ```
//!
//! ## Quick Start
//!
//! ```bash
//! saral init                        # create database
//! saral load                        # scrape, or fall back to seed data
//! saral search farmer
//! saral show 1 --lang Hindi
//! saral chat "pension for elderly people"
//! saral serve                       # start HTTP API
//! ```
//!
//! ## Modules
//!
//! | Module | Purpose |
//! |--------|---------|
//! | [`config`] | TOML configuration parsing |
//! | [`models`] | Core data types |
//! | [`store`] | Scheme store over SQLite |
//! | [`seed`] | Bundled fallback dataset |
//! | [`scrape`] | Listing-page collector with seed fallback |
//! | [`llm`] | Text-generation client abstraction |
//! | [`rate_limit`] | Minimum spacing between generation calls |
//! | [`assistant`] | Translation, simplification and answering |
//! | [`context`] | Relevance-ranked context for questions |
//! | [`portal`] | Application service tying the above together |
//! | [`chat`] | Session-based question answering |
//! | [`export`] | JSON snapshot export and import |
//! | [`server`] | JSON HTTP API |
//! | [`db`] | Database connection |
//! | [`migrate`] | Schema migrations |

pub mod assistant;
pub mod chat;
pub mod config;
pub mod context;
pub mod db;
pub mod export;
pub mod get;
pub mod llm;
pub mod migrate;
pub mod models;
pub mod portal;
pub mod rate_limit;
pub mod scrape;
pub mod search;
pub mod seed;
pub mod server;
pub mod stats;
pub mod store;
