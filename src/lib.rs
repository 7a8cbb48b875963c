pub mod app;
pub mod clients;
pub mod config;
pub mod errors;
pub mod extract;
pub mod handlers;
pub mod llm;
pub mod models;
pub mod normalize;
pub mod prompts;
pub mod quiz;
pub mod reminders;
pub mod rerank;
pub mod state;
pub mod stats;
pub mod ui;

pub use app::router;
pub use config::Config;
pub use state::{AppState, Session};
