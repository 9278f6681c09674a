pub mod app_state;
pub mod config;
pub mod errors;
pub mod extractor;
pub mod fetcher;
pub mod generation;
pub mod health;
pub mod prompt;
pub mod render;
pub mod router;
pub mod scripts;
pub mod store;
pub mod text;
