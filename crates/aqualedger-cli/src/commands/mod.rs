pub mod common;
pub mod completions;
pub mod config;
pub mod delete;
pub mod edit;
pub mod export;
pub mod list;
pub mod listen;
pub mod log;
pub mod queue;
pub mod score;
pub mod status;
pub mod sync;
