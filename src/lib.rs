pub mod ai;
pub mod analysis;
pub mod app;
pub mod chat;
pub mod config;
pub mod metrics;
pub mod plan;
pub mod profile;
pub mod session;
pub mod state;
pub mod storage;
