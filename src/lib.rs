pub mod cache_store;
pub mod config;
pub mod demo_data;
pub mod enrich;
pub mod http_client;
pub mod leaderboard_fetch;
pub mod leaderboard_render;
pub mod logging;
pub mod match_fetch;
pub mod match_render;
pub mod provider;
pub mod state;
pub mod view_model;
