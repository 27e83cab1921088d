pub mod catalog;
pub mod config;
pub mod error;
pub mod fallback;
pub mod http_client;
pub mod params;
pub mod persist;
pub mod session;
pub mod state;
pub mod stats_fetch;
pub mod strength;
pub mod win_prob;
