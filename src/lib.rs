pub mod api;
pub mod config;
pub mod error;
pub mod feed;
pub mod prediction;
pub mod state;
pub mod window;
