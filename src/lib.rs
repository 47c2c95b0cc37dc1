pub mod bot;
pub mod config;
pub mod constants;
pub mod handlers;
pub mod services;
pub mod utils;
