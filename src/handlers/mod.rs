pub mod admin;
pub mod console;
pub mod message_guard;
