//! Discord bot integration.
//!
//! Gateway event handling, slash commands, and message routing.

pub mod bot;
pub mod commands;
pub mod router;

pub use bot::Bot;
