pub mod cli;
pub mod commands;
pub mod config;
pub mod email_content;
pub mod error;
pub mod gmail_api;
pub mod mime_tree;
pub mod types;

pub use error::{MailError, Result};
