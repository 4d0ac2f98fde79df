mod app;
mod config;
mod event_loop;
mod file_service;
mod terminal;

pub use crate::app::*;
pub use crate::config::*;
pub use crate::event_loop::*;
pub use crate::file_service::*;
pub use crate::terminal::*;
