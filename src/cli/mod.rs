//! 终端前端：口令门、列表页、详情页、收藏页

pub mod app;
pub mod command;
pub mod render;

pub use app::{login, App};
pub use command::{Command, CommandError, HELP};
