pub mod commands;
pub mod input;
pub mod ui;
pub mod util;

pub use util::{CommandContext, EngineHandle};
