pub mod commands;
pub mod ui;
pub mod util;

pub use ui::{Output, OutputFormat};
pub use util::{CommandContext, require_initialized};
