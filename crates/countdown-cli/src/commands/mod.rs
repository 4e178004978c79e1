pub mod alert;
pub mod config;
pub mod interactive;
pub mod presets;
pub mod timer;

pub type CmdResult = countdown_core::error::Result<()>;
