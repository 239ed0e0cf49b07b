//! Subcommands of the `tictactoe-live` binary

pub mod play;
pub mod serve;
pub mod train;
