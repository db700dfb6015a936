//! CodeLab: a terminal code playground that runs snippets on the Piston API.

pub mod cli;
pub mod config;
pub mod language;
pub mod logging;
pub mod piston;
pub mod printer;
pub mod tui;
pub mod utils;
