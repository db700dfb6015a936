//! Terminal playground: editor pane, output pane and the event loop that ties them to the execution client.

pub mod app;
pub mod editor;
pub mod events;
pub mod handler;
pub mod ui;

pub use handler::run_tui;
