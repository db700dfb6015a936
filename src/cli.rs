use std::path::PathBuf;

use clap::{Parser, Subcommand};

#[derive(Parser, Debug, Clone)]
#[command(name = "codelab", about = "Terminal code playground backed by the Piston API", version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,

    /// Language to start the playground with (javascript, python, java, c).
    #[arg(short = 'l', long, global = true)]
    pub language: Option<String>,

    /// Override the execution API base URL.
    #[arg(long = "api-url", global = true)]
    pub api_url: Option<String>,
}

#[derive(Subcommand, Debug, Clone)]
pub enum Commands {
    /// Open the interactive playground (default).
    Tui,
    /// Run a file (or stdin) once and print its output.
    Run {
        /// Source file; reads stdin when omitted.
        #[arg(value_name = "FILE")]
        file: Option<PathBuf>,

        /// Disable colored output.
        #[arg(long = "no-color")]
        no_color: bool,
    },
    /// List supported languages and their pinned versions.
    Languages,
}

impl Cli {
    pub fn parse() -> Self {
        <Self as Parser>::parse()
    }
}
