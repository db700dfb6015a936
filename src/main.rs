use std::io::{self, Read};

use anyhow::{bail, Context, Result};
use codelab::{
    cli::{Cli, Commands},
    config::Config,
    language::{Language, LANGUAGE_VERSIONS},
    logging,
    piston::{PistonClient, Snippet},
    printer::OutcomePrinter,
    tui,
};
use is_terminal::IsTerminal;

#[tokio::main]
async fn main() -> Result<()> {
    let args = Cli::parse();

    // Load config; CLI flags override it
    let mut cfg = Config::load();
    if let Some(url) = args.api_url.as_deref() {
        cfg = cfg.with("PISTON_API_URL", url);
    }

    let language = match args.language.as_deref() {
        Some(name) => name.parse::<Language>()?,
        None => cfg.default_language(),
    };

    match args.command.unwrap_or(Commands::Tui) {
        Commands::Tui => {
            let _guard = logging::init_file(&cfg.log_file(), &cfg.log_filter())?;
            tui::run_tui(&cfg, language).await
        }
        Commands::Run { file, no_color } => {
            logging::init_stderr(&cfg.stderr_log_filter())?;

            let source = match &file {
                Some(path) => std::fs::read_to_string(path)
                    .with_context(|| format!("failed to read '{}'", path.display()))?,
                None => {
                    if io::stdin().is_terminal() {
                        bail!("Provide a source file or pipe code via stdin");
                    }
                    let mut buf = String::new();
                    io::stdin().read_to_string(&mut buf)?;
                    buf
                }
            };

            let client = PistonClient::from_config(&cfg)?;
            let outcome = client.execute(&Snippet::new(language, source)).await;

            let color = !no_color && io::stdout().is_terminal();
            OutcomePrinter { color }.print(&outcome)?;
            if outcome.is_error() {
                std::process::exit(1);
            }
            Ok(())
        }
        Commands::Languages => {
            for (lang, version) in LANGUAGE_VERSIONS {
                println!("{:<11} {}", lang.id(), version);
            }
            Ok(())
        }
    }
}
