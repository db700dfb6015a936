//! Async event loop for the playground TUI.

use std::io;
use std::path::PathBuf;
use std::time::{Duration, Instant};

use anyhow::Result;
use crossterm::event::{
    self, DisableBracketedPaste, EnableBracketedPaste, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers,
};
use crossterm::terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen};
use crossterm::ExecutableCommand;
use ratatui::prelude::*;
use tokio::sync::mpsc;
use tracing::{error, info};

use super::{
    app::{Action, App, Command},
    editor::EditorAction,
    events::TuiEvent,
    ui::render_ui,
};
use crate::{config::Config, language::Language, piston::PistonClient, utils};

const TICK_RATE: Duration = Duration::from_millis(250);

/// Run the playground until the user quits.
pub async fn run_tui(cfg: &Config, language: Language) -> Result<()> {
    // Check if we're in a proper terminal environment
    if !io::IsTerminal::is_terminal(&io::stdout()) {
        return Err(anyhow::anyhow!("TUI mode requires a proper terminal environment"));
    }

    let client = PistonClient::from_config(cfg)?;
    let mut app = App::new(language, cfg);
    let download_dir = cfg.download_dir();

    // Setup terminal
    enable_raw_mode()?;
    let mut terminal = setup_or_restore(
        || {
            let mut stdout = io::stdout();
            stdout.execute(EnterAlternateScreen)?;
            stdout.execute(EnableBracketedPaste)?;
            Ok(Terminal::new(CrosstermBackend::new(stdout))?)
        },
        disable_raw_mode,
    )?;

    info!(endpoint = client.base_url(), language = %language, "playground started");
    let result = run_app(&mut terminal, &mut app, client, download_dir).await;

    // Restore terminal
    disable_raw_mode()?;
    terminal.backend_mut().execute(DisableBracketedPaste)?;
    terminal.backend_mut().execute(LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    if let Err(err) = &result {
        error!(error = %err, "playground exited with an error");
    }
    result
}

/// Run the remaining setup steps once raw mode is on, leaving raw mode again if one fails.
fn setup_or_restore<T>(
    setup: impl FnOnce() -> Result<T>,
    restore: impl FnOnce() -> io::Result<()>,
) -> Result<T> {
    setup().map_err(|err| {
        if let Err(restore_err) = restore() {
            error!(error = %restore_err, "failed to leave raw mode");
        }
        err
    })
}

/// Main application loop
async fn run_app(
    terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
    app: &mut App,
    client: PistonClient,
    download_dir: PathBuf,
) -> Result<()> {
    let (event_tx, mut event_rx) = mpsc::unbounded_channel::<TuiEvent>();

    // Spawn input handler
    let input_tx = event_tx.clone();
    tokio::task::spawn_blocking(move || loop {
        if event::poll(Duration::from_millis(100)).unwrap_or(false) {
            let forwarded = match event::read() {
                Ok(Event::Key(key)) if key.kind != KeyEventKind::Release => TuiEvent::Key(key),
                Ok(Event::Paste(text)) => TuiEvent::Paste(text),
                Ok(Event::Resize(w, h)) => TuiEvent::Resize(w, h),
                _ => continue,
            };
            if input_tx.send(forwarded).is_err() {
                break; // Channel closed
            }
        } else if input_tx.is_closed() {
            break;
        }
    });

    let tick_tx = event_tx.clone();
    tokio::spawn(async move {
        let mut interval = tokio::time::interval(TICK_RATE);
        loop {
            interval.tick().await;
            if tick_tx.send(TuiEvent::Tick).is_err() {
                break;
            }
        }
    });

    let (width, _) = crossterm::terminal::size()?;
    app.update(Action::Resize { width });
    terminal.draw(|frame| render_ui(frame, app))?;
    app.update(Action::EditorMounted);

    while let Some(tui_event) = event_rx.recv().await {
        let action = match tui_event {
            TuiEvent::Key(key) => map_key(app, key),
            TuiEvent::Paste(text) => Some(Action::Edit(EditorAction::InsertText(text))),
            TuiEvent::Resize(width, _) => Some(Action::Resize { width }),
            TuiEvent::Tick => Some(Action::Tick(Instant::now())),
            TuiEvent::ExecutionFinished { seq, outcome } => Some(Action::RunFinished { seq, outcome }),
            TuiEvent::Feedback(action) => Some(action),
        };

        if let Some(action) = action {
            if let Some(command) = app.update(action) {
                perform(command, &client, &download_dir, &event_tx);
            }
        }

        if app.should_quit {
            break;
        }
        terminal.draw(|frame| render_ui(frame, app))?;
    }

    Ok(())
}

/// Carry out a side effect off the UI task; its result comes back as an event.
fn perform(
    command: Command,
    client: &PistonClient,
    download_dir: &std::path::Path,
    event_tx: &mpsc::UnboundedSender<TuiEvent>,
) {
    let tx = event_tx.clone();
    match command {
        Command::Execute { seq, snippet } => {
            let client = client.clone();
            tokio::spawn(async move {
                let outcome = client.execute(&snippet).await;
                let _ = tx.send(TuiEvent::ExecutionFinished { seq, outcome });
            });
        }
        Command::CopyToClipboard(text) => {
            tokio::task::spawn_blocking(move || {
                let action = match utils::copy_to_clipboard(&text) {
                    Ok(()) => Action::Copied,
                    Err(err) => {
                        error!(error = %err, "clipboard copy failed");
                        Action::CopyFailed(err.to_string())
                    }
                };
                let _ = tx.send(TuiEvent::Feedback(action));
            });
        }
        Command::Download { file_name, contents } => {
            let dir = download_dir.to_path_buf();
            tokio::task::spawn_blocking(move || {
                let action = match utils::save_download(&dir, &file_name, &contents) {
                    Ok(path) => Action::Downloaded(path),
                    Err(err) => {
                        error!(error = %err, "download failed");
                        Action::DownloadFailed(err.to_string())
                    }
                };
                let _ = tx.send(TuiEvent::Feedback(action));
            });
        }
    }
}

/// Translate a key press into a reducer action, depending on what is on screen.
pub fn map_key(app: &App, key: KeyEvent) -> Option<Action> {
    let ctrl = key.modifiers.contains(KeyModifiers::CONTROL);

    if ctrl {
        return match key.code {
            KeyCode::Char('c') | KeyCode::Char('q') => Some(Action::Quit),
            KeyCode::Char('r') => Some(Action::Run),
            KeyCode::Char('y') => Some(Action::Copy),
            KeyCode::Char('s') => Some(Action::Download),
            KeyCode::Char('k') => Some(Action::ClearOutput),
            KeyCode::Char('l') => Some(Action::ToggleLanguageMenu),
            KeyCode::Char('o') => Some(Action::ToggleOutputFullscreen),
            KeyCode::Char('t') => Some(Action::ToggleTheme),
            _ => None,
        };
    }

    match key.code {
        KeyCode::F(1) => return Some(Action::ToggleHelp),
        KeyCode::F(2) => return Some(Action::ToggleLanguageMenu),
        KeyCode::F(5) => return Some(Action::Run),
        KeyCode::PageUp => return Some(Action::ScrollOutput(-5)),
        KeyCode::PageDown => return Some(Action::ScrollOutput(5)),
        _ => {}
    }

    // If help is shown, any key closes it
    if app.show_help {
        return Some(Action::DismissOverlay);
    }

    if app.is_menu_open() {
        return match key.code {
            KeyCode::Up => Some(Action::MenuMove(-1)),
            KeyCode::Down => Some(Action::MenuMove(1)),
            KeyCode::Enter => Some(Action::MenuConfirm),
            KeyCode::Esc => Some(Action::DismissOverlay),
            KeyCode::Char(c) => c
                .to_digit(10)
                .and_then(|d| (d as usize).checked_sub(1))
                .and_then(|i| Language::ALL.get(i).copied())
                .map(Action::SelectLanguage),
            _ => None,
        };
    }

    // On a narrow terminal with only the output visible, arrows scroll it
    if app.is_narrow && app.is_output_fullscreen {
        return match key.code {
            KeyCode::Up => Some(Action::ScrollOutput(-1)),
            KeyCode::Down => Some(Action::ScrollOutput(1)),
            KeyCode::Esc => Some(Action::ToggleOutputFullscreen),
            _ => None,
        };
    }

    let edit = match key.code {
        KeyCode::Char(c) => EditorAction::Insert(c),
        KeyCode::Enter => EditorAction::Newline,
        KeyCode::Tab => EditorAction::Tab,
        KeyCode::Backspace => EditorAction::Backspace,
        KeyCode::Delete => EditorAction::Delete,
        KeyCode::Left => EditorAction::Left,
        KeyCode::Right => EditorAction::Right,
        KeyCode::Up => EditorAction::Up,
        KeyCode::Down => EditorAction::Down,
        KeyCode::Home => EditorAction::Home,
        KeyCode::End => EditorAction::End,
        KeyCode::Esc => return Some(Action::DismissOverlay),
        _ => return None,
    };
    Some(Action::Edit(edit))
}
