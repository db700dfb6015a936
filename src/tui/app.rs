//! TUI application state and the reducer that drives it.
//!
//! Every user action and every async completion is funnelled through
//! `App::update`. Side effects (network, clipboard, file system) are never
//! performed here; they are returned as a `Command` for the event loop.

use std::path::PathBuf;
use std::str::FromStr;
use std::time::{Duration, Instant};

use anyhow::anyhow;
use tracing::{debug, info};

use super::editor::{Editor, EditorAction};
use crate::config::Config;
use crate::language::Language;
use crate::piston::{ExecutionOutcome, NotificationKind, Snippet};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Theme {
    #[default]
    Dark,
    Light,
}

impl Theme {
    pub fn name(self) -> &'static str {
        match self {
            Theme::Dark => "vs-dark",
            Theme::Light => "light",
        }
    }

    pub fn toggled(self) -> Self {
        match self {
            Theme::Dark => Theme::Light,
            Theme::Light => Theme::Dark,
        }
    }
}

impl FromStr for Theme {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "vs-dark" | "dark" => Ok(Theme::Dark),
            "light" | "vs-light" | "vs" => Ok(Theme::Light),
            other => Err(anyhow!("unknown theme '{}'", other)),
        }
    }
}

/// Transient banner shown at the top of the screen.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notification {
    pub message: String,
    pub kind: NotificationKind,
    pub raised_at: Instant,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Action {
    /// The editor pane has been drawn at least once.
    EditorMounted,
    Edit(EditorAction),
    SelectLanguage(Language),
    ToggleLanguageMenu,
    MenuMove(isize),
    MenuConfirm,
    Run,
    RunFinished { seq: u64, outcome: ExecutionOutcome },
    Copy,
    Copied,
    CopyFailed(String),
    Download,
    Downloaded(PathBuf),
    DownloadFailed(String),
    ClearOutput,
    ToggleOutputFullscreen,
    ToggleHelp,
    ToggleTheme,
    ScrollOutput(isize),
    Resize { width: u16 },
    Tick(Instant),
    DismissOverlay,
    Quit,
}

/// Side effects requested by the reducer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Execute { seq: u64, snippet: Snippet },
    CopyToClipboard(String),
    Download { file_name: String, contents: String },
}

/// File name used when saving the buffer. The language id is used verbatim
/// as the extension, so python saves as `code.python`.
pub fn download_file_name(language: Language) -> String {
    format!("code.{}", language.id())
}

#[derive(Debug)]
pub struct App {
    pub language: Language,
    pub editor: Editor,
    /// Run/copy/download are ignored until the editor has been drawn.
    pub editor_mounted: bool,
    /// True between issuing a run and it settling
    pub is_loading: bool,
    pub output: Vec<String>,
    pub is_error: bool,
    pub output_scroll: usize,
    pub notification: Option<Notification>,
    pub notification_timeout: Duration,
    pub theme: Theme,
    pub show_language_menu: bool,
    pub menu_cursor: usize,
    pub is_mobile_menu_open: bool,
    pub is_output_fullscreen: bool,
    pub is_narrow: bool,
    pub narrow_width: u16,
    pub show_help: bool,
    /// Sequence number of the most recently issued run
    pub last_issued_seq: u64,
    /// Drop completions older than `last_issued_seq` instead of displaying them.
    pub discard_stale_results: bool,
    pub should_quit: bool,
}

impl App {
    pub fn new(language: Language, cfg: &Config) -> Self {
        Self {
            language,
            editor: Editor::with_text(language.snippet()),
            editor_mounted: false,
            is_loading: false,
            output: Vec::new(),
            is_error: false,
            output_scroll: 0,
            notification: None,
            notification_timeout: cfg.notification_timeout(),
            theme: cfg.default_theme(),
            show_language_menu: false,
            menu_cursor: language.index(),
            is_mobile_menu_open: false,
            is_output_fullscreen: false,
            is_narrow: false,
            narrow_width: cfg.narrow_width(),
            show_help: false,
            last_issued_seq: 0,
            discard_stale_results: cfg.discard_stale_results(),
            should_quit: false,
        }
    }

    pub fn snippet(&self) -> Snippet {
        Snippet::new(self.language, self.editor.text())
    }

    pub fn is_menu_open(&self) -> bool {
        self.show_language_menu || self.is_mobile_menu_open
    }

    /// Which panes are drawn: (editor, output).
    pub fn visible_panes(&self) -> (bool, bool) {
        if self.is_narrow {
            (!self.is_output_fullscreen, self.is_output_fullscreen)
        } else {
            (true, true)
        }
    }

    pub fn notify(&mut self, message: impl Into<String>, kind: NotificationKind) {
        // A newer banner replaces the old one and restarts the timer
        self.notification = Some(Notification {
            message: message.into(),
            kind,
            raised_at: Instant::now(),
        });
    }

    pub fn update(&mut self, action: Action) -> Option<Command> {
        match action {
            Action::EditorMounted => {
                self.editor_mounted = true;
            }
            Action::Edit(edit) => {
                self.editor.apply(edit);
            }
            Action::SelectLanguage(lang) => {
                self.select_language(lang);
            }
            Action::ToggleLanguageMenu => {
                if self.is_narrow {
                    self.is_mobile_menu_open = !self.is_mobile_menu_open;
                } else {
                    self.show_language_menu = !self.show_language_menu;
                }
                self.menu_cursor = self.language.index();
            }
            Action::MenuMove(delta) => {
                let len = Language::ALL.len() as isize;
                self.menu_cursor = (self.menu_cursor as isize + delta).rem_euclid(len) as usize;
            }
            Action::MenuConfirm => {
                if self.is_menu_open() {
                    self.select_language(Language::ALL[self.menu_cursor]);
                }
            }
            Action::Run => return self.start_run(),
            Action::RunFinished { seq, outcome } => self.finish_run(seq, outcome),
            Action::Copy => {
                if !self.editor_mounted {
                    return None;
                }
                return Some(Command::CopyToClipboard(self.editor.text()));
            }
            Action::Copied => self.notify("Code copied to clipboard", NotificationKind::Success),
            Action::CopyFailed(err) => {
                self.notify(format!("Failed to copy code: {err}"), NotificationKind::Error)
            }
            Action::Download => {
                if !self.editor_mounted {
                    return None;
                }
                return Some(Command::Download {
                    file_name: download_file_name(self.language),
                    contents: self.editor.text(),
                });
            }
            Action::Downloaded(path) => {
                info!(path = %path.display(), "code downloaded");
                self.notify("Code downloaded", NotificationKind::Success)
            }
            Action::DownloadFailed(err) => {
                self.notify(format!("Failed to download code: {err}"), NotificationKind::Error)
            }
            Action::ClearOutput => {
                // is_error is left as-is; the next run overwrites it
                self.output.clear();
                self.output_scroll = 0;
            }
            Action::ToggleOutputFullscreen => {
                if self.is_narrow {
                    self.is_output_fullscreen = !self.is_output_fullscreen;
                }
            }
            Action::ToggleHelp => self.show_help = !self.show_help,
            Action::ToggleTheme => self.theme = self.theme.toggled(),
            Action::ScrollOutput(delta) => {
                let max = self.output.len().saturating_sub(1) as isize;
                self.output_scroll = (self.output_scroll as isize + delta).clamp(0, max.max(0)) as usize;
            }
            Action::Resize { width } => {
                self.is_narrow = width < self.narrow_width;
                if !self.is_narrow {
                    self.is_mobile_menu_open = false;
                    self.is_output_fullscreen = false;
                }
            }
            Action::Tick(now) => {
                let expired = self
                    .notification
                    .as_ref()
                    .is_some_and(|n| now.saturating_duration_since(n.raised_at) >= self.notification_timeout);
                if expired {
                    self.notification = None;
                }
            }
            Action::DismissOverlay => {
                self.show_help = false;
                self.show_language_menu = false;
                self.is_mobile_menu_open = false;
            }
            Action::Quit => self.should_quit = true,
        }
        None
    }

    fn select_language(&mut self, lang: Language) {
        // Destructive: the current buffer is replaced without confirmation
        self.language = lang;
        self.editor.set_text(lang.snippet());
        self.menu_cursor = lang.index();
        self.show_language_menu = false;
        self.is_mobile_menu_open = false;
        self.notify(format!("Switched to {lang}"), NotificationKind::Success);
    }

    fn start_run(&mut self) -> Option<Command> {
        if !self.editor_mounted {
            return None;
        }
        self.is_loading = true;
        if self.is_narrow {
            self.is_output_fullscreen = true;
        }
        self.last_issued_seq += 1;
        let seq = self.last_issued_seq;
        debug!(seq, language = %self.language, "run issued");
        Some(Command::Execute { seq, snippet: self.snippet() })
    }

    fn finish_run(&mut self, seq: u64, outcome: ExecutionOutcome) {
        // Any settled run clears loading, stale or not
        self.is_loading = false;
        if self.discard_stale_results && seq < self.last_issued_seq {
            info!(seq, latest = self.last_issued_seq, "discarding stale execution result");
            return;
        }

        self.output = outcome.lines();
        self.is_error = outcome.is_error();
        self.output_scroll = 0;
        let (message, kind) = outcome.notification();
        self.notify(message, kind);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn mounted_app() -> App {
        let mut app = App::new(Language::Javascript, &Config::defaults());
        app.update(Action::EditorMounted);
        app
    }

    fn success(lines: &[&str]) -> ExecutionOutcome {
        ExecutionOutcome::Success(lines.iter().map(|s| s.to_string()).collect())
    }

    fn issued_seq(cmd: Option<Command>) -> u64 {
        match cmd {
            Some(Command::Execute { seq, .. }) => seq,
            other => panic!("expected execute command, got {other:?}"),
        }
    }

    #[test]
    fn test_select_language_loads_snippet_without_running() {
        for lang in Language::ALL {
            let mut app = mounted_app();
            app.update(Action::Edit(EditorAction::Insert('x')));
            let cmd = app.update(Action::SelectLanguage(lang));
            assert_eq!(cmd, None);
            assert_eq!(app.language, lang);
            assert_eq!(app.editor.text(), lang.snippet());
            assert_eq!(app.last_issued_seq, 0);
            assert_eq!(
                app.notification.as_ref().map(|n| n.message.clone()),
                Some(format!("Switched to {lang}"))
            );
        }
    }

    #[test]
    fn test_run_builds_snippet_and_sets_loading() {
        let mut app = mounted_app();
        app.update(Action::SelectLanguage(Language::Python));
        let cmd = app.update(Action::Run);
        assert_eq!(
            cmd,
            Some(Command::Execute {
                seq: 1,
                snippet: Snippet::new(Language::Python, Language::Python.snippet()),
            })
        );
        assert!(app.is_loading);
    }

    #[test]
    fn test_actions_before_mount_are_ignored() {
        let mut app = App::new(Language::C, &Config::defaults());
        assert_eq!(app.update(Action::Run), None);
        assert_eq!(app.update(Action::Copy), None);
        assert_eq!(app.update(Action::Download), None);
        assert!(!app.is_loading);
        assert!(app.notification.is_none());
    }

    #[test]
    fn test_successful_run_displays_lines() {
        let mut app = mounted_app();
        let seq = issued_seq(app.update(Action::Run));
        app.update(Action::RunFinished { seq, outcome: success(&["a", "b", "c"]) });
        assert_eq!(app.output, vec!["a", "b", "c"]);
        assert!(!app.is_error);
        assert!(!app.is_loading);
        let note = app.notification.clone().unwrap();
        assert_eq!(note.message, "Code executed successfully");
        assert_eq!(note.kind, NotificationKind::Success);
    }

    #[test]
    fn test_transport_error_displays_synthetic_lines() {
        let mut app = mounted_app();
        let seq = issued_seq(app.update(Action::Run));
        app.update(Action::RunFinished {
            seq,
            outcome: ExecutionOutcome::TransportError("dns error".into()),
        });
        assert_eq!(app.output, vec!["Error executing code:", "dns error"]);
        assert!(app.is_error);
        assert!(!app.is_loading);
        assert_eq!(app.notification.unwrap().message, "Failed to execute code");
    }

    #[test]
    fn test_clear_output_keeps_error_flag() {
        let mut app = mounted_app();
        let seq = issued_seq(app.update(Action::Run));
        app.update(Action::RunFinished {
            seq,
            outcome: ExecutionOutcome::Failure(vec!["boom".into()]),
        });
        app.update(Action::ClearOutput);
        assert!(app.output.is_empty());
        assert!(app.is_error);

        let seq = issued_seq(app.update(Action::Run));
        app.update(Action::RunFinished { seq, outcome: success(&["ok"]) });
        assert!(!app.is_error);
    }

    #[test]
    fn test_download_file_name_is_not_extension_mapped() {
        assert_eq!(download_file_name(Language::C), "code.c");
        assert_eq!(download_file_name(Language::Python), "code.python");

        let mut app = mounted_app();
        app.update(Action::SelectLanguage(Language::C));
        app.editor.set_text("int main(){}");
        assert_eq!(
            app.update(Action::Download),
            Some(Command::Download {
                file_name: "code.c".into(),
                contents: "int main(){}".into(),
            })
        );
    }

    #[test]
    fn test_copy_emits_raw_buffer() {
        let mut app = mounted_app();
        app.editor.set_text("  x = 1\n");
        assert_eq!(app.update(Action::Copy), Some(Command::CopyToClipboard("  x = 1\n".into())));
        app.update(Action::Copied);
        assert_eq!(app.notification.unwrap().message, "Code copied to clipboard");
    }

    #[test]
    fn test_out_of_order_results_last_writer_wins_without_guard() {
        let mut app = mounted_app();
        app.discard_stale_results = false;
        let first = issued_seq(app.update(Action::Run));
        let second = issued_seq(app.update(Action::Run));

        app.update(Action::RunFinished { seq: second, outcome: success(&["second"]) });
        app.update(Action::RunFinished { seq: first, outcome: success(&["first"]) });

        assert_eq!(app.output, vec!["first"]);
        assert!(!app.is_loading);
    }

    #[test]
    fn test_out_of_order_results_stale_discarded_with_guard() {
        let mut app = mounted_app();
        assert!(app.discard_stale_results);
        let first = issued_seq(app.update(Action::Run));
        let second = issued_seq(app.update(Action::Run));

        app.update(Action::RunFinished { seq: second, outcome: success(&["second"]) });
        assert!(!app.is_loading);
        app.update(Action::RunFinished {
            seq: first,
            outcome: ExecutionOutcome::Failure(vec!["first".into()]),
        });

        assert_eq!(app.output, vec!["second"]);
        assert!(!app.is_error);
        assert!(!app.is_loading);
    }

    #[test]
    fn test_stale_result_clears_loading_but_keeps_display() {
        let mut app = mounted_app();
        let first = issued_seq(app.update(Action::Run));
        let _second = issued_seq(app.update(Action::Run));
        app.update(Action::RunFinished { seq: first, outcome: success(&["first"]) });
        assert!(!app.is_loading);
        assert!(app.output.is_empty());
        assert!(app.notification.is_none());
    }

    #[test]
    fn test_run_on_narrow_terminal_shows_output() {
        let mut app = mounted_app();
        app.update(Action::Resize { width: 60 });
        assert!(app.is_narrow);
        assert_eq!(app.visible_panes(), (true, false));
        app.update(Action::Run);
        assert!(app.is_output_fullscreen);
        assert_eq!(app.visible_panes(), (false, true));
    }

    #[test]
    fn test_widening_resets_mobile_flags() {
        let mut app = mounted_app();
        app.update(Action::Resize { width: 60 });
        app.update(Action::ToggleOutputFullscreen);
        app.update(Action::ToggleLanguageMenu);
        assert!(app.is_output_fullscreen && app.is_mobile_menu_open);
        app.update(Action::Resize { width: 160 });
        assert!(!app.is_output_fullscreen);
        assert!(!app.is_mobile_menu_open);
        assert_eq!(app.visible_panes(), (true, true));
    }

    #[test]
    fn test_fullscreen_toggle_ignored_on_wide_terminal() {
        let mut app = mounted_app();
        app.update(Action::Resize { width: 160 });
        app.update(Action::ToggleOutputFullscreen);
        assert!(!app.is_output_fullscreen);
    }

    #[test]
    fn test_notification_expires_and_resets_on_replace() {
        let mut app = mounted_app();
        app.notify("first", NotificationKind::Success);
        let first_raised = app.notification.as_ref().unwrap().raised_at;

        app.update(Action::Tick(first_raised + Duration::from_millis(2999)));
        assert!(app.notification.is_some());

        app.notify("second", NotificationKind::Error);
        let second_raised = app.notification.as_ref().unwrap().raised_at;
        assert!(second_raised >= first_raised);

        app.update(Action::Tick(second_raised + Duration::from_millis(2999)));
        assert_eq!(app.notification.as_ref().unwrap().message, "second");

        app.update(Action::Tick(second_raised + Duration::from_secs(3)));
        assert!(app.notification.is_none());
    }

    #[test]
    fn test_menu_confirm_selects_highlighted_language() {
        let mut app = mounted_app();
        app.update(Action::ToggleLanguageMenu);
        assert!(app.show_language_menu);
        app.update(Action::MenuMove(-1));
        app.update(Action::MenuConfirm);
        assert_eq!(app.language, Language::C);
        assert!(!app.is_menu_open());
    }

    #[test]
    fn test_theme_parse_and_toggle() {
        assert_eq!("vs-dark".parse::<Theme>().unwrap(), Theme::Dark);
        assert_eq!("LIGHT".parse::<Theme>().unwrap(), Theme::Light);
        assert!("solarized".parse::<Theme>().is_err());
        let mut app = mounted_app();
        app.update(Action::ToggleTheme);
        assert_eq!(app.theme, Theme::Light);
    }
}
