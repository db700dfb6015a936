//! UI layout and rendering logic for the TUI.

use ratatui::{
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span, Text},
    widgets::{Block, Borders, Clear, Paragraph, Wrap},
    Frame,
};

use super::app::{App, Theme};
use crate::language::Language;
use crate::piston::NotificationKind;

struct Palette {
    bg: Color,
    fg: Color,
    muted: Color,
    border: Color,
    accent: Color,
    ok: Color,
    err: Color,
}

fn palette(theme: Theme) -> Palette {
    match theme {
        Theme::Dark => Palette {
            bg: Color::Black,
            fg: Color::White,
            muted: Color::DarkGray,
            border: Color::DarkGray,
            accent: Color::LightBlue,
            ok: Color::LightGreen,
            err: Color::LightRed,
        },
        Theme::Light => Palette {
            bg: Color::White,
            fg: Color::Black,
            muted: Color::Gray,
            border: Color::Gray,
            accent: Color::Blue,
            ok: Color::Green,
            err: Color::Red,
        },
    }
}

/// Render the main UI
pub fn render_ui(frame: &mut Frame, app: &mut App) {
    let pal = palette(app.theme);
    frame.render_widget(Block::default().style(Style::default().bg(pal.bg).fg(pal.fg)), frame.area());

    let main_layout = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3), // Top bar
            Constraint::Min(3),    // Panes
            Constraint::Length(1), // Status bar
        ])
        .split(frame.area());

    render_top_bar(frame, app, &pal, main_layout[0]);

    match app.visible_panes() {
        (true, true) => {
            let panes = Layout::default()
                .direction(Direction::Horizontal)
                .constraints([Constraint::Percentage(50), Constraint::Percentage(50)])
                .split(main_layout[1]);
            render_editor(frame, app, &pal, panes[0]);
            render_output(frame, app, &pal, panes[1]);
        }
        (true, false) => render_editor(frame, app, &pal, main_layout[1]),
        _ => render_output(frame, app, &pal, main_layout[1]),
    }

    render_status_bar(frame, app, &pal, main_layout[2]);

    if app.show_language_menu {
        render_language_menu(frame, app, &pal, dropdown_rect(main_layout[0], frame.area()));
    } else if app.is_mobile_menu_open {
        render_language_menu(frame, app, &pal, frame.area());
    }

    if app.show_help {
        render_help_overlay(frame, &pal);
    }

    render_notification(frame, app, &pal);
}

fn render_top_bar(frame: &mut Frame, app: &App, pal: &Palette, area: Rect) {
    let run_label = if app.is_loading { " Running... " } else { " Run (F5) " };
    let run_style = if app.is_loading {
        Style::default().bg(pal.muted).fg(pal.fg)
    } else {
        Style::default().bg(Color::Blue).fg(Color::White).add_modifier(Modifier::BOLD)
    };

    let mut spans = vec![
        Span::styled("</> CodeLab", Style::default().fg(pal.accent).add_modifier(Modifier::BOLD)),
        Span::raw("  "),
        Span::styled(
            format!("[{} ({})] ▾", app.language, app.language.version()),
            Style::default().fg(pal.fg),
        ),
    ];
    if !app.is_narrow {
        spans.push(Span::styled("  ^Y copy  ^S download  ", Style::default().fg(pal.muted)));
    }
    spans.push(Span::raw(" "));
    spans.push(Span::styled(run_label, run_style));

    let bar = Paragraph::new(Line::from(spans))
        .block(Block::default().borders(Borders::BOTTOM).border_style(Style::default().fg(pal.border)));
    frame.render_widget(bar, area);
}

fn render_editor(frame: &mut Frame, app: &mut App, pal: &Palette, area: Rect) {
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(pal.border))
        .title(format!("Editor - {}", app.language));
    let inner = block.inner(area);
    let height = inner.height as usize;
    app.editor.scroll_into_view(height);

    let gutter = app.editor.lines().len().to_string().len().max(2);
    let lines: Vec<Line> = app
        .editor
        .lines()
        .iter()
        .enumerate()
        .skip(app.editor.scroll)
        .take(height)
        .map(|(i, text)| {
            Line::from(vec![
                Span::styled(format!("{:>gutter$} ", i + 1), Style::default().fg(pal.muted)),
                Span::styled(text.clone(), Style::default().fg(pal.fg)),
            ])
        })
        .collect();

    frame.render_widget(Paragraph::new(Text::from(lines)).block(block), area);

    let overlay_open = app.show_help || app.is_menu_open();
    if !overlay_open {
        let (row, _) = app.editor.cursor();
        let x = inner.x + (gutter + 1 + app.editor.cursor_display_col()) as u16;
        let y = inner.y + row.saturating_sub(app.editor.scroll) as u16;
        if x < inner.x + inner.width && y < inner.y + inner.height {
            frame.set_cursor_position((x, y));
        }
    }
}

fn render_output(frame: &mut Frame, app: &App, pal: &Palette, area: Rect) {
    let mut title = String::from("Output");
    if app.is_narrow {
        title.push_str(if app.is_output_fullscreen { " [^O editor]" } else { " [^O output]" });
    }
    title.push_str(" [^K clear]");

    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(pal.border))
        .title(title);

    if app.output.is_empty() {
        let placeholder = Paragraph::new(Text::from(vec![
            Line::from(""),
            Line::from("▶"),
            Line::from("Press F5 to execute your code and"),
            Line::from("see the output here"),
        ]))
        .style(Style::default().fg(pal.muted))
        .alignment(Alignment::Center)
        .block(block);
        frame.render_widget(placeholder, area);
        return;
    }

    let color = if app.is_error { pal.err } else { pal.ok };
    let lines: Vec<Line> = app
        .output
        .iter()
        .map(|l| Line::from(Span::styled(l.clone(), Style::default().fg(color))))
        .collect();

    let paragraph = Paragraph::new(Text::from(lines))
        .block(block)
        .wrap(Wrap { trim: false })
        .scroll((app.output_scroll as u16, 0));
    frame.render_widget(paragraph, area);
}

/// Render the status bar
fn render_status_bar(frame: &mut Frame, app: &App, pal: &Palette, area: Rect) {
    let (row, col) = app.editor.cursor();
    let text = format!(
        " Ln {}, Col {} | {} | theme: {} | F1 help  ^L language  ^R run  ^Q quit",
        row + 1,
        col + 1,
        if app.is_loading { "running" } else { "idle" },
        app.theme.name(),
    );
    let status = Paragraph::new(text).style(Style::default().bg(pal.muted).fg(pal.fg));
    frame.render_widget(status, area);
}

fn dropdown_rect(top_bar: Rect, screen: Rect) -> Rect {
    let height = (Language::ALL.len() as u16 + 2).min(screen.height);
    Rect {
        x: top_bar.x + 12,
        y: top_bar.y + top_bar.height.saturating_sub(1),
        width: 30.min(screen.width.saturating_sub(12)),
        height,
    }
    .intersection(screen)
}

fn render_language_menu(frame: &mut Frame, app: &App, pal: &Palette, area: Rect) {
    frame.render_widget(Clear, area);
    let lines: Vec<Line> = Language::ALL
        .iter()
        .enumerate()
        .map(|(i, lang)| {
            let style = if i == app.menu_cursor {
                Style::default().bg(pal.accent).fg(pal.bg)
            } else {
                Style::default().fg(pal.fg)
            };
            Line::from(vec![
                Span::styled(format!("{} {:<11}", i + 1, lang.id()), style),
                Span::styled(format!("({})", lang.version()), Style::default().fg(pal.muted)),
            ])
        })
        .collect();

    let menu = Paragraph::new(Text::from(lines)).block(
        Block::default()
            .borders(Borders::ALL)
            .title("Select Language")
            .style(Style::default().bg(pal.bg)),
    );
    frame.render_widget(menu, area);
}

fn render_notification(frame: &mut Frame, app: &App, pal: &Palette) {
    let Some(note) = &app.notification else {
        return;
    };
    let area = frame.area();
    let width = (note.message.chars().count() as u16 + 6).min(area.width);
    let rect = Rect {
        x: area.x + area.width.saturating_sub(width) / 2,
        y: area.y,
        width,
        height: 3.min(area.height),
    };
    let (icon, bg) = match note.kind {
        NotificationKind::Success => ("✓", pal.ok),
        NotificationKind::Error => ("!", pal.err),
    };

    frame.render_widget(Clear, rect);
    let banner = Paragraph::new(format!("{} {}", icon, note.message))
        .style(Style::default().bg(bg).fg(Color::Black).add_modifier(Modifier::BOLD))
        .alignment(Alignment::Center)
        .block(Block::default().borders(Borders::ALL));
    frame.render_widget(banner, rect);
}

/// Render help overlay
fn render_help_overlay(frame: &mut Frame, pal: &Palette) {
    let popup_area = centered_rect(70, 70, frame.area());
    frame.render_widget(Clear, popup_area);

    let help_lines = vec![
        Line::from("CodeLab Help"),
        Line::from(""),
        Line::from("Code:"),
        Line::from("  F5 / Ctrl+R  - Run code"),
        Line::from("  Ctrl+Y       - Copy code to clipboard"),
        Line::from("  Ctrl+S       - Download code as code.<language>"),
        Line::from("  F2 / Ctrl+L  - Select language (replaces the editor contents)"),
        Line::from(""),
        Line::from("Output:"),
        Line::from("  Ctrl+K       - Clear output"),
        Line::from("  Ctrl+O       - Toggle output pane (narrow terminals)"),
        Line::from("  PgUp/PgDn    - Scroll output"),
        Line::from(""),
        Line::from("Other:"),
        Line::from("  Ctrl+T       - Toggle theme"),
        Line::from("  F1           - Toggle this help"),
        Line::from("  Ctrl+Q       - Quit"),
    ];

    let help = Paragraph::new(Text::from(help_lines))
        .block(
            Block::default()
                .borders(Borders::ALL)
                .title("Help")
                .title_style(Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD))
                .style(Style::default().bg(pal.bg).fg(pal.fg)),
        )
        .wrap(Wrap { trim: true });
    frame.render_widget(help, popup_area);
}

/// Helper function to create a centered rectangle
fn centered_rect(percent_x: u16, percent_y: u16, r: Rect) -> Rect {
    let popup_layout = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Percentage((100 - percent_y) / 2),
            Constraint::Percentage(percent_y),
            Constraint::Percentage((100 - percent_y) / 2),
        ])
        .split(r);

    Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage((100 - percent_x) / 2),
            Constraint::Percentage(percent_x),
            Constraint::Percentage((100 - percent_x) / 2),
        ])
        .split(popup_layout[1])[1]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;
    use crate::piston::ExecutionOutcome;
    use crate::tui::app::Action;
    use ratatui::{backend::TestBackend, Terminal};

    fn screen_text(terminal: &Terminal<TestBackend>) -> String {
        let buffer = terminal.backend().buffer();
        let width = buffer.area.width as usize;
        let mut out = String::new();
        for row in buffer.content().chunks(width) {
            for cell in row {
                out.push_str(cell.symbol());
            }
            out.push('\n');
        }
        out
    }

    #[test]
    fn test_wide_layout_shows_both_panes() {
        let mut app = App::new(Language::Python, &Config::defaults());
        app.update(Action::Resize { width: 120 });
        let mut terminal = Terminal::new(TestBackend::new(120, 30)).unwrap();
        terminal.draw(|f| render_ui(f, &mut app)).unwrap();
        let text = screen_text(&terminal);
        assert!(text.contains("Editor - python"));
        assert!(text.contains("Output"));
        assert!(text.contains("python (3.10.0)"));
    }

    #[test]
    fn test_narrow_layout_after_run_shows_output_only() {
        let mut app = App::new(Language::C, &Config::defaults());
        app.update(Action::Resize { width: 60 });
        app.update(Action::EditorMounted);
        app.update(Action::Run);
        app.update(Action::RunFinished {
            seq: 1,
            outcome: ExecutionOutcome::Failure(vec!["segfault".into()]),
        });
        let mut terminal = Terminal::new(TestBackend::new(60, 20)).unwrap();
        terminal.draw(|f| render_ui(f, &mut app)).unwrap();
        let text = screen_text(&terminal);
        assert!(text.contains("segfault"));
        assert!(text.contains("Execution failed"));
        assert!(!text.contains("Editor - c"));
    }
}
