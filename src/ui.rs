use crate::journal_entry::JournalEntry;
use crate::journal_state::JournalState;
use color_eyre::Result;
use crossterm::{
    event::{KeyCode, KeyEvent, KeyEventKind, KeyModifiers},
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
    ExecutableCommand,
};
use ratatui::{
    backend::CrosstermBackend,
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, List, ListItem, ListState, Paragraph, Wrap},
    Frame, Terminal,
};
use std::io::{stdout, Stdout};
use unicode_width::UnicodeWidthStr;

const INPUT_HEIGHT: u16 = 6;
const REPLY_MIN_HEIGHT: u16 = 3;
pub const PAGE_SIZE: usize = 5;

/// What a key press asks the page to do.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    Insert(char),
    Newline,
    Backspace,
    Delete,
    Left,
    Right,
    Home,
    End,
    ScrollUp,
    ScrollDown,
    PageUp,
    PageDown,
    Submit,
    Refresh,
    Quit,
}

pub fn map_key(key: KeyEvent) -> Option<Command> {
    if key.kind != KeyEventKind::Press {
        return None;
    }
    let ctrl = key.modifiers.contains(KeyModifiers::CONTROL);
    let alt = key.modifiers.contains(KeyModifiers::ALT);
    match key.code {
        KeyCode::Char('c') if ctrl => Some(Command::Quit),
        KeyCode::Char('r') if ctrl => Some(Command::Refresh),
        KeyCode::Char('j') if ctrl => Some(Command::Newline),
        KeyCode::Char(_) if ctrl => None,
        KeyCode::Char(c) => Some(Command::Insert(c)),
        KeyCode::Enter if alt => Some(Command::Newline),
        KeyCode::Enter => Some(Command::Submit),
        KeyCode::Backspace => Some(Command::Backspace),
        KeyCode::Delete => Some(Command::Delete),
        KeyCode::Left => Some(Command::Left),
        KeyCode::Right => Some(Command::Right),
        KeyCode::Home => Some(Command::Home),
        KeyCode::End => Some(Command::End),
        KeyCode::Up => Some(Command::ScrollUp),
        KeyCode::Down => Some(Command::ScrollDown),
        KeyCode::PageUp => Some(Command::PageUp),
        KeyCode::PageDown => Some(Command::PageDown),
        KeyCode::Esc => Some(Command::Quit),
        _ => None,
    }
}

/// One card per entry, in the order given: the text, then its local date.
pub fn entry_cards(entries: &[JournalEntry]) -> Vec<ListItem<'static>> {
    entries
        .iter()
        .map(|entry| {
            let mut lines: Vec<Line> = entry
                .text
                .lines()
                .map(|line| Line::from(Span::raw(line.to_string())))
                .collect();
            lines.push(Line::from(Span::styled(
                entry.local_date(),
                Style::default().fg(Color::DarkGray),
            )));
            lines.push(Line::from(""));
            ListItem::new(lines)
        })
        .collect()
}

/// Rows `text` takes when word-wrapped to `width` columns.
fn wrapped_line_count(text: &str, width: u16) -> u16 {
    let width = usize::from(width.max(1));
    let mut rows = 0usize;
    for line in text.split('\n') {
        let mut current = 0usize;
        let mut line_rows = 1usize;
        for word in line.split(' ') {
            let word_width = word.width();
            let needed = if current == 0 { word_width } else { current + 1 + word_width };
            if needed <= width {
                current = needed;
                continue;
            }
            if current > 0 {
                line_rows += 1;
            }
            line_rows += word_width.saturating_sub(1) / width;
            current = word_width.saturating_sub(1) % width + 1;
        }
        rows += line_rows;
    }
    u16::try_from(rows).unwrap_or(u16::MAX)
}

pub fn render(f: &mut Frame, state: &JournalState) {
    let area = f.area();
    let mut constraints = vec![Constraint::Length(3), Constraint::Length(INPUT_HEIGHT)];
    if let Some(reply) = state.reply() {
        // margin and borders take two columns on each side
        let rows = wrapped_line_count(reply, area.width.saturating_sub(4));
        let cap = (area.height / 3).max(REPLY_MIN_HEIGHT);
        constraints.push(Constraint::Length(rows.saturating_add(2).min(cap)));
    }
    constraints.push(Constraint::Min(0));
    constraints.push(Constraint::Length(1));

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .margin(1)
        .constraints(constraints)
        .split(area);

    let title = Paragraph::new("Journal")
        .style(
            Style::default()
                .fg(Color::Cyan)
                .add_modifier(Modifier::BOLD),
        )
        .alignment(Alignment::Center);
    f.render_widget(title, chunks[0]);

    render_input(f, chunks[1], state);

    let mut next = 2;
    if let Some(reply) = state.reply() {
        let reply_panel = Paragraph::new(reply.to_string())
            .wrap(Wrap { trim: false })
            .style(Style::default().fg(Color::Green))
            .block(Block::default().borders(Borders::ALL).title("Reply"));
        f.render_widget(reply_panel, chunks[next]);
        next += 1;
    }

    let entries = state.get_entries();
    let entries_list = List::new(entry_cards(entries))
        .block(
            Block::default()
                .borders(Borders::ALL)
                .title(format!("Entries ({})", entries.len())),
        )
        .highlight_style(Style::default().add_modifier(Modifier::BOLD))
        .highlight_symbol("> ");
    f.render_stateful_widget(
        entries_list,
        chunks[next],
        &mut ListState::default().with_selected(state.selected_entry()),
    );

    let controls = Line::from(vec![
        Span::styled("Enter", Style::default().add_modifier(Modifier::BOLD)),
        Span::raw(": save, "),
        Span::styled("Alt+Enter", Style::default().add_modifier(Modifier::BOLD)),
        Span::raw(": new line, "),
        Span::styled("Up/Down", Style::default().add_modifier(Modifier::BOLD)),
        Span::raw(": scroll, "),
        Span::styled("Ctrl+R", Style::default().add_modifier(Modifier::BOLD)),
        Span::raw(": reload, "),
        Span::styled("Esc", Style::default().add_modifier(Modifier::BOLD)),
        Span::raw(": quit"),
    ]);
    let controls_paragraph = Paragraph::new(controls)
        .style(Style::default().fg(Color::Yellow))
        .alignment(Alignment::Center);
    f.render_widget(controls_paragraph, chunks[next + 1]);
}

fn render_input(f: &mut Frame, area: Rect, state: &JournalState) {
    let before_cursor = &state.input()[..state.cursor()];
    let row = before_cursor.matches('\n').count() as u16;
    let line_start = before_cursor.rfind('\n').map(|i| i + 1).unwrap_or(0);
    let column = before_cursor[line_start..].width() as u16;

    let inner_height = area.height.saturating_sub(2).max(1);
    let inner_width = area.width.saturating_sub(2).max(1);
    let scroll = row.saturating_sub(inner_height - 1);
    let shift = column.saturating_sub(inner_width - 1);

    let input = Paragraph::new(state.input().to_string())
        .scroll((scroll, shift))
        .block(Block::default().borders(Borders::ALL).title("New entry"));
    f.render_widget(input, area);

    f.set_cursor_position((area.x + 1 + column - shift, area.y + 1 + row - scroll));
}

/// Owns the terminal for the lifetime of the interactive page.
pub struct UI {
    terminal: Terminal<CrosstermBackend<Stdout>>,
}

impl UI {
    pub fn new() -> Result<Self> {
        enable_raw_mode()?;
        stdout().execute(EnterAlternateScreen)?;

        let backend = CrosstermBackend::new(stdout());
        let terminal = Terminal::new(backend)?;

        Ok(UI { terminal })
    }

    pub fn display(&mut self, state: &JournalState) -> Result<()> {
        self.terminal.draw(|f| render(f, state))?;
        Ok(())
    }
}

impl Drop for UI {
    fn drop(&mut self) {
        if let Err(err) = disable_raw_mode() {
            tracing::warn!(error = %err, "failed to leave raw mode");
        }
        if let Err(err) = stdout().execute(LeaveAlternateScreen) {
            tracing::warn!(error = %err, "failed to leave alternate screen");
        }
    }
}
