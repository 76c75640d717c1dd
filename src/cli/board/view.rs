//! Board view: one column per shelf

use ratatui::{
    prelude::*,
    widgets::{Block, Borders, List, ListItem, ListState, Paragraph},
};

use super::app::{App, InputMode};
use crate::cli::utils::{book_count, truncate_str};
use crate::domain::ShelfKey;

fn shelf_color(shelf: ShelfKey) -> Color {
    match shelf {
        ShelfKey::ToRead => Color::Green,
        ShelfKey::Reading => Color::Yellow,
        ShelfKey::Completed => Color::DarkGray,
    }
}

/// Draw the board layout
pub fn draw(frame: &mut Frame, app: &App) {
    let main_chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Min(10),   // Columns
            Constraint::Length(3), // Status bar
        ])
        .split(frame.area());

    let columns = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage(33),
            Constraint::Percentage(34),
            Constraint::Percentage(33),
        ])
        .split(main_chunks[0]);

    for shelf in ShelfKey::ALL {
        draw_column(frame, app, shelf, columns[shelf.index()]);
    }

    draw_status_bar(frame, app, main_chunks[1]);
}

fn draw_column(frame: &mut Frame, app: &App, shelf: ShelfKey, area: Rect) {
    let focused = app.column() == shelf;
    let color = shelf_color(shelf);
    // Borders plus a little padding
    let width = area.width.saturating_sub(4) as usize;

    let items: Vec<ListItem> = app
        .store()
        .snapshot(shelf)
        .iter()
        .map(|book| {
            ListItem::new(vec![
                Line::from(truncate_str(&book.title, width)).style(Style::default().fg(color)),
                Line::from(truncate_str(&book.author, width))
                    .style(Style::default().fg(Color::Gray)),
            ])
        })
        .collect();

    let title = format!("{} ({})", shelf.label(), book_count(items.len()));
    let border_style = if focused {
        Style::default().fg(color).add_modifier(Modifier::BOLD)
    } else {
        Style::default().fg(color)
    };

    let list = List::new(items)
        .block(
            Block::default()
                .title(title)
                .borders(Borders::ALL)
                .border_style(border_style),
        )
        .highlight_style(Style::default().add_modifier(Modifier::REVERSED))
        .highlight_symbol("> ");

    let mut state = ListState::default();
    if focused && app.store().count(shelf) > 0 {
        state.select(Some(app.selected_index(shelf)));
    }

    frame.render_stateful_widget(list, area, &mut state);
}

fn draw_status_bar(frame: &mut Frame, app: &App, area: Rect) {
    let (content, style) = match app.input_mode() {
        InputMode::Normal => {
            let msg = app
                .status_message()
                .unwrap_or("[h/l]focus [j/k]select [H/L]move [1-3]move to [x]remove [r]eload [q]uit");
            (msg.to_string(), Style::default())
        }
        InputMode::ConfirmRemove(_) => (
            app.status_message().unwrap_or("Remove? [y/n]").to_string(),
            Style::default().fg(Color::Yellow),
        ),
    };

    let paragraph = Paragraph::new(content)
        .style(style)
        .block(Block::default().borders(Borders::ALL));

    frame.render_widget(paragraph, area);
}
