use ratatui::buffer::Buffer;
use ratatui::layout::{Alignment, Constraint, Direction, Layout, Rect};
use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Paragraph, Widget};

use crate::ui::theme::Theme;

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct MenuItem {
    pub key: String,
    pub label: String,
    pub description: String,
}

impl MenuItem {
    pub fn new(key: &str, label: &str, description: &str) -> Self {
        Self {
            key: key.to_string(),
            label: label.to_string(),
            description: description.to_string(),
        }
    }
}

pub struct Menu<'a> {
    pub title: String,
    pub subtitle: String,
    pub items: Vec<MenuItem>,
    pub selected: usize,
    pub theme: &'a Theme,
}

impl<'a> Menu<'a> {
    pub fn new(theme: &'a Theme) -> Self {
        Self {
            title: "examdrill".to_string(),
            subtitle: String::new(),
            items: Vec::new(),
            selected: 0,
            theme,
        }
    }

    /// Replace the entries and put the cursor on the first one.
    pub fn set_items(&mut self, title: &str, subtitle: &str, items: Vec<MenuItem>) {
        self.title = title.to_string();
        self.subtitle = subtitle.to_string();
        self.items = items;
        self.selected = 0;
    }

    pub fn next(&mut self) {
        if !self.items.is_empty() {
            self.selected = (self.selected + 1) % self.items.len();
        }
    }

    pub fn prev(&mut self) {
        if self.selected > 0 {
            self.selected -= 1;
        } else {
            self.selected = self.items.len().saturating_sub(1);
        }
    }

    /// Index of the item bound to `key`, if any.
    pub fn index_of_key(&self, key: char) -> Option<usize> {
        let mut buf = [0u8; 4];
        let key: &str = key.encode_utf8(&mut buf);
        self.items.iter().position(|item| item.key == key)
    }
}

impl Widget for &Menu<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let colors = &self.theme.colors;

        let block = Block::bordered()
            .border_style(Style::default().fg(colors.border()))
            .style(Style::default().bg(colors.bg()));
        let inner = block.inner(area);
        block.render(area, buf);

        let layout = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(4),
                Constraint::Length(1),
                Constraint::Min(0),
            ])
            .split(inner);

        let title_lines = vec![
            Line::from(""),
            Line::from(Span::styled(
                self.title.as_str(),
                Style::default()
                    .fg(colors.accent())
                    .add_modifier(Modifier::BOLD),
            )),
            Line::from(Span::styled(
                self.subtitle.as_str(),
                Style::default().fg(colors.muted()),
            )),
        ];
        Paragraph::new(title_lines)
            .alignment(Alignment::Center)
            .render(layout[0], buf);

        let menu_layout = Layout::default()
            .direction(Direction::Vertical)
            .constraints(
                self.items
                    .iter()
                    .map(|_| Constraint::Length(2))
                    .collect::<Vec<_>>(),
            )
            .split(layout[2]);

        for (i, (item, row)) in self.items.iter().zip(menu_layout.iter()).enumerate() {
            let is_selected = i == self.selected;
            let indicator = if is_selected { ">" } else { " " };
            let label_style = if is_selected {
                Style::default()
                    .fg(colors.accent())
                    .add_modifier(Modifier::BOLD)
            } else {
                Style::default().fg(colors.fg())
            };

            let lines = vec![
                Line::from(Span::styled(
                    format!(" {indicator} [{}] {}", item.key, item.label),
                    label_style,
                )),
                Line::from(Span::styled(
                    format!("     {}", item.description),
                    Style::default().fg(colors.muted()),
                )),
            ];
            Paragraph::new(lines).render(*row, buf);
        }
    }
}
