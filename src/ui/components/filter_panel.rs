use ratatui::buffer::Buffer;
use ratatui::layout::Rect;
use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Paragraph, Widget, Wrap};

use crate::ui::line_input::LineInput;
use crate::ui::theme::Theme;
use examdrill::engine::filter::{Facet, FacetCount};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FilterRow {
    Mode,
    Years,
    Keyword,
    Category,
    SubCategory,
}

impl FilterRow {
    pub const ALL: [FilterRow; 5] = [
        FilterRow::Mode,
        FilterRow::Years,
        FilterRow::Keyword,
        FilterRow::Category,
        FilterRow::SubCategory,
    ];

    pub fn next(self) -> Self {
        let i = Self::ALL.iter().position(|r| *r == self).unwrap_or(0);
        Self::ALL[(i + 1) % Self::ALL.len()]
    }

    pub fn prev(self) -> Self {
        let i = Self::ALL.iter().position(|r| *r == self).unwrap_or(0);
        Self::ALL[(i + Self::ALL.len() - 1) % Self::ALL.len()]
    }

    fn label(self) -> &'static str {
        match self {
            FilterRow::Mode => "Mode",
            FilterRow::Years => "Years",
            FilterRow::Keyword => "Search",
            FilterRow::Category => "Category",
            FilterRow::SubCategory => "Sub-category",
        }
    }
}

pub struct FilterPanel<'a> {
    pub mode_label: &'a str,
    /// Every year on offer with whether it is selected.
    pub years: Vec<(u32, bool)>,
    pub year_cursor: usize,
    pub keyword: &'a str,
    /// Set while the keyword is being typed.
    pub keyword_input: Option<&'a LineInput>,
    pub categories: &'a [FacetCount],
    pub category: &'a Facet,
    pub sub_categories: &'a [FacetCount],
    pub sub_category: &'a Facet,
    pub pool_size: usize,
    /// Highlighted row, or `None` when the panel is not focused.
    pub active: Option<FilterRow>,
    pub theme: &'a Theme,
}

impl FilterPanel<'_> {
    fn row_style(&self, row: FilterRow) -> Style {
        let colors = &self.theme.colors;
        if self.active == Some(row) {
            Style::default()
                .fg(colors.accent())
                .add_modifier(Modifier::BOLD)
        } else {
            Style::default().fg(colors.muted())
        }
    }

    fn facet_line(&self, counts: &[FacetCount], selected: &Facet) -> Line<'static> {
        let colors = &self.theme.colors;
        let spans: Vec<Span<'static>> = counts
            .iter()
            .map(|fc| {
                let text = format!(" {} ({}) ", fc.facet.label(), fc.count);
                if &fc.facet == selected {
                    Span::styled(
                        text,
                        Style::default().fg(colors.bg()).bg(colors.accent()),
                    )
                } else {
                    Span::styled(text, Style::default().fg(colors.fg()))
                }
            })
            .collect();
        Line::from(spans)
    }
}

impl Widget for &FilterPanel<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let colors = &self.theme.colors;
        let border = if self.active.is_some() {
            colors.border_focused()
        } else {
            colors.border()
        };
        let block = Block::bordered()
            .title(format!(" Filters · {} questions ", self.pool_size))
            .border_style(Style::default().fg(border))
            .style(Style::default().bg(colors.bg()));

        let mut lines: Vec<Line> = Vec::new();

        lines.push(Line::from(Span::styled(
            FilterRow::Mode.label(),
            self.row_style(FilterRow::Mode),
        )));
        lines.push(Line::from(Span::styled(
            format!(" {} ", self.mode_label),
            Style::default().fg(colors.fg()),
        )));

        lines.push(Line::from(Span::styled(
            FilterRow::Years.label(),
            self.row_style(FilterRow::Years),
        )));
        let year_spans: Vec<Span> = self
            .years
            .iter()
            .enumerate()
            .map(|(i, (year, on))| {
                let mark = if *on { "x" } else { " " };
                let mut style = Style::default().fg(if *on { colors.fg() } else { colors.muted() });
                if self.active == Some(FilterRow::Years) && i == self.year_cursor {
                    style = style.bg(colors.selected_bg()).add_modifier(Modifier::BOLD);
                }
                Span::styled(format!(" [{mark}] {year}"), style)
            })
            .collect();
        lines.push(Line::from(year_spans));

        lines.push(Line::from(Span::styled(
            FilterRow::Keyword.label(),
            self.row_style(FilterRow::Keyword),
        )));
        let text_style = Style::default().fg(colors.fg());
        if let Some(input) = self.keyword_input {
            let (before, cursor, after) = input.render_parts();
            let cursor = cursor.map(String::from).unwrap_or_else(|| " ".to_string());
            lines.push(Line::from(vec![
                Span::styled(format!(" {before}"), text_style),
                Span::styled(cursor, Style::default().fg(colors.bg()).bg(colors.accent())),
                Span::styled(after.to_string(), text_style),
            ]));
        } else if self.keyword.is_empty() {
            lines.push(Line::from(Span::styled(
                " (press / to search)",
                Style::default().fg(colors.muted()),
            )));
        } else {
            lines.push(Line::from(Span::styled(format!(" {}", self.keyword), text_style)));
        }

        lines.push(Line::from(Span::styled(
            FilterRow::Category.label(),
            self.row_style(FilterRow::Category),
        )));
        lines.push(self.facet_line(self.categories, self.category));

        if !self.sub_categories.is_empty() {
            lines.push(Line::from(Span::styled(
                FilterRow::SubCategory.label(),
                self.row_style(FilterRow::SubCategory),
            )));
            lines.push(self.facet_line(self.sub_categories, self.sub_category));
        }

        Paragraph::new(lines)
            .block(block)
            .wrap(Wrap { trim: false })
            .render(area, buf);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rows_cycle() {
        assert_eq!(FilterRow::Mode.prev(), FilterRow::SubCategory);
        assert_eq!(FilterRow::SubCategory.next(), FilterRow::Mode);
        assert_eq!(FilterRow::Years.next(), FilterRow::Keyword);
    }
}
