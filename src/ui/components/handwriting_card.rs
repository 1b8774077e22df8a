use ratatui::buffer::Buffer;
use ratatui::layout::{Constraint, Direction, Layout, Rect};
use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Paragraph, Widget, Wrap};

use crate::ui::theme::Theme;
use examdrill::bank::question::HandwritingQuestion;
use examdrill::session::handwriting::word_count;

pub struct HandwritingCard<'a> {
    pub question: Option<&'a HandwritingQuestion>,
    pub position: (usize, usize),
    pub practiced: bool,
    pub draft: &'a str,
    pub editing: bool,
    pub show_reference: bool,
    pub theme: &'a Theme,
}

impl Widget for &HandwritingCard<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let colors = &self.theme.colors;

        let Some(question) = self.question else {
            Paragraph::new("No prompts match the current filters.")
                .style(Style::default().fg(colors.muted()).bg(colors.bg()))
                .block(Block::bordered().border_style(Style::default().fg(colors.border())))
                .render(area, buf);
            return;
        };

        let halves = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Percentage(50), Constraint::Percentage(50)])
            .split(area);

        let (index, total) = self.position;
        let mut title = vec![Span::styled(
            format!(" {}/{} · {} {} · {} ", index + 1, total, question.year, question.kind, question.title),
            Style::default().fg(colors.header_fg()),
        )];
        if self.practiced {
            title.push(Span::styled("✓ practiced ", Style::default().fg(colors.success())));
        }

        let mut lines = vec![Line::from(Span::styled(
            question.prompt.as_str(),
            Style::default().fg(colors.fg()),
        ))];
        if let Some(requirements) = &question.requirements {
            lines.push(Line::from(""));
            lines.push(Line::from(Span::styled(
                requirements.as_str(),
                Style::default().fg(colors.muted()),
            )));
        }
        if self.show_reference && !question.reference.is_empty() {
            lines.push(Line::from(""));
            lines.push(Line::from(Span::styled(
                "Reference",
                Style::default().fg(colors.accent()).add_modifier(Modifier::BOLD),
            )));
            lines.extend(
                question
                    .reference
                    .lines()
                    .map(|l| Line::from(Span::styled(l, Style::default().fg(colors.fg())))),
            );
        }

        Paragraph::new(lines)
            .block(
                Block::bordered()
                    .title(Line::from(title))
                    .border_style(Style::default().fg(colors.border()))
                    .style(Style::default().bg(colors.bg())),
            )
            .wrap(Wrap { trim: false })
            .render(halves[0], buf);

        let border = if self.editing {
            colors.border_focused()
        } else {
            colors.border()
        };
        let mut draft_lines: Vec<Line> = self
            .draft
            .split('\n')
            .map(|l| Line::from(Span::styled(l, Style::default().fg(colors.fg()))))
            .collect();
        if self.editing {
            draft_lines.push(Line::from(Span::styled("▏", Style::default().fg(colors.accent()))));
        }
        Paragraph::new(draft_lines)
            .block(
                Block::bordered()
                    .title(format!(" Draft · {} chars ", word_count(self.draft)))
                    .border_style(Style::default().fg(border))
                    .style(Style::default().bg(colors.bg())),
            )
            .wrap(Wrap { trim: false })
            .render(halves[1], buf);
    }
}
