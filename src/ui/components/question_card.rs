use std::collections::BTreeSet;

use ratatui::buffer::Buffer;
use ratatui::layout::Rect;
use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Paragraph, Widget, Wrap};

use crate::ui::theme::Theme;
use examdrill::bank::question::Question;
use examdrill::engine::grading::Verdict;
use examdrill::session::practice::AnswerOutcome;

pub struct QuestionCard<'a> {
    pub question: Option<&'a Question>,
    /// 0-based position in the pool and the pool size.
    pub position: (usize, usize),
    pub selected: &'a BTreeSet<usize>,
    pub outcome: Option<&'a AnswerOutcome>,
    pub is_favorite: bool,
    pub is_missed: bool,
    pub focused: bool,
    pub theme: &'a Theme,
}

impl Widget for &QuestionCard<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let colors = &self.theme.colors;
        let border = if self.focused {
            colors.border_focused()
        } else {
            colors.border()
        };
        let (index, total) = self.position;

        let Some(question) = self.question else {
            Paragraph::new(Line::from(Span::styled(
                "No questions match the current filters.",
                Style::default().fg(colors.muted()),
            )))
            .block(
                Block::bordered()
                    .border_style(Style::default().fg(border))
                    .style(Style::default().bg(colors.bg())),
            )
            .render(area, buf);
            return;
        };

        let mut title = vec![Span::styled(
            format!(" {}/{} · {} · {} ", index + 1, total, question.label(), question.answer.kind().label()),
            Style::default().fg(colors.header_fg()),
        )];
        if self.is_favorite {
            title.push(Span::styled("★ ", Style::default().fg(colors.favorite())));
        }
        if self.is_missed {
            title.push(Span::styled("✗ ", Style::default().fg(colors.missed())));
        }
        let block = Block::bordered()
            .title(Line::from(title))
            .border_style(Style::default().fg(border))
            .style(Style::default().bg(colors.bg()));

        let mut lines: Vec<Line> = vec![
            Line::from(Span::styled(
                question.question.as_str(),
                Style::default().fg(colors.fg()).add_modifier(Modifier::BOLD),
            )),
            Line::from(""),
        ];

        for (i, option) in question.options.iter().enumerate() {
            let picked = self.selected.contains(&i);
            let marker = if picked { "●" } else { "○" };
            let style = if picked {
                Style::default().fg(colors.accent()).bg(colors.selected_bg())
            } else {
                Style::default().fg(colors.fg())
            };
            lines.push(Line::from(Span::styled(
                format!(" {} {marker} {option}", i + 1),
                style,
            )));
        }

        if let Some(outcome) = self.outcome {
            lines.push(Line::from(""));
            let (text, color) = match outcome.verdict {
                Verdict::Correct => ("Correct", colors.success()),
                Verdict::Incorrect => ("Incorrect", colors.error()),
            };
            lines.push(Line::from(vec![
                Span::styled(text, Style::default().fg(color).add_modifier(Modifier::BOLD)),
                Span::styled(
                    format!("  answer: {}", outcome.answer),
                    Style::default().fg(colors.fg()),
                ),
            ]));
            if !outcome.explanation.is_empty() {
                lines.push(Line::from(Span::styled(
                    outcome.explanation.as_str(),
                    Style::default().fg(colors.muted()),
                )));
            }
        }

        Paragraph::new(lines)
            .block(block)
            .wrap(Wrap { trim: false })
            .render(area, buf);
    }
}
