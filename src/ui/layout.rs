use ratatui::layout::{Constraint, Direction, Layout, Rect};

/// Width at which the filter panel sits beside the question instead of above it.
const SIDE_PANEL_MIN_WIDTH: u16 = 90;

pub struct AppLayout {
    pub header: Rect,
    pub panel: Rect,
    pub main: Rect,
    pub footer: Rect,
}

impl AppLayout {
    /// Header and footer bars around a filter panel and a main card.
    pub fn new(area: Rect, footer_lines: u16) -> Self {
        let vertical = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(1),
                Constraint::Min(8),
                Constraint::Length(footer_lines.max(1)),
            ])
            .split(area);

        let (panel, main) = if area.width >= SIDE_PANEL_MIN_WIDTH {
            let horizontal = Layout::default()
                .direction(Direction::Horizontal)
                .constraints([Constraint::Length(32), Constraint::Min(40)])
                .split(vertical[1]);
            (horizontal[0], horizontal[1])
        } else {
            let stacked = Layout::default()
                .direction(Direction::Vertical)
                .constraints([Constraint::Length(7), Constraint::Min(5)])
                .split(vertical[1]);
            (stacked[0], stacked[1])
        };

        Self {
            header: vertical[0],
            panel,
            main,
            footer: vertical[2],
        }
    }
}

/// Greedily packs key hints into as few lines of `width` as possible.
pub fn pack_hint_lines(hints: &[&str], width: usize) -> Vec<String> {
    if width == 0 || hints.is_empty() {
        return Vec::new();
    }

    let prefix = " ";
    let separator = "  ";
    let mut out: Vec<String> = Vec::new();
    let mut current = prefix.to_string();
    let mut has_hint = false;

    for hint in hints.iter().filter(|h| !h.is_empty()) {
        let candidate = if has_hint {
            format!("{current}{separator}{hint}")
        } else {
            format!("{current}{hint}")
        };
        if candidate.chars().count() <= width || !has_hint {
            current = candidate;
            has_hint = true;
        } else {
            out.push(current);
            current = format!("{prefix}{hint}");
        }
    }

    if has_hint {
        out.push(current);
    }
    out
}

pub fn centered_rect(percent_x: u16, percent_y: u16, area: Rect) -> Rect {
    const MIN_POPUP_WIDTH: u16 = 40;
    const MIN_POPUP_HEIGHT: u16 = 10;

    let requested_w = area.width.saturating_mul(percent_x.min(100)) / 100;
    let requested_h = area.height.saturating_mul(percent_y.min(100)) / 100;

    let target_w = requested_w.max(MIN_POPUP_WIDTH).min(area.width);
    let target_h = requested_h.max(MIN_POPUP_HEIGHT).min(area.height);

    let left = area
        .x
        .saturating_add((area.width.saturating_sub(target_w)) / 2);
    let top = area
        .y
        .saturating_add((area.height.saturating_sub(target_h)) / 2);

    Rect::new(left, top, target_w, target_h)
}
