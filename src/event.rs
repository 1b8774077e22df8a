use std::time::Duration;

use anyhow::Result;
use crossterm::event::{self, Event, KeyEvent, KeyEventKind};

pub enum AppEvent {
    Key(KeyEvent),
    Resize,
    /// Nothing arrived within the poll window.
    Idle,
}

/// Wait up to `timeout` for the next terminal event. Key releases and
/// repeats are folded into `Idle`.
pub fn next_event(timeout: Duration) -> Result<AppEvent> {
    if !event::poll(timeout)? {
        return Ok(AppEvent::Idle);
    }
    Ok(match event::read()? {
        Event::Key(key) if key.kind == KeyEventKind::Press => AppEvent::Key(key),
        Event::Resize(_, _) => AppEvent::Resize,
        _ => AppEvent::Idle,
    })
}
