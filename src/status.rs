//! Operator-facing status area and event log.

use std::collections::VecDeque;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Status {
    Idle,
    Success(String),
    Error(String),
}

/// Last success/error state plus a running log of events, most recent first.
///
/// Every message is mirrored to `tracing`.
#[derive(Debug, Clone)]
pub struct StatusBoard {
    status: Status,
    events: VecDeque<String>,
}

impl Default for StatusBoard {
    fn default() -> Self {
        Self {
            status: Status::Idle,
            events: VecDeque::new(),
        }
    }
}

impl StatusBoard {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn success(&mut self, message: impl Into<String>) {
        let message = message.into();
        tracing::info!("{}", message);
        self.status = Status::Success(message);
    }

    pub fn error(&mut self, message: impl Into<String>) {
        let message = message.into();
        tracing::warn!("{}", message);
        self.status = Status::Error(message);
    }

    pub fn event(&mut self, message: impl Into<String>) {
        let message = message.into();
        tracing::info!("{}", message);
        self.events.push_front(message);
    }

    pub fn clear_events(&mut self) {
        self.events.clear();
    }

    pub fn status(&self) -> &Status {
        &self.status
    }

    pub fn is_error(&self) -> bool {
        matches!(self.status, Status::Error(_))
    }

    /// Events, most recent first.
    pub fn events(&self) -> impl Iterator<Item = &str> {
        self.events.iter().map(String::as_str)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn keeps_only_last_status() {
        let mut board = StatusBoard::new();
        board.error("List Nodes error: host instance not running");
        board.success("Map built");
        assert_eq!(board.status(), &Status::Success("Map built".to_string()));
        assert!(!board.is_error());
    }

    #[test]
    fn events_are_most_recent_first() {
        let mut board = StatusBoard::new();
        board.event("first");
        board.event("second");
        assert_eq!(board.events().collect::<Vec<_>>(), vec!["second", "first"]);

        board.clear_events();
        assert_eq!(board.events().count(), 0);
    }
}
