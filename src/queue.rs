//! Outbound send strategies.
//!
//! The strategy is picked once, when the client is built: without flood
//! protection every line is written at once; with it, lines wait in a FIFO
//! and the connection drains one per tick.

use std::collections::VecDeque;
use std::time::Duration;

use crate::config::ClientOptions;

/// How outbound lines reach the socket.
pub trait SendStrategy: Send + std::fmt::Debug {
    /// Accept a line. Returns it back when it should be written now.
    fn submit(&mut self, line: String) -> Option<String>;

    /// Pop the next line due on a tick.
    fn next_due(&mut self) -> Option<String>;

    /// Discard everything queued. Returns how many lines were dropped.
    fn clear(&mut self) -> usize;

    /// Drain interval, if this strategy paces output.
    fn interval(&self) -> Option<Duration>;

    /// Lines currently waiting.
    fn pending(&self) -> usize;
}

/// Writes every line immediately.
#[derive(Clone, Copy, Debug, Default)]
pub struct ImmediateSender;

impl SendStrategy for ImmediateSender {
    fn submit(&mut self, line: String) -> Option<String> {
        Some(line)
    }

    fn next_due(&mut self) -> Option<String> {
        None
    }

    fn clear(&mut self) -> usize {
        0
    }

    fn interval(&self) -> Option<Duration> {
        None
    }

    fn pending(&self) -> usize {
        0
    }
}

/// Queues every line and releases one per interval.
#[derive(Clone, Debug)]
pub struct QueuedSender {
    interval: Duration,
    queue: VecDeque<String>,
}

impl QueuedSender {
    pub fn new(interval: Duration) -> Self {
        QueuedSender {
            interval,
            queue: VecDeque::new(),
        }
    }
}

impl SendStrategy for QueuedSender {
    fn submit(&mut self, line: String) -> Option<String> {
        self.queue.push_back(line);
        None
    }

    fn next_due(&mut self) -> Option<String> {
        self.queue.pop_front()
    }

    fn clear(&mut self) -> usize {
        let dropped = self.queue.len();
        self.queue.clear();
        dropped
    }

    fn interval(&self) -> Option<Duration> {
        Some(self.interval)
    }

    fn pending(&self) -> usize {
        self.queue.len()
    }
}

/// Build the strategy selected by `options`.
pub fn strategy_for(options: &ClientOptions) -> Box<dyn SendStrategy> {
    if options.flood_protection {
        Box::new(QueuedSender::new(options.flood_protection_delay()))
    } else {
        Box::new(ImmediateSender)
    }
}
