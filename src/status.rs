//! Status line and boot log

use chrono::{Local, NaiveTime};
use std::collections::VecDeque;
use std::fmt;

pub const IDLE_MESSAGE: &str = "System ready.";

/// Wall-clock source for status timestamps
pub trait TimeSource {
    fn wall_time(&self) -> NaiveTime;
}

/// Local time of day
pub struct LocalTime;

impl TimeSource for LocalTime {
    fn wall_time(&self) -> NaiveTime {
        Local::now().time()
    }
}

/// Always reports the same time of day
pub struct FixedTime(pub NaiveTime);

impl TimeSource for FixedTime {
    fn wall_time(&self) -> NaiveTime {
        self.0
    }
}

/// One status message, optionally stamped with the time it was shown
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatusLine {
    pub message: String,
    pub stamp: Option<NaiveTime>,
}

impl fmt::Display for StatusLine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.stamp {
            Some(stamp) => write!(f, "[{}] {}", stamp.format("%H:%M:%S"), self.message),
            None => f.write_str(&self.message),
        }
    }
}

/// Current status plus a bounded history of past lines
pub struct StatusBoard {
    current: StatusLine,
    history: VecDeque<StatusLine>,
    capacity: usize,
    timestamps: bool,
    clock: Box<dyn TimeSource>,
}

impl StatusBoard {
    pub fn new(capacity: usize, timestamps: bool, clock: Box<dyn TimeSource>) -> Self {
        let mut board = Self {
            current: StatusLine {
                message: String::new(),
                stamp: None,
            },
            history: VecDeque::new(),
            capacity: capacity.max(1),
            timestamps,
            clock,
        };
        board.set(IDLE_MESSAGE);
        board
    }

    pub fn set(&mut self, message: impl Into<String>) {
        let line = StatusLine {
            message: message.into(),
            stamp: self.timestamps.then(|| self.clock.wall_time()),
        };
        tracing::info!(status = %line.message, "status");

        if self.history.len() == self.capacity {
            self.history.pop_front();
        }
        self.history.push_back(line.clone());
        self.current = line;
    }

    pub fn current(&self) -> &StatusLine {
        &self.current
    }

    /// Oldest first
    pub fn history(&self) -> impl DoubleEndedIterator<Item = &StatusLine> + ExactSizeIterator {
        self.history.iter()
    }

    pub fn is_idle(&self) -> bool {
        self.current.message == IDLE_MESSAGE
    }
}
