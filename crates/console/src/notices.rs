//! Transient notifications shown after an operation.

use std::collections::VecDeque;

/// Older notices are dropped past this many.
const MAX_NOTICES: usize = 5;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoticeLevel {
    Success,
    Error,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notice {
    pub level: NoticeLevel,
    pub message: String,
}

#[derive(Debug, Clone, Default)]
pub struct Notices {
    items: VecDeque<Notice>,
}

impl Notices {
    pub fn success(&mut self, message: impl Into<String>) {
        self.push(NoticeLevel::Success, message.into());
    }

    pub fn error(&mut self, message: impl Into<String>) {
        self.push(NoticeLevel::Error, message.into());
    }

    fn push(&mut self, level: NoticeLevel, message: String) {
        if self.items.len() == MAX_NOTICES {
            self.items.pop_front();
        }
        self.items.push_back(Notice { level, message });
    }

    pub fn latest(&self) -> Option<&Notice> {
        self.items.back()
    }

    /// Remove and return every pending notice, oldest first.
    pub fn drain(&mut self) -> Vec<Notice> {
        self.items.drain(..).collect()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn keeps_the_most_recent() {
        let mut notices = Notices::default();
        for i in 0..7 {
            notices.success(format!("n{i}"));
        }
        let all = notices.drain();
        assert_eq!(all.len(), MAX_NOTICES);
        assert_eq!(all[0].message, "n2");
        assert!(notices.is_empty());
    }
}
