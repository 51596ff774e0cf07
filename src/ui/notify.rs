use bevy::prelude::*;
use std::time::{Duration, Instant};

const NOTICE_TTL: Duration = Duration::from_secs(5);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoticeKind {
    Success,
    Error,
    Info,
}

pub struct Notice {
    pub text: String,
    pub kind: NoticeKind,
    at: Instant,
}

/// Transient notifications, rendered in a bottom panel and dismissed by
/// click or timeout. Request failures land here so prior data can stay
/// on screen.
#[derive(Resource, Default)]
pub struct Notices {
    items: Vec<Notice>,
}

impl Notices {
    pub fn success(&mut self, text: impl Into<String>) {
        self.push(text, NoticeKind::Success);
    }

    pub fn error(&mut self, text: impl Into<String>) {
        self.push(text, NoticeKind::Error);
    }

    pub fn info(&mut self, text: impl Into<String>) {
        self.push(text, NoticeKind::Info);
    }

    fn push(&mut self, text: impl Into<String>, kind: NoticeKind) {
        self.items.push(Notice {
            text: text.into(),
            kind,
            at: Instant::now(),
        });
    }

    pub fn items(&self) -> &[Notice] {
        &self.items
    }

    pub fn dismiss(&mut self, index: usize) {
        if index < self.items.len() {
            self.items.remove(index);
        }
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    fn expire(&mut self) {
        self.items.retain(|n| n.at.elapsed() < NOTICE_TTL);
    }
}

/// Drops notices past their timeout; runs every frame.
pub fn expire_notices(mut notices: ResMut<Notices>) {
    notices.expire();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn dismiss_removes_only_the_selected_notice() {
        let mut notices = Notices::default();
        notices.error("first");
        notices.info("second");
        notices.dismiss(0);
        assert_eq!(notices.items().len(), 1);
        assert_eq!(notices.items()[0].text, "second");
        notices.dismiss(5);
        assert_eq!(notices.items().len(), 1);
    }
}
