use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use chrono::{DateTime, Local};

pub const MAX_NOTIFICATIONS: usize = 50;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum NotificationKind {
    Info,
    Success,
    Warning,
    Error,
}

impl NotificationKind {
    pub fn icon(&self) -> &'static str {
        match self {
            NotificationKind::Info => "i",
            NotificationKind::Success => "\u{2713}",
            NotificationKind::Warning => "!",
            NotificationKind::Error => "\u{2717}",
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct Notification {
    pub id: String,
    pub kind: NotificationKind,
    pub title: String,
    pub message: String,
    pub timestamp: DateTime<Local>,
    pub read: bool,
}

/// In-memory notification list, newest first, capped at
/// [`MAX_NOTIFICATIONS`]. Clones share the same list so collector threads
/// can post into the dashboard's store.
#[derive(Clone, Debug, Default)]
pub struct NotificationStore {
    items: Arc<Mutex<Vec<Notification>>>,
    counter: Arc<AtomicU64>,
}

impl NotificationStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, Vec<Notification>> {
        self.items.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Insert an unread notification at the head; returns its id.
    pub fn add_notification(&self, kind: NotificationKind, title: &str, message: &str) -> String {
        let n = self.counter.fetch_add(1, Ordering::Relaxed) + 1;
        let timestamp = Local::now();
        let id = format!("notif-{}-{}", n, timestamp.timestamp_millis());

        let mut items = self.lock();
        items.insert(
            0,
            Notification {
                id: id.clone(),
                kind,
                title: title.to_string(),
                message: message.to_string(),
                timestamp,
                read: false,
            },
        );
        items.truncate(MAX_NOTIFICATIONS);
        id
    }

    pub fn notifications(&self) -> Vec<Notification> {
        self.lock().clone()
    }

    pub fn unread_count(&self) -> usize {
        self.lock().iter().filter(|n| !n.read).count()
    }

    pub fn mark_as_read(&self, id: &str) {
        if let Some(n) = self.lock().iter_mut().find(|n| n.id == id) {
            n.read = true;
        }
    }

    pub fn mark_all_as_read(&self) {
        for n in self.lock().iter_mut() {
            n.read = true;
        }
    }

    pub fn remove_notification(&self, id: &str) {
        self.lock().retain(|n| n.id != id);
    }

    pub fn clear_all(&self) {
        self.lock().clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn newest_first_and_capped() {
        let store = NotificationStore::new();
        for i in 0..60 {
            store.add_notification(NotificationKind::Info, &format!("n{}", i), "");
        }
        let items = store.notifications();
        assert_eq!(items.len(), MAX_NOTIFICATIONS);
        assert_eq!(items[0].title, "n59");
        // n0..n9 were dropped
        assert_eq!(items.last().unwrap().title, "n10");
    }

    #[test]
    fn ids_are_unique_and_prefixed() {
        let store = NotificationStore::new();
        let a = store.add_notification(NotificationKind::Success, "a", "");
        let b = store.add_notification(NotificationKind::Success, "b", "");
        assert_ne!(a, b);
        assert!(a.starts_with("notif-1-"));
        assert!(b.starts_with("notif-2-"));
    }

    #[test]
    fn mark_all_as_read_is_idempotent() {
        let store = NotificationStore::new();
        store.add_notification(NotificationKind::Warning, "a", "x");
        store.add_notification(NotificationKind::Error, "b", "y");
        assert_eq!(store.unread_count(), 2);

        store.mark_all_as_read();
        let once = store.notifications();
        store.mark_all_as_read();
        assert_eq!(store.notifications(), once);
        assert_eq!(store.unread_count(), 0);
    }

    #[test]
    fn mark_one_then_remove() {
        let store = NotificationStore::new();
        let a = store.add_notification(NotificationKind::Info, "a", "");
        store.add_notification(NotificationKind::Info, "b", "");

        store.mark_as_read(&a);
        assert_eq!(store.unread_count(), 1);
        store.mark_as_read("missing");
        assert_eq!(store.unread_count(), 1);

        store.remove_notification(&a);
        assert_eq!(store.notifications().len(), 1);
        store.clear_all();
        assert!(store.notifications().is_empty());
    }

    #[test]
    fn clones_share_the_list() {
        let store = NotificationStore::new();
        let poster = store.clone();
        poster.add_notification(NotificationKind::Success, "done", "");
        assert_eq!(store.unread_count(), 1);
    }
}
