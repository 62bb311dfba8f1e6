use std::collections::HashSet;

use crate::models::{ChatMessage, MessageId};

/// Ordered, id-deduplicated message list of one conversation.
///
/// Insertion order is arrival order; a message whose id is already present
/// is dropped.
#[derive(Debug, Default, Clone)]
pub struct MessageLog {
    messages: Vec<ChatMessage>,
    ids: HashSet<MessageId>,
    seeded: bool,
}

impl MessageLog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append unless the id is already known. Returns whether it was added.
    pub fn append(&mut self, message: ChatMessage) -> bool {
        if self.ids.contains(&message.id) {
            return false;
        }
        self.ids.insert(message.id.clone());
        self.messages.push(message);
        true
    }

    /// Seed with a history page.
    ///
    /// The page is ordered by `created_at` (stable, so equal timestamps keep
    /// server order). On the first seed it goes in front of any live messages
    /// that arrived earlier. Later seeds only append ids not yet present;
    /// entries already in the log never move.
    pub fn seed_history(&mut self, mut history: Vec<ChatMessage>) -> usize {
        history.sort_by_key(|m| m.created_at);

        if self.seeded {
            for message in history {
                self.append(message);
            }
            return self.messages.len();
        }
        self.seeded = true;

        let live = std::mem::take(&mut self.messages);
        self.ids.clear();

        for message in history.into_iter().chain(live) {
            self.append(message);
        }
        self.messages.len()
    }

    pub fn len(&self) -> usize {
        self.messages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }

    pub fn messages(&self) -> &[ChatMessage] {
        &self.messages
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::SenderType;
    use chrono::{TimeZone, Utc};

    fn msg(id: i64, second: u32, body: &str) -> ChatMessage {
        ChatMessage {
            id: MessageId::from(id),
            sender_type: SenderType::Freelancer,
            body: body.to_string(),
            created_at: Utc.with_ymd_and_hms(2024, 5, 1, 9, 0, second).unwrap(),
        }
    }

    #[test]
    fn test_duplicate_append_is_noop() {
        let mut log = MessageLog::new();
        assert!(log.append(msg(7, 0, "hi")));
        let before: Vec<_> = log.messages().to_vec();

        assert!(!log.append(msg(7, 0, "hi")));
        assert_eq!(log.messages(), before.as_slice());
        assert_eq!(log.len(), 1);
    }

    #[test]
    fn test_seed_history_keeps_earlier_live_messages() {
        let mut log = MessageLog::new();
        log.append(msg(10, 30, "live"));
        log.append(msg(3, 3, "also in history"));

        let count = log.seed_history(vec![msg(2, 2, "b"), msg(1, 1, "a"), msg(3, 3, "c")]);

        let ids: Vec<_> = log.messages().iter().map(|m| m.id.as_str()).collect();
        assert_eq!(ids, vec!["1", "2", "3", "10"]);
        assert_eq!(count, 4);
        // history copy wins for ids present in both
        assert_eq!(log.messages()[2].body, "c");
    }

    #[test]
    fn test_reseed_keeps_existing_order() {
        let mut log = MessageLog::new();
        log.seed_history(vec![msg(1, 1, "a"), msg(2, 2, "b"), msg(3, 3, "c")]);
        log.append(msg(4, 4, "live"));

        let count = log.seed_history(vec![msg(2, 2, "b"), msg(3, 3, "c"), msg(4, 4, "live")]);

        let ids: Vec<_> = log.messages().iter().map(|m| m.id.as_str()).collect();
        assert_eq!(ids, vec!["1", "2", "3", "4"]);
        assert_eq!(count, 4);
    }

    #[test]
    fn test_reseed_appends_unseen_messages() {
        let mut log = MessageLog::new();
        log.seed_history(vec![msg(1, 1, "a")]);
        log.append(msg(3, 3, "live"));

        log.seed_history(vec![msg(1, 1, "a"), msg(2, 2, "missed")]);

        let ids: Vec<_> = log.messages().iter().map(|m| m.id.as_str()).collect();
        assert_eq!(ids, vec!["1", "3", "2"]);
    }

    #[test]
    fn test_seed_history_is_stable_for_equal_timestamps() {
        let mut log = MessageLog::new();
        log.seed_history(vec![msg(5, 0, "first"), msg(4, 0, "second")]);
        let ids: Vec<_> = log.messages().iter().map(|m| m.id.as_str()).collect();
        assert_eq!(ids, vec!["5", "4"]);
    }
}
