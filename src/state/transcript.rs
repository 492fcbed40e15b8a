//! Ordered, append-only transcript with one mutable in-progress slot.

use crate::models::{Message, MessageId, MessageRole};
use crate::traits::IdGenerator;

/// Insertion-ordered messages of one session.
///
/// At most one assistant message is in progress at any time; only that
/// message accepts deltas.
pub struct TranscriptStore {
    messages: Vec<Message>,
    /// Fold target of the active stream, if any
    in_progress: Option<MessageId>,
    ids: Box<dyn IdGenerator>,
    /// Bumped on every mutation so observers can detect changes cheaply
    revision: u64,
}

impl std::fmt::Debug for TranscriptStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TranscriptStore")
            .field("messages", &self.messages)
            .field("in_progress", &self.in_progress)
            .field("revision", &self.revision)
            .finish()
    }
}

impl TranscriptStore {
    /// Create an empty store that draws message ids from `ids`
    pub fn new(ids: impl IdGenerator + 'static) -> Self {
        Self {
            messages: Vec::new(),
            in_progress: None,
            ids: Box::new(ids),
            revision: 0,
        }
    }

    fn push(&mut self, role: MessageRole, content: &str) -> MessageId {
        let id = self.ids.next_id();
        self.messages.push(Message::new(id.clone(), role, content));
        self.revision += 1;
        id
    }

    /// Append an optimistic user message
    pub fn append_user(&mut self, text: &str) -> MessageId {
        self.push(MessageRole::User, text)
    }

    /// Append a system notice
    pub fn append_system(&mut self, text: &str) -> MessageId {
        self.push(MessageRole::System, text)
    }

    /// Append an empty assistant message and make it the in-progress slot.
    ///
    /// Any previous in-progress slot stops accepting deltas.
    pub fn append_empty_assistant_placeholder(&mut self) -> MessageId {
        let id = self.push(MessageRole::Assistant, "");
        self.in_progress = Some(id.clone());
        id
    }

    /// Concatenate `text` onto the named message.
    ///
    /// No-op (returns false) unless `id` is the current in-progress message.
    /// Never reorders or touches other entries.
    pub fn append_delta(&mut self, id: &str, text: &str) -> bool {
        if self.in_progress.as_deref() != Some(id) {
            return false;
        }
        match self.messages.iter_mut().rev().find(|m| m.id == id) {
            Some(message) => {
                message.append_token(text);
                self.revision += 1;
                true
            }
            None => false,
        }
    }

    /// Stop accepting deltas for `id`, if it is the in-progress message.
    ///
    /// The message keeps whatever content it accumulated.
    pub fn finish_in_progress(&mut self, id: &str) -> bool {
        if self.in_progress.as_deref() == Some(id) {
            self.in_progress = None;
            true
        } else {
            false
        }
    }

    /// Replace the whole transcript (e.g. when switching sessions)
    pub fn replace_all(&mut self, messages: Vec<Message>) {
        self.messages = messages;
        self.in_progress = None;
        self.revision += 1;
    }

    /// Remove every message
    pub fn clear(&mut self) {
        self.replace_all(Vec::new());
    }

    /// Id of the message currently receiving deltas
    pub fn in_progress(&self) -> Option<&str> {
        self.in_progress.as_deref()
    }

    pub fn messages(&self) -> &[Message] {
        &self.messages
    }

    /// Owned copy of the transcript for rendering
    pub fn snapshot(&self) -> Vec<Message> {
        self.messages.clone()
    }

    pub fn get(&self, id: &str) -> Option<&Message> {
        self.messages.iter().find(|m| m.id == id)
    }

    pub fn len(&self) -> usize {
        self.messages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }

    pub fn revision(&self) -> u64 {
        self.revision
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::mock::SequentialIds;

    fn store() -> TranscriptStore {
        TranscriptStore::new(SequentialIds::new("msg"))
    }

    #[test]
    fn test_append_preserves_order_and_roles() {
        let mut store = store();
        let u = store.append_user("hello");
        let a = store.append_empty_assistant_placeholder();
        let s = store.append_system("note");

        let roles: Vec<MessageRole> = store.messages().iter().map(|m| m.role).collect();
        assert_eq!(
            roles,
            vec![MessageRole::User, MessageRole::Assistant, MessageRole::System]
        );
        assert_eq!(u, "msg-1");
        assert_eq!(a, "msg-2");
        assert_eq!(s, "msg-3");
    }

    #[test]
    fn test_append_delta_to_in_progress() {
        let mut store = store();
        store.append_user("q");
        let a = store.append_empty_assistant_placeholder();

        assert!(store.append_delta(&a, "The"));
        assert!(store.append_delta(&a, " crankshaft"));
        assert_eq!(store.get(&a).unwrap().content, "The crankshaft");
        assert_eq!(store.messages()[0].content, "q");
    }

    #[test]
    fn test_append_delta_to_other_entry_is_noop() {
        let mut store = store();
        let u = store.append_user("q");
        store.append_empty_assistant_placeholder();

        assert!(!store.append_delta(&u, "x"));
        assert!(!store.append_delta("missing", "x"));
        assert_eq!(store.get(&u).unwrap().content, "q");
    }

    #[test]
    fn test_new_placeholder_supersedes_previous_slot() {
        let mut store = store();
        let first = store.append_empty_assistant_placeholder();
        store.append_delta(&first, "partial");
        let second = store.append_empty_assistant_placeholder();

        assert!(!store.append_delta(&first, " stale"));
        assert!(store.append_delta(&second, "fresh"));
        assert_eq!(store.get(&first).unwrap().content, "partial");
        assert_eq!(store.in_progress(), Some(second.as_str()));
    }

    #[test]
    fn test_finish_in_progress_keeps_content() {
        let mut store = store();
        let a = store.append_empty_assistant_placeholder();
        store.append_delta(&a, "done text");

        assert!(store.finish_in_progress(&a));
        assert!(!store.finish_in_progress(&a));
        assert_eq!(store.in_progress(), None);
        assert!(!store.append_delta(&a, "more"));
        assert_eq!(store.get(&a).unwrap().content, "done text");
    }

    #[test]
    fn test_replace_all_drops_in_progress() {
        let mut store = store();
        let a = store.append_empty_assistant_placeholder();
        store.replace_all(vec![Message::new("srv-9", MessageRole::User, "restored")]);

        assert_eq!(store.len(), 1);
        assert_eq!(store.in_progress(), None);
        assert!(!store.append_delta(&a, "late"));
        assert_eq!(store.snapshot()[0].id, "srv-9");
    }

    #[test]
    fn test_clear() {
        let mut store = store();
        store.append_user("a");
        store.append_empty_assistant_placeholder();
        store.clear();
        assert!(store.is_empty());
        assert_eq!(store.in_progress(), None);
    }

    #[test]
    fn test_revision_bumps_on_mutation_only() {
        let mut store = store();
        let r0 = store.revision();
        let a = store.append_empty_assistant_placeholder();
        let r1 = store.revision();
        assert!(r1 > r0);

        store.append_delta("other", "x");
        assert_eq!(store.revision(), r1);

        store.append_delta(&a, "x");
        assert!(store.revision() > r1);
    }
}
