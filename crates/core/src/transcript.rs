//! The chat transcript of a session.

use little_ollama_model::Message;

/// An ordered, append-only log of the messages exchanged in a session.
///
/// Messages can't be removed or edited once appended.
#[derive(Clone, Default, Debug, PartialEq, Eq)]
pub struct Transcript {
    messages: Vec<Message>,
}

impl Transcript {
    /// Creates an empty transcript.
    #[inline]
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a message at the end.
    #[inline]
    pub fn append(&mut self, message: Message) {
        self.messages.push(message);
    }

    /// Returns all messages in the order they were appended.
    #[inline]
    pub fn all(&self) -> &[Message] {
        &self.messages
    }

    /// Returns the most recent message.
    #[inline]
    pub fn last(&self) -> Option<&Message> {
        self.messages.last()
    }

    /// Returns the number of messages.
    #[inline]
    pub fn len(&self) -> usize {
        self.messages.len()
    }

    /// Returns `true` if nothing has been appended yet.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use little_ollama_model::Role;

    use super::*;

    #[test]
    fn test_append_keeps_order() {
        let mut transcript = Transcript::new();
        assert!(transcript.is_empty());
        assert_eq!(transcript.last(), None);

        transcript.append(Message::user("Hi"));
        transcript.append(Message::assistant("Hello!"));
        transcript.append(Message::user("Tell me a joke"));

        assert_eq!(transcript.len(), 3);
        let roles: Vec<_> = transcript.all().iter().map(Message::role).collect();
        assert_eq!(roles, [Role::User, Role::Assistant, Role::User]);
        assert_eq!(transcript.last().unwrap().content(), "Tell me a joke");
    }
}
