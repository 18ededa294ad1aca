//! Append-only conversation log for a single query.

use crate::model::{Message, Role};
use crate::{Error, Result};

/// The ordered message log sent with every completion call.
///
/// Always starts with one system message followed by one user message.
/// [`append`](Self::append) is the only mutator and nothing is ever removed.
#[derive(Debug, Clone)]
pub struct Conversation {
    messages: Vec<Message>,
}

impl Conversation {
    pub fn new(system: impl Into<String>, user: impl Into<String>) -> Self {
        Self {
            messages: vec![Message::system(system), Message::user(user)],
        }
    }

    /// Append an assistant turn or a tool result.
    ///
    /// Tool results must answer a still-unanswered call of the latest
    /// assistant turn, and nothing else may interleave while calls are
    /// pending.
    pub fn append(&mut self, message: Message) -> Result<()> {
        match message.role {
            Role::System | Role::User => {
                return Err(Error::InvalidState(format!(
                    "cannot append a {:?} message after the conversation has started",
                    message.role
                )));
            }
            Role::Assistant => {
                if let Some(id) = self.unanswered().first() {
                    return Err(Error::InvalidState(format!(
                        "tool call {id} has not been answered"
                    )));
                }
            }
            Role::Tool => {
                let id = message.tool_call_id.as_deref().ok_or_else(|| {
                    Error::InvalidState("tool message without tool_call_id".into())
                })?;
                if !self.unanswered().contains(&id) {
                    return Err(Error::InvalidState(format!(
                        "tool message answers unknown or already answered call {id}"
                    )));
                }
            }
        }

        self.messages.push(message);
        Ok(())
    }

    /// Ids of the latest assistant turn's tool calls that have no result yet,
    /// in request order.
    pub fn unanswered(&self) -> Vec<&str> {
        let Some(turn) = self
            .messages
            .iter()
            .rposition(|m| m.role == Role::Assistant)
        else {
            return Vec::new();
        };

        let answered: Vec<&str> = self.messages[turn + 1..]
            .iter()
            .filter_map(|m| m.tool_call_id.as_deref())
            .collect();

        self.messages[turn]
            .tool_calls
            .iter()
            .map(|call| call.id.as_str())
            .filter(|id| !answered.contains(id))
            .collect()
    }

    /// The log in insertion order.
    pub fn messages(&self) -> &[Message] {
        &self.messages
    }

    pub fn len(&self) -> usize {
        self.messages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }
}
