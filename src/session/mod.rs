mod filesystem;
mod storage;

pub use filesystem::{FilesystemSessionStore, SESSION_EXPIRY_MINUTES};
pub use storage::SessionStore;

use crate::models::{Message, Session};
use chrono::Local;
use uuid::Uuid;

/// User turns kept in the history sent to the model.
pub const MAX_USER_TURNS: usize = 5;

/// Keep system messages plus the last `max_turns` user turns.
///
/// A turn starts at a user message and runs to the next one, so an assistant
/// message with tool calls always stays together with its tool results.
pub fn trim_conversation_history(messages: &mut Vec<Message>, max_turns: usize) {
    let (system, conversation): (Vec<Message>, Vec<Message>) =
        messages.drain(..).partition(|m| m.role == "system");

    let user_positions: Vec<usize> = conversation
        .iter()
        .enumerate()
        .filter(|(_, m)| m.role == "user")
        .map(|(i, _)| i)
        .collect();

    let start = if max_turns == 0 {
        conversation.len()
    } else if user_positions.len() > max_turns {
        user_positions[user_positions.len() - max_turns]
    } else {
        // Drop orphaned tool output that precedes the first user turn.
        user_positions.first().copied().unwrap_or(conversation.len())
    };

    messages.extend(system);
    messages.extend(conversation.into_iter().skip(start));
}

/// Create a new session
pub fn create_new_session(agent: Option<&str>) -> Session {
    Session {
        session_id: Uuid::new_v4().to_string(),
        last_updated: Local::now(),
        agent: agent.map(str::to_string),
        messages: vec![],
    }
}
