use serde::{Deserialize, Serialize};

use super::{LocalStore, SESSIONS_KEY};
use crate::types::asset::now_millis;
use crate::types::{ChatTurn, Citation, Role};
use crate::Result;

const DEFAULT_SESSION_ID: &str = "default";
const DEFAULT_TITLE: &str = "New Conversation";
const TITLE_MAX_CHARS: usize = 25;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub id: String,
    pub role: Role,
    pub content: String,
    pub timestamp: u64,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub grounding: Vec<Citation>,
}

impl ChatMessage {
    pub fn new(role: Role, content: impl Into<String>) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            role,
            content: content.into(),
            timestamp: now_millis(),
            grounding: Vec::new(),
        }
    }

    pub fn with_grounding(mut self, grounding: Vec<Citation>) -> Self {
        self.grounding = grounding;
        self
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChatSession {
    pub id: String,
    pub title: String,
    pub messages: Vec<ChatMessage>,
    pub updated_at: u64,
}

impl ChatSession {
    fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            title: DEFAULT_TITLE.to_string(),
            messages: Vec::new(),
            updated_at: now_millis(),
        }
    }

    /// Prior turns in order, ready to hand to the chat operation.
    pub fn history(&self) -> Vec<ChatTurn> {
        self.messages
            .iter()
            .map(|m| ChatTurn {
                role: m.role,
                content: m.content.clone(),
            })
            .collect()
    }
}

fn title_from(messages: &[ChatMessage]) -> Option<String> {
    let first = messages.iter().find(|m| m.role == Role::User)?;
    let mut title: String = first.content.chars().take(TITLE_MAX_CHARS).collect();
    if first.content.chars().count() > TITLE_MAX_CHARS {
        title.push_str("...");
    }
    Some(title)
}

/// Persisted list of chat sessions with one active selection. Never empty.
pub struct SessionList {
    store: LocalStore,
    sessions: Vec<ChatSession>,
    active_id: String,
}

impl SessionList {
    pub fn load(store: LocalStore) -> Result<Self> {
        let mut sessions: Vec<ChatSession> = store.get_json(SESSIONS_KEY)?.unwrap_or_default();
        if sessions.is_empty() {
            sessions.push(ChatSession::new(DEFAULT_SESSION_ID));
        }
        let active_id = sessions[0].id.clone();
        Ok(Self {
            store,
            sessions,
            active_id,
        })
    }

    pub fn sessions(&self) -> &[ChatSession] {
        &self.sessions
    }

    pub fn active_id(&self) -> &str {
        &self.active_id
    }

    pub fn active(&self) -> &ChatSession {
        self.sessions
            .iter()
            .find(|s| s.id == self.active_id)
            .unwrap_or(&self.sessions[0])
    }

    /// Returns false when no session has that id.
    pub fn select(&mut self, id: &str) -> bool {
        if self.sessions.iter().any(|s| s.id == id) {
            self.active_id = id.to_string();
            true
        } else {
            false
        }
    }

    /// Prepend a fresh session and make it active.
    pub fn create(&mut self) -> Result<&ChatSession> {
        let session = ChatSession::new(uuid::Uuid::new_v4().to_string());
        self.active_id = session.id.clone();
        self.sessions.insert(0, session);
        self.save()?;
        Ok(&self.sessions[0])
    }

    /// Replace the active session's messages; the title follows the first user message.
    pub fn update_active(&mut self, messages: Vec<ChatMessage>) -> Result<()> {
        let active_id = self.active_id.clone();
        if let Some(session) = self.sessions.iter_mut().find(|s| s.id == active_id) {
            if let Some(title) = title_from(&messages) {
                session.title = title;
            }
            session.messages = messages;
            session.updated_at = now_millis();
        }
        self.save()
    }

    pub fn push_to_active(&mut self, message: ChatMessage) -> Result<()> {
        let mut messages = self.active().messages.clone();
        messages.push(message);
        self.update_active(messages)
    }

    /// Deleting the last session recreates the default one.
    pub fn delete(&mut self, id: &str) -> Result<()> {
        self.sessions.retain(|s| s.id != id);
        if self.sessions.is_empty() {
            self.sessions.push(ChatSession::new(DEFAULT_SESSION_ID));
            self.active_id = DEFAULT_SESSION_ID.to_string();
        } else if self.active_id == id {
            self.active_id = self.sessions[0].id.clone();
        }
        self.save()
    }

    fn save(&self) -> Result<()> {
        self.store.set_json(SESSIONS_KEY, &self.sessions)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::archive::test_support::temp_store;
    use tempfile::TempDir;

    fn list() -> (TempDir, SessionList) {
        let (dir, store) = temp_store();
        (dir, SessionList::load(store).unwrap())
    }

    #[test]
    fn starts_with_default_session() {
        let (_dir, l) = list();
        assert_eq!(l.sessions().len(), 1);
        assert_eq!(l.active_id(), "default");
        assert_eq!(l.active().title, "New Conversation");
    }

    #[test]
    fn title_truncates_first_user_message() {
        let (_dir, mut l) = list();
        l.push_to_active(ChatMessage::new(
            Role::User,
            "Design a poster for a jazz festival in autumn",
        ))
        .unwrap();
        assert_eq!(l.active().title, "Design a poster for a jaz...");

        let (_other, mut l) = list();
        l.push_to_active(ChatMessage::new(Role::User, "short one")).unwrap();
        assert_eq!(l.active().title, "short one");
    }

    #[test]
    fn create_prepends_and_activates() {
        let (_dir, mut l) = list();
        let id = l.create().unwrap().id.clone();
        assert_eq!(l.sessions()[0].id, id);
        assert_eq!(l.active_id(), id);
        assert_eq!(l.sessions().len(), 2);
    }

    #[test]
    fn delete_last_recreates_default() {
        let (_dir, mut l) = list();
        let id = l.create().unwrap().id.clone();
        l.delete(&id).unwrap();
        assert_eq!(l.active_id(), "default");
        l.delete("default").unwrap();
        assert_eq!(l.sessions().len(), 1);
        assert_eq!(l.active_id(), "default");
    }

    #[test]
    fn persists_across_loads() {
        let (_dir, store) = temp_store();
        let mut l = SessionList::load(store.clone()).unwrap();
        l.push_to_active(ChatMessage::new(Role::User, "hello")).unwrap();
        l.push_to_active(ChatMessage::new(Role::Assistant, "hi there")).unwrap();

        let reloaded = SessionList::load(store).unwrap();
        let history = reloaded.active().history();
        assert_eq!(history, vec![ChatTurn::user("hello"), ChatTurn::assistant("hi there")]);
    }
}
