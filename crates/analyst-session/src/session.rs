//! Explicit chat session: one conversation, one active turn at a time.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use analyst_core::validation::{validate_messages, validate_text, MAX_CONTENT_CHARS};
use analyst_core::{ChatMessage, Role, UpstreamError};
use database::validation::title_from_message;
use database::{conversation, message, Database};
use tracing::{debug, info, warn};

use crate::error::{Result, SessionError};
use crate::grouping::{group_by_date, DateGroups};
use crate::relay::{relay_stream, Relayed};
use crate::service::AnalystService;

/// Result of one chat turn.
#[derive(Debug, Clone)]
pub struct TurnOutcome {
    /// Assistant reply as shown and stored: streamed content, the apology if
    /// the turn failed before any content, or `None` for an empty reply.
    pub reply: Option<String>,
    /// Failure that ended the turn early, if any.
    pub error: Option<UpstreamError>,
    /// Conversation the turn was stored under, when persistence succeeded.
    pub conversation_id: Option<String>,
}

impl TurnOutcome {
    /// Whether the reply stream completed without error.
    pub fn is_complete(&self) -> bool {
        self.error.is_none()
    }
}

/// Resets the loading flag when a turn ends, including when it is cancelled.
struct LoadingGuard(Arc<AtomicBool>);

impl LoadingGuard {
    fn acquire(flag: &Arc<AtomicBool>) -> Option<Self> {
        if flag.swap(true, Ordering::SeqCst) {
            None
        } else {
            Some(Self(flag.clone()))
        }
    }
}

impl Drop for LoadingGuard {
    fn drop(&mut self) {
        self.0.store(false, Ordering::SeqCst);
    }
}

/// A chat with the analyst.
///
/// Holds the in-memory history sent with every turn and, when a database is
/// attached, the id of the conversation the turns are stored under. Storage
/// is best-effort: failures are logged and never abort a turn.
///
/// Dropping a `send_message` future cancels the turn: the HTTP response is
/// dropped with it, which closes the connection to the API.
///
/// # Example
///
/// ```ignore
/// use analyst_session::{AnalystClient, ChatSession, SessionConfig};
///
/// let client = AnalystClient::new(SessionConfig::new("http://127.0.0.1:8790"))?;
/// let mut session = ChatSession::new(client);
/// session.open();
///
/// let outcome = session
///     .send_message("What is MRR?", |delta| print!("{}", delta))
///     .await?;
/// ```
pub struct ChatSession<S: AnalystService> {
    service: S,
    db: Option<Database>,
    messages: Vec<ChatMessage>,
    conversation_id: Option<String>,
    is_open: bool,
    loading: Arc<AtomicBool>,
}

impl<S: AnalystService> ChatSession<S> {
    /// Create a session that keeps its history in memory only.
    pub fn new(service: S) -> Self {
        Self {
            service,
            db: None,
            messages: Vec::new(),
            conversation_id: None,
            is_open: false,
            loading: Arc::new(AtomicBool::new(false)),
        }
    }

    /// Create a session that stores conversations in `db`.
    pub fn with_database(service: S, db: Database) -> Self {
        Self {
            db: Some(db),
            ..Self::new(service)
        }
    }

    /// Start accepting messages.
    pub fn open(&mut self) {
        self.is_open = true;
    }

    /// Stop the session and forget the current chat.
    ///
    /// Stored conversations are kept; the next turn after reopening starts a
    /// new one.
    pub fn close(&mut self) {
        self.is_open = false;
        self.messages.clear();
        self.conversation_id = None;
    }

    pub fn is_open(&self) -> bool {
        self.is_open
    }

    /// Whether a turn is in progress.
    pub fn is_loading(&self) -> bool {
        self.loading.load(Ordering::SeqCst)
    }

    /// History sent with the next turn.
    pub fn messages(&self) -> &[ChatMessage] {
        &self.messages
    }

    /// Conversation the session is storing into, if any.
    pub fn conversation_id(&self) -> Option<&str> {
        self.conversation_id.as_deref()
    }

    /// Return the active conversation, creating it if none exists yet.
    ///
    /// The title comes from the service; any failure or blank title falls
    /// back to a truncation of `first_message`.
    pub async fn ensure_conversation(&mut self, first_message: &str) -> Result<String> {
        if let Some(id) = &self.conversation_id {
            return Ok(id.clone());
        }

        let db = self.db.as_ref().ok_or(SessionError::PersistenceDisabled)?;
        let title = derive_title(&self.service, first_message).await;
        let created = conversation::create_conversation(db.pool(), &title).await?;

        info!(conversation_id = %created.id, "Started conversation '{}'", created.title);
        self.conversation_id = Some(created.id.clone());
        Ok(created.id)
    }

    /// Send a user message and stream the reply into `on_delta`.
    ///
    /// Returns [`SessionError::Busy`] while another turn is running and
    /// [`SessionError::Closed`] before [`open`](Self::open). Upstream failures
    /// do not fail the call; they are reported in [`TurnOutcome::error`].
    pub async fn send_message<F>(&mut self, text: &str, on_delta: F) -> Result<TurnOutcome>
    where
        F: FnMut(&str),
    {
        if !self.is_open {
            return Err(SessionError::Closed);
        }
        let _guard = LoadingGuard::acquire(&self.loading).ok_or(SessionError::Busy)?;

        let content = text.trim();
        validate_text("message", content, MAX_CONTENT_CHARS)?;

        let mut history = self.messages.clone();
        history.push(ChatMessage::user(content));
        validate_messages(&history)?;

        let conversation_id = if self.db.is_some() {
            match self.ensure_conversation(content).await {
                Ok(id) => Some(id),
                Err(e) => {
                    warn!("Failed to create conversation, continuing unsaved: {}", e);
                    None
                }
            }
        } else {
            None
        };

        self.persist(conversation_id.as_deref(), Role::User, content)
            .await;
        self.messages = history;

        let relayed = match self.service.stream_reply(&self.messages).await {
            Ok(stream) => relay_stream(stream, on_delta).await,
            Err(e) => {
                warn!("Analyst request failed: {}", e);
                Relayed::failed(e)
            }
        };

        let reply = relayed.reply().map(cap_reply);
        match &reply {
            Some(reply) => {
                self.persist(conversation_id.as_deref(), Role::Assistant, reply)
                    .await;
                self.messages.push(ChatMessage::assistant(reply.clone()));
            }
            None => debug!("Reply stream ended without content"),
        }

        Ok(TurnOutcome {
            reply,
            error: relayed.interrupted,
            conversation_id,
        })
    }

    /// Continue a stored conversation, replacing the in-memory history.
    pub async fn resume(&mut self, conversation_id: &str) -> Result<()> {
        if self.is_loading() {
            return Err(SessionError::Busy);
        }
        let db = self.db.as_ref().ok_or(SessionError::PersistenceDisabled)?;

        let stored = conversation::get_conversation(db.pool(), conversation_id).await?;
        let rows = message::list_messages(db.pool(), &stored.id).await?;

        self.messages = rows
            .iter()
            .filter_map(|row| {
                row.role().map(|role| ChatMessage {
                    role,
                    content: row.content.clone(),
                })
            })
            .collect();
        self.conversation_id = Some(stored.id);
        self.is_open = true;

        debug!(
            "Resumed conversation with {} messages",
            self.messages.len()
        );
        Ok(())
    }

    /// Stored conversations grouped by recency.
    pub async fn conversations(&self) -> Result<DateGroups> {
        let db = self.db.as_ref().ok_or(SessionError::PersistenceDisabled)?;
        let all = conversation::list_conversations(db.pool()).await?;
        Ok(group_by_date(&all))
    }

    /// Delete a stored conversation. Deleting the active one starts a new chat.
    pub async fn delete_conversation(&mut self, conversation_id: &str) -> Result<()> {
        let db = self.db.as_ref().ok_or(SessionError::PersistenceDisabled)?;
        conversation::delete_conversation(db.pool(), conversation_id).await?;

        if self.conversation_id.as_deref() == Some(conversation_id) {
            self.messages.clear();
            self.conversation_id = None;
        }
        Ok(())
    }

    async fn persist(&self, conversation_id: Option<&str>, role: Role, content: &str) {
        let (Some(db), Some(id)) = (&self.db, conversation_id) else {
            return;
        };

        if let Err(e) = message::append_message(db.pool(), id, role, content).await {
            warn!(conversation_id = %id, role = %role, "Failed to save message: {}", e);
        }
    }
}

async fn derive_title<S: AnalystService>(service: &S, first_message: &str) -> String {
    match service.generate_title(first_message).await {
        Ok(title) if !title.trim().is_empty() => title,
        Ok(_) => title_from_message(first_message),
        Err(e) => {
            debug!("Title generation failed, truncating message: {}", e);
            title_from_message(first_message)
        }
    }
}

/// Trim a reply to the content limit so it can be stored and sent back
/// upstream as history.
fn cap_reply(reply: String) -> String {
    if reply.chars().count() <= MAX_CONTENT_CHARS {
        return reply;
    }
    warn!(
        chars = reply.chars().count(),
        "Reply exceeds {} chars, truncating", MAX_CONTENT_CHARS
    );
    reply.chars().take(MAX_CONTENT_CHARS).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use analyst_core::{async_trait, ByteStream, ValidationError};

    struct Unreachable;

    #[async_trait]
    impl AnalystService for Unreachable {
        async fn stream_reply(
            &self,
            _history: &[ChatMessage],
        ) -> std::result::Result<ByteStream, UpstreamError> {
            Err(UpstreamError::Network("unreachable".into()))
        }

        async fn generate_title(
            &self,
            _message: &str,
        ) -> std::result::Result<String, UpstreamError> {
            Err(UpstreamError::Network("unreachable".into()))
        }
    }

    #[tokio::test]
    async fn test_closed_session_rejects_messages() {
        let mut session = ChatSession::new(Unreachable);
        assert!(matches!(
            session.send_message("hi", |_| {}).await,
            Err(SessionError::Closed)
        ));
    }

    #[tokio::test]
    async fn test_busy_while_turn_in_progress() {
        let mut session = ChatSession::new(Unreachable);
        session.open();

        let held = LoadingGuard::acquire(&session.loading).unwrap();
        assert!(session.is_loading());
        assert!(matches!(
            session.send_message("hi", |_| {}).await,
            Err(SessionError::Busy)
        ));
        assert!(session.messages().is_empty());

        drop(held);
        assert!(!session.is_loading());
        let outcome = session.send_message("hi", |_| {}).await.unwrap();
        assert!(!outcome.is_complete());
        assert!(!session.is_loading());
    }

    #[tokio::test]
    async fn test_blank_and_oversized_messages_rejected() {
        let mut session = ChatSession::new(Unreachable);
        session.open();

        assert!(matches!(
            session.send_message("   ", |_| {}).await,
            Err(SessionError::Validation(ValidationError::Empty { .. }))
        ));
        assert!(matches!(
            session.send_message(&"x".repeat(MAX_CONTENT_CHARS + 1), |_| {}).await,
            Err(SessionError::Validation(ValidationError::TooLong { .. }))
        ));
        assert!(session.messages().is_empty());
        assert!(!session.is_loading());
    }

    #[tokio::test]
    async fn test_failure_without_content_records_apology() {
        let mut session = ChatSession::new(Unreachable);
        session.open();

        let outcome = session.send_message("What is MRR?", |_| {}).await.unwrap();

        assert_eq!(outcome.reply.as_deref(), Some(analyst_core::APOLOGY_MESSAGE));
        assert!(outcome.conversation_id.is_none());
        assert_eq!(session.messages().len(), 2);
        assert_eq!(session.messages()[0], ChatMessage::user("What is MRR?"));
    }

    #[tokio::test]
    async fn test_persistence_calls_need_database() {
        let mut session = ChatSession::new(Unreachable);
        assert!(matches!(
            session.ensure_conversation("hi").await,
            Err(SessionError::PersistenceDisabled)
        ));
        assert!(matches!(
            session.conversations().await,
            Err(SessionError::PersistenceDisabled)
        ));
    }

    #[test]
    fn test_cap_reply_keeps_short_and_trims_long() {
        assert_eq!(cap_reply("short".to_string()), "short");

        let capped = cap_reply("é".repeat(MAX_CONTENT_CHARS + 25));
        assert_eq!(capped.chars().count(), MAX_CONTENT_CHARS);
    }
}
