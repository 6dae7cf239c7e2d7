//! Chat session scenarios against scripted providers and an in-memory store.

use std::sync::Arc;
use std::time::Duration;

use analyst_core::prompt::TITLE_SYSTEM_PROMPT;
use analyst_core::sse::delta_event;
use analyst_core::{async_trait, Role, APOLOGY_MESSAGE};
use analyst_session::{AnalystService, ChatSession, SessionError};
use bytes::Bytes;
use database::{conversation, message, Database};
use analyst_core::validation::MAX_CONTENT_CHARS;
use mock_gateway::{
    sse_body, split_every, ByteStream, ChatCompletions, ChatMessage, DelayedGateway,
    EchoGateway, ScriptedGateway, StreamScript, UpstreamError,
};

/// Runs the session straight against a provider, without the HTTP hop.
struct InProcess<C>(Arc<C>);

#[async_trait]
impl<C: ChatCompletions> AnalystService for InProcess<C> {
    async fn stream_reply(&self, history: &[ChatMessage]) -> Result<ByteStream, UpstreamError> {
        self.0.stream(history.to_vec()).await
    }

    async fn generate_title(&self, message: &str) -> Result<String, UpstreamError> {
        let messages = vec![
            ChatMessage::system(TITLE_SYSTEM_PROMPT),
            ChatMessage::user(message),
        ];
        self.0.complete(messages, Some(20)).await
    }
}

/// Titles come back at once; replies wait on a slow provider.
struct SlowReplies(DelayedGateway<ScriptedGateway>);

#[async_trait]
impl AnalystService for SlowReplies {
    async fn stream_reply(&self, history: &[ChatMessage]) -> Result<ByteStream, UpstreamError> {
        self.0.stream(history.to_vec()).await
    }

    async fn generate_title(&self, _message: &str) -> Result<String, UpstreamError> {
        Ok("Slow chat".to_string())
    }
}

async fn test_db() -> Database {
    let db = Database::connect_with_pool_size("sqlite::memory:", 1)
        .await
        .unwrap();
    db.migrate().await.unwrap();
    db
}

async fn session_with(
    gateway: ScriptedGateway,
) -> (ChatSession<InProcess<ScriptedGateway>>, Arc<ScriptedGateway>, Database) {
    let db = test_db().await;
    let gateway = Arc::new(gateway);
    let mut session = ChatSession::with_database(InProcess(gateway.clone()), db.clone());
    session.open();
    (session, gateway, db)
}

async fn stored(db: &Database, conversation_id: &str) -> Vec<(Role, String)> {
    message::list_messages(db.pool(), conversation_id)
        .await
        .unwrap()
        .into_iter()
        .map(|m| (m.role().unwrap(), m.content))
        .collect()
}

#[tokio::test]
async fn test_first_message_streams_and_creates_conversation() {
    let gateway = ScriptedGateway::with_deltas(&["MRR is ", "$1,543", " this month."])
        .with_completion(Ok("MRR Overview".to_string()));
    let (mut session, gateway, db) = session_with(gateway).await;

    let mut streamed = String::new();
    let outcome = session
        .send_message("  What is MRR?  ", |delta| streamed.push_str(delta))
        .await
        .unwrap();

    assert!(outcome.is_complete());
    assert_eq!(streamed, "MRR is $1,543 this month.");
    assert_eq!(outcome.reply.as_deref(), Some(streamed.as_str()));

    let id = outcome.conversation_id.unwrap();
    assert_eq!(session.conversation_id(), Some(id.as_str()));
    let created = conversation::get_conversation(db.pool(), &id).await.unwrap();
    assert_eq!(created.title, "MRR Overview");

    assert_eq!(
        stored(&db, &id).await,
        vec![
            (Role::User, "What is MRR?".to_string()),
            (Role::Assistant, "MRR is $1,543 this month.".to_string()),
        ]
    );

    let title_calls = gateway.complete_calls();
    assert_eq!(title_calls.len(), 1);
    assert_eq!(title_calls[0].1, Some(20));
    assert_eq!(title_calls[0].0[1], ChatMessage::user("What is MRR?"));
}

#[tokio::test]
async fn test_title_falls_back_to_truncated_message() {
    let long = "a".repeat(60);
    let gateway = ScriptedGateway::with_deltas(&["ok"]).with_completion(Err(
        UpstreamError::Status {
            status: 500,
            body: "boom".to_string(),
        },
    ));
    let (mut session, _gateway, db) = session_with(gateway).await;

    let outcome = session.send_message(&long, |_| {}).await.unwrap();

    let created = conversation::get_conversation(db.pool(), &outcome.conversation_id.unwrap())
        .await
        .unwrap();
    assert_eq!(created.title, format!("{}...", "a".repeat(47)));
}

#[tokio::test]
async fn test_blank_generated_title_falls_back() {
    let gateway =
        ScriptedGateway::with_deltas(&["ok"]).with_completion(Ok("   ".to_string()));
    let (mut session, _gateway, db) = session_with(gateway).await;

    let outcome = session
        .send_message("Show <b>churn</b> by plan", |_| {})
        .await
        .unwrap();

    let created = conversation::get_conversation(db.pool(), &outcome.conversation_id.unwrap())
        .await
        .unwrap();
    assert_eq!(created.title, "Show churn by plan");
}

#[tokio::test]
async fn test_later_turns_reuse_conversation_and_send_history() {
    let (mut session, gateway, db) = session_with(ScriptedGateway::with_deltas(&["Answer"])).await;

    let first = session.send_message("Question one", |_| {}).await.unwrap();
    let second = session.send_message("Question two", |_| {}).await.unwrap();

    assert_eq!(first.conversation_id, second.conversation_id);
    assert_eq!(
        conversation::list_conversations(db.pool()).await.unwrap().len(),
        1
    );
    assert_eq!(gateway.complete_calls().len(), 1);

    let calls = gateway.stream_calls();
    assert_eq!(calls.len(), 2);
    assert_eq!(
        calls[1],
        vec![
            ChatMessage::user("Question one"),
            ChatMessage::assistant("Answer"),
            ChatMessage::user("Question two"),
        ]
    );
    assert_eq!(stored(&db, &second.conversation_id.unwrap()).await.len(), 4);
}

#[tokio::test]
async fn test_chunks_split_mid_payload_produce_each_delta_once() {
    let body = sse_body(&["Net ", "revenue ", "retention"]);
    let (mut session, _gateway, _db) =
        session_with(ScriptedGateway::with_chunks(split_every(&body, 7))).await;

    let mut deltas = Vec::new();
    let outcome = session
        .send_message("Explain NRR", |d| deltas.push(d.to_string()))
        .await
        .unwrap();

    assert_eq!(deltas, vec!["Net ", "revenue ", "retention"]);
    assert_eq!(outcome.reply.as_deref(), Some("Net revenue retention"));
}

#[tokio::test]
async fn test_upstream_failure_persists_apology() {
    let (mut session, _gateway, db) =
        session_with(ScriptedGateway::failing(UpstreamError::RateLimited)).await;

    let outcome = session.send_message("What is MRR?", |_| {}).await.unwrap();

    assert!(matches!(outcome.error, Some(UpstreamError::RateLimited)));
    assert_eq!(outcome.reply.as_deref(), Some(APOLOGY_MESSAGE));

    let id = outcome.conversation_id.unwrap();
    let created = conversation::get_conversation(db.pool(), &id).await.unwrap();
    assert_eq!(created.title, "What is MRR?");
    assert_eq!(
        stored(&db, &id).await,
        vec![
            (Role::User, "What is MRR?".to_string()),
            (Role::Assistant, APOLOGY_MESSAGE.to_string()),
        ]
    );
    assert!(!session.is_loading());
}

#[tokio::test]
async fn test_mid_stream_failure_keeps_partial_reply() {
    let script = StreamScript::ChunksThenError(
        vec![Bytes::from(delta_event("Churn rose ")), Bytes::from(delta_event("to 12.5%"))],
        UpstreamError::Network("connection reset".to_string()),
    );
    let gateway = ScriptedGateway::new(script, Ok("Churn".to_string()));
    let (mut session, _gateway, db) = session_with(gateway).await;

    let outcome = session.send_message("Why is churn up?", |_| {}).await.unwrap();

    assert!(matches!(outcome.error, Some(UpstreamError::Network(_))));
    assert_eq!(outcome.reply.as_deref(), Some("Churn rose to 12.5%"));

    let messages = stored(&db, &outcome.conversation_id.unwrap()).await;
    assert_eq!(messages[1], (Role::Assistant, "Churn rose to 12.5%".to_string()));
}

#[tokio::test]
async fn test_close_starts_a_fresh_conversation() {
    let (mut session, gateway, db) = session_with(ScriptedGateway::with_deltas(&["Hi"])).await;

    let first = session.send_message("First chat", |_| {}).await.unwrap();
    session.close();
    assert!(!session.is_open());
    assert!(session.messages().is_empty());
    assert!(session.conversation_id().is_none());
    assert!(matches!(
        session.send_message("ignored", |_| {}).await,
        Err(SessionError::Closed)
    ));

    session.open();
    let second = session.send_message("Second chat", |_| {}).await.unwrap();

    assert_ne!(first.conversation_id, second.conversation_id);
    assert_eq!(gateway.stream_calls()[1], vec![ChatMessage::user("Second chat")]);
    assert_eq!(
        conversation::list_conversations(db.pool()).await.unwrap().len(),
        2
    );
}

#[tokio::test]
async fn test_delete_conversation_removes_messages() {
    let (mut session, _gateway, db) = session_with(ScriptedGateway::with_deltas(&["Hi"])).await;

    let outcome = session.send_message("Delete me", |_| {}).await.unwrap();
    let id = outcome.conversation_id.unwrap();
    assert_eq!(message::count_messages(db.pool(), &id).await.unwrap(), 2);

    session.delete_conversation(&id).await.unwrap();

    assert_eq!(message::count_messages(db.pool(), &id).await.unwrap(), 0);
    assert!(session.conversation_id().is_none());
    assert!(session.messages().is_empty());
    assert!(matches!(
        session.delete_conversation(&id).await,
        Err(SessionError::Database(database::DatabaseError::NotFound { .. }))
    ));
}

#[tokio::test]
async fn test_resume_restores_history() {
    let db = test_db().await;
    let gateway = Arc::new(ScriptedGateway::with_deltas(&["Answer"]));

    let mut first = ChatSession::with_database(InProcess(gateway.clone()), db.clone());
    first.open();
    let id = first
        .send_message("Original question", |_| {})
        .await
        .unwrap()
        .conversation_id
        .unwrap();

    let mut resumed = ChatSession::with_database(InProcess(gateway.clone()), db.clone());
    resumed.resume(&id).await.unwrap();
    assert!(resumed.is_open());
    assert_eq!(resumed.messages().len(), 2);

    let next = resumed.send_message("Follow-up", |_| {}).await.unwrap();
    assert_eq!(next.conversation_id.as_deref(), Some(id.as_str()));
    assert_eq!(gateway.stream_calls()[1].len(), 3);
    assert_eq!(stored(&db, &id).await.len(), 4);

    let groups = resumed.conversations().await.unwrap();
    assert_eq!(groups.len(), 1);
    assert_eq!(groups.today[0].id, id);

    assert!(matches!(
        resumed.resume("missing").await,
        Err(SessionError::Database(database::DatabaseError::NotFound { .. }))
    ));
}

#[tokio::test]
async fn test_store_failure_does_not_abort_turn() {
    let (mut session, _gateway, db) = session_with(ScriptedGateway::with_deltas(&["Still here"])).await;
    db.close().await;

    let outcome = session.send_message("Anyone?", |_| {}).await.unwrap();

    assert_eq!(outcome.reply.as_deref(), Some("Still here"));
    assert!(outcome.conversation_id.is_none());
    assert_eq!(session.messages().len(), 2);
}

#[tokio::test]
async fn test_dropping_turn_cancels_and_releases_session() {
    let db = test_db().await;
    let slow = DelayedGateway::new(
        ScriptedGateway::with_deltas(&["Too late"]),
        Duration::from_secs(30),
    );
    let mut session = ChatSession::with_database(SlowReplies(slow), db.clone());
    session.open();

    let cancelled = tokio::time::timeout(
        Duration::from_millis(500),
        session.send_message("Will be cancelled", |_| {}),
    )
    .await;
    assert!(cancelled.is_err());
    assert!(!session.is_loading());

    // The user message was written before the reply was requested.
    let id = session.conversation_id().unwrap().to_string();
    assert_eq!(
        stored(&db, &id).await,
        vec![(Role::User, "Will be cancelled".to_string())]
    );

    let again = tokio::time::timeout(
        Duration::from_millis(500),
        session.send_message("Try again", |_| {}),
    )
    .await;
    assert!(again.is_err(), "second turn should start, not report Busy");
}

#[tokio::test]
async fn test_oversized_reply_is_capped_and_session_continues() {
    let db = test_db().await;
    let gateway = Arc::new(EchoGateway::with_prefix("Echo: "));
    let mut session = ChatSession::with_database(InProcess(gateway), db.clone());
    session.open();

    let long = "a".repeat(MAX_CONTENT_CHARS);
    let mut streamed = String::new();
    let outcome = session
        .send_message(&long, |delta| streamed.push_str(delta))
        .await
        .unwrap();

    assert_eq!(streamed.chars().count(), MAX_CONTENT_CHARS + "Echo: ".len());
    let reply = outcome.reply.unwrap();
    assert_eq!(reply.chars().count(), MAX_CONTENT_CHARS);
    assert!(reply.starts_with("Echo: "));
    assert_eq!(session.messages()[1], ChatMessage::assistant(reply.clone()));

    let id = outcome.conversation_id.unwrap();
    assert_eq!(stored(&db, &id).await[1], (Role::Assistant, reply));

    let next = session.send_message("And now?", |_| {}).await.unwrap();
    assert_eq!(next.reply.as_deref(), Some("Echo: And now?"));
    assert_eq!(stored(&db, &id).await.len(), 4);
}
