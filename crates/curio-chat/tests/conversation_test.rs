use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use futures::stream;

use curio_chat::{ChatError, ConversationManager, SummaryService};
use curio_context::ContextAssembler;
use curio_llm::{
    ChatBackend, CompletionRequest, DeltaStream, Dispatcher, LlmError, Role,
};
use curio_store::{
    ChatMessage, ConversationStore, Link, LinkStore, MemoryStore, MessageRole, SummaryKind,
};

/// Records every request and answers with a fixed reply, optionally
/// failing with a scripted status instead.
struct RecordingBackend {
    reply: String,
    fail_status: Option<u16>,
    requests: Mutex<Vec<CompletionRequest>>,
}

impl RecordingBackend {
    fn new(reply: &str) -> Self {
        Self {
            reply: reply.to_string(),
            fail_status: None,
            requests: Mutex::new(Vec::new()),
        }
    }

    fn failing(status: u16) -> Self {
        Self {
            reply: String::new(),
            fail_status: Some(status),
            requests: Mutex::new(Vec::new()),
        }
    }

    fn request_count(&self) -> usize {
        self.requests.lock().unwrap().len()
    }

    fn last_request(&self) -> CompletionRequest {
        self.requests.lock().unwrap().last().unwrap().clone()
    }
}

#[async_trait]
impl ChatBackend for RecordingBackend {
    fn name(&self) -> &str {
        "recording"
    }

    async fn complete(&self, request: &CompletionRequest) -> Result<String, LlmError> {
        self.requests.lock().unwrap().push(request.clone());
        if let Some(status) = self.fail_status {
            return Err(LlmError::Api {
                provider: "recording".to_string(),
                status,
                message: "scripted failure".to_string(),
            });
        }
        Ok(self.reply.clone())
    }

    async fn complete_stream(&self, request: &CompletionRequest) -> Result<DeltaStream, LlmError> {
        self.requests.lock().unwrap().push(request.clone());
        let midpoint = self.reply.len() / 2;
        let (head, tail) = self.reply.split_at(midpoint);
        let items: Vec<Result<String, LlmError>> =
            vec![Ok(head.to_string()), Ok(tail.to_string())];
        Ok(Box::pin(stream::iter(items)))
    }
}

struct Harness {
    store: Arc<MemoryStore>,
    backend: Arc<RecordingBackend>,
    manager: ConversationManager,
}

fn harness(backend: RecordingBackend) -> Harness {
    let store = Arc::new(MemoryStore::new());
    let backend = Arc::new(backend);

    let dispatcher = Arc::new(
        Dispatcher::builder()
            .backend(backend.clone(), 2)
            .retry_limit(0)
            .build()
            .unwrap(),
    );

    let assembler = ContextAssembler::new(store.clone(), store.clone());
    let manager = ConversationManager::new(
        store.clone(),
        store.clone(),
        assembler,
        dispatcher,
        "test-model",
    );

    Harness {
        store,
        backend,
        manager,
    }
}

async fn seed_link(store: &MemoryStore, id: &str, title: &str) -> String {
    let mut link = Link::new(format!("https://example.com/{}", id));
    link.id = id.to_string();
    link.title = Some(title.to_string());
    store.put_link(link).await.unwrap();
    id.to_string()
}

fn ids(values: &[&str]) -> Vec<String> {
    values.iter().map(|s| s.to_string()).collect()
}

#[tokio::test]
async fn test_start_conversation_reuses_active_set() {
    let h = harness(RecordingBackend::new("hi"));
    seed_link(&h.store, "a", "Page A").await;
    seed_link(&h.store, "b", "Page B").await;

    let first = h.manager.start_conversation(&ids(&["a", "b"])).await.unwrap();
    let second = h.manager.start_conversation(&ids(&["b", "a"])).await.unwrap();
    assert_eq!(first.id, second.id);

    h.manager.end_conversation(&first.id).await.unwrap();

    let third = h.manager.start_conversation(&ids(&["a", "b"])).await.unwrap();
    assert_ne!(first.id, third.id);
}

#[tokio::test]
async fn test_send_message_persists_user_and_assistant() {
    let h = harness(RecordingBackend::new("the answer"));
    seed_link(&h.store, "a", "Page A").await;

    let conversation = h.manager.start_conversation(&ids(&["a"])).await.unwrap();
    let exchange = h
        .manager
        .send_message(&conversation.id, "what is this page about?")
        .await
        .unwrap();

    assert_eq!(exchange.user.content, "what is this page about?");
    assert_eq!(exchange.assistant.content, "the answer");
    // single-link conversations attribute both messages to the link
    assert_eq!(exchange.user.link_id.as_deref(), Some("a"));
    assert_eq!(exchange.assistant.link_id.as_deref(), Some("a"));

    let messages = h.store.get_messages(&conversation.id).await.unwrap();
    assert_eq!(messages.len(), 2);
    assert_eq!(messages[0].role, MessageRole::User);
    assert_eq!(messages[1].role, MessageRole::Assistant);
}

#[tokio::test]
async fn test_dispatcher_failure_keeps_user_message_only() {
    let h = harness(RecordingBackend::failing(401));
    seed_link(&h.store, "a", "Page A").await;

    let conversation = h.manager.start_conversation(&ids(&["a"])).await.unwrap();
    let err = h
        .manager
        .send_message(&conversation.id, "hello?")
        .await
        .unwrap_err();

    assert!(matches!(err, ChatError::Llm(_)));

    let messages = h.store.get_messages(&conversation.id).await.unwrap();
    assert_eq!(messages.len(), 1);
    assert_eq!(messages[0].role, MessageRole::User);
    assert_eq!(messages[0].content, "hello?");
}

#[tokio::test]
async fn test_missing_link_fails_but_user_message_survives() {
    let h = harness(RecordingBackend::new("unused"));

    let conversation = h
        .manager
        .start_conversation(&ids(&["ghost"]))
        .await
        .unwrap();
    let err = h
        .manager
        .send_message(&conversation.id, "anyone there?")
        .await
        .unwrap_err();

    assert!(matches!(err, ChatError::LinkNotFound(_)));

    let messages = h.store.get_messages(&conversation.id).await.unwrap();
    assert_eq!(messages.len(), 1);
    assert_eq!(messages[0].content, "anyone there?");
}

#[tokio::test]
async fn test_streaming_turn_commits_final_text() {
    let h = harness(RecordingBackend::new("streamed reply"));
    seed_link(&h.store, "a", "Page A").await;

    let conversation = h.manager.start_conversation(&ids(&["a"])).await.unwrap();

    let mut seen: Vec<String> = Vec::new();
    let exchange = h
        .manager
        .send_message_streaming(&conversation.id, "go on", |accumulated| {
            seen.push(accumulated.to_string())
        })
        .await
        .unwrap();

    assert!(!seen.is_empty());
    for pair in seen.windows(2) {
        assert!(pair[1].starts_with(pair[0].as_str()));
    }
    assert_eq!(seen.last().unwrap(), "streamed reply");
    assert_eq!(exchange.assistant.content, "streamed reply");

    let messages = h.store.get_messages(&conversation.id).await.unwrap();
    assert_eq!(messages.len(), 2);
    assert_eq!(messages[1].content, "streamed reply");
}

#[tokio::test]
async fn test_provider_history_excludes_persisted_system_messages() {
    let h = harness(RecordingBackend::new("noted"));
    seed_link(&h.store, "a", "Page A").await;

    let conversation = h.manager.start_conversation(&ids(&["a"])).await.unwrap();

    h.manager
        .send_message(&conversation.id, "first question")
        .await
        .unwrap();

    // a stray persisted system message must never reach the provider
    let mut stray = ChatMessage::user(conversation.id.clone(), "internal marker");
    stray.role = MessageRole::System;
    h.store.put_message(stray).await.unwrap();

    h.manager
        .send_message(&conversation.id, "second question")
        .await
        .unwrap();

    let request = h.backend.last_request();
    let system_count = request
        .messages
        .iter()
        .filter(|m| m.role == Role::System)
        .count();

    // exactly one system message: the freshly assembled context
    assert_eq!(system_count, 1);
    assert_eq!(request.messages[0].role, Role::System);
    assert!(!request.messages.iter().any(|m| m.content == "internal marker"));

    // history carried the first turn plus the new user message
    assert!(request.messages.iter().any(|m| m.content == "first question"));
    assert!(request.messages.iter().any(|m| m.content == "noted"));
    assert_eq!(
        request.messages.last().unwrap().content,
        "second question"
    );
}

#[tokio::test]
async fn test_summary_generate_persists_row() {
    let h = harness(RecordingBackend::new("a tidy tl;dr"));
    seed_link(&h.store, "a", "Page A").await;
    h.store
        .put_extracted_text("https://example.com/a", "long extracted page body")
        .await;

    let dispatcher = Arc::new(
        Dispatcher::builder()
            .backend(h.backend.clone(), 2)
            .retry_limit(0)
            .build()
            .unwrap(),
    );
    let service = SummaryService::new(
        dispatcher,
        h.store.clone(),
        h.store.clone(),
        h.store.clone(),
        "test-model",
    );

    let link = h.store.get_link("a").await.unwrap().unwrap();
    let summary = service
        .generate(&link, SummaryKind::Tldr, None)
        .await
        .unwrap();

    assert_eq!(summary.content, "a tidy tl;dr");
    assert_eq!(summary.kind, SummaryKind::Tldr);
    assert!(summary.prompt.is_none());

    let cached = service.get_by_link("a").await.unwrap();
    assert_eq!(cached.len(), 1);
    assert_eq!(cached[0].content, "a tidy tl;dr");
}

#[tokio::test]
async fn test_summary_custom_keeps_prompt_and_raw_skips_model() {
    let h = harness(RecordingBackend::new("custom output"));
    seed_link(&h.store, "a", "Page A").await;
    h.store
        .put_extracted_text("https://example.com/a", "cached body text")
        .await;

    let dispatcher = Arc::new(
        Dispatcher::builder()
            .backend(h.backend.clone(), 2)
            .retry_limit(0)
            .build()
            .unwrap(),
    );
    let service = SummaryService::new(
        dispatcher,
        h.store.clone(),
        h.store.clone(),
        h.store.clone(),
        "test-model",
    );

    let link = h.store.get_link("a").await.unwrap().unwrap();

    let custom = service
        .generate(&link, SummaryKind::Custom, Some("list every acronym"))
        .await
        .unwrap();
    assert_eq!(custom.prompt.as_deref(), Some("list every acronym"));
    assert_eq!(h.backend.request_count(), 1);

    // raw caches extracted text without a model round-trip
    let raw = service
        .generate(&link, SummaryKind::Raw, None)
        .await
        .unwrap();
    assert_eq!(raw.content, "cached body text");
    assert_eq!(h.backend.request_count(), 1);
}

#[tokio::test]
async fn test_custom_prompt_roundtrip() {
    let h = harness(RecordingBackend::new("unused"));

    let dispatcher = Arc::new(
        Dispatcher::builder()
            .backend(h.backend.clone(), 2)
            .retry_limit(0)
            .build()
            .unwrap(),
    );
    let service = SummaryService::new(
        dispatcher,
        h.store.clone(),
        h.store.clone(),
        h.store.clone(),
        "test-model",
    );

    assert!(service.load_custom_prompt("acronyms").await.unwrap().is_none());

    service
        .save_custom_prompt("acronyms", "list every acronym")
        .await
        .unwrap();
    assert_eq!(
        service.load_custom_prompt("acronyms").await.unwrap().as_deref(),
        Some("list every acronym")
    );
}
