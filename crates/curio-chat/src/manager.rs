use std::sync::Arc;

use chrono::Utc;
use tracing::{debug, info};

use curio_context::ContextAssembler;
use curio_llm::{CompletionOptions, CompletionRequest, Dispatcher, Message};
use curio_store::{ChatMessage, Conversation, ConversationStore, Link, LinkStore, MessageRole};

use crate::error::{ChatError, Result};

/// The two messages committed by a successful turn.
#[derive(Debug, Clone)]
pub struct Exchange {
    pub user: ChatMessage,
    pub assistant: ChatMessage,
}

/// Owns conversation lifecycle and orchestrates a turn: context
/// assembly, dispatch, and message persistence.
///
/// Callers must not issue concurrent sends for the same conversation id;
/// the dispatcher's own concurrency limiting is the only internal
/// mutual exclusion.
pub struct ConversationManager {
    store: Arc<dyn ConversationStore>,
    links: Arc<dyn LinkStore>,
    assembler: ContextAssembler,
    dispatcher: Arc<Dispatcher>,
    model: String,
    options: CompletionOptions,
}

struct Turn {
    conversation: Conversation,
    user: ChatMessage,
    request: CompletionRequest,
}

impl ConversationManager {
    pub fn new(
        store: Arc<dyn ConversationStore>,
        links: Arc<dyn LinkStore>,
        assembler: ContextAssembler,
        dispatcher: Arc<Dispatcher>,
        model: impl Into<String>,
    ) -> Self {
        Self {
            store,
            links,
            assembler,
            dispatcher,
            model: model.into(),
            options: CompletionOptions::default(),
        }
    }

    pub fn with_options(mut self, options: CompletionOptions) -> Self {
        self.options = options;
        self
    }

    /// Return the active conversation for exactly this link set
    /// (order-insensitive), or create a fresh one. Ended conversations
    /// are never reused.
    pub async fn start_conversation(&self, link_ids: &[String]) -> Result<Conversation> {
        if let Some(existing) = self.store.find_active_for_links(link_ids).await? {
            debug!(conversation = %existing.id, "reusing active conversation");
            return Ok(existing);
        }

        let conversation = Conversation::new(link_ids.to_vec());
        info!(conversation = %conversation.id, links = link_ids.len(), "starting conversation");
        self.store.put_conversation(conversation.clone()).await?;
        Ok(conversation)
    }

    /// One blocking turn: persists the user message, dispatches, then
    /// persists the assistant reply.
    pub async fn send_message(&self, conversation_id: &str, text: &str) -> Result<Exchange> {
        let Turn {
            conversation,
            user,
            request,
        } = self.prepare_turn(conversation_id, text).await?;

        let reply = self.dispatcher.complete(request).await?;
        self.commit_assistant(&conversation, user, reply).await
    }

    /// Streaming turn: `on_delta` receives the accumulated reply after
    /// each fragment. The assistant message is committed only once the
    /// final content is known, so a cancelled or failed stream persists
    /// nothing.
    pub async fn send_message_streaming<F>(
        &self,
        conversation_id: &str,
        text: &str,
        on_delta: F,
    ) -> Result<Exchange>
    where
        F: FnMut(&str) + Send,
    {
        let Turn {
            conversation,
            user,
            request,
        } = self.prepare_turn(conversation_id, text).await?;

        let reply = self.dispatcher.complete_streaming(request, on_delta).await?;
        self.commit_assistant(&conversation, user, reply).await
    }

    /// Mark the conversation ended. Idempotent; a terminal conversation
    /// stays terminal and the next `start_conversation` for the same
    /// link set creates a new one.
    pub async fn end_conversation(&self, conversation_id: &str) -> Result<()> {
        let mut conversation = self
            .store
            .get_conversation(conversation_id)
            .await?
            .ok_or_else(|| ChatError::ConversationNotFound(conversation_id.to_string()))?;

        if conversation.ended_at.is_none() {
            conversation.ended_at = Some(Utc::now());
            info!(conversation = %conversation.id, "ending conversation");
            self.store.put_conversation(conversation).await?;
        }
        Ok(())
    }

    async fn prepare_turn(&self, conversation_id: &str, text: &str) -> Result<Turn> {
        let conversation = self
            .store
            .get_conversation(conversation_id)
            .await?
            .ok_or_else(|| ChatError::ConversationNotFound(conversation_id.to_string()))?;

        let prior = self.store.get_messages(&conversation.id).await?;

        // Committed before anything else fallible runs, so the user's
        // input survives assembly and provider failures.
        let attribution =
            (conversation.link_ids.len() == 1).then(|| conversation.link_ids[0].clone());
        let user = ChatMessage::user(conversation.id.clone(), text).with_link(attribution);
        self.store.put_message(user.clone()).await?;

        let links = self.load_links(&conversation).await?;
        let system_prompt = self.assembler.build_system_prompt(&links).await;

        let mut messages = vec![Message::system(system_prompt)];
        for message in prior.iter().filter(|m| m.role != MessageRole::System) {
            messages.push(match message.role {
                MessageRole::Assistant => Message::assistant(message.content.clone()),
                _ => Message::user(message.content.clone()),
            });
        }
        messages.push(Message::user(text));

        let request =
            CompletionRequest::new(self.model.clone(), messages).with_options(self.options.clone());

        Ok(Turn {
            conversation,
            user,
            request,
        })
    }

    async fn load_links(&self, conversation: &Conversation) -> Result<Vec<Link>> {
        let mut links = Vec::with_capacity(conversation.link_ids.len());
        for link_id in &conversation.link_ids {
            let link = self
                .links
                .get_link(link_id)
                .await?
                .ok_or_else(|| ChatError::LinkNotFound(link_id.clone()))?;
            links.push(link);
        }
        Ok(links)
    }

    async fn commit_assistant(
        &self,
        conversation: &Conversation,
        user: ChatMessage,
        reply: String,
    ) -> Result<Exchange> {
        let assistant = ChatMessage::assistant(conversation.id.clone(), reply)
            .with_link(user.link_id.clone());
        self.store.put_message(assistant.clone()).await?;

        Ok(Exchange { user, assistant })
    }
}
