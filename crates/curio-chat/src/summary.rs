use std::sync::Arc;

use tracing::debug;

use curio_llm::{CompletionOptions, CompletionRequest, Dispatcher, Message};
use curio_store::{KeyValueStore, Link, PageTextCache, Summary, SummaryKind, SummaryStore};

use crate::error::Result;
use crate::templates;

const SUMMARY_MAX_TOKENS: u32 = 512;
/// Ceiling for raw full-text rows, in characters.
const RAW_TEXT_CAP: usize = 3000;

/// Generates and caches per-link summaries. Rows are never mutated:
/// regenerating writes a new row and the newest one wins downstream.
pub struct SummaryService {
    dispatcher: Arc<Dispatcher>,
    summaries: Arc<dyn SummaryStore>,
    page_text: Arc<dyn PageTextCache>,
    prompts: Arc<dyn KeyValueStore>,
    model: String,
}

impl SummaryService {
    pub fn new(
        dispatcher: Arc<Dispatcher>,
        summaries: Arc<dyn SummaryStore>,
        page_text: Arc<dyn PageTextCache>,
        prompts: Arc<dyn KeyValueStore>,
        model: impl Into<String>,
    ) -> Self {
        Self {
            dispatcher,
            summaries,
            page_text,
            prompts,
            model: model.into(),
        }
    }

    /// Generate, persist and return a summary of the given kind.
    /// `SummaryKind::Raw` caches the extracted page text directly
    /// without a model call; every other kind issues one non-streaming
    /// completion with a short fixed token budget.
    pub async fn generate(
        &self,
        link: &Link,
        kind: SummaryKind,
        custom_prompt: Option<&str>,
    ) -> Result<Summary> {
        let source = self.source_text(link).await;

        if kind == SummaryKind::Raw {
            let summary = Summary::new(link.id.clone(), kind, None, cap(&source, RAW_TEXT_CAP));
            self.summaries.put_summary(summary.clone()).await?;
            return Ok(summary);
        }

        let instruction = templates::instruction(kind, custom_prompt);
        let prompt = format!(
            "{}\n\nPage: {}\nURL: {}\n\n{}",
            instruction,
            link.display_name(),
            link.url,
            source
        );

        let request = CompletionRequest::new(
            self.model.clone(),
            vec![
                Message::system(templates::SUMMARIZER_ROLE),
                Message::user(prompt),
            ],
        )
        .with_options(CompletionOptions::new().max_tokens(SUMMARY_MAX_TOKENS));

        let content = self.dispatcher.complete(request).await?;

        let prompt_text = (kind == SummaryKind::Custom)
            .then(|| custom_prompt.unwrap_or_default().to_string());
        let summary = Summary::new(link.id.clone(), kind, prompt_text, content);
        self.summaries.put_summary(summary.clone()).await?;
        Ok(summary)
    }

    /// Cached summaries for a link, most recent first.
    pub async fn get_by_link(&self, link_id: &str) -> Result<Vec<Summary>> {
        Ok(self.summaries.get_summaries(link_id).await?)
    }

    /// Store a reusable custom prompt template under a name.
    pub async fn save_custom_prompt(&self, name: &str, prompt: &str) -> Result<()> {
        self.prompts.put(&prompt_key(name), prompt.to_string()).await?;
        Ok(())
    }

    pub async fn load_custom_prompt(&self, name: &str) -> Result<Option<String>> {
        Ok(self.prompts.get(&prompt_key(name)).await?)
    }

    /// Page text to summarize: cached extracted text, else the link's
    /// description, else just its metadata line. Cache failures count
    /// as absent.
    async fn source_text(&self, link: &Link) -> String {
        match self.page_text.get_extracted_text(&link.url).await {
            Ok(Some(text)) => text,
            Ok(None) => link.description.clone().unwrap_or_default(),
            Err(e) => {
                debug!(link = %link.id, "page text lookup failed: {}", e);
                link.description.clone().unwrap_or_default()
            }
        }
    }
}

fn prompt_key(name: &str) -> String {
    format!("custom_prompt:{}", name)
}

fn cap(text: &str, max_chars: usize) -> String {
    match text.char_indices().nth(max_chars) {
        Some((byte_idx, _)) => text[..byte_idx].to_string(),
        None => text.to_string(),
    }
}
