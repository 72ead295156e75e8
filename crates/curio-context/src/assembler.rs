use std::sync::Arc;

use tiktoken_rs::{cl100k_base, CoreBPE};
use tracing::debug;

use curio_store::{Link, PageTextCache, SummaryKind, SummaryStore};

use crate::templates::RESEARCH_ASSISTANT_PREAMBLE;

const DEFAULT_EXCERPT_BUDGET: usize = 1500;
const DEFAULT_PROMPT_TOKEN_BUDGET: usize = 6000;

/// Builds the system prompt for a set of links: a fixed preamble, then
/// per link its metadata plus either the preferred cached summary or a
/// truncated excerpt of cached page text.
///
/// Assembly is best-effort per link: a failed summary or page-text
/// lookup only drops that link's optional context section, never the
/// whole prompt. The result is attached as a system-role message per
/// provider call and is never persisted.
pub struct ContextAssembler {
    summaries: Arc<dyn SummaryStore>,
    page_text: Arc<dyn PageTextCache>,
    excerpt_budget: usize,
    prompt_token_budget: usize,
    bpe: Option<CoreBPE>,
}

impl ContextAssembler {
    pub fn new(summaries: Arc<dyn SummaryStore>, page_text: Arc<dyn PageTextCache>) -> Self {
        Self {
            summaries,
            page_text,
            excerpt_budget: DEFAULT_EXCERPT_BUDGET,
            prompt_token_budget: DEFAULT_PROMPT_TOKEN_BUDGET,
            bpe: cl100k_base().ok(),
        }
    }

    /// Character budget for raw excerpts, clamped to a sane range.
    pub fn with_excerpt_budget(mut self, chars: usize) -> Self {
        self.excerpt_budget = chars.clamp(800, 3000);
        self
    }

    /// Overall prompt ceiling; once reached, remaining links contribute
    /// metadata only.
    pub fn with_prompt_token_budget(mut self, tokens: usize) -> Self {
        self.prompt_token_budget = tokens;
        self
    }

    pub async fn build_system_prompt(&self, links: &[Link]) -> String {
        let mut prompt = String::from(RESEARCH_ASSISTANT_PREAMBLE);
        let mut tokens_used = self.count_tokens(&prompt);

        for link in links {
            let metadata = Self::metadata_section(link);
            tokens_used += self.count_tokens(&metadata);
            prompt.push_str(&metadata);

            if tokens_used >= self.prompt_token_budget {
                debug!(link = %link.id, "prompt budget reached, metadata only");
                continue;
            }

            if let Some(body) = self.page_context(link).await {
                tokens_used += self.count_tokens(&body);
                prompt.push_str("Context:\n");
                prompt.push_str(&body);
                prompt.push('\n');
            }
        }

        prompt
    }

    fn metadata_section(link: &Link) -> String {
        let mut section = format!("\n---\nURL: {}\n", link.url);

        if let Some(title) = &link.title {
            section.push_str(&format!("Title: {}\n", title));
        }
        if let Some(description) = &link.description {
            section.push_str(&format!("Description: {}\n", description));
        }
        if !link.labels.is_empty() {
            section.push_str(&format!("Labels: {}\n", link.labels.join(", ")));
        }
        if let Some(notes) = &link.notes {
            section.push_str(&format!("Notes: {}\n", notes));
        }

        section
    }

    /// Preferred context body: a tl;dr summary if one is cached, else a
    /// raw full-text summary row, else cached extracted page text; the
    /// latter two truncated to the excerpt budget. Lookup failures are
    /// swallowed so one link's missing data never blocks the rest.
    async fn page_context(&self, link: &Link) -> Option<String> {
        match self.summaries.get_summaries(&link.id).await {
            Ok(summaries) => {
                if let Some(tldr) = summaries.iter().find(|s| s.kind == SummaryKind::Tldr) {
                    return Some(tldr.content.clone());
                }
                if let Some(raw) = summaries.iter().find(|s| s.kind == SummaryKind::Raw) {
                    return Some(truncate_chars(&raw.content, self.excerpt_budget));
                }
            }
            Err(e) => {
                debug!(link = %link.id, "summary lookup failed: {}", e);
            }
        }

        match self.page_text.get_extracted_text(&link.url).await {
            Ok(Some(text)) => Some(truncate_chars(&text, self.excerpt_budget)),
            Ok(None) => None,
            Err(e) => {
                debug!(link = %link.id, "page text lookup failed: {}", e);
                None
            }
        }
    }

    fn count_tokens(&self, text: &str) -> usize {
        match &self.bpe {
            Some(bpe) => bpe.encode_with_special_tokens(text).len(),
            // rough fallback: 1 token ~ 4 characters
            None => text.len() / 4,
        }
    }
}

/// Truncate on a character boundary, marking the cut.
fn truncate_chars(text: &str, max_chars: usize) -> String {
    match text.char_indices().nth(max_chars) {
        Some((byte_idx, _)) => {
            let mut truncated = text[..byte_idx].trim_end().to_string();
            truncated.push_str(" [...]");
            truncated
        }
        None => text.to_string(),
    }
}
