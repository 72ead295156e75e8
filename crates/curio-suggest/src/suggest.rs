use std::collections::HashMap;

use curio_store::{Draft, Link, Priority};
use serde::Serialize;

use crate::similarity::cosine_similarity;
use crate::text::{frequency, tokenize};

pub const DEFAULT_MAX_LABEL_SUGGESTIONS: usize = 6;
pub const DEFAULT_RANKING_TOP_K: usize = 10;
pub const DEFAULT_BOARD_TOP_K: usize = 12;

/// A saved link flattened into suggestion input, optionally enriched
/// with its cached summary text. The suggestion functions are pure over
/// this in-memory candidate set.
#[derive(Debug, Clone)]
pub struct CandidateLink {
    pub url: String,
    pub title: Option<String>,
    pub description: Option<String>,
    pub summary: Option<String>,
    pub labels: Vec<String>,
    pub priority: Option<Priority>,
    pub board_id: Option<String>,
}

impl CandidateLink {
    pub fn from_link(link: &Link, summary: Option<String>) -> Self {
        Self {
            url: link.url.clone(),
            title: link.title.clone(),
            description: link.description.clone(),
            summary,
            labels: link.labels.clone(),
            priority: link.priority,
            board_id: link.board_id.clone(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LabelSuggestion {
    pub label: String,
    pub score: f64,
}

/// Rank labels for a draft by accumulating each similar candidate's
/// labels weighted by its similarity score. Returns at most
/// `max_suggestions` labels; only candidates scoring above zero
/// contribute. Ties keep first-appearance order.
pub fn suggest_labels(
    draft: &Draft,
    candidates: &[CandidateLink],
    max_suggestions: usize,
    top_k: usize,
) -> Vec<LabelSuggestion> {
    let ranked = rank(draft, candidates, top_k);

    let mut accumulated: Vec<LabelSuggestion> = Vec::new();
    for (idx, score) in &ranked {
        for label in &candidates[*idx].labels {
            match accumulated.iter_mut().find(|s| s.label == *label) {
                Some(entry) => entry.score += score,
                None => accumulated.push(LabelSuggestion {
                    label: label.clone(),
                    score: *score,
                }),
            }
        }
    }

    // stable sort keeps insertion order on equal scores
    accumulated.sort_by(|a, b| b.score.partial_cmp(&a.score).unwrap_or(std::cmp::Ordering::Equal));
    accumulated.truncate(max_suggestions);
    accumulated
}

/// Majority vote over the top-k most similar candidates' priorities.
/// Ties resolve in `Priority` declaration order; `None` when nothing
/// scored above zero or no similar candidate has a priority.
pub fn suggest_priority(
    draft: &Draft,
    candidates: &[CandidateLink],
    top_k: usize,
) -> Option<Priority> {
    let ranked = rank(draft, candidates, top_k);

    let mut votes: Vec<(Priority, usize)> = vec![
        (Priority::Low, 0),
        (Priority::Medium, 0),
        (Priority::High, 0),
    ];
    for (idx, _) in &ranked {
        if let Some(priority) = candidates[*idx].priority {
            for vote in votes.iter_mut() {
                if vote.0 == priority {
                    vote.1 += 1;
                }
            }
        }
    }

    let mut best: Option<(Priority, usize)> = None;
    for (priority, count) in votes {
        if count > 0 && best.map_or(true, |(_, top)| count > top) {
            best = Some((priority, count));
        }
    }
    best.map(|(priority, _)| priority)
}

/// Highest-scoring board among similar candidates that have one, with
/// similarity accumulated per board id. `None` when no similar
/// candidate carries a board.
pub fn suggest_board(
    draft: &Draft,
    candidates: &[CandidateLink],
    top_k: usize,
) -> Option<String> {
    let with_board: Vec<CandidateLink> = candidates
        .iter()
        .filter(|c| c.board_id.is_some())
        .cloned()
        .collect();
    let ranked = rank(draft, &with_board, top_k);

    let mut accumulated: Vec<(String, f64)> = Vec::new();
    for (idx, score) in &ranked {
        if let Some(board_id) = &with_board[*idx].board_id {
            match accumulated.iter_mut().find(|(id, _)| id == board_id) {
                Some(entry) => entry.1 += score,
                None => accumulated.push((board_id.clone(), *score)),
            }
        }
    }

    let mut best: Option<(String, f64)> = None;
    for (board_id, score) in accumulated {
        if best.as_ref().map_or(true, |(_, top)| score > *top) {
            best = Some((board_id, score));
        }
    }
    best.map(|(board_id, _)| board_id)
}

/// Score every candidate against the draft, keep scores above zero,
/// sort descending (stable, so equal scores keep candidate order) and
/// cap at `top_k`. Returns `(candidate index, score)` pairs.
fn rank(draft: &Draft, candidates: &[CandidateLink], top_k: usize) -> Vec<(usize, f64)> {
    let draft_freq = draft_vector(draft);
    if draft_freq.is_empty() {
        return Vec::new();
    }

    let mut scored: Vec<(usize, f64)> = candidates
        .iter()
        .enumerate()
        .map(|(idx, candidate)| (idx, cosine_similarity(&draft_freq, &candidate_vector(candidate))))
        .filter(|(_, score)| *score > 0.0)
        .collect();

    scored.sort_by(|a, b| b.1.partial_cmp(&a.1).unwrap_or(std::cmp::Ordering::Equal));
    scored.truncate(top_k);
    scored
}

fn draft_vector(draft: &Draft) -> HashMap<String, usize> {
    let mut text = String::new();
    if let Some(title) = &draft.title {
        text.push_str(title);
        text.push(' ');
    }
    if let Some(description) = &draft.description {
        text.push_str(description);
        text.push(' ');
    }
    text.push_str(&host_words(&draft.url));

    frequency(&tokenize(&text))
}

fn candidate_vector(candidate: &CandidateLink) -> HashMap<String, usize> {
    let mut text = String::new();
    if let Some(title) = &candidate.title {
        text.push_str(title);
        text.push(' ');
    }
    if let Some(description) = &candidate.description {
        text.push_str(description);
        text.push(' ');
    }
    if let Some(summary) = &candidate.summary {
        text.push_str(summary);
        text.push(' ');
    }
    text.push_str(&url_words(&candidate.url));

    frequency(&tokenize(&text))
}

/// Words from the URL host, minus the scheme, a leading `www` and the
/// trailing TLD segment.
fn host_words(url: &str) -> String {
    let rest = url.split("://").nth(1).unwrap_or(url);
    let host = rest.split('/').next().unwrap_or(rest);

    let mut segments: Vec<&str> = host.split('.').collect();
    if segments.len() > 1 {
        segments.pop();
    }
    segments.retain(|s| *s != "www");
    segments.join(" ")
}

/// Whole URL flattened into words (the tokenizer would otherwise strip
/// it as a URL).
fn url_words(url: &str) -> String {
    let rest = url.split("://").nth(1).unwrap_or(url);
    rest.chars()
        .map(|c| if c.is_alphanumeric() || c == '-' { c } else { ' ' })
        .collect()
}
