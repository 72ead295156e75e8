use std::collections::HashMap;

/// Common English function words dropped during tokenization. Words
/// shorter than three characters never reach this list.
const STOP_WORDS: &[&str] = &[
    "the", "and", "for", "are", "but", "not", "you", "all", "any", "can", "had", "has", "have",
    "been", "was", "were", "will", "would", "could", "should", "may", "might", "must", "shall",
    "this", "that", "these", "those", "they", "them", "their", "there", "then", "than", "what",
    "when", "where", "which", "while", "who", "whom", "why", "how", "with", "from", "into",
    "through", "during", "before", "after", "above", "below", "between", "under", "over",
    "again", "further", "once", "here", "some", "other", "more", "most", "very", "just", "also",
    "each", "every", "both", "does", "doing", "being", "because", "about", "against", "until",
    "such", "only", "own", "same", "too", "now", "out", "off", "our", "ours", "your", "yours",
    "his", "her", "hers", "its", "him", "she", "one", "two", "get", "like", "said", "say",
];

fn is_stop_word(word: &str) -> bool {
    STOP_WORDS.contains(&word)
}

/// Break free text into lowercase tokens: URLs and `<...>` markup are
/// stripped, anything but letters, digits and hyphens separates, and
/// tokens shorter than three characters or on the stop list are dropped.
/// Deterministic; empty input yields no tokens.
pub fn tokenize(text: &str) -> Vec<String> {
    let lowered = text.to_lowercase();
    let stripped = strip_markup(&lowered);

    let mut tokens = Vec::new();
    for word in stripped.split_whitespace() {
        if word.starts_with("http://") || word.starts_with("https://") || word.starts_with("www.")
        {
            continue;
        }

        let cleaned: String = word
            .chars()
            .map(|c| if c.is_alphanumeric() || c == '-' { c } else { ' ' })
            .collect();

        for part in cleaned.split_whitespace() {
            let part = part.trim_matches('-');
            if part.chars().count() >= 3 && !is_stop_word(part) {
                tokens.push(part.to_string());
            }
        }
    }

    tokens
}

/// Drop `<...>` spans, replacing each tag with a separator.
fn strip_markup(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut in_tag = false;

    for c in text.chars() {
        match c {
            '<' => in_tag = true,
            '>' if in_tag => {
                in_tag = false;
                out.push(' ');
            }
            _ if !in_tag => out.push(c),
            _ => {}
        }
    }

    out
}

/// Bag-of-words counts over a token sequence.
pub fn frequency(tokens: &[String]) -> HashMap<String, usize> {
    let mut freq = HashMap::new();
    for token in tokens {
        *freq.entry(token.clone()).or_insert(0) += 1;
    }
    freq
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_input_yields_no_tokens() {
        assert!(tokenize("").is_empty());
        assert!(frequency(&[]).is_empty());
    }

    #[test]
    fn test_short_and_stop_words_dropped() {
        let tokens = tokenize("the quick brown fox is on a roll");
        assert!(tokens.iter().all(|t| t.chars().count() >= 3));
        assert!(!tokens.contains(&"the".to_string()));
        assert_eq!(tokens, vec!["quick", "brown", "fox", "roll"]);
    }

    #[test]
    fn test_urls_and_markup_stripped() {
        let tokens = tokenize("read <b>this article</b> at https://example.com/post now");
        assert!(tokens.contains(&"article".to_string()));
        assert!(!tokens.iter().any(|t| t.contains("example")));
        assert!(!tokens.iter().any(|t| t.contains("<")));
    }

    #[test]
    fn test_hyphenated_words_survive() {
        let tokens = tokenize("state-of-the-art --decorated--");
        assert!(tokens.contains(&"state-of-the-art".to_string()));
        assert!(tokens.contains(&"decorated".to_string()));
    }

    #[test]
    fn test_punctuation_separates() {
        let tokens = tokenize("async/await; tokio, rust!");
        assert_eq!(tokens, vec!["async", "await", "tokio", "rust"]);
    }

    #[test]
    fn test_frequency_counts() {
        let freq = frequency(&tokenize("rust loves rust"));
        assert_eq!(freq.get("rust"), Some(&2));
        assert_eq!(freq.get("loves"), Some(&1));
    }
}
