mod similarity;
mod suggest;
mod text;

pub use similarity::cosine_similarity;
pub use suggest::{
    suggest_board, suggest_labels, suggest_priority, CandidateLink, LabelSuggestion,
    DEFAULT_BOARD_TOP_K, DEFAULT_MAX_LABEL_SUGGESTIONS, DEFAULT_RANKING_TOP_K,
};
pub use text::{frequency, tokenize};
