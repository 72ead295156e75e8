use std::collections::HashMap;

/// Cosine similarity between two frequency vectors: dot product over
/// shared keys divided by the product of the Euclidean norms. Always in
/// `[0, 1]`; returns 0.0 when either vector is all-zero.
pub fn cosine_similarity(a: &HashMap<String, usize>, b: &HashMap<String, usize>) -> f64 {
    if a.is_empty() || b.is_empty() {
        return 0.0;
    }

    let dot: f64 = a
        .iter()
        .filter_map(|(key, &va)| b.get(key).map(|&vb| va as f64 * vb as f64))
        .sum();
    if dot == 0.0 {
        return 0.0;
    }

    let norm_a = norm(a);
    let norm_b = norm(b);
    if norm_a == 0.0 || norm_b == 0.0 {
        return 0.0;
    }

    (dot / (norm_a * norm_b)).clamp(0.0, 1.0)
}

fn norm(v: &HashMap<String, usize>) -> f64 {
    v.values().map(|&n| (n as f64) * (n as f64)).sum::<f64>().sqrt()
}
