//! Maps a free-form course name to the numeric selector the extractor bot expects.

use lazy_static::lazy_static;
use regex::Regex;

lazy_static! {
    static ref SELECTOR: Regex = Regex::new(r"^\s*(\d+)\s*[.):]").expect("selector pattern");
}

/// Leading numeric token of a listing line, e.g. `"12) Arjuna"` → `"12"`.
pub fn selector_of(line: &str) -> Option<&str> {
    SELECTOR
        .captures(line)
        .and_then(|c| c.get(1))
        .map(|m| m.as_str())
}

/// Resolves `target` against a listing with one course per line.
///
/// An exact (case-insensitive) substring hit on a numbered line always wins. Otherwise lines are
/// scored by how many target words longer than three characters they contain; the first best
/// line is accepted when it covers at least half of those words.
pub fn resolve_batch(listing: &str, target: &str) -> Option<String> {
    let lines: Vec<&str> = listing.trim().lines().collect();
    let target_lower = target.to_lowercase();

    if let Some(selector) = lines
        .iter()
        .filter(|line| line.to_lowercase().contains(&target_lower))
        .find_map(|line| selector_of(line))
    {
        return Some(selector.to_string());
    }

    let words: Vec<&str> = target_lower
        .split_whitespace()
        .filter(|w| w.chars().count() > 3)
        .collect();
    let threshold = (words.len() / 2).max(1);

    let mut best_score = 0;
    let mut best_line = None;
    for line in &lines {
        let lower = line.to_lowercase();
        let score = words.iter().filter(|w| lower.contains(*w)).count();
        if score > best_score && score >= threshold {
            best_score = score;
            best_line = Some(*line);
        }
    }

    best_line.and_then(selector_of).map(str::to_string)
}
