use std::collections::{HashMap, HashSet};

/// Common French and English words left out of the word cloud.
pub const EXCLUDED_WORDS: &[&str] = &[
    // French
    "alors", "aussi", "autre", "autres", "avant", "avec", "avoir", "beaucoup", "bien", "cela",
    "celle", "celui", "cette", "ceux", "chez", "comme", "comment", "dans", "depuis", "donc",
    "elle", "elles", "encore", "entre", "être", "faire", "fait", "leur", "leurs", "mais",
    "même", "moins", "nous", "notre", "nos", "parce", "pour", "plus", "quand", "quel", "quelle",
    "quels", "quelles", "rien", "sans", "sera", "selon", "sont", "sous", "suis", "tous", "tout",
    "toute", "toutes", "très", "vers", "votre", "vous", "ça", "était", "avait", "peut", "faut",
    "ceci", "juste", "ainsi", "déjà", "après", "contre", "pendant", "lors", "dont",
    // English
    "about", "after", "also", "been", "before", "being", "does", "from", "have", "here", "into",
    "just", "like", "more", "most", "much", "only", "other", "over", "some", "such", "than",
    "that", "their", "them", "then", "there", "these", "they", "this", "those", "very", "what",
    "when", "where", "which", "while", "will", "with", "would", "your", "were", "could",
    "should",
];

const MIN_WORD_CHARS: usize = 4;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WordCount {
    pub word: String,
    pub count: usize,
}

/// Counts significant words across `texts`, most frequent first.
///
/// A word is significant when it has more than three characters, is not in
/// [`EXCLUDED_WORDS`], and is not a mention, hashtag, link or number.
/// Ties are broken alphabetically so the order is deterministic.
pub fn word_frequencies<'a>(texts: impl IntoIterator<Item = &'a str>) -> Vec<WordCount> {
    let excluded: HashSet<&str> = EXCLUDED_WORDS.iter().copied().collect();
    let mut counts: HashMap<String, usize> = HashMap::new();

    for text in texts {
        for raw in text.split_whitespace() {
            if is_mention_tag_or_link(raw) {
                continue;
            }
            let word = normalize(raw);
            if word.chars().count() < MIN_WORD_CHARS
                || excluded.contains(word.as_str())
                || word.chars().all(|c| c.is_numeric())
            {
                continue;
            }
            *counts.entry(word).or_insert(0) += 1;
        }
    }

    let mut ranked: Vec<WordCount> = counts
        .into_iter()
        .map(|(word, count)| WordCount { word, count })
        .collect();
    ranked.sort_by(|a, b| b.count.cmp(&a.count).then_with(|| a.word.cmp(&b.word)));
    ranked
}

pub fn top_words<'a>(texts: impl IntoIterator<Item = &'a str>, limit: usize) -> Vec<WordCount> {
    let mut ranked = word_frequencies(texts);
    ranked.truncate(limit);
    ranked
}

fn is_mention_tag_or_link(raw: &str) -> bool {
    let lower = raw.to_lowercase();
    lower.starts_with('@')
        || lower.starts_with('#')
        || lower.starts_with("http://")
        || lower.starts_with("https://")
        || lower.starts_with("www.")
        || lower.contains("://")
}

fn normalize(raw: &str) -> String {
    // Keep inner apostrophes and hyphens ("aujourd'hui", "week-end").
    raw.trim_matches(|c: char| !c.is_alphanumeric())
        .to_lowercase()
        .replace('’', "'")
}
