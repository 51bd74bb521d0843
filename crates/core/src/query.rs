use regex::Regex;
use std::sync::OnceLock;

/// A single match condition. Every term of a query must hold for an entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum QueryTerm {
    And(String),
    Not(String),
    Or(Vec<String>),
    Phrase(String),
}

impl QueryTerm {
    /// `haystack` is expected to be lower-cased already.
    pub fn matches(&self, haystack: &str) -> bool {
        match self {
            QueryTerm::And(word) => haystack.contains(word.as_str()),
            QueryTerm::Not(word) => !haystack.contains(word.as_str()),
            QueryTerm::Or(words) => words.iter().any(|word| haystack.contains(word.as_str())),
            QueryTerm::Phrase(phrase) => haystack.contains(phrase.as_str()),
        }
    }
}

fn phrase_regex() -> &'static Regex {
    static PHRASE: OnceLock<Regex> = OnceLock::new();
    PHRASE.get_or_init(|| Regex::new(r#""([^"]+)""#).expect("phrase pattern is valid"))
}

fn exclusion_regex() -> &'static Regex {
    static EXCLUSION: OnceLock<Regex> = OnceLock::new();
    EXCLUSION.get_or_init(|| Regex::new(r"-(\w+)").expect("exclusion pattern is valid"))
}

fn is_noise_word(token: &str) -> bool {
    token == "and" || token == "or"
}

/// Parses a free-text query into terms.
///
/// Phrases are pulled out first, then `-word` exclusions, and only then is the
/// rest split on whitespace into `a|b` alternatives and plain required words.
pub fn parse_query(query: &str) -> Vec<QueryTerm> {
    let lowered = query.to_lowercase();
    let mut terms = Vec::new();

    for capture in phrase_regex().captures_iter(&lowered) {
        terms.push(QueryTerm::Phrase(capture[1].to_string()));
    }
    let working = phrase_regex().replace_all(&lowered, " ");

    for capture in exclusion_regex().captures_iter(&working) {
        terms.push(QueryTerm::Not(capture[1].to_string()));
    }
    let working = exclusion_regex().replace_all(&working, " ");

    for token in working.split_whitespace() {
        if token.contains('|') {
            let alternatives = token
                .split('|')
                .filter(|word| !word.is_empty())
                .map(str::to_string)
                .collect::<Vec<_>>();
            if !alternatives.is_empty() {
                terms.push(QueryTerm::Or(alternatives));
            }
        } else if !is_noise_word(token) {
            terms.push(QueryTerm::And(token.to_string()));
        }
    }

    terms
}
