use std::collections::HashMap;
use std::fmt;

use once_cell::sync::Lazy;
use regex::Regex;
use serde::ser::SerializeMap;
use serde::{Deserialize, Serialize, Serializer};

// ---------------------------------------------------------------------------
// Data structures
// ---------------------------------------------------------------------------

/// Text and optional page metadata submitted for analysis.
///
/// Empty strings mean "not provided" for every optional field.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct AnalysisInput {
    pub content: String,
    pub target_keyword: String,
    pub meta_title: String,
    pub meta_description: String,
}

impl AnalysisInput {
    pub fn new(content: impl Into<String>) -> Self {
        Self {
            content: content.into(),
            ..Self::default()
        }
    }

    pub fn with_target_keyword(mut self, keyword: impl Into<String>) -> Self {
        self.target_keyword = keyword.into();
        self
    }

    pub fn with_meta_title(mut self, title: impl Into<String>) -> Self {
        self.meta_title = title.into();
        self
    }

    pub fn with_meta_description(mut self, description: impl Into<String>) -> Self {
        self.meta_description = description.into();
        self
    }
}

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum AnalysisError {
    #[error("content is empty; provide some text to analyze")]
    EmptyContent,
}

/// Qualitative label for an overall score.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ScoreBand {
    Excellent,
    Good,
    Fair,
    NeedsImprovement,
}

impl ScoreBand {
    pub fn label(self) -> &'static str {
        match self {
            ScoreBand::Excellent => "Excellent",
            ScoreBand::Good => "Good",
            ScoreBand::Fair => "Fair",
            ScoreBand::NeedsImprovement => "Needs Improvement",
        }
    }
}

impl fmt::Display for ScoreBand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Most frequent qualifying words with their share of the total, in rank order.
///
/// Serializes as a JSON object whose keys keep the rank order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct KeywordDensity(Vec<(String, f64)>);

impl KeywordDensity {
    pub fn get(&self, word: &str) -> Option<f64> {
        self.0
            .iter()
            .find(|(w, _)| w == word)
            .map(|&(_, density)| density)
    }

    /// Density of `word`, or 0.0 when it is not among the top entries.
    pub fn density_of(&self, word: &str) -> f64 {
        self.get(word).unwrap_or(0.0)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, f64)> {
        self.0.iter().map(|(w, d)| (w.as_str(), *d))
    }
}

impl Serialize for KeywordDensity {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.0.len()))?;
        for (word, density) in &self.0 {
            map.serialize_entry(word, density)?;
        }
        map.end()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MetaAnalysis {
    pub title_length: usize,
    pub description_length: usize,
    pub title_optimal: bool,
    pub description_optimal: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ContentAnalysis {
    pub word_count: usize,
    pub paragraph_count: usize,
    pub heading_count: usize,
    pub avg_words_per_sentence: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalysisResult {
    pub overall_score: u32,
    pub band: ScoreBand,
    pub keyword_density: KeywordDensity,
    pub readability_score: u32,
    pub suggestions: Vec<String>,
    pub meta_analysis: MetaAnalysis,
    pub content_analysis: ContentAnalysis,
}

// ---------------------------------------------------------------------------
// Hyperparameters
// ---------------------------------------------------------------------------

struct Hyperparameters {
    min_word_chars: usize,
    top_keywords: usize,
    min_word_count: usize,
    min_paragraphs: usize,
    keyword_density_min: f64,
    keyword_density_max: f64,
    readability_base: f64,
    readability_sentence_weight: f64,
    readability_syllable_weight: f64,
    avg_syllables_per_word: f64,
    readability_min: f64,
    title_len_min: usize,
    title_len_max: usize,
    description_len_min: usize,
    description_len_max: usize,
    score_base: u32,
    word_count_bonus: u32,
    keyword_present_bonus: u32,
    keyword_density_bonus: u32,
    readability_bonus: u32,
    title_bonus: u32,
    score_max: u32,
    band_excellent_min: u32,
    band_good_min: u32,
    band_fair_min: u32,
}

static HP: Hyperparameters = Hyperparameters {
    min_word_chars: 4,
    top_keywords: 10,
    min_word_count: 300,
    min_paragraphs: 3,
    keyword_density_min: 0.5,
    keyword_density_max: 3.0,
    readability_base: 206.835,
    readability_sentence_weight: 1.015,
    readability_syllable_weight: 84.6,
    avg_syllables_per_word: 1.5,
    readability_min: 60.0,
    title_len_min: 30,
    title_len_max: 60,
    description_len_min: 120,
    description_len_max: 160,
    score_base: 50,
    word_count_bonus: 15,
    keyword_present_bonus: 10,
    keyword_density_bonus: 10,
    readability_bonus: 10,
    title_bonus: 5,
    score_max: 100,
    band_excellent_min: 80,
    band_good_min: 60,
    band_fair_min: 40,
};

pub const MSG_TOO_SHORT: &str = "Content is too short. Aim for at least 300 words for better SEO.";
pub const MSG_DENSITY_HIGH: &str =
    "Keyword density is too high. Reduce keyword repetition to avoid over-optimization.";
pub const MSG_DENSITY_LOW: &str =
    "Keyword density is too low. Include the target keyword more frequently.";
pub const MSG_LOW_READABILITY: &str =
    "Content readability is low. Use shorter sentences and simpler words.";
pub const MSG_TITLE_LENGTH: &str =
    "Meta title should be between 30-60 characters for optimal display in search results.";
pub const MSG_DESCRIPTION_LENGTH: &str =
    "Meta description should be between 120-160 characters for optimal display.";
pub const MSG_FEW_PARAGRAPHS: &str =
    "Break content into more paragraphs for better readability and structure.";
pub const MSG_ALL_GOOD: &str = "Great job! Your content follows good SEO practices.";

// ---------------------------------------------------------------------------
// Compiled patterns
// ---------------------------------------------------------------------------

static SENTENCE_SPLIT_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"[.!?]+").unwrap());

static PARAGRAPH_SPLIT_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\n\s*\n").unwrap());

static MD_HEADING_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?m)^#+\s").unwrap());


// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

/// Length in UTF-16 code units, the unit browser text fields report.
fn text_len(s: &str) -> usize {
    s.encode_utf16().count()
}

/// Lower-cased whitespace tokens longer than three characters. Punctuation
/// stays attached to the token.
fn qualifying_words(text: &str) -> Vec<String> {
    text.to_lowercase()
        .split_whitespace()
        .filter(|w| text_len(w) >= HP.min_word_chars)
        .map(str::to_string)
        .collect()
}

fn count_fragments(re: &Regex, text: &str) -> usize {
    re.split(text).filter(|s| !s.trim().is_empty()).count()
}

/// Word frequencies ordered by descending count; equal counts keep the order
/// in which the words first appeared.
fn rank_words(words: &[String]) -> Vec<(&str, usize)> {
    let mut index: HashMap<&str, usize> = HashMap::new();
    let mut ranked: Vec<(&str, usize)> = Vec::new();
    for word in words {
        match index.get(word.as_str()) {
            Some(&i) => ranked[i].1 += 1,
            None => {
                index.insert(word.as_str(), ranked.len());
                ranked.push((word.as_str(), 1));
            }
        }
    }
    // sort_by is stable
    ranked.sort_by(|a, b| b.1.cmp(&a.1));
    ranked
}

fn percent(part: usize, whole: usize) -> f64 {
    part as f64 / whole.max(1) as f64 * 100.0
}

fn round_one_decimal(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}

fn readability(avg_words_per_sentence: f64) -> f64 {
    let raw = HP.readability_base
        - HP.readability_sentence_weight * avg_words_per_sentence
        - HP.readability_syllable_weight * HP.avg_syllables_per_word;
    raw.clamp(0.0, 100.0)
}

fn in_range(len: usize, min: usize, max: usize) -> bool {
    (min..=max).contains(&len)
}

fn band_for_score(score: u32) -> ScoreBand {
    if score >= HP.band_excellent_min {
        ScoreBand::Excellent
    } else if score >= HP.band_good_min {
        ScoreBand::Good
    } else if score >= HP.band_fair_min {
        ScoreBand::Fair
    } else {
        ScoreBand::NeedsImprovement
    }
}

// ---------------------------------------------------------------------------
// Metrics
// ---------------------------------------------------------------------------

struct KeywordCheck<'a> {
    keyword: &'a str,
    present: bool,
    density: f64,
}

impl KeywordCheck<'_> {
    fn density_in_range(&self) -> bool {
        (HP.keyword_density_min..=HP.keyword_density_max).contains(&self.density)
    }
}

struct Metrics<'a> {
    word_count: usize,
    paragraph_count: usize,
    readability: f64,
    keyword: Option<KeywordCheck<'a>>,
    title_len: usize,
    description_len: usize,
}

// ---------------------------------------------------------------------------
// Suggestion rules
// ---------------------------------------------------------------------------

type Rule = fn(&Metrics<'_>) -> Option<String>;

fn rule_word_count(m: &Metrics<'_>) -> Option<String> {
    (m.word_count < HP.min_word_count).then(|| MSG_TOO_SHORT.to_string())
}

fn rule_keyword_missing(m: &Metrics<'_>) -> Option<String> {
    let kw = m.keyword.as_ref()?;
    (!kw.present).then(|| {
        format!(
            "Target keyword \"{}\" not found in content. Include it naturally.",
            kw.keyword
        )
    })
}

fn rule_keyword_density_high(m: &Metrics<'_>) -> Option<String> {
    let kw = m.keyword.as_ref()?;
    (kw.density > HP.keyword_density_max).then(|| MSG_DENSITY_HIGH.to_string())
}

fn rule_keyword_density_low(m: &Metrics<'_>) -> Option<String> {
    let kw = m.keyword.as_ref()?;
    (kw.density < HP.keyword_density_min).then(|| MSG_DENSITY_LOW.to_string())
}

fn rule_readability(m: &Metrics<'_>) -> Option<String> {
    (m.readability < HP.readability_min).then(|| MSG_LOW_READABILITY.to_string())
}

fn rule_meta_title(m: &Metrics<'_>) -> Option<String> {
    (!in_range(m.title_len, HP.title_len_min, HP.title_len_max))
        .then(|| MSG_TITLE_LENGTH.to_string())
}

fn rule_meta_description(m: &Metrics<'_>) -> Option<String> {
    (!in_range(
        m.description_len,
        HP.description_len_min,
        HP.description_len_max,
    ))
    .then(|| MSG_DESCRIPTION_LENGTH.to_string())
}

fn rule_paragraphs(m: &Metrics<'_>) -> Option<String> {
    (m.paragraph_count < HP.min_paragraphs).then(|| MSG_FEW_PARAGRAPHS.to_string())
}

// Evaluation order is the order suggestions are reported in.
const RULES: &[Rule] = &[
    rule_word_count,
    rule_keyword_missing,
    rule_keyword_density_high,
    rule_keyword_density_low,
    rule_readability,
    rule_meta_title,
    rule_meta_description,
    rule_paragraphs,
];

fn suggestions_for(m: &Metrics<'_>) -> Vec<String> {
    let mut suggestions: Vec<String> = RULES.iter().filter_map(|rule| rule(m)).collect();
    if suggestions.is_empty() {
        suggestions.push(MSG_ALL_GOOD.to_string());
    }
    suggestions
}

// ---------------------------------------------------------------------------
// Scoring
// ---------------------------------------------------------------------------

fn overall_score(m: &Metrics<'_>) -> u32 {
    let mut score = HP.score_base;
    if m.word_count >= HP.min_word_count {
        score += HP.word_count_bonus;
    }
    if let Some(kw) = &m.keyword {
        if kw.present {
            score += HP.keyword_present_bonus;
        }
        if kw.density_in_range() {
            score += HP.keyword_density_bonus;
        }
    }
    if m.readability >= HP.readability_min {
        score += HP.readability_bonus;
    }
    if in_range(m.title_len, HP.title_len_min, HP.title_len_max) {
        score += HP.title_bonus;
    }
    score.min(HP.score_max)
}

// ---------------------------------------------------------------------------
// Public API
// ---------------------------------------------------------------------------

/// Score `input` for basic on-page SEO quality.
///
/// Returns [`AnalysisError::EmptyContent`] when the content is blank; every
/// other input produces a complete result.
pub fn analyze(input: &AnalysisInput) -> Result<AnalysisResult, AnalysisError> {
    if input.content.trim().is_empty() {
        log::debug!("rejecting blank content");
        return Err(AnalysisError::EmptyContent);
    }
    let content = input.content.as_str();

    let words = qualifying_words(content);
    let word_count = words.len();
    let sentence_count = count_fragments(&SENTENCE_SPLIT_RE, content);
    let paragraph_count = count_fragments(&PARAGRAPH_SPLIT_RE, content);
    let heading_count = MD_HEADING_RE.find_iter(content).count();

    let ranked = rank_words(&words);
    let keyword_density = KeywordDensity(
        ranked
            .iter()
            .take(HP.top_keywords)
            .map(|&(word, count)| {
                (
                    word.to_string(),
                    round_one_decimal(percent(count, word_count)),
                )
            })
            .collect(),
    );

    let avg_words_per_sentence = word_count as f64 / sentence_count.max(1) as f64;
    let readability = readability(avg_words_per_sentence);

    let keyword = match input.target_keyword.trim() {
        "" => None,
        kw => {
            let needle = kw.to_lowercase();
            let occurrences = ranked
                .iter()
                .find(|(word, _)| *word == needle)
                .map_or(0, |&(_, count)| count);
            Some(KeywordCheck {
                keyword: kw,
                present: content.to_lowercase().contains(&needle),
                density: percent(occurrences, word_count),
            })
        }
    };

    let metrics = Metrics {
        word_count,
        paragraph_count,
        readability,
        keyword,
        title_len: text_len(&input.meta_title),
        description_len: text_len(&input.meta_description),
    };

    log::debug!(
        "analyzed {word_count} qualifying words, {sentence_count} sentences, \
         {paragraph_count} paragraphs, {heading_count} headings"
    );
    if let Some(kw) = &metrics.keyword {
        log::trace!(
            "target keyword {:?}: present={} density={:.2}%",
            kw.keyword,
            kw.present,
            kw.density
        );
    }

    let suggestions = suggestions_for(&metrics);
    let overall_score = overall_score(&metrics);
    log::debug!(
        "overall score {overall_score} with {} suggestion(s)",
        suggestions.len()
    );

    Ok(AnalysisResult {
        overall_score,
        band: band_for_score(overall_score),
        keyword_density,
        readability_score: readability.round() as u32,
        suggestions,
        meta_analysis: MetaAnalysis {
            title_length: metrics.title_len,
            description_length: metrics.description_len,
            title_optimal: in_range(metrics.title_len, HP.title_len_min, HP.title_len_max),
            description_optimal: in_range(
                metrics.description_len,
                HP.description_len_min,
                HP.description_len_max,
            ),
        },
        content_analysis: ContentAnalysis {
            word_count,
            paragraph_count,
            heading_count,
            avg_words_per_sentence: avg_words_per_sentence.round() as usize,
        },
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tokenizer_keeps_punctuation_and_drops_short_tokens() {
        let words = qualifying_words("The (quick) brown fox's \"jumps\" over... it.");
        assert_eq!(
            words,
            vec!["(quick)", "brown", "fox's", "\"jumps\"", "over..."]
        );
    }

    #[test]
    fn lengths_count_utf16_units() {
        // three units, six bytes
        assert!(qualifying_words("été").is_empty());
        assert_eq!(qualifying_words("café"), vec!["café"]);
        // one char outside the BMP is two units
        assert_eq!(text_len("😀"), 2);
        assert_eq!(qualifying_words("a😀b"), vec!["a😀b"]);
    }

    #[test]
    fn ranking_breaks_ties_by_first_occurrence() {
        let words: Vec<String> = ["beta", "alpha", "gamma", "alpha", "beta", "delta"]
            .iter()
            .map(|s| s.to_string())
            .collect();
        let ranked = rank_words(&words);
        assert_eq!(
            ranked,
            vec![("beta", 2), ("alpha", 2), ("gamma", 1), ("delta", 1)]
        );
    }

    #[test]
    fn readability_is_clamped() {
        assert_eq!(readability(500.0), 0.0);
        assert!(readability(0.0) <= 100.0);
        assert!((readability(0.0) - 79.935).abs() < 1e-9);
    }

    #[test]
    fn percent_guards_zero_denominator() {
        assert_eq!(percent(0, 0), 0.0);
        assert!((percent(3, 300) - 1.0).abs() < 1e-9);
    }

    #[test]
    fn bands_follow_thresholds() {
        assert_eq!(band_for_score(100), ScoreBand::Excellent);
        assert_eq!(band_for_score(80), ScoreBand::Excellent);
        assert_eq!(band_for_score(79), ScoreBand::Good);
        assert_eq!(band_for_score(60), ScoreBand::Good);
        assert_eq!(band_for_score(45), ScoreBand::Fair);
        assert_eq!(band_for_score(39), ScoreBand::NeedsImprovement);
    }
}
