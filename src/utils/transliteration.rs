//! Serbian Latin → Cyrillic transliteration
//!
//! School names in the source data are mostly written in Cyrillic, while users
//! usually type Latin (often without diacritics). Search therefore works on a
//! small candidate set: every plausible Cyrillic spelling of the query plus the
//! raw lowercased query, matched as substrings.
//!
//! Rules are applied in order: digraphs first (so `nj` becomes `њ` and never
//! `нј`), then single letters.

use smallvec::SmallVec;

/// Multi-letter Latin sequences that map to a single Cyrillic letter.
/// Must run before the single-letter table.
const DIGRAPHS: [(&str, &str); 9] = [
    ("nj", "њ"),
    ("Nj", "Њ"),
    ("NJ", "Њ"),
    ("lj", "љ"),
    ("Lj", "Љ"),
    ("LJ", "Љ"),
    ("dž", "џ"),
    ("Dž", "Џ"),
    ("DŽ", "Џ"),
];

/// Candidate spellings for one query (at most four: transliteration, ć/č
/// variants and the raw text).
pub type SearchVariants = SmallVec<[String; 4]>;

fn letter_to_cyrillic(c: char) -> char {
    match c {
        'a' => 'а', 'b' => 'б', 'v' => 'в', 'g' => 'г', 'd' => 'д', 'đ' => 'ђ',
        'e' => 'е', 'ž' => 'ж', 'z' => 'з', 'i' => 'и', 'j' => 'ј', 'k' => 'к',
        'l' => 'л', 'm' => 'м', 'n' => 'н', 'o' => 'о', 'p' => 'п', 'r' => 'р',
        's' => 'с', 't' => 'т', 'ć' => 'ћ', 'u' => 'у', 'f' => 'ф', 'h' => 'х',
        'c' => 'ц', 'č' => 'ч', 'š' => 'ш',
        'A' => 'А', 'B' => 'Б', 'V' => 'В', 'G' => 'Г', 'D' => 'Д', 'Đ' => 'Ђ',
        'E' => 'Е', 'Ž' => 'Ж', 'Z' => 'З', 'I' => 'И', 'J' => 'Ј', 'K' => 'К',
        'L' => 'Л', 'M' => 'М', 'N' => 'Н', 'O' => 'О', 'P' => 'П', 'R' => 'Р',
        'S' => 'С', 'T' => 'Т', 'Ć' => 'Ћ', 'U' => 'У', 'F' => 'Ф', 'H' => 'Х',
        'C' => 'Ц', 'Č' => 'Ч', 'Š' => 'Ш',
        other => other,
    }
}

/// Convert Serbian Latin text to Cyrillic.
///
/// Characters outside the Serbian Latin alphabet (digits, punctuation, text
/// that is already Cyrillic) pass through unchanged. Empty input returns empty.
pub fn to_cyrillic(text: &str) -> String {
    if text.is_empty() {
        return String::new();
    }

    let digraphs_done = DIGRAPHS
        .iter()
        .fold(text.to_string(), |acc, (latin, cyrillic)| acc.replace(latin, cyrillic));

    digraphs_done.chars().map(letter_to_cyrillic).collect()
}

/// Generate the Cyrillic spellings a Latin query could stand for.
///
/// Always contains the direct transliteration. A bare `c` is ambiguous in
/// colloquial writing (ц, ћ or ч), so when the text contains `c`/`C` two more
/// variants are produced with every `c` read as `ć` and as `č`. Duplicates are
/// collapsed, first occurrence wins.
pub fn expand_search_variants(text: &str) -> SearchVariants {
    let mut variants = SearchVariants::new();
    push_unique(&mut variants, to_cyrillic(text));

    if text.contains(['c', 'C']) {
        let acute = text.replace('c', "ć").replace('C', "Ć");
        push_unique(&mut variants, to_cyrillic(&acute));

        let caron = text.replace('c', "č").replace('C', "Č");
        push_unique(&mut variants, to_cyrillic(&caron));
    }

    variants
}

fn push_unique(variants: &mut SearchVariants, candidate: String) {
    if !variants.contains(&candidate) {
        variants.push(candidate);
    }
}

/// Case-insensitive, script-insensitive substring matcher for school names.
///
/// Built once per query; `matches` expects the haystack already lowercased.
#[derive(Debug, Clone)]
pub struct NameMatcher {
    candidates: SearchVariants,
}

impl NameMatcher {
    pub fn new(query: &str) -> Self {
        let lowered = query.to_lowercase();
        let mut candidates = expand_search_variants(&lowered);
        push_unique(&mut candidates, lowered);
        Self { candidates }
    }

    pub fn matches(&self, name_lower: &str) -> bool {
        self.candidates
            .iter()
            .any(|candidate| name_lower.contains(candidate.as_str()))
    }

    pub fn candidates(&self) -> &[String] {
        &self.candidates
    }
}
