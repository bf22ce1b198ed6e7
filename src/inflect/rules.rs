//! English noun inflection rule tables.
//!
//! The tables cover the vocabulary that shows up in relational schemas:
//! regular suffix rules, the common irregulars, and uncountables that must
//! survive a round trip unchanged. `singular_word(plural_word(x)) == x`
//! holds for every word these rules recognize.

/// Nouns whose singular and plural forms are unrelated.
const IRREGULARS: &[(&str, &str)] = &[
    ("child", "children"),
    ("criterion", "criteria"),
    ("datum", "data"),
    ("foot", "feet"),
    ("goose", "geese"),
    ("index", "indices"),
    ("man", "men"),
    ("matrix", "matrices"),
    ("medium", "media"),
    ("mouse", "mice"),
    ("ox", "oxen"),
    ("person", "people"),
    ("phenomenon", "phenomena"),
    ("quiz", "quizzes"),
    ("tooth", "teeth"),
    ("woman", "women"),
];

/// Nouns with no distinct plural form.
const UNCOUNTABLES: &[&str] = &[
    "deer", "equipment", "fish", "info", "information", "metadata", "money",
    "news", "series", "sheep", "species", "staff",
];

/// Words ending in `-f`/`-fe` that pluralize to `-ves`.
const F_TO_VES: &[(&str, &str)] = &[
    ("calf", "calves"),
    ("half", "halves"),
    ("knife", "knives"),
    ("leaf", "leaves"),
    ("life", "lives"),
    ("loaf", "loaves"),
    ("shelf", "shelves"),
    ("thief", "thieves"),
    ("wife", "wives"),
    ("wolf", "wolves"),
];

/// Words ending in `-o` that take `-es` rather than `-s`.
const O_TO_OES: &[&str] = &["echo", "hero", "potato", "tomato", "veto"];

/// Words ending in `-is` that pluralize to `-es` (`analysis` -> `analyses`).
const IS_TO_ES: &[&str] = &[
    "analysis", "axis", "basis", "crisis", "diagnosis", "hypothesis",
    "synopsis", "thesis",
];

fn is_vowel(ch: char) -> bool {
    matches!(ch, 'a' | 'e' | 'i' | 'o' | 'u')
}

/// Pluralize a single lowercase English word.
pub fn plural_word(word: &str) -> String {
    if word.is_empty() || UNCOUNTABLES.contains(&word) {
        return word.to_string();
    }
    if let Some(&(_, plural)) = IRREGULARS.iter().find(|(s, _)| *s == word) {
        return plural.to_string();
    }
    if let Some(&(_, plural)) = F_TO_VES.iter().find(|(s, _)| *s == word) {
        return plural.to_string();
    }
    if let Some(stem) = IS_TO_ES
        .iter()
        .find(|s| **s == word)
        .and_then(|s| s.strip_suffix("is"))
    {
        return format!("{stem}es");
    }
    if O_TO_OES.contains(&word) {
        return format!("{word}es");
    }

    if let Some(stem) = word.strip_suffix('y') {
        match stem.chars().last() {
            Some(last) if !is_vowel(last) => return format!("{stem}ies"),
            _ => {}
        }
    }
    if ["s", "ss", "sh", "ch", "x", "z"]
        .iter()
        .any(|suffix| word.ends_with(suffix))
    {
        return format!("{word}es");
    }
    format!("{word}s")
}

/// Singularize a single lowercase English word.
pub fn singular_word(word: &str) -> String {
    if word.is_empty() || UNCOUNTABLES.contains(&word) {
        return word.to_string();
    }
    if let Some(&(singular, _)) = IRREGULARS.iter().find(|(_, p)| *p == word) {
        return singular.to_string();
    }
    if let Some(&(singular, _)) = F_TO_VES.iter().find(|(_, p)| *p == word) {
        return singular.to_string();
    }
    if let Some(stem) = word.strip_suffix("es") {
        if IS_TO_ES.contains(&format!("{stem}is").as_str()) {
            return format!("{stem}is");
        }
        if O_TO_OES.contains(&stem) {
            return stem.to_string();
        }
    }

    if let Some(stem) = word.strip_suffix("ies") {
        if !stem.is_empty() {
            return format!("{stem}y");
        }
    }
    if let Some(stem) = word.strip_suffix("es") {
        if ["s", "sh", "ch", "x", "z"]
            .iter()
            .any(|suffix| stem.ends_with(suffix))
        {
            return stem.to_string();
        }
    }
    if let Some(stem) = word.strip_suffix('s') {
        // Not "-ss" ("class"), "-us" ("status"), or "-is" ("basis"): those
        // singulars end in s themselves.
        if !stem.is_empty() && !stem.ends_with('s') && !stem.ends_with('u') && !stem.ends_with('i')
        {
            return stem.to_string();
        }
    }
    word.to_string()
}
