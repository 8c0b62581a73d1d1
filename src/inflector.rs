//! English inflection helpers.
//!
//! Resource names are derived from type names with these functions: a type
//! called `PersonAddress` has the element name `person_address` and the
//! collection name `person_addresses`.
//!
//! The rule tables are ordered; the first matching pattern wins. Irregular
//! words and uncountable words are checked before any pattern.
//!
//! # Example
//!
//! ```rust
//! use active_resource::inflector::{camelize, pluralize, singularize, underscore};
//!
//! assert_eq!(pluralize("person"), "people");
//! assert_eq!(singularize("addresses"), "address");
//! assert_eq!(camelize("person_address"), "PersonAddress");
//! assert_eq!(underscore("PersonAddress"), "person_address");
//! ```

use std::sync::LazyLock;

use regex::Regex;

const PLURAL_RULES: &[(&str, &str)] = &[
    ("(quiz)$", "${1}zes"),
    ("^(ox)$", "${1}en"),
    ("([ml])ouse$", "${1}ice"),
    ("(matr|vert|ind)(?:ix|ex)$", "${1}ices"),
    ("(x|ch|ss|sh)$", "${1}es"),
    ("([^aeiouy]|qu)y$", "${1}ies"),
    ("(hive)$", "${1}s"),
    ("(?:([^f])fe|([lr])f)$", "${1}${2}ves"),
    ("sis$", "ses"),
    ("([ti])um$", "${1}a"),
    ("(buffal|tomat)o$", "${1}oes"),
    ("(bu)s$", "${1}ses"),
    ("(alias|status)$", "${1}es"),
    ("(octop|vir)us$", "${1}i"),
    ("(ax|test)is$", "${1}es"),
    ("s$", "s"),
    ("$", "s"),
];

const SINGULAR_RULES: &[(&str, &str)] = &[
    ("(quiz)zes$", "${1}"),
    ("(matr)ices$", "${1}ix"),
    ("(vert|ind)ices$", "${1}ex"),
    ("^(ox)en", "${1}"),
    ("(alias|status)es$", "${1}"),
    ("(octop|vir)i$", "${1}us"),
    ("(cris|ax|test)es$", "${1}is"),
    ("(shoe)s$", "${1}"),
    ("(o)es$", "${1}"),
    ("(bus)es$", "${1}"),
    ("([ml])ice$", "${1}ouse"),
    ("(x|ch|ss|sh)es$", "${1}"),
    ("(m)ovies$", "${1}ovie"),
    ("(s)eries$", "${1}eries"),
    ("([^aeiouy]|qu)ies$", "${1}y"),
    ("([lr])ves$", "${1}f"),
    ("(tive)s$", "${1}"),
    ("(hive)s$", "${1}"),
    ("([^f])ves$", "${1}fe"),
    ("(^analy)ses$", "${1}sis"),
    (
        "((a)naly|(b)a|(d)iagno|(p)arenthe|(p)rogno|(s)ynop|(t)he)ses$",
        "${1}sis",
    ),
    ("([ti])a$", "${1}um"),
    ("(n)ews$", "${1}ews"),
    ("s$", ""),
];

/// Singular/plural pairs that no rule covers.
const IRREGULAR: &[(&str, &str)] = &[
    ("person", "people"),
    ("man", "men"),
    ("child", "children"),
    ("sex", "sexes"),
    ("move", "moves"),
];

/// Words with identical singular and plural forms.
const UNCOUNTABLE: &[&str] = &[
    "equipment",
    "information",
    "rice",
    "money",
    "species",
    "series",
    "fish",
    "sheep",
];

static PLURALS: LazyLock<Vec<(Regex, &'static str)>> = LazyLock::new(|| compile(PLURAL_RULES));
static SINGULARS: LazyLock<Vec<(Regex, &'static str)>> =
    LazyLock::new(|| compile(SINGULAR_RULES));

fn compile(rules: &'static [(&'static str, &'static str)]) -> Vec<(Regex, &'static str)> {
    rules
        .iter()
        .filter_map(|(pattern, replacement)| {
            Regex::new(&format!("(?i){pattern}"))
                .ok()
                .map(|regex| (regex, *replacement))
        })
        .collect()
}

fn apply(rules: &[(Regex, &'static str)], word: &str) -> String {
    rules
        .iter()
        .find(|(regex, _)| regex.is_match(word))
        .map_or_else(
            || word.to_string(),
            |(regex, replacement)| regex.replace(word, *replacement).into_owned(),
        )
}

/// Returns the plural form of an English noun.
///
/// Irregular and uncountable words are recognized case-insensitively.
#[must_use]
pub fn pluralize(singular: &str) -> String {
    let lower = singular.to_lowercase();
    if UNCOUNTABLE.contains(&lower.as_str()) {
        return singular.to_string();
    }
    if let Some((_, plural)) = IRREGULAR.iter().find(|(s, _)| *s == lower) {
        return (*plural).to_string();
    }
    apply(&PLURALS, singular)
}

/// Returns the singular form of an English noun.
#[must_use]
pub fn singularize(plural: &str) -> String {
    let lower = plural.to_lowercase();
    if UNCOUNTABLE.contains(&lower.as_str()) {
        return plural.to_string();
    }
    if let Some((singular, _)) = IRREGULAR.iter().find(|(_, p)| *p == lower) {
        return (*singular).to_string();
    }
    apply(&SINGULARS, plural)
}

/// Converts an underscored word into `CamelCase`.
///
/// Every run of characters other than letters, digits and `:` separates
/// words; each word gets its first letter upper-cased.
#[must_use]
pub fn camelize(word: &str) -> String {
    word.split(|c: char| !(c.is_alphanumeric() || c == ':'))
        .filter(|part| !part.is_empty())
        .map(capitalize)
        .collect()
}

fn capitalize(part: &str) -> String {
    let mut chars = part.chars();
    chars.next().map_or_else(String::new, |first| {
        first.to_uppercase().chain(chars).collect()
    })
}

/// Converts a `CamelCase` word into `snake_case`.
///
/// An underscore is inserted before an upper-case letter that follows a
/// word character, when either its predecessor or its successor is lower
/// case. Acronyms therefore stay together: `HTTPServer` becomes
/// `http_server`.
#[must_use]
pub fn underscore(word: &str) -> String {
    let chars: Vec<char> = word.chars().collect();
    let mut result = String::with_capacity(word.len() + 4);
    for (index, &current) in chars.iter().enumerate() {
        if current.is_uppercase() && index > 0 {
            let previous = chars[index - 1];
            let next = chars.get(index + 1).copied();
            let boundary = previous.is_lowercase()
                || previous.is_ascii_digit()
                || next.is_some_and(char::is_lowercase);
            if previous.is_alphanumeric() && boundary {
                result.push('_');
            }
        }
        result.extend(current.to_lowercase());
    }
    result
}

/// Replaces underscores with dashes, as used for XML element names.
#[must_use]
pub fn dasherize(word: &str) -> String {
    word.replace('_', "-")
}
