// src/domain/address.rs

use regex::{Captures, Regex};
use std::sync::LazyLock;

/// The structured pieces of a street address. Every part is optional; a
/// string that matches no rule yields `AddressComponents::default()`.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct AddressComponents {
    pub number: Option<String>,
    pub dir_prefix: Option<String>,
    pub name: Option<String>,
    pub suffix: Option<String>,
    pub dir_suffix: Option<String>,
    /// A trailing unit designator split off the street string ("Apt 4" -> "4").
    pub unit: Option<String>,
}

impl AddressComponents {
    pub fn is_empty(&self) -> bool {
        self.number.is_none()
            && self.dir_prefix.is_none()
            && self.name.is_none()
            && self.suffix.is_none()
            && self.dir_suffix.is_none()
    }
}

/// Canonical street suffix abbreviations, keyed by lower-case spelling.
/// Abbreviations map to themselves so "ave" and "avenue" both become "Ave".
pub const STREET_SUFFIXES: &[(&str, &str)] = &[
    ("alley", "Aly"),
    ("aly", "Aly"),
    ("avenue", "Ave"),
    ("ave", "Ave"),
    ("av", "Ave"),
    ("boulevard", "Blvd"),
    ("blvd", "Blvd"),
    ("circle", "Cir"),
    ("cir", "Cir"),
    ("court", "Ct"),
    ("ct", "Ct"),
    ("cove", "Cv"),
    ("cv", "Cv"),
    ("creek", "Crk"),
    ("crossing", "Xing"),
    ("xing", "Xing"),
    ("drive", "Dr"),
    ("dr", "Dr"),
    ("expressway", "Expy"),
    ("expy", "Expy"),
    ("freeway", "Fwy"),
    ("fwy", "Fwy"),
    ("highway", "Hwy"),
    ("hwy", "Hwy"),
    ("lane", "Ln"),
    ("ln", "Ln"),
    ("loop", "Loop"),
    ("parkway", "Pkwy"),
    ("pkwy", "Pkwy"),
    ("path", "Path"),
    ("pike", "Pike"),
    ("place", "Pl"),
    ("pl", "Pl"),
    ("plaza", "Plz"),
    ("plz", "Plz"),
    ("point", "Pt"),
    ("pt", "Pt"),
    ("ridge", "Rdg"),
    ("rdg", "Rdg"),
    ("road", "Rd"),
    ("rd", "Rd"),
    ("row", "Row"),
    ("run", "Run"),
    ("square", "Sq"),
    ("sq", "Sq"),
    ("street", "St"),
    ("st", "St"),
    ("terrace", "Ter"),
    ("ter", "Ter"),
    ("trail", "Trl"),
    ("trl", "Trl"),
    ("turnpike", "Tpke"),
    ("tpke", "Tpke"),
    ("walk", "Walk"),
    ("way", "Way"),
];

const DIRECTIONS: &[(&str, &str)] = &[
    ("northeast", "NE"),
    ("northwest", "NW"),
    ("southeast", "SE"),
    ("southwest", "SW"),
    ("north", "N"),
    ("south", "S"),
    ("east", "E"),
    ("west", "W"),
    ("ne", "NE"),
    ("nw", "NW"),
    ("se", "SE"),
    ("sw", "SW"),
    ("n", "N"),
    ("s", "S"),
    ("e", "E"),
    ("w", "W"),
];

// Longest spellings first so "street" wins over "st" inside an alternation.
fn alternation(table: &[(&str, &str)]) -> String {
    let mut keys: Vec<&str> = table.iter().map(|(k, _)| *k).collect();
    keys.sort_by_key(|k| std::cmp::Reverse(k.len()));
    keys.join("|")
}

const HOUSE_NUMBER: &str = r"\d+[A-Za-z]?(?:-\d+)?";

static RE_FULL: LazyLock<Regex> = LazyLock::new(|| {
    let dirs = alternation(DIRECTIONS);
    let suffixes = alternation(STREET_SUFFIXES);
    Regex::new(&format!(
        r"(?i)^({HOUSE_NUMBER})\s+(?:({dirs})\.?\s+)?(.+?)\s+({suffixes})\.?(?:\s+({dirs})\.?)?$"
    ))
    .unwrap()
});
static RE_NUMBER_NAME_SUFFIX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(&format!(r"^({HOUSE_NUMBER})\s+(.+?)\s+([A-Za-z]+)\.?$")).unwrap()
});
static RE_NUMBER_REMAINDER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(&format!(r"^({HOUSE_NUMBER})\s+(.+)$")).unwrap());
static RE_TRAILING_UNIT: LazyLock<Regex> = LazyLock::new(|| {
    // The word designators must end on a boundary so "Stevens" or "Unity" stay whole.
    Regex::new(r"(?i)^(.+?)[\s,]+(?:(?:apartment|apt|suite|ste|unit)\b\.?\s*#?|#)\s*([A-Za-z0-9-]+)$")
        .unwrap()
});
static RE_WHITESPACE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\s+").unwrap());

/// One entry in the ordered rule table: a pattern and the function that
/// turns its captures into components.
pub struct AddressRule {
    pub name: &'static str,
    regex: &'static LazyLock<Regex>,
    extract: fn(&Captures) -> AddressComponents,
}

impl AddressRule {
    /// Runs this rule alone against an already cleaned street string.
    pub fn apply(&self, street: &str) -> Option<AddressComponents> {
        self.regex.captures(street).map(|caps| (self.extract)(&caps))
    }
}

/// Most specific rule first. The first rule that matches wins.
pub static ADDRESS_RULES: &[AddressRule] = &[
    AddressRule {
        name: "full",
        regex: &RE_FULL,
        extract: extract_full,
    },
    AddressRule {
        name: "number_name_suffix",
        regex: &RE_NUMBER_NAME_SUFFIX,
        extract: extract_number_name_suffix,
    },
    AddressRule {
        name: "number_remainder",
        regex: &RE_NUMBER_REMAINDER,
        extract: extract_number_remainder,
    },
];

fn capture(caps: &Captures, idx: usize) -> Option<String> {
    caps.get(idx)
        .map(|m| m.as_str().trim().to_string())
        .filter(|s| !s.is_empty())
}

fn extract_full(caps: &Captures) -> AddressComponents {
    AddressComponents {
        number: capture(caps, 1),
        dir_prefix: capture(caps, 2).and_then(|d| normalize_direction(&d).map(str::to_string)),
        name: capture(caps, 3),
        suffix: capture(caps, 4).map(|s| normalize_suffix(&s)),
        dir_suffix: capture(caps, 5).and_then(|d| normalize_direction(&d).map(str::to_string)),
        unit: None,
    }
}

fn extract_number_name_suffix(caps: &Captures) -> AddressComponents {
    AddressComponents {
        number: capture(caps, 1),
        name: capture(caps, 2),
        suffix: capture(caps, 3).map(|s| normalize_suffix(&s)),
        ..Default::default()
    }
}

fn extract_number_remainder(caps: &Captures) -> AddressComponents {
    AddressComponents {
        number: capture(caps, 1),
        name: capture(caps, 2),
        ..Default::default()
    }
}

/// Maps a suffix spelling to its standard abbreviation. Unknown suffixes
/// are title-cased and otherwise passed through.
pub fn normalize_suffix(raw: &str) -> String {
    let key = raw.trim().trim_end_matches('.').to_lowercase();
    STREET_SUFFIXES
        .iter()
        .find(|(spelling, _)| *spelling == key)
        .map(|(_, abbr)| abbr.to_string())
        .unwrap_or_else(|| title_case(&key))
}

pub fn normalize_direction(raw: &str) -> Option<&'static str> {
    let key = raw.trim().trim_end_matches('.').to_lowercase();
    DIRECTIONS
        .iter()
        .find(|(spelling, _)| *spelling == key)
        .map(|(_, abbr)| *abbr)
}

fn title_case(word: &str) -> String {
    let mut chars = word.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars.flat_map(char::to_lowercase)).collect(),
        None => String::new(),
    }
}

/// Collapses whitespace and strips trailing punctuation, then splits off a
/// trailing unit designator. Returns the cleaned street and the unit.
pub fn clean_street(raw: &str) -> (String, Option<String>) {
    let collapsed = RE_WHITESPACE.replace_all(raw.trim(), " ");
    let trimmed = collapsed.trim_end_matches(|c: char| matches!(c, ',' | '.' | ' '));

    match RE_TRAILING_UNIT.captures(trimmed) {
        Some(caps) => {
            let street = caps[1]
                .trim_end_matches(|c: char| matches!(c, ',' | ' '))
                .to_string();
            (street, capture(&caps, 2))
        }
        None => (trimmed.to_string(), None),
    }
}

/// Parses a free-text street address. Never fails: input that matches no
/// rule produces empty components (with any split-off unit kept).
pub fn parse_street_address(raw: &str) -> AddressComponents {
    let (street, unit) = clean_street(raw);
    if street.is_empty() {
        return AddressComponents::default();
    }

    let parsed = ADDRESS_RULES
        .iter()
        .find_map(|rule| rule.apply(&street))
        .unwrap_or_default();

    AddressComponents { unit, ..parsed }
}
