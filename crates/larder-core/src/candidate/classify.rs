//! Course classification of recipe titles.
//!
//! Search results are keyword-classified into main courses, starters, and
//! desserts. A title qualifies as a main course only when it matches *none*
//! of the exclusion keywords; it qualifies as a starter or dessert when it
//! matches *at least one* of the respective inclusion lists. The lists are
//! data, not logic; changing them changes which recipes the allocator may
//! place.

use std::fmt;

use serde::{Deserialize, Serialize};

/// The course a slot (and its pool) is planned with.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CourseType {
    Starter,
    Main,
    Dessert,
}

impl fmt::Display for CourseType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Starter => "starter",
            Self::Main => "main",
            Self::Dessert => "dessert",
        };
        f.write_str(s)
    }
}

/// Error returned when parsing an invalid [`CourseType`] string.
#[derive(Debug, Clone, thiserror::Error)]
#[error("unknown course type: {0:?} (expected starter, main, or dessert)")]
pub struct CourseTypeParseError(pub String);

impl std::str::FromStr for CourseType {
    type Err = CourseTypeParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "starter" => Ok(Self::Starter),
            "main" => Ok(Self::Main),
            "dessert" => Ok(Self::Dessert),
            other => Err(CourseTypeParseError(other.to_owned())),
        }
    }
}

/// Titles matching any of these are not main courses.
const MAIN_EXCLUDE_KEYWORDS: &[&str] = &[
    // drinks
    "smoothie", "shake", "drink", "cocktail", "limonade", "saft",
    "sirup", "latte", "tee", "kaffee", "punsch", "bowle", "eistee",
    "juice", "espresso",
    // desserts (planned separately)
    "kuchen", "torte", "muffin", "brownie", "cookie", "keks",
    "praline", "konfekt", "bonbon", "trüffel",
    "sorbet", "mousse au chocolat", "crème brûlée", "pudding",
    "panna cotta", "tiramisu", "waffel", "palatschinken", "crêpe",
    "cheesecake", "tarte tatin", "strudel", "soufflé",
    "marmelade", "konfitüre", "gelee", "kompott",
    // breakfast / snacks
    "brot ", "brötchen", "zopf", "weggli", "müsli", "granola",
    "baby", "brei ",
    // sauces / condiments
    "dip", "pesto", "mayonnaise", "ketchup", "senf",
    "gewürzmischung", "gewürzpaste", "brühe", "fond", "bouillon",
    "marinade", "vinaigrette",
    // typical starters (planned separately)
    "bruschetta", "crostini", "antipasti", "tapas", "amuse-bouche",
    "carpaccio",
];

/// Titles matching any of these qualify as starters.
const STARTER_KEYWORDS: &[&str] = &[
    "suppe", "cremesuppe", "velout", "consommé", "bouillon",
    "salat", "caprese", "carpaccio", "ceviche", "bruschetta",
    "crostini", "antipasti", "tapas", "frittata", "terrine",
    "gazpacho", "minestrone", "borscht", "ramen", "miso",
    "vorspeise", "starter", "amuse-bouche",
];

/// Titles matching any of these qualify as desserts.
const DESSERT_KEYWORDS: &[&str] = &[
    "kuchen", "torte", "tarte", "strudel", "cheesecake",
    "brownie", "muffin", "cookie", "keks", "waffel", "crêpe",
    "palatschinken", "tiramisu", "panna cotta", "crème brûlée",
    "mousse au chocolat", "soufflé", "parfait", "pudding",
    "griessbrei", "eis ", " eis", "sorbet", "dessert", "nachtisch",
    "schokoladenkuchen", "obsttorte", "apfelstrudel",
];

/// A title is a main course when no exclusion keyword matches it.
pub fn is_main_course(title: &str) -> bool {
    let title = title.to_lowercase();
    !MAIN_EXCLUDE_KEYWORDS.iter().any(|kw| title.contains(kw))
}

/// A title is a starter when at least one starter keyword matches it.
pub fn is_starter(title: &str) -> bool {
    let title = title.to_lowercase();
    STARTER_KEYWORDS.iter().any(|kw| title.contains(kw))
}

/// A title is a dessert when at least one dessert keyword matches it.
pub fn is_dessert(title: &str) -> bool {
    let title = title.to_lowercase();
    DESSERT_KEYWORDS.iter().any(|kw| title.contains(kw))
}

/// Whether a title qualifies for the given course's pool.
pub fn matches_course(title: &str, course: CourseType) -> bool {
    match course {
        CourseType::Main => is_main_course(title),
        CourseType::Starter => is_starter(title),
        CourseType::Dessert => is_dessert(title),
    }
}
