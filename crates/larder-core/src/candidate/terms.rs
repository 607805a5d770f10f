//! Search-term banks and filter synonym tables.
//!
//! The banks seed the concurrent keyword searches that build each pool;
//! the synonym tables expand category/cuisine filter selections into extra
//! search terms. Like the classification keywords, these are data with
//! behavioral weight and are kept verbatim.

/// Term bank for main-course searches.
pub const MAIN_SEARCH_TERMS: &[&str] = &[
    "Pasta", "Nudeln", "Risotto", "Lasagne", "Gnocchi",
    "Reis", "Kartoffel", "Auflauf", "Eintopf", "Pfanne", "Bowl",
    "Curry", "Wrap", "Burger", "Quiche", "Gratin",
    "Hähnchen", "Poulet", "Rind", "Schwein", "Lamm",
    "Lachs", "Fisch", "Garnelen", "Tofu", "Hackfleisch",
    "Gemüsepfanne", "Brokkoli", "Zucchini", "Kürbis", "Pilze",
    "Spinat", "Blumenkohl", "Süsskartoffel",
    "Thai Curry", "Mexikanisch", "Indisch", "Mediterran",
    "Couscous", "Quinoa", "Linsen", "Falafel",
    "One Pot", "Familienessen", "Mittagessen", "Abendessen",
];

/// Term bank for the lazily-built starter pool.
pub const STARTER_SEARCH_TERMS: &[&str] = &[
    "Vorspeise", "Suppe", "Cremesuppe", "Tomatensuppe",
    "Linsensuppe", "Minestrone", "Gazpacho",
    "Salat", "Blattsalat", "Caprese", "Griechischer Salat",
    "Bruschetta", "Antipasti", "Tapas", "Frittata",
    "Carpaccio", "Ceviche", "Terrine",
    "Miso Suppe", "Ramen", "Tom Kha",
    "Borscht", "Kürbissuppe", "Zwiebelsuppe",
];

/// Term bank for the lazily-built dessert pool.
pub const DESSERT_SEARCH_TERMS: &[&str] = &[
    "Dessert", "Nachtisch", "Kuchen", "Torte",
    "Tiramisu", "Panna Cotta", "Crème Brûlée",
    "Mousse au Chocolat", "Cheesecake", "Tarte",
    "Brownie", "Muffin", "Waffel", "Crêpe",
    "Pudding", "Griessbrei", "Eis", "Sorbet",
    "Soufflé", "Parfait", "Strudel",
];

/// Expand a category filter into search terms. Unknown categories expand
/// to themselves.
pub fn category_synonyms(category: &str) -> Vec<String> {
    let expanded: &[&str] = match category.to_lowercase().as_str() {
        "vegetarisch" => &["vegetarisch", "gemüse", "veggie"],
        "vegan" => &["vegan", "vegane", "pflanzlich"],
        "low carb" => &["low carb", "kohlenhydratarm"],
        "high protein" => &["high protein", "eiweiss", "proteinreich"],
        _ => return vec![category.to_string()],
    };
    expanded.iter().map(|s| (*s).to_string()).collect()
}

/// Expand a cuisine filter into search terms. Unknown cuisines expand to
/// themselves.
pub fn cuisine_synonyms(cuisine: &str) -> Vec<String> {
    let expanded: &[&str] = match cuisine.to_lowercase().as_str() {
        "italienisch" => &["italienisch", "pasta", "risotto", "pizza"],
        "asiatisch" => &["asiatisch", "asia", "wok", "thai"],
        "mexikanisch" => &["mexikanisch", "burrito", "taco", "enchilada"],
        "indisch" => &["indisch", "curry", "tikka", "masala"],
        "mediterran" => &["mediterran", "griechisch", "spanisch"],
        "orientalisch" => &["orientalisch", "falafel", "hummus", "couscous"],
        _ => return vec![cuisine.to_string()],
    };
    expanded.iter().map(|s| (*s).to_string()).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn known_category_expands() {
        assert_eq!(
            category_synonyms("vegan"),
            vec!["vegan", "vegane", "pflanzlich"]
        );
    }

    #[test]
    fn unknown_category_expands_to_itself() {
        assert_eq!(category_synonyms("glutenfrei"), vec!["glutenfrei"]);
    }

    #[test]
    fn cuisine_lookup_is_case_insensitive() {
        assert_eq!(
            cuisine_synonyms("Italienisch"),
            vec!["italienisch", "pasta", "risotto", "pizza"]
        );
    }

    #[test]
    fn term_banks_are_non_trivial() {
        assert!(MAIN_SEARCH_TERMS.len() > 40);
        assert!(STARTER_SEARCH_TERMS.len() >= 20);
        assert!(DESSERT_SEARCH_TERMS.len() >= 20);
    }
}
