//! Fuzzy duplicate detection for batch product imports.
//!
//! Imported rows often repeat existing catalog entries with small wording
//! differences ("Christmas Wreath 24in" vs "Christmas Wreath - 24 inch").
//! Names and descriptions are compared with normalized Levenshtein
//! similarity, with a veto when the candidates disagree on a color or
//! size word, since "Red Wreath" and "White Wreath" are distinct products
//! however similar the rest of the text is.

use crate::models::ProductDoc;

/// Words that distinguish otherwise near-identical product names.
const DISTINGUISHING_WORDS: &[&str] = &[
    "red", "white", "blue", "green", "pink", "purple", "yellow", "orange", "black", "gold",
    "silver", "small", "medium", "large", "mini", "jumbo",
];

/// A candidate row from a batch import.
#[derive(Debug, Clone)]
pub struct ImportCandidate<'a> {
    pub name: &'a str,
    pub description: &'a str,
}

/// True when the candidate should be skipped as a duplicate of `existing`.
#[must_use]
pub fn is_duplicate(candidate: &ImportCandidate<'_>, existing: &ProductDoc) -> bool {
    let name_sim = similarity(candidate.name, &existing.name);
    let desc_sim = similarity(candidate.description, &existing.description);

    let close = name_sim >= 0.90
        || (name_sim >= 0.65 && desc_sim >= 0.85)
        || (name_sim >= 0.60 && desc_sim >= 0.92);
    if !close {
        return false;
    }

    !distinguishing_mismatch(candidate.name, &existing.name)
}

/// Scan an import row against the whole catalog.
#[must_use]
pub fn find_duplicate<'p>(
    candidate: &ImportCandidate<'_>,
    catalog: &'p [ProductDoc],
) -> Option<&'p ProductDoc> {
    catalog.iter().find(|p| is_duplicate(candidate, p))
}

/// Normalized similarity in `[0, 1]`; 1.0 means equal after lowercasing
/// and whitespace collapse.
#[must_use]
pub fn similarity(a: &str, b: &str) -> f64 {
    let a = normalize(a);
    let b = normalize(b);
    if a.is_empty() && b.is_empty() {
        return 1.0;
    }
    let longest = a.chars().count().max(b.chars().count());
    if longest == 0 {
        return 1.0;
    }
    let distance = levenshtein(&a, &b);
    #[allow(clippy::cast_precision_loss)]
    {
        1.0 - distance as f64 / longest as f64
    }
}

fn normalize(s: &str) -> String {
    s.split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
        .to_lowercase()
}

/// Two names disagree on a color or size word, i.e. one side carries a
/// distinguishing word the other side lacks.
fn distinguishing_mismatch(a: &str, b: &str) -> bool {
    let a_words = word_set(a);
    let b_words = word_set(b);
    DISTINGUISHING_WORDS
        .iter()
        .any(|w| a_words.contains(*w) != b_words.contains(*w))
}

fn word_set(s: &str) -> std::collections::HashSet<String> {
    s.to_lowercase()
        .split(|c: char| !c.is_alphanumeric())
        .filter(|w| !w.is_empty())
        .map(ToString::to_string)
        .collect()
}

/// Classic two-row Levenshtein over chars.
fn levenshtein(a: &str, b: &str) -> usize {
    let a: Vec<char> = a.chars().collect();
    let b: Vec<char> = b.chars().collect();
    if a.is_empty() {
        return b.len();
    }
    if b.is_empty() {
        return a.len();
    }

    let mut prev: Vec<usize> = (0..=b.len()).collect();
    let mut curr = vec![0; b.len() + 1];

    for (i, ca) in a.iter().enumerate() {
        curr[0] = i + 1;
        for (j, cb) in b.iter().enumerate() {
            let cost = usize::from(ca != cb);
            curr[j + 1] = (prev[j] + cost).min(prev[j + 1] + 1).min(curr[j] + 1);
        }
        std::mem::swap(&mut prev, &mut curr);
    }
    prev[b.len()]
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use foxglove_core::ProductKind;

    fn existing(name: &str, description: &str) -> ProductDoc {
        ProductDoc {
            id: Some(mongodb::bson::oid::ObjectId::new()),
            name: name.to_string(),
            description: description.to_string(),
            price: 20.0,
            image: None,
            images: vec![],
            stock: 5,
            kind: ProductKind::Decor,
            subcategory: None,
            options: vec![],
            collection_name: None,
            occasion: None,
            featured: false,
            product_group: None,
            extended_details: None,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn test_levenshtein_basics() {
        assert_eq!(levenshtein("", ""), 0);
        assert_eq!(levenshtein("wreath", ""), 6);
        assert_eq!(levenshtein("kitten", "sitting"), 3);
    }

    #[test]
    fn test_similarity_identical_after_normalization() {
        assert!((similarity("Christmas  Wreath", "christmas wreath") - 1.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_exact_name_is_duplicate() {
        let candidate = ImportCandidate {
            name: "Christmas Wreath",
            description: "Handmade evergreen wreath",
        };
        let catalog = vec![existing("Christmas Wreath", "Handmade evergreen wreath")];
        assert!(find_duplicate(&candidate, &catalog).is_some());
    }

    #[test]
    fn test_near_name_with_matching_description_is_duplicate() {
        let candidate = ImportCandidate {
            name: "Christmas Wreath 24in",
            description: "Handmade evergreen wreath with pinecones and berries",
        };
        let catalog = vec![existing(
            "Christmas Wreath - 24 inch",
            "Handmade evergreen wreath with pinecones and berries",
        )];
        assert!(find_duplicate(&candidate, &catalog).is_some());
    }

    #[test]
    fn test_color_mismatch_vetoes_duplicate() {
        let candidate = ImportCandidate {
            name: "Red Christmas Wreath",
            description: "Handmade evergreen wreath",
        };
        let catalog = vec![existing("White Christmas Wreath", "Handmade evergreen wreath")];
        assert!(find_duplicate(&candidate, &catalog).is_none());
    }

    #[test]
    fn test_unrelated_products_are_not_duplicates() {
        let candidate = ImportCandidate {
            name: "Strawberry Jam",
            description: "Small-batch jam from our berry patch",
        };
        let catalog = vec![existing("Christmas Wreath", "Handmade evergreen wreath")];
        assert!(find_duplicate(&candidate, &catalog).is_none());
    }
}
