//! # Article Categories
//!
//! Maps the free-text categories found in article lists and spreadsheets
//! ("Arbete", "Bygg", "UE", ...) onto [`ItemKind`].
//!
//! The mapping is an explicit table resolved once, when a row is parsed.
//! Nothing downstream compares category strings.
//!
//! ```text
//! "  UE "  ──normalize──► "ue" ──table──► Subcontractor
//! "Bygg"   ──normalize──► "bygg" ──table──► Material
//! "Övrigt" ──normalize──► "övrigt" ──table──► (none) ──► default Material
//! ```

use crate::types::ItemKind;

/// Category table. Keys are lowercase and trimmed.
const CATEGORY_TABLE: &[(&str, ItemKind)] = &[
    // Labor
    ("arbete", ItemKind::Labor),
    ("arbetskostnad", ItemKind::Labor),
    ("arbetstid", ItemKind::Labor),
    ("timmar", ItemKind::Labor),
    ("montage", ItemKind::Labor),
    ("montering", ItemKind::Labor),
    ("labor", ItemKind::Labor),
    ("labour", ItemKind::Labor),
    // Material
    ("material", ItemKind::Material),
    ("bygg", ItemKind::Material),
    ("byggmaterial", ItemKind::Material),
    ("förbrukning", ItemKind::Material),
    ("förbrukningsmaterial", ItemKind::Material),
    ("el", ItemKind::Material),
    ("vvs", ItemKind::Material),
    ("färg", ItemKind::Material),
    ("maskin", ItemKind::Material),
    ("maskinhyra", ItemKind::Material),
    // Subcontractor
    ("ue", ItemKind::Subcontractor),
    ("underentreprenör", ItemKind::Subcontractor),
    ("underentreprenörer", ItemKind::Subcontractor),
    ("underentreprenad", ItemKind::Subcontractor),
    ("subcontractor", ItemKind::Subcontractor),
];

fn normalize(category: &str) -> String {
    category
        .trim()
        .trim_end_matches(':')
        .trim()
        .to_lowercase()
}

/// Looks a category up in the table.
///
/// ## Example
/// ```rust
/// use offert_core::category::kind_for_category;
/// use offert_core::ItemKind;
///
/// assert_eq!(kind_for_category(" UE "), Some(ItemKind::Subcontractor));
/// assert_eq!(kind_for_category("Arbete"), Some(ItemKind::Labor));
/// assert_eq!(kind_for_category("Övrigt"), None);
/// ```
pub fn kind_for_category(category: &str) -> Option<ItemKind> {
    let key = normalize(category);
    CATEGORY_TABLE
        .iter()
        .find(|(name, _)| *name == key)
        .map(|(_, kind)| *kind)
}

/// Looks a category up, falling back to [`ItemKind::Material`].
pub fn resolve_category(category: &str) -> ItemKind {
    kind_for_category(category).unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_known_categories() {
        assert_eq!(kind_for_category("Bygg"), Some(ItemKind::Material));
        assert_eq!(kind_for_category("UE"), Some(ItemKind::Subcontractor));
        assert_eq!(kind_for_category("Underentreprenör"), Some(ItemKind::Subcontractor));
        assert_eq!(kind_for_category("ARBETE:"), Some(ItemKind::Labor));
        assert_eq!(kind_for_category("Förbrukning"), Some(ItemKind::Material));
    }

    #[test]
    fn test_unknown_falls_back_to_material() {
        assert_eq!(kind_for_category(""), None);
        assert_eq!(resolve_category("Diverse"), ItemKind::Material);
    }

    #[test]
    fn test_table_keys_are_normalized() {
        for (key, _) in CATEGORY_TABLE {
            assert_eq!(*key, normalize(key));
        }
    }
}
