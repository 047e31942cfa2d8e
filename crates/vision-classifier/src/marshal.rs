//! Engine output to host records.
//!
//! Purely structural: group order, category order and counts are preserved
//! exactly. The only decision made here is which string becomes the label.

use crate::types::{Category, ClassificationResult, Classifications, EngineCategory};

/// Label shown to the host: the display name when the engine has one,
/// otherwise the class name.
pub fn select_label(category: &EngineCategory) -> &str {
    if category.display_name.is_empty() {
        &category.class_name
    } else {
        &category.display_name
    }
}

/// Convert engine output into host records, one per output head.
pub fn marshal(result: &ClassificationResult) -> Vec<Classifications> {
    result
        .classifications
        .iter()
        .map(|group| Classifications {
            categories: group
                .classes
                .iter()
                .map(|c| Category::new(select_label(c), c.score))
                .collect(),
            head_index: group.head_index,
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::ClassificationGroup;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_label_falls_back_to_class_name() {
        let category = EngineCategory::new(281, 0.9, "cat");
        assert_eq!(select_label(&category), "cat");
    }

    #[test]
    fn test_label_prefers_display_name() {
        let category = EngineCategory::new(281, 0.9, "cat").with_display_name("Felis");
        assert_eq!(select_label(&category), "Felis");
    }

    #[test]
    fn test_display_name_used_even_without_class_name() {
        let category = EngineCategory::new(0, 0.1, "").with_display_name("Hund");
        assert_eq!(select_label(&category), "Hund");
    }

    #[test]
    fn test_marshal_preserves_shape_and_order() {
        let result = ClassificationResult {
            classifications: vec![
                ClassificationGroup {
                    head_index: 0,
                    classes: vec![
                        EngineCategory::new(2, 0.7, "tabby"),
                        EngineCategory::new(5, 0.9, "tiger_cat").with_display_name("Tiger cat"),
                        EngineCategory::new(2, 0.7, "tabby"),
                    ],
                },
                ClassificationGroup {
                    head_index: 3,
                    classes: vec![],
                },
                ClassificationGroup {
                    head_index: 1,
                    classes: vec![EngineCategory::new(9, 0.01, "toaster")],
                },
            ],
        };

        let records = marshal(&result);

        assert_eq!(
            records,
            vec![
                Classifications {
                    categories: vec![
                        Category::new("tabby", 0.7),
                        Category::new("Tiger cat", 0.9),
                        Category::new("tabby", 0.7),
                    ],
                    head_index: 0,
                },
                Classifications {
                    categories: vec![],
                    head_index: 3,
                },
                Classifications {
                    categories: vec![Category::new("toaster", 0.01)],
                    head_index: 1,
                },
            ]
        );
    }

    #[test]
    fn test_marshal_empty_result() {
        assert!(marshal(&ClassificationResult::default()).is_empty());
    }
}
