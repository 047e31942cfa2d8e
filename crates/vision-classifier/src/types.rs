//! Classification result types.
//!
//! The engine produces a [`ClassificationResult`]; the bridge reshapes it
//! into host records ([`Classifications`] / [`Category`]), which the FFI
//! layer then converts to C-compatible types.

/// One category as scored by the engine.
#[derive(Debug, Clone, PartialEq)]
pub struct EngineCategory {
    /// Index of the class in the model's label map
    pub index: i32,
    pub score: f32,
    /// Class name from the label map, possibly empty
    pub class_name: String,
    /// Localized display name; empty when the model has none for the locale
    pub display_name: String,
}

impl EngineCategory {
    pub fn new(index: i32, score: f32, class_name: impl Into<String>) -> Self {
        Self {
            index,
            score,
            class_name: class_name.into(),
            display_name: String::new(),
        }
    }

    pub fn with_display_name(mut self, display_name: impl Into<String>) -> Self {
        self.display_name = display_name.into();
        self
    }
}

/// Categories for a single output head, in engine order.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ClassificationGroup {
    pub head_index: i32,
    pub classes: Vec<EngineCategory>,
}

/// Full engine output, one group per output head.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ClassificationResult {
    pub classifications: Vec<ClassificationGroup>,
}

/// Host record for a labelled score.
#[derive(Debug, Clone, PartialEq)]
pub struct Category {
    pub label: String,
    pub score: f32,
}

impl Category {
    pub fn new(label: impl Into<String>, score: f32) -> Self {
        Self {
            label: label.into(),
            score,
        }
    }
}

/// Host record for one output head.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Classifications {
    pub categories: Vec<Category>,
    pub head_index: i32,
}
