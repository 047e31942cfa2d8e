//! Classifier options and their translation into engine options.
//!
//! [`ClassifierOptions`] is what the host configures. [`EngineOptions`] is
//! what the engine consumes: the same fields under the engine's names, plus
//! the location of the model bytes.

use serde::{Deserialize, Serialize};

use crate::error::Result;

/// Default locale for display names
pub const DEFAULT_DISPLAY_NAMES_LOCALE: &str = "en";

/// `max_results` value meaning "return every category"
pub const ALL_RESULTS: i32 = -1;

/// Host-side classifier configuration.
///
/// `score_threshold` is tri-state by construction: `None` means the host
/// never set it, and the engine applies its own default (usually the model
/// metadata's threshold). It is never filled with a sentinel value.
///
/// The allow and deny lists are passed through untouched; the engine decides
/// what empty or overlapping lists mean.
///
/// In JSON the options use the host's config shape (see [`HostOptions`]).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "HostOptions", into = "HostOptions")]
pub struct ClassifierOptions {
    pub display_names_locale: String,
    pub max_results: i32,
    pub score_threshold: Option<f32>,
    pub class_name_allow_list: Vec<String>,
    pub class_name_deny_list: Vec<String>,
}

impl Default for ClassifierOptions {
    fn default() -> Self {
        Self {
            display_names_locale: DEFAULT_DISPLAY_NAMES_LOCALE.to_string(),
            max_results: ALL_RESULTS,
            score_threshold: None,
            class_name_allow_list: Vec::new(),
            class_name_deny_list: Vec::new(),
        }
    }
}

impl ClassifierOptions {
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse options from the host's JSON config shape.
    ///
    /// Missing fields take their defaults. `scoreThreshold` is only read when
    /// `isScoreThresholdSet` is true. Unknown keys are rejected.
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn display_names_locale(mut self, locale: impl Into<String>) -> Self {
        self.display_names_locale = locale.into();
        self
    }

    pub fn max_results(mut self, max_results: i32) -> Self {
        self.max_results = max_results;
        self
    }

    pub fn score_threshold(mut self, threshold: f32) -> Self {
        self.score_threshold = Some(threshold);
        self
    }

    pub fn class_name_allow_list(mut self, class_names: Vec<String>) -> Self {
        self.class_name_allow_list = class_names;
        self
    }

    pub fn class_name_deny_list(mut self, class_names: Vec<String>) -> Self {
        self.class_name_deny_list = class_names;
        self
    }
}

/// Options exactly as a host serializes them.
///
/// Hosts carry the threshold as a flag plus a value and always send both;
/// the value is meaningless while the flag is false. `locale` is accepted
/// for `displayNamesLocale`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields, rename_all = "camelCase")]
pub struct HostOptions {
    #[serde(alias = "locale")]
    pub display_names_locale: String,
    pub max_results: i32,
    pub is_score_threshold_set: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub score_threshold: Option<f32>,
    pub class_name_allow_list: Vec<String>,
    pub class_name_deny_list: Vec<String>,
}

impl Default for HostOptions {
    fn default() -> Self {
        ClassifierOptions::default().into()
    }
}

impl TryFrom<HostOptions> for ClassifierOptions {
    type Error = String;

    fn try_from(host: HostOptions) -> std::result::Result<Self, Self::Error> {
        let score_threshold = match (host.is_score_threshold_set, host.score_threshold) {
            (true, Some(threshold)) => Some(threshold),
            (true, None) => {
                return Err("isScoreThresholdSet is true but scoreThreshold is missing".into())
            }
            (false, _) => None,
        };

        Ok(Self {
            display_names_locale: host.display_names_locale,
            max_results: host.max_results,
            score_threshold,
            class_name_allow_list: host.class_name_allow_list,
            class_name_deny_list: host.class_name_deny_list,
        })
    }
}

impl From<ClassifierOptions> for HostOptions {
    fn from(options: ClassifierOptions) -> Self {
        Self {
            display_names_locale: options.display_names_locale,
            max_results: options.max_results,
            is_score_threshold_set: options.score_threshold.is_some(),
            score_threshold: options.score_threshold,
            class_name_allow_list: options.class_name_allow_list,
            class_name_deny_list: options.class_name_deny_list,
        }
    }
}

/// Location of a serialized model inside an open file.
///
/// The host owns the descriptor and the bytes behind it; mapping and
/// validating the region is the engine's job.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ModelSource {
    pub fd: i32,
    /// Byte length of the region (0 means "to end of file" for most engines)
    pub length: i64,
    /// Byte offset of the region
    pub offset: i64,
}

impl ModelSource {
    pub fn new(fd: i32, length: i64, offset: i64) -> Self {
        Self { fd, length, offset }
    }
}

/// Model file reference as the engine expects it.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ExternalFile {
    pub file_descriptor_meta: ModelSource,
}

/// Options in the engine's own vocabulary.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EngineOptions {
    pub model_file_with_metadata: ExternalFile,
    pub display_names_locale: String,
    pub max_results: i32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub score_threshold: Option<f32>,
    pub class_name_whitelist: Vec<String>,
    pub class_name_blacklist: Vec<String>,
}

impl EngineOptions {
    pub fn model_source(&self) -> ModelSource {
        self.model_file_with_metadata.file_descriptor_meta
    }
}

/// Translate host options into engine options. Field mapping is 1:1.
pub fn translate(options: ClassifierOptions, model: ModelSource) -> EngineOptions {
    EngineOptions {
        model_file_with_metadata: ExternalFile {
            file_descriptor_meta: model,
        },
        display_names_locale: options.display_names_locale,
        max_results: options.max_results,
        score_threshold: options.score_threshold,
        class_name_whitelist: options.class_name_allow_list,
        class_name_blacklist: options.class_name_deny_list,
    }
}
