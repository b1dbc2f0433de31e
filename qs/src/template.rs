//! Question template domain types
//!
//! A template is one prompt in a consultation questionnaire, grouped by
//! medical category and positioned within the category by `order_index`.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::ValidationError;

/// How an answer to a template is collected
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum QuestionType {
    /// Closed set of choices, selection required from `options`
    MultipleChoice,
    /// Free-form string answer
    Text,
    /// Yes/no answer
    Boolean,
    /// Ordinal rating; `options` holds the labeled scale points
    Scale,
}

impl QuestionType {
    /// Whether templates of this type must carry a non-empty options list
    pub fn requires_options(&self) -> bool {
        matches!(self, Self::MultipleChoice | Self::Scale)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::MultipleChoice => "multiple_choice",
            Self::Text => "text",
            Self::Boolean => "boolean",
            Self::Scale => "scale",
        }
    }
}

impl std::fmt::Display for QuestionType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for QuestionType {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "multiple_choice" => Ok(Self::MultipleChoice),
            "text" => Ok(Self::Text),
            "boolean" => Ok(Self::Boolean),
            "scale" => Ok(Self::Scale),
            _ => Err(ValidationError::UnknownQuestionType { value: s.to_string() }),
        }
    }
}

/// A persisted question template
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QuestionTemplate {
    /// Row id, auto-assigned, never reused
    pub id: i64,
    /// Medical category grouping ("digestive", "emergency", ...)
    pub category: String,
    /// Human-readable prompt
    pub question_text: String,
    pub question_type: QuestionType,
    /// Ordered choice set; Some iff the type requires options
    pub options: Option<Vec<String>>,
    /// Display position within the category
    pub order_index: i64,
    /// Completion hint for the consuming application
    pub is_required: bool,
    /// Lowercase trigger terms matched by an external process
    pub keywords: Vec<String>,
    pub created_at: DateTime<Utc>,
    /// None until the first update
    pub updated_at: Option<DateTime<Utc>>,
}

/// Input for creating a template (everything except id and timestamps)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewTemplate {
    pub category: String,
    pub question_text: String,
    pub question_type: QuestionType,
    pub options: Option<Vec<String>>,
    pub order_index: i64,
    #[serde(default = "default_is_required")]
    pub is_required: bool,
    #[serde(default)]
    pub keywords: Vec<String>,
}

fn default_is_required() -> bool {
    true
}

impl NewTemplate {
    /// Validate mandatory fields and the options/type invariant
    ///
    /// Runs before any write is attempted. Uniqueness of
    /// `(category, order_index)` needs the database and is checked by the
    /// store inside the write transaction.
    pub fn validate(&self) -> Result<(), ValidationError> {
        validate_parts(
            &self.category,
            &self.question_text,
            self.question_type,
            self.options.as_deref(),
        )
    }
}

/// Partial update for an existing template
///
/// `options` is doubly wrapped so a patch can distinguish "leave unchanged"
/// (None) from "clear to NULL" (Some(None)).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TemplatePatch {
    pub category: Option<String>,
    pub question_text: Option<String>,
    pub question_type: Option<QuestionType>,
    pub options: Option<Option<Vec<String>>>,
    pub order_index: Option<i64>,
    pub is_required: Option<bool>,
    pub keywords: Option<Vec<String>>,
}

impl TemplatePatch {
    pub fn is_empty(&self) -> bool {
        self.category.is_none()
            && self.question_text.is_none()
            && self.question_type.is_none()
            && self.options.is_none()
            && self.order_index.is_none()
            && self.is_required.is_none()
            && self.keywords.is_none()
    }

    /// Apply this patch to an existing template, leaving timestamps alone
    pub(crate) fn apply(&self, template: &mut QuestionTemplate) {
        if let Some(category) = &self.category {
            template.category = category.clone();
        }
        if let Some(question_text) = &self.question_text {
            template.question_text = question_text.clone();
        }
        if let Some(question_type) = self.question_type {
            template.question_type = question_type;
        }
        if let Some(options) = &self.options {
            template.options = options.clone();
        }
        if let Some(order_index) = self.order_index {
            template.order_index = order_index;
        }
        if let Some(is_required) = self.is_required {
            template.is_required = is_required;
        }
        if let Some(keywords) = &self.keywords {
            template.keywords = keywords.clone();
        }
    }
}

/// Validate a template's mandatory fields and the options/type invariant
///
/// Shared by `NewTemplate::validate` and the store's update path, which
/// re-checks the merged state after applying a patch.
pub(crate) fn validate_parts(
    category: &str,
    question_text: &str,
    question_type: QuestionType,
    options: Option<&[String]>,
) -> Result<(), ValidationError> {
    if category.trim().is_empty() {
        return Err(ValidationError::MissingField { field: "category" });
    }
    if question_text.trim().is_empty() {
        return Err(ValidationError::MissingField { field: "question_text" });
    }
    match (question_type.requires_options(), options) {
        (true, None) | (true, Some([])) => Err(ValidationError::OptionsRequired {
            question_type: question_type.to_string(),
        }),
        (false, Some(_)) => Err(ValidationError::OptionsNotAllowed {
            question_type: question_type.to_string(),
        }),
        _ => Ok(()),
    }
}
