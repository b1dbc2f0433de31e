//! QuestionStore - catalog of consultation question templates
//!
//! Persists medical questionnaire templates for pet-health consultations and
//! serves them to an application that assembles questionnaires at runtime.
//! Templates are grouped by free-form category, ordered within a category by
//! `order_index`, and tagged with keywords that an external matching process
//! uses to pick relevant questions.
//!
//! # Architecture
//!
//! ```text
//! question_templates (SQLite)
//! ├── idx_templates_category        # get_by_category
//! ├── idx_templates_category_order  # in-category display order
//! └── idx_templates_type            # get_by_type
//! ```
//!
//! # Example
//!
//! ```ignore
//! use questionstore::{QuestionStore, QuestionType};
//!
//! let mut store = QuestionStore::open("questions.db")?;
//! store.seed_defaults()?;
//! let digestive = store.get_by_category("digestive")?;
//! let scales = store.get_by_type(QuestionType::Scale)?;
//! ```

pub mod config;
mod error;
pub mod seed;
mod store;
mod template;

pub use config::Config;
pub use error::{StoreError, ValidationError};
pub use store::QuestionStore;
pub use template::{NewTemplate, QuestionTemplate, QuestionType, TemplatePatch};
