//! Core QuestionStore implementation

use std::path::Path;
use std::time::Duration;

use chrono::{DateTime, Utc};
use rusqlite::{params, Connection, OptionalExtension, Transaction};
use tracing::{debug, info};

use crate::config::Config;
use crate::error::{StoreError, ValidationError};
use crate::template::{NewTemplate, QuestionTemplate, QuestionType, TemplatePatch};

/// Table plus the three lookup indexes backing `get_by_category` and
/// `get_by_type`. The options/order invariants are enforced on the write
/// path, not structurally.
const SCHEMA: &str = r#"
CREATE TABLE IF NOT EXISTS question_templates (
    id            INTEGER PRIMARY KEY AUTOINCREMENT,
    category      TEXT NOT NULL,
    question_text TEXT NOT NULL,
    question_type TEXT NOT NULL,
    options       TEXT,
    order_index   INTEGER NOT NULL,
    is_required   INTEGER NOT NULL DEFAULT 1,
    keywords      TEXT,
    created_at    TEXT NOT NULL,
    updated_at    TEXT
);
CREATE INDEX IF NOT EXISTS idx_templates_category
    ON question_templates(category);
CREATE INDEX IF NOT EXISTS idx_templates_category_order
    ON question_templates(category, order_index);
CREATE INDEX IF NOT EXISTS idx_templates_type
    ON question_templates(question_type);
"#;

const COLUMNS: &str = "id, category, question_text, question_type, options, \
                       order_index, is_required, keywords, created_at, updated_at";

/// SQLite-backed catalog of question templates
pub struct QuestionStore {
    conn: Connection,
}

impl QuestionStore {
    /// Open or create a store at the given database path
    pub fn open(path: impl AsRef<Path>) -> Result<Self, StoreError> {
        let path = path.as_ref();
        if let Some(parent) = path.parent()
            && !parent.as_os_str().is_empty()
        {
            std::fs::create_dir_all(parent)?;
        }
        let conn = Connection::open(path)?;
        debug!(?path, "Opened question store");
        Self::from_connection(conn)
    }

    /// Open an in-memory store (used by tests)
    pub fn open_in_memory() -> Result<Self, StoreError> {
        Self::from_connection(Connection::open_in_memory()?)
    }

    /// Open the store described by a [`Config`], seeding the default
    /// catalog when `seed_on_open` is set (idempotent)
    pub fn open_with_config(config: &Config) -> Result<Self, StoreError> {
        let mut store = Self::open(&config.db_path)?;
        if config.seed_on_open {
            store.seed_defaults()?;
        }
        Ok(store)
    }

    fn from_connection(conn: Connection) -> Result<Self, StoreError> {
        conn.busy_timeout(Duration::from_secs(5))?;
        conn.execute_batch(SCHEMA)?;
        Ok(Self { conn })
    }

    /// Create a new template, returning it with its generated id
    ///
    /// Validation runs before any write; `created_at` is set to now and
    /// `updated_at` starts out null.
    pub fn create(&mut self, template: NewTemplate) -> Result<QuestionTemplate, StoreError> {
        template.validate()?;

        let tx = self.conn.transaction()?;
        ensure_order_free(&tx, &template.category, template.order_index, None)?;
        let created_at = Utc::now();
        let id = insert_tx(&tx, &template, created_at)?;
        tx.commit()?;

        info!(id, category = %template.category, "Created question template");
        Ok(QuestionTemplate {
            id,
            category: template.category,
            question_text: template.question_text,
            question_type: template.question_type,
            options: template.options,
            order_index: template.order_index,
            is_required: template.is_required,
            keywords: template.keywords,
            created_at,
            updated_at: None,
        })
    }

    /// Fetch a single template by id
    pub fn get(&self, id: i64) -> Result<QuestionTemplate, StoreError> {
        let sql = format!("SELECT {COLUMNS} FROM question_templates WHERE id = ?1");
        self.conn
            .query_row(&sql, params![id], row_to_template)
            .optional()?
            .ok_or(StoreError::NotFound { id })
    }

    /// All templates in a category, in display order
    ///
    /// An unknown category yields an empty list, not an error.
    pub fn get_by_category(&self, category: &str) -> Result<Vec<QuestionTemplate>, StoreError> {
        let sql = format!(
            "SELECT {COLUMNS} FROM question_templates
             WHERE category = ?1
             ORDER BY order_index ASC"
        );
        let mut stmt = self.conn.prepare(&sql)?;
        let templates = stmt
            .query_map(params![category], row_to_template)?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(templates)
    }

    /// All templates with the given answer type; no cross-category ordering
    pub fn get_by_type(&self, question_type: QuestionType) -> Result<Vec<QuestionTemplate>, StoreError> {
        let sql = format!("SELECT {COLUMNS} FROM question_templates WHERE question_type = ?1");
        let mut stmt = self.conn.prepare(&sql)?;
        let templates = stmt
            .query_map(params![question_type.as_str()], row_to_template)?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(templates)
    }

    /// Apply a partial update, re-validating the merged state
    ///
    /// Fails with `NotFound` for an unknown id and leaves the store
    /// untouched on any validation failure. Sets `updated_at` to now.
    pub fn update(&mut self, id: i64, patch: TemplatePatch) -> Result<QuestionTemplate, StoreError> {
        let tx = self.conn.transaction()?;

        let mut template = get_tx(&tx, id)?.ok_or(StoreError::NotFound { id })?;
        patch.apply(&mut template);
        crate::template::validate_parts(
            &template.category,
            &template.question_text,
            template.question_type,
            template.options.as_deref(),
        )?;
        ensure_order_free(&tx, &template.category, template.order_index, Some(id))?;

        let updated_at = Utc::now();
        let options_json = template
            .options
            .as_ref()
            .map(serde_json::to_string)
            .transpose()?;
        tx.execute(
            "UPDATE question_templates
             SET category = ?1, question_text = ?2, question_type = ?3, options = ?4,
                 order_index = ?5, is_required = ?6, keywords = ?7, updated_at = ?8
             WHERE id = ?9",
            params![
                template.category,
                template.question_text,
                template.question_type.as_str(),
                options_json,
                template.order_index,
                template.is_required,
                serde_json::to_string(&template.keywords)?,
                updated_at.to_rfc3339(),
                id
            ],
        )?;
        tx.commit()?;

        debug!(id, "Updated question template");
        template.updated_at = Some(updated_at);
        Ok(template)
    }

    /// Remove a template; fails with `NotFound` if the id is absent
    pub fn delete(&mut self, id: i64) -> Result<(), StoreError> {
        let affected = self
            .conn
            .execute("DELETE FROM question_templates WHERE id = ?1", params![id])?;
        if affected == 0 {
            return Err(StoreError::NotFound { id });
        }
        info!(id, "Deleted question template");
        Ok(())
    }

    /// Seed the store with a fixed catalog, once
    ///
    /// No-op returning 0 when the table already holds rows, so repeated
    /// initialization never duplicates the catalog. Otherwise inserts all
    /// templates in one transaction and returns how many were written.
    pub fn bulk_load(&mut self, templates: &[NewTemplate]) -> Result<usize, StoreError> {
        for template in templates {
            template.validate()?;
        }

        let tx = self.conn.transaction()?;
        let existing: i64 =
            tx.query_row("SELECT COUNT(*) FROM question_templates", [], |row| row.get(0))?;
        if existing > 0 {
            debug!(existing, "Store already populated, skipping bulk load");
            return Ok(0);
        }

        let created_at = Utc::now();
        for template in templates {
            ensure_order_free(&tx, &template.category, template.order_index, None)?;
            insert_tx(&tx, template, created_at)?;
        }
        tx.commit()?;

        info!(count = templates.len(), "Bulk loaded question templates");
        Ok(templates.len())
    }

    /// Load the built-in consultation catalog (idempotent)
    pub fn seed_defaults(&mut self) -> Result<usize, StoreError> {
        self.bulk_load(&crate::seed::catalog())
    }

    /// Total number of templates
    pub fn count(&self) -> Result<u64, StoreError> {
        let count: i64 =
            self.conn
                .query_row("SELECT COUNT(*) FROM question_templates", [], |row| row.get(0))?;
        Ok(count as u64)
    }

    /// Number of templates in one category, used to size a questionnaire
    pub fn count_by_category(&self, category: &str) -> Result<u64, StoreError> {
        let count: i64 = self.conn.query_row(
            "SELECT COUNT(*) FROM question_templates WHERE category = ?1",
            params![category],
            |row| row.get(0),
        )?;
        Ok(count as u64)
    }

    /// Distinct categories present in the store, sorted
    pub fn categories(&self) -> Result<Vec<String>, StoreError> {
        let mut stmt = self
            .conn
            .prepare("SELECT DISTINCT category FROM question_templates ORDER BY category ASC")?;
        let categories = stmt
            .query_map([], |row| row.get(0))?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(categories)
    }
}

/// Reject a write that would take an order slot already used in the category
///
/// The schema declares no uniqueness constraint on (category, order_index),
/// so this invariant lives on the write path, inside the transaction.
fn ensure_order_free(
    tx: &Transaction<'_>,
    category: &str,
    order_index: i64,
    exclude_id: Option<i64>,
) -> Result<(), StoreError> {
    let taken: Option<i64> = tx
        .query_row(
            "SELECT id FROM question_templates
             WHERE category = ?1 AND order_index = ?2 AND id != ?3",
            params![category, order_index, exclude_id.unwrap_or(-1)],
            |row| row.get(0),
        )
        .optional()?;
    if taken.is_some() {
        return Err(ValidationError::DuplicateOrderIndex {
            category: category.to_string(),
            order_index,
        }
        .into());
    }
    Ok(())
}

fn insert_tx(
    tx: &Transaction<'_>,
    template: &NewTemplate,
    created_at: DateTime<Utc>,
) -> Result<i64, StoreError> {
    let options_json = template
        .options
        .as_ref()
        .map(serde_json::to_string)
        .transpose()?;
    tx.execute(
        "INSERT INTO question_templates
             (category, question_text, question_type, options, order_index,
              is_required, keywords, created_at, updated_at)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, NULL)",
        params![
            template.category,
            template.question_text,
            template.question_type.as_str(),
            options_json,
            template.order_index,
            template.is_required,
            serde_json::to_string(&template.keywords)?,
            created_at.to_rfc3339()
        ],
    )?;
    Ok(tx.last_insert_rowid())
}

fn get_tx(tx: &Transaction<'_>, id: i64) -> Result<Option<QuestionTemplate>, StoreError> {
    let sql = format!("SELECT {COLUMNS} FROM question_templates WHERE id = ?1");
    Ok(tx.query_row(&sql, params![id], row_to_template).optional()?)
}

/// Map one row into a template, validating the JSON columns at the boundary
fn row_to_template(row: &rusqlite::Row<'_>) -> rusqlite::Result<QuestionTemplate> {
    let type_str: String = row.get(3)?;
    let question_type = type_str
        .parse::<QuestionType>()
        .map_err(|e| conversion_error(3, e))?;

    let options: Option<String> = row.get(4)?;
    let options = options
        .map(|raw| serde_json::from_str::<Vec<String>>(&raw).map_err(|e| conversion_error(4, e)))
        .transpose()?;

    let keywords: Option<String> = row.get(7)?;
    let keywords = keywords
        .map(|raw| serde_json::from_str::<Vec<String>>(&raw).map_err(|e| conversion_error(7, e)))
        .transpose()?
        .unwrap_or_default();

    let created_at: String = row.get(8)?;
    let updated_at: Option<String> = row.get(9)?;

    Ok(QuestionTemplate {
        id: row.get(0)?,
        category: row.get(1)?,
        question_text: row.get(2)?,
        question_type,
        options,
        order_index: row.get(5)?,
        is_required: row.get(6)?,
        keywords,
        created_at: parse_timestamp(8, &created_at)?,
        updated_at: updated_at.map(|raw| parse_timestamp(9, &raw)).transpose()?,
    })
}

fn parse_timestamp(idx: usize, raw: &str) -> rusqlite::Result<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(raw)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|e| conversion_error(idx, e))
}

fn conversion_error(
    idx: usize,
    err: impl std::error::Error + Send + Sync + 'static,
) -> rusqlite::Error {
    rusqlite::Error::FromSqlConversionFailure(idx, rusqlite::types::Type::Text, Box::new(err))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn text_question(category: &str, order_index: i64) -> NewTemplate {
        NewTemplate {
            category: category.to_string(),
            question_text: format!("Question {order_index} for {category}?"),
            question_type: QuestionType::Text,
            options: None,
            order_index,
            is_required: true,
            keywords: vec![],
        }
    }

    fn choice_question(category: &str, order_index: i64) -> NewTemplate {
        NewTemplate {
            category: category.to_string(),
            question_text: format!("Pick one for {category}?"),
            question_type: QuestionType::MultipleChoice,
            options: Some(vec!["Yes".to_string(), "No".to_string()]),
            order_index,
            is_required: true,
            keywords: vec!["test".to_string()],
        }
    }

    #[test]
    fn test_create_assigns_id_and_timestamps() {
        let mut store = QuestionStore::open_in_memory().unwrap();

        let first = store.create(text_question("general", 1)).unwrap();
        let second = store.create(choice_question("general", 2)).unwrap();

        assert!(second.id > first.id);
        assert!(first.updated_at.is_none());
        assert_eq!(second.options, Some(vec!["Yes".to_string(), "No".to_string()]));
    }

    #[test]
    fn test_create_rejects_invalid_input_before_writing() {
        let mut store = QuestionStore::open_in_memory().unwrap();

        let mut bad = choice_question("general", 1);
        bad.options = None;
        let err = store.create(bad).unwrap_err();
        assert!(err.is_validation());
        assert_eq!(store.count().unwrap(), 0);
    }

    #[test]
    fn test_create_rejects_duplicate_order_index() {
        let mut store = QuestionStore::open_in_memory().unwrap();
        store.create(text_question("digestive", 1)).unwrap();

        let err = store.create(text_question("digestive", 1)).unwrap_err();
        assert!(matches!(
            err,
            StoreError::Validation(ValidationError::DuplicateOrderIndex { .. })
        ));

        // Same index in another category is fine
        store.create(text_question("respiratory", 1)).unwrap();
    }

    #[test]
    fn test_get_round_trips_all_fields() {
        let mut store = QuestionStore::open_in_memory().unwrap();
        let created = store.create(choice_question("dermatological", 4)).unwrap();

        let fetched = store.get(created.id).unwrap();
        assert_eq!(fetched, created);
    }

    #[test]
    fn test_get_unknown_id_is_not_found() {
        let store = QuestionStore::open_in_memory().unwrap();
        let err = store.get(999).unwrap_err();
        assert!(err.is_not_found());
    }

    #[test]
    fn test_get_by_category_orders_by_index() {
        let mut store = QuestionStore::open_in_memory().unwrap();
        store.create(text_question("digestive", 3)).unwrap();
        store.create(text_question("digestive", 1)).unwrap();
        store.create(text_question("digestive", 2)).unwrap();
        store.create(text_question("general", 1)).unwrap();

        let templates = store.get_by_category("digestive").unwrap();
        let indexes: Vec<i64> = templates.iter().map(|t| t.order_index).collect();
        assert_eq!(indexes, vec![1, 2, 3]);
    }

    #[test]
    fn test_get_by_category_unknown_is_empty() {
        let store = QuestionStore::open_in_memory().unwrap();
        assert!(store.get_by_category("nonexistent").unwrap().is_empty());
    }

    #[test]
    fn test_get_by_type() {
        let mut store = QuestionStore::open_in_memory().unwrap();
        store.create(text_question("general", 1)).unwrap();
        store.create(choice_question("general", 2)).unwrap();
        store.create(choice_question("digestive", 1)).unwrap();

        let choices = store.get_by_type(QuestionType::MultipleChoice).unwrap();
        assert_eq!(choices.len(), 2);
        let texts = store.get_by_type(QuestionType::Text).unwrap();
        assert_eq!(texts.len(), 1);
        assert!(store.get_by_type(QuestionType::Scale).unwrap().is_empty());
    }

    #[test]
    fn test_update_merges_and_stamps() {
        let mut store = QuestionStore::open_in_memory().unwrap();
        let created = store.create(text_question("behavioral", 1)).unwrap();

        let patch = TemplatePatch {
            question_text: Some("Rewritten prompt?".to_string()),
            is_required: Some(false),
            ..Default::default()
        };
        let updated = store.update(created.id, patch).unwrap();

        assert_eq!(updated.question_text, "Rewritten prompt?");
        assert!(!updated.is_required);
        assert!(updated.updated_at.is_some());
        assert_eq!(updated.created_at, created.created_at);

        let fetched = store.get(created.id).unwrap();
        assert_eq!(fetched, updated);
    }

    #[test]
    fn test_update_unknown_id_leaves_store_unchanged() {
        let mut store = QuestionStore::open_in_memory().unwrap();
        store.create(text_question("general", 1)).unwrap();

        let err = store.update(999, TemplatePatch::default()).unwrap_err();
        assert!(err.is_not_found());
        assert_eq!(store.count().unwrap(), 1);
    }

    #[test]
    fn test_update_revalidates_options_invariant() {
        let mut store = QuestionStore::open_in_memory().unwrap();
        let created = store.create(choice_question("general", 1)).unwrap();

        // Switching to text while keeping options must fail
        let patch = TemplatePatch {
            question_type: Some(QuestionType::Text),
            ..Default::default()
        };
        let err = store.update(created.id, patch).unwrap_err();
        assert!(err.is_validation());

        // Store unchanged
        let fetched = store.get(created.id).unwrap();
        assert_eq!(fetched.question_type, QuestionType::MultipleChoice);

        // Clearing options alongside the type change succeeds
        let patch = TemplatePatch {
            question_type: Some(QuestionType::Text),
            options: Some(None),
            ..Default::default()
        };
        let updated = store.update(created.id, patch).unwrap();
        assert_eq!(updated.question_type, QuestionType::Text);
        assert_eq!(updated.options, None);
    }

    #[test]
    fn test_update_rejects_order_collision() {
        let mut store = QuestionStore::open_in_memory().unwrap();
        store.create(text_question("general", 1)).unwrap();
        let second = store.create(text_question("general", 2)).unwrap();

        let patch = TemplatePatch {
            order_index: Some(1),
            ..Default::default()
        };
        let err = store.update(second.id, patch).unwrap_err();
        assert!(matches!(
            err,
            StoreError::Validation(ValidationError::DuplicateOrderIndex { .. })
        ));

        // Keeping its own index is not a collision
        let patch = TemplatePatch {
            order_index: Some(2),
            question_text: Some("Still second?".to_string()),
            ..Default::default()
        };
        store.update(second.id, patch).unwrap();
    }

    #[test]
    fn test_delete_then_delete_again() {
        let mut store = QuestionStore::open_in_memory().unwrap();
        let created = store.create(text_question("emergency", 1)).unwrap();

        store.delete(created.id).unwrap();
        assert!(store.get_by_category("emergency").unwrap().is_empty());

        let err = store.delete(created.id).unwrap_err();
        assert!(err.is_not_found());
    }

    #[test]
    fn test_ids_are_not_reused_after_delete() {
        let mut store = QuestionStore::open_in_memory().unwrap();
        let first = store.create(text_question("general", 1)).unwrap();
        store.delete(first.id).unwrap();

        let second = store.create(text_question("general", 1)).unwrap();
        assert!(second.id > first.id);
    }

    #[test]
    fn test_bulk_load_is_idempotent() {
        let mut store = QuestionStore::open_in_memory().unwrap();
        let batch = vec![text_question("general", 1), choice_question("general", 2)];

        assert_eq!(store.bulk_load(&batch).unwrap(), 2);
        assert_eq!(store.bulk_load(&batch).unwrap(), 0);
        assert_eq!(store.count().unwrap(), 2);
    }

    #[test]
    fn test_bulk_load_validates_before_writing() {
        let mut store = QuestionStore::open_in_memory().unwrap();
        let mut bad = choice_question("general", 2);
        bad.options = Some(vec![]);
        let batch = vec![text_question("general", 1), bad];

        assert!(store.bulk_load(&batch).unwrap_err().is_validation());
        assert_eq!(store.count().unwrap(), 0);
    }

    #[test]
    fn test_counts_and_categories() {
        let mut store = QuestionStore::open_in_memory().unwrap();
        store.create(text_question("digestive", 1)).unwrap();
        store.create(text_question("digestive", 2)).unwrap();
        store.create(text_question("behavioral", 1)).unwrap();

        assert_eq!(store.count().unwrap(), 3);
        assert_eq!(store.count_by_category("digestive").unwrap(), 2);
        assert_eq!(store.count_by_category("nonexistent").unwrap(), 0);
        assert_eq!(
            store.categories().unwrap(),
            vec!["behavioral".to_string(), "digestive".to_string()]
        );
    }

    #[test]
    fn test_reopen_preserves_rows() {
        let temp = tempfile::TempDir::new().unwrap();
        let db_path = temp.path().join("questions.db");

        let created = {
            let mut store = QuestionStore::open(&db_path).unwrap();
            store.create(choice_question("respiratory", 1)).unwrap()
        };

        let store = QuestionStore::open(&db_path).unwrap();
        assert_eq!(store.get(created.id).unwrap(), created);
    }
}
