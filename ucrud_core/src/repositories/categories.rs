use super::{generated_id, integer, parameters};
use crate::error::{Error, Result};
use crate::models::{CategoryChanges, NewCategory};
use indoc::indoc;
use tracing::debug;
use ucrud_driver::{Database, RowMap, Value};

const SELECT_CATEGORIES: &str = indoc! {"
    SELECT
        c.id,
        c.name,
        c.description,
        c.created_at,
        COUNT(p.id) AS product_count
    FROM categories c
    LEFT JOIN products p ON c.id = p.category_id AND p.status = 'active'
"};

const GROUP_BY: &str = "GROUP BY c.id, c.name, c.description, c.created_at";

#[derive(Clone, Debug)]
pub struct CategoryRepository {
    database: Database,
}

impl CategoryRepository {
    #[must_use]
    pub fn new(database: Database) -> Self {
        Self { database }
    }

    /// All categories ordered by name with their number of active products
    ///
    /// # Errors
    /// * If the statement fails
    pub async fn list(&self) -> Result<Vec<RowMap>> {
        let sql = format!("{SELECT_CATEGORIES}{GROUP_BY}\nORDER BY c.name ASC");
        let categories = self.database.query(&sql, &[]).await?;
        Ok(categories)
    }

    /// # Errors
    /// * If the statement fails
    pub async fn find(&self, id: i64) -> Result<Option<RowMap>> {
        let sql = format!("{SELECT_CATEGORIES}WHERE c.id = ?\n{GROUP_BY}");
        let category = self.database.query_one(&sql, &[&id]).await?;
        Ok(category)
    }

    /// # Errors
    /// * If the statement fails
    pub async fn exists(&self, id: i64) -> Result<bool> {
        let row = self
            .database
            .query_one("SELECT id FROM categories WHERE id = ?", &[&id])
            .await?;
        Ok(row.is_some())
    }

    /// # Errors
    /// * If the statement fails
    pub async fn name_taken(&self, name: &str) -> Result<bool> {
        let row = self
            .database
            .query_one("SELECT id FROM categories WHERE name = ?", &[&name])
            .await?;
        Ok(row.is_some())
    }

    /// Whether a category other than `excluding` already has this name
    ///
    /// # Errors
    /// * If the statement fails
    pub async fn name_taken_by_other(&self, name: &str, excluding: i64) -> Result<bool> {
        let row = self
            .database
            .query_one(
                "SELECT id FROM categories WHERE name = ? AND id <> ?",
                &[&name, &excluding],
            )
            .await?;
        Ok(row.is_some())
    }

    /// Number of products in a category regardless of their status
    ///
    /// # Errors
    /// * If the statement fails
    pub async fn product_count(&self, id: i64) -> Result<i64> {
        let row = self
            .database
            .query_one(
                "SELECT COUNT(*) AS total FROM products WHERE category_id = ?",
                &[&id],
            )
            .await?;
        row.map_or(Ok(0), |row| integer(&row, "total"))
    }

    /// Insert a category and return it as stored
    ///
    /// # Errors
    /// * If the statement fails
    pub async fn create(&self, category: &NewCategory) -> Result<RowMap> {
        let result = self
            .database
            .write(
                "INSERT INTO categories (name, description) VALUES (?, ?)",
                &[&category.name.trim(), &category.description],
            )
            .await?;
        let id = generated_id(result)?;
        debug!("created category {id}");

        self.database
            .query_one(
                "SELECT id, name, description, created_at FROM categories WHERE id = ?",
                &[&id],
            )
            .await?
            .ok_or_else(|| Error::NotFound(format!("Category {id} not found")))
    }

    /// Apply the fields present in `changes` and return the number of rows updated
    ///
    /// # Errors
    /// * [`Validation`](Error::Validation) if `changes` is empty
    /// * If the statement fails
    pub async fn update(&self, id: i64, changes: &CategoryChanges) -> Result<u64> {
        if changes.is_empty() {
            return Err(Error::Validation(vec![
                "No valid fields to update".to_string(),
            ]));
        }

        let mut assignments = Vec::new();
        let mut values = Vec::new();
        if let Some(name) = &changes.name {
            assignments.push("name = ?");
            values.push(Value::from(name.trim()));
        }
        if let Some(description) = &changes.description {
            assignments.push("description = ?");
            values.push(Value::from(description.as_str()));
        }
        values.push(Value::I64(id));

        let sql = format!("UPDATE categories SET {} WHERE id = ?", assignments.join(", "));
        let result = self.database.write(&sql, &parameters(&values)).await?;
        debug!("updated category {id}");
        Ok(result.rows_affected().unwrap_or_default())
    }

    /// # Errors
    /// * If the statement fails
    pub async fn delete(&self, id: i64) -> Result<u64> {
        let result = self
            .database
            .write("DELETE FROM categories WHERE id = ?", &[&id])
            .await?;
        debug!("deleted category {id}");
        Ok(result.rows_affected().unwrap_or_default())
    }
}
