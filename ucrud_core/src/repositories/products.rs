use super::{generated_id, integer, parameters};
use crate::error::{Error, Result};
use crate::models::{NewProduct, ProductChanges, ProductFilter};
use crate::pagination::PageRequest;
use indoc::indoc;
use tracing::debug;
use ucrud_driver::{Database, RowMap, Value};

const SELECT_PRODUCTS: &str = indoc! {"
    SELECT
        p.id,
        p.name,
        p.description,
        p.price,
        p.quantity,
        p.category_id,
        c.name AS category_name,
        p.image_url,
        p.status,
        p.created_at,
        p.updated_at
    FROM products p
    LEFT JOIN categories c ON p.category_id = c.id
"};

#[derive(Clone, Debug)]
pub struct ProductRepository {
    database: Database,
}

impl ProductRepository {
    #[must_use]
    pub fn new(database: Database) -> Self {
        Self { database }
    }

    /// List one page of products matching the filter, newest first, along with the total number
    /// of matching products.
    ///
    /// # Errors
    /// * If a statement fails
    pub async fn list(
        &self,
        filter: &ProductFilter,
        page: PageRequest,
    ) -> Result<(Vec<RowMap>, i64)> {
        let mut conditions = Vec::new();
        let mut values = Vec::new();

        if let Some(category_id) = filter.category_id {
            conditions.push("p.category_id = ?");
            values.push(Value::I64(category_id));
        }
        if let Some(status) = &filter.status {
            conditions.push("p.status = ?");
            values.push(Value::from(status.as_str()));
        }
        if let Some(search) = &filter.search {
            let pattern = format!("%{search}%");
            conditions.push("(p.name LIKE ? OR p.description LIKE ?)");
            values.push(Value::from(pattern.as_str()));
            values.push(Value::from(pattern));
        }

        let where_clause = if conditions.is_empty() {
            String::new()
        } else {
            format!("WHERE {}\n", conditions.join(" AND "))
        };

        let count_sql = format!("SELECT COUNT(*) AS total FROM products p\n{where_clause}");
        let total = match self
            .database
            .query_one(&count_sql, &parameters(&values))
            .await?
        {
            Some(row) => integer(&row, "total")?,
            None => 0,
        };

        let list_sql = format!(
            "{SELECT_PRODUCTS}{where_clause}ORDER BY p.created_at DESC, p.id DESC\nLIMIT ? OFFSET ?"
        );
        values.push(Value::I64(page.limit()));
        values.push(Value::I64(page.offset()));
        let products = self
            .database
            .query(&list_sql, &parameters(&values))
            .await?;

        Ok((products, total))
    }

    /// # Errors
    /// * If the statement fails
    pub async fn find(&self, id: i64) -> Result<Option<RowMap>> {
        let sql = format!("{SELECT_PRODUCTS}WHERE p.id = ?");
        let product = self.database.query_one(&sql, &[&id]).await?;
        Ok(product)
    }

    /// # Errors
    /// * If the statement fails
    pub async fn exists(&self, id: i64) -> Result<bool> {
        let row = self
            .database
            .query_one("SELECT id FROM products WHERE id = ?", &[&id])
            .await?;
        Ok(row.is_some())
    }

    /// Insert a product and return its generated id
    ///
    /// # Errors
    /// * If the statement fails
    pub async fn create(&self, product: &NewProduct) -> Result<i64> {
        let mut columns = vec!["name", "description", "price", "quantity"];
        let mut values = vec![
            Value::from(product.name.trim()),
            product.description.clone().map_or(Value::Null, Value::String),
            Value::F64(product.price.unwrap_or_default()),
            Value::I64(product.quantity.unwrap_or(0)),
        ];
        // an untyped null cannot be bound to an integer column on every backend
        if let Some(category_id) = product.category_id {
            columns.push("category_id");
            values.push(Value::I64(category_id));
        }
        columns.push("image_url");
        values.push(product.image_url.clone().map_or(Value::Null, Value::String));

        let placeholders = vec!["?"; columns.len()].join(", ");
        let sql = format!(
            "INSERT INTO products ({}) VALUES ({placeholders})",
            columns.join(", ")
        );
        let id = generated_id(self.database.write(&sql, &parameters(&values)).await?)?;
        debug!("created product {id}");
        Ok(id)
    }

    /// Apply the fields present in `changes` and return the number of rows updated
    ///
    /// # Errors
    /// * [`Validation`](Error::Validation) if `changes` is empty
    /// * If the statement fails
    pub async fn update(&self, id: i64, changes: &ProductChanges) -> Result<u64> {
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
        if let Some(price) = changes.price {
            assignments.push("price = ?");
            values.push(Value::F64(price));
        }
        if let Some(quantity) = changes.quantity {
            assignments.push("quantity = ?");
            values.push(Value::I64(quantity));
        }
        if let Some(category_id) = changes.category_id {
            assignments.push("category_id = ?");
            values.push(Value::I64(category_id));
        }
        if let Some(image_url) = &changes.image_url {
            assignments.push("image_url = ?");
            values.push(Value::from(image_url.as_str()));
        }
        if let Some(status) = &changes.status {
            assignments.push("status = ?");
            values.push(Value::from(status.as_str()));
        }
        assignments.push("updated_at = CURRENT_TIMESTAMP");
        values.push(Value::I64(id));

        let sql = format!("UPDATE products SET {} WHERE id = ?", assignments.join(", "));
        let result = self.database.write(&sql, &parameters(&values)).await?;
        Ok(result.rows_affected().unwrap_or_default())
    }

    /// # Errors
    /// * If the statement fails
    pub async fn delete(&self, id: i64) -> Result<u64> {
        let result = self
            .database
            .write("DELETE FROM products WHERE id = ?", &[&id])
            .await?;
        Ok(result.rows_affected().unwrap_or_default())
    }
}
