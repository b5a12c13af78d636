use super::{generated_id, integer, optional_text, parameters, text};
use crate::auth::USER_ROLE;
use crate::error::{Error, Result};
use crate::models::{Registration, StoredUser, User, UserChanges, UserFilter};
use crate::pagination::PageRequest;
use tracing::debug;
use ucrud_driver::{Database, RowMap, Value};

const SELECT_USERS: &str = "SELECT id, username, email, first_name, last_name, role FROM users";

#[derive(Clone, Debug)]
pub struct UserRepository {
    database: Database,
}

impl UserRepository {
    #[must_use]
    pub fn new(database: Database) -> Self {
        Self { database }
    }

    /// # Errors
    /// * If the statement fails
    pub async fn find_by_id(&self, id: i64) -> Result<Option<User>> {
        let row = self
            .database
            .query_one(
                &format!("{SELECT_USERS} WHERE id = ?"),
                &[&id],
            )
            .await?;
        row.as_ref().map(to_user).transpose()
    }

    /// Find a user by username or email, including the password hash
    ///
    /// # Errors
    /// * If the statement fails
    pub async fn find_by_login(&self, login: &str) -> Result<Option<StoredUser>> {
        let row = self
            .database
            .query_one(
                "SELECT id, username, email, password, first_name, last_name, role FROM users \
                 WHERE username = ? OR email = ?",
                &[&login, &login.to_lowercase()],
            )
            .await?;
        let Some(row) = row else {
            return Ok(None);
        };

        Ok(Some(StoredUser {
            user: to_user(&row)?,
            password_hash: text(&row, "password")?,
        }))
    }

    /// Whether the username or the email is already registered
    ///
    /// # Errors
    /// * If the statement fails
    pub async fn exists(&self, username: &str, email: &str) -> Result<bool> {
        let rows = self
            .database
            .query(
                "SELECT id FROM users WHERE username = ? OR email = ?",
                &[&username, &email],
            )
            .await?;
        Ok(!rows.is_empty())
    }

    /// List one page of users matching the filter, newest first, along with the total number of
    /// matching users.
    ///
    /// # Errors
    /// * If a statement fails
    pub async fn list(&self, filter: &UserFilter, page: PageRequest) -> Result<(Vec<User>, i64)> {
        let mut conditions = Vec::new();
        let mut values = Vec::new();

        if let Some(role) = &filter.role {
            conditions.push("role = ?");
            values.push(Value::from(role.as_str()));
        }
        if let Some(search) = &filter.search {
            let pattern = format!("%{search}%");
            conditions.push(
                "(username LIKE ? OR email LIKE ? OR first_name LIKE ? OR last_name LIKE ?)",
            );
            for _ in 0..4 {
                values.push(Value::from(pattern.as_str()));
            }
        }

        let where_clause = if conditions.is_empty() {
            String::new()
        } else {
            format!(" WHERE {}", conditions.join(" AND "))
        };

        let count_sql = format!("SELECT COUNT(*) AS total FROM users{where_clause}");
        let total = match self
            .database
            .query_one(&count_sql, &parameters(&values))
            .await?
        {
            Some(row) => integer(&row, "total")?,
            None => 0,
        };

        let list_sql =
            format!("{SELECT_USERS}{where_clause} ORDER BY created_at DESC, id DESC LIMIT ? OFFSET ?");
        values.push(Value::I64(page.limit()));
        values.push(Value::I64(page.offset()));
        let rows = self
            .database
            .query(&list_sql, &parameters(&values))
            .await?;
        let users = rows.iter().map(to_user).collect::<Result<Vec<_>>>()?;

        Ok((users, total))
    }

    /// Whether another user already has this username
    ///
    /// # Errors
    /// * If the statement fails
    pub async fn username_taken(&self, username: &str, excluding: i64) -> Result<bool> {
        self.taken("SELECT id FROM users WHERE username = ? AND id <> ?", username, excluding)
            .await
    }

    /// Whether another user already has this email
    ///
    /// # Errors
    /// * If the statement fails
    pub async fn email_taken(&self, email: &str, excluding: i64) -> Result<bool> {
        self.taken("SELECT id FROM users WHERE email = ? AND id <> ?", email, excluding)
            .await
    }

    async fn taken(&self, sql: &str, value: &str, excluding: i64) -> Result<bool> {
        let row = self.database.query_one(sql, &[&value, &excluding]).await?;
        Ok(row.is_some())
    }

    /// The stored password hash of a user
    ///
    /// # Errors
    /// * If the statement fails
    pub async fn password_hash(&self, id: i64) -> Result<Option<String>> {
        let row = self
            .database
            .query_one("SELECT password FROM users WHERE id = ?", &[&id])
            .await?;
        row.as_ref().map(|row| text(row, "password")).transpose()
    }

    /// Apply the fields present in `changes` and return the number of rows updated
    ///
    /// # Errors
    /// * [`Validation`](Error::Validation) if `changes` is empty
    /// * If the statement fails
    pub async fn update(&self, id: i64, changes: &UserChanges) -> Result<u64> {
        if changes.is_empty() {
            return Err(Error::Validation(vec![
                "No valid fields to update".to_string(),
            ]));
        }

        let fields = [
            ("username = ?", &changes.username),
            ("email = ?", &changes.email),
            ("first_name = ?", &changes.first_name),
            ("last_name = ?", &changes.last_name),
            ("role = ?", &changes.role),
        ];
        let mut assignments = Vec::new();
        let mut values = Vec::new();
        for (assignment, value) in fields {
            if let Some(value) = value {
                assignments.push(assignment);
                values.push(Value::from(value.as_str()));
            }
        }
        assignments.push("updated_at = CURRENT_TIMESTAMP");
        values.push(Value::I64(id));

        let sql = format!("UPDATE users SET {} WHERE id = ?", assignments.join(", "));
        let result = self.database.write(&sql, &parameters(&values)).await?;
        debug!("updated user {id}");
        Ok(result.rows_affected().unwrap_or_default())
    }

    /// # Errors
    /// * If the statement fails
    pub async fn set_password(&self, id: i64, password_hash: &str) -> Result<u64> {
        let result = self
            .database
            .write(
                "UPDATE users SET password = ?, updated_at = CURRENT_TIMESTAMP WHERE id = ?",
                &[&password_hash, &id],
            )
            .await?;
        Ok(result.rows_affected().unwrap_or_default())
    }

    /// # Errors
    /// * If the statement fails
    pub async fn delete(&self, id: i64) -> Result<u64> {
        let result = self
            .database
            .write("DELETE FROM users WHERE id = ?", &[&id])
            .await?;
        debug!("deleted user {id}");
        Ok(result.rows_affected().unwrap_or_default())
    }

    /// Insert a user with the default role
    ///
    /// # Errors
    /// * If the statement fails, including unique constraint violations
    pub async fn create(&self, registration: &Registration, password_hash: &str) -> Result<User> {
        let result = self
            .database
            .write(
                "INSERT INTO users (username, email, password, first_name, last_name) \
                 VALUES (?, ?, ?, ?, ?)",
                &[
                    &registration.username,
                    &registration.email,
                    &password_hash,
                    &registration.first_name,
                    &registration.last_name,
                ],
            )
            .await?;
        let id = generated_id(result)?;
        debug!("created user {id}");

        Ok(User {
            id,
            username: registration.username.clone(),
            email: registration.email.clone(),
            first_name: registration.first_name.clone(),
            last_name: registration.last_name.clone(),
            role: USER_ROLE.to_string(),
        })
    }
}

fn to_user(row: &RowMap) -> Result<User> {
    Ok(User {
        id: integer(row, "id")?,
        username: text(row, "username")?,
        email: text(row, "email")?,
        first_name: optional_text(row, "first_name")?,
        last_name: optional_text(row, "last_name")?,
        role: text(row, "role")?,
    })
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::repositories::test::database;

    fn registration(username: &str, email: &str) -> Registration {
        Registration {
            username: username.to_string(),
            email: email.to_string(),
            password: "secret1".to_string(),
            first_name: Some("Alice".to_string()),
            last_name: None,
        }
    }

    #[tokio::test]
    async fn test_create_and_find() -> anyhow::Result<()> {
        let (_directory, database) = database().await?;
        let users = UserRepository::new(database);

        let created = users
            .create(&registration("alice", "alice@example.com"), "hash")
            .await?;
        assert!(created.id > 0);
        assert_eq!(created.role, "user");

        let found = users.find_by_id(created.id).await?;
        assert_eq!(found, Some(created.clone()));
        assert_eq!(users.find_by_id(created.id + 1).await?, None);
        Ok(())
    }

    #[tokio::test]
    async fn test_generated_ids_are_distinct() -> anyhow::Result<()> {
        let (_directory, database) = database().await?;
        let users = UserRepository::new(database);

        let alice = users
            .create(&registration("alice", "alice@example.com"), "hash")
            .await?;
        let bob = users
            .create(&registration("bob", "bob@example.com"), "hash")
            .await?;
        assert_ne!(alice.id, bob.id);
        Ok(())
    }

    #[tokio::test]
    async fn test_find_by_login() -> anyhow::Result<()> {
        let (_directory, database) = database().await?;
        let users = UserRepository::new(database);
        users
            .create(&registration("alice", "alice@example.com"), "hash")
            .await?;

        let by_username = users.find_by_login("alice").await?;
        let by_email = users.find_by_login("Alice@Example.com").await?;

        let Some(stored) = by_username else {
            panic!("expected user by username");
        };
        assert_eq!(stored.password_hash, "hash");
        assert_eq!(stored.user.first_name, Some("Alice".to_string()));
        assert!(by_email.is_some());
        assert!(users.find_by_login("carol").await?.is_none());
        Ok(())
    }

    #[tokio::test]
    async fn test_exists() -> anyhow::Result<()> {
        let (_directory, database) = database().await?;
        let users = UserRepository::new(database);
        users
            .create(&registration("alice", "alice@example.com"), "hash")
            .await?;

        assert!(users.exists("alice", "other@example.com").await?);
        assert!(users.exists("other", "alice@example.com").await?);
        assert!(!users.exists("bob", "bob@example.com").await?);
        Ok(())
    }

    #[tokio::test]
    async fn test_duplicate_username() -> anyhow::Result<()> {
        let (_directory, database) = database().await?;
        let users = UserRepository::new(database);
        users
            .create(&registration("alice", "alice@example.com"), "hash")
            .await?;

        let result = users
            .create(&registration("alice", "other@example.com"), "hash")
            .await;
        assert!(matches!(
            result,
            Err(Error::Driver(
                ucrud_driver::Error::StatementExecutionFailure(_)
            ))
        ));
        Ok(())
    }

    #[tokio::test]
    async fn test_list() -> anyhow::Result<()> {
        let (_directory, database) = database().await?;
        let users = UserRepository::new(database.clone());
        for name in ["alice", "bob", "carol"] {
            users
                .create(&registration(name, &format!("{name}@example.com")), "hash")
                .await?;
        }
        database
            .write("UPDATE users SET role = 'admin' WHERE username = ?", &[&"carol"])
            .await?;

        let (page, total) = users
            .list(&UserFilter::default(), PageRequest::new(1, 2))
            .await?;
        assert_eq!(total, 3);
        assert_eq!(page.len(), 2);
        assert_eq!(page[0].username, "carol");

        let admins = UserFilter {
            role: Some("admin".to_string()),
            search: None,
        };
        let (page, total) = users.list(&admins, PageRequest::new(1, 10)).await?;
        assert_eq!(total, 1);
        assert_eq!(page[0].role, "admin");

        let search = UserFilter {
            role: None,
            search: Some("bob@".to_string()),
        };
        let (page, total) = users.list(&search, PageRequest::new(1, 10)).await?;
        assert_eq!(total, 1);
        assert_eq!(page[0].username, "bob");
        Ok(())
    }

    #[tokio::test]
    async fn test_taken_excludes_the_user() -> anyhow::Result<()> {
        let (_directory, database) = database().await?;
        let users = UserRepository::new(database);
        let alice = users
            .create(&registration("alice", "alice@example.com"), "hash")
            .await?;
        let bob = users
            .create(&registration("bob", "bob@example.com"), "hash")
            .await?;

        assert!(!users.username_taken("alice", alice.id).await?);
        assert!(users.username_taken("alice", bob.id).await?);
        assert!(!users.email_taken("alice@example.com", alice.id).await?);
        assert!(users.email_taken("alice@example.com", bob.id).await?);
        Ok(())
    }

    #[tokio::test]
    async fn test_update() -> anyhow::Result<()> {
        let (_directory, database) = database().await?;
        let users = UserRepository::new(database);
        let alice = users
            .create(&registration("alice", "alice@example.com"), "hash")
            .await?;

        let changes = UserChanges {
            last_name: Some("Smith".to_string()),
            role: Some("admin".to_string()),
            ..UserChanges::default()
        };
        assert_eq!(users.update(alice.id, &changes).await?, 1);
        assert_eq!(users.update(alice.id + 1, &changes).await?, 0);

        let Some(updated) = users.find_by_id(alice.id).await? else {
            panic!("expected user {}", alice.id);
        };
        assert_eq!(updated.last_name, Some("Smith".to_string()));
        assert_eq!(updated.first_name, Some("Alice".to_string()));
        assert_eq!(updated.role, "admin");

        let result = users.update(alice.id, &UserChanges::default()).await;
        assert!(matches!(result, Err(Error::Validation(_))));
        Ok(())
    }

    #[tokio::test]
    async fn test_set_password() -> anyhow::Result<()> {
        let (_directory, database) = database().await?;
        let users = UserRepository::new(database);
        let alice = users
            .create(&registration("alice", "alice@example.com"), "hash")
            .await?;

        assert_eq!(users.set_password(alice.id, "new-hash").await?, 1);
        assert_eq!(
            users.password_hash(alice.id).await?,
            Some("new-hash".to_string())
        );
        assert_eq!(users.password_hash(alice.id + 1).await?, None);
        Ok(())
    }

    #[tokio::test]
    async fn test_delete() -> anyhow::Result<()> {
        let (_directory, database) = database().await?;
        let users = UserRepository::new(database);
        let alice = users
            .create(&registration("alice", "alice@example.com"), "hash")
            .await?;

        assert_eq!(users.delete(alice.id).await?, 1);
        assert_eq!(users.delete(alice.id).await?, 0);
        assert!(users.find_by_id(alice.id).await?.is_none());
        Ok(())
    }
}
