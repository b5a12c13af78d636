use crate::auth::ADMIN_ROLE;
use crate::pagination::{DEFAULT_LIMIT, PageRequest};
use serde::{Deserialize, Serialize};

/// Product status shown in listings unless another is requested
pub const DEFAULT_STATUS: &str = "active";

/// A user as returned to clients; the password hash is never included
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub id: i64,
    pub username: String,
    pub email: String,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub role: String,
}

impl User {
    #[must_use]
    pub fn is_admin(&self) -> bool {
        self.role == ADMIN_ROLE
    }
}

/// A user together with the stored password hash, used only to check credentials
#[derive(Clone, Debug)]
pub struct StoredUser {
    pub user: User,
    pub password_hash: String,
}

#[derive(Clone, Debug, Default, Deserialize)]
#[serde(default)]
pub struct Registration {
    pub username: String,
    pub email: String,
    pub password: String,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
}

impl Registration {
    /// Trim the username and lower-case the email
    #[must_use]
    pub fn normalized(mut self) -> Self {
        self.username = self.username.trim().to_string();
        self.email = self.email.trim().to_lowercase();
        self
    }
}

/// Login credentials; `username` accepts either the username or the email address
#[derive(Clone, Debug, Default, Deserialize)]
#[serde(default)]
pub struct Credentials {
    #[serde(alias = "email")]
    pub username: String,
    pub password: String,
}

#[derive(Clone, Debug, Default, Deserialize)]
#[serde(default)]
pub struct NewProduct {
    pub name: String,
    pub description: Option<String>,
    pub price: Option<f64>,
    pub quantity: Option<i64>,
    pub category_id: Option<i64>,
    pub image_url: Option<String>,
}

/// A partial product update; absent fields are left unchanged
#[derive(Clone, Debug, Default, Deserialize)]
#[serde(default)]
pub struct ProductChanges {
    pub name: Option<String>,
    pub description: Option<String>,
    pub price: Option<f64>,
    pub quantity: Option<i64>,
    pub category_id: Option<i64>,
    pub image_url: Option<String>,
    pub status: Option<String>,
}

impl ProductChanges {
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.name.is_none()
            && self.description.is_none()
            && self.price.is_none()
            && self.quantity.is_none()
            && self.category_id.is_none()
            && self.image_url.is_none()
            && self.status.is_none()
    }
}

#[derive(Clone, Debug, Default, Deserialize)]
#[serde(default)]
pub struct NewCategory {
    pub name: String,
    pub description: Option<String>,
}

/// Query string accepted by the product listing
#[derive(Clone, Debug, Default, Deserialize)]
#[serde(default)]
pub struct ProductQuery {
    pub page: Option<i64>,
    pub limit: Option<i64>,
    pub category_id: Option<i64>,
    pub status: Option<String>,
    pub search: Option<String>,
}

impl ProductQuery {
    #[must_use]
    pub fn page_request(&self) -> PageRequest {
        page_request(self.page, self.limit)
    }

    #[must_use]
    pub fn filter(&self) -> ProductFilter {
        ProductFilter {
            category_id: self.category_id,
            status: Some(
                self.status
                    .clone()
                    .unwrap_or_else(|| DEFAULT_STATUS.to_string()),
            ),
            search: trimmed(self.search.as_deref()),
        }
    }
}

/// Conditions applied to a product listing
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ProductFilter {
    pub category_id: Option<i64>,
    pub status: Option<String>,
    pub search: Option<String>,
}

/// A partial user update; absent fields are left unchanged
#[derive(Clone, Debug, Default, Deserialize)]
#[serde(default)]
pub struct UserChanges {
    pub username: Option<String>,
    pub email: Option<String>,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub role: Option<String>,
}

impl UserChanges {
    /// Trim the username and lower-case the email
    #[must_use]
    pub fn normalized(mut self) -> Self {
        self.username = self.username.map(|username| username.trim().to_string());
        self.email = self.email.map(|email| email.trim().to_lowercase());
        self
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.username.is_none()
            && self.email.is_none()
            && self.first_name.is_none()
            && self.last_name.is_none()
            && self.role.is_none()
    }
}

#[derive(Clone, Debug, Default, Deserialize)]
#[serde(default)]
pub struct PasswordChange {
    pub current_password: String,
    pub new_password: String,
    pub confirm_password: String,
}

/// Query string accepted by the user listing
#[derive(Clone, Debug, Default, Deserialize)]
#[serde(default)]
pub struct UserQuery {
    pub page: Option<i64>,
    pub limit: Option<i64>,
    pub role: Option<String>,
    pub search: Option<String>,
}

impl UserQuery {
    #[must_use]
    pub fn page_request(&self) -> PageRequest {
        page_request(self.page, self.limit)
    }

    #[must_use]
    pub fn filter(&self) -> UserFilter {
        UserFilter {
            role: self.role.clone(),
            search: trimmed(self.search.as_deref()),
        }
    }
}

/// Conditions applied to a user listing
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct UserFilter {
    pub role: Option<String>,
    pub search: Option<String>,
}

/// A partial category update; absent fields are left unchanged
#[derive(Clone, Debug, Default, Deserialize)]
#[serde(default)]
pub struct CategoryChanges {
    pub name: Option<String>,
    pub description: Option<String>,
}

impl CategoryChanges {
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.name.is_none() && self.description.is_none()
    }
}

/// `page` and `limit` query parameters
#[derive(Clone, Copy, Debug, Default, Deserialize)]
#[serde(default)]
pub struct PageQuery {
    pub page: Option<i64>,
    pub limit: Option<i64>,
}

impl PageQuery {
    #[must_use]
    pub fn page_request(&self) -> PageRequest {
        page_request(self.page, self.limit)
    }
}

fn page_request(page: Option<i64>, limit: Option<i64>) -> PageRequest {
    PageRequest::new(page.unwrap_or(1), limit.unwrap_or(DEFAULT_LIMIT))
}

fn trimmed(value: Option<&str>) -> Option<String> {
    value
        .map(str::trim)
        .filter(|value| !value.is_empty())
        .map(str::to_string)
}
