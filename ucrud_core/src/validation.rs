use crate::error::{Error, Result};
use crate::models::{
    CategoryChanges, Credentials, NewCategory, NewProduct, PageQuery, PasswordChange,
    ProductChanges, ProductQuery, Registration, UserChanges, UserQuery,
};
use crate::pagination::{DEFAULT_LIMIT, MAX_LIMIT, PageRequest};
use regex::Regex;
use url::Url;

const USERNAME_PATTERN: &str = r"^[A-Za-z0-9_]+$";
const EMAIL_PATTERN: &str = r"^[a-zA-Z0-9._%+-]+@[a-zA-Z0-9.-]+\.[a-zA-Z]{2,}$";

const STATUSES: [&str; 2] = ["active", "inactive"];
const ROLES: [&str; 2] = ["admin", "user"];

/// Request payloads that can be checked before touching the database
pub trait Validate {
    /// # Errors
    /// * [`Validation`](Error::Validation) listing every rule that failed
    fn validate(&self) -> Result<()>;
}

#[derive(Debug, Default)]
struct Violations(Vec<String>);

impl Violations {
    fn check(&mut self, valid: bool, message: &str) {
        if !valid {
            self.0.push(message.to_string());
        }
    }

    fn check_page(&mut self, page: Option<i64>, limit: Option<i64>) {
        self.check(
            page.is_none_or(|page| page >= 1),
            "Page must be a positive integer",
        );
        self.check(
            limit.is_none_or(|limit| (1..=MAX_LIMIT).contains(&limit)),
            "Limit must be between 1 and 100",
        );
        let request = PageRequest::new(page.unwrap_or(1), limit.unwrap_or(DEFAULT_LIMIT));
        self.check(
            request.page() < 1 || request.limit() < 1 || request.checked_offset().is_some(),
            "Page is out of range",
        );
    }

    fn finish(self) -> Result<()> {
        if self.0.is_empty() {
            Ok(())
        } else {
            Err(Error::Validation(self.0))
        }
    }
}

fn is_match(pattern: &str, value: &str) -> Result<bool> {
    let regex = Regex::new(pattern).map_err(|error| Error::Configuration(error.to_string()))?;
    Ok(regex.is_match(value))
}

fn length(value: &str) -> usize {
    value.chars().count()
}

fn at_most(value: Option<&String>, max: usize) -> bool {
    value.is_none_or(|value| length(value) <= max)
}

fn is_web_url(value: &str) -> bool {
    Url::parse(value).is_ok_and(|url| matches!(url.scheme(), "http" | "https") && url.has_host())
}

impl Validate for Registration {
    fn validate(&self) -> Result<()> {
        let mut violations = Violations::default();
        violations.check(
            (3..=50).contains(&length(&self.username)),
            "Username must be between 3 and 50 characters",
        );
        violations.check(
            is_match(USERNAME_PATTERN, &self.username)?,
            "Username can only contain letters, numbers, and underscores",
        );
        violations.check(
            is_match(EMAIL_PATTERN, &self.email)?,
            "Please provide a valid email",
        );
        violations.check(
            length(&self.password) >= 6,
            "Password must be at least 6 characters long",
        );
        violations.check(
            at_most(self.first_name.as_ref(), 50),
            "First name must be less than 50 characters",
        );
        violations.check(
            at_most(self.last_name.as_ref(), 50),
            "Last name must be less than 50 characters",
        );
        violations.finish()
    }
}

impl Validate for Credentials {
    fn validate(&self) -> Result<()> {
        let mut violations = Violations::default();
        violations.check(!self.username.trim().is_empty(), "Username is required");
        violations.check(!self.password.is_empty(), "Password is required");
        violations.finish()
    }
}

impl Validate for NewProduct {
    fn validate(&self) -> Result<()> {
        let mut violations = Violations::default();
        violations.check(!self.name.trim().is_empty(), "Product name is required");
        violations.check(
            length(&self.name) <= 100,
            "Product name must be less than 100 characters",
        );
        violations.check(
            at_most(self.description.as_ref(), 1000),
            "Description must be less than 1000 characters",
        );
        violations.check(
            self.price.is_some_and(|price| price.is_finite() && price >= 0.0),
            "Price must be a positive number",
        );
        violations.check(
            self.quantity.is_none_or(|quantity| quantity >= 0),
            "Quantity must be a non-negative integer",
        );
        violations.check(
            self.category_id.is_none_or(|id| id >= 1),
            "Category ID must be a positive integer",
        );
        violations.check(
            self.image_url.as_deref().is_none_or(is_web_url),
            "Image URL must be a valid URL",
        );
        violations.finish()
    }
}

impl Validate for ProductChanges {
    fn validate(&self) -> Result<()> {
        let mut violations = Violations::default();
        violations.check(
            self.name
                .as_ref()
                .is_none_or(|name| (1..=100).contains(&length(name.trim()))),
            "Product name must be between 1 and 100 characters",
        );
        violations.check(
            at_most(self.description.as_ref(), 1000),
            "Description must be less than 1000 characters",
        );
        violations.check(
            self.price
                .is_none_or(|price| price.is_finite() && price >= 0.0),
            "Price must be a positive number",
        );
        violations.check(
            self.quantity.is_none_or(|quantity| quantity >= 0),
            "Quantity must be a non-negative integer",
        );
        violations.check(
            self.category_id.is_none_or(|id| id >= 1),
            "Category ID must be a positive integer",
        );
        violations.check(
            self.image_url.as_deref().is_none_or(is_web_url),
            "Image URL must be a valid URL",
        );
        violations.check(
            self.status
                .as_deref()
                .is_none_or(|status| STATUSES.contains(&status)),
            "Status must be either active or inactive",
        );
        violations.finish()
    }
}

impl Validate for NewCategory {
    fn validate(&self) -> Result<()> {
        let mut violations = Violations::default();
        violations.check(!self.name.trim().is_empty(), "Category name is required");
        violations.check(
            length(&self.name) <= 100,
            "Category name must be less than 100 characters",
        );
        violations.check(
            at_most(self.description.as_ref(), 500),
            "Description must be less than 500 characters",
        );
        violations.finish()
    }
}

impl Validate for ProductQuery {
    fn validate(&self) -> Result<()> {
        let mut violations = Violations::default();
        violations.check_page(self.page, self.limit);
        violations.check(
            self.category_id.is_none_or(|id| id >= 1),
            "Category ID must be a positive integer",
        );
        violations.check(
            self.status
                .as_deref()
                .is_none_or(|status| STATUSES.contains(&status)),
            "Status must be either active or inactive",
        );
        violations.check(
            at_most(self.search.as_ref(), 100),
            "Search term must be less than 100 characters",
        );
        violations.finish()
    }
}

impl Validate for UserChanges {
    fn validate(&self) -> Result<()> {
        let mut violations = Violations::default();
        if let Some(username) = &self.username {
            violations.check(
                (3..=50).contains(&length(username)),
                "Username must be between 3 and 50 characters",
            );
            violations.check(
                is_match(USERNAME_PATTERN, username)?,
                "Username can only contain letters, numbers, and underscores",
            );
        }
        if let Some(email) = &self.email {
            violations.check(is_match(EMAIL_PATTERN, email)?, "Please provide a valid email");
        }
        violations.check(
            at_most(self.first_name.as_ref(), 50),
            "First name must be less than 50 characters",
        );
        violations.check(
            at_most(self.last_name.as_ref(), 50),
            "Last name must be less than 50 characters",
        );
        violations.check(
            self.role.as_deref().is_none_or(|role| ROLES.contains(&role)),
            "Role must be either admin or user",
        );
        violations.finish()
    }
}

impl Validate for PasswordChange {
    fn validate(&self) -> Result<()> {
        let mut violations = Violations::default();
        violations.check(
            !self.current_password.is_empty(),
            "Current password is required",
        );
        violations.check(
            length(&self.new_password) >= 6,
            "New password must be at least 6 characters long",
        );
        violations.check(
            self.confirm_password == self.new_password,
            "Password confirmation does not match new password",
        );
        violations.finish()
    }
}

impl Validate for UserQuery {
    fn validate(&self) -> Result<()> {
        let mut violations = Violations::default();
        violations.check_page(self.page, self.limit);
        violations.check(
            self.role.as_deref().is_none_or(|role| ROLES.contains(&role)),
            "Role must be either admin or user",
        );
        violations.check(
            at_most(self.search.as_ref(), 100),
            "Search term must be less than 100 characters",
        );
        violations.finish()
    }
}

impl Validate for CategoryChanges {
    fn validate(&self) -> Result<()> {
        let mut violations = Violations::default();
        violations.check(
            self.name
                .as_ref()
                .is_none_or(|name| (1..=100).contains(&length(name.trim()))),
            "Category name must be between 1 and 100 characters",
        );
        violations.check(
            at_most(self.description.as_ref(), 500),
            "Description must be less than 500 characters",
        );
        violations.finish()
    }
}

impl Validate for PageQuery {
    fn validate(&self) -> Result<()> {
        let mut violations = Violations::default();
        violations.check_page(self.page, self.limit);
        violations.finish()
    }
}
