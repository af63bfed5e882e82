//! Input validation functions
//!
//! This module provides validation utilities for user input shared by the
//! backend and any client that wants to validate before submitting.

use rust_decimal::Decimal;

/// Validate email format
pub fn validate_email(email: &str) -> Result<(), String> {
    if email.is_empty() {
        return Err("Email cannot be empty".to_string());
    }
    if !email.contains('@') || !email.contains('.') {
        return Err("Invalid email format".to_string());
    }
    if email.len() > 255 {
        return Err("Email too long".to_string());
    }
    let email_regex = regex_lite::Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").unwrap();
    if !email_regex.is_match(email) {
        return Err("Invalid email format".to_string());
    }
    Ok(())
}

/// Validate password strength
pub fn validate_password(password: &str) -> Result<(), String> {
    if password.len() < 8 {
        return Err("Password must be at least 8 characters".to_string());
    }
    // bcrypt only looks at the first 72 bytes
    if password.len() > 72 {
        return Err("Password too long".to_string());
    }
    Ok(())
}

/// Validate a username
///
/// Usernames double as directory names under the image root, so they are
/// restricted to a conservative character set.
pub fn validate_username(username: &str) -> Result<(), String> {
    if username.len() < 3 {
        return Err("Username must be at least 3 characters".to_string());
    }
    if username.len() > 50 {
        return Err("Username must be at most 50 characters".to_string());
    }
    let username_regex = regex_lite::Regex::new(r"^[A-Za-z0-9_.\-]+$").unwrap();
    if !username_regex.is_match(username) || username.chars().all(|c| c == '.') {
        return Err("Username may only contain letters, digits, '_', '.' and '-'".to_string());
    }
    Ok(())
}

/// Validate a category name
pub fn validate_category_name(name: &str) -> Result<(), String> {
    if name.trim().is_empty() {
        return Err("Category Name is required!".to_string());
    }
    if name.len() > 100 {
        return Err("Category name too long".to_string());
    }
    Ok(())
}

/// Validate an item name
///
/// An item name becomes one directory level under its owner's image
/// directory and must therefore be a single plain path component.
pub fn validate_item_name(name: &str) -> Result<(), String> {
    if name.trim().is_empty() {
        return Err("Item name is required".to_string());
    }
    if name.len() > 100 {
        return Err("Item name too long".to_string());
    }
    if name == "." || name == ".." {
        return Err("Invalid item name".to_string());
    }
    if name.contains(['/', '\\', '\0']) {
        return Err("Item name cannot contain path separators".to_string());
    }
    Ok(())
}

/// Validate an item price
pub fn validate_price(price: Decimal) -> Result<(), String> {
    if price.is_sign_negative() {
        return Err("Price cannot be negative".to_string());
    }
    if price > Decimal::from(10_000_000) {
        return Err("Price unreasonably high".to_string());
    }
    Ok(())
}

/// Validate a discount given as a fraction between 0 and 1
pub fn validate_discount(discount: Decimal) -> Result<(), String> {
    if discount.is_sign_negative() || discount > Decimal::ONE {
        return Err("Discount must be between 0 and 1".to_string());
    }
    Ok(())
}

/// Validate a review rating (1-5 stars)
pub fn validate_rating(rating: i32) -> Result<(), String> {
    if !(1..=5).contains(&rating) {
        return Err("Rating must be between 1 and 5".to_string());
    }
    Ok(())
}
