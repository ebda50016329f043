pub mod admin;
pub mod alert_type;
pub mod entry;
pub mod location;
pub mod user;

use crate::error::AppError;
use crate::models::entry::is_valid_coordinate;

pub const MIN_PASSWORD_LENGTH: usize = 6;

pub(crate) fn require(field: &str, value: &str) -> Result<(), AppError> {
    if value.trim().is_empty() {
        return Err(AppError::Validation(format!("{field} is required")));
    }
    Ok(())
}

/// Loose shape check: one `@` with text on both sides and a dotted domain.
pub(crate) fn validate_email(email: &str) -> Result<(), AppError> {
    let valid = email
        .split_once('@')
        .is_some_and(|(local, domain)| {
            !local.is_empty()
                && !domain.contains('@')
                && domain
                    .split_once('.')
                    .is_some_and(|(host, tld)| !host.is_empty() && !tld.is_empty())
        });
    if !valid || email.chars().any(char::is_whitespace) {
        return Err(AppError::Validation("email is not a valid address".to_string()));
    }
    Ok(())
}

pub(crate) fn validate_password(password: &str) -> Result<(), AppError> {
    if password.chars().count() < MIN_PASSWORD_LENGTH {
        return Err(AppError::Validation(format!(
            "password must be at least {MIN_PASSWORD_LENGTH} characters"
        )));
    }
    Ok(())
}

pub(crate) fn validate_coordinates(latitude: f64, longitude: f64) -> Result<(), AppError> {
    if !is_valid_coordinate(latitude, longitude) {
        return Err(AppError::Validation(
            "lat must be within [-90, 90] and lng within [-180, 180]".to_string(),
        ));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn email_shapes() {
        assert!(validate_email("ada@mrkt.ng").is_ok());
        assert!(validate_email("ada.lovelace+1@mail.mrkt.ng").is_ok());
        assert!(validate_email("ada").is_err());
        assert!(validate_email("@mrkt.ng").is_err());
        assert!(validate_email("ada@mrkt").is_err());
        assert!(validate_email("ada@@mrkt.ng").is_err());
        assert!(validate_email("ada @mrkt.ng").is_err());
    }

    #[test]
    fn required_and_length_rules() {
        assert!(require("title", "  ").is_err());
        assert!(require("title", "Robbery").is_ok());
        assert!(validate_password("12345").is_err());
        assert!(validate_password("123456").is_ok());
    }

    #[test]
    fn coordinate_ranges() {
        assert!(validate_coordinates(90.0, -180.0).is_ok());
        assert!(validate_coordinates(90.1, 0.0).is_err());
        assert!(validate_coordinates(0.0, 180.5).is_err());
        assert!(validate_coordinates(f64::NAN, 0.0).is_err());
    }
}
