use serde::{Deserialize, Serialize};

use crate::error::AppError;
use crate::models::AlertTypeFields;
use crate::routes::require;

#[derive(Debug, Deserialize)]
pub struct AlertTypeRequest {
    pub name: String,
    pub level: i32,
}

impl AlertTypeRequest {
    pub fn validate(self) -> Result<AlertTypeFields, AppError> {
        require("name", &self.name)?;
        if self.level <= 0 {
            return Err(AppError::Validation("level must be a positive integer".to_string()));
        }
        Ok(AlertTypeFields {
            name: self.name.trim().to_string(),
            level: self.level,
        })
    }
}

#[derive(Debug, Deserialize)]
pub struct AlertTypeQuery {
    pub name: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct DeletedResponse {
    pub id: String,
}
