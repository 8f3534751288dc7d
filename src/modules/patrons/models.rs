use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::modules::books::models::BookDto;
use crate::validation::{Rules, Validate, ValidationErrors, NAME_MAX};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct PatronDto {
    pub id: u64,
    pub name: String,
    /// Books the patron currently holds.
    pub checked_out_books: Vec<BookDto>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct CreatePatron {
    pub name: String,
}

impl Validate for CreatePatron {
    fn validate(&self) -> Result<(), ValidationErrors> {
        Rules::new().text("name", &self.name, NAME_MAX).finish()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct EditPatron {
    pub id: u64,
    pub name: String,
}

impl Validate for EditPatron {
    fn validate(&self) -> Result<(), ValidationErrors> {
        Rules::new()
            .positive("id", self.id)
            .text("name", &self.name, NAME_MAX)
            .finish()
    }
}
