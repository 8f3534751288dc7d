use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use lms_domain::Library;

use crate::validation::{Rules, Validate, ValidationErrors, NAME_MAX};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct LibraryDto {
    pub id: u64,
    pub name: String,
}

impl From<&Library> for LibraryDto {
    fn from(library: &Library) -> Self {
        Self {
            id: library.id().get(),
            name: library.name().to_string(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct CreateLibrary {
    pub name: String,
}

impl Validate for CreateLibrary {
    fn validate(&self) -> Result<(), ValidationErrors> {
        Rules::new().text("name", &self.name, NAME_MAX).finish()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct EditLibrary {
    pub id: u64,
    pub name: String,
}

impl Validate for EditLibrary {
    fn validate(&self) -> Result<(), ValidationErrors> {
        Rules::new()
            .positive("id", self.id)
            .text("name", &self.name, NAME_MAX)
            .finish()
    }
}
