use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DbError {
    #[error("{entity} with ID {id} does not exist")]
    Missing { entity: &'static str, id: u64 },

    #[error("{entity} with ID {id} already exists")]
    AlreadyExists { entity: &'static str, id: u64 },

    #[error("{entity} with ID {id} was changed by another session")]
    Conflict { entity: &'static str, id: u64 },
}

impl DbError {
    pub(crate) fn missing(entity: &'static str, id: impl Into<u64>) -> Self {
        Self::Missing {
            entity,
            id: id.into(),
        }
    }

    pub(crate) fn already_exists(entity: &'static str, id: impl Into<u64>) -> Self {
        Self::AlreadyExists {
            entity,
            id: id.into(),
        }
    }

    pub(crate) fn conflict(entity: &'static str, id: impl Into<u64>) -> Self {
        Self::Conflict {
            entity,
            id: id.into(),
        }
    }
}
