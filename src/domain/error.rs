#[derive(Debug, thiserror::Error)]
pub enum KanbanError {
    #[error("not found: {0}")]
    NotFound(String),

    #[error("validation error: {0}")]
    Validation(String),

    #[error("invalid move: {0}")]
    InvalidTransition(String),

    #[error("card is blocked: {0}")]
    Blocked(String),

    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("migration error: {0}")]
    Migration(#[from] sqlx::migrate::MigrateError),

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

impl KanbanError {
    /// True for errors caused by the user's input rather than the environment.
    pub fn is_user_error(&self) -> bool {
        matches!(
            self,
            KanbanError::NotFound(_)
                | KanbanError::Validation(_)
                | KanbanError::InvalidTransition(_)
                | KanbanError::Blocked(_)
        )
    }

    pub fn exit_code(&self) -> u8 {
        if self.is_user_error() {
            2
        } else {
            1
        }
    }

    /// Failures of the database or its schema. Their driver details are only
    /// logged; [`user_message`](Self::user_message) summarises them.
    pub fn is_persistence_error(&self) -> bool {
        matches!(self, KanbanError::Database(_) | KanbanError::Migration(_))
    }

    /// Message shown on the console.
    pub fn user_message(&self) -> String {
        match self {
            KanbanError::Database(err) => match err {
                sqlx::Error::Database(db) if db.is_unique_violation() => {
                    "a record with the same unique value already exists".into()
                }
                sqlx::Error::Database(db) if db.is_foreign_key_violation() => {
                    "the referenced record does not exist".into()
                }
                sqlx::Error::PoolTimedOut | sqlx::Error::Io(_) => {
                    "could not reach the database".into()
                }
                _ => "database operation failed".into(),
            },
            KanbanError::Migration(err) => {
                format!("could not migrate the database schema: {}", err)
            }
            other => other.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn user_errors_exit_with_two() {
        assert_eq!(KanbanError::NotFound("Card 1".into()).exit_code(), 2);
        assert_eq!(KanbanError::Blocked("Card 1".into()).exit_code(), 2);
        assert_eq!(
            KanbanError::Io(std::io::Error::other("disk")).exit_code(),
            1
        );
    }

    #[test]
    fn database_errors_hide_driver_details() {
        let err = KanbanError::Database(sqlx::Error::RowNotFound);
        assert_eq!(err.user_message(), "database operation failed");
        assert!(err.is_persistence_error());
    }

    #[test]
    fn user_message_is_stable_and_only_persistence_errors_are_flagged() {
        let err = KanbanError::Database(sqlx::Error::PoolTimedOut);
        assert_eq!(err.user_message(), err.user_message());
        assert_eq!(err.user_message(), "could not reach the database");

        assert!(!KanbanError::Validation("Title".into()).is_persistence_error());
        assert!(!KanbanError::Io(std::io::Error::other("disk")).is_persistence_error());
    }
}
