/// Error type for GraphQL resolvers.
///
/// async-graphql has a blanket `impl<T: Display + Send + Sync + 'static> From<T> for Error`,
/// so any type implementing `Display` auto-converts via `?`.
///
///   - `From<sqlx::Error>` logs the DB detail and shows a sanitized message to clients;
///     unique and foreign-key violations get a specific message
///   - `GqlError::new("…")` carries a one-off message
#[derive(Debug)]
pub enum GqlError {
    Sqlx(sqlx::Error),
    Custom(String),
}

impl GqlError {
    pub fn new(msg: impl Into<String>) -> Self {
        GqlError::Custom(msg.into())
    }
}

impl std::fmt::Display for GqlError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            GqlError::Sqlx(sqlx::Error::Database(db)) if db.is_unique_violation() => {
                write!(f, "A record with this value already exists.")
            }
            GqlError::Sqlx(sqlx::Error::Database(db)) if db.is_foreign_key_violation() => {
                write!(f, "A referenced record does not exist.")
            }
            GqlError::Sqlx(_) => write!(f, "Internal database error"),
            GqlError::Custom(msg) => write!(f, "{msg}"),
        }
    }
}

impl std::error::Error for GqlError {}

/// The real error is logged here, once; clients only see the sanitized text.
impl From<sqlx::Error> for GqlError {
    fn from(e: sqlx::Error) -> Self {
        match &e {
            sqlx::Error::Database(db)
                if db.is_unique_violation() || db.is_foreign_key_violation() =>
            {
                tracing::warn!("Rejected write: {db}");
            }
            _ => tracing::error!("Database error: {e}"),
        }
        GqlError::Sqlx(e)
    }
}

/// Extension trait that converts any `Result<T, E>` where `E: Display`
/// into `async_graphql::Result<T>` with a contextual message prefix.
///
/// Usage: `Uuid::parse_str(id).gql_err("Invalid product ID")?`
pub trait ResultExt<T> {
    fn gql_err(self, context: &str) -> std::result::Result<T, async_graphql::Error>;
}

impl<T, E: std::fmt::Display> ResultExt<T> for std::result::Result<T, E> {
    fn gql_err(self, context: &str) -> std::result::Result<T, async_graphql::Error> {
        self.map_err(|e| async_graphql::Error::new(format!("{context}: {e}")))
    }
}

/// Routes repository failures through [`GqlError`] so clients never see
/// raw SQL errors.
///
/// Usage: `catalogue::get_product(&state.db, id).await.db_err()?`
pub trait DbResultExt<T> {
    fn db_err(self) -> std::result::Result<T, GqlError>;
}

impl<T> DbResultExt<T> for sqlx::Result<T> {
    fn db_err(self) -> std::result::Result<T, GqlError> {
        self.map_err(GqlError::from)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::{Arc, Mutex};

    #[test]
    fn database_errors_are_sanitized() {
        let err = GqlError::from(sqlx::Error::RowNotFound);
        assert_eq!(err.to_string(), "Internal database error");
    }

    #[derive(Clone, Default)]
    struct Captured(Arc<Mutex<Vec<u8>>>);

    impl std::io::Write for Captured {
        fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
            self.0.lock().unwrap().extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> std::io::Result<()> {
            Ok(())
        }
    }

    #[test]
    fn database_errors_are_logged_once_however_often_displayed() {
        let captured = Captured::default();
        let writer = captured.clone();
        let subscriber = tracing_subscriber::fmt()
            .with_writer(move || writer.clone())
            .with_ansi(false)
            .finish();

        tracing::subscriber::with_default(subscriber, || {
            let err = GqlError::from(sqlx::Error::RowNotFound);
            for _ in 0..3 {
                assert_eq!(err.to_string(), "Internal database error");
            }
        });

        let logs = String::from_utf8(captured.0.lock().unwrap().clone()).unwrap();
        assert_eq!(logs.matches("Database error").count(), 1, "{logs}");
    }

    #[test]
    fn gql_err_prefixes_context() {
        let parsed: Result<uuid::Uuid, _> = uuid::Uuid::parse_str("nope");
        let err = parsed.gql_err("Invalid product ID").unwrap_err();
        assert!(err.message.starts_with("Invalid product ID: "));
    }
}
