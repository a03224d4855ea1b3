#[cfg(test)]
pub mod test_utils {
    use crate::auth::jwt::JwtSettings;
    use crate::router::create_router;
    use crate::schemas::AppState;
    use axum::Router;
    use migration::{Migrator, MigratorTrait};
    use sea_orm::{ActiveModelTrait, Database, DatabaseConnection, Set};
    use tracing::Level;
    use tracing_subscriber::FmtSubscriber;

    /// Create an in-memory SQLite database for testing
    pub async fn setup_test_db() -> DatabaseConnection {
        let db = Database::connect("sqlite::memory:")
            .await
            .expect("Failed to connect to in-memory database");

        // Run migrations
        Migrator::up(&db, None)
            .await
            .expect("Failed to run migrations");

        db
    }

    /// Create AppState for testing, with a deterministic signing key
    pub async fn setup_test_app_state() -> AppState {
        let db = setup_test_db().await;
        let jwt = JwtSettings::new("test-signing-secret", 900, 86_400);
        AppState { db, jwt }
    }

    /// Flip the admin bit on an existing user
    pub async fn promote_to_admin(db: &DatabaseConnection, user_id: i32) {
        use model::entities::user;
        use sea_orm::EntityTrait;

        let user_model = user::Entity::find_by_id(user_id)
            .one(db)
            .await
            .expect("Failed to load user")
            .expect("User to promote does not exist");
        let mut active: user::ActiveModel = user_model.into();
        active.is_admin = Set(true);
        active.update(db).await.expect("Failed to promote user");
    }

    /// Initialize tracing for tests with output to STDERR.
    ///
    /// The log level is determined by the RUST_LOG environment variable,
    /// defaulting to WARN if not set.
    fn init_test_tracing() -> tracing::subscriber::DefaultGuard {
        let log_level = std::env::var("RUST_LOG")
            .ok()
            .and_then(|level| match level.to_uppercase().as_str() {
                "ERROR" => Some(Level::ERROR),
                "WARN" => Some(Level::WARN),
                "INFO" => Some(Level::INFO),
                "DEBUG" => Some(Level::DEBUG),
                "TRACE" => Some(Level::TRACE),
                _ => None,
            })
            .unwrap_or(Level::WARN);

        let subscriber = FmtSubscriber::builder()
            .with_max_level(log_level)
            .with_writer(std::io::stderr) // Output to stderr, which is captured by tests
            .finish();
        tracing::subscriber::set_default(subscriber)
    }

    /// Create the axum app for testing, returning the state so tests can
    /// reach the database directly (e.g. to promote an admin).
    pub async fn setup_test_app() -> (Router, AppState) {
        let _ = init_test_tracing();

        let state = setup_test_app_state().await;
        let router = create_router(state.clone());
        (router, state)
    }
}
