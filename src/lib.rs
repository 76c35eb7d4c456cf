pub mod aggregate;
pub mod app;
pub mod auth;
pub mod config;
pub mod error;
pub mod model;
pub mod routes;
pub mod schema;
pub mod session;
pub mod state;

use chrono::Local;
use diesel::connection::SimpleConnection;
use diesel::prelude::*;
use diesel::SqliteConnection;
use tokio::net::TcpListener;
use tokio::signal::ctrl_c;
use tracing::{error, info};

use crate::config::Config;
use crate::error::{StartupError, StorageError};
use crate::model::{FeedbackEntry, FeedbackForm, NewFeedbackEntry};
use crate::schema::feedback;
use crate::state::State;

pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Handle to the feedback database. Every operation opens its own connection and drops it before
/// returning, so concurrent writers are serialized by SQLite's own locking.
#[derive(Debug, Clone)]
pub struct Storage {
    database_url: String,
}

impl Storage {
    pub fn new(database_url: impl Into<String>) -> Self {
        Self {
            database_url: database_url.into(),
        }
    }

    pub fn establish_connection(&self) -> Result<SqliteConnection, StorageError> {
        let mut conn = SqliteConnection::establish(&self.database_url).map_err(|source| {
            StorageError::Connection {
                url: self.database_url.clone(),
                source,
            }
        })?;

        // Set a timeout to wait on locked operations, and enable WAL mode to allow concurrent
        // reads during writes. Every commit is synced to disk before it returns.
        conn.batch_execute(
            "PRAGMA busy_timeout = 10000; \
            PRAGMA journal_mode = WAL; \
            PRAGMA synchronous = FULL;",
        )?;

        Ok(conn)
    }

    /// Creates the feedback table if it does not exist yet.
    pub fn ensure_schema(&self) -> Result<(), StorageError> {
        let mut conn = self.establish_connection()?;
        create_feedback_table(&mut conn)
    }

    pub fn insert(&self, entry: &NewFeedbackEntry) -> Result<FeedbackEntry, StorageError> {
        let mut conn = self.establish_connection()?;
        insert_feedback(&mut conn, entry)
    }

    pub fn list_all(&self) -> Result<Vec<FeedbackEntry>, StorageError> {
        let mut conn = self.establish_connection()?;
        get_all_feedback(&mut conn)
    }
}

pub fn create_feedback_table(conn: &mut SqliteConnection) -> Result<(), StorageError> {
    conn.batch_execute(
        "CREATE TABLE IF NOT EXISTS feedback ( \
            id INTEGER PRIMARY KEY AUTOINCREMENT, \
            overall TEXT NOT NULL DEFAULT '', \
            program TEXT NOT NULL DEFAULT '', \
            food TEXT NOT NULL DEFAULT '', \
            management TEXT NOT NULL DEFAULT '', \
            venue TEXT NOT NULL DEFAULT '', \
            favorite TEXT NOT NULL DEFAULT '', \
            suggestions TEXT NOT NULL DEFAULT '', \
            contribute TEXT NOT NULL DEFAULT '', \
            comments TEXT NOT NULL DEFAULT '', \
            timestamp TEXT NOT NULL \
        );",
    )?;
    Ok(())
}

/// Appends a row and returns it with the id SQLite assigned.
pub fn insert_feedback(
    conn: &mut SqliteConnection,
    entry: &NewFeedbackEntry,
) -> Result<FeedbackEntry, StorageError> {
    let stored = diesel::insert_into(feedback::table)
        .values(entry)
        .returning(FeedbackEntry::as_returning())
        .get_result(conn)?;
    Ok(stored)
}

/// Returns every row, most recent first.
pub fn get_all_feedback(conn: &mut SqliteConnection) -> Result<Vec<FeedbackEntry>, StorageError> {
    let rows = feedback::table
        .order(feedback::id.desc())
        .select(FeedbackEntry::as_select())
        .load(conn)?;
    Ok(rows)
}

/// Stores a form submission as-is. No field is required or validated; missing fields become
/// empty strings and the timestamp is the current local time.
pub fn submit_feedback(
    storage: &Storage,
    form: FeedbackForm,
) -> Result<FeedbackEntry, StorageError> {
    let timestamp = Local::now().format(TIMESTAMP_FORMAT).to_string();
    storage.insert(&form.into_new_entry(timestamp))
}

pub async fn start_server(config: Config) -> Result<(), StartupError> {
    info!("Preparing database at {}", config.database_url);
    let storage = Storage::new(config.database_url.clone());
    let schema_storage = storage.clone();
    tokio::task::spawn_blocking(move || schema_storage.ensure_schema())
        .await
        .map_err(std::io::Error::other)??;

    let address = config.address();
    let state = State::new(&config, storage);
    let app = routes::build_router(state);

    info!("Binding to {address}");
    let listener = TcpListener::bind(&address).await?;
    info!("listening on http://{address}");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Server shut down");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = ctrl_c().await {
            error!("Failed to install Ctrl+C handler: {e}");
            std::future::pending::<()>().await;
        }
        info!("Received Ctrl+C, shutting down");
    };

    #[cfg(unix)]
    let terminate = async {
        use tokio::signal::unix::{signal, SignalKind};

        match signal(SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
                info!("Received terminate signal, shutting down");
            }
            Err(e) => {
                error!("Failed to install signal handler: {e}");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}
