use sqlx::{postgres::PgPoolOptions, PgPool};

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("Error connecting to database: {0}")]
    Connect(#[source] sqlx::Error),
    #[error("Failed to run database migrations: {0}")]
    Migrate(#[from] sqlx::migrate::MigrateError),
}

#[derive(Clone)]
pub struct DatabaseConnection {
    pub pool: PgPool,
}

pub async fn connect(database_url: &str, max_connections: u32) -> Result<DatabaseConnection, Error> {
    let pool = PgPoolOptions::new()
        .max_connections(max_connections)
        .connect(database_url)
        .await
        .map_err(|err| {
            tracing::error!("{:}", err);
            Error::Connect(err)
        })?;

    Ok(DatabaseConnection { pool })
}

pub async fn migrate(db_conn: &DatabaseConnection) -> Result<(), Error> {
    sqlx::migrate!().run(&db_conn.pool).await.map_err(|err| {
        tracing::error!("{}", err);
        Error::Migrate(err)
    })
}
