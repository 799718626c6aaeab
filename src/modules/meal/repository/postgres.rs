use super::{CreateMealPayload, Error, Meal, MealRepository, UpdateMealPayload};
use crate::utils::database::DatabaseConnection;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use futures::{future, TryStreamExt};
use sqlx::FromRow;
use ulid::Ulid;

#[derive(FromRow)]
struct MealRow {
    id: String,
    owner_id: String,
    name: String,
    date: DateTime<Utc>,
    difficulty: String,
    nutrition: String,
    cuisine: String,
    rating: f64,
    notes: String,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl TryFrom<MealRow> for Meal {
    type Error = Error;

    fn try_from(row: MealRow) -> Result<Self, Self::Error> {
        let difficulty = row.difficulty.parse().map_err(|_| {
            Error::UnexpectedError(format!(
                "meal {} has unknown difficulty {}",
                row.id, row.difficulty
            ))
        })?;
        let nutrition = row.nutrition.parse().map_err(|_| {
            Error::UnexpectedError(format!(
                "meal {} has unknown nutrition {}",
                row.id, row.nutrition
            ))
        })?;

        Ok(Self {
            id: row.id,
            owner_id: row.owner_id,
            name: row.name,
            date: row.date,
            difficulty,
            nutrition,
            cuisine: row.cuisine,
            rating: row.rating,
            notes: row.notes,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}

/// Connection classes (08), operator shutdowns (57P0x) and insufficient privilege (42501).
fn classify_sqlstate(code: Option<&str>, message: String) -> Error {
    match code {
        Some("42501") => Error::Denied(message),
        Some(code) if code.starts_with("08") || code.starts_with("57P0") => {
            Error::Unavailable(message)
        }
        _ => Error::UnexpectedError(message),
    }
}

fn classify(err: sqlx::Error) -> Error {
    match err {
        sqlx::Error::PoolTimedOut | sqlx::Error::PoolClosed => Error::Unavailable(err.to_string()),
        sqlx::Error::Io(_) | sqlx::Error::Tls(_) => Error::Unavailable(err.to_string()),
        sqlx::Error::Database(ref db_err) => {
            classify_sqlstate(db_err.code().as_deref(), err.to_string())
        }
        _ => Error::UnexpectedError(err.to_string()),
    }
}

pub struct PostgresMealRepository {
    db_conn: DatabaseConnection,
}

impl PostgresMealRepository {
    pub fn new(db_conn: DatabaseConnection) -> Self {
        Self { db_conn }
    }
}

#[async_trait]
impl MealRepository for PostgresMealRepository {
    async fn create(&self, payload: CreateMealPayload) -> Result<Meal, Error> {
        let row = sqlx::query_as::<_, MealRow>(
            "
            INSERT INTO meals (
                id,
                owner_id,
                name,
                date,
                difficulty,
                nutrition,
                cuisine,
                rating,
                notes,
                created_at,
                updated_at
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11)
            RETURNING *
            ",
        )
        .bind(Ulid::new().to_string())
        .bind(payload.owner_id)
        .bind(payload.fields.name)
        .bind(payload.fields.date)
        .bind(payload.fields.difficulty.as_str())
        .bind(payload.fields.nutrition.as_str())
        .bind(payload.fields.cuisine)
        .bind(payload.fields.rating)
        .bind(payload.fields.notes)
        .bind(payload.created_at)
        .bind(payload.updated_at)
        .fetch_one(&self.db_conn.pool)
        .await
        .map_err(|err| {
            tracing::error!("Error occurred while trying to create a meal: {}", err);
            classify(err)
        })?;

        Meal::try_from(row)
    }

    async fn find_by_id(&self, id: &str) -> Result<Option<Meal>, Error> {
        sqlx::query_as::<_, MealRow>("SELECT * FROM meals WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.db_conn.pool)
            .await
            .map_err(|err| {
                tracing::error!("Error occurred while trying to fetch meal {}: {}", id, err);
                classify(err)
            })?
            .map(Meal::try_from)
            .transpose()
    }

    async fn find_many_by_owner_id(&self, owner_id: &str) -> Result<Vec<Meal>, Error> {
        sqlx::query_as::<_, MealRow>(
            "
            SELECT *
            FROM meals
            WHERE owner_id = $1
            ORDER BY date DESC, created_at DESC
            ",
        )
        .bind(owner_id)
        .fetch(&self.db_conn.pool)
        .map_err(|err| {
            tracing::error!("Error occurred while trying to fetch many meals: {}", err);
            classify(err)
        })
        .and_then(|row| future::ready(Meal::try_from(row)))
        .try_collect()
        .await
    }

    async fn update_by_id(&self, id: &str, payload: UpdateMealPayload) -> Result<(), Error> {
        let result = sqlx::query(
            "
            UPDATE meals SET
                name = $1,
                date = $2,
                difficulty = $3,
                nutrition = $4,
                cuisine = $5,
                rating = $6,
                notes = $7,
                updated_at = $8
            WHERE
                id = $9
            ",
        )
        .bind(payload.fields.name)
        .bind(payload.fields.date)
        .bind(payload.fields.difficulty.as_str())
        .bind(payload.fields.nutrition.as_str())
        .bind(payload.fields.cuisine)
        .bind(payload.fields.rating)
        .bind(payload.fields.notes)
        .bind(payload.updated_at)
        .bind(id)
        .execute(&self.db_conn.pool)
        .await
        .map_err(|err| {
            tracing::error!(
                "Error occurred while trying to update a meal by id {}: {}",
                id,
                err
            );
            classify(err)
        })?;

        match result.rows_affected() {
            0 => Err(Error::NotFound),
            _ => Ok(()),
        }
    }

    async fn delete_by_id(&self, id: &str) -> Result<(), Error> {
        let result = sqlx::query("DELETE FROM meals WHERE id = $1")
            .bind(id)
            .execute(&self.db_conn.pool)
            .await
            .map_err(|err| {
                tracing::error!(
                    "Error occurred while trying to delete a meal by id {}: {}",
                    id,
                    err
                );
                classify(err)
            })?;

        match result.rows_affected() {
            0 => Err(Error::NotFound),
            _ => Ok(()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pool_and_transport_failures_are_unavailable() {
        for err in [
            sqlx::Error::PoolTimedOut,
            sqlx::Error::PoolClosed,
            sqlx::Error::Io(std::io::Error::new(
                std::io::ErrorKind::ConnectionRefused,
                "connection refused",
            )),
        ] {
            assert!(matches!(classify(err), Error::Unavailable(_)));
        }
    }

    #[test]
    fn other_driver_errors_are_unexpected() {
        assert!(matches!(
            classify(sqlx::Error::RowNotFound),
            Error::UnexpectedError(_)
        ));
        assert!(matches!(
            classify(sqlx::Error::Protocol(String::from("bad message"))),
            Error::UnexpectedError(_)
        ));
    }

    #[test]
    fn sqlstates_map_to_their_kind() {
        let cases = [
            ("42501", "denied"),
            ("08006", "unavailable"),
            ("08001", "unavailable"),
            ("57P01", "unavailable"),
            ("23505", "unexpected"),
        ];

        for (code, kind) in cases {
            let actual = match classify_sqlstate(Some(code), code.to_string()) {
                Error::Denied(_) => "denied",
                Error::Unavailable(_) => "unavailable",
                Error::UnexpectedError(_) => "unexpected",
                Error::NotFound => "not found",
            };
            assert_eq!(actual, kind, "{code}");
        }

        assert!(matches!(
            classify_sqlstate(None, String::new()),
            Error::UnexpectedError(_)
        ));
    }
}
