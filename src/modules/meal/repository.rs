mod memory;
mod postgres;
#[cfg(test)]
pub mod testing;

pub use memory::InMemoryMealRepository;
pub use postgres::PostgresMealRepository;

use async_trait::async_trait;
use chrono::{DateTime, Duration, SubsecRound, Utc};
use serde::{Deserialize, Serialize};
use std::{fmt, str::FromStr};

use crate::utils::error;

#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq)]
#[serde(rename_all = "UPPERCASE")]
pub enum Difficulty {
    Easy,
    Medium,
    Hard,
}

impl Difficulty {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Easy => "EASY",
            Self::Medium => "MEDIUM",
            Self::Hard => "HARD",
        }
    }
}

impl FromStr for Difficulty {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "EASY" => Ok(Self::Easy),
            "MEDIUM" => Ok(Self::Medium),
            "HARD" => Ok(Self::Hard),
            _ => Err(()),
        }
    }
}

impl fmt::Display for Difficulty {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq)]
#[serde(rename_all = "UPPERCASE")]
pub enum Nutrition {
    Healthy,
    Unhealthy,
}

impl Nutrition {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Healthy => "HEALTHY",
            Self::Unhealthy => "UNHEALTHY",
        }
    }
}

impl FromStr for Nutrition {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "HEALTHY" => Ok(Self::Healthy),
            "UNHEALTHY" => Ok(Self::Unhealthy),
            _ => Err(()),
        }
    }
}

impl fmt::Display for Nutrition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Meal {
    pub id: String,
    pub owner_id: String,
    pub name: String,
    pub date: DateTime<Utc>,
    pub difficulty: Difficulty,
    pub nutrition: Nutrition,
    pub cuisine: String,
    pub rating: f64,
    pub notes: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Meal {
    pub fn new(id: String, payload: CreateMealPayload) -> Self {
        let CreateMealPayload {
            owner_id,
            fields,
            created_at,
            updated_at,
        } = payload;

        Self {
            id,
            owner_id,
            name: fields.name,
            date: fields.date,
            difficulty: fields.difficulty,
            nutrition: fields.nutrition,
            cuisine: fields.cuisine,
            rating: fields.rating,
            notes: fields.notes,
            created_at,
            updated_at,
        }
    }

    pub fn is_owned_by(&self, user_id: &str) -> bool {
        self.owner_id == user_id
    }

    /// Rewrites the editable fields; `id`, `owner_id` and `created_at` stay put.
    pub fn apply(&mut self, payload: UpdateMealPayload) {
        let UpdateMealPayload { fields, updated_at } = payload;

        self.name = fields.name;
        self.date = fields.date;
        self.difficulty = fields.difficulty;
        self.nutrition = fields.nutrition;
        self.cuisine = fields.cuisine;
        self.rating = fields.rating;
        self.notes = fields.notes;
        self.updated_at = updated_at;
    }

    /// Timestamp for the next write, never equal to or before the current one.
    pub fn next_updated_at(&self) -> DateTime<Utc> {
        let now = timestamp();
        let floor = self.updated_at + Duration::microseconds(1);

        if now > floor {
            now
        } else {
            floor
        }
    }
}

/// Current time at the precision the stores keep.
pub fn timestamp() -> DateTime<Utc> {
    Utc::now().trunc_subsecs(6)
}

/// The user editable part of a meal, already validated.
#[derive(Clone, Debug, PartialEq)]
pub struct MealFields {
    pub name: String,
    pub date: DateTime<Utc>,
    pub difficulty: Difficulty,
    pub nutrition: Nutrition,
    pub cuisine: String,
    pub rating: f64,
    pub notes: String,
}

pub struct CreateMealPayload {
    pub owner_id: String,
    pub fields: MealFields,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Clone)]
pub struct UpdateMealPayload {
    pub fields: MealFields,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("Meal not found")]
    NotFound,
    #[error("Store unavailable: {0}")]
    Unavailable(String),
    #[error("Store denied access: {0}")]
    Denied(String),
    #[error("Unexpected store error: {0}")]
    UnexpectedError(String),
}

impl From<Error> for error::Error {
    fn from(err: Error) -> Self {
        match err {
            Error::NotFound => Self::NotFound,
            Error::Unavailable(_) => Self::StoreUnavailable,
            Error::Denied(_) => Self::StoreDenied,
            Error::UnexpectedError(_) => Self::Unexpected,
        }
    }
}

/// Data access for meal records. Implementations do no authorization.
#[async_trait]
pub trait MealRepository: Send + Sync {
    /// Stores a new meal under a freshly assigned id.
    async fn create(&self, payload: CreateMealPayload) -> Result<Meal, Error>;

    async fn find_by_id(&self, id: &str) -> Result<Option<Meal>, Error>;

    /// Snapshot of every meal owned by `owner_id`, newest `date` first.
    async fn find_many_by_owner_id(&self, owner_id: &str) -> Result<Vec<Meal>, Error>;

    /// Fails with [`Error::NotFound`] when no meal has the given id.
    async fn update_by_id(&self, id: &str, payload: UpdateMealPayload) -> Result<(), Error>;

    /// Fails with [`Error::NotFound`] when no meal has the given id.
    async fn delete_by_id(&self, id: &str) -> Result<(), Error>;
}
