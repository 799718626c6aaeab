use super::{CreateMealPayload, Error, Meal, MealRepository, UpdateMealPayload};
use async_trait::async_trait;

#[derive(Clone, Copy)]
pub enum Failure {
    Unavailable,
    Denied,
}

/// Fails every call the same way, like a store that is down or locked out.
pub struct FailingMealRepository {
    failure: Failure,
}

impl FailingMealRepository {
    pub fn new(failure: Failure) -> Self {
        Self { failure }
    }

    fn error(&self) -> Error {
        match self.failure {
            Failure::Unavailable => Error::Unavailable(String::from("connection refused")),
            Failure::Denied => Error::Denied(String::from("permission denied for table meals")),
        }
    }
}

#[async_trait]
impl MealRepository for FailingMealRepository {
    async fn create(&self, _payload: CreateMealPayload) -> Result<Meal, Error> {
        Err(self.error())
    }

    async fn find_by_id(&self, _id: &str) -> Result<Option<Meal>, Error> {
        Err(self.error())
    }

    async fn find_many_by_owner_id(&self, _owner_id: &str) -> Result<Vec<Meal>, Error> {
        Err(self.error())
    }

    async fn update_by_id(&self, _id: &str, _payload: UpdateMealPayload) -> Result<(), Error> {
        Err(self.error())
    }

    async fn delete_by_id(&self, _id: &str) -> Result<(), Error> {
        Err(self.error())
    }
}
