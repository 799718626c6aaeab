use super::{CreateMealPayload, Error, Meal, MealRepository, UpdateMealPayload};
use async_trait::async_trait;
use std::collections::HashMap;
use tokio::sync::RwLock;
use ulid::Ulid;

/// Process-local store. Nothing survives a restart.
#[derive(Default)]
pub struct InMemoryMealRepository {
    meals: RwLock<HashMap<String, Meal>>,
}

impl InMemoryMealRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl MealRepository for InMemoryMealRepository {
    async fn create(&self, payload: CreateMealPayload) -> Result<Meal, Error> {
        let mut meals = self.meals.write().await;

        let mut id = Ulid::new().to_string();
        while meals.contains_key(&id) {
            id = Ulid::new().to_string();
        }

        let meal = Meal::new(id.clone(), payload);
        meals.insert(id, meal.clone());

        Ok(meal)
    }

    async fn find_by_id(&self, id: &str) -> Result<Option<Meal>, Error> {
        Ok(self.meals.read().await.get(id).cloned())
    }

    async fn find_many_by_owner_id(&self, owner_id: &str) -> Result<Vec<Meal>, Error> {
        let mut meals = self
            .meals
            .read()
            .await
            .values()
            .filter(|meal| meal.is_owned_by(owner_id))
            .cloned()
            .collect::<Vec<_>>();

        meals.sort_by(|a, b| {
            b.date
                .cmp(&a.date)
                .then_with(|| b.created_at.cmp(&a.created_at))
        });

        Ok(meals)
    }

    async fn update_by_id(&self, id: &str, payload: UpdateMealPayload) -> Result<(), Error> {
        self.meals
            .write()
            .await
            .get_mut(id)
            .map(|meal| meal.apply(payload))
            .ok_or(Error::NotFound)
    }

    async fn delete_by_id(&self, id: &str) -> Result<(), Error> {
        self.meals
            .write()
            .await
            .remove(id)
            .map(|_| ())
            .ok_or(Error::NotFound)
    }
}
