use super::repository::Meal;
use crate::utils::error::Error;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Operation {
    List,
    Get,
    Create,
    Update,
    Delete,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DenyReason {
    Forbidden,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Decision {
    Permit,
    Deny(DenyReason),
}

impl Decision {
    pub fn into_result(self) -> Result<(), Error> {
        match self {
            Self::Permit => Ok(()),
            Self::Deny(DenyReason::Forbidden) => Err(Error::Forbidden),
        }
    }
}

/// List and create only ever touch the actor's own scope. Everything else
/// needs the stored meal and its owner must be the actor.
pub fn authorize(operation: Operation, actor_id: &str, meal: Option<&Meal>) -> Decision {
    match operation {
        Operation::List | Operation::Create => Decision::Permit,
        Operation::Get | Operation::Update | Operation::Delete => match meal {
            Some(meal) if meal.is_owned_by(actor_id) => Decision::Permit,
            Some(meal) => {
                tracing::warn!(
                    "User {} attempted {:?} on meal {} they do not own",
                    actor_id,
                    operation,
                    meal.id
                );
                Decision::Deny(DenyReason::Forbidden)
            }
            None => Decision::Deny(DenyReason::Forbidden),
        },
    }
}
