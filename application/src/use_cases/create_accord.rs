//! Create Accord use case
//!
//! Creates a new accord in `Draft` together with its owner's
//! participant row. The accord stays in `Draft` until the first
//! invitation is redeemed.

use crate::ports::clock::Clock;
use crate::ports::store::{StoreError, WorkflowStore};
use accord_domain::{Accord, AccordId, Participant, UserId, ValidationError};
use std::sync::Arc;
use thiserror::Error;
use tracing::info;

/// Errors from accord creation
#[derive(Error, Debug)]
pub enum CreateAccordError {
    #[error(transparent)]
    Invalid(#[from] ValidationError),

    #[error("storage failure: {0}")]
    Store(#[from] StoreError),
}

impl CreateAccordError {
    pub fn code(&self) -> &'static str {
        match self {
            CreateAccordError::Invalid(_) => "invalid_input",
            CreateAccordError::Store(_) => "persistence_failure",
        }
    }
}

/// Input for [`CreateAccordUseCase`]
#[derive(Debug, Clone)]
pub struct CreateAccordInput {
    pub title: String,
    pub owner: UserId,
}

/// Output of [`CreateAccordUseCase`]
#[derive(Debug, Clone, serde::Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateAccordOutput {
    pub accord_id: AccordId,
}

/// Use case for creating an accord
pub struct CreateAccordUseCase {
    store: Arc<dyn WorkflowStore>,
    clock: Arc<dyn Clock>,
}

impl CreateAccordUseCase {
    pub fn new(store: Arc<dyn WorkflowStore>, clock: Arc<dyn Clock>) -> Self {
        Self { store, clock }
    }

    pub async fn execute(
        &self,
        input: CreateAccordInput,
    ) -> Result<CreateAccordOutput, CreateAccordError> {
        let now = self.clock.now();
        let accord = Accord::new(input.title, input.owner.clone(), now)?;
        let accord_id = accord.id;

        self.store.insert_accord(accord).await?;
        self.store
            .insert_participant(Participant::owner(accord_id, input.owner, now))
            .await?;

        info!(accord = %accord_id, "accord created in draft");
        Ok(CreateAccordOutput { accord_id })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ports::clock::ManualClock;
    use crate::testing::MockStore;
    use accord_domain::AccordPhase;
    use chrono::Utc;

    #[tokio::test]
    async fn test_create_accord_with_owner_row() {
        let store = Arc::new(MockStore::new());
        let use_case = CreateAccordUseCase::new(
            store.clone(),
            Arc::new(ManualClock::new(Utc::now())),
        );

        let output = use_case
            .execute(CreateAccordInput {
                title: "Vacation plans".to_string(),
                owner: UserId::new("owner"),
            })
            .await
            .unwrap();

        let accord = store.get_accord(output.accord_id).await.unwrap();
        assert_eq!(accord.phase, AccordPhase::Draft);
        assert_eq!(accord.current_round, 1);

        let participants = store.list_participants(output.accord_id).await.unwrap();
        assert_eq!(participants.len(), 1);
        assert!(participants[0].is_owner());
    }

    #[tokio::test]
    async fn test_empty_title_maps_to_validation_code() {
        let store = Arc::new(MockStore::new());
        let use_case =
            CreateAccordUseCase::new(store, Arc::new(ManualClock::new(Utc::now())));

        let err = use_case
            .execute(CreateAccordInput {
                title: "  ".to_string(),
                owner: UserId::new("owner"),
            })
            .await
            .unwrap_err();
        assert_eq!(err.code(), "invalid_input");
    }
}
