//! Default-selection invariant enforcement.
//!
//! At most one template per owner, and at most one recipient per
//! (owner, direction), carries `is_default = true`. Writers call
//! [`set_as_default`] before persisting a record with the flag set. Clearing
//! is not rolled back if that later write fails, so a scope may briefly hold
//! no default at all.

use uuid::Uuid;

use crate::error::Result;
use crate::metrics::DefaultMetrics;
use crate::recipient::{Recipient, RecipientType};
use crate::storage::StorageBackend;
use crate::template::Template;

/// Grouping key within which at most one default may exist
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DefaultScope {
    Templates { owner: Uuid },
    Recipients { owner: Uuid, direction: RecipientType },
}

impl DefaultScope {
    pub fn owner(&self) -> Uuid {
        match self {
            DefaultScope::Templates { owner } | DefaultScope::Recipients { owner, .. } => *owner,
        }
    }

    fn collection(&self) -> &'static str {
        match self {
            DefaultScope::Templates { .. } => "templates",
            DefaultScope::Recipients { .. } => "recipients",
        }
    }
}

/// Clear the default flag on every other record in `scope`.
///
/// `record_id` is the record about to be saved as default. For a new record
/// pass `None` so the whole scope is cleared; for an existing record its own
/// id is excluded so it keeps its flag across a re-save.
pub async fn set_as_default(
    store: &dyn StorageBackend,
    scope: DefaultScope,
    record_id: Option<Uuid>,
) -> Result<u64> {
    let cleared = match scope {
        DefaultScope::Templates { owner } => {
            store.clear_default_templates(owner, record_id).await?
        }
        DefaultScope::Recipients { owner, direction } => {
            store
                .clear_default_recipients(owner, direction, record_id)
                .await?
        }
    };

    DefaultMetrics::record_cleared(scope.collection(), cleared);
    tracing::debug!(
        owner = %scope.owner(),
        collection = scope.collection(),
        cleared = cleared,
        "Cleared previous defaults"
    );

    Ok(cleared)
}

/// The owner's default template, if any.
///
/// Tolerates more than one flagged record and picks the oldest.
pub async fn current_default_template(
    store: &dyn StorageBackend,
    owner: Uuid,
) -> Result<Option<Template>> {
    let mut defaults = store.find_default_templates(owner).await?;
    if defaults.len() > 1 {
        tracing::warn!(
            owner = %owner,
            count = defaults.len(),
            "Multiple default templates found"
        );
    }
    Ok(if defaults.is_empty() {
        None
    } else {
        Some(defaults.swap_remove(0))
    })
}

/// Default recipients of `direction` for the owner.
///
/// Every flagged record is returned; normally there is at most one.
pub async fn current_default_recipients(
    store: &dyn StorageBackend,
    owner: Uuid,
    direction: RecipientType,
) -> Result<Vec<Recipient>> {
    Ok(store.find_default_recipients(owner, Some(direction)).await?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    use crate::storage::{MemoryStorage, RecipientStore, TemplateStore};
    use crate::template::TemplateCategory;

    fn template(owner: Uuid, is_default: bool) -> Template {
        Template {
            id: Uuid::new_v4(),
            user_id: owner,
            name: "T".to_string(),
            category: TemplateCategory::Other,
            subject: "S".to_string(),
            body: "B".to_string(),
            variables: vec![],
            is_default,
            created_at: Utc::now(),
        }
    }

    #[tokio::test]
    async fn test_resave_keeps_own_flag() {
        let store = MemoryStorage::new();
        let owner = Uuid::new_v4();
        let existing = store.insert_template(template(owner, true)).await.unwrap();

        let cleared = set_as_default(
            &store,
            DefaultScope::Templates { owner },
            Some(existing.id),
        )
        .await
        .unwrap();

        assert_eq!(cleared, 0);
        let current = current_default_template(&store, owner).await.unwrap();
        assert_eq!(current.map(|t| t.id), Some(existing.id));
    }

    #[tokio::test]
    async fn test_new_record_clears_whole_scope() {
        let store = MemoryStorage::new();
        let owner = Uuid::new_v4();
        store.insert_template(template(owner, true)).await.unwrap();

        set_as_default(&store, DefaultScope::Templates { owner }, None)
            .await
            .unwrap();

        assert!(current_default_template(&store, owner)
            .await
            .unwrap()
            .is_none());
    }

    #[tokio::test]
    async fn test_recipient_scope_is_per_direction() {
        let store = MemoryStorage::new();
        let owner = Uuid::new_v4();
        let cc = Recipient {
            id: Uuid::new_v4(),
            user_id: owner,
            name: "Office".to_string(),
            email: "office@example.com".to_string(),
            recipient_type: RecipientType::Cc,
            is_default: true,
            created_at: Utc::now(),
        };
        store.insert_recipient(cc.clone()).await.unwrap();

        set_as_default(
            &store,
            DefaultScope::Recipients {
                owner,
                direction: RecipientType::To,
            },
            None,
        )
        .await
        .unwrap();

        let defaults = current_default_recipients(&store, owner, RecipientType::Cc)
            .await
            .unwrap();
        assert_eq!(defaults, vec![cc]);
    }
}
