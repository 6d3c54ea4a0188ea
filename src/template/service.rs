//! Template CRUD with placeholder extraction and default selection

use std::sync::Arc;

use chrono::Utc;
use uuid::Uuid;

use crate::defaults::{set_as_default, DefaultScope};
use crate::error::{AppError, Result};
use crate::metrics::AccountMetrics;
use crate::storage::StorageBackend;
use crate::user::AccessScope;

use super::seed::seeded_templates;
use super::substitution::template_variables;
use super::types::{CreateTemplateRequest, Template, TemplatePatch, UpdateTemplateRequest};

/// Owner-scoped template operations over a storage backend
#[derive(Clone)]
pub struct TemplateService {
    store: Arc<dyn StorageBackend>,
}

impl TemplateService {
    pub fn new(store: Arc<dyn StorageBackend>) -> Self {
        Self { store }
    }

    pub async fn list(&self, scope: AccessScope) -> Result<Vec<Template>> {
        Ok(self.store.list_templates(scope.owner()).await?)
    }

    /// Fetch a template visible to `scope`; others' templates read as missing
    pub async fn get(&self, scope: AccessScope, id: Uuid) -> Result<Template> {
        match self.store.get_template(id).await? {
            Some(template) if scope.permits(template.user_id) => Ok(template),
            _ => Err(AppError::NotFound("Template not found".to_string())),
        }
    }

    pub async fn create(&self, owner: Uuid, req: CreateTemplateRequest) -> Result<Template> {
        req.validate()?;

        if req.is_default {
            set_as_default(self.store.as_ref(), DefaultScope::Templates { owner }, None).await?;
        }

        let template = Template {
            id: Uuid::new_v4(),
            user_id: owner,
            variables: template_variables(&req.subject, &req.body),
            name: req.name,
            category: req.category,
            subject: req.subject,
            body: req.body,
            is_default: req.is_default,
            created_at: Utc::now(),
        };

        let template = self.store.insert_template(template).await?;
        AccountMetrics::record_templates_created(1);

        tracing::info!(
            user_id = %owner,
            template_id = %template.id,
            is_default = template.is_default,
            "Template created"
        );

        Ok(template)
    }

    /// Merge the supplied fields into a template.
    ///
    /// Placeholders are recomputed from the effective subject and body.
    pub async fn update(
        &self,
        scope: AccessScope,
        id: Uuid,
        req: UpdateTemplateRequest,
    ) -> Result<Template> {
        req.validate()?;
        let existing = self.get(scope, id).await?;

        let subject = req.subject.as_deref().unwrap_or(&existing.subject);
        let body = req.body.as_deref().unwrap_or(&existing.body);
        let variables = template_variables(subject, body);

        if req.is_default == Some(true) {
            set_as_default(
                self.store.as_ref(),
                DefaultScope::Templates {
                    owner: existing.user_id,
                },
                Some(id),
            )
            .await?;
        }

        let patch = TemplatePatch {
            name: req.name,
            category: req.category,
            subject: req.subject,
            body: req.body,
            variables: Some(variables),
            is_default: req.is_default,
        };

        self.store
            .update_template(id, patch)
            .await?
            .ok_or_else(|| AppError::NotFound("Template not found".to_string()))
    }

    pub async fn delete(&self, scope: AccessScope, id: Uuid) -> Result<()> {
        if self.store.delete_template(id, scope.owner()).await? {
            tracing::info!(template_id = %id, "Template deleted");
            Ok(())
        } else {
            Err(AppError::NotFound("Template not found".to_string()))
        }
    }

    /// Copy one template to every user. Copies are never default.
    ///
    /// Returns the number of users that received a copy.
    pub async fn bulk_create(&self, req: CreateTemplateRequest) -> Result<usize> {
        req.validate()?;
        let variables = template_variables(&req.subject, &req.body);

        let templates: Vec<Template> = self
            .store
            .list_users()
            .await?
            .into_iter()
            .map(|user| Template {
                id: Uuid::new_v4(),
                user_id: user.id,
                name: req.name.clone(),
                category: req.category,
                subject: req.subject.clone(),
                body: req.body.clone(),
                variables: variables.clone(),
                is_default: false,
                created_at: Utc::now(),
            })
            .collect();

        if templates.is_empty() {
            return Ok(0);
        }

        let count = self.store.insert_templates(templates).await?;
        AccountMetrics::record_templates_created(count as u64);
        tracing::info!(count = count, "Template bulk-created for all users");
        Ok(count)
    }

    /// Insert the starter templates for a newly created account
    pub async fn seed_for_user(&self, owner: Uuid) -> Result<usize> {
        let count = self.store.insert_templates(seeded_templates(owner)).await?;
        AccountMetrics::record_templates_created(count as u64);
        Ok(count)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::MemoryStorage;
    use crate::template::TemplateCategory;

    fn service() -> TemplateService {
        TemplateService::new(Arc::new(MemoryStorage::new()))
    }

    fn request(name: &str, is_default: bool) -> CreateTemplateRequest {
        CreateTemplateRequest {
            name: name.to_string(),
            category: TemplateCategory::Request,
            subject: "Hello {{name}}".to_string(),
            body: "On {{date}} about {{topic}}".to_string(),
            is_default,
        }
    }

    #[tokio::test]
    async fn test_create_extracts_variables() {
        let svc = service();
        let template = svc.create(Uuid::new_v4(), request("A", false)).await.unwrap();
        assert_eq!(template.variables, vec!["date", "name", "topic"]);
    }

    #[tokio::test]
    async fn test_update_recomputes_variables_from_effective_text() {
        let svc = service();
        let owner = Uuid::new_v4();
        let template = svc.create(owner, request("A", false)).await.unwrap();

        let updated = svc
            .update(
                AccessScope::Owner(owner),
                template.id,
                UpdateTemplateRequest {
                    body: Some("Plain body with {{room}}".to_string()),
                    ..Default::default()
                },
            )
            .await
            .unwrap();

        assert_eq!(updated.variables, vec!["name", "room"]);
        assert_eq!(updated.subject, "Hello {{name}}");
    }

    #[tokio::test]
    async fn test_other_owner_sees_not_found() {
        let svc = service();
        let owner = Uuid::new_v4();
        let template = svc.create(owner, request("A", false)).await.unwrap();

        let err = svc
            .get(AccessScope::Owner(Uuid::new_v4()), template.id)
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::NotFound(_)));

        assert!(svc.get(AccessScope::Admin, template.id).await.is_ok());
    }

    #[tokio::test]
    async fn test_latest_default_wins() {
        let svc = service();
        let owner = Uuid::new_v4();
        let first = svc.create(owner, request("A", true)).await.unwrap();
        let second = svc.create(owner, request("B", false)).await.unwrap();

        svc.update(
            AccessScope::Owner(owner),
            second.id,
            UpdateTemplateRequest {
                is_default: Some(true),
                ..Default::default()
            },
        )
        .await
        .unwrap();

        let all = svc.list(AccessScope::Owner(owner)).await.unwrap();
        let defaults: Vec<_> = all.iter().filter(|t| t.is_default).collect();
        assert_eq!(defaults.len(), 1);
        assert_eq!(defaults[0].id, second.id);
        assert_ne!(defaults[0].id, first.id);
    }

    #[tokio::test]
    async fn test_bulk_create_with_no_users() {
        let svc = service();
        assert_eq!(svc.bulk_create(request("A", true)).await.unwrap(), 0);
    }
}
