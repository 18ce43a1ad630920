//! Cleanup template service.
//!
//! Enforces the built-in guard and field validation, delegates the
//! versioned writes to [`CleanupTemplateRepo`], and broadcasts each
//! successful mutation after its transaction has committed.

use std::collections::HashMap;
use std::sync::Arc;

use jobs2go_core::cleanup_template::{
    copy_name, normalize_tags, validate_template_fields, CANNOT_DELETE_BUILT_IN,
    CANNOT_RESTORE_BUILT_IN, CANNOT_UPDATE_BUILT_IN, DEFAULT_UPDATE_DESCRIPTION,
    TEMPLATE_NOT_FOUND, VERSION_NOT_FOUND,
};
use jobs2go_core::error::CoreError;
use jobs2go_core::types::DbId;
use jobs2go_db::models::cleanup_template::{
    CleanupTemplate, CreateTemplate, TemplateVersion, TemplateWithVersion, UpdateTemplate,
};
use jobs2go_db::repositories::{CleanupTemplateRepo, TemplateVersionRepo};
use jobs2go_db::DbPool;
use jobs2go_events::{Notifier, OperationEvent, OperationKind, OperationStatus};

use crate::error::{AppError, AppResult};

/// Template reads and versioned writes.
pub struct TemplateService {
    pub(super) pool: DbPool,
    pub(super) notifier: Arc<dyn Notifier>,
}

impl TemplateService {
    pub fn new(pool: DbPool, notifier: Arc<dyn Notifier>) -> Self {
        Self { pool, notifier }
    }

    // -----------------------------------------------------------------------
    // Reads
    // -----------------------------------------------------------------------

    /// All templates with their current versions, built-ins first.
    pub async fn get_templates(&self, include_built_in: bool) -> AppResult<Vec<TemplateWithVersion>> {
        let templates = CleanupTemplateRepo::list(&self.pool, include_built_in).await?;
        self.attach_current_versions(templates).await
    }

    /// Templates carrying any of `tags`.
    pub async fn get_templates_by_tags(&self, tags: &[String]) -> AppResult<Vec<TemplateWithVersion>> {
        let templates = CleanupTemplateRepo::list_by_tags(&self.pool, tags).await?;
        self.attach_current_versions(templates).await
    }

    /// Case-insensitive name/description match, or an exact tag.
    pub async fn search_templates(&self, query: &str) -> AppResult<Vec<TemplateWithVersion>> {
        let templates = CleanupTemplateRepo::search(&self.pool, query).await?;
        self.attach_current_versions(templates).await
    }

    /// One template with its current version and, optionally, its history
    /// newest first.
    pub async fn get_template_by_id(
        &self,
        id: DbId,
        include_versions: bool,
    ) -> AppResult<Option<TemplateWithVersion>> {
        let Some(template) = CleanupTemplateRepo::find_by_id(&self.pool, id).await? else {
            return Ok(None);
        };

        let versions = TemplateVersionRepo::list_by_template(&self.pool, id).await?;
        let current_version = template
            .current_version_id
            .and_then(|vid| versions.iter().find(|v| v.id == vid).cloned());

        Ok(Some(TemplateWithVersion {
            template,
            current_version,
            versions: include_versions.then_some(versions),
        }))
    }

    /// Version history, newest first.
    pub async fn get_template_versions(&self, id: DbId) -> AppResult<Vec<TemplateVersion>> {
        Ok(TemplateVersionRepo::list_by_template(&self.pool, id).await?)
    }

    pub async fn get_template_version(
        &self,
        id: DbId,
        version_number: i32,
    ) -> AppResult<Option<TemplateVersion>> {
        Ok(TemplateVersionRepo::find_by_number(&self.pool, id, version_number).await?)
    }

    // -----------------------------------------------------------------------
    // Writes
    // -----------------------------------------------------------------------

    /// Create a user template with version 1.
    pub async fn create_template(&self, mut dto: CreateTemplate) -> AppResult<TemplateWithVersion> {
        check_fields(validate_template_fields(&dto.field_check()))?;
        dto.tags = normalize_tags(&dto.tags);

        let created = CleanupTemplateRepo::create_with_initial_version(&self.pool, &dto).await?;
        let template = &created.template;
        tracing::info!(template_id = template.id, name = %template.name, "Template created");

        let mut event = OperationEvent::new(
            OperationKind::TemplateCreated,
            OperationStatus::Success,
            format!("Template \"{}\" created", template.name),
        )
        .with_detail("templateId", template.id)
        .with_detail("templateName", template.name.as_str())
        .with_detail("versionNumber", 1);
        if let Some(version) = &created.current_version {
            event = event.with_detail("versionId", version.id);
        }
        self.notifier.notify(event).await;

        Ok(created)
    }

    /// Apply a partial update as a new version.
    ///
    /// A missing template is reported with the built-in message, so callers
    /// cannot tell the two apart.
    pub async fn update_template(
        &self,
        id: DbId,
        mut dto: UpdateTemplate,
    ) -> AppResult<TemplateWithVersion> {
        let current = self.find_mutable(id, CANNOT_UPDATE_BUILT_IN).await?;
        check_fields(validate_template_fields(&dto.merged_check(&current)))?;
        if let Some(tags) = dto.tags.take() {
            dto.tags = Some(normalize_tags(&tags));
        }

        let change_description = dto
            .change_description
            .clone()
            .filter(|d| !d.trim().is_empty())
            .unwrap_or_else(|| DEFAULT_UPDATE_DESCRIPTION.to_string());

        let updated =
            CleanupTemplateRepo::update_with_new_version(&self.pool, id, &dto, &change_description)
                .await?
                .ok_or_else(|| forbidden(CANNOT_UPDATE_BUILT_IN))?;

        let version_number = current_version_number(&updated);
        tracing::info!(template_id = id, version_number, "Template updated");

        self.notifier
            .notify(
                OperationEvent::new(
                    OperationKind::TemplateUpdated,
                    OperationStatus::Success,
                    format!("Template \"{}\" updated", updated.template.name),
                )
                .with_detail("templateId", id)
                .with_detail("templateName", updated.template.name.as_str())
                .with_detail("versionNumber", version_number)
                .with_detail("changeDescription", change_description),
            )
            .await;

        Ok(updated)
    }

    /// Delete a user template and its history.
    pub async fn delete_template(&self, id: DbId) -> AppResult<()> {
        let current = self.find_mutable(id, CANNOT_DELETE_BUILT_IN).await?;

        if !CleanupTemplateRepo::delete(&self.pool, id).await? {
            return Err(forbidden(CANNOT_DELETE_BUILT_IN));
        }
        tracing::info!(template_id = id, name = %current.name, "Template deleted");

        self.notifier
            .notify(
                OperationEvent::new(
                    OperationKind::TemplateDeleted,
                    OperationStatus::Success,
                    format!("Template \"{}\" deleted", current.name),
                )
                .with_detail("templateId", id)
                .with_detail("templateName", current.name.as_str()),
            )
            .await;

        Ok(())
    }

    /// Copy a template (built-in or not) into a new user template named
    /// `Copy of {name}` with a fresh history.
    pub async fn duplicate_template(
        &self,
        id: DbId,
        created_by: Option<String>,
    ) -> AppResult<TemplateWithVersion> {
        let source = CleanupTemplateRepo::find_by_id(&self.pool, id)
            .await?
            .ok_or_else(|| AppError::Core(CoreError::NotFoundMessage(TEMPLATE_NOT_FOUND.into())))?;

        let copy = self
            .create_template(source.to_create(copy_name(&source.name), created_by))
            .await?;

        self.notifier
            .notify(
                OperationEvent::new(
                    OperationKind::TemplateDuplicated,
                    OperationStatus::Success,
                    format!("Template \"{}\" duplicated", source.name),
                )
                .with_detail("sourceTemplateId", id)
                .with_detail("sourceTemplateName", source.name.as_str())
                .with_detail("newTemplateId", copy.template.id)
                .with_detail("newTemplateName", copy.template.name.as_str()),
            )
            .await;

        Ok(copy)
    }

    /// Append a new version copying the fields of `version_number`.
    pub async fn restore_template_version(
        &self,
        id: DbId,
        version_number: i32,
        created_by: Option<String>,
    ) -> AppResult<TemplateWithVersion> {
        if TemplateVersionRepo::find_by_number(&self.pool, id, version_number)
            .await?
            .is_none()
        {
            return Err(AppError::Core(CoreError::NotFoundMessage(
                VERSION_NOT_FOUND.into(),
            )));
        }
        let template = CleanupTemplateRepo::find_by_id(&self.pool, id)
            .await?
            .ok_or_else(|| AppError::Core(CoreError::NotFoundMessage(TEMPLATE_NOT_FOUND.into())))?;
        if template.is_built_in {
            return Err(forbidden(CANNOT_RESTORE_BUILT_IN));
        }

        let restored = CleanupTemplateRepo::restore_version(
            &self.pool,
            id,
            version_number,
            created_by.as_deref(),
        )
        .await?
        .ok_or_else(|| AppError::Core(CoreError::NotFoundMessage(TEMPLATE_NOT_FOUND.into())))?;

        let new_version_number = current_version_number(&restored);
        tracing::info!(
            template_id = id,
            restored_from = version_number,
            version_number = new_version_number,
            "Template version restored",
        );

        let mut event = OperationEvent::new(
            OperationKind::TemplateVersionRestored,
            OperationStatus::Success,
            format!(
                "Template \"{}\" restored from version {version_number}",
                restored.template.name
            ),
        )
        .with_detail("templateId", id)
        .with_detail("templateName", restored.template.name.as_str())
        .with_detail("restoredFromVersion", version_number)
        .with_detail("newVersionNumber", new_version_number);
        if let Some(version) = &restored.current_version {
            event = event.with_detail("newVersionId", version.id);
        }
        self.notifier.notify(event).await;

        Ok(restored)
    }

    // -----------------------------------------------------------------------
    // Helpers
    // -----------------------------------------------------------------------

    /// Load a template that may be mutated, or fail with `message`.
    async fn find_mutable(&self, id: DbId, message: &str) -> AppResult<CleanupTemplate> {
        match CleanupTemplateRepo::find_by_id(&self.pool, id).await? {
            Some(t) if !t.is_built_in => Ok(t),
            _ => Err(forbidden(message)),
        }
    }

    async fn attach_current_versions(
        &self,
        templates: Vec<CleanupTemplate>,
    ) -> AppResult<Vec<TemplateWithVersion>> {
        let ids: Vec<DbId> = templates
            .iter()
            .filter_map(|t| t.current_version_id)
            .collect();
        let mut versions: HashMap<DbId, TemplateVersion> =
            TemplateVersionRepo::find_by_ids(&self.pool, &ids)
                .await?
                .into_iter()
                .map(|v| (v.id, v))
                .collect();

        Ok(templates
            .into_iter()
            .map(|template| {
                let current_version = template
                    .current_version_id
                    .and_then(|vid| versions.remove(&vid));
                TemplateWithVersion {
                    template,
                    current_version,
                    versions: None,
                }
            })
            .collect())
    }
}

fn forbidden(message: &str) -> AppError {
    AppError::Core(CoreError::Forbidden(message.to_string()))
}

fn check_fields(errors: Vec<String>) -> AppResult<()> {
    if errors.is_empty() {
        Ok(())
    } else {
        Err(AppError::Core(CoreError::ValidationList(errors)))
    }
}

fn current_version_number(t: &TemplateWithVersion) -> i32 {
    t.current_version
        .as_ref()
        .map(|v| v.version_number)
        .unwrap_or_default()
}
