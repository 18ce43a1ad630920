//! Template export and import.

use jobs2go_core::template_sharing::{parse_import, ImportResult, TemplateExport};
use jobs2go_core::types::DbId;
use jobs2go_db::models::cleanup_template::CreateTemplate;
use jobs2go_db::repositories::CleanupTemplateRepo;
use jobs2go_events::{OperationEvent, OperationKind, OperationStatus};

use super::template_service::TemplateService;
use crate::error::AppResult;

/// Where an export document says it came from.
#[derive(Debug, Clone, Copy)]
pub struct ExportOrigin<'a> {
    pub source: &'a str,
    pub environment: &'a str,
}

impl TemplateService {
    /// Export a single template, or `None` if it does not exist.
    pub async fn export_template(
        &self,
        id: DbId,
        origin: ExportOrigin<'_>,
    ) -> AppResult<Option<TemplateExport>> {
        let Some(template) = CleanupTemplateRepo::find_by_id(&self.pool, id).await? else {
            return Ok(None);
        };
        Ok(Some(TemplateExport::new(
            vec![template.to_export()],
            origin.source,
            origin.environment,
            chrono::Utc::now(),
            false,
        )))
    }

    /// Export several templates in the order given. Missing ids are skipped.
    pub async fn export_templates(
        &self,
        ids: &[DbId],
        origin: ExportOrigin<'_>,
    ) -> AppResult<TemplateExport> {
        let mut templates = Vec::with_capacity(ids.len());
        for &id in ids {
            match CleanupTemplateRepo::find_by_id(&self.pool, id).await? {
                Some(t) => templates.push(t.to_export()),
                None => tracing::debug!(template_id = id, "Skipping missing template in export"),
            }
        }
        Ok(TemplateExport::new(
            templates,
            origin.source,
            origin.environment,
            chrono::Utc::now(),
            true,
        ))
    }

    /// Create one user template per entry of an export document.
    ///
    /// A malformed document imports nothing. Otherwise each entry succeeds or
    /// fails on its own and the outcome is broadcast once at the end.
    pub async fn import_templates(
        &self,
        document: serde_json::Value,
        created_by: Option<String>,
    ) -> ImportResult<DbId> {
        let doc = match parse_import(document) {
            Ok(doc) => doc,
            Err(errors) => {
                tracing::warn!(?errors, "Rejected template import");
                return ImportResult::invalid_format();
            }
        };

        let mut result = ImportResult::default();
        for entry in doc.templates.iter().cloned() {
            let name = entry.name.clone();
            let mut dto = CreateTemplate::from(entry);
            dto.created_by = created_by.clone();

            match self.create_template(dto).await {
                Ok(created) => result.record_success(created.template.id),
                Err(e) => {
                    tracing::warn!(name = %name, error = %e, "Failed to import template");
                    result.record_failure(&name, &e.to_string());
                }
            }
        }

        tracing::info!(
            imported = result.imported,
            failed = result.failed,
            source = %doc.source(),
            "Template import finished",
        );

        let status = match (result.imported, result.failed) {
            (0, _) => OperationStatus::Failure,
            (_, 0) => OperationStatus::Success,
            _ => OperationStatus::Warning,
        };
        self.notifier
            .notify(
                OperationEvent::new(
                    OperationKind::TemplatesImported,
                    status,
                    format!(
                        "Imported {} of {} templates",
                        result.imported,
                        doc.templates.len()
                    ),
                )
                .with_detail("imported", result.imported)
                .with_detail("failed", result.failed)
                .with_detail("source", doc.source())
                .with_detail("environment", doc.environment()),
            )
            .await;

        result
    }
}
