//! Diagnostics for script blocks.

use blits_canon::{EngineDiagnostic, Severity};
use tower_lsp::lsp_types::{Diagnostic, DiagnosticSeverity, NumberOrString};

use super::IdeContext;
use crate::router::ServiceInstance;

/// Source tag on every published diagnostic.
pub const SOURCE: &str = "blits";

pub struct DiagnosticService;

impl DiagnosticService {
    /// Engine diagnostics for the script block, in document coordinates.
    pub async fn collect(ctx: &IdeContext, services: &ServiceInstance) -> Vec<Diagnostic> {
        let Some(script) = ctx.script.as_ref() else {
            return Vec::new();
        };

        let service = services.language_service(&script.name).await;
        service.sync(&script.name, script.content()).await;

        match service.engine().diagnostics(&script.name).await {
            Ok(diagnostics) => diagnostics
                .into_iter()
                .filter_map(|diagnostic| Self::convert(ctx, diagnostic))
                .collect(),
            Err(err) => {
                tracing::debug!("diagnostics failed for {}: {}", script.name, err);
                Vec::new()
            }
        }
    }

    fn convert(ctx: &IdeContext, diagnostic: EngineDiagnostic) -> Option<Diagnostic> {
        Some(Diagnostic {
            range: ctx.script_range(diagnostic.span)?,
            severity: Some(match diagnostic.severity {
                Severity::Error => DiagnosticSeverity::ERROR,
                Severity::Warning => DiagnosticSeverity::WARNING,
                Severity::Information => DiagnosticSeverity::INFORMATION,
                Severity::Hint => DiagnosticSeverity::HINT,
            }),
            code: diagnostic.code.map(NumberOrString::String),
            source: Some(SOURCE.to_string()),
            message: diagnostic.message,
            ..Default::default()
        })
    }
}
