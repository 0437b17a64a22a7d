//! Signature help inside script blocks.

use tower_lsp::lsp_types::{
    Documentation, ParameterInformation, ParameterLabel, SignatureHelp, SignatureInformation,
};

use super::IdeContext;
use crate::router::ServiceInstance;

pub struct SignatureHelpService;

impl SignatureHelpService {
    pub async fn signature_help(
        ctx: &IdeContext,
        services: &ServiceInstance,
    ) -> Option<SignatureHelp> {
        let (script, offset) = ctx.script_at_cursor()?;

        let service = services.language_service(&script.name).await;
        service.sync(&script.name, script.content()).await;

        let help = match service.engine().signature_help(&script.name, offset).await {
            Ok(help) => help?,
            Err(err) => {
                tracing::debug!("signature help failed for {}: {}", script.name, err);
                return None;
            }
        };
        if help.signatures.is_empty() {
            return None;
        }

        let signatures = help
            .signatures
            .into_iter()
            .map(|signature| SignatureInformation {
                label: signature.label,
                documentation: signature.documentation.map(Documentation::String),
                parameters: Some(
                    signature
                        .parameters
                        .into_iter()
                        .map(|label| ParameterInformation {
                            label: ParameterLabel::Simple(label),
                            documentation: None,
                        })
                        .collect(),
                ),
                active_parameter: None,
            })
            .collect();

        Some(SignatureHelp {
            signatures,
            active_signature: Some(help.active_signature),
            active_parameter: Some(help.active_parameter),
        })
    }
}
