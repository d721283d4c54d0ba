use aqualedger_core::scoring::{AssessmentSource, HttpScoringClient, ScoringRequest};
use aqualedger_core::services::CatchCapture;

use crate::commands::common::{open_store, resolve_catch};
use crate::config::CliSettings;
use crate::error::CliError;

pub async fn run_score(
    id: &str,
    location: Option<String>,
    method: Option<String>,
    settings: &CliSettings,
) -> Result<(), CliError> {
    let capture = CatchCapture::new(open_store(settings).await?);
    let record = resolve_catch(capture.store(), id).await?;
    let client = scoring_client(settings)?;
    if client.is_none() {
        eprintln!("No scoring service configured; using the local estimate");
    }

    let (updated, scored) = capture
        .rescore(&record.id, client.as_ref(), location, method)
        .await?;

    if let Some(reason) = &scored.fallback_reason {
        eprintln!("Scoring service unavailable ({reason}); using the local estimate");
    }
    let source = match scored.source {
        AssessmentSource::Remote => "sustainability service",
        AssessmentSource::Local => "local estimate",
    };
    println!(
        "{}: {}/100 ({source})",
        updated.species, scored.assessment.score
    );
    println!("{}", scored.assessment.rationale);
    Ok(())
}

pub async fn run_tips(request: ScoringRequest, settings: &CliSettings) -> Result<(), CliError> {
    let Some(client) = scoring_client(settings)? else {
        return Err(CliError::ScoringNotConfigured);
    };
    for tip in client.recommendations(&request).await? {
        println!("- {tip}");
    }
    Ok(())
}

pub fn scoring_client(settings: &CliSettings) -> Result<Option<HttpScoringClient>, CliError> {
    settings
        .ledger
        .scoring_endpoint
        .clone()
        .map(|endpoint| {
            HttpScoringClient::new(endpoint)
                .map(|client| client.with_token(settings.api_token.clone()))
        })
        .transpose()
        .map_err(CliError::from)
}
