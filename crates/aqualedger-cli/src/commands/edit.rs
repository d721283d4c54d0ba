use aqualedger_core::models::CatchPatch;
use aqualedger_core::scoring::LocalScorer;

use crate::commands::common::{format_weight, open_store, resolve_catch};
use crate::config::CliSettings;
use crate::error::CliError;

pub async fn run_edit(
    id: &str,
    species: Option<String>,
    weight_kg: Option<f64>,
    clear_photo: bool,
    settings: &CliSettings,
) -> Result<(), CliError> {
    let patch = CatchPatch {
        species,
        weight_kg,
        assessment: None,
        image_base64: clear_photo.then_some(None),
    };
    if patch.is_empty() {
        return Err(CliError::NothingToEdit);
    }

    let store = open_store(settings).await?;
    let record = resolve_catch(&store, id).await?;
    let patch = with_local_estimate(patch, &record.species, record.weight_kg);

    let updated = store.update(&record.id, &patch).await?;
    println!("{}", updated.id);
    eprintln!(
        "Updated {} ({}), now {}",
        updated.species,
        format_weight(&updated),
        updated.sync_status
    );
    Ok(())
}

/// Refresh the local estimate when species or weight changes.
pub fn with_local_estimate(mut patch: CatchPatch, species: &str, weight_kg: f64) -> CatchPatch {
    if patch.species.is_none() && patch.weight_kg.is_none() {
        return patch;
    }
    let species = patch.species.as_deref().unwrap_or(species);
    let weight_kg = patch.weight_kg.unwrap_or(weight_kg);
    patch.assessment = Some(LocalScorer::new().score(species, weight_kg));
    patch
}
