use aqualedger_core::services::{CatchCapture, Captured};

use crate::commands::common::{format_weight, open_store, resolve_text};
use crate::config::CliSettings;
use crate::error::CliError;

pub async fn run_log(text_parts: &[String], settings: &CliSettings) -> Result<(), CliError> {
    let text = resolve_text(text_parts)?;
    let capture = CatchCapture::new(open_store(settings).await?);
    let captured = capture.log_text(&text).await?;
    print_captured(&captured);
    Ok(())
}

pub async fn run_add(
    species: &str,
    weight_kg: Option<f64>,
    settings: &CliSettings,
) -> Result<(), CliError> {
    let capture = CatchCapture::new(open_store(settings).await?);
    let captured = capture.log_manual(species, weight_kg, None).await?;
    print_captured(&captured);
    Ok(())
}

pub fn run_parse(text_parts: &[String]) -> Result<(), CliError> {
    let text = resolve_text(text_parts)?;
    let parsed = aqualedger_core::parser::parse(&text);
    let output = serde_json::json!({
        "species": parsed.species,
        "weightKg": parsed.weight_kg,
        "original": parsed.original,
        "ambiguity": parsed.ambiguity(),
    });
    println!("{}", serde_json::to_string_pretty(&output)?);
    Ok(())
}

pub fn print_captured(captured: &Captured) {
    let record = &captured.record;
    println!("{}", record.id);
    let score = record
        .score()
        .map_or_else(String::new, |score| format!(", score {score}/100"));
    eprintln!(
        "Saved {} ({}){score}",
        record.species,
        format_weight(record)
    );
}
