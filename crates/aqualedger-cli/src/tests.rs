use aqualedger_core::config::LedgerConfig;
use aqualedger_core::models::{Assessment, NewCatch, OperationKind, SyncStatus};
use aqualedger_core::services::CatchStore;
use aqualedger_core::sync::DrainReport;
use pretty_assertions::assert_eq;
use tempfile::TempDir;

use crate::cli::{CompletionShell, ExportFormat, QueueCommands};
use crate::commands::common::{
    format_catch_details, format_catch_lines, format_relative_time, format_timestamp,
    normalize_catch_identifier, normalize_text, resolve_catch, truncate,
};
use crate::commands::completions::run_completions;
use crate::commands::config::{apply_update, run_config_init, ConfigUpdate};
use crate::commands::delete::run_delete;
use crate::commands::edit::{run_edit, with_local_estimate};
use crate::commands::export::run_export;
use crate::commands::log::{run_add, run_log};
use crate::commands::queue::run_queue;
use crate::commands::score::{run_score, run_tips};
use crate::commands::status::status_report;
use crate::commands::sync::{format_drain_report, run_sync};
use crate::config::{load_config_from_path, CliSettings};
use crate::error::CliError;

fn test_settings(dir: &TempDir) -> CliSettings {
    CliSettings::from_parts(
        LedgerConfig::default(),
        Some(dir.path().join("catches.db")),
        |_| None,
    )
    .unwrap()
}

async fn store_for(settings: &CliSettings) -> CatchStore {
    CatchStore::open_path(&settings.db_path).await.unwrap()
}

#[test]
fn normalize_text_trims_and_rejects_empty() {
    assert_eq!(normalize_text("  20kg tuna  "), Some("20kg tuna".to_string()));
    assert_eq!(normalize_text(" \n\t "), None);
}

#[test]
fn normalize_catch_identifier_rejects_empty() {
    assert!(matches!(
        normalize_catch_identifier(" \n "),
        Err(CliError::EmptyCatchId)
    ));
    assert_eq!(normalize_catch_identifier("  abc123  ").unwrap(), "abc123");
}

#[test]
fn format_relative_time_units() {
    let now = 10_000_000;
    assert_eq!(format_relative_time(now - 30_000, now), "just now");
    assert_eq!(format_relative_time(now - 120_000, now), "2m ago");
    assert_eq!(format_relative_time(now - 2 * 60 * 60_000, now), "2h ago");
}

#[test]
fn format_timestamp_returns_utc_label() {
    assert_eq!(format_timestamp(0), "1970-01-01 00:00:00 UTC");
}

#[test]
fn truncate_adds_ellipsis() {
    assert_eq!(truncate("Sea of Galilee Tilapia", 10), "Sea of ...");
    assert_eq!(truncate("Cod", 10), "Cod");
}

#[test]
fn catch_lines_mark_unknown_weight_and_compliance() {
    let mut record = NewCatch::new("Bluefin tuna", 0.0)
        .with_assessment(Assessment::new(20, "overfished"))
        .into_record(aqualedger_core::CatchId::new(), 1_000)
        .unwrap();
    record.compliance_warning = true;
    record.compliance_details = Some("closed season".to_string());

    let lines = format_catch_lines(std::slice::from_ref(&record));
    assert_eq!(lines.len(), 1);
    assert!(lines[0].contains("Bluefin tuna"));
    assert!(lines[0].contains("? kg"));
    assert!(lines[0].contains("20/100"));
    assert!(lines[0].contains("pending"));
    assert!(lines[0].ends_with('!'));

    let details = format_catch_details(&record);
    assert!(details.contains(&"compliance: closed season".to_string()));
    assert!(details.contains(&"rationale:  overfished".to_string()));
}

#[tokio::test(flavor = "multi_thread")]
async fn run_log_stores_parsed_catch_with_local_score() {
    let dir = TempDir::new().unwrap();
    let settings = test_settings(&dir);

    run_log(&["20.5".to_string(), "kilos of Salmon".to_string()], &settings)
        .await
        .unwrap();

    let records = store_for(&settings).await.query(None).await.unwrap();
    assert_eq!(records.len(), 1);
    assert_eq!(records[0].species, "Salmon");
    assert_eq!(records[0].weight_kg, 20.5);
    assert_eq!(records[0].sync_status, SyncStatus::Pending);
    assert!(records[0].assessment.is_some());
}

#[tokio::test(flavor = "multi_thread")]
async fn run_log_rejects_quantity_without_species() {
    let dir = TempDir::new().unwrap();
    let settings = test_settings(&dir);

    let error = run_log(&["20kg".to_string()], &settings).await.unwrap_err();
    assert!(matches!(
        error,
        CliError::Core(aqualedger_core::Error::InvalidInput(_))
    ));
}

#[tokio::test(flavor = "multi_thread")]
async fn resolve_catch_supports_exact_and_prefix_id() {
    let dir = TempDir::new().unwrap();
    let settings = test_settings(&dir);
    let store = store_for(&settings).await;

    let cod = store.insert(NewCatch::new("Cod", 3.0)).await.unwrap();
    let carp = store.insert(NewCatch::new("Carp", 1.5)).await.unwrap();

    let by_exact = resolve_catch(&store, &cod.id.to_string()).await.unwrap();
    assert_eq!(by_exact.species, "Cod");

    let full_id = carp.id.to_string();
    let by_prefix = resolve_catch(&store, &full_id[..full_id.len() - 4])
        .await
        .unwrap();
    assert_eq!(by_prefix.species, "Carp");

    let ambiguous = resolve_catch(&store, &full_id[..4]).await.unwrap_err();
    assert!(matches!(
        ambiguous,
        CliError::Core(aqualedger_core::Error::InvalidInput(_))
    ));

    let missing = resolve_catch(&store, "ffffffff-0000").await.unwrap_err();
    assert!(matches!(
        missing,
        CliError::Core(aqualedger_core::Error::NotFound(_))
    ));
}

#[tokio::test(flavor = "multi_thread")]
async fn run_delete_removes_catch_and_queues_delete() {
    let dir = TempDir::new().unwrap();
    let settings = test_settings(&dir);
    let created = {
        let store = store_for(&settings).await;
        store.insert(NewCatch::new("Mackerel", 0.8)).await.unwrap()
    };

    run_delete(&created.id.to_string(), &settings).await.unwrap();

    let store = store_for(&settings).await;
    assert!(store.get(&created.id).await.unwrap().is_none());
    let kinds = store
        .operations()
        .await
        .unwrap()
        .into_iter()
        .map(|operation| operation.kind)
        .collect::<Vec<_>>();
    assert_eq!(kinds, vec![OperationKind::Create, OperationKind::Delete]);
}

#[tokio::test(flavor = "multi_thread")]
async fn run_edit_requires_a_change() {
    let dir = TempDir::new().unwrap();
    let settings = test_settings(&dir);

    let error = run_edit("anything", None, None, false, &settings)
        .await
        .unwrap_err();
    assert!(matches!(error, CliError::NothingToEdit));
}

#[tokio::test(flavor = "multi_thread")]
async fn run_edit_fills_missing_weight_and_rescores() {
    let dir = TempDir::new().unwrap();
    let settings = test_settings(&dir);
    run_add("Tuna", None, &settings).await.unwrap();
    let before = store_for(&settings).await.query(None).await.unwrap().remove(0);
    assert!(before.has_unknown_weight());

    run_edit(&before.id.to_string(), None, Some(60.0), false, &settings)
        .await
        .unwrap();

    let after = store_for(&settings)
        .await
        .get(&before.id)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(after.weight_kg, 60.0);
    assert!(after.score() < before.score());
}

#[test]
fn local_estimate_only_changes_with_species_or_weight() {
    let photo_only = aqualedger_core::models::CatchPatch {
        image_base64: Some(None),
        ..Default::default()
    };
    assert_eq!(
        with_local_estimate(photo_only.clone(), "Cod", 2.0),
        photo_only
    );

    let renamed = aqualedger_core::models::CatchPatch {
        species: Some("Sardine".to_string()),
        ..Default::default()
    };
    let patched = with_local_estimate(renamed, "Cod", 2.0);
    assert_eq!(
        patched.assessment,
        Some(aqualedger_core::scoring::LocalScorer::new().score("Sardine", 2.0))
    );
}

#[tokio::test(flavor = "multi_thread")]
async fn run_sync_requires_remote_configuration() {
    let dir = TempDir::new().unwrap();
    let settings = test_settings(&dir);

    let error = run_sync(false, false, &settings).await.unwrap_err();
    assert!(matches!(error, CliError::SyncNotConfigured));
}

#[tokio::test(flavor = "multi_thread")]
async fn run_sync_offline_leaves_queue_untouched() {
    let dir = TempDir::new().unwrap();
    let settings = test_settings(&dir);
    run_add("Herring", Some(0.4), &settings).await.unwrap();

    run_sync(false, true, &settings).await.unwrap();

    let store = store_for(&settings).await;
    assert_eq!(store.queue_counts().await.unwrap().pending, 1);
}

#[test]
fn drain_report_lines() {
    let offline = DrainReport {
        offline: true,
        ..DrainReport::default()
    };
    assert_eq!(format_drain_report(&offline), "Offline; nothing sent");

    let interrupted = DrainReport {
        synced: 2,
        failed: 1,
        interrupted: true,
        offline: false,
    };
    assert_eq!(
        format_drain_report(&interrupted),
        "Sync completed: 2 synced, 1 failed (interrupted, remaining changes stay queued)"
    );
}

#[tokio::test(flavor = "multi_thread")]
async fn status_without_remote_reports_pending_work() {
    let dir = TempDir::new().unwrap();
    let settings = test_settings(&dir);
    run_add("Trout", Some(1.2), &settings).await.unwrap();

    let report = status_report(&settings).await.unwrap();
    assert_eq!(report.state, aqualedger_core::state::SyncState::Pending);
    assert_eq!(report.pending, 1);
    assert_eq!(report.queued, 1);
    assert!(!report.remote_configured);
}

#[tokio::test(flavor = "multi_thread")]
async fn queue_discard_rejects_pending_operation() {
    let dir = TempDir::new().unwrap();
    let settings = test_settings(&dir);
    run_add("Pollock", Some(2.0), &settings).await.unwrap();
    let operation_id = store_for(&settings).await.operations().await.unwrap()[0].id;

    run_queue(QueueCommands::Retry { id: None }, &settings)
        .await
        .unwrap();
    let error = run_queue(QueueCommands::Discard { id: operation_id }, &settings)
        .await
        .unwrap_err();
    assert!(matches!(
        error,
        CliError::Core(aqualedger_core::Error::InvalidInput(_))
    ));
}

#[tokio::test(flavor = "multi_thread")]
async fn run_score_without_service_uses_local_estimate() {
    let dir = TempDir::new().unwrap();
    let settings = test_settings(&dir);
    run_add("Sardine", Some(0.5), &settings).await.unwrap();
    let record = store_for(&settings).await.query(None).await.unwrap().remove(0);

    run_score(&record.id.to_string(), None, None, &settings)
        .await
        .unwrap();

    let store = store_for(&settings).await;
    assert_eq!(store.operations().await.unwrap().len(), 2);
}

#[tokio::test(flavor = "multi_thread")]
async fn run_tips_requires_scoring_service() {
    let dir = TempDir::new().unwrap();
    let settings = test_settings(&dir);
    let request = aqualedger_core::scoring::ScoringRequest::new("Cod");

    let error = run_tips(request, &settings).await.unwrap_err();
    assert!(matches!(error, CliError::ScoringNotConfigured));
}

#[tokio::test(flavor = "multi_thread")]
async fn run_export_into_directory_uses_suggested_name() {
    let dir = TempDir::new().unwrap();
    let settings = test_settings(&dir);
    run_add("Catfish", Some(4.0), &settings).await.unwrap();
    let output_dir = dir.path().join("exports");
    std::fs::create_dir_all(&output_dir).unwrap();

    run_export(ExportFormat::Json, Some(&output_dir), &settings)
        .await
        .unwrap();

    let exported = std::fs::read_dir(&output_dir)
        .unwrap()
        .map(|entry| entry.unwrap().path())
        .collect::<Vec<_>>();
    assert_eq!(exported.len(), 1);
    let name = exported[0].file_name().unwrap().to_string_lossy().to_string();
    assert!(name.starts_with("aqualedger-export-"));
    assert!(name.ends_with(".json"));

    let contents = std::fs::read_to_string(&exported[0]).unwrap();
    assert!(contents.contains("\"species\": \"Catfish\""));
}

#[test]
fn config_init_merges_with_existing_file() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("config.json");

    run_config_init(
        ConfigUpdate {
            remote_endpoint: Some("https://ledger.example.com/".to_string()),
            ..ConfigUpdate::default()
        },
        &path,
    )
    .unwrap();
    run_config_init(
        ConfigUpdate {
            poll_interval_secs: Some(30),
            ..ConfigUpdate::default()
        },
        &path,
    )
    .unwrap();

    let config = load_config_from_path(&path).unwrap();
    assert_eq!(
        config.remote_endpoint.as_deref(),
        Some("https://ledger.example.com")
    );
    assert_eq!(config.sync.poll_interval_secs, 30);
}

#[test]
fn config_update_rejects_invalid_endpoint() {
    let error = apply_update(
        LedgerConfig::default(),
        ConfigUpdate {
            scoring_endpoint: Some("score.example.com".to_string()),
            ..ConfigUpdate::default()
        },
    )
    .unwrap_err();
    assert!(matches!(error, CliError::Config(_)));
}

#[test]
fn run_completions_writes_bash_script_file() {
    let dir = TempDir::new().unwrap();
    let output_path = dir.path().join("aqualedger.bash");

    run_completions(CompletionShell::Bash, Some(&output_path)).unwrap();

    let script = std::fs::read_to_string(&output_path).unwrap();
    assert!(script.contains("_aqualedger()"));
    assert!(script.contains("complete -F _aqualedger"));
}
