//! Entry path from free text or a form to a stored catch.

use chrono::{TimeZone, Utc};

use crate::events::LedgerEvent;
use crate::models::{CatchId, CatchPatch, CatchRecord, NewCatch};
use crate::parser::{parse, ParsedCatch};
use crate::scoring::{assess_with_fallback, LocalScorer, ScoredCatch, ScoringRequest, SustainabilityScorer};
use crate::services::CatchStore;
use crate::{Error, Result};

/// A catch that was just logged
#[derive(Debug, Clone, PartialEq)]
pub struct Captured {
    pub record: CatchRecord,
    /// The parse result, for free-text entries
    pub parsed: Option<ParsedCatch>,
    /// No weight was given; the record carries the `0` sentinel
    pub weight_missing: bool,
}

/// Parses, scores locally and stores catches.
#[derive(Clone)]
pub struct CatchCapture {
    store: CatchStore,
    scorer: LocalScorer,
}

impl CatchCapture {
    #[must_use]
    pub const fn new(store: CatchStore) -> Self {
        Self {
            store,
            scorer: LocalScorer::new(),
        }
    }

    #[must_use]
    pub const fn store(&self) -> &CatchStore {
        &self.store
    }

    /// Log a catch from a spoken or typed sentence.
    ///
    /// Parsing never fails; only a missing species or a storage failure does.
    pub async fn log_text(&self, text: &str) -> Result<Captured> {
        let parsed = parse(text);
        if parsed.species.is_empty() {
            return Err(Error::InvalidInput(format!(
                "could not find a species in '{}'",
                text.trim()
            )));
        }

        let mut captured = self
            .log_manual(&parsed.species, parsed.weight_kg, None)
            .await?;
        captured.parsed = Some(parsed);
        Ok(captured)
    }

    /// Log a catch from explicit fields.
    pub async fn log_manual(
        &self,
        species: &str,
        weight_kg: Option<f64>,
        image_base64: Option<String>,
    ) -> Result<Captured> {
        let weight = weight_kg.unwrap_or(0.0);
        let assessment = self.scorer.score(species, weight);

        let mut draft = NewCatch::new(species, weight).with_assessment(assessment);
        draft.image_base64 = crate::util::normalize_text_option(image_base64);

        let record = self.store.insert(draft).await?;
        let weight_missing = weight_kg.is_none();
        if weight_missing {
            tracing::info!("Catch {} saved without a weight", record.id);
            self.store.emit(LedgerEvent::WeightMissing {
                id: record.id,
                species: record.species.clone(),
            });
        }

        Ok(Captured {
            record,
            parsed: None,
            weight_missing,
        })
    }

    /// Re-score a stored catch, preferring `remote` and falling back locally.
    ///
    /// The new assessment replaces the old one and is queued like any edit.
    pub async fn rescore<S: SustainabilityScorer + Sync>(
        &self,
        id: &CatchId,
        remote: Option<&S>,
        location: Option<String>,
        method: Option<String>,
    ) -> Result<(CatchRecord, ScoredCatch)> {
        let record = self
            .store
            .get(id)
            .await?
            .ok_or_else(|| Error::NotFound(id.to_string()))?;

        let mut request = ScoringRequest::new(record.species.clone());
        if !record.has_unknown_weight() {
            request = request.with_weight(record.weight_kg);
        }
        request.location = crate::util::normalize_text_option(location);
        request.method = crate::util::normalize_text_option(method);
        request.date = Utc
            .timestamp_millis_opt(record.timestamp)
            .single()
            .map(|time| time.format("%Y-%m-%d").to_string());

        let scored = assess_with_fallback(remote, &self.scorer, &request).await;
        let patch = CatchPatch {
            assessment: Some(scored.assessment.clone()),
            ..CatchPatch::default()
        };
        let updated = self.store.update(id, &patch).await?;
        Ok((updated, scored))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::events::BroadcastSink;
    use crate::models::{Assessment, SyncStatus};
    use crate::scoring::{AssessmentSource, ScoringResult};
    use std::sync::Arc;

    async fn capture() -> CatchCapture {
        CatchCapture::new(CatchStore::open_in_memory().await.unwrap())
    }

    struct FixedScorer(Assessment);

    impl SustainabilityScorer for FixedScorer {
        async fn assess(&self, _request: &ScoringRequest) -> ScoringResult<Assessment> {
            Ok(self.0.clone())
        }
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn log_text_parses_scores_and_stores() {
        let capture = capture().await;
        let captured = capture.log_text("20.5 kilos of Salmon").await.unwrap();

        assert_eq!(captured.record.species, "Salmon");
        assert_eq!(captured.record.weight_kg, 20.5);
        assert_eq!(captured.record.sync_status, SyncStatus::Pending);
        assert_eq!(
            captured.record.assessment,
            Some(LocalScorer::new().score("Salmon", 20.5))
        );
        assert!(!captured.weight_missing);
        assert_eq!(capture.store().query(None).await.unwrap().len(), 1);
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn missing_weight_is_stored_as_zero_and_announced() {
        let sink = BroadcastSink::default();
        let mut events = sink.subscribe();
        let store = CatchStore::open_in_memory()
            .await
            .unwrap()
            .with_events(Arc::new(sink));
        let capture = CatchCapture::new(store);

        let captured = capture.log_text("Just a fish").await.unwrap();
        assert!(captured.weight_missing);
        assert!(captured.record.has_unknown_weight());
        assert_eq!(captured.record.species, "Just a fish");

        assert!(matches!(
            events.recv().await.unwrap(),
            LedgerEvent::CatchSaved { .. }
        ));
        assert_eq!(
            events.recv().await.unwrap(),
            LedgerEvent::WeightMissing {
                id: captured.record.id,
                species: "Just a fish".to_string(),
            }
        );
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn quantity_only_is_rejected() {
        let capture = capture().await;
        assert!(matches!(
            capture.log_text("20kg").await,
            Err(Error::InvalidInput(_))
        ));
        assert!(capture.store().query(None).await.unwrap().is_empty());
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn rescore_prefers_remote_and_queues_update() {
        let capture = capture().await;
        let captured = capture.log_manual("Cod", Some(3.0), None).await.unwrap();

        let remote = FixedScorer(Assessment::new(88, "MSC certified fishery"));
        let (updated, scored) = capture
            .rescore(
                &captured.record.id,
                Some(&remote),
                Some("North Sea".to_string()),
                Some("rod and line".to_string()),
            )
            .await
            .unwrap();

        assert_eq!(scored.source, AssessmentSource::Remote);
        assert_eq!(updated.score(), Some(88));
        assert_eq!(capture.store().operations().await.unwrap().len(), 2);
    }
}
