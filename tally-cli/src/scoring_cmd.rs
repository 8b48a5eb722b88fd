//! `tally score|feedback|review|stats|reset|export` handlers.

use anyhow::{Context, Result};
use serde::Serialize;
use std::collections::BTreeMap;
use std::fs;
use std::path::Path;
use tally_core::{ConfidenceVector, FeedbackStore, Field, ScoringEngine, SharedEngine};
use tally_ingest::{corrected_fields, derive_feedback, RecognizedFields};
use tally_store::{export_history_csv, JsonFileStore};
use tracing::warn;

use crate::config::Config;

/// Engine seeded from the configured ledger file, plus the store to save back to.
pub fn open_engine(cfg: &Config) -> Result<(SharedEngine, JsonFileStore)> {
    let scoring = cfg.scoring_config()?;
    let store = JsonFileStore::new(cfg.ledger_path()?);
    let engine = SharedEngine::load(scoring, &store)
        .with_context(|| format!("loading feedback from {}", store.path().display()))?;
    Ok((engine, store))
}

/// Run [`SharedEngine::persist`] on the blocking pool.
pub async fn persist(engine: &SharedEngine, store: &JsonFileStore) -> Result<()> {
    let path = store.path().to_path_buf();
    let (engine, store) = (engine.clone(), store.clone());
    tokio::task::spawn_blocking(move || engine.persist(&store))
        .await
        .context("feedback save task panicked")?
        .with_context(|| format!("saving feedback to {}", path.display()))?;
    Ok(())
}

fn read_fields(path: &Path) -> Result<RecognizedFields> {
    let s = fs::read_to_string(path).with_context(|| format!("read {}", path.display()))?;
    Ok(RecognizedFields::from_json_str(&s).with_context(|| format!("parse {}", path.display()))?)
}

#[derive(Serialize)]
struct ScoreReport<'a> {
    values: &'a RecognizedFields,
    scores: BTreeMap<Field, f64>,
    average: f64,
    low_confidence_count: usize,
    low_confidence_fields: Vec<Field>,
}

pub fn score(cfg: &Config, input: &Path, json: bool) -> Result<()> {
    let (engine, _) = open_engine(cfg)?;
    let fields = read_fields(input)?;
    let vector = engine.score_fields(fields.iter())?;

    if json {
        let report = ScoreReport {
            values: &fields,
            scores: vector.to_map(),
            average: vector.average(),
            low_confidence_count: vector.low_confidence_count(),
            low_confidence_fields: vector.low_confidence_fields(),
        };
        println!("{}", serde_json::to_string_pretty(&report)?);
        return Ok(());
    }

    print_vector(&fields, &vector);
    Ok(())
}

fn print_vector(fields: &RecognizedFields, vector: &ConfidenceVector) {
    println!("{:<12} {:<24} {:>10}  {}", "FIELD", "VALUE", "CONFIDENCE", "LEVEL");
    for (field, score) in vector.iter() {
        let value = fields.get(field).unwrap_or("(not recognized)");
        let flag = if vector.low_confidence_fields().contains(&field) { "  <- check" } else { "" };
        println!(
            "{:<12} {:<24} {:>10.2}  {}{}",
            field,
            truncate(value, 24),
            score,
            vector.level(field).label(),
            flag
        );
    }
    println!(
        "\naverage={:.2} | low-confidence fields: {}",
        vector.average(),
        vector.low_confidence_count()
    );
}

fn truncate(s: &str, max: usize) -> String {
    if s.chars().count() <= max {
        return s.to_string();
    }
    let mut out: String = s.chars().take(max.saturating_sub(1)).collect();
    out.push('…');
    out
}

pub struct FeedbackArgs<'a> {
    pub field: &'a str,
    pub original: &'a str,
    pub corrected: Option<&'a str>,
    pub was_correct: bool,
    pub confidence: Option<f64>,
}

pub async fn feedback(cfg: &Config, args: FeedbackArgs<'_>) -> Result<()> {
    let (engine, store) = open_engine(cfg)?;
    let field: Field = args.field.parse()?;

    let before = engine.suggest_confidence(field, args.original);
    // Default to what the engine would have shown for this value.
    let shown = args.confidence.unwrap_or(before);
    engine.record_feedback(field, args.original, args.corrected, args.was_correct, shown);
    persist(&engine, &store).await?;

    let after = engine.suggest_confidence(field, args.original);
    println!(
        "Recorded {} feedback for {} (events={}, accuracy={:.2})",
        if args.was_correct { "correct" } else { "incorrect" },
        field,
        engine.event_count(field),
        engine.accuracy_rate(field)
    );
    println!("Suggested confidence for {:?}: {:.2} -> {:.2}", args.original, before, after);
    Ok(())
}

pub async fn review(cfg: &Config, input: &Path, finalized: &Path) -> Result<()> {
    let (engine, store) = open_engine(cfg)?;
    let recognized = read_fields(input)?;
    let saved = read_fields(finalized)?;

    let shown = engine.score_fields(recognized.iter())?;
    let events = derive_feedback(&recognized, &saved, &shown);
    let corrected = corrected_fields(&events);
    let n = events.len();
    for e in events {
        engine.record_event(e);
    }
    persist(&engine, &store).await?;

    println!("Recorded {} feedback events ({} corrected)", n, corrected.len());
    for f in corrected {
        println!("- {}: {:?} -> {:?}", f, recognized.get(f).unwrap_or(""), saved.get(f).unwrap_or(""));
    }
    Ok(())
}

pub fn stats(cfg: &Config, json: bool) -> Result<()> {
    let (engine, _) = open_engine(cfg)?;
    let rows = engine.with(|e| {
        e.field_stats()
            .into_iter()
            .map(|s| {
                let default = e.config().default_for(s.field);
                (s, default, e.blended_confidence(s.field))
            })
            .collect::<Vec<_>>()
    });

    if json {
        #[derive(Serialize)]
        struct Row {
            #[serde(flatten)]
            stats: tally_core::FieldStats,
            default: f64,
            suggested: f64,
        }
        let out: Vec<Row> = rows
            .into_iter()
            .map(|(stats, default, suggested)| Row { stats, default, suggested })
            .collect();
        println!("{}", serde_json::to_string_pretty(&out)?);
        return Ok(());
    }

    println!(
        "{:<12} {:>6} {:>8} {:>9} {:>8} {:>10}",
        "FIELD", "EVENTS", "CORRECT", "ACCURACY", "DEFAULT", "SUGGESTED"
    );
    for (s, default, suggested) in rows {
        let accuracy = if s.events == 0 { "-".to_string() } else { format!("{:.2}", s.accuracy) };
        println!(
            "{:<12} {:>6} {:>8} {:>9} {:>8.2} {:>10.2}",
            s.field, s.events, s.correct, accuracy, default, suggested
        );
    }
    Ok(())
}

/// Overwrite the ledger with an empty history. The old file is only read to
/// report what was dropped; a corrupt one is replaced all the same.
pub async fn reset(cfg: &Config) -> Result<()> {
    let store = JsonFileStore::new(cfg.ledger_path()?);
    let dropped = match store.load() {
        Ok(snapshot) => Some(snapshot.event_count()),
        Err(e) => {
            warn!(path = %store.path().display(), error = %e, "discarding unreadable feedback history");
            None
        }
    };
    let empty = SharedEngine::new(ScoringEngine::new(cfg.scoring_config()?));
    persist(&empty, &store).await?;
    match dropped {
        Some(n) => println!("Cleared {} feedback events ({})", n, store.path().display()),
        None => println!("Replaced unreadable feedback history ({})", store.path().display()),
    }
    Ok(())
}

pub fn export(cfg: &Config, csv: &Path) -> Result<()> {
    let store = JsonFileStore::new(cfg.ledger_path()?);
    let snapshot = store
        .load()
        .with_context(|| format!("loading feedback from {}", store.path().display()))?;
    let n = export_history_csv(&snapshot, csv)?;
    println!("Exported {} events to {}", n, csv.display());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::StorageSection;

    fn cfg_in(dir: &Path) -> Config {
        Config {
            storage: StorageSection {
                ledger_path: Some(dir.join("feedback.json").display().to_string()),
            },
            ..Default::default()
        }
    }

    #[tokio::test]
    async fn test_feedback_then_stats_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let cfg = cfg_in(dir.path());

        for ok in [true, false] {
            feedback(
                &cfg,
                FeedbackArgs {
                    field: "amount",
                    original: "100.0",
                    corrected: (!ok).then_some("10.0"),
                    was_correct: ok,
                    confidence: None,
                },
            )
            .await
            .unwrap();
        }

        let (engine, _) = open_engine(&cfg).unwrap();
        assert_eq!(engine.event_count(Field::Amount), 2);
        assert!((engine.accuracy_rate(Field::Amount) - 0.5).abs() < 1e-12);
        assert!(stats(&cfg, false).is_ok());
    }

    #[tokio::test]
    async fn test_unknown_field_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let cfg = cfg_in(dir.path());
        let err = feedback(
            &cfg,
            FeedbackArgs {
                field: "merchant",
                original: "x",
                corrected: None,
                was_correct: true,
                confidence: Some(0.5),
            },
        )
        .await
        .unwrap_err();
        assert!(err.to_string().contains("unknown field"));
    }

    #[tokio::test]
    async fn test_review_and_reset() {
        let dir = tempfile::tempdir().unwrap();
        let cfg = cfg_in(dir.path());
        let input = dir.path().join("recognized.json");
        let saved = dir.path().join("final.json");
        fs::write(&input, r#"{"amount": 32.5, "category": "购物"}"#).unwrap();
        fs::write(&saved, r#"{"amount": "32.50", "category": "餐饮"}"#).unwrap();

        review(&cfg, &input, &saved).await.unwrap();
        let (engine, _) = open_engine(&cfg).unwrap();
        assert_eq!(engine.accuracy_rate(Field::Amount), 1.0);
        assert_eq!(engine.accuracy_rate(Field::Category), 0.0);
        assert_eq!(engine.event_count(Field::Category), 1);

        let csv = dir.path().join("history.csv");
        export(&cfg, &csv).unwrap();
        assert_eq!(fs::read_to_string(&csv).unwrap().lines().count(), 3);

        reset(&cfg).await.unwrap();
        let (engine, _) = open_engine(&cfg).unwrap();
        assert_eq!(engine.event_count(Field::Amount), 0);
    }

    #[tokio::test]
    async fn test_reset_replaces_corrupt_ledger() {
        let dir = tempfile::tempdir().unwrap();
        let cfg = cfg_in(dir.path());
        let ledger = dir.path().join("feedback.json");
        fs::write(&ledger, "{ truncated").unwrap();
        assert!(open_engine(&cfg).is_err());

        reset(&cfg).await.unwrap();
        let (engine, _) = open_engine(&cfg).unwrap();
        assert_eq!(engine.field_stats().iter().map(|s| s.events).sum::<usize>(), 0);
        assert!(!dir.path().join("feedback.json.tmp").exists());
    }

    #[test]
    fn test_truncate() {
        assert_eq!(truncate("short", 10), "short");
        assert_eq!(truncate("abcdefghijk", 5), "abcd…");
    }
}
