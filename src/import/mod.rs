//! CSV bulk import pipeline
//!
//! parse → map columns → coerce values → submit row by row → report.
//! Only a file that cannot be parsed aborts the run; every other failure
//! is recorded against its row and the remaining rows still go through.

pub mod coerce;
pub mod mapping;
pub mod parser;
pub mod report;
pub mod submit;
pub mod template;
pub mod transform;

use tokio_util::sync::CancellationToken;
use tracing::{error, info};

use crate::core::EntityType;

pub use coerce::coerce;
pub use mapping::{FieldMapping, FieldRule, MappingTable};
pub use parser::{parse_csv, read_file, ImportRow, ParseError};
pub use report::{ImportOutcome, ImportReport, MAX_REPORTED_ERRORS};
pub use submit::{Driver, HttpSubmitter, SubmitError, Submitter};
pub use template::render_template;
pub use transform::{PreparedRow, TransformError, TransformedRecord, Transformer};

/// Parse and transform raw CSV bytes without submitting anything
pub fn prepare_bytes(
    entity: EntityType,
    bytes: &[u8],
    transformer: &Transformer,
) -> Result<Vec<PreparedRow>, ParseError> {
    let rows = parse_csv(bytes)?;
    let prepared = transformer.transform_all(entity, &rows);
    info!(entity = %entity, rows = prepared.len(), "rows prepared");
    Ok(prepared)
}

/// Run the whole pipeline over raw CSV bytes
pub async fn import_bytes<S: Submitter>(
    entity: EntityType,
    bytes: &[u8],
    transformer: &Transformer,
    driver: &Driver<S>,
    cancel: &CancellationToken,
) -> ImportReport {
    import_bytes_with(entity, bytes, transformer, driver, cancel, |_, _| {}).await
}

/// Like [`import_bytes`], calling `on_outcome` after each attempted row
pub async fn import_bytes_with<S, F>(
    entity: EntityType,
    bytes: &[u8],
    transformer: &Transformer,
    driver: &Driver<S>,
    cancel: &CancellationToken,
    on_outcome: F,
) -> ImportReport
where
    S: Submitter,
    F: FnMut(usize, &ImportOutcome),
{
    match prepare_bytes(entity, bytes, transformer) {
        Ok(prepared) => {
            driver
                .run_with(entity.endpoint(), &prepared, cancel, on_outcome)
                .await
        }
        Err(e) => {
            error!(entity = %entity, error = %e, "CSV parse failed");
            ImportReport::parse_failure(e)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use serde_json::{json, Value};
    use std::sync::Mutex;

    #[derive(Default)]
    struct Capture {
        posted: Mutex<Vec<(String, Value)>>,
    }

    #[async_trait]
    impl Submitter for Capture {
        async fn create(
            &self,
            endpoint: &str,
            record: &TransformedRecord,
        ) -> Result<(), SubmitError> {
            let body = Value::Object(record.clone());
            self.posted
                .lock()
                .unwrap()
                .push((endpoint.to_string(), body.clone()));
            if body.get("name") == Some(&json!("reject me")) {
                return Err(SubmitError::Rejected {
                    status: 422,
                    message: "name invalid".into(),
                });
            }
            Ok(())
        }
    }

    #[tokio::test]
    async fn test_conference_file_end_to_end() {
        let csv = "name,level,participants,visa_required,budget\n\
                   NeurIPS,A,\"[{\"\"name\"\": \"\"Li\"\"}, \"\"Wang\"\"]\",yes,\n\
                   reject me,B,,,1000\n";
        let driver = Driver::new(Capture::default());
        let report = import_bytes(
            EntityType::Conferences,
            csv.as_bytes(),
            &Transformer::default(),
            &driver,
            &CancellationToken::new(),
        )
        .await;

        assert_eq!(report.success_count, 1);
        assert_eq!(report.failed_count, 1);
        assert_eq!(report.errors, vec!["第2行: name invalid".to_string()]);

        let posted = driver_posts(&driver);
        assert_eq!(posted[0].0, "/conferences");
        assert_eq!(
            posted[0].1,
            json!({ "name": "NeurIPS", "category": "A", "participants": ["Li", "Wang"] })
        );
        assert_eq!(
            posted[1].1,
            json!({ "name": "reject me", "category": "B", "budget": "1000" })
        );
    }

    #[tokio::test]
    async fn test_unparsable_file_attempts_nothing() {
        let driver = Driver::new(Capture::default());
        let report = import_bytes(
            EntityType::Papers,
            &[0xff, 0xfe, 0x00],
            &Transformer::default(),
            &driver,
            &CancellationToken::new(),
        )
        .await;

        assert_eq!(report.success_count, 0);
        assert_eq!(report.failed_count, 0);
        assert_eq!(report.errors.len(), 1);
        assert!(report.errors[0].starts_with("CSV解析失败:"));
        assert!(driver_posts(&driver).is_empty());
    }

    #[tokio::test]
    async fn test_outcomes_reported_per_row() {
        let csv = "name\nok\nreject me\n";
        let driver = Driver::new(Capture::default());
        let mut seen = Vec::new();
        let report = import_bytes_with(
            EntityType::Resources,
            csv.as_bytes(),
            &Transformer::default(),
            &driver,
            &CancellationToken::new(),
            |row, outcome| seen.push((row, outcome.clone())),
        )
        .await;

        assert_eq!(report.attempted(), 2);
        assert_eq!(seen[0], (1, ImportOutcome::Success));
        assert_eq!(
            seen[1],
            (2, ImportOutcome::Failure("第2行: name invalid".into()))
        );
    }

    #[test]
    fn test_prepare_bytes_keeps_row_order() {
        let prepared = prepare_bytes(
            EntityType::Papers,
            b"title,doi\nA,\n,\nB,10.1/x\n",
            &Transformer::default(),
        )
        .unwrap();
        assert_eq!(prepared.len(), 3);
        assert_eq!(prepared[1].payload, Ok(TransformedRecord::new()));
        assert_eq!(prepared[2].row_number, 3);
    }

    fn driver_posts(driver: &Driver<Capture>) -> Vec<(String, Value)> {
        driver.submitter().posted.lock().unwrap().clone()
    }
}
