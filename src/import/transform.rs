//! Row → request payload

use serde_json::{Map, Value};
use thiserror::Error;

use crate::core::EntityType;
use crate::import::coerce::coerce;
use crate::import::mapping::MappingTable;
use crate::import::parser::ImportRow;

/// JSON object posted to a creation endpoint
pub type TransformedRecord = Map<String, Value>;

/// A row ready for submission, or the reason it could not be prepared
#[derive(Debug, Clone, PartialEq)]
pub struct PreparedRow {
    /// 1-based position among the data rows
    pub row_number: usize,
    pub payload: Result<TransformedRecord, TransformError>,
}

/// A single row that could not be turned into a payload
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum TransformError {
    #[error("row has {count} value(s) beyond the header columns")]
    ExtraCells { count: usize },
}

/// Applies the field mapping and value coercion to parsed rows
#[derive(Debug, Clone)]
pub struct Transformer {
    mappings: MappingTable,
}

impl Default for Transformer {
    fn default() -> Self {
        Self::new(MappingTable::builtin())
    }
}

impl Transformer {
    pub fn new(mappings: MappingTable) -> Self {
        Self { mappings }
    }

    pub fn mappings(&self) -> &MappingTable {
        &self.mappings
    }

    /// Build the payload for one row
    ///
    /// When two columns land on the same field, the rightmost one wins.
    pub fn transform(
        &self,
        entity: EntityType,
        row: &ImportRow,
    ) -> Result<TransformedRecord, TransformError> {
        if !row.extra_cells().is_empty() {
            return Err(TransformError::ExtraCells {
                count: row.extra_cells().len(),
            });
        }

        Ok(self
            .mappings
            .map_row(entity, row)
            .into_iter()
            .map(|(field, value)| (field.to_string(), coerce(field, value)))
            .collect())
    }

    /// Transform every row, keeping per-row failures in place
    pub fn transform_all(&self, entity: EntityType, rows: &[ImportRow]) -> Vec<PreparedRow> {
        rows.iter()
            .map(|row| PreparedRow {
                row_number: row.row_number(),
                payload: self.transform(entity, row),
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_paper_row() {
        let row = ImportRow::from_pairs(
            1,
            [
                ("title", "Sparse Attention"),
                ("authors", r#"["Alice","Bob"]"#),
                ("keywords", "attention, sparsity"),
                ("doi", ""),
                ("citation_count", "12"),
            ],
        );
        let record = Transformer::default()
            .transform(EntityType::Papers, &row)
            .unwrap();

        assert_eq!(
            Value::Object(record),
            json!({
                "title": "Sparse Attention",
                "authors": { "members": ["Alice", "Bob"] },
                "keywords": ["attention", "sparsity"],
                "citation_count": "12"
            })
        );
    }

    #[test]
    fn test_coercion_uses_mapped_name() {
        let mappings = MappingTable::empty().with(
            EntityType::Competitions,
            crate::import::mapping::FieldMapping::new().rename("members", "team_members"),
        );
        let row = ImportRow::from_pairs(1, [("members", r#"["Li","Wang"]"#)]);
        let record = Transformer::new(mappings)
            .transform(EntityType::Competitions, &row)
            .unwrap();
        assert_eq!(record["team_members"], json!({ "members": ["Li", "Wang"] }));
    }

    #[test]
    fn test_cooperation_columns_renamed() {
        let row = ImportRow::from_pairs(
            1,
            [
                ("organization", "Acme Labs"),
                ("content", "Joint lab"),
                ("pipeline_stage", "negotiation"),
                ("tags", "industry"),
            ],
        );
        let record = Transformer::default()
            .transform(EntityType::Cooperations, &row)
            .unwrap();
        assert_eq!(
            Value::Object(record),
            json!({ "name": "Acme Labs", "description": "Joint lab", "tags": ["industry"] })
        );
    }

    #[test]
    fn test_rightmost_duplicate_target_wins() {
        let row = ImportRow::from_pairs(1, [("name", "Old"), ("organization", "New")]);
        let record = Transformer::default()
            .transform(EntityType::Cooperations, &row)
            .unwrap();
        assert_eq!(record["name"], json!("New"));
    }

    #[test]
    fn test_extra_cells_fail_the_row() {
        let row = ImportRow::from_pairs(3, [("name", "X")]).with_extra(vec!["y".into()]);
        let err = Transformer::default()
            .transform(EntityType::Resources, &row)
            .unwrap_err();
        assert_eq!(err, TransformError::ExtraCells { count: 1 });
    }

    #[test]
    fn test_transform_all_keeps_row_numbers() {
        let rows = vec![
            ImportRow::from_pairs(1, [("name", "A")]),
            ImportRow::from_pairs(2, [("name", "B")]).with_extra(vec!["x".into()]),
        ];
        let prepared = Transformer::default().transform_all(EntityType::Resources, &rows);
        assert_eq!(prepared[0].row_number, 1);
        assert!(prepared[0].payload.is_ok());
        assert_eq!(prepared[1].row_number, 2);
        assert!(prepared[1].payload.is_err());
    }

    #[test]
    fn test_empty_row_gives_empty_record() {
        let row = ImportRow::from_pairs(1, [("name", ""), ("status", " ")]);
        let record = Transformer::default()
            .transform(EntityType::Projects, &row)
            .unwrap();
        assert!(record.is_empty());
    }
}
