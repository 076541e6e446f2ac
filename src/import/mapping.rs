//! Per-entity column mapping tables
//!
//! Spreadsheet headers do not always match the API's field names. Each
//! entity type owns an independent [`FieldMapping`]; columns it does not
//! mention pass through under their own name.

use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};

use crate::core::EntityType;
use crate::import::parser::ImportRow;

/// What to do with one spreadsheet column
///
/// Written in config files as `skip`, `keep` or `{ rename: <field> }`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "RuleRepr", into = "RuleRepr")]
pub enum FieldRule {
    /// Send the value under a different field name
    Rename(String),
    /// Never send this column
    Skip,
    /// Send the value under the column's own name
    Keep,
}

/// On-disk shape of a [`FieldRule`]
#[derive(Serialize, Deserialize)]
#[serde(untagged)]
enum RuleRepr {
    Word(String),
    Rename { rename: String },
}

impl TryFrom<RuleRepr> for FieldRule {
    type Error = String;

    fn try_from(repr: RuleRepr) -> Result<Self, Self::Error> {
        match repr {
            RuleRepr::Rename { rename } if rename.trim().is_empty() => {
                Err("rename target must not be empty".to_string())
            }
            RuleRepr::Rename { rename } => Ok(FieldRule::Rename(rename)),
            RuleRepr::Word(word) => match word.trim() {
                "skip" => Ok(FieldRule::Skip),
                "keep" => Ok(FieldRule::Keep),
                other => Err(format!(
                    "unknown column rule '{}', expected `skip`, `keep` or `rename: <field>`",
                    other
                )),
            },
        }
    }
}

impl From<FieldRule> for RuleRepr {
    fn from(rule: FieldRule) -> Self {
        match rule {
            FieldRule::Rename(rename) => RuleRepr::Rename { rename },
            FieldRule::Skip => RuleRepr::Word("skip".to_string()),
            FieldRule::Keep => RuleRepr::Word("keep".to_string()),
        }
    }
}

static KEEP: FieldRule = FieldRule::Keep;

/// Column rules for a single entity type
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FieldMapping {
    rules: BTreeMap<String, FieldRule>,
}

impl FieldMapping {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn rename(self, column: &str, target: &str) -> Self {
        self.with(column, FieldRule::Rename(target.to_string()))
    }

    pub fn skip(self, column: &str) -> Self {
        self.with(column, FieldRule::Skip)
    }

    pub fn with(mut self, column: &str, rule: FieldRule) -> Self {
        self.rules.insert(column.to_string(), rule);
        self
    }

    /// Rule for a column; unlisted columns are kept
    pub fn rule(&self, column: &str) -> &FieldRule {
        self.rules.get(column).unwrap_or(&KEEP)
    }

    /// Target field name, or `None` when the column is skipped
    pub fn target<'a>(&'a self, column: &'a str) -> Option<&'a str> {
        match self.rule(column) {
            FieldRule::Rename(target) => Some(target.as_str()),
            FieldRule::Skip => None,
            FieldRule::Keep => Some(column),
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &FieldRule)> {
        self.rules.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    fn merge(&mut self, other: FieldMapping) {
        self.rules.extend(other.rules);
    }
}

/// Immutable map-of-maps from entity type to its column rules
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MappingTable {
    entities: HashMap<EntityType, FieldMapping>,
}

impl MappingTable {
    /// A table with no rules at all (identity for every entity type)
    pub fn empty() -> Self {
        Self::default()
    }

    /// The column rules the achievement API expects out of the box
    pub fn builtin() -> Self {
        let attachments = || FieldMapping::new().skip("image_path").skip("file_path");

        let conferences = attachments()
            .rename("level", "category")
            .rename("participation_type", "status")
            .rename("travel_budget", "budget")
            .rename("travel_expense", "used")
            .skip("visa_required")
            .skip("reminder_date");

        let cooperations = attachments()
            .rename("organization", "name")
            .rename("cooperation_type", "type")
            .rename("cooperation_value", "value")
            .skip("pipeline_stage")
            .rename("next_follow_up", "last_contact")
            .rename("start_date", "established_date")
            .rename("content", "description");

        Self::empty()
            .with(EntityType::Conferences, conferences)
            .with(EntityType::Cooperations, cooperations)
            .with(EntityType::Competitions, attachments())
            .with(EntityType::Patents, attachments())
    }

    pub fn with(mut self, entity: EntityType, mapping: FieldMapping) -> Self {
        self.entities.insert(entity, mapping);
        self
    }

    /// Overlay `overrides` on this table, column by column
    pub fn merge(&mut self, overrides: MappingTable) {
        for (entity, mapping) in overrides.entities {
            self.entities.entry(entity).or_default().merge(mapping);
        }
    }

    pub fn mapping(&self, entity: EntityType) -> Option<&FieldMapping> {
        self.entities.get(&entity)
    }

    pub fn rule(&self, entity: EntityType, column: &str) -> &FieldRule {
        self.mapping(entity)
            .map(|m| m.rule(column))
            .unwrap_or(&KEEP)
    }

    /// Target field name for a column, or `None` when it is skipped
    pub fn target<'a>(&'a self, entity: EntityType, column: &'a str) -> Option<&'a str> {
        match self.mapping(entity) {
            Some(mapping) => mapping.target(column),
            None => Some(column),
        }
    }

    /// Rename or drop the columns of one row
    ///
    /// Blank cells are dropped first, so the API never receives empty
    /// strings. Output keeps the row's column order.
    pub fn map_row<'a>(
        &'a self,
        entity: EntityType,
        row: &'a ImportRow,
    ) -> Vec<(&'a str, &'a str)> {
        row.cells()
            .filter(|(_, value)| !value.trim().is_empty())
            .filter_map(|(column, value)| self.target(entity, column).map(|field| (field, value)))
            .collect()
    }
}
