//! Achievement entity types accepted by the bulk importer

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// The closed set of achievement collections exposed by the API
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum EntityType {
    /// Journal and conference papers
    Papers,
    /// Research projects
    Projects,
    /// Patents
    Patents,
    /// Software copyright registrations
    #[serde(alias = "software_copyrights")]
    SoftwareCopyrights,
    /// Competitions and awards
    Competitions,
    /// Academic conferences
    Conferences,
    /// Industry / academic cooperations
    Cooperations,
    /// Shared resources (datasets, tools, equipment)
    Resources,
}

impl EntityType {
    /// Wire tag, also used on the command line
    pub fn as_str(&self) -> &'static str {
        match self {
            EntityType::Papers => "papers",
            EntityType::Projects => "projects",
            EntityType::Patents => "patents",
            EntityType::SoftwareCopyrights => "software-copyrights",
            EntityType::Competitions => "competitions",
            EntityType::Conferences => "conferences",
            EntityType::Cooperations => "cooperations",
            EntityType::Resources => "resources",
        }
    }

    /// Get all entity types
    pub fn all() -> &'static [EntityType] {
        &[
            EntityType::Papers,
            EntityType::Projects,
            EntityType::Patents,
            EntityType::SoftwareCopyrights,
            EntityType::Competitions,
            EntityType::Conferences,
            EntityType::Cooperations,
            EntityType::Resources,
        ]
    }

    /// Creation endpoint, relative to the API base URL
    pub fn endpoint(&self) -> &'static str {
        match self {
            EntityType::Papers => "/papers",
            EntityType::Projects => "/projects",
            EntityType::Patents => "/patents",
            EntityType::SoftwareCopyrights => "/software-copyrights",
            EntityType::Competitions => "/competitions",
            EntityType::Conferences => "/conferences",
            EntityType::Cooperations => "/cooperations",
            EntityType::Resources => "/resources",
        }
    }

    /// Display name shown in import summaries
    pub fn display_name(&self) -> &'static str {
        match self {
            EntityType::Papers => "论文",
            EntityType::Projects => "项目",
            EntityType::Patents => "专利",
            EntityType::SoftwareCopyrights => "软件著作权",
            EntityType::Competitions => "竞赛",
            EntityType::Conferences => "会议",
            EntityType::Cooperations => "合作",
            EntityType::Resources => "资源",
        }
    }

    /// Column headers offered in the downloadable CSV template
    pub fn sample_fields(&self) -> &'static [&'static str] {
        match self {
            EntityType::Papers => &[
                "title",
                "authors",
                "journal",
                "conference",
                "publish_date",
                "doi",
                "impact_factor",
                "citation_count",
                "writing_progress",
                "status",
                "abstract",
                "keywords",
                "related_projects",
                "image_path",
                "file_path",
            ],
            EntityType::Projects => &[
                "name",
                "project_number",
                "project_type",
                "principal",
                "start_date",
                "end_date",
                "budget",
                "budget_used",
                "status",
                "progress_percent",
                "priority",
                "risk_level",
                "description",
                "image_path",
            ],
            EntityType::Patents => &[
                "name",
                "patent_number",
                "application_date",
                "authorization_date",
                "patent_type",
                "status",
                "technology_field",
                "commercialization_value",
                "maintenance_deadline",
                "inventors",
                "related_projects",
            ],
            EntityType::SoftwareCopyrights => &[
                "name",
                "registration_number",
                "registration_date",
                "version",
                "status",
                "development_language",
                "category",
                "latest_update",
                "maintenance_contact",
                "developers",
                "image_path",
                "file_path",
            ],
            EntityType::Competitions => &[
                "name",
                "level",
                "award_level",
                "award_date",
                "registration_deadline",
                "submission_deadline",
                "progress_percent",
                "mentor",
                "team_members",
                "status",
            ],
            EntityType::Conferences => &[
                "name",
                "location",
                "start_date",
                "end_date",
                "category",
                "status",
                "submission_status",
                "budget",
                "used",
                "participants",
                "paper_title",
                "description",
            ],
            EntityType::Cooperations => &[
                "name",
                "type",
                "location",
                "status",
                "projects",
                "contact_person",
                "email",
                "phone",
                "established_date",
                "last_contact",
                "value",
                "field",
                "description",
            ],
            EntityType::Resources => &[
                "name",
                "resource_type",
                "description",
                "version",
                "maintainer",
                "maintenance_cycle_days",
                "next_maintenance_date",
                "license",
                "download_count",
                "usage_rate",
                "image_path",
                "file_path",
                "external_url",
                "tags",
                "is_public",
            ],
        }
    }
}

impl fmt::Display for EntityType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for EntityType {
    type Err = EntityTypeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().to_lowercase().replace('_', "-");
        EntityType::all()
            .iter()
            .copied()
            .find(|entity| entity.as_str() == normalized)
            .ok_or_else(|| EntityTypeError::Unknown(s.to_string()))
    }
}

/// Errors when parsing an entity type tag
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum EntityTypeError {
    #[error("unsupported entity type: '{0}'. Supported: papers, projects, patents, software-copyrights, competitions, conferences, cooperations, resources")]
    Unknown(String),
}
