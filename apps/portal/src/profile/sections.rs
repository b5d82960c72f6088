//! Static section table: which endpoint backs each profile section, and how
//! its payload is shaped before it lands in the view model.

use serde_json::Value;

use crate::api_client::Endpoint;
use crate::models::profile::Section;
use crate::sanitize::split_csv;

/// Pure payload transform applied to `data` before it is stored.
pub type Transform = fn(&Value) -> Value;

pub struct SectionSpec {
    pub section: Section,
    pub endpoint: Endpoint,
    pub transform: Option<Transform>,
}

pub static SECTION_TABLE: [SectionSpec; 12] = [
    SectionSpec {
        section: Section::PersonalDetail,
        endpoint: Endpoint::PersonalDetails,
        transform: None,
    },
    SectionSpec {
        section: Section::Employment,
        endpoint: Endpoint::Employment,
        transform: None,
    },
    SectionSpec {
        section: Section::BasicDetails,
        endpoint: Endpoint::BasicDetails,
        transform: None,
    },
    SectionSpec {
        section: Section::Introduction,
        endpoint: Endpoint::Introduction,
        transform: None,
    },
    SectionSpec {
        section: Section::Language,
        endpoint: Endpoint::Language,
        transform: None,
    },
    SectionSpec {
        section: Section::CareerPreference,
        endpoint: Endpoint::Career,
        transform: None,
    },
    SectionSpec {
        section: Section::ProfileSummary,
        endpoint: Endpoint::ProfileSummary,
        transform: None,
    },
    SectionSpec {
        section: Section::ProfessionalDetail,
        endpoint: Endpoint::ProfessionalDetail,
        transform: None,
    },
    SectionSpec {
        section: Section::Education,
        endpoint: Endpoint::Education,
        transform: None,
    },
    SectionSpec {
        section: Section::Skill,
        endpoint: Endpoint::Skills,
        transform: Some(split_skills),
    },
    SectionSpec {
        section: Section::Projects,
        endpoint: Endpoint::Projects,
        transform: None,
    },
    SectionSpec {
        section: Section::Docs,
        endpoint: Endpoint::Docs,
        transform: None,
    },
];

pub fn spec_for(section: Section) -> Option<&'static SectionSpec> {
    SECTION_TABLE.iter().find(|spec| spec.section == section)
}

/// Turns `{skill_name: "Go,Rust,TS"}` into `["Go","Rust","TS"]`.
/// A missing, non-string or blank field yields an empty list.
///
/// Entries are whitespace-normalised and blank entries dropped, so
/// `"Go, Rust,,"` gives `["Go","Rust"]` rather than `["Go"," Rust","",""]`.
pub fn split_skills(data: &Value) -> Value {
    let names = data
        .get("skill_name")
        .and_then(Value::as_str)
        .map(split_csv)
        .unwrap_or_default();
    Value::from(names)
}

/// DELETE endpoint and id parameter for sections whose entries can be removed one by one.
pub fn removal_for(section: Section) -> Option<(Endpoint, &'static str)> {
    match section {
        Section::Education => Some((Endpoint::DeleteEducation, "education_id")),
        Section::Projects => Some((Endpoint::DeleteProject, "project_id")),
        Section::Employment => Some((Endpoint::DeleteEmployment, "employment_id")),
        Section::Language => Some((Endpoint::DeleteLanguage, "language_id")),
        _ => None,
    }
}
