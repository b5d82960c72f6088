use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use thiserror::Error;

/// Numeric id of the user whose profile is being aggregated.
pub type UserId = i64;

/// One named slice of a user profile, each backed by its own REST resource.
/// Serialized names are the wire keys the mobile screens read.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Section {
    #[serde(rename = "PersonalDetail")]
    PersonalDetail,
    #[serde(rename = "employment")]
    Employment,
    #[serde(rename = "basicDetails")]
    BasicDetails,
    #[serde(rename = "introduction")]
    Introduction,
    #[serde(rename = "language")]
    Language,
    #[serde(rename = "careerPreference")]
    CareerPreference,
    #[serde(rename = "profileSummary")]
    ProfileSummary,
    #[serde(rename = "professionalDetail")]
    ProfessionalDetail,
    #[serde(rename = "education")]
    Education,
    #[serde(rename = "skill")]
    Skill,
    #[serde(rename = "projects")]
    Projects,
    #[serde(rename = "docs")]
    Docs,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown profile section '{0}'")]
pub struct UnknownSection(pub String);

impl Section {
    pub const ALL: [Section; 12] = [
        Section::PersonalDetail,
        Section::Employment,
        Section::BasicDetails,
        Section::Introduction,
        Section::Language,
        Section::CareerPreference,
        Section::ProfileSummary,
        Section::ProfessionalDetail,
        Section::Education,
        Section::Skill,
        Section::Projects,
        Section::Docs,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Section::PersonalDetail => "PersonalDetail",
            Section::Employment => "employment",
            Section::BasicDetails => "basicDetails",
            Section::Introduction => "introduction",
            Section::Language => "language",
            Section::CareerPreference => "careerPreference",
            Section::ProfileSummary => "profileSummary",
            Section::ProfessionalDetail => "professionalDetail",
            Section::Education => "education",
            Section::Skill => "skill",
            Section::Projects => "projects",
            Section::Docs => "docs",
        }
    }

    /// Whether the server returns this section as a list of entries rather than one record.
    pub fn is_list(self) -> bool {
        matches!(
            self,
            Section::Employment
                | Section::Education
                | Section::Skill
                | Section::Projects
                | Section::Docs
        )
    }

    /// Empty payload the view model holds before the first successful fetch.
    pub fn default_payload(self) -> Value {
        if self.is_list() {
            json!([])
        } else {
            json!({})
        }
    }
}

impl fmt::Display for Section {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Section {
    type Err = UnknownSection;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Section::ALL
            .into_iter()
            .find(|section| section.as_str() == s)
            .ok_or_else(|| UnknownSection(s.to_string()))
    }
}

static MISSING: Value = Value::Null;

/// Merged client-side view of every profile section.
/// Every section key is present from construction onwards.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(transparent)]
pub struct ProfileView(BTreeMap<Section, Value>);

impl Default for ProfileView {
    fn default() -> Self {
        Self(
            Section::ALL
                .into_iter()
                .map(|section| (section, section.default_payload()))
                .collect(),
        )
    }
}

impl ProfileView {
    pub fn get(&self, section: Section) -> &Value {
        self.0.get(&section).unwrap_or(&MISSING)
    }

    pub(crate) fn set(&mut self, section: Section, payload: Value) {
        self.0.insert(section, payload);
    }

    pub fn sections(&self) -> impl Iterator<Item = (Section, &Value)> {
        self.0.iter().map(|(section, value)| (*section, value))
    }
}

/// Per-section loading flags plus the full-refresh `global` flag.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LoadingState {
    pub global: bool,
    #[serde(flatten)]
    sections: BTreeMap<Section, bool>,
}

impl Default for LoadingState {
    fn default() -> Self {
        Self {
            global: false,
            sections: Section::ALL.into_iter().map(|s| (s, false)).collect(),
        }
    }
}

impl LoadingState {
    pub fn is_loading(&self, section: Section) -> bool {
        self.sections.get(&section).copied().unwrap_or(false)
    }

    pub(crate) fn set(&mut self, section: Section, loading: bool) {
        self.sections.insert(section, loading);
    }

    /// True while the global flag or any section flag is raised.
    pub fn any(&self) -> bool {
        self.global || self.sections.values().any(|loading| *loading)
    }
}

/// Last failure message per section. Absent key means no recorded error.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct ErrorState(BTreeMap<Section, String>);

impl ErrorState {
    pub fn get(&self, section: Section) -> Option<&str> {
        self.0.get(&section).map(String::as_str)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = (Section, &str)> {
        self.0.iter().map(|(section, msg)| (*section, msg.as_str()))
    }

    pub(crate) fn record(&mut self, section: Section, message: String) {
        self.0.insert(section, message);
    }

    pub(crate) fn clear(&mut self) {
        self.0.clear();
    }
}

/// Point-in-time copy of everything the aggregator exposes to a screen.
#[derive(Debug, Clone, Serialize)]
pub struct ProfileSnapshot {
    pub profile_detail: ProfileView,
    pub is_loading: bool,
    pub loading_states: LoadingState,
    pub errors: ErrorState,
}
