/// Every REST resource the client talks to, relative to the configured base URL.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Endpoint {
    // Onboarding
    RegisterSteps,

    // Profile sections
    PersonalDetails,
    Employment,
    BasicDetails,
    Introduction,
    Language,
    Career,
    ProfileSummary,
    ProfessionalDetail,
    Education,
    Projects,
    Skills,
    Docs,

    // Jobs
    Jobs,
    RecommendJobs,

    // Removal
    DeleteEducation,
    DeleteProject,
    DeleteEmployment,
    DeleteLanguage,
}

impl Endpoint {
    pub fn path(self) -> &'static str {
        match self {
            Endpoint::RegisterSteps => "/register-steps",
            Endpoint::PersonalDetails => "/personal-detail",
            Endpoint::Employment => "/user-employment-detail",
            Endpoint::BasicDetails => "/user-basic-detail",
            Endpoint::Introduction => "/user-introduction",
            Endpoint::Language => "/user-languages",
            Endpoint::Career => "/career-preferences",
            Endpoint::ProfileSummary => "/profile-summary",
            Endpoint::ProfessionalDetail => "/professional-detail",
            Endpoint::Education => "/user-education",
            Endpoint::Projects => "/user-projects",
            Endpoint::Skills => "/user-skills",
            Endpoint::Docs => "/user-docs",
            Endpoint::Jobs => "/jobs",
            Endpoint::RecommendJobs => "/job-recommendation",
            Endpoint::DeleteEducation => "/delete_education",
            Endpoint::DeleteProject => "/delete_projects",
            // server-side spelling
            Endpoint::DeleteEmployment => "/delete_employmet_detail",
            Endpoint::DeleteLanguage => "/delete_language",
        }
    }

    /// Joins the endpoint path onto a base URL, tolerating a trailing slash on the base.
    pub fn url(self, base: &str) -> String {
        format!("{}{}", base.trim_end_matches('/'), self.path())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_url_joins_without_double_slash() {
        assert_eq!(
            Endpoint::Skills.url("https://host/api/"),
            "https://host/api/user-skills"
        );
        assert_eq!(
            Endpoint::Skills.url("https://host/api"),
            "https://host/api/user-skills"
        );
    }

    #[test]
    fn test_job_endpoints() {
        assert_eq!(Endpoint::Jobs.url("https://host/api"), "https://host/api/jobs");
        assert_eq!(Endpoint::RecommendJobs.path(), "/job-recommendation");
    }
}
