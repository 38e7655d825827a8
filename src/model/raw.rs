use serde::{Deserialize, Serialize};

/// A project/task record as delivered by the upstream API.
///
/// Field names follow the API's snake_case; the common camelCase and short
/// spellings are accepted as aliases because different endpoints disagree.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RawProject {
    pub id: String,
    pub name: String,
    #[serde(default, alias = "start", alias = "startDate")]
    pub start_date: Option<String>,
    #[serde(default, alias = "end", alias = "endDate", alias = "due_date")]
    pub end_date: Option<String>,
    #[serde(default)]
    pub status: String,
    #[serde(default, alias = "clientName")]
    pub client_name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub priority: Option<String>,
    /// Upstream dependency edges, when the source system provides them.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub dependencies: Vec<String>,
    #[serde(default, alias = "projectId", skip_serializing_if = "Option::is_none")]
    pub project_id: Option<String>,
    #[serde(default, alias = "projectName", skip_serializing_if = "Option::is_none")]
    pub project_name: Option<String>,
}

impl RawProject {
    pub fn new(id: impl Into<String>, name: impl Into<String>, start_date: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            start_date: Some(start_date.into()),
            ..Default::default()
        }
    }

    pub fn with_end(mut self, end_date: impl Into<String>) -> Self {
        self.end_date = Some(end_date.into());
        self
    }

    pub fn with_status(mut self, status: impl Into<String>) -> Self {
        self.status = status.into();
        self
    }

    pub fn with_client(mut self, client_name: impl Into<String>) -> Self {
        self.client_name = client_name.into();
        self
    }

    pub fn with_dependencies<I, S>(mut self, deps: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.dependencies = deps.into_iter().map(Into::into).collect();
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_camel_case_aliases() {
        let json = r#"{
            "id": "p1",
            "name": "Website",
            "startDate": "2024-01-01",
            "endDate": "2024-02-01",
            "status": "Active",
            "clientName": "Acme"
        }"#;
        let raw: RawProject = serde_json::from_str(json).unwrap();
        assert_eq!(raw.start_date.as_deref(), Some("2024-01-01"));
        assert_eq!(raw.end_date.as_deref(), Some("2024-02-01"));
        assert_eq!(raw.client_name, "Acme");
        assert!(raw.dependencies.is_empty());
    }

    #[test]
    fn optional_fields_default() {
        let raw: RawProject =
            serde_json::from_str(r#"{"id": "p1", "name": "Website"}"#).unwrap();
        assert_eq!(raw.start_date, None);
        assert_eq!(raw.end_date, None);
        assert_eq!(raw.status, "");
    }
}
