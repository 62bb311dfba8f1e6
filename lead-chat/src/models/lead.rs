use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum LeadStatus {
    #[serde(alias = "new")]
    New,
    #[serde(alias = "contacted")]
    Contacted,
    #[serde(alias = "qualified")]
    Qualified,
    #[serde(alias = "converted")]
    Converted,
    #[serde(alias = "lost")]
    Lost,
    #[serde(other)]
    Unknown,
}

/// Lead shared between the two chat participants, offered by the picker
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CandidateLead {
    pub id: u64,
    pub name: String,
    /// Secondary display field (business or contact name)
    #[serde(default, alias = "business_name")]
    pub business_name: Option<String>,
    #[serde(default)]
    pub phone: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default = "default_status")]
    pub status: LeadStatus,
}

fn default_status() -> LeadStatus {
    LeadStatus::Unknown
}

impl CandidateLead {
    pub fn new(id: u64, name: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
            business_name: None,
            phone: None,
            email: None,
            status: LeadStatus::New,
        }
    }

    pub fn with_business_name(mut self, business_name: impl Into<String>) -> Self {
        self.business_name = Some(business_name.into());
        self
    }

    /// `name (business)` when a secondary name exists
    pub fn display_label(&self) -> String {
        match &self.business_name {
            Some(business) if !business.is_empty() => format!("{} ({})", self.name, business),
            _ => self.name.clone(),
        }
    }
}
