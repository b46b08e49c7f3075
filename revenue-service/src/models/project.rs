//! Project model.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// Project lifecycle status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "varchar", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum ProjectStatus {
    Prospect,
    QuoteSent,
    QuoteAccepted,
    Started,
    Finished,
    Cancelled,
}

impl ProjectStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Prospect => "prospect",
            Self::QuoteSent => "quote_sent",
            Self::QuoteAccepted => "quote_accepted",
            Self::Started => "started",
            Self::Finished => "finished",
            Self::Cancelled => "cancelled",
        }
    }
}

impl std::fmt::Display for ProjectStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Project belonging to a client.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Project {
    pub project_id: Uuid,
    pub client_id: Uuid,
    pub name: String,
    pub status: ProjectStatus,
    pub created_utc: DateTime<Utc>,
}

impl Project {
    pub fn new(client_id: Uuid, name: impl Into<String>) -> Self {
        Self {
            project_id: Uuid::new_v4(),
            client_id,
            name: name.into(),
            status: ProjectStatus::Prospect,
            created_utc: Utc::now(),
        }
    }

    pub fn created_at(mut self, created_utc: DateTime<Utc>) -> Self {
        self.created_utc = created_utc;
        self
    }
}
