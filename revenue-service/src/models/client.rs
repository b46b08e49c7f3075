//! Client model.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// Client of an account: either a company or an individual.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Client {
    pub client_id: Uuid,
    pub account_id: Uuid,
    pub is_company: bool,
    pub company_name: Option<String>,
    pub contact_first_name: String,
    pub contact_last_name: String,
    pub created_utc: DateTime<Utc>,
}

impl Client {
    pub fn company(account_id: Uuid, company_name: impl Into<String>) -> Self {
        Self {
            client_id: Uuid::new_v4(),
            account_id,
            is_company: true,
            company_name: Some(company_name.into()),
            contact_first_name: String::new(),
            contact_last_name: String::new(),
            created_utc: Utc::now(),
        }
    }

    pub fn individual(
        account_id: Uuid,
        first_name: impl Into<String>,
        last_name: impl Into<String>,
    ) -> Self {
        Self {
            client_id: Uuid::new_v4(),
            account_id,
            is_company: false,
            company_name: None,
            contact_first_name: first_name.into(),
            contact_last_name: last_name.into(),
            created_utc: Utc::now(),
        }
    }

    pub fn created_at(mut self, created_utc: DateTime<Utc>) -> Self {
        self.created_utc = created_utc;
        self
    }

    /// Company name for companies, "first last" for individuals.
    pub fn display_name(&self) -> String {
        match (self.is_company, self.company_name.as_deref()) {
            (true, Some(name)) => name.to_string(),
            _ => format!("{} {}", self.contact_first_name, self.contact_last_name)
                .trim()
                .to_string(),
        }
    }
}
