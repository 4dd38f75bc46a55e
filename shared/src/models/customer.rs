//! Customer models

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A customer of the shop
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Customer {
    pub id: Uuid,
    pub name: String,
    pub company: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub tax_id: Option<String>,
    pub address: Option<String>,
    pub city: Option<String>,
    pub state: Option<String>,
    pub zip_code: Option<String>,
    pub notes: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Customer {
    /// Display name used by sale listings: "Company - Contact" when a
    /// company is on file, otherwise just the contact name.
    pub fn display_name(&self) -> String {
        match self.company.as_deref() {
            Some(company) if !company.is_empty() => format!("{} - {}", company, self.name),
            _ => self.name.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn customer(name: &str, company: Option<&str>) -> Customer {
        Customer {
            id: Uuid::new_v4(),
            name: name.to_string(),
            company: company.map(String::from),
            email: None,
            phone: None,
            tax_id: None,
            address: None,
            city: None,
            state: None,
            zip_code: None,
            notes: None,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn display_name_includes_company_when_present() {
        assert_eq!(
            customer("Ana", Some("Acme")).display_name(),
            "Acme - Ana"
        );
        assert_eq!(customer("Ana", None).display_name(), "Ana");
        assert_eq!(customer("Ana", Some("")).display_name(), "Ana");
    }
}
