//! Pet profiles

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::{optional, required};

#[derive(Debug, Clone, Serialize)]
pub struct Pet {
    pub id: Uuid,
    pub name: String,
    pub description: String,
    pub contact: String,
    pub image_base64: Option<String>,
    pub owner_id: Uuid,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Create/update body shared by pets and missing-pet reports
#[derive(Debug, Clone, Deserialize)]
pub struct PetPayload {
    pub name: String,
    pub description: String,
    pub contact: String,
    #[serde(default)]
    pub image_base64: Option<String>,
}

impl PetPayload {
    /// Trim every field; name, description and contact are required
    pub fn validate(self) -> Result<Self, String> {
        Ok(Self {
            name: required(&self.name, "Name")?,
            description: required(&self.description, "Description")?,
            contact: required(&self.contact, "Contact")?,
            image_base64: optional(self.image_base64),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_payload_validation() {
        let payload = PetPayload {
            name: "  Rex ".to_string(),
            description: "Vira-lata caramelo".to_string(),
            contact: "11 99999-0000".to_string(),
            image_base64: Some(String::new()),
        }
        .validate()
        .unwrap();

        assert_eq!(payload.name, "Rex");
        assert_eq!(payload.image_base64, None);

        let missing_contact = PetPayload {
            name: "Rex".to_string(),
            description: "x".to_string(),
            contact: " ".to_string(),
            image_base64: None,
        };
        assert_eq!(missing_contact.validate().unwrap_err(), "Contact is required");
    }
}
