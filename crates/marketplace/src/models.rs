//! Wire types for the profile API.

use serde::{Deserialize, Serialize};

/// A user's profile as returned by `GET /profile`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Profile {
    #[serde(default)]
    pub first_name: String,

    #[serde(default)]
    pub last_name: String,

    /// Read-only; cannot be changed from the profile page.
    #[serde(default)]
    pub email: String,
}

impl Profile {
    /// "First Last", as shown under "Full Name".
    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name).trim().to_string()
    }
}

/// Envelope around the profile in `GET /profile` responses.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProfileEnvelope {
    pub user: Profile,
}

/// Body of `PUT /profile`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProfileUpdate {
    pub first_name: String,
    pub last_name: String,
    pub password: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_envelope_deserialization() {
        let json = serde_json::json!({
            "user": {
                "firstName": "Ada",
                "lastName": "Lovelace",
                "email": "ada@example.com"
            }
        });

        let envelope: ProfileEnvelope = serde_json::from_value(json).unwrap();
        assert_eq!(envelope.user.first_name, "Ada");
        assert_eq!(envelope.user.email, "ada@example.com");
        assert_eq!(envelope.user.full_name(), "Ada Lovelace");
    }

    #[test]
    fn test_update_serialization_uses_camel_case() {
        let update = ProfileUpdate {
            first_name: "Ada".into(),
            last_name: "Byron".into(),
            password: "P@ssword123".into(),
        };

        let json = serde_json::to_value(&update).unwrap();
        assert_eq!(json["firstName"], "Ada");
        assert_eq!(json["lastName"], "Byron");
        assert!(json.get("email").is_none());
        assert!(json.get("confirmPassword").is_none());
    }
}
