//! User entity and its write payloads

use serde::{Deserialize, Serialize};

use super::entity::{Entity, EntityPatch};

/// User as returned by the entity API
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    /// Server-assigned id.
    pub id: String,
    /// Login name.
    pub username: String,
    /// Given name.
    pub first_name: String,
    /// Family name.
    pub last_name: String,
    /// Contact address.
    pub email: String,
    /// Whether the account may sign in.
    pub active: bool,
}

/// Body of a create request; the server assigns the id
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateUserDto {
    /// Login name.
    pub username: String,
    /// Given name.
    pub first_name: String,
    /// Family name.
    pub last_name: String,
    /// Contact address.
    pub email: String,
    /// Server default when absent.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub active: Option<bool>,
}

/// Partial update; only the fields that are set are sent
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateUserDto {
    /// Target entity; sent in the path, never the body.
    #[serde(skip_serializing)]
    pub id: String,
    /// New login name.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub username: Option<String>,
    /// New given name.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub first_name: Option<String>,
    /// New family name.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_name: Option<String>,
    /// New contact address.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    /// New account state.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub active: Option<bool>,
}

impl UpdateUserDto {
    /// Empty patch for `id`.
    pub fn new(id: impl Into<String>) -> Self {
        Self { id: id.into(), ..Self::default() }
    }
}

impl Entity for User {
    const NAME: &'static str = "User";
    const COLLECTION: &'static str = "users";
    const LABEL: &'static str = "người dùng";

    type Create = CreateUserDto;
    type Update = UpdateUserDto;

    fn id(&self) -> &str {
        &self.id
    }

    fn display_name(&self) -> &str {
        &self.username
    }
}

impl EntityPatch for UpdateUserDto {
    fn target_id(&self) -> &str {
        &self.id
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn user_uses_camel_case_wire_names() {
        let user: User = serde_json::from_value(json!({
            "id": "u-1",
            "username": "alice",
            "firstName": "Alice",
            "lastName": "Nguyen",
            "email": "alice@example.com",
            "active": true
        }))
        .unwrap();

        assert_eq!(user.first_name, "Alice");
        assert_eq!(user.display_name(), "alice");
        assert_eq!(serde_json::to_value(&user).unwrap()["lastName"], "Nguyen");
    }

    #[test]
    fn create_omits_unset_active_flag() {
        let dto = CreateUserDto {
            username: "bob".into(),
            first_name: "Bob".into(),
            last_name: "Tran".into(),
            email: "bob@example.com".into(),
            active: None,
        };
        let body = serde_json::to_value(&dto).unwrap();
        assert!(body.get("active").is_none());
        assert_eq!(body["firstName"], "Bob");
    }

    #[test]
    fn update_keeps_id_out_of_body() {
        let patch = UpdateUserDto { email: Some("new@example.com".into()), ..UpdateUserDto::new("u-9") };
        assert_eq!(patch.target_id(), "u-9");
        assert_eq!(serde_json::to_value(&patch).unwrap(), json!({"email": "new@example.com"}));
    }
}
