use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::auth::repo::CurrentUser;

// Request fields are optional so that missing values surface as our own
// validation errors rather than a deserializer rejection.

/// Request body for registration. `nama` is the original frontend's
/// field name for the display name.
#[derive(Debug, Deserialize)]
pub struct RegisterRequest {
    #[serde(rename = "nama")]
    pub name: Option<String>,
    pub email: Option<String>,
    pub password: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub email: Option<String>,
    pub password: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct UpdateProfileRequest {
    #[serde(rename = "nama")]
    pub name: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChangePasswordRequest {
    pub current_password: Option<String>,
    pub new_password: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct DeleteAccountRequest {
    pub confirm: Option<String>,
}

/// Public slice of a user embedded in register/login responses.
#[derive(Debug, Serialize)]
pub struct PublicUser {
    pub id: Uuid,
    #[serde(rename = "nama")]
    pub name: String,
    pub email: String,
}

#[derive(Debug, Serialize)]
pub struct RegisterResponse {
    pub message: String,
    pub user: PublicUser,
}

#[derive(Debug, Serialize)]
pub struct AuthResponse {
    pub token: String,
    pub user: PublicUser,
}

#[derive(Debug, Serialize)]
pub struct MeResponse {
    pub user: CurrentUser,
}

#[derive(Debug, Serialize)]
pub struct ProfileResponse {
    pub message: String,
    pub user: CurrentUser,
}

#[derive(Debug, Serialize)]
pub struct MessageResponse {
    pub message: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn public_user_uses_original_field_name() {
        let user = PublicUser {
            id: Uuid::new_v4(),
            name: "Sari".into(),
            email: "sari@example.com".into(),
        };
        let json = serde_json::to_string(&user).unwrap();
        assert!(json.contains(r#""nama":"Sari""#));
        assert!(json.contains("sari@example.com"));
    }

    #[test]
    fn register_request_accepts_nama() {
        let parsed: RegisterRequest =
            serde_json::from_str(r#"{"nama":"Sari","email":"s@x.com","password":"abc123"}"#)
                .unwrap();
        assert_eq!(parsed.name.as_deref(), Some("Sari"));
    }

    #[test]
    fn change_password_request_is_camel_case() {
        let parsed: ChangePasswordRequest =
            serde_json::from_str(r#"{"currentPassword":"a1b2c3","newPassword":"d4e5f6"}"#)
                .unwrap();
        assert_eq!(parsed.current_password.as_deref(), Some("a1b2c3"));
        assert_eq!(parsed.new_password.as_deref(), Some("d4e5f6"));
    }
}
