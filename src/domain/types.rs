//! Domain types with validation support.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use validator::Validate;

/// Role assigned to a user. Stored but not enforced.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Admin,
    #[default]
    User,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Admin => "admin",
            Self::User => "user",
        }
    }
}

impl std::str::FromStr for Role {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "admin" => Ok(Self::Admin),
            "user" => Ok(Self::User),
            _ => Err(format!("Invalid role: {}", s)),
        }
    }
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Persisted user record.
///
/// Holds the bcrypt hash and the soft-delete marker, so it never leaves
/// the service layer; see [`UserResponse`] for the outward shape.
#[derive(Debug, Clone, PartialEq)]
pub struct User {
    /// Assigned by the gateway on insert; `0` until then
    pub id: i64,
    pub name: String,
    pub email: String,
    pub password_hash: String,
    pub role: Role,
    pub active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub deleted_at: Option<DateTime<Utc>>,
}

impl User {
    #[must_use]
    pub fn new(name: String, email: String, password_hash: String, role: Role) -> Self {
        let now = Utc::now();
        Self {
            id: 0,
            name,
            email,
            password_hash,
            role,
            active: true,
            created_at: now,
            updated_at: now,
            deleted_at: None,
        }
    }

    #[must_use]
    pub fn to_response(&self) -> UserResponse {
        UserResponse {
            id: self.id,
            name: self.name.clone(),
            email: self.email.clone(),
            role: self.role,
            active: self.active,
            created_at: self.created_at,
            updated_at: self.updated_at,
        }
    }
}

/// User as returned to clients. Carries no password material.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, ToSchema)]
pub struct UserResponse {
    #[schema(example = 1)]
    pub id: i64,
    #[schema(example = "Ann")]
    pub name: String,
    #[schema(example = "ann@example.com")]
    pub email: String,
    pub role: Role,
    pub active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Request to create a user
#[derive(Debug, Clone, Serialize, Deserialize, Validate, ToSchema)]
pub struct CreateUserRequest {
    #[validate(length(min = 1, max = 100, message = "Name must be between 1 and 100 characters"))]
    #[schema(example = "Ann")]
    pub name: String,
    #[validate(
        email(message = "Email must be a valid address"),
        length(max = 100, message = "Email must be at most 100 characters")
    )]
    #[schema(example = "ann@example.com")]
    pub email: String,
    #[validate(length(min = 6, max = 72, message = "Password must be between 6 and 72 characters"))]
    #[schema(example = "secret1")]
    pub password: String,
    /// Defaults to `user` when omitted
    #[serde(default)]
    pub role: Option<Role>,
}

impl CreateUserRequest {
    #[must_use]
    pub fn new(name: String, email: String, password: String) -> Self {
        Self {
            name,
            email,
            password,
            role: None,
        }
    }
}

/// Partial user update. Absent fields keep their stored value.
#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate, ToSchema)]
pub struct UpdateUserRequest {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[validate(length(min = 1, max = 100, message = "Name must be between 1 and 100 characters"))]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[validate(
        email(message = "Email must be a valid address"),
        length(max = 100, message = "Email must be at most 100 characters")
    )]
    pub email: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[validate(length(min = 6, max = 72, message = "Password must be between 6 and 72 characters"))]
    pub password: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub role: Option<Role>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub active: Option<bool>,
}

/// Core item entity
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, ToSchema)]
pub struct Item {
    #[schema(example = 1)]
    pub id: i64,
    #[schema(example = "Widget")]
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[schema(example = "A small widget")]
    pub description: Option<String>,
    #[schema(example = 9.99)]
    pub price: f64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Item {
    #[must_use]
    pub fn new(name: String, description: Option<String>, price: f64) -> Self {
        let now = Utc::now();
        Self {
            id: 0,
            name,
            description,
            price,
            created_at: now,
            updated_at: now,
        }
    }
}

/// Request to create an item
#[derive(Debug, Clone, Serialize, Deserialize, Validate, ToSchema)]
pub struct CreateItemRequest {
    #[validate(length(min = 1, max = 255, message = "Name must be between 1 and 255 characters"))]
    #[schema(example = "Widget")]
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    #[validate(range(min = 0.0, message = "Price must be a non-negative number"))]
    #[schema(example = 9.99)]
    pub price: f64,
}

/// Partial item update. Absent fields keep their stored value.
#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate, ToSchema)]
pub struct UpdateItemRequest {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[validate(length(min = 1, max = 255, message = "Name must be between 1 and 255 characters"))]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[validate(range(min = 0.0, message = "Price must be a non-negative number"))]
    pub price: Option<f64>,
}

/// Health check response
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, ToSchema)]
pub struct HealthResponse {
    #[schema(example = "ok")]
    pub status: String,
}

impl HealthResponse {
    #[must_use]
    pub fn ok() -> Self {
        Self {
            status: "ok".to_string(),
        }
    }

    #[must_use]
    pub fn unavailable() -> Self {
        Self {
            status: "unavailable".to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    #[test]
    fn test_role_display_and_parsing() {
        for (role, string) in [(Role::Admin, "admin"), (Role::User, "user")] {
            assert_eq!(role.as_str(), string);
            assert_eq!(role.to_string(), string);
            assert_eq!(Role::from_str(string).unwrap(), role);
        }

        assert!(Role::from_str("root").is_err());
        assert_eq!(Role::default(), Role::User);
    }

    #[test]
    fn test_unknown_role_fails_deserialization() {
        let body = r#"{"name":"Ann","email":"ann@x.com","password":"secret1","role":"root"}"#;
        assert!(serde_json::from_str::<CreateUserRequest>(body).is_err());
    }

    #[test]
    fn test_create_user_request_validation() {
        let req = CreateUserRequest::new(
            "Ann".to_string(),
            "ann@x.com".to_string(),
            "secret1".to_string(),
        );
        assert!(req.validate().is_ok());

        // Empty name
        let req = CreateUserRequest::new(String::new(), "ann@x.com".to_string(), "secret1".to_string());
        assert!(req.validate().is_err());

        // Malformed email
        let req = CreateUserRequest::new("Ann".to_string(), "not-an-email".to_string(), "secret1".to_string());
        assert!(req.validate().is_err());

        // Short password
        let req = CreateUserRequest::new("Ann".to_string(), "ann@x.com".to_string(), "12345".to_string());
        let errors = req.validate().unwrap_err();
        assert!(errors.field_errors().contains_key("password"));
    }

    #[test]
    fn test_update_user_request_skips_absent_fields() {
        assert!(UpdateUserRequest::default().validate().is_ok());

        let req = UpdateUserRequest {
            email: Some("broken".to_string()),
            ..Default::default()
        };
        assert!(req.validate().is_err());

        let req: UpdateUserRequest = serde_json::from_str(r#"{"active":false}"#).unwrap();
        assert_eq!(req.active, Some(false));
        assert!(req.name.is_none());
        assert!(req.validate().is_ok());
    }

    #[test]
    fn test_user_response_omits_password() {
        let user = User::new(
            "Ann".to_string(),
            "ann@x.com".to_string(),
            "$2b$04$hash".to_string(),
            Role::User,
        );
        let json = serde_json::to_value(user.to_response()).unwrap();

        assert!(json.get("password").is_none());
        assert!(json.get("password_hash").is_none());
        assert_eq!(json["role"], "user");
        assert_eq!(json["active"], true);
    }

    #[test]
    fn test_item_request_price_validation() {
        let req = CreateItemRequest {
            name: "Widget".to_string(),
            description: None,
            price: 9.99,
        };
        assert!(req.validate().is_ok());

        let req = CreateItemRequest {
            price: -1.0,
            ..req
        };
        assert!(req.validate().is_err());

        let req = UpdateItemRequest {
            price: Some(-0.5),
            ..Default::default()
        };
        assert!(req.validate().is_err());
    }
}
