use serde::{Deserialize, Serialize};

use crate::error::SessionError;

const ADMIN_USERNAME: &str = "admin";
const ADMIN_PASSWORD: &str = "admin123";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Admin,
    Customer,
}

/// The signed-in session user. This is an access convenience, not an
/// authentication boundary.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct User {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    pub role: Role,
}

impl User {
    /// Case-sensitive comparison against the fixed admin pair.
    pub fn admin(username: &str, password: &str) -> Result<Self, SessionError> {
        if username == ADMIN_USERNAME && password == ADMIN_PASSWORD {
            Ok(Self { name: "Admin".to_string(), phone: None, role: Role::Admin })
        } else {
            Err(SessionError::InvalidCredentials)
        }
    }

    /// Customers only need a non-empty name and phone. Nothing is verified.
    pub fn customer(name: &str, phone: &str) -> Result<Self, SessionError> {
        let (name, phone) = (name.trim(), phone.trim());
        if name.is_empty() || phone.is_empty() {
            return Err(SessionError::MissingCustomerDetails);
        }
        Ok(Self { name: name.to_string(), phone: Some(phone.to_string()), role: Role::Customer })
    }

    pub fn is_admin(&self) -> bool {
        self.role == Role::Admin
    }
}
