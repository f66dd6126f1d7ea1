//! Users, roles and the acting identity.
//!
//! Roles are trusted as stored; the daemon resolves the acting user from
//! the request and hands an [`Actor`] to the lifecycle rules.

use serde::{Deserialize, Serialize};

/// Role tags held by users
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    /// Regular employee submitting tickets
    #[serde(alias = "pegawai")]
    User,
    /// Service desk administrator: reviews, approves, assigns
    AdminLayanan,
    /// Repair technician
    Teknisi,
    /// Procurement administrator handling work orders
    AdminPenyedia,
    SuperAdmin,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::User => "user",
            Self::AdminLayanan => "admin_layanan",
            Self::Teknisi => "teknisi",
            Self::AdminPenyedia => "admin_penyedia",
            Self::SuperAdmin => "super_admin",
        }
    }
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A registered user
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct User {
    pub id: String,
    pub name: String,
    pub email: String,
    #[serde(default)]
    pub phone: String,
    /// Organisational unit (work unit)
    #[serde(default)]
    pub unit: String,
    pub roles: Vec<Role>,
    #[serde(default)]
    pub version: u64,
}

impl User {
    pub fn new(id: &str, name: &str, email: &str, roles: Vec<Role>) -> Self {
        Self {
            id: id.to_string(),
            name: name.to_string(),
            email: email.to_string(),
            phone: String::new(),
            unit: String::new(),
            roles,
            version: 0,
        }
    }

    pub fn with_unit(mut self, unit: &str) -> Self {
        self.unit = unit.to_string();
        self
    }

    pub fn with_phone(mut self, phone: &str) -> Self {
        self.phone = phone.to_string();
        self
    }

    pub fn has_role(&self, role: Role) -> bool {
        self.roles.contains(&role)
    }

    /// Acting identity for lifecycle calls
    pub fn actor(&self) -> Actor {
        Actor {
            id: self.id.clone(),
            name: self.name.clone(),
            roles: self.roles.clone(),
        }
    }

    /// Denormalized requester snapshot stored on tickets
    pub fn requester(&self) -> Requester {
        Requester {
            id: self.id.clone(),
            name: self.name.clone(),
            email: self.email.clone(),
            phone: self.phone.clone(),
            unit: self.unit.clone(),
        }
    }

    pub fn person_ref(&self) -> PersonRef {
        PersonRef {
            id: self.id.clone(),
            name: self.name.clone(),
        }
    }
}

/// Identity performing an action
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Actor {
    pub id: String,
    pub name: String,
    pub roles: Vec<Role>,
}

impl Actor {
    pub const SYSTEM_ID: &'static str = "system";

    /// Internal trigger, e.g. a work order completing
    pub fn system() -> Self {
        Self {
            id: Self::SYSTEM_ID.to_string(),
            name: "System".to_string(),
            roles: Vec::new(),
        }
    }

    pub fn has_role(&self, role: Role) -> bool {
        self.roles.contains(&role)
    }

    pub fn has_any_role(&self, roles: &[Role]) -> bool {
        roles.iter().any(|r| self.has_role(*r))
    }

    pub fn is_system(&self) -> bool {
        self.id == Self::SYSTEM_ID
    }

    pub fn person_ref(&self) -> PersonRef {
        PersonRef {
            id: self.id.clone(),
            name: self.name.clone(),
        }
    }
}

/// Read access to registered users, used where a rule must check someone
/// other than the actor (e.g. the technician being assigned)
pub trait UserLookup {
    fn find_user(&self, id: &str) -> Option<User>;
}

impl UserLookup for [User] {
    fn find_user(&self, id: &str) -> Option<User> {
        self.iter().find(|u| u.id == id).cloned()
    }
}

impl UserLookup for Vec<User> {
    fn find_user(&self, id: &str) -> Option<User> {
        self.as_slice().find_user(id)
    }
}

/// Minimal reference to a user
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PersonRef {
    pub id: String,
    pub name: String,
}

/// Requester identity copied onto a ticket at submission time
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Requester {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub phone: String,
    #[serde(default)]
    pub unit: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_role_legacy_alias() {
        let role: Role = serde_json::from_str("\"pegawai\"").unwrap();
        assert_eq!(role, Role::User);
        assert_eq!(serde_json::to_string(&role).unwrap(), "\"user\"");
    }

    #[test]
    fn test_actor_roles() {
        let user = User::new("u1", "Sari", "sari@example.org", vec![Role::Teknisi]);
        let actor = user.actor();
        assert!(actor.has_role(Role::Teknisi));
        assert!(!actor.has_role(Role::AdminLayanan));
        assert!(actor.has_any_role(&[Role::AdminLayanan, Role::Teknisi]));
        assert!(!actor.is_system());
        assert!(Actor::system().is_system());
    }
}
