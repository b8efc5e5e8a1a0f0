use serde::{Deserialize, Serialize};

/// Role carried in the caller's token. Accounts themselves are managed by the identity provider.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Deserialize, Serialize, async_graphql::Enum)]
#[serde(rename_all = "snake_case")]
pub enum UserRole {
    #[default]
    Student,
    Employer,
    Admin,
}

impl UserRole {
    /// Employers and admins may author tests.
    pub fn can_author(&self) -> bool {
        matches!(self, UserRole::Employer | UserRole::Admin)
    }
}
