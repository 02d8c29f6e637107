//! Platform user model.

use std::fmt::{Display, Formatter};

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::resolve::Choice;

/// A platform user, acting as requester or as request target.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub struct User {
    /// Unique user identifier.
    pub id: Uuid,
    /// First name.
    #[serde(default)]
    pub given_name: String,
    /// Last name.
    #[serde(default)]
    pub family_name: String,
    /// Primary email address.
    #[serde(default)]
    pub email: String,
}

impl User {
    /// Given and family name joined by a space.
    #[must_use]
    pub fn full_name(&self) -> String {
        format!("{} {}", self.given_name, self.family_name)
            .trim()
            .to_owned()
    }
}

impl Display for User {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} ({})", self.full_name(), self.email)
    }
}

impl Choice for User {
    fn choice_id(&self) -> Uuid {
        self.id
    }

    fn choice_label(&self) -> String {
        self.to_string()
    }
}
