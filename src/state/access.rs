/// Roles and the screens each role may open
use std::fmt;

use serde::{Deserialize, Serialize};

/// Who is using the desk. Unknown role strings are treated as `Client`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase", from = "String")]
pub enum Role {
    Client,
    Employee,
    Admin,
}

impl Role {
    /// Staff roles a new team member can be given
    pub const STAFF: [Role; 2] = [Role::Employee, Role::Admin];

    pub fn parse(value: &str) -> Role {
        match value.trim() {
            "admin" => Role::Admin,
            "employee" => Role::Employee,
            _ => Role::Client,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Client => "client",
            Role::Employee => "employee",
            Role::Admin => "admin",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Role::Client => "Client",
            Role::Employee => "Professional",
            Role::Admin => "Admin",
        }
    }

    pub fn is_staff(&self) -> bool {
        !matches!(self, Role::Client)
    }

    /// Capability check for role-gated screens
    pub fn can_access(&self, view: View) -> bool {
        match view {
            View::Booking => true,
            View::Agenda => matches!(self, Role::Employee | Role::Admin),
            View::Financial | View::Stock | View::Team => matches!(self, Role::Admin),
        }
    }

    /// Screens shown in the navigation bar, in display order
    pub fn views(&self) -> Vec<View> {
        View::ALL
            .into_iter()
            .filter(|view| self.can_access(*view))
            .collect()
    }
}

impl From<String> for Role {
    fn from(value: String) -> Self {
        Role::parse(&value)
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Top-level screens of the desk
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum View {
    Booking,
    Agenda,
    Financial,
    Stock,
    Team,
}

impl View {
    pub const ALL: [View; 5] = [
        View::Booking,
        View::Agenda,
        View::Financial,
        View::Stock,
        View::Team,
    ];

    pub fn title(&self) -> &'static str {
        match self {
            View::Booking => "Booking",
            View::Agenda => "Agenda",
            View::Financial => "Financial",
            View::Stock => "Stock",
            View::Team => "Team",
        }
    }

    /// Lowest role allowed in, for the restricted-area notice
    pub fn audience(&self) -> &'static str {
        match self {
            View::Booking => "everyone",
            View::Agenda => "professionals and administrators",
            View::Financial | View::Stock | View::Team => "administrators",
        }
    }
}
