use serde::{Deserialize, Serialize};
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Qualification {
    Qualified,
    #[default]
    Unqualified,
}

impl Qualification {
    pub fn label(&self) -> &'static str {
        match self {
            Self::Qualified => "Qualified",
            Self::Unqualified => "Unqualified",
        }
    }
}

impl FromStr for Qualification {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "qualified" => Ok(Self::Qualified),
            "unqualified" => Ok(Self::Unqualified),
            _ => Err(()),
        }
    }
}

impl std::fmt::Display for Qualification {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Qualified => write!(f, "qualified"),
            Self::Unqualified => write!(f, "unqualified"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum StaffRole {
    #[default]
    General,
    Sv,
    Sl,
    Manager,
}

impl StaffRole {
    pub fn label(&self) -> &'static str {
        match self {
            Self::General => "General",
            Self::Sv => "Supervisor",
            Self::Sl => "Shift Lead",
            Self::Manager => "Manager",
        }
    }
}

impl FromStr for StaffRole {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "general" => Ok(Self::General),
            "sv" => Ok(Self::Sv),
            "sl" => Ok(Self::Sl),
            "manager" => Ok(Self::Manager),
            _ => Err(()),
        }
    }
}

impl std::fmt::Display for StaffRole {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::General => write!(f, "general"),
            Self::Sv => write!(f, "sv"),
            Self::Sl => write!(f, "sl"),
            Self::Manager => write!(f, "manager"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Department {
    It,
    Ac,
    Sl,
    Hr,
    Mk,
}

impl Department {
    pub fn label(&self) -> &'static str {
        match self {
            Self::It => "Information Systems",
            Self::Ac => "Accounting",
            Self::Sl => "Sales",
            Self::Hr => "Human Resources",
            Self::Mk => "Marketing",
        }
    }
}

impl FromStr for Department {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "it" => Ok(Self::It),
            "ac" => Ok(Self::Ac),
            "sl" => Ok(Self::Sl),
            "hr" => Ok(Self::Hr),
            "mk" => Ok(Self::Mk),
            _ => Err(()),
        }
    }
}

impl std::fmt::Display for Department {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::It => write!(f, "it"),
            Self::Ac => write!(f, "ac"),
            Self::Sl => write!(f, "sl"),
            Self::Hr => write!(f, "hr"),
            Self::Mk => write!(f, "mk"),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct User {
    pub id: i64,
    pub admin_id: String,
    pub name: String,
    pub email: String,
    #[serde(skip_serializing)]
    pub password_hash: String,
    pub qualification: Qualification,
    pub role: StaffRole,
    pub department: Option<Department>,
    pub created_at: String,
    pub updated_at: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct UserSummary {
    pub id: i64,
    pub name: String,
}

impl From<&User> for UserSummary {
    fn from(user: &User) -> Self {
        Self {
            id: user.id,
            name: user.name.clone(),
        }
    }
}

/// Directory row with display labels resolved for the template.
#[derive(Debug, Clone, Serialize)]
pub struct DirectoryEntry {
    pub id: i64,
    pub name: String,
    pub email: String,
    pub department: Option<&'static str>,
    pub role: &'static str,
    pub qualification: &'static str,
    pub created_at: String,
}

impl From<&User> for DirectoryEntry {
    fn from(user: &User) -> Self {
        Self {
            id: user.id,
            name: user.name.clone(),
            email: user.email.clone(),
            department: user.department.map(|d| d.label()),
            role: user.role.label(),
            qualification: user.qualification.label(),
            created_at: user.created_at.clone(),
        }
    }
}
