//! Member accounts as seen by the connection store.
//!
//! Accounts are seeded elsewhere; this module only maps `member` rows.

mod mapper;

pub use mapper::{AccountMapper, PictureStorage, UrlPictureStorage};
pub(crate) use mapper::ACCOUNT_COLUMNS;

use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Gender {
    Male,
    Female,
}

impl Gender {
    /// Decode the single-letter `member.gender` column. Unknown values read as male.
    pub fn from_code(code: &str) -> Self {
        match code {
            "F" | "f" => Gender::Female,
            _ => Gender::Male,
        }
    }

    pub fn code(self) -> &'static str {
        match self {
            Gender::Male => "M",
            Gender::Female => "F",
        }
    }

    fn picture_dir(self) -> &'static str {
        match self {
            Gender::Male => "male",
            Gender::Female => "female",
        }
    }
}

/// A local member account.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Account {
    pub id: i64,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub username: Option<String>,
    pub gender: Gender,
    /// Username when set, else the numeric id.
    pub profile_key: String,
    pub profile_url: String,
    pub picture_url: String,
}

impl Account {
    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
    }
}
