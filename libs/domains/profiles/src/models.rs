use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

/// A profile exactly as the record store holds it.
///
/// The store does not enforce a schema, so every attribute except the key may
/// be absent. Use [`ProfileRecord::into_profile`] to obtain a [`Profile`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProfileRecord {
    pub id: Uuid,
    pub username: Option<String>,
    pub name: Option<String>,
    pub age: Option<i32>,
    pub city: Option<String>,
    pub interests: Option<Vec<String>>,
}

/// A profile with every attribute present.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Profile {
    pub id: Uuid,
    pub username: String,
    pub name: String,
    pub age: u32,
    pub city: String,
    /// Order is preserved as stored
    pub interests: Vec<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ProfileField {
    Username,
    Name,
    Age,
    City,
    Interests,
}

impl ProfileField {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Username => "username",
            Self::Name => "name",
            Self::Age => "age",
            Self::City => "city",
            Self::Interests => "interests",
        }
    }
}

impl fmt::Display for ProfileField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The first required attribute found missing or unusable on a record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
#[error("profile {id} is missing required field '{field}'")]
pub struct IncompleteProfile {
    pub id: Uuid,
    pub field: ProfileField,
}

fn present(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}

impl ProfileRecord {
    pub fn new(id: Uuid) -> Self {
        Self {
            id,
            username: None,
            name: None,
            age: None,
            city: None,
            interests: None,
        }
    }

    /// Validates the record.
    ///
    /// Blank strings count as missing and a negative age is rejected. An empty
    /// interest list is valid.
    pub fn into_profile(self) -> Result<Profile, IncompleteProfile> {
        let id = self.id;
        let missing = |field| IncompleteProfile { id, field };

        Ok(Profile {
            id,
            username: present(self.username).ok_or(missing(ProfileField::Username))?,
            name: present(self.name).ok_or(missing(ProfileField::Name))?,
            age: self
                .age
                .and_then(|age| u32::try_from(age).ok())
                .ok_or(missing(ProfileField::Age))?,
            city: present(self.city).ok_or(missing(ProfileField::City))?,
            interests: self.interests.ok_or(missing(ProfileField::Interests))?,
        })
    }
}

impl From<Profile> for ProfileRecord {
    fn from(profile: Profile) -> Self {
        Self {
            id: profile.id,
            username: Some(profile.username),
            name: Some(profile.name),
            age: i32::try_from(profile.age).ok(),
            city: Some(profile.city),
            interests: Some(profile.interests),
        }
    }
}
