//! Canonical profile text and index entry identity.
//!
//! Ingestion and the query path must serialize a profile identically; both go
//! through [`canonical_text`].

use domain_profiles::Profile;
use uuid::Uuid;

/// Namespace for index entry ids derived from usernames.
pub const ENTRY_NAMESPACE: Uuid = Uuid::from_u128(0x6f6e_6c79_6672_5100_8000_7072_6f66_696c);

/// `age: {age}; city: {city}; interests: {a, b, ...}`
///
/// Interests keep their stored order. Name and username do not take part.
pub fn canonical_text(profile: &Profile) -> String {
    format!(
        "age: {}; city: {}; interests: {}",
        profile.age,
        profile.city,
        profile.interests.join(", ")
    )
}

/// Stable index entry id for a username.
pub fn entry_id(username: &str) -> Uuid {
    Uuid::new_v5(&ENTRY_NAMESPACE, username.as_bytes())
}
