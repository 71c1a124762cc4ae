//! Profile record store for OnlyFriends.
//!
//! The store is owned by the profile service and keyed by user id. This crate
//! gives the recommendation engine read access to it (single lookups and
//! keyset-paginated listing) plus a write path that notifies listeners so
//! derived data, such as the vector index, can follow profile changes.

pub mod entity;
pub mod error;
pub mod memory;
pub mod models;
pub mod notify;
pub mod postgres;
pub mod store;
pub mod stream;

pub use error::{ProfileError, ProfileResult};
pub use memory::InMemoryProfileStore;
pub use models::{IncompleteProfile, Profile, ProfileField, ProfileRecord};
pub use notify::{NotifyingProfileWriter, ProfileChangeListener};
pub use postgres::PgProfileStore;
pub use store::{ProfilePage, ProfileStore, ProfileWriter};
pub use stream::profile_pages;
