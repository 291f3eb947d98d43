//! Caller identity
//!
//! - [`CurrentCustomer`] - `x-user-id`
//! - [`CurrentAdmin`] - `x-admin-id`, customers get `AdminRequired`
//! - [`CurrentActor`] - either, as an [`Actor`](shared::order::Actor)

pub mod extractor;

pub use extractor::{ADMIN_ID_HEADER, CurrentActor, CurrentAdmin, CurrentCustomer, USER_ID_HEADER};
