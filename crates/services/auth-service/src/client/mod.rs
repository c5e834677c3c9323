//! Clients for services auth-service depends on.

mod user_client;

pub use user_client::{EmbeddedUserClient, UserDirectory};
