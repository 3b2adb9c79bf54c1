//! User entity and role lattice.

pub mod model;
pub mod role;

pub use model::{PublicUser, User};
pub use role::Role;
