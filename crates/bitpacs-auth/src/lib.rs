//! Authentication for BitPacs: JWT issuance and validation plus
//! Argon2id password hashing.
//!
//! Tokens are stateless. There is no session store and no revocation
//! list; a token is valid until it expires.

pub mod jwt;
pub mod password;

pub use jwt::{Claims, JwtDecoder, JwtEncoder};
pub use password::PasswordHasher;
