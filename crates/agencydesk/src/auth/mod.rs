//! Admin authentication primitives: password hashing and bearer sessions.

mod password;
mod session;

pub use password::{
    check_password_strength, hash_password, verify_password, verify_placeholder, DEFAULT_ROUNDS,
};
pub use session::{Session, SessionStore};
