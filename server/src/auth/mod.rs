//! Session/identity layer: password hashing, JWT issue/verify, the
//! Claims extractor, and the login/signup/me handlers.

pub mod handlers;
pub mod jwt;
pub mod middleware;
pub mod password;
