//! Credential acquisition: LWA token exchange, STS role assumption and
//! SigV4 request signing built from the assumed identity.

pub mod credential;
pub mod lwa;
pub mod sigv4;
pub mod sts;

pub use credential::{Credential, TemporaryIdentity};
pub use lwa::TokenProvider;
pub use sigv4::RequestSigner;
pub use sts::IdentityProvider;
