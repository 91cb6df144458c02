pub mod claims;
pub mod error;
pub mod extractor;
pub mod factory;
pub mod gate;
pub mod jwks;
pub mod key_directory;
pub mod permissions;
pub mod verifier;

pub use claims::{Claims, ClaimsPolicy};
pub use error::{AuthError, HeaderProblem};
pub use extractor::{BearerToken, extract_bearer};
pub use factory::{build_auth_gate, build_key_directory};
pub use gate::{AuthDecision, AuthGate};
pub use jwks::{KeySet, SigningKey};
pub use key_directory::{HttpKeySetSource, KeyDirectory, KeyFetchError, KeySetSource, RefreshPolicy};
pub use permissions::check_permission;
pub use verifier::{DecodedHeader, TokenVerifier, decode_header};
