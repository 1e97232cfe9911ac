/// Authentication core
///
/// Token codec, password hashing, and the refresh-token session
/// state machine.

mod claims;
mod jwt;
mod password;
mod session;

pub use claims::AccessClaims;
pub use claims::RefreshClaims;
pub use jwt::sign_access;
pub use jwt::sign_refresh;
pub use jwt::verify_access;
pub use jwt::verify_refresh;
pub use password::hash_password;
pub use password::verify_password;
pub use session::issue_tokens;
pub use session::refresh_tokens;
pub use session::revoke_token;
pub use session::IssuePolicy;
pub use session::TokenPair;
