use hmac::{Hmac, Mac};
use sha2::Sha256;

use crate::error::AuthError;
use crate::model::AdminSession;

type HmacSha256 = Hmac<Sha256>;

/// Checks the admin password and decides whether a session may see admin pages.
pub struct AuthGate {
    key: Vec<u8>,
    password_tag: Vec<u8>,
}

impl AuthGate {
    /// The password is kept only as an HMAC tag keyed by the session secret, so the check below
    /// can go through `verify_slice`, which compares in constant time.
    pub fn new(admin_password: &str, session_secret: &str) -> Self {
        let key = session_secret.as_bytes().to_vec();
        let password_tag = tag(&key, admin_password).finalize().into_bytes().to_vec();
        Self { key, password_tag }
    }

    pub fn login(&self, password: &str) -> Result<AdminSession, AuthError> {
        tag(&self.key, password)
            .verify_slice(&self.password_tag)
            .map(|_| AdminSession { admin: true })
            .map_err(|_| AuthError::InvalidCredential)
    }

    pub fn require_admin(&self, session: Option<&AdminSession>) -> bool {
        session.is_some_and(|s| s.admin)
    }

    pub fn logout(&self, session: &mut AdminSession) {
        session.admin = false;
    }
}

fn tag(key: &[u8], message: &str) -> HmacSha256 {
    let mut mac = HmacSha256::new_from_slice(key).expect("HMAC can take key of any size");
    mac.update(message.as_bytes());
    mac
}

#[cfg(test)]
mod tests {
    use super::*;

    fn gate() -> AuthGate {
        AuthGate::new("correct horse", "signing-key")
    }

    #[test]
    fn test_login_with_correct_password() {
        let session = gate().login("correct horse").expect("login should succeed");
        assert!(session.admin);
    }

    #[test]
    fn test_login_with_wrong_password() {
        let gate = gate();
        assert_eq!(gate.login("wrong"), Err(AuthError::InvalidCredential));
        assert_eq!(gate.login(""), Err(AuthError::InvalidCredential));
        // Exact match only.
        assert_eq!(gate.login("Correct horse"), Err(AuthError::InvalidCredential));
        assert_eq!(gate.login("correct horse "), Err(AuthError::InvalidCredential));
    }

    #[test]
    fn test_require_admin() {
        let gate = gate();
        assert!(!gate.require_admin(None));
        assert!(!gate.require_admin(Some(&AdminSession::default())));
        assert!(gate.require_admin(Some(&AdminSession { admin: true })));
    }

    #[test]
    fn test_logout_is_idempotent() {
        let gate = gate();
        let mut session = gate.login("correct horse").unwrap();

        gate.logout(&mut session);
        assert!(!gate.require_admin(Some(&session)));

        gate.logout(&mut session);
        assert!(!session.admin);
    }
}
