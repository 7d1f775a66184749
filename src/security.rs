use subtle::ConstantTimeEq;

/// Constant-time string comparison to prevent timing attacks
/// Use this for comparing admin credentials and other sensitive values
pub fn constant_time_compare(a: &str, b: &str) -> bool {
    if a.len() != b.len() {
        return false;
    }
    a.as_bytes().ct_eq(b.as_bytes()).into()
}

/// Admin login pair configured for the site.
#[derive(Clone)]
pub struct AdminCredentials {
    id: String,
    password: String,
}

impl AdminCredentials {
    pub fn new(id: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            password: password.into(),
        }
    }

    /// Check a submitted id/password pair. Missing values never match.
    pub fn verify(&self, id: Option<&str>, password: Option<&str>) -> bool {
        let (Some(id), Some(password)) = (id, password) else {
            return false;
        };
        // Both halves are always compared.
        let id_ok = constant_time_compare(id, &self.id);
        let password_ok = constant_time_compare(password, &self.password);
        id_ok & password_ok
    }
}

impl std::fmt::Debug for AdminCredentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AdminCredentials")
            .field("id", &self.id)
            .field("password", &"<redacted>")
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_constant_time_compare() {
        assert!(constant_time_compare("secret123", "secret123"));
        assert!(!constant_time_compare("secret123", "secret124"));
        assert!(!constant_time_compare("secret123", "secret12"));
        assert!(!constant_time_compare("", "secret"));
    }

    #[test]
    fn test_verify_credentials() {
        let creds = AdminCredentials::new("keeper", "s3cret");
        assert!(creds.verify(Some("keeper"), Some("s3cret")));
        assert!(!creds.verify(Some("keeper"), Some("wrong")));
        assert!(!creds.verify(Some("other"), Some("s3cret")));
        assert!(!creds.verify(None, Some("s3cret")));
        assert!(!creds.verify(Some("keeper"), None));
    }

    #[test]
    fn test_debug_redacts_password() {
        let creds = AdminCredentials::new("keeper", "s3cret");
        let debug = format!("{:?}", creds);
        assert!(debug.contains("keeper"));
        assert!(!debug.contains("s3cret"));
    }
}
