use std::sync::RwLock;

/// The token pair for the logged in Spotify account.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Credentials {
    pub access_token: String,
    pub refresh_token: String,
    pub expires_in_seconds: u64,
}

/// Process-wide credential slot shared by the playback client and the session.
///
/// Writers replace whole values under the lock, so readers never see a half
/// written token.
#[derive(Debug, Default)]
pub struct CredentialStore {
    inner: RwLock<Credentials>,
}

impl CredentialStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn snapshot(&self) -> Credentials {
        match self.inner.read() {
            Ok(credentials) => credentials.clone(),
            Err(poisoned) => poisoned.into_inner().clone(),
        }
    }

    pub fn access_token(&self) -> String {
        self.snapshot().access_token
    }

    pub fn refresh_token(&self) -> String {
        self.snapshot().refresh_token
    }

    fn write(&self, update: impl FnOnce(&mut Credentials)) {
        match self.inner.write() {
            Ok(mut credentials) => update(&mut credentials),
            Err(poisoned) => update(&mut poisoned.into_inner()),
        }
    }

    pub fn set_access_token(&self, token: String) {
        self.write(|credentials| credentials.access_token = token);
    }

    pub fn set_refresh_token(&self, token: String) {
        self.write(|credentials| credentials.refresh_token = token);
    }

    pub fn set_expires_in(&self, seconds: u64) {
        self.write(|credentials| credentials.expires_in_seconds = seconds);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_setters_replace_single_fields() {
        let store = CredentialStore::new();
        assert_eq!(store.snapshot(), Credentials::default());

        store.set_access_token("at".into());
        store.set_refresh_token("rt".into());
        store.set_expires_in(3600);
        assert_eq!(
            store.snapshot(),
            Credentials {
                access_token: "at".into(),
                refresh_token: "rt".into(),
                expires_in_seconds: 3600,
            }
        );

        store.set_access_token("at2".into());
        assert_eq!(store.access_token(), "at2");
        assert_eq!(store.refresh_token(), "rt");

        store.set_access_token(String::new());
        store.set_refresh_token(String::new());
        assert_eq!(store.access_token(), "");
        assert_eq!(store.refresh_token(), "");
    }
}
