//! Credential store abstraction (cookie jar, header, session store...).

/// Per-request access to the caller's stored credential.
///
/// Passed explicitly into each evaluation; never held process-wide.
pub trait CredentialStore {
    /// The raw credential, if one is attached to the request.
    fn read(&self) -> Option<String>;

    /// Remove the credential. Idempotent: clearing an empty store is not an error.
    fn clear(&mut self);
}

/// Simple owned store, used for embedding the engine outside HTTP and in tests.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct InMemoryCredentialStore {
    credential: Option<String>,
    cleared: bool,
}

impl InMemoryCredentialStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_credential(raw: impl Into<String>) -> Self {
        Self {
            credential: Some(raw.into()),
            cleared: false,
        }
    }

    /// Whether `clear` has been called at least once.
    pub fn was_cleared(&self) -> bool {
        self.cleared
    }
}

impl CredentialStore for InMemoryCredentialStore {
    fn read(&self) -> Option<String> {
        self.credential.clone()
    }

    fn clear(&mut self) {
        self.credential = None;
        self.cleared = true;
    }
}
