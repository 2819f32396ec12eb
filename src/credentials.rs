/// Session credentials copied from a logged-in browser.
#[derive(Clone)]
pub struct Credentials {
    pub cookie: String,
    pub authorization: String,
}

impl std::fmt::Debug for Credentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credentials")
            .field("cookie", &"[REDACTED]")
            .field("authorization", &"[REDACTED]")
            .finish()
    }
}
