//! Authenticated caller identity, resolved by the HTTP boundary and passed
//! explicitly into every operation that stamps or filters by owner.

#[derive(Debug, Clone)]
pub struct AuthUser {
    pub username: String,
}

impl AuthUser {
    pub fn new(username: impl Into<String>) -> Self {
        Self {
            username: username.into(),
        }
    }
}
