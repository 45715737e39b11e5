use chaintrack_core::Identity;

/// Authenticated caller for a request.
///
/// Authentication itself happens upstream; the identity arrives in a trusted header.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CallerContext {
    identity: Identity,
}

impl CallerContext {
    pub fn new(identity: Identity) -> Self {
        Self { identity }
    }

    pub fn identity(&self) -> &Identity {
        &self.identity
    }

    pub fn into_identity(self) -> Identity {
        self.identity
    }
}
