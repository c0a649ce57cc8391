use std::env;

/// Source of the bearer token presented to the Depix API.
pub trait CredentialStore: Send + Sync + 'static {
    /// Name reported back to callers when the token is missing.
    fn name(&self) -> &str;

    fn bearer_token(&self) -> Option<String>;
}

/// Reads the token from the process environment on every call, so rotating
/// the variable does not need a restart.
#[derive(Clone, Debug)]
pub struct EnvCredentials {
    var: String,
}

impl EnvCredentials {
    pub fn new(var: impl Into<String>) -> Self {
        Self { var: var.into() }
    }
}

impl CredentialStore for EnvCredentials {
    fn name(&self) -> &str {
        &self.var
    }

    fn bearer_token(&self) -> Option<String> {
        env::var(&self.var).ok().filter(|token| !token.is_empty())
    }
}
