//! Per-call request context and the authenticated principal.

use crate::core_types::Role;

/// Metadata the service layer needs from one inbound call, extracted once
/// at the transport boundary.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RequestContext {
    /// Every `authorization` value present, in arrival order
    pub authorization: Vec<String>,
    pub user_agent: String,
    pub client_ip: String,
}

impl RequestContext {
    pub fn new(user_agent: impl Into<String>, client_ip: impl Into<String>) -> Self {
        Self {
            authorization: Vec::new(),
            user_agent: user_agent.into(),
            client_ip: client_ip.into(),
        }
    }

    /// Add an `authorization: bearer <token>` value
    pub fn with_bearer(mut self, token: &str) -> Self {
        self.authorization.push(format!("bearer {}", token));
        self
    }

    pub fn with_authorization(mut self, value: impl Into<String>) -> Self {
        self.authorization.push(value.into());
        self
    }
}

/// Identity proven by a verified access token
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Principal {
    pub username: String,
    pub role: Role,
}

impl Principal {
    pub fn is_banker(&self) -> bool {
        match self.role {
            Role::Banker => true,
            Role::Depositor => false,
        }
    }

    /// Bankers act on any row; depositors only on rows they own
    pub fn may_act_for(&self, owner: &str) -> bool {
        match self.role {
            Role::Banker => true,
            Role::Depositor => self.username == owner,
        }
    }
}
