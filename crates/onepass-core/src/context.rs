use crate::resource::ResourceId;
use serde::{Deserialize, Serialize};
use std::fmt::Display;

/// The identity signals a request presents: its declared user-agent and
/// the network address it arrived from.
///
/// Both values come from the transport layer unauthenticated and are
/// compared as exact strings. They make a leaked link harder to replay from
/// another browser or network; they are not a cryptographic identity.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientSignals {
    pub user_agent: String,
    pub client_address: String,
}

impl ClientSignals {
    pub fn new(user_agent: impl Into<String>, client_address: impl Into<String>) -> Self {
        Self {
            user_agent: user_agent.into(),
            client_address: client_address.into(),
        }
    }
}

/// The payload stored under a token at issuance.
///
/// Written once, never mutated, and read at most once. The serialized field
/// names (`pid`, `ua`, `ip`) are the keyspace's wire format.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BindingContext {
    #[serde(rename = "pid")]
    pub resource_id: ResourceId,
    #[serde(rename = "ua")]
    pub user_agent: String,
    #[serde(rename = "ip")]
    pub client_address: String,
}

/// Which binding check a redemption failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MismatchReason {
    UserAgent,
    ClientAddress,
}

impl Display for MismatchReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            MismatchReason::UserAgent => f.write_str("user-agent"),
            MismatchReason::ClientAddress => f.write_str("network address"),
        }
    }
}

impl BindingContext {
    /// Binds `resource_id` to the signals of the issuing request.
    pub fn bind(resource_id: ResourceId, signals: &ClientSignals) -> Self {
        Self {
            resource_id,
            user_agent: signals.user_agent.clone(),
            client_address: signals.client_address.clone(),
        }
    }

    /// Checks the presented signals against the recorded ones.
    ///
    /// User-agent is checked before the network address.
    pub fn verify(&self, presented: &ClientSignals) -> Result<(), MismatchReason> {
        if self.user_agent != presented.user_agent {
            return Err(MismatchReason::UserAgent);
        }
        if self.client_address != presented.client_address {
            return Err(MismatchReason::ClientAddress);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn context() -> BindingContext {
        BindingContext::bind(ResourceId(7), &ClientSignals::new("Mozilla/5.0", "10.0.0.1"))
    }

    #[test]
    fn verify_matching_signals() {
        let presented = ClientSignals::new("Mozilla/5.0", "10.0.0.1");
        assert_eq!(context().verify(&presented), Ok(()));
    }

    #[test]
    fn verify_reports_user_agent_first() {
        let presented = ClientSignals::new("curl/8.0", "10.0.0.2");
        assert_eq!(context().verify(&presented), Err(MismatchReason::UserAgent));
    }

    #[test]
    fn verify_reports_address() {
        let presented = ClientSignals::new("Mozilla/5.0", "10.0.0.2");
        assert_eq!(
            context().verify(&presented),
            Err(MismatchReason::ClientAddress)
        );
    }

    #[test]
    fn comparison_is_exact() {
        let presented = ClientSignals::new("mozilla/5.0", "10.0.0.1");
        assert!(context().verify(&presented).is_err());
        let presented = ClientSignals::new("Mozilla/5.0 ", "10.0.0.1");
        assert!(context().verify(&presented).is_err());
    }

    #[test]
    fn wire_format_uses_short_field_names() {
        let json = serde_json::to_value(context()).unwrap();
        assert_eq!(
            json,
            serde_json::json!({"pid": 7, "ua": "Mozilla/5.0", "ip": "10.0.0.1"})
        );

        let back: BindingContext = serde_json::from_value(json).unwrap();
        assert_eq!(back, context());
    }
}
