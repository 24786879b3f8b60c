//! Access policy: which consumer may call which methods.
//!
//! Parsed once at startup from the ACL document and immutable after.
//! Every denial surfaces as the same generic error so callers learn
//! nothing about the policy; the concrete reason is debug-logged here.

use crate::domain::error::GateError;
use crate::domain::methods::split_full_method;
use std::collections::HashMap;
use tracing::debug;

/// Wildcard matching any method of a service.
const ANY_METHOD: &str = "*";

/// One parsed permission entry.
#[derive(Debug, Clone, PartialEq, Eq)]
struct Permission {
    service: String,
    method: String,
}

impl Permission {
    fn matches(&self, service: &str, method: &str) -> bool {
        self.service == service && (self.method == ANY_METHOD || self.method == method)
    }
}

/// Immutable mapping from consumer identity to permitted methods.
pub struct AccessPolicy {
    rules: HashMap<String, Vec<Permission>>,
}

impl AccessPolicy {
    /// Parse an ACL document.
    ///
    /// The document is a JSON object mapping consumer name to an array
    /// of `/<service>/<method-or-*>` entries.
    ///
    /// # Errors
    ///
    /// Malformed JSON and malformed entries are both fatal: silently
    /// skipping an entry would grant a narrower policy than the one
    /// configured.
    pub fn from_json(acl: &str) -> Result<Self, GateError> {
        let raw: HashMap<String, Vec<String>> = serde_json::from_str(acl)
            .map_err(|e| GateError::Config(format!("malformed ACL document: {e}")))?;

        let mut rules = HashMap::with_capacity(raw.len());
        for (consumer, entries) in raw {
            let mut permissions = Vec::with_capacity(entries.len());
            for entry in &entries {
                let (service, method) = split_full_method(entry).ok_or_else(|| {
                    GateError::Config(format!(
                        "malformed ACL entry {entry:?} for consumer {consumer:?}: \
                         expected /<service>/<method-or-*>"
                    ))
                })?;
                permissions.push(Permission {
                    service: service.to_string(),
                    method: method.to_string(),
                });
            }
            rules.insert(consumer, permissions);
        }

        Ok(Self { rules })
    }

    /// Authorize one call.
    ///
    /// Denied when the identity is absent, unknown, or has no entry
    /// matching the method (exactly or via the `*` wildcard). Pure
    /// lookup; a linear scan over the consumer's entries.
    pub fn authorize(&self, consumer: Option<&str>, full_method: &str) -> Result<(), GateError> {
        let Some(consumer) = consumer else {
            debug!(method = full_method, "denied: no consumer identity");
            return Err(GateError::Unauthenticated);
        };

        let Some((service, method)) = split_full_method(full_method) else {
            debug!(method = full_method, "denied: unparseable method name");
            return Err(GateError::Unauthenticated);
        };

        let Some(permissions) = self.rules.get(consumer) else {
            debug!(consumer, method = full_method, "denied: unknown consumer");
            return Err(GateError::Unauthenticated);
        };

        if permissions.iter().any(|p| p.matches(service, method)) {
            Ok(())
        } else {
            debug!(
                consumer,
                method = full_method,
                "denied: no matching permission"
            );
            Err(GateError::Unauthenticated)
        }
    }

    /// Number of consumers the policy knows.
    #[must_use]
    pub fn consumer_count(&self) -> usize {
        self.rules.len()
    }
}
