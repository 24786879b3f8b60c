//! Method registry for the served RPC surface.
//!
//! Full method names are path-shaped (`/<service>/<method>`), the same
//! convention ACL permission entries use. The registry is the single
//! source for route paths, authorization lookups, and telemetry labels.

/// Call shape of a registered method.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CallKind {
    /// Single request, single acknowledgement.
    Unary,
    /// Single request, server-side event stream.
    ServerStream,
}

impl CallKind {
    /// Check if this kind streams its response.
    #[must_use]
    pub fn is_streaming(&self) -> bool {
        matches!(self, CallKind::ServerStream)
    }
}

/// Method metadata.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MethodSpec {
    /// Full path-shaped name (e.g. `/callgate.Biz/Check`).
    pub full: &'static str,
    /// Service component of the full name.
    pub service: &'static str,
    /// Method component of the full name.
    pub method: &'static str,
    /// Call shape.
    pub kind: CallKind,
}

impl MethodSpec {
    /// Create a unary method.
    const fn unary(full: &'static str, service: &'static str, method: &'static str) -> Self {
        Self {
            full,
            service,
            method,
            kind: CallKind::Unary,
        }
    }

    /// Create a server-streaming method.
    const fn stream(full: &'static str, service: &'static str, method: &'static str) -> Self {
        Self {
            full,
            service,
            method,
            kind: CallKind::ServerStream,
        }
    }
}

/// Business service name.
pub const BIZ_SERVICE: &str = "callgate.Biz";

/// Admin service name.
pub const ADMIN_SERVICE: &str = "callgate.Admin";

pub static BIZ_CHECK: MethodSpec = MethodSpec::unary("/callgate.Biz/Check", BIZ_SERVICE, "Check");
pub static BIZ_ADD: MethodSpec = MethodSpec::unary("/callgate.Biz/Add", BIZ_SERVICE, "Add");
pub static BIZ_TEST: MethodSpec = MethodSpec::unary("/callgate.Biz/Test", BIZ_SERVICE, "Test");
pub static ADMIN_LOGGING: MethodSpec =
    MethodSpec::stream("/callgate.Admin/Logging", ADMIN_SERVICE, "Logging");
pub static ADMIN_STATISTICS: MethodSpec =
    MethodSpec::stream("/callgate.Admin/Statistics", ADMIN_SERVICE, "Statistics");

/// Every method the service registers.
pub static METHODS: [&MethodSpec; 5] = [
    &BIZ_CHECK,
    &BIZ_ADD,
    &BIZ_TEST,
    &ADMIN_LOGGING,
    &ADMIN_STATISTICS,
];

/// Look a method up by its full name.
#[must_use]
pub fn find_method(full: &str) -> Option<&'static MethodSpec> {
    METHODS.iter().copied().find(|m| m.full == full)
}

/// Split a full method name into its service and method components.
///
/// Accepts exactly the `/<service>/<method>` shape; anything else
/// (missing slash, empty component, extra path segments) is `None`.
#[must_use]
pub fn split_full_method(full: &str) -> Option<(&str, &str)> {
    let rest = full.strip_prefix('/')?;
    let (service, method) = rest.split_once('/')?;
    if service.is_empty() || method.is_empty() || method.contains('/') {
        return None;
    }
    Some((service, method))
}
