use crate::ClaimRole;

/// Mutation class of a requested operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AccessKind {
    /// Safe methods: `GET`, `HEAD`, `OPTIONS`.
    Read,
    /// Everything else (create, modify, remove).
    Write,
}

impl AccessKind {
    /// Classify an HTTP method name. Method names are case-sensitive.
    pub fn for_method(method: &str) -> Self {
        match method {
            "GET" | "HEAD" | "OPTIONS" => AccessKind::Read,
            _ => AccessKind::Write,
        }
    }

    /// Reads are open to every authenticated role, including ones outside
    /// the vocabulary; writes need `admin`.
    pub fn permits(&self, role: &ClaimRole) -> bool {
        match self {
            AccessKind::Read => true,
            AccessKind::Write => role.is_admin(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Role;

    #[test]
    fn safe_methods_are_reads() {
        for m in ["GET", "HEAD", "OPTIONS"] {
            assert_eq!(AccessKind::for_method(m), AccessKind::Read, "{m}");
        }
        for m in ["POST", "PUT", "PATCH", "DELETE", "get", "TRACE"] {
            assert_eq!(AccessKind::for_method(m), AccessKind::Write, "{m}");
        }
    }

    #[test]
    fn only_admin_may_write() {
        let admin = ClaimRole::from(Role::Admin);
        let reader = ClaimRole::from(Role::Reader);
        let unknown = ClaimRole::Unrecognized("auditor".into());

        assert!(AccessKind::Write.permits(&admin));
        assert!(!AccessKind::Write.permits(&reader));
        assert!(!AccessKind::Write.permits(&unknown));
        for role in [&admin, &reader, &unknown] {
            assert!(AccessKind::Read.permits(role));
        }
    }
}
