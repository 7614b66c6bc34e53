//! Service contract: the set of operations the gateway accepts

/// Enumerates the remote operations a service exposes
pub trait Contract: Send + Sync {
    fn operations(&self) -> &[&'static str];

    fn supports(&self, operation: &str) -> bool {
        self.operations().contains(&operation)
    }
}

/// Operations of the Zuora SOAP API (version 63.0) used by this client
#[derive(Debug, Clone, Copy, Default)]
pub struct ZuoraContract;

const OPERATIONS: &[&str] = &[
    "login",
    "create",
    "update",
    "delete",
    "query",
    "queryMore",
    "amend",
    "subscribe",
    "generate",
    "getUserInfo",
];

impl Contract for ZuoraContract {
    fn operations(&self) -> &[&'static str] {
        OPERATIONS
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_known_operations() {
        let contract = ZuoraContract;
        assert!(contract.supports("queryMore"));
        assert!(contract.supports("amend"));
        assert!(!contract.supports("Query"));
        assert!(!contract.supports("dropTables"));
    }
}
