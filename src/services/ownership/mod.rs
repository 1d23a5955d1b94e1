/*
 * Responsibility
 * - ownership oracle (user, resource) → bool の trait と実装
 * - resource kind → oracle の静的 registry (起動時に構築、以後 read-only)
 */
pub mod oracle;
pub mod pg;
pub mod registry;

pub use oracle::{OwnershipError, OwnershipOracle};
pub use pg::PgShopOwnership;
pub use registry::{OracleLookupError, OwnershipRegistry};
