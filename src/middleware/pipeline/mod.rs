/*
 * Responsibility
 * - リクエストごとの認証・認可 pipeline (stage の順序付きリスト)
 * - session continuity (fail-open) → authentication gate → role/ownership (fail-closed)
 * - RequestContextStore の生成と、すべての終了経路での clear
 */
pub mod context;
pub mod gate;
pub mod orchestrator;
pub mod role_ownership;
pub mod session;
pub mod stage;

pub use context::{RequestContextStore, UserContext};
pub use gate::{AuthenticationGateStage, RequireIdentityGate};
pub use orchestrator::Pipeline;
pub use role_ownership::{RoleOwnershipStage, UnparseablePolicy};
pub use session::{CredentialHeader, SessionContinuityStage};
