//! Payout orchestration for completed jobs

pub mod locks;
pub mod orchestrator;
pub mod ports;

pub use locks::{JobLockGuard, JobLocks};
pub use orchestrator::{OrchestratorSettings, PayoutDependencies, PayoutOrchestrator};
pub use ports::{
    Charge, JobRepository, LedgerRepository, PayeeAccountRepository, PaymentGateway,
    PayoutRepository, Transfer, TransferRequest,
};
