pub mod clock;
pub mod memory;
pub mod metrics;
pub mod mongo;
pub mod orchestrator;
pub mod store;

pub use clock::{Clock, FixedClock, SystemClock};
pub use memory::InMemoryMembershipStore;
pub use metrics::{get_metrics, init_metrics};
pub use mongo::MongoMembershipStore;
pub use orchestrator::{
    BillingOrchestrator, DashboardStats, MemberDraft, MemberUpdate, PaymentIntake,
};
pub use store::MembershipStore;
