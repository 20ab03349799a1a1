//! The billing and lifecycle domain core: pure date/fee arithmetic with no
//! I/O. The orchestrator in `services` wires these rules to the store.

pub mod enrollment;
pub mod error;
pub mod expiry;
pub mod lifecycle;
pub mod renewal;

pub use enrollment::EnrollmentQuote;
pub use error::BillingError;
pub use expiry::ReminderEligibility;
pub use lifecycle::ExpiryUrgency;
pub use renewal::RenewalExtension;
