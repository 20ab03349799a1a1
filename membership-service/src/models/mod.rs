pub mod member;
pub mod payment;
pub mod plan;

pub use member::{EmergencyContact, Member, MemberStatus, MembershipType, PaymentStatus};
pub use payment::{PaymentMethod, PaymentRecord, PaymentRecordStatus};
pub use plan::{MembershipPlan, PlanPatch, PricingCatalog, SettingsPatch, CATALOG_ID};
