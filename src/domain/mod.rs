pub mod decision;
pub mod policy;
pub mod request;

pub use decision::{DecisionMeta, DecisionResult, MASKED};
pub use policy::{AllowList, Policy};
pub use request::{AccessRequest, Resource, JUSTIFICATION_ATTR};
