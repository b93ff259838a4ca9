pub mod aggregate;
pub mod emission;
pub mod project;

pub use aggregate::{DepartmentTotals, EmissionTotals, TrendPeriod, TrendPoint, UnknownPeriod};
pub use emission::{EmissionRecord, SummaryBucket, SummaryPeriod};
pub use project::{Project, Run};
