//! # trustlens Analytics
//!
//! Turns a flat roster of client records into the dashboard's derived data.
//!
//! Nothing in this crate rejects a record. Malformed identity codes, dates,
//! and amounts degrade to "Unknown", 0, or exclusion from a series, and the
//! whole pipeline is a pure function of the roster plus [`AggregateOptions`].

pub mod aggregate;
pub mod amount;
pub mod date;
pub mod distribution;
pub mod financial;
pub mod identity;
pub mod ingest;
pub mod search;
pub mod signups;

pub use aggregate::{AggregateOptions, DashboardAggregate};
pub use amount::{format_currency, parse_amount};
pub use distribution::{DistributionEntry, UNKNOWN_LABEL};
pub use financial::FinancialMetrics;
pub use identity::{AgeBucket, DEFAULT_CENTURY_CUTOFF, IdentityAgeResolver};
pub use ingest::{IngestError, UploadOutcome};
pub use search::{Pagination, filter_clients, find_by_cert, paginate};
pub use signups::SignupPoint;
