//! Visit-scheduling domain models.
//!
//! Plain data types for the meeting-assignment problem and its solutions.
//! Everything here is independent of the optimization backend.
//!
//! # Domain Mappings
//!
//! | visit-schedule | Graduate visit day | Conference | Clinic |
//! |----------------|--------------------|------------|--------|
//! | Host | Faculty member | Speaker | Doctor |
//! | Visitor | Applicant | Attendee | Patient |
//! | Location | Building | Venue | Site |
//! | Meeting | 1:1 or small-group slot | Session seat | Appointment |

mod grid;
mod host;
mod slot;
mod solution;
mod visitor;
mod weights;

pub use grid::{Location, TimeGrid};
pub use host::{Host, HostStatus};
pub use slot::SlotWindow;
pub use solution::{
    Meeting, Solution, SolutionContext, SolutionSet, TerminationStatus, UnmetRequest,
};
pub use visitor::{
    check_unique_names, normalize_field, normalize_request, visitors_from_table, Visitor,
    MAX_AREAS, MAX_REQUESTS, NAME_COLUMN,
};
pub use weights::{compute_utility_weights, UnmatchedRequest, UtilityWeights, WeightConfig};

#[cfg(test)]
pub(crate) use solution::tests::sample_solution;
