//! Visit-day meeting scheduler.
//!
//! Assigns visitors to host meetings across a grid of time slots at one
//! or more locations, maximising request and topical-area preferences
//! with a mixed-integer model, and enumerating the best distinct
//! schedules.
//!
//! # Modules
//!
//! - **`config`**: serde input types (grid, catalog, movement, run parameters)
//! - **`models`**: Domain types: `TimeGrid`, `Host`, `Visitor`,
//!   `UtilityWeights`, `Solution`
//! - **`catalog`**: Host catalog, aliases, legacy/external admission
//! - **`movement`**: Movement policies, phase slots, travel lags
//! - **`mip`**: Linear model IR and the assignment model builder
//! - **`solver`**: `good_lp` backends and top-N enumeration
//! - **`scheduler`**: `Scheduler` facade, summaries, infeasibility reports
//! - **`validation`**: Configuration errors and parameter checks
//!
//! # Example
//!
//! ```no_run
//! use visit_schedule::config::{CatalogSpec, HostEntry, RunParams, TimeGridSpec};
//! use visit_schedule::models::Visitor;
//! use visit_schedule::scheduler::Scheduler;
//!
//! let grid = TimeGridSpec::new().with_location("Main", ["1:00-1:25", "1:30-1:55"]);
//! let catalog = CatalogSpec::new()
//!     .with_host(HostEntry::new("Faculty A", "Main"))
//!     .with_host(HostEntry::new("Faculty B", "Main"));
//! let visitors = vec![
//!     Visitor::new("V1").with_request("Faculty A"),
//!     Visitor::new("V2").with_request("Faculty B"),
//! ];
//!
//! let mut scheduler = Scheduler::builder(grid, catalog, visitors).build()?;
//! let solutions = scheduler.schedule_top_n(3, &RunParams::default())?;
//! for row in solutions.summaries() {
//!     println!("rank {}: {} meetings", row.rank, row.num_assignments);
//! }
//! # Ok::<(), visit_schedule::Error>(())
//! ```

pub mod catalog;
pub mod config;
mod error;
pub mod mip;
pub mod models;
pub mod movement;
pub mod scheduler;
pub mod solver;
pub mod validation;

pub use error::{Error, Result};
