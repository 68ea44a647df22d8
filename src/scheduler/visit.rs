//! Visit-day scheduler.
//!
//! # Pipeline
//!
//! 1. Parse the time grid and resolve the movement rules.
//! 2. Load the host catalog and admit requested legacy/external hosts.
//! 3. Compute utility weights over the schedulable hosts.
//! 4. Per run: build the assignment model, solve (top-N with no-good
//!    cuts), and snapshot each solution.
//!
//! Infeasible runs are not errors; they return no solution and are
//! explained by [`Scheduler::infeasibility_report`].

use std::collections::BTreeMap;
use std::sync::Arc;

use tracing::{info, warn};

use super::{CapacityDiagnosis, InfeasibilityReport, SchedulerWarning};
use crate::catalog::{apply_visitor_availability, HostCatalog};
use crate::config::{CatalogSpec, LegacyMode, MovementSpec, RunConfig, RunParams, TimeGridSpec};
use crate::mip::{AssignmentModel, AssignmentModelBuilder};
use crate::models::{
    check_unique_names, compute_utility_weights, Host, Meeting, Solution, SolutionContext,
    SolutionSet, TerminationStatus, TimeGrid, UtilityWeights, Visitor, WeightConfig,
};
use crate::movement::{resolve_movement, MovementPlan, ResolvedMovement};
use crate::solver::{solve_top_n, SolverBackend};
use crate::validation::check_slot;

/// Inputs for a [`Scheduler`].
#[derive(Debug, Clone)]
pub struct SchedulerBuilder {
    grid: TimeGridSpec,
    catalog: CatalogSpec,
    visitors: Vec<Visitor>,
    movement: Option<MovementSpec>,
    legacy_mode: Option<LegacyMode>,
    backend: SolverBackend,
    include_all_legacy: bool,
    weights: WeightConfig,
}

impl SchedulerBuilder {
    /// Sets the movement rules.
    pub fn with_movement(mut self, movement: MovementSpec) -> Self {
        self.movement = Some(movement);
        self
    }

    /// Sets a deprecated two-location mode.
    ///
    /// Ignored (with a warning) when a movement config is also set.
    pub fn with_legacy_mode(mut self, mode: LegacyMode) -> Self {
        self.legacy_mode = Some(mode);
        self
    }

    /// Selects the MIP backend.
    pub fn with_backend(mut self, backend: SolverBackend) -> Self {
        self.backend = backend;
        self
    }

    /// Admits every legacy host, requested or not.
    pub fn include_all_legacy(mut self) -> Self {
        self.include_all_legacy = true;
        self
    }

    /// Sets the weight configuration.
    pub fn with_weights(mut self, weights: WeightConfig) -> Self {
        self.weights = weights;
        self
    }

    /// Validates the inputs and builds the scheduler.
    ///
    /// # Errors
    /// Any configuration error in the grid, movement rules, catalog or
    /// visitor list.
    pub fn build(self) -> crate::Result<Scheduler> {
        let grid = TimeGrid::from_spec(&self.grid)?;
        let ResolvedMovement { plan, warnings } =
            resolve_movement(&grid, self.movement.as_ref(), self.legacy_mode)?;

        let mut visitors = self.visitors;
        check_unique_names(&visitors)?;
        for slot in visitors.iter().flat_map(|v| v.availability.iter().flatten()) {
            check_slot(*slot, grid.number_of_slots())?;
        }
        visitors.sort_by(|a, b| a.name.cmp(&b.name));

        let mut catalog = HostCatalog::from_spec(&self.catalog, &grid)?;
        catalog.admit_requested(&visitors, self.include_all_legacy);

        let mut scheduler = Scheduler {
            grid,
            catalog,
            visitors,
            movement: plan,
            weight_config: self.weights,
            weights: UtilityWeights::default(),
            backend: self.backend,
            warnings,
            last_run: None,
        };
        scheduler.refresh_weights();
        info!(
            visitors = scheduler.visitors.len(),
            hosts = scheduler.catalog.schedulable().count(),
            slots = scheduler.grid.number_of_slots(),
            policy = %scheduler.movement.policy(),
            backend = %scheduler.backend,
            "scheduler ready"
        );
        Ok(scheduler)
    }
}

#[derive(Debug, Clone, PartialEq)]
struct LastRun {
    termination: TerminationStatus,
    params: RunParams,
}

/// Schedules visitor meetings with hosts over a visit day.
///
/// # Example
///
/// ```no_run
/// use visit_schedule::config::{CatalogSpec, HostEntry, RunParams, TimeGridSpec};
/// use visit_schedule::models::Visitor;
/// use visit_schedule::scheduler::Scheduler;
///
/// let grid = TimeGridSpec::new().with_location("Main", ["1:00-1:25", "1:30-1:55"]);
/// let catalog = CatalogSpec::new().with_host(HostEntry::new("Faculty A", "Main"));
/// let visitors = vec![Visitor::new("V1").with_request("Faculty A")];
///
/// let mut scheduler = Scheduler::builder(grid, catalog, visitors).build()?;
/// if let Some(solution) = scheduler.schedule(&RunParams::default())? {
///     assert_eq!(solution.meeting_count(), 1);
/// } else {
///     println!("{}", scheduler.infeasibility_report());
/// }
/// # Ok::<(), visit_schedule::Error>(())
/// ```
#[derive(Debug, Clone)]
pub struct Scheduler {
    grid: TimeGrid,
    catalog: HostCatalog,
    visitors: Vec<Visitor>,
    movement: MovementPlan,
    weight_config: WeightConfig,
    weights: UtilityWeights,
    backend: SolverBackend,
    warnings: Vec<SchedulerWarning>,
    last_run: Option<LastRun>,
}

impl Scheduler {
    /// Starts a builder with the required inputs.
    pub fn builder(grid: TimeGridSpec, catalog: CatalogSpec, visitors: Vec<Visitor>) -> SchedulerBuilder {
        SchedulerBuilder {
            grid,
            catalog,
            visitors,
            movement: None,
            legacy_mode: None,
            backend: SolverBackend::default(),
            include_all_legacy: false,
            weights: WeightConfig::default(),
        }
    }

    /// Builds a scheduler from a run configuration bundle.
    ///
    /// Applies the bundle's movement rules, area weights and host
    /// availability restrictions.
    pub fn from_configs(
        run: &RunConfig,
        catalog: &CatalogSpec,
        visitors: Vec<Visitor>,
    ) -> crate::Result<Self> {
        let mut weights = WeightConfig::default();
        if let Some(area_weights) = &run.area_weights {
            weights = weights.with_area_weights(area_weights.clone());
        }
        let mut builder = Self::builder(run.grid.clone(), catalog.clone(), visitors).with_weights(weights);
        if let Some(movement) = &run.movement {
            builder = builder.with_movement(movement.clone());
        }
        let mut scheduler = builder.build()?;
        for (host, slots) in &run.host_availability {
            scheduler.set_host_availability(host, slots)?;
        }
        Ok(scheduler)
    }

    /// Time grid.
    pub fn grid(&self) -> &TimeGrid {
        &self.grid
    }

    /// Host catalog after admission.
    pub fn catalog(&self) -> &HostCatalog {
        &self.catalog
    }

    /// Visitors, sorted by name.
    pub fn visitors(&self) -> &[Visitor] {
        &self.visitors
    }

    /// Resolved movement rules.
    pub fn movement(&self) -> &MovementPlan {
        &self.movement
    }

    /// Current utility weights.
    pub fn weights(&self) -> &UtilityWeights {
        &self.weights
    }

    /// Selected backend.
    pub fn backend(&self) -> SolverBackend {
        self.backend
    }

    /// Soft conditions found so far.
    pub fn warnings(&self) -> &[SchedulerWarning] {
        &self.warnings
    }

    /// Replaces the weight configuration and recomputes weights.
    pub fn update_weights(&mut self, config: WeightConfig) {
        self.weight_config = config;
        self.refresh_weights();
    }

    /// Adds or replaces an external host. See [`HostCatalog::register_external`].
    pub fn register_external(
        &mut self,
        name: &str,
        location: Option<&str>,
        room: &str,
        areas: Vec<String>,
        available: Option<Vec<usize>>,
    ) -> crate::Result<()> {
        self.catalog
            .register_external(name, location, room, areas, available, &self.grid)?;
        self.refresh_weights();
        Ok(())
    }

    /// Restricts a host to the given slots.
    pub fn set_host_availability(&mut self, name: &str, slots: &[usize]) -> crate::Result<()> {
        self.catalog.set_availability(name, slots)?;
        self.refresh_weights();
        Ok(())
    }

    /// Restricts visitors to the given slots; unlisted visitors get every slot.
    pub fn set_visitor_availability(
        &mut self,
        available: &BTreeMap<String, Vec<usize>>,
    ) -> crate::Result<()> {
        apply_visitor_availability(&mut self.visitors, available, self.grid.number_of_slots())?;
        Ok(())
    }

    /// Builds the assignment model for `params` without solving it.
    pub fn build_model(&self, params: &RunParams) -> crate::Result<AssignmentModel> {
        let model = AssignmentModelBuilder::new(
            &self.grid,
            self.catalog.hosts(),
            &self.visitors,
            &self.weights,
            &self.movement,
        )
        .build(params)?;
        Ok(model)
    }

    /// Solves once. `Ok(None)` when no feasible schedule exists.
    pub fn schedule(&mut self, params: &RunParams) -> crate::Result<Option<Solution>> {
        let solutions = self.schedule_top_n(1, params)?;
        Ok(solutions.best().cloned())
    }

    /// Finds up to `n` distinct schedules in non-increasing objective order.
    ///
    /// Returns fewer when the model runs out of feasible assignments.
    ///
    /// # Errors
    /// - `n < 1`
    /// - invalid `params`
    /// - backend failure
    pub fn schedule_top_n(&mut self, n: usize, params: &RunParams) -> crate::Result<SolutionSet> {
        let mut model = self.build_model(params)?;
        let run = solve_top_n(&mut model, self.backend, n)?;

        let termination = run
            .solutions
            .first()
            .map_or(run.last_termination, |s| s.termination);
        self.last_run = Some(LastRun {
            termination,
            params: params.clone(),
        });
        info!(
            requested = n,
            found = run.solutions.len(),
            termination = %termination,
            "scheduling finished"
        );

        let context = Arc::new(self.snapshot_context());
        let solutions = run
            .solutions
            .iter()
            .map(|s| Solution {
                rank: s.rank,
                objective_value: s.objective_value,
                termination: s.termination,
                meetings: model
                    .active_assignments(&s.values)
                    .map(|a| {
                        Meeting::new(
                            model.visitors()[a.visitor].clone(),
                            model.hosts()[a.host].clone(),
                            a.slot,
                        )
                    })
                    .collect(),
                context: Arc::clone(&context),
            })
            .collect();
        Ok(SolutionSet::new(solutions))
    }

    /// Termination of the last run, if any.
    pub fn last_termination(&self) -> Option<TerminationStatus> {
        self.last_run.as_ref().map(|r| r.termination)
    }

    /// Whether the last run produced a schedule.
    pub fn has_feasible_solution(&self) -> bool {
        self.last_termination()
            .is_some_and(|t| t.is_feasible())
    }

    /// Explains the outcome of the last run.
    pub fn infeasibility_report(&self) -> InfeasibilityReport {
        match &self.last_run {
            None => InfeasibilityReport::NotSolved,
            Some(run) if run.termination.is_feasible() => InfeasibilityReport::Feasible(run.termination),
            Some(run) => {
                let hosts: Vec<&Host> = self.catalog.schedulable().collect();
                InfeasibilityReport::Infeasible(CapacityDiagnosis::analyze(
                    &hosts,
                    &self.visitors,
                    self.grid.number_of_slots(),
                    &run.params,
                    run.termination,
                ))
            }
        }
    }

    fn snapshot_context(&self) -> SolutionContext {
        SolutionContext {
            grid: self.grid.clone(),
            hosts: self.catalog.schedulable().cloned().collect(),
            visitors: self.visitors.iter().map(|v| v.name.clone()).collect(),
            weights: self.weights.clone(),
        }
    }

    /// Weights cover schedulable hosts only; requests for anything else
    /// are reported as warnings.
    fn refresh_weights(&mut self) {
        let hosts: Vec<Host> = self.catalog.schedulable().cloned().collect();
        let catalog = &self.catalog;
        self.weights = compute_utility_weights(
            &hosts,
            &self.visitors,
            |name| catalog.resolve(name),
            &self.weight_config,
        );

        self.warnings.retain(|w| !w.is_request_warning());
        for unmatched in self.weights.unmatched() {
            let visitor = unmatched.visitor.clone();
            let host = unmatched.host.clone();
            let w = if self.catalog.host(&host).is_some() {
                SchedulerWarning::HostNotYetAvailable { visitor, host }
            } else {
                SchedulerWarning::UnknownHostRequest { visitor, host }
            };
            warn!("{w}");
            self.warnings.push(w);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::HostEntry;
    use crate::validation::ConfigErrorKind;
    use crate::Error;

    const SLOTS: [&str; 3] = ["1:00-1:25", "1:30-1:55", "2:00-2:25"];
    const SHIFTED: [&str; 3] = ["1:15-1:40", "1:45-2:10", "2:15-2:40"];

    fn one_location() -> TimeGridSpec {
        TimeGridSpec::new().with_location("A", SLOTS)
    }

    fn catalog(names: &[&str]) -> CatalogSpec {
        names
            .iter()
            .fold(CatalogSpec::new(), |c, n| c.with_host(HostEntry::new(*n, "A")))
    }

    fn config_kind(err: Error) -> ConfigErrorKind {
        match err {
            Error::Config(e) => e.kind,
            other => panic!("expected a configuration error, got {other}"),
        }
    }

    #[test]
    fn test_builder_rejects_duplicate_visitors() {
        let err = Scheduler::builder(
            one_location(),
            catalog(&["Faculty A"]),
            vec![Visitor::new("V1"), Visitor::new("V1")],
        )
        .build()
        .unwrap_err();
        assert_eq!(config_kind(err), ConfigErrorKind::DuplicateVisitor);
    }

    #[test]
    fn test_builder_rejects_visitor_slot_out_of_range() {
        let err = Scheduler::builder(
            one_location(),
            catalog(&["Faculty A"]),
            vec![Visitor::new("V1").with_availability([4])],
        )
        .build()
        .unwrap_err();
        assert_eq!(config_kind(err), ConfigErrorKind::InvalidSlot);
    }

    #[test]
    fn test_overlap_warning_only_for_divergent_grids() {
        let same = TimeGridSpec::new().with_location("A", SLOTS).with_location("B", SLOTS);
        let s = Scheduler::builder(same, catalog(&["Faculty A"]), vec![Visitor::new("V1")])
            .build()
            .unwrap();
        assert!(s.warnings().is_empty());

        let shifted = TimeGridSpec::new().with_location("A", SLOTS).with_location("B", SHIFTED);
        let s = Scheduler::builder(shifted, catalog(&["Faculty A"]), vec![Visitor::new("V1")])
            .build()
            .unwrap();
        assert_eq!(s.warnings().len(), 1);
        assert!(s.warnings()[0].to_string().contains("A/B"));
    }

    #[test]
    fn test_legacy_mode_alone_is_deprecated() {
        let grid = TimeGridSpec::new().with_location("A", SLOTS).with_location("B", SLOTS);
        let s = Scheduler::builder(grid, catalog(&["Faculty A"]), vec![Visitor::new("V1")])
            .with_legacy_mode(LegacyMode::NoOffset)
            .build()
            .unwrap();
        assert!(matches!(
            s.warnings()[0],
            SchedulerWarning::LegacyModeDeprecated { mode: LegacyMode::NoOffset }
        ));
        assert!(s.movement().requires_breaks());
    }

    #[test]
    fn test_unknown_request_warns_until_registered() {
        let visitors = vec![Visitor::new("V1").with_request("Dr. Guest")];
        let mut s = Scheduler::builder(one_location(), catalog(&["Faculty A"]), visitors)
            .build()
            .unwrap();
        assert!(matches!(
            &s.warnings()[0],
            SchedulerWarning::UnknownHostRequest { host, .. } if host == "Dr. Guest"
        ));
        assert!(s.weights().get("V1", "Dr. Guest").abs() < 1e-12);

        s.register_external("Dr. Guest", None, "101", vec![], Some(vec![2])).unwrap();
        assert!(s.warnings().is_empty());
        assert!((s.weights().get("V1", "Dr. Guest") - 4.0).abs() < 1e-12);
    }

    #[test]
    fn test_placeholder_request_warns_not_yet_available() {
        let catalog = catalog(&["Faculty A"]).with_host(HostEntry::new("Visiting", "A").with_status("external"));
        let visitors = vec![Visitor::new("V1").with_request("Visiting")];
        let mut s = Scheduler::builder(one_location(), catalog, visitors).build().unwrap();
        assert_eq!(
            s.warnings(),
            &[SchedulerWarning::HostNotYetAvailable {
                visitor: "V1".into(),
                host: "Visiting".into(),
            }]
        );
        assert!(s.warnings()[0].to_string().contains("not yet available"));

        s.set_host_availability("Visiting", &[1]).unwrap();
        assert!(s.warnings().is_empty());
        assert!((s.weights().get("V1", "Visiting") - 4.0).abs() < 1e-12);
    }

    #[test]
    fn test_availability_errors() {
        let mut s = Scheduler::builder(one_location(), catalog(&["Faculty A"]), vec![Visitor::new("V1")])
            .build()
            .unwrap();
        let err = s.set_host_availability("Nobody", &[1]).unwrap_err();
        assert_eq!(config_kind(err), ConfigErrorKind::UnknownHost);

        let map = BTreeMap::from([("V9".to_owned(), vec![1])]);
        let err = s.set_visitor_availability(&map).unwrap_err();
        assert_eq!(config_kind(err), ConfigErrorKind::UnknownVisitor);
    }

    #[test]
    fn test_enforce_breaks_without_breaks() {
        let mut s = Scheduler::builder(one_location(), catalog(&["Faculty A"]), vec![Visitor::new("V1")])
            .build()
            .unwrap();
        let err = s
            .schedule(&RunParams::default().with_enforce_breaks(true))
            .unwrap_err();
        assert_eq!(config_kind(err), ConfigErrorKind::MissingBreaks);
        assert_eq!(s.infeasibility_report(), InfeasibilityReport::NotSolved);
    }

    #[test]
    fn test_model_is_deterministic() {
        let visitors = vec![
            Visitor::new("V2").with_request("Faculty B"),
            Visitor::new("V1").with_request("Faculty A"),
        ];
        let s = Scheduler::builder(one_location(), catalog(&["Faculty A", "Faculty B"]), visitors)
            .build()
            .unwrap();
        let params = RunParams::default();
        assert_eq!(s.build_model(&params).unwrap(), s.build_model(&params).unwrap());
        assert_eq!(s.visitors()[0].name, "V1");
    }

    #[test]
    fn test_from_configs_applies_availability() {
        let run: RunConfig = serde_json::from_str(
            r#"{
                "grid": {"locations": [{"name": "A", "slots": ["1:00-1:25", "1:30-1:55"]}]},
                "movement": {"policy": "none"},
                "host_availability": {"Faculty A": [2]},
                "area_weights": [2.0]
            }"#,
        )
        .unwrap();
        let s = Scheduler::from_configs(&run, &catalog(&["Faculty A"]), vec![Visitor::new("V1")]).unwrap();
        let host = s.catalog().host("Faculty A").unwrap();
        assert!(!host.is_available_at(1));
        assert!(host.is_available_at(2));
    }

    #[cfg(feature = "microlp")]
    mod solve {
        use itertools::Itertools;

        use super::*;
        use crate::models::SlotWindow;

        /// Whether any visitor has two meetings whose clock windows intersect.
        fn has_real_time_overlap(solution: &Solution) -> bool {
            solution.context.visitors.iter().any(|visitor| {
                let windows: Vec<SlotWindow> = solution
                    .visitor_meetings(visitor)
                    .filter_map(|m| {
                        let host = solution.context.host(&m.host)?;
                        solution.context.grid.window(&host.location, m.slot)
                    })
                    .collect();
                windows
                    .iter()
                    .tuple_combinations()
                    .any(|(a, b)| a.overlaps(b))
            })
        }

        #[test]
        fn test_single_request_meets() {
            let visitors = vec![Visitor::new("V1").with_request("Faculty A")];
            let mut s = Scheduler::builder(one_location(), catalog(&["Faculty A"]), visitors)
                .build()
                .unwrap();
            let params = RunParams::default()
                .with_min_meetings_per_visitor(1)
                .with_max_visitors(4)
                .with_max_group(2);
            let solution = s.schedule(&params).unwrap().unwrap();
            assert_eq!(solution.meeting_count(), 1);
            assert_eq!(solution.host_meetings("Faculty A").count(), 1);
            assert!((solution.objective_value - 4.0).abs() < 1e-6);
            assert!(s.has_feasible_solution());
            assert_eq!(
                s.infeasibility_report(),
                InfeasibilityReport::Feasible(TerminationStatus::Optimal)
            );
        }

        #[test]
        fn test_min_visitors_beyond_capacity_is_infeasible() {
            let visitors = vec![Visitor::new("V1"), Visitor::new("V2")];
            let mut s = Scheduler::builder(one_location(), catalog(&["Faculty A"]), visitors)
                .build()
                .unwrap();
            s.set_host_availability("Faculty A", &[2]).unwrap();

            let params = RunParams::default().with_min_visitors(2).with_max_group(1);
            assert!(s.schedule(&params).unwrap().is_none());
            assert!(!s.has_feasible_solution());
            assert_eq!(s.last_termination(), Some(TerminationStatus::Infeasible));

            let report = s.infeasibility_report();
            assert!(report.is_infeasible());
            let text = report.to_string();
            assert!(text.contains("min_visitors exceeds achievable capacity"));
            assert!(text.contains("Faculty A (max 1)"));
        }

        #[test]
        fn test_top_n_distinct_ranked_solutions() {
            let visitors = vec![
                Visitor::new("V1").with_request("Faculty A").with_request("Faculty B"),
                Visitor::new("V2").with_request("Faculty B"),
            ];
            let grid = TimeGridSpec::new().with_location("A", ["1:00-1:25", "1:30-1:55"]);
            let mut s = Scheduler::builder(grid, catalog(&["Faculty A", "Faculty B"]), visitors)
                .build()
                .unwrap();
            let set = s.schedule_top_n(3, &RunParams::default()).unwrap();
            assert_eq!(set.len(), 3);

            let ranks: Vec<usize> = set.iter().map(|s| s.rank).collect();
            assert_eq!(ranks, vec![1, 2, 3]);
            for pair in set.iter().collect::<Vec<_>>().windows(2) {
                assert!(pair[1].objective_value <= pair[0].objective_value + 1e-6);
                assert_ne!(pair[0].meetings, pair[1].meetings);
            }
            assert_ne!(set.get(1).unwrap().meetings, set.get(3).unwrap().meetings);

            let rows = set.summaries();
            assert!(rows[0].objective_gap_from_best.abs() < 1e-12);
            assert_eq!(rows[0].num_requested_assignments, 3);
        }

        #[test]
        fn test_nonoverlap_policy_avoids_real_time_overlap() {
            let grid = TimeGridSpec::new().with_location("A", SLOTS).with_location("B", SHIFTED);
            let catalog = CatalogSpec::new()
                .with_host(HostEntry::new("Host A", "A"))
                .with_host(HostEntry::new("Host B", "B"));
            let visitors = vec![
                Visitor::new("V1").with_request("Host B").with_request("Host A"),
                Visitor::new("V2").with_request("Host A").with_request("Host B"),
            ];
            let mut s = Scheduler::builder(grid, catalog, visitors)
                .with_movement(MovementSpec::nonoverlap_time())
                .build()
                .unwrap();
            assert!(s.warnings().is_empty());
            assert_eq!(s.movement().travel().get("B", "A"), Some(1));

            let params = RunParams::default().with_min_meetings_per_visitor(2);
            let solution = s.schedule(&params).unwrap().unwrap();
            for visitor in ["V1", "V2"] {
                assert_eq!(solution.visitor_meetings(visitor).count(), 2);
            }
            assert!(!has_real_time_overlap(&solution));
        }

        fn three_buildings(movement: MovementSpec) -> Scheduler {
            let grid = TimeGridSpec::new()
                .with_location("A", ["1:00-1:25", "1:30-1:55", "2:00-2:25", "2:30-2:55"])
                .with_location("B", ["1:10-1:35", "1:40-2:05", "2:10-2:35", "2:40-3:05"])
                .with_location("C", ["1:50-2:15", "2:20-2:45", "2:50-3:15", "3:20-3:45"]);
            let catalog = CatalogSpec::new()
                .with_host(HostEntry::new("Prof A", "A").with_room("101").with_area("Area1"))
                .with_host(HostEntry::new("Prof B", "B").with_room("201").with_area("Area1"))
                .with_host(HostEntry::new("Prof C", "C").with_room("301").with_area("Area2"));
            let visitors = vec![Visitor::new("Visitor 1")
                .with_request("Prof B")
                .with_request("Prof A")
                .with_request("Prof C")
                .with_area("Area1")
                .with_area("Area2")];
            let movement = movement
                .with_phase_slot("A", 1)
                .with_phase_slot("B", 1)
                .with_phase_slot("C", 1);
            let mut s = Scheduler::builder(grid, catalog, visitors)
                .with_movement(movement)
                .build()
                .unwrap();
            s.set_host_availability("Prof B", &[2]).unwrap();
            s.set_host_availability("Prof A", &[3]).unwrap();
            s.set_host_availability("Prof C", &[4]).unwrap();
            s
        }

        fn three_building_params() -> RunParams {
            RunParams::default()
                .with_group_penalty(0.0)
                .with_min_visitors(0)
                .with_max_visitors(2)
                .with_min_meetings_per_visitor(3)
                .with_max_group(1)
        }

        #[test]
        fn test_policy_none_allows_real_time_overlap() {
            let mut s = three_buildings(MovementSpec::none());
            assert!(s
                .warnings()
                .iter()
                .any(|w| matches!(w, SchedulerWarning::OverlapRisk { .. })));

            let solution = s.schedule(&three_building_params()).unwrap().unwrap();
            assert_eq!(solution.meeting_count(), 3);
            assert!(solution.is_assigned("Visitor 1", "Prof B", 2));
            assert!(solution.is_assigned("Visitor 1", "Prof A", 3));
            assert!(has_real_time_overlap(&solution));
        }

        #[test]
        fn test_nonoverlap_policy_rejects_overlapping_only_option() {
            let mut s = three_buildings(MovementSpec::nonoverlap_time());
            assert!(s.schedule(&three_building_params()).unwrap().is_none());
            assert!(!s.has_feasible_solution());

            let report = s.infeasibility_report();
            assert!(report.is_infeasible());
            assert!(report.to_string().starts_with("Termination: infeasible"));
        }

        #[test]
        fn test_snapshots_survive_later_runs() {
            let visitors = vec![Visitor::new("V1").with_request("Faculty A")];
            let mut s = Scheduler::builder(one_location(), catalog(&["Faculty A"]), visitors)
                .build()
                .unwrap();
            let first = s.schedule(&RunParams::default()).unwrap().unwrap();
            let before = first.meetings.clone();
            s.set_host_availability("Faculty A", &[3]).unwrap();
            let second = s.schedule(&RunParams::default()).unwrap().unwrap();
            assert_eq!(first.meetings, before);
            assert!(second.is_assigned("V1", "Faculty A", 3));
        }
    }
}
