//! Round driver
//!
//! Runs N migration rounds over an archipelago. Each round fans island
//! evolution and export out through an [`ExecutionEngine`], waits for every
//! island at the barrier, then fans the import phase out the same way.
//! Nothing is pulled for round R before every island has finished pushing
//! for round R.

use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::{MigrationError, MigrationResult};
use crate::execution::ExecutionEngine;
use crate::migration::coordinator::{InProcessCoordinator, MigrationCoordinator, PoolCapacity};
use crate::migration::replacement::{AppliedReplacement, ReplacementPolicy};
use crate::migration::selection::SelectionPolicy;
use crate::monitor::{RunMonitor, RunStatus};
use crate::optimizer::Optimizer;
use crate::population::individual::fitness_cmp;
use crate::population::population::Population;
use crate::results::record::{Champion, ChampionSummary};
use crate::round::protocol::{ExportGate, RoundPhase, RoundProtocol};
use crate::round::report::{
    IslandResult, IslandRoundLog, IslandStatus, RoundReport, RunOutcome, WorkerInfo,
};
use crate::topology::factory::{Archipelago, Island};
use crate::topology::graph::{IslandId, Topology};

/// What to do when islands miss the round deadline
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum TimeoutPolicy {
    /// Abort the run with [`MigrationError::RoundTimeout`]
    #[default]
    FailRun,
    /// Drop the slow islands from the run and carry on
    ExcludeSlow,
}

/// What to do with an island whose optimizer failed
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum FailurePolicy {
    /// Let the island try again next round
    #[default]
    Retry,
    /// Keep the island's population but stop evolving it
    Retire,
}

/// Builder for [`RoundDriver`]
pub struct RoundDriverBuilder<E> {
    engine: E,
    coordinator: Option<Arc<dyn MigrationCoordinator>>,
    selection: Option<Arc<dyn SelectionPolicy>>,
    replacement: Option<Arc<dyn ReplacementPolicy>>,
    pool_capacity: Option<PoolCapacity>,
    rounds: usize,
    generations: usize,
    round_timeout: Option<Duration>,
    timeout_policy: TimeoutPolicy,
    failure_policy: FailurePolicy,
    monitor: Option<RunMonitor>,
    run_id: Option<Uuid>,
}

impl<E: ExecutionEngine> RoundDriverBuilder<E> {
    /// Start a builder that runs islands on `engine`
    pub fn new(engine: E) -> Self {
        Self {
            engine,
            coordinator: None,
            selection: None,
            replacement: None,
            pool_capacity: None,
            rounds: 1,
            generations: 1,
            round_timeout: None,
            timeout_policy: TimeoutPolicy::default(),
            failure_policy: FailurePolicy::default(),
            monitor: None,
            run_id: None,
        }
    }

    /// Coordinator brokering the exchange (default: a fresh in-process one)
    pub fn coordinator(mut self, coordinator: Arc<dyn MigrationCoordinator>) -> Self {
        self.coordinator = Some(coordinator);
        self
    }

    /// Selection policy applied on export
    pub fn selection(mut self, selection: Arc<dyn SelectionPolicy>) -> Self {
        self.selection = Some(selection);
        self
    }

    /// Replacement policy applied on import
    pub fn replacement(mut self, replacement: Arc<dyn ReplacementPolicy>) -> Self {
        self.replacement = Some(replacement);
        self
    }

    /// Define pools with this capacity when the run starts
    ///
    /// Leave unset when the coordinator's pools are defined by the caller.
    pub fn pool_capacity(mut self, capacity: impl Into<PoolCapacity>) -> Self {
        self.pool_capacity = Some(capacity.into());
        self
    }

    /// Number of rounds
    pub fn rounds(mut self, rounds: usize) -> Self {
        self.rounds = rounds;
        self
    }

    /// Generations each island evolves per round
    pub fn generations(mut self, generations: usize) -> Self {
        self.generations = generations;
        self
    }

    /// Deadline for each phase of a round
    pub fn round_timeout(mut self, timeout: Duration) -> Self {
        self.round_timeout = Some(timeout);
        self
    }

    /// Reaction to a missed deadline
    pub fn timeout_policy(mut self, policy: TimeoutPolicy) -> Self {
        self.timeout_policy = policy;
        self
    }

    /// Reaction to an optimizer failure
    pub fn failure_policy(mut self, policy: FailurePolicy) -> Self {
        self.failure_policy = policy;
        self
    }

    /// Report progress to a monitor; the run adopts the monitor's run id
    pub fn monitor(mut self, monitor: RunMonitor) -> Self {
        self.monitor = Some(monitor);
        self
    }

    /// Run identifier when no monitor is attached
    pub fn run_id(mut self, run_id: Uuid) -> Self {
        self.run_id = Some(run_id);
        self
    }

    /// Build the driver
    pub fn build(self) -> MigrationResult<RoundDriver<E>> {
        let selection = self
            .selection
            .ok_or_else(|| MigrationError::config("Selection policy must be specified"))?;
        let replacement = self
            .replacement
            .ok_or_else(|| MigrationError::config("Replacement policy must be specified"))?;
        if self.rounds == 0 {
            return Err(MigrationError::config("Number of rounds must be positive"));
        }
        if self.round_timeout.is_some_and(|t| t.is_zero()) {
            return Err(MigrationError::config("Round timeout must be positive"));
        }

        let run_id = self
            .monitor
            .as_ref()
            .map(RunMonitor::run_id)
            .or(self.run_id)
            .unwrap_or_else(Uuid::new_v4);

        Ok(RoundDriver {
            engine: self.engine,
            coordinator: self
                .coordinator
                .unwrap_or_else(|| Arc::new(InProcessCoordinator::new())),
            selection,
            replacement,
            pool_capacity: self.pool_capacity,
            rounds: self.rounds,
            generations: self.generations,
            round_timeout: self.round_timeout,
            timeout_policy: self.timeout_policy,
            failure_policy: self.failure_policy,
            monitor: self.monitor.unwrap_or_else(RunMonitor::disabled),
            run_id,
        })
    }
}

/// Drives migration rounds across an archipelago
pub struct RoundDriver<E> {
    engine: E,
    coordinator: Arc<dyn MigrationCoordinator>,
    selection: Arc<dyn SelectionPolicy>,
    replacement: Arc<dyn ReplacementPolicy>,
    pool_capacity: Option<PoolCapacity>,
    rounds: usize,
    generations: usize,
    round_timeout: Option<Duration>,
    timeout_policy: TimeoutPolicy,
    failure_policy: FailurePolicy,
    monitor: RunMonitor,
    run_id: Uuid,
}

/// An island between rounds
struct IslandState<O> {
    id: IslandId,
    optimizer: O,
    population: Population,
    log: Vec<IslandRoundLog>,
    retired: bool,
    worker: WorkerInfo,
}

impl<O: Optimizer> IslandState<O> {
    fn record(
        &mut self,
        round: usize,
        status: IslandStatus,
        replacements: Vec<AppliedReplacement>,
        exported: usize,
    ) {
        self.log.push(IslandRoundLog {
            round,
            status,
            champion_fitness: self.population.champion_fitness(),
            replacements,
            exported,
        });
    }

    fn into_result(self) -> IslandResult {
        IslandResult {
            island: self.id,
            worker: self.worker,
            log: self.log,
            evaluations: self.optimizer.evaluations(),
        }
    }
}

/// Shared, read-only inputs of the evolve-and-export task
struct ExportContext {
    round: usize,
    generations: usize,
    topology: Arc<Topology>,
    coordinator: Arc<dyn MigrationCoordinator>,
    selection: Arc<dyn SelectionPolicy>,
    gate: Arc<ExportGate>,
}

fn evolve_and_export<O: Optimizer>(
    mut state: IslandState<O>,
    ctx: &ExportContext,
) -> (IslandState<O>, MigrationResult<usize>) {
    state.worker = WorkerInfo::current();
    if let Err(e) = state.optimizer.evolve(&mut state.population, ctx.generations) {
        let failure = MigrationError::IslandFailure {
            island: state.id.to_string(),
            round: ctx.round,
            reason: e.to_string(),
        };
        return (state, Err(failure));
    }

    let migrants = ctx.selection.select(&state.population, &state.id);
    let destinations = ctx.topology.outgoing(&state.id);
    let exported = ctx.gate.admit(|| -> MigrationResult<usize> {
        let mut pushed = 0;
        for destination in &destinations {
            for migrant in &migrants {
                ctx.coordinator.push(destination, migrant.clone())?;
                pushed += 1;
            }
        }
        Ok(pushed)
    });

    let exported = match exported {
        Some(result) => result,
        None => {
            tracing::debug!(
                island = %state.id,
                round = ctx.round,
                "export arrived after the barrier"
            );
            Ok(0)
        }
    };
    (state, exported)
}

impl<E: ExecutionEngine> RoundDriver<E> {
    /// Start building a driver that runs islands on `engine`
    pub fn builder(engine: E) -> RoundDriverBuilder<E> {
        RoundDriverBuilder::new(engine)
    }

    /// Run identifier
    pub fn run_id(&self) -> Uuid {
        self.run_id
    }

    /// The coordinator brokering migrant exchange
    pub fn coordinator(&self) -> &Arc<dyn MigrationCoordinator> {
        &self.coordinator
    }

    /// Initialize every island and run all rounds
    pub fn run<O>(&self, archipelago: Archipelago<O>) -> MigrationResult<RunOutcome>
    where
        O: Optimizer + 'static,
    {
        let started_at = Utc::now();
        let (topology, islands) = archipelago.into_parts();
        tracing::info!(
            run_id = %self.run_id,
            topology = topology.label(),
            islands = topology.len(),
            rounds = self.rounds,
            generations = self.generations,
            engine = self.engine.name(),
            "starting run"
        );

        if let Some(capacity) = &self.pool_capacity {
            self.coordinator.define_pools(&topology, capacity)?;
        }
        self.monitor.start(topology.island_ids(), started_at);

        let result = self.run_rounds(&topology, islands);
        let finished_at = Utc::now();
        let (states, reports, excluded) = match result {
            Ok(parts) => parts,
            Err(e) => {
                tracing::error!(run_id = %self.run_id, error = %e, "run failed");
                self.monitor.finish(RunStatus::Failed, finished_at);
                return Err(e);
            }
        };
        self.monitor.finish(RunStatus::Finished, finished_at);

        let champions = ChampionSummary::new(
            states
                .iter()
                .filter_map(|s| {
                    s.population.champion().map(|c| Champion {
                        island: s.id.clone(),
                        genome: c.genome.clone(),
                        fitness: c.fitness,
                    })
                })
                .collect(),
        );
        tracing::info!(
            run_id = %self.run_id,
            best = ?champions.min(),
            mean = ?champions.mean(),
            excluded = excluded.len(),
            "run finished"
        );

        Ok(RunOutcome {
            run_id: self.run_id,
            topology_id: topology.id().to_string(),
            topology_label: topology.label().to_string(),
            rounds: reports.len(),
            generations: self.generations,
            islands: states.into_iter().map(IslandState::into_result).collect(),
            reports,
            excluded,
            champions,
            started_at,
            finished_at,
        })
    }

    #[allow(clippy::type_complexity)]
    fn run_rounds<O>(
        &self,
        topology: &Arc<Topology>,
        islands: Vec<Island<O>>,
    ) -> MigrationResult<(Vec<IslandState<O>>, Vec<RoundReport>, Vec<IslandId>)>
    where
        O: Optimizer + 'static,
    {
        let mut states = self.initialize(islands)?;
        let mut reports = Vec::with_capacity(self.rounds);
        let mut excluded = Vec::new();
        for round in 1..=self.rounds {
            let report = self.run_round(round, topology, &mut states, &mut excluded)?;
            reports.push(report);
        }
        Ok((states, reports, excluded))
    }

    fn initialize<O>(&self, islands: Vec<Island<O>>) -> MigrationResult<Vec<IslandState<O>>>
    where
        O: Optimizer + 'static,
    {
        let collected = self.engine.submit(
            islands,
            |island: Island<O>| {
                let mut optimizer = island.algorithm;
                let population = optimizer.initialize(island.size);
                (island.id, optimizer, population)
            },
            None,
        );

        let mut states = Vec::with_capacity(collected.completed.len());
        for (_, (id, optimizer, population)) in collected.into_ordered() {
            let population = population.map_err(|e| MigrationError::IslandFailure {
                island: id.to_string(),
                round: 0,
                reason: e.to_string(),
            })?;
            states.push(IslandState {
                id,
                optimizer,
                population,
                log: Vec::new(),
                retired: false,
                worker: WorkerInfo::current(),
            });
        }
        Ok(states)
    }

    fn run_round<O>(
        &self,
        round: usize,
        topology: &Arc<Topology>,
        states: &mut Vec<IslandState<O>>,
        excluded: &mut Vec<IslandId>,
    ) -> MigrationResult<RoundReport>
    where
        O: Optimizer + 'static,
    {
        let span = tracing::info_span!("round", round);
        let _enter = span.enter();
        let mut protocol = RoundProtocol::new(round);
        let mut report = RoundReport {
            round,
            ..RoundReport::default()
        };

        let (active, mut idle): (Vec<_>, Vec<_>) =
            std::mem::take(states).into_iter().partition(|s| !s.retired);
        let active_ids: Vec<IslandId> = active.iter().map(|s| s.id.clone()).collect();

        // Evolve and export
        protocol.advance(RoundPhase::Evolving)?;
        let gate = Arc::new(ExportGate::new());
        let ctx = ExportContext {
            round,
            generations: self.generations,
            topology: Arc::clone(topology),
            coordinator: Arc::clone(&self.coordinator),
            selection: Arc::clone(&self.selection),
            gate: Arc::clone(&gate),
        };
        let collected = self.engine.submit(
            active,
            move |state| evolve_and_export(state, &ctx),
            self.round_timeout,
        );
        protocol.advance(RoundPhase::Exporting)?;
        gate.close();
        self.handle_timeouts(round, &collected.timed_out, &active_ids, excluded, &mut report)?;

        let mut importing = Vec::new();
        let mut exported = HashMap::new();
        for (_, (mut state, result)) in collected.into_ordered() {
            match result {
                Ok(pushed) => {
                    report.migrants_pushed += pushed;
                    exported.insert(state.id.clone(), pushed);
                    importing.push(state);
                }
                Err(e) if !e.is_fatal() => {
                    tracing::warn!(
                        island = %state.id,
                        error = %e,
                        policy = ?self.failure_policy,
                        "island failed"
                    );
                    report.failed.push(state.id.clone());
                    state.retired = self.failure_policy == FailurePolicy::Retire;
                    state.record(round, IslandStatus::Failed(e.to_string()), Vec::new(), 0);
                    idle.push(state);
                }
                Err(e) => return Err(e.in_island(&state.id, round, RoundPhase::Exporting)),
            }
        }

        // Barrier: every island has exported or failed
        protocol.advance(RoundPhase::Exchanging)?;
        let importing_ids: HashSet<&IslandId> = importing.iter().map(|s| &s.id).collect();
        for id in topology.island_ids() {
            if !importing_ids.contains(id) && self.coordinator.has_pool(id) {
                let dropped = self
                    .coordinator
                    .clear_pool(id)
                    .map_err(|e| e.in_island(id, round, RoundPhase::Exchanging))?;
                if dropped > 0 {
                    tracing::debug!(island = %id, dropped, "cleared pool of non-importing island");
                }
            }
        }

        // Import
        protocol.advance(RoundPhase::Importing)?;
        let importing_ids: Vec<IslandId> = importing.iter().map(|s| s.id.clone()).collect();
        let coordinator = Arc::clone(&self.coordinator);
        let replacement = Arc::clone(&self.replacement);
        let import_topology = Arc::clone(topology);
        let collected = self.engine.submit(
            importing,
            move |mut state: IslandState<O>| {
                let result = if import_topology.has_incoming(&state.id) {
                    coordinator.pull_and_replace(
                        &state.id,
                        &mut state.population,
                        replacement.as_ref(),
                    )
                } else {
                    Ok(Vec::new())
                };
                state.worker = WorkerInfo::current();
                (state, result)
            },
            self.round_timeout,
        );
        self.handle_timeouts(round, &collected.timed_out, &importing_ids, excluded, &mut report)?;

        for (_, (mut state, result)) in collected.into_ordered() {
            let applied = result.map_err(|e| e.in_island(&state.id, round, RoundPhase::Importing))?;
            report.migrants_accepted += applied.iter().filter(|a| a.replaced).count();
            report.completed.push(state.id.clone());
            let pushed = exported.get(&state.id).copied().unwrap_or(0);
            state.record(round, IslandStatus::Completed, applied, pushed);
            states.push(state);
        }

        for mut state in idle {
            if report.failed.contains(&state.id) {
                states.push(state);
                continue;
            }
            report.retired.push(state.id.clone());
            state.record(round, IslandStatus::Retired, Vec::new(), 0);
            states.push(state);
        }
        states.sort_by_key(|s| topology.position(&s.id).unwrap_or(usize::MAX));

        protocol.advance(RoundPhase::RoundComplete)?;
        for state in states.iter() {
            if let Some(entry) = state.log.last() {
                self.monitor
                    .island(&state.id, round, entry.champion_fitness, entry.status.label());
            }
        }
        self.monitor.round(round);

        report.best_fitness = states
            .iter()
            .filter_map(|s| s.population.champion_fitness())
            .min_by(|a, b| fitness_cmp(*a, *b));
        tracing::info!(
            completed = report.completed.len(),
            failed = report.failed.len(),
            pushed = report.migrants_pushed,
            accepted = report.migrants_accepted,
            best = ?report.best_fitness,
            "round complete"
        );
        Ok(report)
    }

    fn handle_timeouts(
        &self,
        round: usize,
        timed_out: &[usize],
        ids: &[IslandId],
        excluded: &mut Vec<IslandId>,
        report: &mut RoundReport,
    ) -> MigrationResult<()> {
        if timed_out.is_empty() {
            return Ok(());
        }
        let pending: Vec<IslandId> = timed_out
            .iter()
            .filter_map(|&i| ids.get(i).cloned())
            .collect();
        match self.timeout_policy {
            TimeoutPolicy::FailRun => Err(MigrationError::RoundTimeout {
                round,
                pending: pending.iter().map(IslandId::to_string).collect(),
            }),
            TimeoutPolicy::ExcludeSlow => {
                for id in pending {
                    tracing::warn!(
                        island = %id,
                        round,
                        "island missed the deadline and was excluded"
                    );
                    if self.coordinator.has_pool(&id) {
                        self.coordinator.clear_pool(&id)?;
                    }
                    report.excluded.push(id.clone());
                    excluded.push(id);
                }
                Ok(())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::OptimizerError;
    use crate::execution::sequential::SequentialEngine;
    use crate::migration::replacement::FairReplacement;
    use crate::migration::selection::BestSelection;
    use crate::monitor::InMemoryMonitor;
    use crate::population::individual::Individual;
    use crate::topology::graph::TopologyBuilder;

    /// Lowers every fitness by one per generation; fails on demand
    #[derive(Clone, Debug)]
    struct Countdown {
        start: f64,
        width: usize,
        fail_in_round: Option<usize>,
        calls: usize,
    }

    impl Countdown {
        fn new(start: f64) -> Self {
            Self {
                start,
                width: 1,
                fail_in_round: None,
                calls: 0,
            }
        }
    }

    impl Optimizer for Countdown {
        fn name(&self) -> &str {
            "countdown"
        }

        fn initialize(&mut self, size: usize) -> Result<Population, OptimizerError> {
            Ok((0..size)
                .map(|i| {
                    let f = self.start + i as f64;
                    Individual::new(vec![f; self.width], f)
                })
                .collect())
        }

        fn evolve(
            &mut self,
            population: &mut Population,
            budget: usize,
        ) -> Result<(), OptimizerError> {
            self.calls += 1;
            if self.fail_in_round == Some(self.calls) {
                return Err(OptimizerError::EvolutionFailed("diverged".to_string()));
            }
            let updated: Vec<Individual> = population
                .iter()
                .map(|ind| {
                    let f = ind.fitness - budget as f64;
                    Individual::new(vec![f; self.width], f)
                })
                .collect();
            *population = updated.into_iter().collect();
            Ok(())
        }

        fn evaluations(&self) -> usize {
            self.calls
        }
    }

    fn pair(a: Countdown, b: Countdown) -> Archipelago<Countdown> {
        let topology = TopologyBuilder::undirected()
            .islands(["a", "b"])
            .edge("a", "b")
            .build()
            .unwrap();
        let islands = vec![
            Island {
                id: IslandId::from("a"),
                algorithm: a,
                size: 3,
            },
            Island {
                id: IslandId::from("b"),
                algorithm: b,
                size: 3,
            },
        ];
        Archipelago::new(topology, islands).unwrap()
    }

    fn driver() -> RoundDriverBuilder<SequentialEngine> {
        RoundDriver::builder(SequentialEngine)
            .selection(Arc::new(BestSelection::count(1)))
            .replacement(Arc::new(FairReplacement))
            .pool_capacity(4)
    }

    #[test]
    fn test_builder_requires_policies() {
        let result = RoundDriver::builder(SequentialEngine).build();
        assert!(matches!(result, Err(MigrationError::Configuration(_))));
        assert!(driver().rounds(0).build().is_err());
    }

    #[test]
    fn test_migrants_cross_the_edge() {
        let outcome = driver()
            .rounds(1)
            .build()
            .unwrap()
            .run(pair(Countdown::new(0.0), Countdown::new(100.0)))
            .unwrap();

        // a's best after one generation is -1, which replaces b's worst (101)
        let b = &outcome.islands[1];
        let log = b.last().unwrap();
        assert_eq!(log.status, IslandStatus::Completed);
        assert_eq!(log.accepted(), 1);
        assert_eq!(log.sources(), vec![&IslandId::from("a")]);
        assert_eq!(log.champion_fitness, Some(-1.0));
        assert_eq!(outcome.champions.min(), Some(-1.0));
        assert_eq!(outcome.reports[0].migrants_pushed, 2);
    }

    #[test]
    fn test_failed_island_skips_migration_and_retries() {
        let mut failing = Countdown::new(100.0);
        failing.fail_in_round = Some(1);
        let outcome = driver()
            .rounds(2)
            .build()
            .unwrap()
            .run(pair(Countdown::new(0.0), failing))
            .unwrap();

        let b = &outcome.islands[1];
        assert!(matches!(b.log[0].status, IslandStatus::Failed(_)));
        assert!(b.log[0].replacements.is_empty());
        assert_eq!(b.log[1].status, IslandStatus::Completed);
        assert_eq!(outcome.reports[0].failed, vec![IslandId::from("b")]);
        // round 1's push to b was cleared, so round 2 sees only round 2's migrant
        assert_eq!(b.log[1].replacements.len(), 1);
    }

    #[test]
    fn test_retired_island_stops_evolving() {
        let mut failing = Countdown::new(100.0);
        failing.fail_in_round = Some(1);
        let outcome = driver()
            .rounds(3)
            .failure_policy(FailurePolicy::Retire)
            .build()
            .unwrap()
            .run(pair(Countdown::new(0.0), failing))
            .unwrap();

        let b = &outcome.islands[1];
        assert_eq!(b.log.len(), 3);
        assert_eq!(b.log[1].status, IslandStatus::Retired);
        assert_eq!(b.log[2].status, IslandStatus::Retired);
        assert_eq!(b.evaluations, 1);
        assert_eq!(outcome.reports[2].retired, vec![IslandId::from("b")]);
    }

    #[test]
    fn test_monitor_receives_progress() {
        let sink = Arc::new(InMemoryMonitor::new());
        let run_id = Uuid::new_v4();
        let monitor = RunMonitor::new(sink.clone(), "pair", run_id);
        let driver = driver().rounds(2).monitor(monitor.clone()).build().unwrap();
        assert_eq!(driver.run_id(), run_id);

        let outcome = driver
            .run(pair(Countdown::new(0.0), Countdown::new(10.0)))
            .unwrap();
        assert_eq!(outcome.run_id, run_id);
        assert_eq!(monitor.get("run.status").as_deref(), Some("finished"));
        assert_eq!(monitor.get("round").as_deref(), Some("2"));
        assert_eq!(monitor.get("island.a.status").as_deref(), Some("completed"));
    }

    #[test]
    fn test_fatal_import_error_names_island_and_round() {
        let mut wide = Countdown::new(100.0);
        wide.width = 2;
        let result = driver().rounds(2).build().unwrap().run(pair(Countdown::new(0.0), wide));

        // a imports first and receives b's two-gene migrant
        match result {
            Err(MigrationError::Island {
                island,
                round,
                phase,
                source,
            }) => {
                assert_eq!(island, "a");
                assert_eq!(round, 1);
                assert_eq!(phase, RoundPhase::Importing);
                assert!(matches!(
                    *source,
                    MigrationError::DimensionMismatch {
                        expected: 1,
                        actual: 2
                    }
                ));
            }
            other => panic!("expected an island error, got {other:?}"),
        }
    }

    #[test]
    fn test_unknown_destination_names_exporting_island() {
        let coordinator: Arc<dyn MigrationCoordinator> = Arc::new(InProcessCoordinator::new());
        coordinator.define_migrant_pool(&IslandId::from("a"), 2).unwrap();
        let result = RoundDriver::builder(SequentialEngine)
            .coordinator(coordinator)
            .selection(Arc::new(BestSelection::count(1)))
            .replacement(Arc::new(FairReplacement))
            .build()
            .unwrap()
            .run(pair(Countdown::new(0.0), Countdown::new(1.0)));

        // b's pool was never declared, so a's push to it fails
        match result {
            Err(MigrationError::Island {
                island,
                round,
                phase,
                source,
            }) => {
                assert_eq!(island, "a");
                assert_eq!(round, 1);
                assert_eq!(phase, RoundPhase::Exporting);
                assert!(matches!(*source, MigrationError::UnknownDestination { .. }));
            }
            other => panic!("expected an island error, got {other:?}"),
        }
    }

    #[test]
    fn test_pools_defined_twice_fails_run() {
        let coordinator: Arc<dyn MigrationCoordinator> = Arc::new(InProcessCoordinator::new());
        let driver = driver().coordinator(Arc::clone(&coordinator)).build().unwrap();
        driver.run(pair(Countdown::new(0.0), Countdown::new(1.0))).unwrap();
        let second = driver.run(pair(Countdown::new(0.0), Countdown::new(1.0)));
        assert!(matches!(second, Err(MigrationError::PoolsAlreadyDefined)));
    }
}
