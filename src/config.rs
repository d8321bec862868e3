//! Run configuration
//!
//! Every option a run recognizes, with defaults, validation and JSON loading.
//! Policy names are resolved into strategy objects once, when the driver is
//! configured, never at call time.

use std::collections::{BTreeMap, HashMap};
use std::path::Path;
use std::str::FromStr;
use std::sync::Arc;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::{MigrationError, MigrationResult};
use crate::execution::ExecutionEngine;
use crate::migration::coordinator::PoolCapacity;
use crate::migration::replacement::{FairReplacement, ReplacementPolicy};
use crate::migration::selection::{BestSelection, SelectionPolicy};
use crate::round::driver::{FailurePolicy, RoundDriver, RoundDriverBuilder, TimeoutPolicy};
use crate::topology::factory::TopologyFactory;
use crate::topology::generators::{GeneratorKind, TopologyParams};
use crate::topology::graph::Topology;

/// Selection policies known by name
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SelectionKind {
    /// Best-N selection
    Best,
}

impl FromStr for SelectionKind {
    type Err = MigrationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "best" | "best-s-policy" => Ok(Self::Best),
            other => Err(MigrationError::config(format!(
                "unrecognized selection policy '{other}'"
            ))),
        }
    }
}

/// Replacement policies known by name
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ReplacementKind {
    /// Fair replacement
    Fair,
}

impl FromStr for ReplacementKind {
    type Err = MigrationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "fair" | "fair-r-policy" => Ok(Self::Fair),
            other => Err(MigrationError::config(format!(
                "unrecognized replacement policy '{other}'"
            ))),
        }
    }
}

/// Topology generator and its parameters
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct TopologyConfig {
    /// Generator name, e.g. `bidir-ring` or `rim`
    #[serde(default = "default_generator")]
    pub generator: String,
    /// Generator parameters
    #[serde(default)]
    pub params: TopologyParams,
}

impl Default for TopologyConfig {
    fn default() -> Self {
        Self {
            generator: default_generator(),
            params: TopologyParams::default(),
        }
    }
}

impl TopologyConfig {
    /// Resolve the generator name
    pub fn kind(&self) -> MigrationResult<GeneratorKind> {
        self.generator.parse()
    }
}

/// Which individuals an island exports
///
/// Exactly one of `count` and `fraction` must be set.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SelectionConfig {
    /// Policy name
    #[serde(default = "default_selection_policy")]
    pub policy: String,
    /// Fixed number of migrants
    #[serde(default)]
    pub count: Option<usize>,
    /// Fraction of the population to export
    #[serde(default)]
    pub fraction: Option<f64>,
}

impl Default for SelectionConfig {
    fn default() -> Self {
        Self {
            policy: default_selection_policy(),
            count: Some(1),
            fraction: None,
        }
    }
}

impl SelectionConfig {
    /// Resolve into a selection policy
    pub fn build(&self) -> MigrationResult<Arc<dyn SelectionPolicy>> {
        match self.policy.parse::<SelectionKind>()? {
            SelectionKind::Best => Ok(Arc::new(BestSelection::from_options(
                self.count,
                self.fraction,
            )?)),
        }
    }
}

/// How incoming migrants are applied
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReplacementConfig {
    /// Policy name
    #[serde(default = "default_replacement_policy")]
    pub policy: String,
}

impl Default for ReplacementConfig {
    fn default() -> Self {
        Self {
            policy: default_replacement_policy(),
        }
    }
}

impl ReplacementConfig {
    /// Resolve into a replacement policy
    pub fn build(&self) -> MigrationResult<Arc<dyn ReplacementPolicy>> {
        match self.policy.parse::<ReplacementKind>()? {
            ReplacementKind::Fair => Ok(Arc::new(FairReplacement)),
        }
    }
}

/// Configuration of one island-model run
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct RunConfig {
    /// Run name; also the monitoring domain prefix
    #[serde(default = "default_name")]
    pub name: String,

    /// Free-form description stored with the results
    #[serde(default)]
    pub description: String,

    /// Identifier shared by related runs
    #[serde(default)]
    pub suite_run_id: Option<String>,

    /// Topology generator and parameters
    #[serde(default)]
    pub topology: TopologyConfig,

    /// Individuals per island
    #[serde(default = "default_island_size")]
    pub island_size: usize,

    /// Migrant pool capacity per island
    #[serde(default = "default_migrant_pool_size")]
    pub migrant_pool_size: usize,

    /// Pool capacities by topology position, overriding `migrant_pool_size`
    #[serde(default)]
    pub migrant_pool_overrides: BTreeMap<usize, usize>,

    /// Export policy
    #[serde(default)]
    pub selection: SelectionConfig,

    /// Import policy
    #[serde(default)]
    pub replacement: ReplacementConfig,

    /// Number of rounds
    #[serde(default = "default_rounds")]
    pub rounds: usize,

    /// Generations each island evolves per round
    #[serde(default = "default_generations")]
    pub generations: usize,

    /// Per-phase deadline in seconds; unbounded when unset
    #[serde(default)]
    pub round_timeout_secs: Option<u64>,

    /// Reaction to a missed deadline
    #[serde(default)]
    pub timeout_policy: TimeoutPolicy,

    /// Reaction to an optimizer failure
    #[serde(default)]
    pub failure_policy: FailurePolicy,

    /// Whether champions are scored on held-out validation points
    #[serde(default)]
    pub validation_mode: bool,

    /// Number of validation points
    #[serde(default)]
    pub validation_points: usize,

    /// Seed for island sampling and randomized topologies
    #[serde(default)]
    pub seed: Option<u64>,
}

impl Default for RunConfig {
    fn default() -> Self {
        Self {
            name: default_name(),
            description: String::new(),
            suite_run_id: None,
            topology: TopologyConfig::default(),
            island_size: default_island_size(),
            migrant_pool_size: default_migrant_pool_size(),
            migrant_pool_overrides: BTreeMap::new(),
            selection: SelectionConfig::default(),
            replacement: ReplacementConfig::default(),
            rounds: default_rounds(),
            generations: default_generations(),
            round_timeout_secs: None,
            timeout_policy: TimeoutPolicy::default(),
            failure_policy: FailurePolicy::default(),
            validation_mode: false,
            validation_points: 0,
            seed: None,
        }
    }
}

impl RunConfig {
    /// Parse and validate a JSON document
    pub fn from_json_str(json: &str) -> MigrationResult<Self> {
        let config: Self = serde_json::from_str(json)
            .map_err(|e| MigrationError::config(format!("invalid run configuration: {e}")))?;
        config.validate()?;
        Ok(config)
    }

    /// Read, parse and validate a JSON file
    pub fn from_path(path: impl AsRef<Path>) -> MigrationResult<Self> {
        let json = std::fs::read_to_string(path.as_ref())?;
        Self::from_json_str(&json)
    }

    /// Check every option, reporting all problems at once
    pub fn validate(&self) -> MigrationResult<()> {
        let mut errors = Vec::new();

        if self.name.is_empty() {
            errors.push("name must not be empty".to_string());
        }
        if let Err(e) = self.topology.kind() {
            errors.push(e.to_string());
        }
        if self.topology.params.n_islands == 0 {
            errors.push("topology.params.n_islands must be > 0".to_string());
        }
        if self.island_size == 0 {
            errors.push("island_size must be > 0".to_string());
        }
        if self.migrant_pool_size == 0 {
            errors.push("migrant_pool_size must be > 0".to_string());
        }
        if let Some((position, _)) = self.migrant_pool_overrides.iter().find(|(_, c)| **c == 0) {
            errors.push(format!("migrant_pool_overrides[{position}] must be > 0"));
        }
        if let Err(e) = self.selection.build() {
            errors.push(e.to_string());
        }
        if let Err(e) = self.replacement.build() {
            errors.push(e.to_string());
        }
        if self.rounds == 0 {
            errors.push("rounds must be > 0".to_string());
        }
        if self.round_timeout_secs == Some(0) {
            errors.push("round_timeout_secs must be > 0".to_string());
        }
        if self.validation_mode && self.validation_points == 0 {
            errors.push("validation_points must be > 0 in validation mode".to_string());
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(MigrationError::Configuration(errors.join("; ")))
        }
    }

    /// Per-phase deadline
    pub fn round_timeout(&self) -> Option<Duration> {
        self.round_timeout_secs.map(Duration::from_secs)
    }

    /// Pool capacities for `topology`, resolving positional overrides to ids
    pub fn pool_capacity(&self, topology: &Topology) -> PoolCapacity {
        if self.migrant_pool_overrides.is_empty() {
            return PoolCapacity::Uniform(self.migrant_pool_size);
        }
        let overrides: HashMap<_, _> = self
            .migrant_pool_overrides
            .iter()
            .filter_map(|(&position, &capacity)| {
                topology
                    .island_ids()
                    .get(position)
                    .map(|id| (id.clone(), capacity))
            })
            .collect();
        PoolCapacity::PerIsland {
            default: self.migrant_pool_size,
            overrides,
        }
    }

    /// Factory producing islands of the configured size
    pub fn topology_factory(&self) -> TopologyFactory {
        let factory = TopologyFactory::new(self.island_size);
        match self.seed {
            Some(seed) => factory.with_seed(seed),
            None => factory,
        }
    }

    /// Generator parameters with the run seed filled in when unset
    pub fn topology_params(&self) -> TopologyParams {
        let mut params = self.topology.params.clone();
        if params.seed.is_none() {
            params.seed = self.seed;
        }
        params
    }

    /// A driver builder with every round option applied
    ///
    /// Pool capacities depend on the built topology; pass them with
    /// [`RoundDriverBuilder::pool_capacity`] using [`RunConfig::pool_capacity`].
    pub fn driver_builder<E: ExecutionEngine>(
        &self,
        engine: E,
    ) -> MigrationResult<RoundDriverBuilder<E>> {
        let mut builder = RoundDriver::builder(engine)
            .selection(self.selection.build()?)
            .replacement(self.replacement.build()?)
            .rounds(self.rounds)
            .generations(self.generations)
            .timeout_policy(self.timeout_policy)
            .failure_policy(self.failure_policy);
        if let Some(timeout) = self.round_timeout() {
            builder = builder.round_timeout(timeout);
        }
        Ok(builder)
    }
}

fn default_name() -> String {
    "archipelago".to_string()
}

fn default_generator() -> String {
    GeneratorKind::BidirRing.name().to_string()
}

fn default_selection_policy() -> String {
    "best".to_string()
}

fn default_replacement_policy() -> String {
    "fair".to_string()
}

fn default_island_size() -> usize {
    10
}

fn default_migrant_pool_size() -> usize {
    4
}

fn default_rounds() -> usize {
    10
}

fn default_generations() -> usize {
    100
}
