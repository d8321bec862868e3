//! Ring migration on Rastrigin
//!
//! Eight Gaussian-search islands on a bidirectional ring exchange their two
//! best individuals every round.
//!
//! Run with `RUST_LOG=archipelago_evo=info cargo run --example ring_migration`.

use std::sync::Arc;

use archipelago_evo::prelude::*;

fn main() -> MigrationResult<()> {
    // A subscriber may already be installed by the harness
    let _ = init_tracing(LogFormat::from_env());

    println!("=== Ring Migration: Rastrigin ===\n");

    let factory = TopologyFactory::new(20).with_seed(42);
    let search = GaussianSearch::new(Rastrigin::new(10), 0.3);
    let archipelago = factory.bidir_ring(8, &IslandConstructor::seeded(search, 7))?;

    println!("Topology: {}", archipelago.topology().label());
    println!("Islands:  {}", archipelago.len());

    #[cfg(feature = "parallel")]
    let engine = RayonEngine::new();
    #[cfg(not(feature = "parallel"))]
    let engine = SequentialEngine;

    let driver = RoundDriver::builder(engine)
        .selection(Arc::new(BestSelection::count(2)))
        .replacement(Arc::new(FairReplacement))
        .pool_capacity(4)
        .rounds(10)
        .generations(50)
        .build()?;

    let outcome = driver.run(archipelago)?;

    println!("\nRound  Best        Accepted");
    for report in &outcome.reports {
        println!(
            "{:>5}  {:>10.4}  {:>8}",
            report.round,
            report.best_fitness.unwrap_or(f64::NAN),
            report.migrants_accepted
        );
    }

    println!("\nChampions:");
    for champion in outcome.champions.champions() {
        println!("  {}  {:.6}", champion.island, champion.fitness);
    }
    if let (Some(min), Some(mean)) = (outcome.champions.min(), outcome.champions.mean()) {
        println!("\nmin {min:.6}  mean {mean:.6}");
    }
    println!("evaluations {}", outcome.evaluations());

    Ok(())
}
