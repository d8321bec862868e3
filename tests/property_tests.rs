//! Property-based tests for archipelago-evo
//!
//! Uses proptest to verify the invariants of selection, replacement, migrant
//! pools and topology generators.

use archipelago_evo::prelude::*;
use proptest::prelude::*;

fn population(fitness: &[f64]) -> Population {
    fitness
        .iter()
        .enumerate()
        .map(|(i, &f)| Individual::new(vec![i as f64, f], f))
        .collect()
}

fn migrants(fitness: &[f64], source: &str) -> Vec<Migrant> {
    fitness
        .iter()
        .map(|&f| Migrant::new(vec![-1.0, f], f, IslandId::from(source)))
        .collect()
}

fn build(kind: GeneratorKind, params: &TopologyParams) -> Topology {
    let factory = TopologyFactory::new(1);
    let (topology, _) = factory
        .build_kind(kind, params, &IslandConstructor::Shared(()))
        .unwrap()
        .into_parts();
    topology.as_ref().clone()
}

proptest! {
    // ==================== Selection Properties ====================

    #[test]
    fn best_selection_returns_k_best_in_order(
        fitness in prop::collection::vec(-100.0..100.0f64, 1..40),
        k_seed in 0usize..40
    ) {
        let pop = population(&fitness);
        let k = k_seed % (fitness.len() + 1);
        let selected = BestSelection::count(k).select(&pop, &IslandId::from("src"));

        prop_assert_eq!(selected.len(), k);
        for pair in selected.windows(2) {
            prop_assert!(pair[0].fitness() <= pair[1].fitness());
        }

        // every selected fitness <= every unselected fitness
        let worst_selected = selected.last().map(|m| m.fitness()).unwrap_or(f64::NEG_INFINITY);
        let mut sorted = fitness.clone();
        sorted.sort_by(f64::total_cmp);
        for &f in &sorted[k..] {
            prop_assert!(worst_selected <= f);
        }
        prop_assert!(selected.iter().all(|m| m.source().as_str() == "src"));
    }

    #[test]
    fn fraction_selection_takes_floor(
        fitness in prop::collection::vec(0.0..10.0f64, 1..50),
        fraction in 0.0..=1.0f64
    ) {
        let pop = population(&fitness);
        let selected = BestSelection::fraction(fraction)
            .unwrap()
            .select(&pop, &IslandId::from("src"));
        let expected = ((fitness.len() as f64) * fraction).floor() as usize;
        prop_assert_eq!(selected.len(), expected);
    }

    // ==================== Replacement Properties ====================

    #[test]
    fn fair_replacement_never_worsens_a_slot(
        local in prop::collection::vec(-50.0..50.0f64, 1..30),
        incoming in prop::collection::vec(-50.0..50.0f64, 0..30)
    ) {
        let mut pop = population(&local);
        let applied = FairReplacement
            .replace(&mut pop, migrants(&incoming, "peer"))
            .unwrap();

        prop_assert_eq!(applied.len(), incoming.len().min(local.len()));
        for (slot, &before) in local.iter().enumerate() {
            prop_assert!(pop[slot].fitness <= before);
        }
        for a in &applied {
            if a.replaced {
                prop_assert!(a.migrant_fitness < a.previous_fitness);
                prop_assert_eq!(pop[a.slot].fitness, a.migrant_fitness);
                prop_assert!(a.delta > 0.0);
            } else {
                prop_assert!(a.migrant_fitness >= a.previous_fitness);
                prop_assert_eq!(pop[a.slot].fitness, a.previous_fitness);
            }
        }
    }

    #[test]
    fn repeated_replacement_is_monotone_per_slot(
        local in prop::collection::vec(-10.0..10.0f64, 2..20),
        batches in prop::collection::vec(prop::collection::vec(-10.0..10.0f64, 0..6), 1..8)
    ) {
        let mut pop = population(&local);
        let mut previous: Vec<f64> = local.clone();
        for batch in &batches {
            FairReplacement.replace(&mut pop, migrants(batch, "peer")).unwrap();
            for (slot, before) in previous.iter_mut().enumerate() {
                prop_assert!(pop[slot].fitness <= *before);
                *before = pop[slot].fitness;
            }
        }
    }

    // ==================== Pool Properties ====================

    #[test]
    fn pool_keeps_best_regardless_of_order(
        fitness in prop::collection::vec(-100.0..100.0f64, 1..60),
        capacity in 1usize..20
    ) {
        let mut forward = MigrantPool::new(capacity);
        let mut backward = MigrantPool::new(capacity);
        for m in migrants(&fitness, "a") {
            forward.push(m);
        }
        for m in migrants(&fitness, "a").into_iter().rev() {
            backward.push(m);
        }

        let mut sorted = fitness.clone();
        sorted.sort_by(f64::total_cmp);
        sorted.truncate(capacity);

        let forward: Vec<f64> = forward.drain().iter().map(Migrant::fitness).collect();
        let backward: Vec<f64> = backward.drain().iter().map(Migrant::fitness).collect();
        prop_assert_eq!(&forward, &sorted);
        prop_assert_eq!(&backward, &sorted);
    }

    #[test]
    fn pool_drain_keeps_capacity(
        fitness in prop::collection::vec(-1.0..1.0f64, 0..20),
        capacity in 1usize..10
    ) {
        let mut pool = MigrantPool::new(capacity);
        for m in migrants(&fitness, "a") {
            pool.push(m);
        }
        prop_assert!(pool.len() <= capacity);
        pool.drain();
        prop_assert!(pool.is_empty());
        prop_assert_eq!(pool.capacity(), capacity);
    }

    // ==================== Topology Properties ====================

    #[test]
    fn bidir_ring_has_degree_two(n in 3usize..40) {
        let topology = build(GeneratorKind::BidirRing, &TopologyParams::with_islands(n));
        prop_assert_eq!(topology.len(), n);
        for id in topology.island_ids() {
            prop_assert_eq!(topology.degree(id), 2);
        }
    }

    #[test]
    fn one_way_ring_has_one_in_one_out(n in 2usize..40) {
        let topology = build(GeneratorKind::OneWayRing, &TopologyParams::with_islands(n));
        prop_assert!(topology.is_directed());
        for id in topology.island_ids() {
            prop_assert_eq!(topology.out_degree(id), 1);
            prop_assert_eq!(topology.in_degree(id), 1);
        }
    }

    #[test]
    fn rim_hub_reaches_everyone(n in 4usize..30, hub_seed in 0usize..30) {
        let params = TopologyParams {
            hub: hub_seed % n,
            ..TopologyParams::with_islands(n)
        };
        let topology = build(GeneratorKind::Rim, &params);
        let hub = topology.hub().unwrap().clone();
        prop_assert_eq!(topology.degree(&hub), n - 1);
        for id in topology.island_ids().iter().filter(|id| **id != hub) {
            prop_assert_eq!(topology.degree(id), 3);
        }
    }

    #[test]
    fn undirected_generators_are_symmetric(
        n in 4usize..20,
        p in 0.0..1.0f64,
        seed in any::<u64>()
    ) {
        let params = TopologyParams {
            p,
            seed: Some(seed),
            ..TopologyParams::with_islands(n)
        };
        for kind in [
            GeneratorKind::ErdosRenyi,
            GeneratorKind::WattsStrogatz,
            GeneratorKind::Complete,
        ] {
            let topology = build(kind, &params);
            for (a, b) in topology.edges() {
                prop_assert!(topology.outgoing(b).contains(&a));
            }
        }
    }
}
