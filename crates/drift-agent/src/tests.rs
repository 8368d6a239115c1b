//! Unit tests for drift-agent.

#[cfg(test)]
mod point {
    use drift_core::{Delta, GeoPoint, GridPos};
    use drift_field::{Dataset, RectilinearGrid, RectilinearGridBuilder};

    use crate::{AgentError, Axis, SpatialPoint};

    fn flat() -> RectilinearGrid {
        RectilinearGridBuilder::new(20, 20).build().unwrap()
    }

    fn deep() -> RectilinearGrid {
        RectilinearGridBuilder::new(20, 20)
            .levels(vec![-40.0, -30.0, -20.0, -10.0, 0.0])
            .build()
            .unwrap()
    }

    #[test]
    fn additive_deltas_accumulate() {
        let mut p = SpatialPoint::from_grid(GridPos::new(5.0, 5.0, 2.0), deep().bounds());
        p.increment(Delta::new(0.5, 0.25, 0.5), false, false).unwrap();
        p.increment(Delta::new(0.5, 0.25, 0.5), false, false).unwrap();
        assert_eq!(p.pending(), Delta::new(1.0, 0.5, 1.0));
    }

    #[test]
    fn exclusive_replaces_and_then_ignores_additions() {
        let mut p = SpatialPoint::from_grid(GridPos::new(5.0, 5.0, 2.0), deep().bounds());
        p.increment(Delta::new(0.3, 0.3, 0.3), false, false).unwrap();
        p.increment(Delta::vertical(-1.0), false, true).unwrap();
        p.increment(Delta::new(0.1, 0.1, 0.7), false, false).unwrap();
        let d = p.pending();
        assert!((d.dx - 0.4).abs() < 1e-12 && (d.dy - 0.4).abs() < 1e-12);
        assert_eq!(d.dz, -1.0);
        assert!(p.is_claimed(Axis::Vertical));
        assert!(!p.is_claimed(Axis::Horizontal));
    }

    #[test]
    fn second_exclusive_claim_is_rejected() {
        let mut p = SpatialPoint::from_grid(GridPos::xy(5.0, 5.0), flat().bounds());
        p.increment(Delta::horizontal(1.0, 0.0), true, false).unwrap();
        let err = p.increment(Delta::horizontal(0.0, 1.0), true, false).unwrap_err();
        assert!(matches!(err, AgentError::ExclusivityViolation { axis: Axis::Horizontal }));
        assert_eq!(p.pending(), Delta::horizontal(1.0, 0.0));
    }

    #[test]
    fn claims_reset_after_move() {
        let grid = deep();
        let mut p = SpatialPoint::from_grid(GridPos::new(5.0, 5.0, 1.0), grid.bounds());
        p.increment(Delta::vertical(1.0), false, true).unwrap();
        p.apply_move(&grid).unwrap();
        assert!(!p.is_claimed(Axis::Vertical));
        assert!(p.increment(Delta::vertical(1.0), false, true).is_ok());
    }

    #[test]
    fn apply_move_twice_is_a_no_op() {
        let grid = flat();
        let mut p = SpatialPoint::from_grid(GridPos::xy(5.0, 5.0), grid.bounds());
        p.increment(Delta::horizontal(1.5, -0.5), false, false).unwrap();
        p.apply_move(&grid).unwrap();
        let once = p.grid();
        p.apply_move(&grid).unwrap();
        assert_eq!(p.grid(), once);
        assert_eq!(once, GridPos::xy(6.5, 4.5));
        assert!(p.pending().is_zero());
    }

    #[test]
    fn flat_grids_ignore_vertical() {
        let grid = flat();
        let mut p = SpatialPoint::from_grid(GridPos::xy(5.0, 5.0), grid.bounds());
        p.increment(Delta::new(0.0, 0.0, 3.0), false, true).unwrap();
        p.apply_move(&grid).unwrap();
        assert_eq!(p.grid().z, 0.0);
    }

    #[test]
    fn periodic_wrap_and_depth_clamp() {
        let grid = RectilinearGridBuilder::new(10, 10)
            .periodic_x(true)
            .levels(vec![-30.0, -20.0, -10.0, 0.0])
            .build()
            .unwrap();
        let mut p = SpatialPoint::from_grid(GridPos::new(9.5, 5.0, 2.0), grid.bounds());
        p.increment(Delta::new(1.0, 0.0, 5.0), false, false).unwrap();
        p.apply_move(&grid).unwrap();
        assert!((p.grid().x - 0.5).abs() < 1e-12);
        assert_eq!(p.grid().z, 3.0);
    }

    #[test]
    fn dirty_flags_follow_changes() {
        let grid = RectilinearGridBuilder::new(20, 20)
            .origin(10.0, 40.0)
            .resolution(0.1, 0.1)
            .build()
            .unwrap();
        let mut p = SpatialPoint::from_grid(GridPos::xy(2.0, 3.0), grid.bounds());
        assert!(p.is_geo_dirty());
        let g = p.to_geo(&grid);
        assert!(!p.is_geo_dirty());
        assert!((g.lon - 10.2).abs() < 1e-9 && (g.lat - 40.3).abs() < 1e-9);

        p.set_grid(GridPos::xy(2.0, 3.0));
        assert!(!p.is_geo_dirty(), "unchanged position must not invalidate");

        p.set_geo(GeoPoint::surface(40.5, 10.5));
        assert!(p.is_grid_dirty());
        let back = p.to_grid(&grid).unwrap();
        assert!((back.x - 5.0).abs() < 1e-9 && (back.y - 5.0).abs() < 1e-9);
        assert!(!p.is_grid_dirty());

        p.increment(Delta::horizontal(1.0, 0.0), false, false).unwrap();
        p.apply_move(&grid).unwrap();
        assert!(p.is_geo_dirty());
    }

    #[test]
    fn move_after_geo_update_starts_from_the_new_position() {
        let grid = flat();
        let mut p = SpatialPoint::from_grid(GridPos::xy(4.0, 4.0), grid.bounds());
        p.set_geo(grid.grid_to_geo(GridPos::xy(6.0, 6.0)));
        p.increment(Delta::horizontal(0.5, 0.0), false, false).unwrap();
        p.apply_move(&grid).unwrap();

        assert!(!p.is_grid_dirty());
        assert!(p.is_geo_dirty());
        let g = p.grid();
        assert!((g.x - 6.5).abs() < 1e-9 && (g.y - 6.0).abs() < 1e-9, "got {g:?}");
        assert!(p.pending().is_zero());
    }

    #[test]
    fn failed_refresh_keeps_the_pending_move() {
        let grid = flat();
        let mut p = SpatialPoint::from_grid(GridPos::xy(4.0, 4.0), grid.bounds());
        p.set_geo(GeoPoint::surface(45.0, 45.0));
        p.increment(Delta::horizontal(0.5, 0.0), false, false).unwrap();
        assert!(matches!(p.apply_move(&grid), Err(AgentError::Field(_))));
        assert_eq!(p.pending(), Delta::horizontal(0.5, 0.0));
        assert!(p.is_grid_dirty() && !p.is_geo_dirty());
    }

    #[test]
    fn geo_outside_grid_fails_conversion() {
        let grid = RectilinearGridBuilder::new(10, 10).build().unwrap();
        let mut p = SpatialPoint::from_geo(GeoPoint::surface(45.0, 45.0), grid.bounds());
        assert!(matches!(p.to_grid(&grid), Err(AgentError::Field(_))));
    }
}

#[cfg(test)]
mod agent {
    use drift_core::{AgentId, GridBounds, GridPos};

    use crate::{Agent, LayerMap, MortalityCause, MortalityState};

    fn agent() -> Agent {
        let bounds = GridBounds { nx: 10, ny: 10, nz: None, periodic_x: false };
        Agent::at_grid(AgentId(0), GridPos::xy(5.0, 5.0), bounds, 1)
    }

    #[test]
    fn first_cause_wins() {
        let mut a = agent();
        assert!(a.kill(MortalityCause::Beached));
        assert!(!a.kill(MortalityCause::TooOld));
        assert_eq!(a.state(), MortalityState::Dead(MortalityCause::Beached));
        assert_eq!(a.state().code(), 2);
    }

    #[test]
    fn lock_is_explicit() {
        let mut a = agent();
        a.lock();
        assert!(a.is_locked());
        a.unlock();
        assert!(!a.is_locked());
    }

    #[derive(Clone, Debug, PartialEq)]
    struct Stage(u8);

    #[test]
    fn layers_are_typed_and_cloned() {
        let mut a = agent();
        assert!(a.layers.insert(Stage(1)).is_none());
        if let Some(s) = a.layers.get_mut::<Stage>() {
            s.0 = 2;
        }
        let copy = a.clone();
        a.layers.insert(Stage(3));
        assert_eq!(copy.layers.get::<Stage>(), Some(&Stage(2)));
        assert_eq!(a.layers.remove::<Stage>(), Some(Stage(3)));
        assert!(!a.layers.contains::<Stage>());
        assert!(LayerMap::new().get::<u32>().is_none());
    }

    #[derive(Clone, Debug, Default, PartialEq)]
    struct Counter(u32);

    #[test]
    fn layer_mut_creates_on_first_access() {
        let mut a = agent();
        assert!(a.layer::<Counter>().is_none());
        a.layer_mut::<Counter>().0 += 1;
        a.layer_mut::<Counter>().0 += 1;
        assert_eq!(a.layer::<Counter>(), Some(&Counter(2)));
    }
}

#[cfg(test)]
mod population {
    use drift_core::{AgentId, GridBounds, GridPos};
    use drift_field::{Dataset, RectilinearGridBuilder};

    use crate::{Agent, AgentResult, MortalityCause, Population};

    fn population(n: u32) -> Population {
        let bounds = GridBounds { nx: 100, ny: 100, nz: None, periodic_x: false };
        (0..n)
            .map(|i| Agent::at_grid(AgentId(i), GridPos::xy(50.0, 50.0), bounds, 9))
            .collect()
    }

    fn jitter(a: &mut Agent, grid: &dyn Dataset) -> AgentResult<()> {
        let d = drift_core::Delta::horizontal(a.rng.symmetric(), a.rng.symmetric());
        a.position.increment(d, false, false)?;
        a.position.apply_move(grid)?;
        if a.rng.unit() < 0.1 {
            a.kill(MortalityCause::Unspecified);
        }
        Ok(())
    }

    fn run(threshold: usize) -> Vec<(GridPos, bool)> {
        let grid = RectilinearGridBuilder::new(100, 100).build().unwrap();
        let mut pop = population(3_000);
        for _ in 0..5 {
            pop.step(threshold, |a| jitter(a, &grid)).unwrap();
        }
        pop.iter().map(|a| (a.grid(), a.is_alive())).collect()
    }

    #[test]
    fn partitioning_does_not_change_results() {
        let reference = run(usize::MAX);
        assert_eq!(run(1), reference);
        assert_eq!(run(7), reference);
        assert_eq!(run(1_000), reference);
    }

    #[cfg(feature = "parallel")]
    #[test]
    fn thread_count_does_not_change_results() {
        let reference = run(64);
        let pool = rayon::ThreadPoolBuilder::new().num_threads(3).build().unwrap();
        assert_eq!(pool.install(|| run(64)), reference);
    }

    #[cfg(feature = "parallel")]
    #[test]
    fn slice_at_the_threshold_runs_on_one_thread() {
        use std::sync::Mutex;

        let seen = Mutex::new(Vec::new());
        let pool = rayon::ThreadPoolBuilder::new().num_threads(4).build().unwrap();
        let mut pop = population(64);
        pool.install(|| {
            pop.step(64, |_| {
                seen.lock().unwrap().push(std::thread::current().id());
                Ok::<(), ()>(())
            })
        })
        .unwrap();

        let mut seen = seen.into_inner().unwrap();
        assert_eq!(seen.len(), 64);
        seen.dedup();
        assert_eq!(seen.len(), 1);
    }

    #[test]
    fn dead_agents_are_skipped() {
        let mut pop = population(10);
        pop.get_mut(AgentId(3)).unwrap().kill(MortalityCause::Hot);
        pop.step(4, |a| {
            a.age_secs += 1.0;
            Ok::<(), ()>(())
        })
        .unwrap();
        assert_eq!(pop.get(AgentId(3)).unwrap().age_secs, 0.0);
        assert_eq!(pop.get(AgentId(4)).unwrap().age_secs, 1.0);
        assert_eq!(pop.living_count(), 9);
    }

    #[test]
    fn lowest_failing_index_is_reported() {
        for threshold in [1, 3, 100] {
            let mut pop = population(50);
            let err = pop
                .step(threshold, |a| if a.id.0 % 17 == 16 { Err(a.id.0) } else { Ok(()) })
                .unwrap_err();
            assert_eq!(err, 16, "threshold {threshold}");
        }
    }
}

#[cfg(test)]
mod builder {
    use drift_core::{AgentId, GeoPoint, GridPos};
    use drift_field::RectilinearGridBuilder;

    use crate::PopulationBuilder;

    #[test]
    fn skips_land_and_out_of_domain() {
        let grid = RectilinearGridBuilder::new(10, 10)
            .land_where(|i, _| i >= 8)
            .build()
            .unwrap();
        let mut b = PopulationBuilder::new(1);
        b.add_grid(GridPos::xy(2.0, 2.0));
        b.add_grid(GridPos::xy(9.0, 2.0));
        b.add_geo(GeoPoint::surface(40.0, 40.0));
        b.add_geo(GeoPoint::surface(0.05, 0.04));
        let pop = b.build(&grid);

        assert_eq!(pop.len(), 2);
        assert_eq!(pop.agents()[1].id, AgentId(1));
        let p = pop.agents()[1].grid();
        assert!((p.x - 4.0).abs() < 1e-9 && (p.y - 5.0).abs() < 1e-9);
        assert!(!pop.agents()[0].position.is_geo_dirty());
    }
}
