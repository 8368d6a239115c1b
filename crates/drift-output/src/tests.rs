//! Integration tests for drift-output.

#[cfg(test)]
mod csv_tests {
    use tempfile::TempDir;

    use drift_agent::MortalityCause;

    use crate::csv::{CsvWriter, MORTALITY_FILE, TRAJECTORY_FILE};
    use crate::row::{AgentStatus, MortalityRow, TrajectoryRow};
    use crate::writer::OutputWriter;

    fn tmp() -> TempDir {
        tempfile::tempdir().expect("create temp dir")
    }

    fn trajectory_row(agent_id: u32, tick: u64) -> TrajectoryRow {
        TrajectoryRow {
            tick,
            time:     tick as f64 * 3600.0,
            agent_id,
            lon:      3.25,
            lat:      43.5,
            depth:    -12.0,
            age_secs: tick as f64 * 3600.0,
            status:   AgentStatus::Alive,
        }
    }

    fn headers(path: &std::path::Path) -> Vec<String> {
        let mut rdr = csv::Reader::from_path(path).unwrap();
        rdr.headers().unwrap().iter().map(str::to_owned).collect()
    }

    #[test]
    fn csv_files_created_with_headers() {
        let dir = tmp();
        let mut w = CsvWriter::new(dir.path()).unwrap();
        w.finish().unwrap();
        assert_eq!(
            headers(&dir.path().join(TRAJECTORY_FILE)),
            ["tick", "time", "agent", "lon", "lat", "depth", "age", "status"]
        );
        assert_eq!(headers(&dir.path().join(MORTALITY_FILE)), ["tick", "agent", "cause"]);
    }

    #[test]
    fn missing_output_directory_is_created() {
        let dir = tmp();
        let nested = dir.path().join("run").join("a");
        let _w = CsvWriter::new(&nested).unwrap();
        assert!(nested.join(TRAJECTORY_FILE).exists());
    }

    #[test]
    fn trajectory_rows_are_written() {
        let dir = tmp();
        let mut w = CsvWriter::new(dir.path()).unwrap();
        let mut last = trajectory_row(2, 5);
        last.status = AgentStatus::Dead(MortalityCause::Cold);
        w.write_trajectories(&[trajectory_row(0, 5), trajectory_row(1, 5), last]).unwrap();
        w.finish().unwrap();

        let mut rdr = csv::Reader::from_path(dir.path().join(TRAJECTORY_FILE)).unwrap();
        let rows: Vec<_> = rdr.records().map(|r| r.unwrap()).collect();
        assert_eq!(rows.len(), 3);
        assert_eq!(&rows[0][0], "5");         // tick
        assert_eq!(&rows[0][1], "18000");     // time
        assert_eq!(&rows[1][2], "1");         // agent
        assert_eq!(&rows[0][3], "3.250000");  // lon
        assert_eq!(&rows[0][5], "-12.00");    // depth
        assert_eq!(&rows[0][7], "alive");
        assert_eq!(&rows[2][7], "dead:cold");
    }

    #[test]
    fn mortality_rows_are_written() {
        let dir = tmp();
        let mut w = CsvWriter::new(dir.path()).unwrap();
        w.write_mortality(&MortalityRow { tick: 7, agent_id: 3, cause: MortalityCause::OutOfDomain })
            .unwrap();
        w.finish().unwrap();

        let mut rdr = csv::Reader::from_path(dir.path().join(MORTALITY_FILE)).unwrap();
        let rows: Vec<_> = rdr.records().map(|r| r.unwrap()).collect();
        assert_eq!(rows.len(), 1);
        assert_eq!(&rows[0][0], "7");
        assert_eq!(&rows[0][1], "3");
        assert_eq!(&rows[0][2], "out_of_domain");
    }

    #[test]
    fn csv_finish_idempotent() {
        let dir = tmp();
        let mut w = CsvWriter::new(dir.path()).unwrap();
        w.finish().unwrap();
        w.finish().unwrap();
    }

    #[test]
    fn csv_empty_batch_ok() {
        let dir = tmp();
        let mut w = CsvWriter::new(dir.path()).unwrap();
        w.write_trajectories(&[]).unwrap();
    }
}

#[cfg(test)]
mod tracker_tests {
    use drift_agent::{MortalityCause, PopulationBuilder};
    use drift_behavior::{BehaviorPipeline, BehaviorRegistry, ParameterBlock, SetupContext, SystemSettings};
    use drift_core::{Delta, GridPos, SimConfig, Tick};
    use drift_field::{RectilinearGrid, RectilinearGridBuilder, ZoneSet};
    use drift_sim::{SimBuilder, SimObserver, Simulation};
    use drift_transport::CoastlinePolicy;

    use crate::csv::{MORTALITY_FILE, TRAJECTORY_FILE};
    use crate::{CsvTracker, MortalityRow, OutputError, OutputResult, OutputWriter, Tracker, TrajectoryRow};

    /// 20 × 20 grid at 0.1° from (10°E, 40°N), land for `i >= 15`, with an
    /// eastward current of one cell per hour.
    fn shore() -> RectilinearGrid {
        RectilinearGridBuilder::new(20, 20)
            .origin(10.0, 40.0)
            .resolution(0.1, 0.1)
            .land_where(|i, _| i >= 15)
            .velocity(|_, _| Delta::horizontal(1.0 / 3600.0, 0.0))
            .build()
            .unwrap()
    }

    fn sim() -> Simulation<RectilinearGrid> {
        let config = SimConfig {
            dt_secs:                 3600.0,
            transport_duration_secs: 6.0 * 3600.0,
            seed:                    1,
            num_threads:             Some(1),
            output_interval_ticks:   2,
            ..SimConfig::default()
        };
        let grid = shore();
        let zones = ZoneSet::empty();
        let blocks = [ParameterBlock::new("currents", "advection").with("scheme", "euler")];
        let pipeline = BehaviorPipeline::build(
            &blocks,
            &BehaviorRegistry::with_builtins(),
            &SetupContext::new(&grid, &zones, &config),
            SystemSettings::from_config(&config, CoastlinePolicy::Beaching),
        )
        .unwrap();

        let mut release = PopulationBuilder::new(config.seed);
        release.add_grid(GridPos::xy(12.0, 5.0));
        release.add_grid(GridPos::xy(2.0, 5.0));
        let population = release.build(&grid);

        SimBuilder::new(config, grid, population, pipeline).build().unwrap()
    }

    #[test]
    fn tracks_trajectories_and_deaths() {
        let dir = tempfile::tempdir().unwrap();
        let mut tracker = CsvTracker::create(dir.path()).unwrap();
        let mut sim = sim();
        sim.run(&mut tracker).unwrap();
        assert!(tracker.take_error().is_none(), "no write errors expected");
        assert_eq!(tracker.deaths(), 1);

        // Snapshots at ticks 0, 2, 4, 6 for two agents.
        let mut rdr = csv::Reader::from_path(dir.path().join(TRAJECTORY_FILE)).unwrap();
        let rows: Vec<_> = rdr.records().map(|r| r.unwrap()).collect();
        assert_eq!(rows.len(), 8);

        assert_eq!(&rows[0][0], "0");
        assert_eq!(&rows[1][2], "1");
        assert_eq!(&rows[1][3], "10.200000");
        assert_eq!(&rows[1][4], "40.500000");
        assert_eq!(&rows[7][3], "10.800000");
        assert_eq!(&rows[7][6], "21600");

        // The eastern agent reaches land on its third step.
        assert_eq!(&rows[2][0], "2");
        assert_eq!(&rows[2][7], "alive");
        assert_eq!(&rows[4][7], "dead:beached");
        assert_eq!(&rows[5][7], "alive");

        let mut rdr = csv::Reader::from_path(dir.path().join(MORTALITY_FILE)).unwrap();
        let deaths: Vec<_> = rdr.records().map(|r| r.unwrap()).collect();
        assert_eq!(deaths.len(), 1);
        assert_eq!(&deaths[0][0], "2");
        assert_eq!(&deaths[0][1], "0");
        assert_eq!(&deaths[0][2], "beached");
    }

    /// Fails every write after the first `ok` calls.
    struct Flaky {
        ok:    usize,
        calls: usize,
    }

    impl Flaky {
        fn check(&mut self) -> OutputResult<()> {
            self.calls += 1;
            if self.calls > self.ok {
                let kind = if self.calls == self.ok + 1 {
                    std::io::ErrorKind::StorageFull
                } else {
                    std::io::ErrorKind::BrokenPipe
                };
                return Err(OutputError::Io(kind.into()));
            }
            Ok(())
        }
    }

    impl OutputWriter for Flaky {
        fn write_trajectories(&mut self, _rows: &[TrajectoryRow]) -> OutputResult<()> {
            self.check()
        }

        fn write_mortality(&mut self, _row: &MortalityRow) -> OutputResult<()> {
            self.check()
        }

        fn finish(&mut self) -> OutputResult<()> {
            self.check()
        }
    }

    #[test]
    fn first_write_error_is_kept() {
        let mut tracker = Tracker::new(Flaky { ok: 1, calls: 0 });
        let mut sim = sim();
        sim.run(&mut tracker).unwrap();
        match tracker.take_error() {
            Some(OutputError::Io(e)) => assert_eq!(e.kind(), std::io::ErrorKind::StorageFull),
            other => panic!("unexpected: {other:?}"),
        }
        assert!(tracker.take_error().is_none());
        assert!(tracker.into_writer().calls > 2);
    }

    #[test]
    fn deaths_are_counted_without_snapshots() {
        let mut tracker = Tracker::new(Flaky { ok: usize::MAX, calls: 0 });
        tracker.on_agent_killed(
            Tick(4),
            sim().population().get(drift_core::AgentId(1)).unwrap(),
            MortalityCause::Hot,
        );
        assert_eq!(tracker.deaths(), 1);
        assert_eq!(tracker.into_writer().calls, 1);
    }
}
