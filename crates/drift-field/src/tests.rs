//! Unit tests for drift-field.

#[cfg(test)]
mod grid {
    use drift_core::{Delta, GeoPoint, GridPos};

    use crate::{Dataset, FieldError, RectilinearGridBuilder};

    fn coastal() -> crate::RectilinearGrid {
        RectilinearGridBuilder::new(20, 10)
            .origin(-5.0, 43.0)
            .resolution(0.1, 0.1)
            .land_where(|i, _| i >= 15)
            .velocity(|p, _| Delta::horizontal(1e-4 * p.y, 0.0))
            .scalar("temp", |p, _| 10.0 + p.x)
            .build()
            .unwrap()
    }

    #[test]
    fn land_mask_rounds_to_nearest_cell() {
        let g = coastal();
        assert!(g.is_in_water(GridPos::xy(14.4, 5.0)));
        assert!(!g.is_in_water(GridPos::xy(14.5, 5.0)));
        assert!(!g.is_in_water(GridPos::xy(-1.0, 5.0)));
        assert!(!g.is_in_water(GridPos::xy(f64::NAN, 5.0)));
    }

    #[test]
    fn edge_ring() {
        let g = coastal();
        assert!(g.is_on_edge(GridPos::xy(0.5, 5.0)));
        assert!(g.is_on_edge(GridPos::xy(18.5, 5.0)));
        assert!(g.is_on_edge(GridPos::xy(5.0, 8.5)));
        assert!(!g.is_on_edge(GridPos::xy(5.0, 5.0)));
    }

    #[test]
    fn velocity_out_of_domain() {
        let g = coastal();
        assert_eq!(g.velocity(GridPos::xy(3.0, 2.0), 0.0).unwrap(), Delta::horizontal(2e-4, 0.0));
        let err = g.velocity(GridPos::xy(3.0, 9.5), 0.0).unwrap_err();
        assert!(err.is_out_of_domain());
    }

    #[test]
    fn scalar_lookup() {
        let g = coastal();
        assert_eq!(g.sample("temp", GridPos::xy(2.0, 2.0), 0.0).unwrap(), 12.0);
        assert!(matches!(
            g.sample("salt", GridPos::xy(2.0, 2.0), 0.0),
            Err(FieldError::UnknownVariable(_))
        ));
    }

    #[test]
    fn geo_grid_roundtrip() {
        let g = coastal();
        let geo = g.grid_to_geo(GridPos::xy(4.0, 3.0));
        assert!((geo.lon - -4.6).abs() < 1e-9);
        assert!((geo.lat - 43.3).abs() < 1e-9);
        let back = g.geo_to_grid(geo).unwrap();
        assert!((back.x - 4.0).abs() < 1e-9 && (back.y - 3.0).abs() < 1e-9);

        let far = GeoPoint::surface(50.0, -4.6);
        assert!(g.geo_to_grid(far).unwrap_err().is_out_of_domain());
    }

    #[test]
    fn cell_size_shrinks_with_latitude() {
        let g = RectilinearGridBuilder::new(4, 40)
            .origin(0.0, 0.0)
            .resolution(1.0, 2.0)
            .build()
            .unwrap();
        let (dx_eq, dy_eq) = g.cell_size(0, 0);
        let (dx_60, _) = g.cell_size(0, 30);
        assert!((dx_eq - 111_195.0).abs() < 500.0, "got {dx_eq}");
        assert!((dy_eq - 222_390.0).abs() < 1_000.0, "got {dy_eq}");
        assert!((dx_60 / dx_eq - 0.5).abs() < 0.01);
    }

    #[test]
    fn metric_velocity_is_converted_to_cells() {
        let g = RectilinearGridBuilder::new(5, 5)
            .resolution(0.01, 0.01)
            .velocity_metric(|_, _| Delta::horizontal(1.0, 0.0))
            .build()
            .unwrap();
        let (dx, _) = g.cell_size(2, 2);
        let v = g.velocity(GridPos::xy(2.0, 2.0), 0.0).unwrap();
        assert!((v.dx - 1.0 / dx).abs() < 1e-12);
    }

    #[test]
    fn periodic_x_wraps() {
        let g = RectilinearGridBuilder::new(10, 5)
            .periodic_x(true)
            .land_cell(0, 2)
            .build()
            .unwrap();
        assert!(!g.is_in_water(GridPos::xy(10.2, 2.0)));
        assert!(g.velocity(GridPos::xy(12.0, 2.0), 0.0).is_ok());
        assert!(!g.is_on_edge(GridPos::xy(0.2, 2.0)));
    }

    #[test]
    fn vertical_levels() {
        let g = RectilinearGridBuilder::new(5, 5)
            .levels(vec![-100.0, -50.0, -10.0, 0.0])
            .build()
            .unwrap();
        assert!(g.is_3d());
        assert_eq!(g.depth_of_level(GridPos::new(1.0, 1.0, 1.5)), -30.0);
        assert!((g.level_of_depth(1.0, 1.0, -30.0) - 1.5).abs() < 1e-12);
        assert_eq!(g.level_of_depth(1.0, 1.0, -500.0), 0.0);
        assert_eq!(g.level_of_depth(1.0, 1.0, 5.0), 3.0);
    }

    #[test]
    fn rejects_bad_grids() {
        assert!(RectilinearGridBuilder::new(2, 10).build().is_err());
        assert!(RectilinearGridBuilder::new(5, 5).resolution(0.0, 1.0).build().is_err());
        assert!(RectilinearGridBuilder::new(5, 5).levels(vec![0.0, -10.0]).build().is_err());
    }
}

#[cfg(test)]
mod zone {
    use drift_core::{GridPos, ZoneId};

    use crate::{Dataset, RectilinearGrid, RectilinearGridBuilder, Zone, ZoneError, ZoneKind, ZoneSet};

    fn open_sea() -> RectilinearGrid {
        RectilinearGridBuilder::new(20, 20)
            .levels(vec![-200.0, -100.0, -50.0, 0.0])
            .bathymetry(|i, _| 10.0 * i as f64)
            .build()
            .unwrap()
    }

    fn square(id: u16) -> crate::ZoneBuilder {
        Zone::builder("square", ZoneKind::Release, ZoneId(id))
            .grid_vertex(0.0, 0.0)
            .grid_vertex(0.0, 10.0)
            .grid_vertex(10.0, 10.0)
            .grid_vertex(10.0, 0.0)
    }

    #[test]
    fn square_containment() {
        let g = open_sea();
        let z = square(0).init(&g).unwrap();
        assert!(z.contains(5.0, 5.0));
        assert!(!z.contains(15.0, 5.0));
        assert!(z.contains(0.0, 0.0));
        assert_eq!(z.polygon().len(), 5);
        assert_eq!(z.bounding_box(), [0.0, 0.0, 10.0, 10.0]);
    }

    #[test]
    fn triangle_containment() {
        let g = open_sea();
        let z = Zone::builder("tri", ZoneKind::Target, ZoneId(0))
            .grid_vertex(2.0, 2.0)
            .grid_vertex(12.0, 2.0)
            .grid_vertex(2.0, 12.0)
            .init(&g)
            .unwrap();
        assert!(z.contains(4.0, 4.0));
        assert!(!z.contains(9.0, 9.0));
    }

    #[test]
    fn depth_band_is_inclusive() {
        let g = open_sea();
        let z = square(0).depth_band(10.0, 50.0).init(&g).unwrap();
        let p = GridPos::new(5.0, 5.0, 2.0);
        assert!(z.contains_3d(&g, p, -10.0));
        assert!(z.contains_3d(&g, p, -50.0));
        assert!(!z.contains_3d(&g, p, -60.0));
        assert!(!z.contains_3d(&g, p, -5.0));
    }

    #[test]
    fn bathy_band_is_strict() {
        let g = open_sea();
        let z = square(0).bathy_band(20.0, 60.0).init(&g).unwrap();
        assert!(!z.contains_3d(&g, GridPos::xy(2.0, 5.0), 0.0));
        assert!(z.contains_3d(&g, GridPos::xy(3.0, 5.0), 0.0));
        assert!(!z.contains_3d(&g, GridPos::xy(6.0, 5.0), 0.0));
    }

    #[test]
    fn land_is_never_inside() {
        let g = RectilinearGridBuilder::new(20, 20).land_cell(5, 5).build().unwrap();
        let z = square(0).init(&g).unwrap();
        assert!(!z.contains_3d(&g, GridPos::xy(5.0, 5.0), 0.0));
        assert!(z.contains_3d(&g, GridPos::xy(6.0, 5.0), 0.0));
    }

    #[test]
    fn invariants_checked_at_init() {
        let g = open_sea();
        assert!(matches!(
            square(0).depth_band(50.0, 10.0).init(&g),
            Err(ZoneError::InvertedDepthBand { .. })
        ));
        assert!(matches!(
            square(0).bathy_band(60.0, 20.0).init(&g),
            Err(ZoneError::InvertedBathyBand { .. })
        ));
        assert!(matches!(
            Zone::builder("line", ZoneKind::Release, ZoneId(0))
                .grid_vertex(0.0, 0.0)
                .grid_vertex(1.0, 1.0)
                .init(&g),
            Err(ZoneError::TooFewVertices { count: 2, .. })
        ));
        assert!(matches!(
            square(0).grid_vertex(40.0, 0.0).init(&g),
            Err(ZoneError::VertexOutOfDomain { index: 4, .. })
        ));
    }

    #[test]
    fn geo_vertices_are_converted() {
        let g = RectilinearGridBuilder::new(20, 20)
            .origin(-5.0, 43.0)
            .resolution(0.1, 0.1)
            .build()
            .unwrap();
        let z = Zone::builder("bay", ZoneKind::Recruitment, ZoneId(0))
            .geo_vertex(43.0, -5.0)
            .geo_vertex(44.0, -5.0)
            .geo_vertex(44.0, -4.0)
            .geo_vertex(43.0, -4.0)
            .init(&g)
            .unwrap();
        let [x0, y0, x1, y1] = z.bounding_box();
        assert!(x0.abs() < 1e-9 && y0.abs() < 1e-9);
        assert!((x1 - 10.0).abs() < 1e-9 && (y1 - 10.0).abs() < 1e-9);
    }

    #[test]
    fn area_counts_water_cells() {
        let g = RectilinearGridBuilder::new(20, 20)
            .resolution(0.01, 0.01)
            .land_where(|i, _| i >= 8)
            .build()
            .unwrap();
        let z = Zone::builder("box", ZoneKind::Target, ZoneId(0))
            .grid_vertex(1.5, 1.5)
            .grid_vertex(1.5, 3.5)
            .grid_vertex(9.5, 3.5)
            .grid_vertex(9.5, 1.5)
            .init(&g)
            .unwrap();
        // Cell centres i in 2..=9, j in 2..=3; land from i = 8 leaves 6 x 2.
        let (dx, dy) = g.cell_size(2, 2);
        let expected = 12.0 * dx * dy * 1e-6;
        assert!((z.area_km2(&g) - expected).abs() < 1e-6 * expected);
    }

    #[test]
    fn zone_set_queries() {
        let g = open_sea();
        let a = square(0).init(&g).unwrap();
        let b = Zone::builder("east", ZoneKind::Recruitment, ZoneId(1))
            .grid_vertex(8.0, 0.0)
            .grid_vertex(8.0, 10.0)
            .grid_vertex(18.0, 10.0)
            .grid_vertex(18.0, 0.0)
            .init(&g)
            .unwrap();
        let set = ZoneSet::new(vec![a, b]);

        let keys: Vec<&str> = set.zones_at(9.0, 5.0).iter().map(|z| z.key.as_str()).collect();
        assert_eq!(keys, ["square", "east"]);
        assert!(set.zones_at(19.0, 15.0).is_empty());
        assert_eq!(set.by_kind(ZoneKind::Recruitment).count(), 1);
        assert_eq!(set.by_key("east").map(|z| z.id), Some(ZoneId(1)));

        let found = set.find_containing(ZoneKind::Recruitment, &g, GridPos::xy(9.0, 5.0), 0.0);
        assert_eq!(found.map(|z| z.id), Some(ZoneId(1)));
        assert!(g.is_in_water(GridPos::xy(9.0, 5.0)));
    }
}
