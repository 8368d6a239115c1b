//! Random release inside a zone.

use tracing::info;

use drift_agent::PopulationBuilder;
use drift_core::{GridPos, SimRng};
use drift_field::{Dataset, Zone};

use crate::{ReleaseError, ReleaseResult};

/// Draws per requested agent before the zone is declared too sparse.
pub const MAX_DRAWS_PER_AGENT: usize = 1_000;

/// Add `n` positions drawn uniformly inside `zone` to `builder`.
///
/// Candidates are drawn in the zone's bounding box and kept if they pass
/// the zone's full membership test.  On 3-D grids the depth is drawn
/// uniformly within the zone's depth band, or between the surface and the
/// bottom when the zone has none; bands reaching below the bottom are cut at
/// the bottom.
pub fn release_in_zone(
    zone:    &Zone,
    dataset: &dyn Dataset,
    n:       usize,
    rng:     &mut SimRng,
    builder: &mut PopulationBuilder,
) -> ReleaseResult<usize> {
    let [xmin, ymin, xmax, ymax] = zone.bounding_box();
    let is_3d = dataset.is_3d();
    let max_draws = n.saturating_mul(MAX_DRAWS_PER_AGENT);

    let mut placed = 0;
    let mut draws = 0;
    while placed < n {
        if draws >= max_draws {
            return Err(ReleaseError::ZoneTooSparse { key: zone.key.clone(), placed, requested: n });
        }
        draws += 1;

        let x = xmin + rng.unit() * (xmax - xmin);
        let y = ymin + rng.unit() * (ymax - ymin);
        let column = GridPos::xy(x, y);
        if !zone.contains(x, y) || !dataset.is_in_water(column) {
            continue;
        }

        let (p, depth) = if is_3d {
            let bottom = dataset.depth_of_level(column);
            let (upper, lower) = zone.depth_band().unwrap_or((0.0, bottom.abs()));
            let lower = lower.min(bottom.abs());
            if upper > lower {
                continue;
            }
            let depth = -(upper + rng.unit() * (lower - upper));
            (GridPos::new(x, y, dataset.level_of_depth(x, y, depth)), depth)
        } else {
            (column, 0.0)
        };

        if zone.contains_3d(dataset, p, depth) {
            builder.add_grid(p);
            placed += 1;
        }
    }

    info!(zone = %zone.key, released = placed, draws, "zone release");
    Ok(placed)
}
