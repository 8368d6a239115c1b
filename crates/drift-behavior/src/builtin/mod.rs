//! Behaviors shipped with the engine.
//!
//! | Kind          | Type                    | Effect                                        |
//! |---------------|-------------------------|-----------------------------------------------|
//! | `advection`   | [`AdvectionBehavior`]   | transport by the current (Euler / RK4)        |
//! | `dispersion`  | [`DispersionBehavior`]  | horizontal turbulent random walk              |
//! | `migration`   | [`MigrationBehavior`]   | diel vertical migration (3-D only)            |
//! | `lethal_temp` | [`LethalTempBehavior`]  | cold / hot death against temperature limits   |
//! | `recruitment` | [`RecruitmentBehavior`] | recruitment after a stay in a recruitment zone |

pub mod advection;
pub mod dispersion;
pub mod lethal_temp;
pub mod migration;
pub mod recruitment;

pub use advection::AdvectionBehavior;
pub use dispersion::DispersionBehavior;
pub use lethal_temp::{LethalTable, LethalTempBehavior};
pub use migration::{ClockTime, MigrationBehavior};
pub use recruitment::{RecruitmentBehavior, RecruitmentLayer};

use crate::BehaviorRegistry;

/// Register every built-in kind.
pub fn register(registry: &mut BehaviorRegistry) {
    registry
        .register_default::<AdvectionBehavior>("advection")
        .register_default::<DispersionBehavior>("dispersion")
        .register_default::<MigrationBehavior>("migration")
        .register_default::<LethalTempBehavior>("lethal_temp")
        .register_default::<RecruitmentBehavior>("recruitment");
}
