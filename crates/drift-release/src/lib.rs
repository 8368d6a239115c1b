//! `drift-release`: where agents start.
//!
//! # Crate layout
//!
//! | Module    | Contents                                                         |
//! |-----------|------------------------------------------------------------------|
//! | [`file`]  | `ReleasePoint`, CSV point-file loader (grid or geographic)       |
//! | [`zone`]  | `release_in_zone`: random positions inside a release zone        |
//! | [`error`] | `ReleaseError`, `ReleaseResult<T>`                               |
//!
//! Both paths only collect positions into a `PopulationBuilder`; resolving
//! them against the dataset and assigning ids happens in
//! `PopulationBuilder::build`.

pub mod error;
pub mod file;
pub mod zone;


pub use error::{ReleaseError, ReleaseResult};
pub use file::{ReleasePoint, load_release_csv, load_release_reader};
pub use zone::release_in_zone;
