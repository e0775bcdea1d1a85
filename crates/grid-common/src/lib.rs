//! Common grid types shared by the regridding crates.
//!
//! Everything here is plain configuration: bounds, resolutions and the
//! regular target grids derived from them. No data arrays live here.

pub mod bbox;
pub mod domain;
pub mod error;
pub mod grid;

pub use bbox::BoundingBox;
pub use domain::{Domain, DomainCatalog};
pub use error::{GridError, GridResult};
pub use grid::{generate_regular_grid, GridSpecification};
