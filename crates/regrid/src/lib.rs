//! Regridding of satellite fields onto regular lat/lon grids
//!
//! This crate moves 2D geophysical fields (satellite channels, cloud masks,
//! cloud-top height, snow-cover categories) from their native coordinates
//! onto a regular target grid, or onto any other set of coordinates. It
//! supports:
//!
//! - **Nearest neighbor**: copies the closest valid source value; works for
//!   continuous values and category codes alike
//! - **Linear**: barycentric interpolation on a Delaunay triangulation of
//!   the valid source points; continuous fields only
//! - **Gap filling**: fills the missing cells of a field from its own valid
//!   cells
//!
//! # Architecture
//!
//! ```text
//! Field<T> + lat/lon (1D axes or 2D mesh)
//!      │
//!      ▼
//! PointSet::from_field()          flatten, mask NaN / fill / bad coords
//!      │
//!      ▼
//! PreparedSource::new()
//!      │
//!      ├─► NearestNeighborIndex   k-d tree or bucket grid
//!      │
//!      └─► Triangulation          built on first linear query
//!               │
//!               ▼
//! Regridder::regrid_prepared()    query every target node
//!      │
//!      ▼
//! RegriddedField<T>  ──►  Regridder::fill_gaps()  (optional)
//! ```
//!
//! # Example
//!
//! ```ignore
//! use regrid::{Field, GridSpecification, InterpolationMethod, Regridder};
//!
//! let grid = GridSpecification::new(42.0, 51.5, 5.0, 16.0, 0.04)?;
//! let field = Field::continuous(channel, rows, cols)?;
//!
//! let regridder = Regridder::default();
//! let out = regridder.regrid_field(&field, &lat, &lon, &grid, InterpolationMethod::Nearest)?;
//! if out.is_insufficient_data() {
//!     // skip this timestamp
//! }
//! ```

pub mod cache;
pub mod config;
pub mod error;
pub mod gap_fill;
pub mod index;
pub mod point_set;
pub mod regridder;
pub mod triangulation;
pub mod types;

// Re-export commonly used types at crate root
pub use cache::{SingleEntryCache, SourceCache};
pub use config::{RegridConfig, DEFAULT_MIN_VALID_POINTS};
pub use error::{RegridError, Result};
pub use gap_fill::fill_gaps;
pub use index::{IndexKind, NearestNeighborIndex, Neighbor, SpatialIndex};
pub use point_set::{build_point_set, CoordinateLayout, PointSet};
pub use regridder::{regrid, PreparedSource, Regridder};
pub use triangulation::{Barycentric, Triangulation};
pub use types::{
    CacheStats, Field, FieldValue, InterpolationMethod, RegridStatus, RegriddedField,
    HSAF_NO_DATA, HSAF_SNOW,
};

pub use grid_common::{generate_regular_grid, BoundingBox, DomainCatalog, GridSpecification};
