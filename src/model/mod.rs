// MODEL: static geometry and fixed transforms
pub mod geometry;
pub mod camera;

pub use geometry::{COLORS, CUBE_INDEX_COUNT, CUBE_VERTEX_COUNT, INDICES, POSITIONS};
pub use camera::{build_projection, build_view, Camera};
