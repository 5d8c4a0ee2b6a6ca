//! Static cube geometry.
//!
//! The 8 corners are duplicated per face so every face carries its own flat
//! color: 6 faces x 4 vertices, 2 triangles per face.

pub const CUBE_VERTEX_COUNT: usize = 24;
pub const CUBE_INDEX_COUNT: usize = 36;

#[rustfmt::skip]
pub const POSITIONS: [[f32; 3]; CUBE_VERTEX_COUNT] = [
    // back (z = -1)
    [-1.0, -1.0, -1.0], [ 1.0, -1.0, -1.0], [ 1.0,  1.0, -1.0], [-1.0,  1.0, -1.0],
    // front (z = +1)
    [-1.0, -1.0,  1.0], [ 1.0, -1.0,  1.0], [ 1.0,  1.0,  1.0], [-1.0,  1.0,  1.0],
    // left (x = -1)
    [-1.0, -1.0, -1.0], [-1.0,  1.0, -1.0], [-1.0,  1.0,  1.0], [-1.0, -1.0,  1.0],
    // right (x = +1)
    [ 1.0, -1.0, -1.0], [ 1.0,  1.0, -1.0], [ 1.0,  1.0,  1.0], [ 1.0, -1.0,  1.0],
    // bottom (y = -1)
    [-1.0, -1.0, -1.0], [-1.0, -1.0,  1.0], [ 1.0, -1.0,  1.0], [ 1.0, -1.0, -1.0],
    // top (y = +1)
    [-1.0,  1.0, -1.0], [-1.0,  1.0,  1.0], [ 1.0,  1.0,  1.0], [ 1.0,  1.0, -1.0],
];

/// Per-vertex colors. Components above 1.0 are intentional; the render
/// target clamps them.
#[rustfmt::skip]
pub const COLORS: [[f32; 3]; CUBE_VERTEX_COUNT] = [
    [5.0, 3.0, 7.0], [5.0, 3.0, 7.0], [5.0, 3.0, 7.0], [5.0, 3.0, 7.0],
    [1.0, 1.0, 3.0], [1.0, 1.0, 3.0], [1.0, 1.0, 3.0], [1.0, 1.0, 3.0],
    [0.0, 0.0, 1.0], [0.0, 0.0, 1.0], [0.0, 0.0, 1.0], [0.0, 0.0, 1.0],
    [1.0, 0.0, 0.0], [1.0, 0.0, 0.0], [1.0, 0.0, 0.0], [1.0, 0.0, 0.0],
    [1.0, 1.0, 0.0], [1.0, 1.0, 0.0], [1.0, 1.0, 0.0], [1.0, 1.0, 0.0],
    [0.0, 1.0, 0.0], [0.0, 1.0, 0.0], [0.0, 1.0, 0.0], [0.0, 1.0, 0.0],
];

#[rustfmt::skip]
pub const INDICES: [u16; CUBE_INDEX_COUNT] = [
     0,  1,  2,   0,  2,  3,
     4,  5,  6,   4,  6,  7,
     8,  9, 10,   8, 10, 11,
    12, 13, 14,  12, 14, 15,
    16, 17, 18,  16, 18, 19,
    20, 21, 22,  20, 22, 23,
];
