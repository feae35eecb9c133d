//! CPU-side scene generation: vertices, the shared index buffer, one indirect
//! draw command and one transform per grid cell.
//!
//! Layout of the generated buffers for the default 10x10 grid:
//!
//! ```text
//! indices:  [ quad: 0 1 2 1 3 2 | triangle: 0 1 2 ]
//!             first = 0, count 6  first = 6, count 3
//!
//! vertices: [ q q q q | t t t | q q q q | t t t | ... ]   (row-major)
//!             base 0    base 4  base 7    base 11
//! ```
//!
//! Each draw re-reads its shape's index region and offsets it by `base_vertex`
//! so it lands on its own vertex slice.

use bytemuck::{Pod, Zeroable};
use glam::{Mat4, Vec2, Vec3};

/// Interleaved vertex: position + texture coordinate.
#[repr(C)]
#[derive(Debug, Copy, Clone, PartialEq, Pod, Zeroable)]
pub struct Vertex2D {
    pub position: [f32; 2],
    pub tex_coord: [f32; 2],
}

impl Vertex2D {
    const fn new(x: f32, y: f32, u: f32, v: f32) -> Self {
        Self {
            position: [x, y],
            tex_coord: [u, v],
        }
    }
}

pub const QUAD_VERTICES: [Vertex2D; 4] = [
    Vertex2D::new(0.0, 0.0, 0.0, 0.0),
    Vertex2D::new(0.1, 0.0, 1.0, 0.0),
    Vertex2D::new(0.0, 0.1, 0.0, 1.0),
    Vertex2D::new(0.1, 0.1, 1.0, 1.0),
];

pub const QUAD_INDICES: [u32; 6] = [0, 1, 2, 1, 3, 2];

pub const TRIANGLE_VERTICES: [Vertex2D; 3] = [
    Vertex2D::new(0.0, 0.0, 0.0, 0.0),
    Vertex2D::new(0.05, 0.1, 0.5, 1.0),
    Vertex2D::new(0.1, 0.0, 1.0, 0.0),
];

pub const TRIANGLE_INDICES: [u32; 3] = [0, 1, 2];

/// One indexed indirect draw, laid out exactly as the GPU reads it.
#[repr(C)]
#[derive(Debug, Copy, Clone, Default, Eq, PartialEq, Pod, Zeroable)]
pub struct DrawCommand {
    pub index_count: u32,
    pub instance_count: u32,
    pub first_index: u32,
    pub base_vertex: i32,
    pub first_instance: u32,
}

/// Shape template drawn in a grid cell.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum Shape {
    Quad,
    Triangle,
}

impl Shape {
    /// Even columns hold quads, odd columns triangles.
    pub fn for_column(col: u32) -> Self {
        if col % 2 == 0 { Shape::Quad } else { Shape::Triangle }
    }

    pub fn vertices(self) -> &'static [Vertex2D] {
        match self {
            Shape::Quad => &QUAD_VERTICES,
            Shape::Triangle => &TRIANGLE_VERTICES,
        }
    }

    pub fn indices(self) -> &'static [u32] {
        match self {
            Shape::Quad => &QUAD_INDICES,
            Shape::Triangle => &TRIANGLE_INDICES,
        }
    }
}

/// A contiguous range of the shared index buffer.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub struct IndexRegion {
    pub first: u32,
    pub count: u32,
}

/// Grid the scene is laid out on, in normalized device coordinates.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct GridLayout {
    pub rows: u32,
    pub cols: u32,
    /// Translation of cell (0, 0).
    pub origin: Vec2,
    /// Distance between neighbouring cells on both axes.
    pub spacing: f32,
}

impl Default for GridLayout {
    fn default() -> Self {
        Self {
            rows: 10,
            cols: 10,
            origin: Vec2::new(-0.95, -0.95),
            spacing: 0.2,
        }
    }
}

impl GridLayout {
    pub fn cell_count(&self) -> u32 {
        self.rows * self.cols
    }

    /// Translation of cell `(row, col)`.
    pub fn cell_offset(&self, row: u32, col: u32) -> Vec2 {
        self.origin + Vec2::new(col as f32, row as f32) * self.spacing
    }
}

/// Everything the renderer uploads, generated once from a [`GridLayout`].
#[derive(Debug, Clone)]
pub struct DrawScene {
    pub layout: GridLayout,
    pub vertices: Vec<Vertex2D>,
    /// Quad region followed by the triangle region.
    pub indices: Vec<u32>,
    /// One per cell, in row-major order; `first_instance` is the cell index.
    pub commands: Vec<DrawCommand>,
    /// One per cell, indexed like `commands`.
    pub transforms: Vec<Mat4>,
}

impl DrawScene {
    pub fn generate(layout: &GridLayout) -> Self {
        let cells = layout.cell_count() as usize;

        let mut indices = Vec::with_capacity(QUAD_INDICES.len() + TRIANGLE_INDICES.len());
        indices.extend_from_slice(&QUAD_INDICES);
        indices.extend_from_slice(&TRIANGLE_INDICES);

        let mut scene = Self {
            layout: *layout,
            vertices: Vec::with_capacity(cells * QUAD_VERTICES.len()),
            indices,
            commands: Vec::with_capacity(cells),
            transforms: Vec::with_capacity(cells),
        };

        let mut base_vertex = 0i32;
        for row in 0..layout.rows {
            for col in 0..layout.cols {
                let shape = Shape::for_column(col);
                let region = scene.region(shape);

                scene.vertices.extend_from_slice(shape.vertices());
                scene.commands.push(DrawCommand {
                    index_count: region.count,
                    instance_count: 1,
                    first_index: region.first,
                    base_vertex,
                    first_instance: row * layout.cols + col,
                });
                base_vertex += shape.vertices().len() as i32;

                let offset = layout.cell_offset(row, col);
                scene
                    .transforms
                    .push(Mat4::from_translation(Vec3::new(offset.x, offset.y, 0.0)));
            }
        }

        scene
    }

    pub fn quad_region(&self) -> IndexRegion {
        IndexRegion {
            first: 0,
            count: QUAD_INDICES.len() as u32,
        }
    }

    pub fn triangle_region(&self) -> IndexRegion {
        IndexRegion {
            first: QUAD_INDICES.len() as u32,
            count: TRIANGLE_INDICES.len() as u32,
        }
    }

    pub fn region(&self, shape: Shape) -> IndexRegion {
        match shape {
            Shape::Quad => self.quad_region(),
            Shape::Triangle => self.triangle_region(),
        }
    }

    /// Shape drawn by command `index`.
    pub fn shape_at(&self, index: usize) -> Shape {
        Shape::for_column(index as u32 % self.layout.cols.max(1))
    }

    pub fn draw_count(&self) -> u32 {
        self.commands.len() as u32
    }

    pub fn is_empty(&self) -> bool {
        self.commands.is_empty()
    }
}
