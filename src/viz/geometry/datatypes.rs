use vulkano::{buffer::BufferContents, pipeline::graphics::vertex_input::Vertex};

#[repr(C)]
#[derive(Clone, Copy, Debug, Default, BufferContents, Vertex)]
pub struct PositionF32 {
    #[format(R32G32B32_SFLOAT)]
    pub position: [f32; 3],
}

impl PositionF32 {
    pub fn new(x: f32, y: f32, z: f32) -> Self {
        Self {
            position: [x, y, z],
        }
    }
}

/// RGB packed as `0x00RRGGBB`.
#[repr(C)]
#[derive(Clone, Copy, Debug, Default, BufferContents, Vertex)]
pub struct ColorU8 {
    #[format(R32_UINT)]
    pub rgb: u32,
}

impl ColorU8 {
    pub fn new(r: u8, g: u8, b: u8) -> Self {
        Self {
            rgb: (r as u32) << 16 | (g as u32) << 8 | (b as u32),
        }
    }
}
