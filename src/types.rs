use bytemuck::{Pod, Zeroable};
use glam::Vec2;

/// Unit quad corner, expanded per instance in the vertex shader.
#[repr(C)]
#[derive(Copy, Clone, Debug, Pod, Zeroable)]
pub struct Vertex {
    pub corner: [f32; 2],
}

impl Vertex {
    pub const ATTRIBS: [wgpu::VertexAttribute; 1] = wgpu::vertex_attr_array![0 => Float32x2];

    pub fn desc() -> wgpu::VertexBufferLayout<'static> {
        wgpu::VertexBufferLayout {
            array_stride: std::mem::size_of::<Vertex>() as wgpu::BufferAddress,
            step_mode: wgpu::VertexStepMode::Vertex,
            attributes: &Self::ATTRIBS,
        }
    }
}

#[repr(C)]
#[derive(Copy, Clone, Debug, Pod, Zeroable)]
pub struct Uniforms {
    /// Viewport width, height (device-independent px), pixel ratio, unused.
    pub viewport: [f32; 4],
    pub face_light: [f32; 4],
    pub face_dark: [f32; 4],
    pub bevel_top: [f32; 4],
    pub bevel_side: [f32; 4],
    pub sheen: [f32; 4],
}

// GPU-side instance data for one falling shape
#[repr(C)]
#[derive(Copy, Clone, Debug, PartialEq, Pod, Zeroable)]
pub struct ParticleInstance {
    pub center: [f32; 2],
    pub size: [f32; 2],
    /// depth, spin, shear, opacity
    pub shape: [f32; 4],
    /// sheen offset, sheen strength, corner radius, unused
    pub sheen: [f32; 4],
}

impl ParticleInstance {
    pub const ATTRIBS: [wgpu::VertexAttribute; 4] = wgpu::vertex_attr_array![
        1 => Float32x2, // center
        2 => Float32x2, // size
        3 => Float32x4, // depth, spin, shear, opacity
        4 => Float32x4, // sheen offset, strength, radius
    ];

    pub fn desc() -> wgpu::VertexBufferLayout<'static> {
        wgpu::VertexBufferLayout {
            array_stride: std::mem::size_of::<ParticleInstance>() as wgpu::BufferAddress,
            step_mode: wgpu::VertexStepMode::Instance,
            attributes: &Self::ATTRIBS,
        }
    }

    pub fn opacity(&self) -> f32 {
        self.shape[3]
    }

    pub fn sheen_strength(&self) -> f32 {
        self.sheen[1]
    }
}

/// Visual extents of a particle. `depth` drives the fake bevel.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Extent {
    pub width: f32,
    pub height: f32,
    pub depth: f32,
}

#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Orientation {
    pub spin: f32,
    pub spin_velocity: f32,
    pub roll: f32,
    pub roll_velocity: f32,
}

// CPU-side particle state
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Particle {
    pub position: Vec2,
    /// Pixels per second.
    pub velocity: Vec2,
    pub size: Extent,
    /// Milliseconds since spawn.
    pub age: f32,
    pub time_to_live: f32,
    pub orientation: Orientation,
    pub seed: f32,
}

impl Particle {
    pub fn is_expired(&self) -> bool {
        self.age > self.time_to_live
    }

    /// True once the top edge has dropped past the bottom of the surface.
    pub fn is_below(&self, surface_height: f32) -> bool {
        self.position.y - self.size.height > surface_height
    }

    pub fn life_fraction(&self) -> f32 {
        if self.time_to_live <= 0.0 {
            return 1.0;
        }
        (self.age / self.time_to_live).clamp(0.0, 1.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn particle(age: f32, ttl: f32, y: f32) -> Particle {
        Particle {
            position: Vec2::new(10.0, y),
            velocity: Vec2::ZERO,
            size: Extent { width: 40.0, height: 18.0, depth: 2.0 },
            age,
            time_to_live: ttl,
            orientation: Orientation { spin: 0.0, spin_velocity: 0.0, roll: 0.0, roll_velocity: 0.0 },
            seed: 0.5,
        }
    }

    #[test]
    fn expiry_is_strictly_after_ttl() {
        assert!(!particle(1000.0, 1000.0, 0.0).is_expired());
        assert!(particle(1000.5, 1000.0, 0.0).is_expired());
    }

    #[test]
    fn below_uses_top_edge() {
        // bottom edge is past the surface but the top edge is not
        assert!(!particle(0.0, 1000.0, 610.0).is_below(600.0));
        assert!(particle(0.0, 1000.0, 619.0).is_below(600.0));
    }

    #[test]
    fn instance_layout_is_tightly_packed() {
        assert_eq!(std::mem::size_of::<ParticleInstance>(), 12 * 4);
        assert_eq!(std::mem::size_of::<Uniforms>() % 16, 0);
    }
}
