use crate::types::ParticleInstance;

/// Upper bound on the pixel ratio applied to the backing store.
pub const MAX_PIXEL_RATIO: f32 = 2.0;

/// Something the engine can paint into once per frame.
pub trait DrawSurface {
    fn clear(&mut self);
    fn draw_particle(&mut self, instance: &ParticleInstance);
}

/// Viewport dimensions in device-independent pixels plus the capped ratio
/// used for the physical backing store.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct SurfaceMetrics {
    pub width: f32,
    pub height: f32,
    pub pixel_ratio: f32,
}

impl SurfaceMetrics {
    pub fn new(width: f32, height: f32, device_pixel_ratio: f32) -> Self {
        let pixel_ratio = if device_pixel_ratio.is_finite() && device_pixel_ratio > 0.0 {
            device_pixel_ratio.min(MAX_PIXEL_RATIO)
        } else {
            1.0
        };
        Self { width: width.max(0.0), height: height.max(0.0), pixel_ratio }
    }

    /// Build from a physical window size and the platform scale factor.
    pub fn from_physical(width: u32, height: u32, scale_factor: f64) -> Self {
        let scale = if scale_factor > 0.0 { scale_factor as f32 } else { 1.0 };
        Self::new(width as f32 / scale, height as f32 / scale, scale)
    }

    /// Physical framebuffer size, never zero.
    pub fn backing_size(&self) -> (u32, u32) {
        let w = (self.width * self.pixel_ratio).round().max(1.0) as u32;
        let h = (self.height * self.pixel_ratio).round().max(1.0) as u32;
        (w, h)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pixel_ratio_is_capped() {
        let m = SurfaceMetrics::new(800.0, 600.0, 3.0);
        assert_eq!(m.pixel_ratio, 2.0);
        assert_eq!(m.backing_size(), (1600, 1200));
    }

    #[test]
    fn bogus_ratio_falls_back_to_one() {
        assert_eq!(SurfaceMetrics::new(10.0, 10.0, 0.0).pixel_ratio, 1.0);
        assert_eq!(SurfaceMetrics::new(10.0, 10.0, f32::NAN).pixel_ratio, 1.0);
    }

    #[test]
    fn physical_sizes_map_to_logical() {
        let m = SurfaceMetrics::from_physical(2560, 1440, 2.0);
        assert_eq!((m.width, m.height), (1280.0, 720.0));
        let m = SurfaceMetrics::from_physical(3000, 1500, 3.0);
        assert_eq!((m.width, m.height), (1000.0, 500.0));
        assert_eq!(m.backing_size(), (2000, 1000));
    }
}
