use glam::Vec2;

/// Cursor position in normalized device coordinates.
///
/// The host reports it once per frame; the scene only reads it.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Pointer {
    pub x: f32,
    pub y: f32,
}

impl Pointer {
    pub const CENTER: Self = Self { x: 0.0, y: 0.0 };

    /// Build from raw NDC values, clamping each axis into [-1, 1].
    pub fn new(x: f32, y: f32) -> Self {
        let clamp = |v: f32| if v.is_nan() { 0.0 } else { v.clamp(-1.0, 1.0) };
        Self {
            x: clamp(x),
            y: clamp(y),
        }
    }

    /// Map a window pixel position (origin top-left, +y down) to NDC.
    pub fn from_window_position(px: f64, py: f64, width: u32, height: u32) -> Self {
        if width == 0 || height == 0 {
            tracing::debug!("pointer reported for zero-size window, centering");
            return Self::CENTER;
        }
        let x = (px / width as f64) * 2.0 - 1.0;
        let y = -((py / height as f64) * 2.0 - 1.0);
        Self::new(x as f32, y as f32)
    }

    pub fn as_vec2(self) -> Vec2 {
        Vec2::new(self.x, self.y)
    }
}

impl From<Option<Pointer>> for Pointer {
    fn from(p: Option<Pointer>) -> Self {
        p.unwrap_or(Self::CENTER)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_is_center() {
        assert_eq!(Pointer::default(), Pointer::CENTER);
        assert_eq!(Pointer::from(None), Pointer::CENTER);
    }

    #[test]
    fn window_corners_map_to_ndc_corners() {
        assert_eq!(
            Pointer::from_window_position(0.0, 0.0, 800, 600),
            Pointer { x: -1.0, y: 1.0 }
        );
        assert_eq!(
            Pointer::from_window_position(800.0, 600.0, 800, 600),
            Pointer { x: 1.0, y: -1.0 }
        );
        assert_eq!(
            Pointer::from_window_position(400.0, 300.0, 800, 600),
            Pointer::CENTER
        );
    }

    #[test]
    fn outside_window_is_clamped() {
        let p = Pointer::from_window_position(-100.0, 900.0, 800, 600);
        assert_eq!(p, Pointer { x: -1.0, y: -1.0 });
    }

    #[test]
    fn zero_size_window_centers() {
        assert_eq!(
            Pointer::from_window_position(10.0, 10.0, 0, 600),
            Pointer::CENTER
        );
    }

    #[test]
    fn nan_becomes_zero() {
        let p = Pointer::new(f32::NAN, 0.5);
        assert_eq!(p, Pointer { x: 0.0, y: 0.5 });
    }
}
