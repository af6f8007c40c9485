use std::cell::OnceCell;
use std::sync::Arc;

/// Radial gradient stops as `(offset, alpha)`, center to edge.
pub const GLOW_STOPS: [(f32, f32); 4] = [(0.0, 1.0), (0.2, 0.8), (0.4, 0.3), (1.0, 0.0)];

/// Alpha of the glow gradient at normalized radius `t`.
///
/// Piecewise-linear between stops; clamps to the first and last stop outside
/// [0, 1].
pub fn gradient_alpha(t: f32) -> f32 {
    let (first_offset, first_alpha) = GLOW_STOPS[0];
    if t <= first_offset {
        return first_alpha;
    }
    for pair in GLOW_STOPS.windows(2) {
        let (o0, a0) = pair[0];
        let (o1, a1) = pair[1];
        if t <= o1 {
            let f = (t - o0) / (o1 - o0);
            return a0 + (a1 - a0) * f;
        }
    }
    GLOW_STOPS[GLOW_STOPS.len() - 1].1
}

/// Square white sprite whose alpha falls off radially.
///
/// Pixels are RGBA8, row-major, straight (non-premultiplied) alpha.
#[derive(Debug, Clone, PartialEq)]
pub struct GlowTexture {
    size: u32,
    pixels: Vec<u8>,
}

impl GlowTexture {
    /// Rasterize the gradient, sampling each pixel at its center.
    pub fn generate(size: u32) -> Self {
        let half = size as f32 / 2.0;
        let mut pixels = Vec::with_capacity(size as usize * size as usize * 4);
        for py in 0..size {
            for px in 0..size {
                let dx = px as f32 + 0.5 - half;
                let dy = py as f32 + 0.5 - half;
                let t = (dx * dx + dy * dy).sqrt() / half;
                let alpha = (gradient_alpha(t) * 255.0).round() as u8;
                pixels.extend_from_slice(&[255, 255, 255, alpha]);
            }
        }
        Self { size, pixels }
    }

    pub fn size(&self) -> u32 {
        self.size
    }

    pub fn pixels(&self) -> &[u8] {
        &self.pixels
    }

    /// Alpha of pixel `(x, y)`, or `None` outside the texture.
    pub fn alpha_at(&self, x: u32, y: u32) -> Option<u8> {
        if x >= self.size || y >= self.size {
            return None;
        }
        let index = (y as usize * self.size as usize + x as usize) * 4 + 3;
        self.pixels.get(index).copied()
    }

    /// Character-cell rendering of the alpha channel, `cols` cells square.
    pub fn ascii_preview(&self, cols: u32) -> String {
        const RAMP: &[u8] = b" .:-=+*#%@";
        let cols = cols.clamp(1, self.size);
        let mut out = String::with_capacity((cols as usize + 1) * cols as usize);
        for row in 0..cols {
            for col in 0..cols {
                let x = (col * self.size + self.size / 2) / cols;
                let y = (row * self.size + self.size / 2) / cols;
                let a = self.alpha_at(x, y).unwrap_or(0) as usize;
                out.push(RAMP[a * (RAMP.len() - 1) / 255] as char);
            }
            out.push('\n');
        }
        out
    }
}

/// Lazily built, shared glow sprite.
///
/// The first `get` rasterizes the texture; later calls return the same `Arc`.
#[derive(Debug)]
pub struct GlowCache {
    size: u32,
    cell: OnceCell<Arc<GlowTexture>>,
}

impl GlowCache {
    pub fn new(size: u32) -> Self {
        Self {
            size,
            cell: OnceCell::new(),
        }
    }

    pub fn get(&self) -> &Arc<GlowTexture> {
        self.cell.get_or_init(|| {
            tracing::debug!("rasterizing {0}x{0} glow texture", self.size);
            Arc::new(GlowTexture::generate(self.size))
        })
    }

    pub fn is_built(&self) -> bool {
        self.cell.get().is_some()
    }
}
