use glam::Vec3;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use warpfield_common::StarConfig;

/// Remap `x` linearly from `[a1, a2]` to `[b1, b2]`.
///
/// Values outside the source range extrapolate along the same line.
pub fn map_linear(x: f32, a1: f32, a2: f32, b1: f32, b2: f32) -> f32 {
    b1 + (x - a1) * (b2 - b1) / (a2 - a1)
}

/// Resolved per-tick motion parameters, all in world units.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WarpParams {
    /// Depth of the far edge of the volume (negative).
    pub far_depth: f32,
    pub recycle_threshold: f32,
    pub min_speed: f32,
    pub max_speed: f32,
    /// Half-width of the x/y scatter at initialization.
    pub init_half_width: f32,
    /// Half-width of the x/y scatter when a star is recycled.
    pub recycle_half_width: f32,
    /// Depth a recycled star restarts at (negative).
    pub reset_depth: f32,
}

impl WarpParams {
    pub fn from_config(config: &StarConfig) -> Self {
        Self {
            far_depth: -config.area * config.init_depth,
            recycle_threshold: config.recycle_threshold,
            min_speed: config.min_speed,
            max_speed: config.max_speed,
            init_half_width: config.area * config.init_scatter * 0.5,
            recycle_half_width: config.area * config.recycle_scatter * 0.5,
            reset_depth: -config.area * config.recycle_depth,
        }
    }

    /// Forward speed of a star at depth `z`: slow at the far edge, fast near
    /// the camera.
    pub fn depth_speed(&self, z: f32) -> f32 {
        map_linear(z, self.far_depth, 0.0, self.min_speed, self.max_speed)
    }
}

impl Default for WarpParams {
    fn default() -> Self {
        Self::from_config(&StarConfig::default())
    }
}

/// Uniform draw from `[-half_width, half_width)`; zero when the width is
/// empty, negative or NaN.
fn scatter<R: Rng + ?Sized>(rng: &mut R, half_width: f32) -> f32 {
    if !(half_width > 0.0) {
        return 0.0;
    }
    rng.random_range(-half_width..half_width)
}

/// Advance every star toward the camera by its depth-mapped speed and recycle
/// the ones that pass the threshold. Returns the number recycled.
pub fn advance<R: Rng + ?Sized>(positions: &mut [Vec3], params: &WarpParams, rng: &mut R) -> usize {
    let mut recycled = 0;
    for p in positions.iter_mut() {
        p.z += params.depth_speed(p.z);
        if p.z > params.recycle_threshold {
            p.x = scatter(rng, params.recycle_half_width);
            p.y = scatter(rng, params.recycle_half_width);
            p.z = params.reset_depth;
            recycled += 1;
        }
    }
    recycled
}

/// Depth distribution summary.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DepthStats {
    pub min: f32,
    pub max: f32,
    pub mean: f32,
}

/// A fixed-size buffer of star positions and the RNG that scatters them.
///
/// The buffer is handed to render backends by reference; `needs_upload`
/// tells them whether it changed since their last copy.
pub struct StarField<R = ChaCha8Rng> {
    positions: Vec<Vec3>,
    params: WarpParams,
    rng: R,
    seed: Option<u64>,
    tick: u64,
    last_recycled: usize,
    dirty: bool,
}

impl StarField {
    /// Build a field seeded for reproducible runs.
    pub fn new(config: &StarConfig, seed: u64) -> Self {
        let mut field = Self::with_rng(config, ChaCha8Rng::seed_from_u64(seed));
        field.seed = Some(seed);
        field
    }
}

impl<R: Rng> StarField<R> {
    /// Build a field drawing from the given generator.
    pub fn with_rng(config: &StarConfig, mut rng: R) -> Self {
        let params = WarpParams::from_config(config);
        let depth = -params.far_depth;
        let positions: Vec<Vec3> = (0..config.count)
            .map(|_| {
                let x = scatter(&mut rng, params.init_half_width);
                let y = scatter(&mut rng, params.init_half_width);
                let z = -rng.random::<f32>() * depth;
                Vec3::new(x, y, z)
            })
            .collect();

        tracing::info!(
            "star field initialized: {} stars, area {}",
            positions.len(),
            config.area
        );

        Self {
            positions,
            params,
            rng,
            seed: None,
            tick: 0,
            last_recycled: 0,
            dirty: true,
        }
    }

    /// Advance one frame. Returns how many stars were recycled.
    pub fn tick(&mut self) -> usize {
        let recycled = advance(&mut self.positions, &self.params, &mut self.rng);
        self.tick += 1;
        self.last_recycled = recycled;
        self.dirty = true;
        if recycled > 0 {
            tracing::trace!("tick {}: recycled {recycled} stars", self.tick);
        }
        recycled
    }

    pub fn positions(&self) -> &[Vec3] {
        &self.positions
    }

    /// Mutable view of the buffer. Length is fixed; marks the buffer dirty.
    pub fn positions_mut(&mut self) -> &mut [Vec3] {
        self.dirty = true;
        &mut self.positions
    }

    pub fn params(&self) -> &WarpParams {
        &self.params
    }

    pub fn set_params(&mut self, params: WarpParams) {
        self.params = params;
    }

    pub fn len(&self) -> usize {
        self.positions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.positions.is_empty()
    }

    pub fn tick_count(&self) -> u64 {
        self.tick
    }

    /// Seed the field was built from, if it owns a seeded generator.
    pub fn seed(&self) -> Option<u64> {
        self.seed
    }

    pub fn last_recycled(&self) -> usize {
        self.last_recycled
    }

    pub fn needs_upload(&self) -> bool {
        self.dirty
    }

    /// Called by a backend once it has copied the buffer.
    pub fn mark_uploaded(&mut self) {
        self.dirty = false;
    }

    pub fn depth_stats(&self) -> Option<DepthStats> {
        let first = self.positions.first()?.z;
        let (mut min, mut max, mut sum) = (first, first, 0.0_f64);
        for p in &self.positions {
            min = min.min(p.z);
            max = max.max(p.z);
            sum += p.z as f64;
        }
        Some(DepthStats {
            min,
            max,
            mean: (sum / self.positions.len() as f64) as f32,
        })
    }

    /// FNV-1a over the tick count and every coordinate's bits.
    pub fn state_hash(&self) -> u64 {
        let mut h: u64 = 0xcbf2_9ce4_8422_2325;
        let mix = |h: &mut u64, bytes: &[u8]| {
            for &b in bytes {
                *h ^= b as u64;
                *h = h.wrapping_mul(0x0100_0000_01b3);
            }
        };
        mix(&mut h, &self.tick.to_le_bytes());
        for p in &self.positions {
            mix(&mut h, &p.x.to_le_bytes());
            mix(&mut h, &p.y.to_le_bytes());
            mix(&mut h, &p.z.to_le_bytes());
        }
        h
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn small(count: usize) -> StarConfig {
        StarConfig {
            count,
            ..StarConfig::default()
        }
    }

    #[test]
    fn map_linear_endpoints_and_extrapolation() {
        assert_eq!(map_linear(-400.0, -400.0, 0.0, 0.1, 1.5), 0.1);
        assert_eq!(map_linear(0.0, -400.0, 0.0, 0.1, 1.5), 1.5);
        assert!((map_linear(-200.0, -400.0, 0.0, 0.1, 1.5) - 0.8).abs() < 1e-6);
        assert!(map_linear(4.0, -400.0, 0.0, 0.1, 1.5) > 1.5);
    }

    #[test]
    fn default_params() {
        let p = WarpParams::default();
        assert_eq!(p.far_depth, -400.0);
        assert_eq!(p.init_half_width, 500.0);
        assert_eq!(p.recycle_half_width, 300.0);
        assert_eq!(p.reset_depth, -200.0);
        assert_eq!(p.recycle_threshold, 5.0);
    }

    #[test]
    fn speed_is_monotonic_in_depth() {
        let p = WarpParams::default();
        let mut prev = p.depth_speed(-400.0);
        let mut z = -400.0;
        while z <= 0.0 {
            let s = p.depth_speed(z);
            assert!(s >= prev, "speed({z}) = {s} < {prev}");
            prev = s;
            z += 0.5;
        }
    }

    #[test]
    fn initial_positions_within_volume() {
        let field = StarField::new(&small(2000), 1);
        assert_eq!(field.len(), 2000);
        for p in field.positions() {
            assert!(p.x >= -500.0 && p.x < 500.0);
            assert!(p.y >= -500.0 && p.y < 500.0);
            assert!(p.z > -400.0 && p.z <= 0.0);
        }
    }

    #[test]
    fn three_star_tick_advances_by_mapped_speed() {
        let mut field = StarField::new(&small(3), 7);
        let before: Vec<Vec3> = field.positions().to_vec();
        let recycled = field.tick();
        assert_eq!(recycled, 0);
        let params = *field.params();
        for (b, a) in before.iter().zip(field.positions()) {
            assert_eq!(a.z, b.z + params.depth_speed(b.z));
            assert!(a.z > b.z);
            assert!(a.z <= 5.0);
            assert_eq!((a.x, a.y), (b.x, b.y));
        }
    }

    #[test]
    fn star_past_threshold_resets_to_reset_depth() {
        let mut field = StarField::new(&small(1), 3);
        field.set_params(WarpParams {
            min_speed: 0.2,
            max_speed: 0.2,
            ..WarpParams::default()
        });
        field.positions_mut()[0] = Vec3::new(10.0, -10.0, 4.9);
        assert_eq!(field.tick(), 1);
        let p = field.positions()[0];
        assert_eq!(p.z, -200.0);
        assert!(p.x.abs() <= 300.0 && p.y.abs() <= 300.0);
    }

    #[test]
    fn star_just_below_threshold_is_kept() {
        let mut field = StarField::new(&small(1), 3);
        field.set_params(WarpParams {
            min_speed: 0.2,
            max_speed: 0.2,
            ..WarpParams::default()
        });
        field.positions_mut()[0] = Vec3::new(1.0, 2.0, 4.5);
        assert_eq!(field.tick(), 0);
        assert!((field.positions()[0].z - 4.7).abs() < 1e-5);
        assert_eq!(field.positions()[0].x, 1.0);
    }

    #[test]
    fn zero_recycle_width_recycles_onto_axis() {
        let mut field = StarField::new(&small(4), 12);
        field.set_params(WarpParams {
            recycle_half_width: 0.0,
            ..WarpParams::default()
        });
        for p in field.positions_mut() {
            p.z = 4.9;
        }
        assert_eq!(field.tick(), 4);
        for p in field.positions() {
            assert_eq!(*p, Vec3::new(0.0, 0.0, -200.0));
        }
    }

    #[test]
    fn degenerate_scatter_widths_draw_zero() {
        let mut rng = ChaCha8Rng::seed_from_u64(1);
        assert_eq!(scatter(&mut rng, 0.0), 0.0);
        assert_eq!(scatter(&mut rng, -3.0), 0.0);
        assert_eq!(scatter(&mut rng, f32::NAN), 0.0);
        let v = scatter(&mut rng, 2.0);
        assert!((-2.0..2.0).contains(&v));
    }

    #[test]
    fn recycled_stars_use_recycle_scatter() {
        let mut field = StarField::new(&small(500), 11);
        for p in field.positions_mut() {
            p.z = 4.9;
        }
        assert_eq!(field.tick(), 500);
        for p in field.positions() {
            assert_eq!(p.z, -200.0);
            assert!(p.x >= -300.0 && p.x < 300.0);
            assert!(p.y >= -300.0 && p.y < 300.0);
        }
    }

    #[test]
    fn depth_stays_bounded_over_many_ticks() {
        let mut field = StarField::new(&small(300), 5);
        let mut total_recycled = 0;
        for _ in 0..3000 {
            total_recycled += field.tick();
            for p in field.positions() {
                assert!(p.z >= -400.0 - 1e-3 && p.z <= 5.0, "z out of range: {}", p.z);
            }
        }
        assert!(total_recycled > 0);
    }

    #[test]
    fn same_seed_same_state() {
        let mut a = StarField::new(&small(100), 42);
        let mut b = StarField::new(&small(100), 42);
        for _ in 0..500 {
            a.tick();
            b.tick();
        }
        assert_eq!(a.state_hash(), b.state_hash());
        assert_eq!(a.positions(), b.positions());
        assert_eq!(a.tick_count(), 500);
        assert_eq!(a.seed(), Some(42));
    }

    #[test]
    fn different_seeds_diverge() {
        let a = StarField::new(&small(10), 1);
        let b = StarField::new(&small(10), 2);
        assert_ne!(a.state_hash(), b.state_hash());
    }

    #[test]
    fn custom_rng_is_accepted() {
        let field = StarField::with_rng(&small(4), ChaCha8Rng::seed_from_u64(9));
        assert_eq!(field.len(), 4);
        assert_eq!(field.seed(), None);
    }

    #[test]
    fn upload_flag_lifecycle() {
        let mut field = StarField::new(&small(2), 0);
        assert!(field.needs_upload());
        field.mark_uploaded();
        assert!(!field.needs_upload());
        field.tick();
        assert!(field.needs_upload());
    }

    #[test]
    fn buffer_length_never_changes() {
        let mut field = StarField::new(&small(64), 8);
        let ptr = field.positions().as_ptr();
        for _ in 0..1000 {
            field.tick();
        }
        assert_eq!(field.len(), 64);
        assert_eq!(field.positions().as_ptr(), ptr);
    }

    #[test]
    fn depth_stats_cover_buffer() {
        let field = StarField::new(&small(50), 4);
        let stats = field.depth_stats().unwrap();
        assert!(stats.min <= stats.mean && stats.mean <= stats.max);
        assert!(stats.min > -400.0 && stats.max <= 0.0);
    }

    #[test]
    fn free_advance_counts_recycles() {
        let mut rng = ChaCha8Rng::seed_from_u64(0);
        let mut buf = vec![Vec3::new(0.0, 0.0, -400.0), Vec3::new(0.0, 0.0, 10.0)];
        let n = advance(&mut buf, &WarpParams::default(), &mut rng);
        assert_eq!(n, 1);
        assert!((buf[0].z - (-399.9)).abs() < 1e-3);
        assert_eq!(buf[1].z, -200.0);
    }
}
