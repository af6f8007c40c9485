use crate::scene::Scene;

/// Renderer-agnostic interface. All renderers implement this trait.
///
/// A renderer reads the scene once per frame and produces output. It never
/// advances the simulation; the host calls `Scene::tick` for that.
pub trait Renderer {
    /// The output type produced by this renderer.
    type Output;

    /// Render one frame of the given scene.
    fn render(&self, scene: &Scene) -> Self::Output;
}

/// Text renderer for headless runs and logs.
///
/// Prints the frame header plus up to `sample` star positions.
#[derive(Debug)]
pub struct DebugTextRenderer {
    pub sample: usize,
}

impl Default for DebugTextRenderer {
    fn default() -> Self {
        Self { sample: 5 }
    }
}

impl DebugTextRenderer {
    pub fn new() -> Self {
        Self::default()
    }
}

impl Renderer for DebugTextRenderer {
    type Output = String;

    fn render(&self, scene: &Scene) -> String {
        let field = &scene.stars.field;
        let mut out = String::new();
        out.push_str(&format!(
            "=== Starfield (tick={}, seed={}) ===\n",
            field.tick_count(),
            field
                .seed()
                .map_or_else(|| "unseeded".to_string(), |s| s.to_string())
        ));
        out.push_str(&format!(
            "Stars: {}  recycled last tick: {}\n",
            field.len(),
            field.last_recycled()
        ));
        if let Some(stats) = field.depth_stats() {
            out.push_str(&format!(
                "Depth: min={:.2} max={:.2} mean={:.2}\n",
                stats.min, stats.max, stats.mean
            ));
        }
        out.push_str(&format!(
            "Camera: yaw={:.4} pitch={:.4} fov={:.0}\n",
            scene.camera.yaw,
            scene.camera.pitch,
            scene.projection.fov_y.to_degrees()
        ));
        for (i, p) in field.positions().iter().take(self.sample).enumerate() {
            out.push_str(&format!("  [{i}] pos=({:.2}, {:.2}, {:.2})\n", p.x, p.y, p.z));
        }
        out
    }
}
