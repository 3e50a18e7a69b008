//! Per-particle state and the repel/spring/damp step.
//!
//! Every particle remembers the glyph pixel it was sampled from as its
//! `origin` and forever tries to get back there. A nearby pointer shoves it
//! away, friction bleeds the shove off, and an eased spring closes the
//! remaining gap. With the pointer far away the step degenerates to a pure
//! geometric return, so an idle field always settles back into the text.

use glam::Vec2;
use rand::rngs::SmallRng;
use rand::Rng;

use crate::color::Rgba;

/// Floor for the squared pointer distance.
///
/// Keeps the repulsion force finite when the pointer sits exactly on a
/// particle; without it the force magnitude would blow up to infinity and
/// poison the velocity with NaN.
pub const MIN_DISTANCE_SQ: f32 = 0.01;

/// Pointer position used as off-screen sentinel until the first real event.
const OFF_SCREEN: f32 = -1.0e6;

/// The repulsion source, usually fed from mouse or touch events.
///
/// `radius` doubles as force strength and as the interaction cutoff: a
/// particle is pushed only while its *squared* distance to the pointer is
/// below `radius`, and the push magnitude is `radius / distance²`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Pointer {
    /// Current pointer position in pixels.
    pub position: Vec2,
    /// Interaction strength and squared-distance cutoff.
    pub radius: f32,
}

impl Pointer {
    /// Create a pointer parked far off-screen so a fresh field stays calm
    /// until the first pointer event arrives.
    pub fn new(radius: f32) -> Self {
        Self {
            position: Vec2::splat(OFF_SCREEN),
            radius,
        }
    }

    /// Move the pointer to `(x, y)` in pixels.
    pub fn move_to(&mut self, x: f32, y: f32) {
        self.position = Vec2::new(x, y);
    }
}

/// One sampled glyph pixel, loose in the world.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Particle {
    /// Home position: the glyph pixel this particle was sampled from.
    pub origin: Vec2,
    /// Current position.
    pub position: Vec2,
    /// Current velocity in pixels per step.
    pub velocity: Vec2,
    /// Color sampled from the rendered glyph.
    pub color: Rgba,
    /// Velocity damping factor per step, drawn from `[0.15, 0.75)`.
    pub friction: f32,
    /// Spring strength toward `origin` per step, drawn from `[0.01, 0.11)`.
    pub ease: f32,
    /// Side length of the drawn square in pixels.
    pub size: f32,
}

impl Particle {
    /// Create a particle homed at `origin`, scattered to a random position
    /// inside the viewport so new text flies together out of loose dust.
    ///
    /// `viewport` must be at least one pixel in both axes, which always holds
    /// when the particle was sampled from a real bitmap pixel.
    pub fn new(origin: Vec2, color: Rgba, size: f32, viewport: Vec2, rng: &mut SmallRng) -> Self {
        Self {
            origin,
            position: Vec2::new(
                rng.gen_range(0.0..viewport.x),
                rng.gen_range(0.0..viewport.y),
            ),
            velocity: Vec2::ZERO,
            color,
            friction: rng.gen_range(0.15..0.75),
            ease: rng.gen_range(0.01..0.11),
            size,
        }
    }

    /// Advance the particle by one step.
    ///
    /// The order is load-bearing: force is accumulated into velocity first,
    /// then friction damps the velocity, and only then does the position
    /// integrate velocity plus the spring pull. The interaction gate compares
    /// the *squared* distance against `radius`, which makes the effective
    /// reach `sqrt(radius)` pixels.
    pub fn update(&mut self, pointer: &Pointer) {
        let offset = pointer.position - self.position;
        let dist_sq = offset.length_squared().max(MIN_DISTANCE_SQ);
        let force = -pointer.radius / dist_sq;

        if dist_sq < pointer.radius {
            let angle = offset.y.atan2(offset.x);
            self.velocity.x += force * angle.cos();
            self.velocity.y += force * angle.sin();
        }

        self.velocity *= self.friction;
        self.position += self.velocity + (self.origin - self.position) * self.ease;
    }
}
