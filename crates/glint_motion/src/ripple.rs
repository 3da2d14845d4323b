//! Ripple particles
//!
//! Press ripples live in a small arena keyed by [`RippleId`]. Each particle
//! carries its spawn time; expired particles are swept on every spawn and on
//! every frame, so there is no per-particle timer and the arena never holds
//! more than the ripples younger than [`RIPPLE_LIFETIME_MS`].

use glint_animation::Easing;
use serde::Serialize;
use slotmap::{new_key_type, SlotMap};

new_key_type! {
    pub struct RippleId;
}

/// Hard lifetime of a ripple, whether or not it finished visually
pub const RIPPLE_LIFETIME_MS: f64 = 600.0;

/// Opacity of a freshly spawned ripple
pub const RIPPLE_PEAK_OPACITY: f32 = 0.35;

/// Diameter used before the element has been measured
pub const DEFAULT_RIPPLE_DIAMETER: f32 = 160.0;

/// One press ripple, in element-local coordinates
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct RippleParticle {
    pub x: f32,
    pub y: f32,
    pub spawned_at_ms: f64,
    pub spawned_at_frame: u64,
}

impl RippleParticle {
    pub fn expires_at(&self) -> f64 {
        self.spawned_at_ms + RIPPLE_LIFETIME_MS
    }

    pub fn is_expired(&self, now_ms: f64) -> bool {
        now_ms >= self.expires_at()
    }

    /// Linear age, 0.0 at spawn to 1.0 at expiry
    pub fn progress(&self, now_ms: f64) -> f32 {
        ((now_ms - self.spawned_at_ms) / RIPPLE_LIFETIME_MS).clamp(0.0, 1.0) as f32
    }
}

/// Paintable state of one ripple
#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
pub struct RippleSample {
    pub x: f32,
    pub y: f32,
    pub diameter: f32,
    pub opacity: f32,
}

/// Active ripples of one element
#[derive(Debug)]
pub struct RippleField {
    particles: SlotMap<RippleId, RippleParticle>,
    max_diameter: f32,
}

impl RippleField {
    pub fn new(max_diameter: f32) -> Self {
        Self {
            particles: SlotMap::with_key(),
            max_diameter: sane_diameter(max_diameter),
        }
    }

    pub fn set_max_diameter(&mut self, max_diameter: f32) {
        self.max_diameter = sane_diameter(max_diameter);
    }

    pub fn max_diameter(&self) -> f32 {
        self.max_diameter
    }

    /// Add a ripple at `(x, y)`, sweeping expired ones first
    pub fn spawn(&mut self, x: f32, y: f32, now_ms: f64, frame: u64) -> RippleId {
        self.sweep(now_ms);
        let id = self.particles.insert(RippleParticle {
            x,
            y,
            spawned_at_ms: now_ms,
            spawned_at_frame: frame,
        });
        tracing::trace!("RippleField: spawned {:?}, {} active", id, self.particles.len());
        id
    }

    /// Remove every ripple whose lifetime has elapsed; returns how many
    pub fn sweep(&mut self, now_ms: f64) -> usize {
        let before = self.particles.len();
        self.particles.retain(|_, particle| !particle.is_expired(now_ms));
        before - self.particles.len()
    }

    pub fn get(&self, id: RippleId) -> Option<&RippleParticle> {
        self.particles.get(id)
    }

    pub fn len(&self) -> usize {
        self.particles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.particles.is_empty()
    }

    pub fn clear(&mut self) {
        self.particles.clear();
    }

    /// Ripples to paint at `now_ms`, oldest first
    ///
    /// A ripple grows from zero to the full diameter while fading out.
    pub fn samples(&self, now_ms: f64) -> Vec<RippleSample> {
        let mut particles: Vec<&RippleParticle> = self
            .particles
            .values()
            .filter(|particle| !particle.is_expired(now_ms))
            .collect();
        particles.sort_by(|a, b| a.spawned_at_ms.total_cmp(&b.spawned_at_ms));

        particles
            .into_iter()
            .map(|particle| {
                let progress = particle.progress(now_ms);
                RippleSample {
                    x: particle.x,
                    y: particle.y,
                    diameter: self.max_diameter * Easing::EaseOut.apply(progress),
                    opacity: RIPPLE_PEAK_OPACITY * (1.0 - progress),
                }
            })
            .collect()
    }
}

impl Default for RippleField {
    fn default() -> Self {
        Self::new(DEFAULT_RIPPLE_DIAMETER)
    }
}

fn sane_diameter(diameter: f32) -> f32 {
    if diameter.is_finite() && diameter > 0.0 {
        diameter
    } else {
        DEFAULT_RIPPLE_DIAMETER
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hard_timeout() {
        let mut field = RippleField::default();
        field.spawn(10.0, 10.0, 0.0, 1);

        assert_eq!(field.sweep(599.0), 0);
        assert_eq!(field.sweep(600.0), 1);
        assert!(field.is_empty());
    }

    #[test]
    fn test_spawn_sweeps_expired() {
        let mut field = RippleField::default();
        field.spawn(0.0, 0.0, 0.0, 1);
        field.spawn(0.0, 0.0, 100.0, 2);
        field.spawn(0.0, 0.0, 650.0, 3);

        assert_eq!(field.len(), 2);
    }

    #[test]
    fn test_samples_grow_and_fade() {
        let mut field = RippleField::new(200.0);
        let id = field.spawn(5.0, 6.0, 0.0, 1);
        assert_eq!(field.get(id).unwrap().spawned_at_frame, 1);

        let start = field.samples(0.0)[0];
        assert_eq!(start.diameter, 0.0);
        assert!((start.opacity - RIPPLE_PEAK_OPACITY).abs() < 1e-6);

        let mid = field.samples(300.0)[0];
        assert!(mid.diameter > 100.0 && mid.diameter < 200.0);
        assert!(mid.opacity < start.opacity);

        assert!(field.samples(600.0).is_empty());
    }

    #[test]
    fn test_bad_diameter_falls_back() {
        let field = RippleField::new(f32::NAN);
        assert_eq!(field.max_diameter(), DEFAULT_RIPPLE_DIAMETER);
    }
}
