//! Time-parameterized motion functions
//!
//! An in-formation enemy sits at
//! `base + group offset(t) + individual motion(t) + jitter(t)`.
//! Everything here is a pure function of its inputs; the only mutable
//! state is the per-enemy [`Motion`] descriptor (orbit angle, patrol progress).

use std::f32::consts::TAU;

use glam::Vec2;
use serde::{Deserialize, Serialize};

/// Peak jitter displacement (pixels)
pub const JITTER_AMPLITUDE: f32 = 1.5;

/// Shared drift applied to every in-formation enemy of a wave
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GroupMotion {
    /// No shared movement
    #[default]
    Hold,
    /// Horizontal sinusoidal sway
    Sway { amplitude: f32, speed: f32 },
    /// Vertical bobbing
    Bob { amplitude: f32, speed: f32 },
    /// Lissajous figure-eight
    FigureEight { amplitude: f32, speed: f32 },
    /// Slow descent toward the player, capped at `limit` pixels
    Advance { speed: f32, limit: f32 },
}

impl GroupMotion {
    /// Group offset `t` seconds after the wave started
    pub fn offset(&self, t: f32) -> Vec2 {
        match *self {
            GroupMotion::Hold => Vec2::ZERO,
            GroupMotion::Sway { amplitude, speed } => Vec2::new((t * speed).sin() * amplitude, 0.0),
            GroupMotion::Bob { amplitude, speed } => Vec2::new(0.0, (t * speed).sin() * amplitude),
            GroupMotion::FigureEight { amplitude, speed } => Vec2::new(
                (t * speed).sin() * amplitude,
                (t * speed * 2.0).sin() * amplitude * 0.35,
            ),
            GroupMotion::Advance { speed, limit } => Vec2::new(0.0, (t * speed).min(limit)),
        }
    }
}

/// Individual motion attached to an enemy at formation-build time
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Motion {
    /// Circle around the base point; `speed` in radians/s
    Orbit { radius: f32, speed: f32, angle: f32 },
    /// Walk waypoints (relative to base) back and forth at `speed` pixels/s.
    /// `progress` is measured in segments: 1.5 is halfway along the second leg.
    Patrol {
        path: Vec<Vec2>,
        progress: f32,
        speed: f32,
        forward: bool,
    },
    /// Radius breathes between `start_radius` and `max_radius` while the angle turns
    Spiral {
        start_radius: f32,
        growth: f32,
        max_radius: f32,
        angular_speed: f32,
        phase: f32,
    },
    /// Fixed-radius swirl with a pulsing radius
    Vortex {
        radius: f32,
        angular_speed: f32,
        phase: f32,
        pulse: f32,
    },
    /// Vertical sinusoid keyed by column index
    Wave { column: u32, amplitude: f32, frequency: f32 },
    /// Slow drift inside a cloud
    Nebula { drift_radius: f32, speed: f32, phase: f32 },
}

impl Motion {
    /// Advance stateful motions by `dt`
    pub fn advance(&mut self, dt: f32) {
        match self {
            Motion::Orbit { speed, angle, .. } => {
                *angle = (*angle + *speed * dt).rem_euclid(TAU);
            }
            Motion::Patrol {
                path,
                progress,
                speed,
                forward,
            } => {
                let (p, f) = advance_patrol(path, *progress, *forward, *speed * dt);
                *progress = p;
                *forward = f;
            }
            _ => {}
        }
    }

    /// Offset from the enemy's base position, `t` seconds into its formation life
    pub fn offset(&self, t: f32) -> Vec2 {
        match self {
            Motion::Orbit { radius, angle, .. } => orbit(*radius, *angle),
            Motion::Patrol { path, progress, .. } => patrol(path, *progress),
            Motion::Spiral {
                start_radius,
                growth,
                max_radius,
                angular_speed,
                phase,
            } => spiral(*start_radius, *growth, *max_radius, *angular_speed, *phase, t),
            Motion::Vortex {
                radius,
                angular_speed,
                phase,
                pulse,
            } => vortex(*radius, *angular_speed, *phase, *pulse, t),
            Motion::Wave {
                column,
                amplitude,
                frequency,
            } => wave(*column, *amplitude, *frequency, t),
            Motion::Nebula {
                drift_radius,
                speed,
                phase,
            } => nebula_drift(*drift_radius, *speed, *phase, t),
        }
    }
}

/// Point on a circle of `radius` at `angle` radians
#[inline]
pub fn orbit(radius: f32, angle: f32) -> Vec2 {
    Vec2::new(angle.cos(), angle.sin()) * radius
}

/// Interpolated point along `path` at `progress` segments
pub fn patrol(path: &[Vec2], progress: f32) -> Vec2 {
    match path.len() {
        0 => Vec2::ZERO,
        1 => path[0],
        n => {
            let max = (n - 1) as f32;
            let p = progress.clamp(0.0, max);
            let i = (p.floor() as usize).min(n - 2);
            let frac = p - i as f32;
            path[i].lerp(path[i + 1], frac)
        }
    }
}

/// Move `distance` pixels along `path`, reversing at either end.
///
/// Returns the new `(progress, forward)` pair.
pub fn advance_patrol(path: &[Vec2], progress: f32, forward: bool, distance: f32) -> (f32, bool) {
    if path.len() < 2 {
        return (0.0, forward);
    }
    let max = (path.len() - 1) as f32;
    let mut progress = progress.clamp(0.0, max);
    let mut forward = forward;
    let mut remaining = distance;

    // Walk segment by segment so long steps bounce correctly
    for _ in 0..(path.len() * 4) {
        if remaining <= 0.0 {
            break;
        }
        let i = if forward {
            (progress.floor() as usize).min(path.len() - 2)
        } else {
            (progress.ceil() as usize).max(1) - 1
        };
        let seg_len = path[i].distance(path[i + 1]).max(1e-3);
        let seg_end = if forward { (i + 1) as f32 } else { i as f32 };
        let left_in_seg = (seg_end - progress).abs() * seg_len;

        if remaining < left_in_seg {
            let step = remaining / seg_len;
            progress += if forward { step } else { -step };
            remaining = 0.0;
        } else {
            progress = seg_end;
            remaining -= left_in_seg;
            if forward && progress >= max {
                forward = false;
            } else if !forward && progress <= 0.0 {
                forward = true;
            }
        }
    }
    (progress, forward)
}

/// Spiral whose radius ping-pongs between `start_radius` and `max_radius`
pub fn spiral(
    start_radius: f32,
    growth: f32,
    max_radius: f32,
    angular_speed: f32,
    phase: f32,
    t: f32,
) -> Vec2 {
    let span = (max_radius - start_radius).max(0.0);
    let travel = growth * t;
    let r = if span <= 0.0 {
        start_radius
    } else {
        let cycle = travel.rem_euclid(span * 2.0);
        start_radius + if cycle > span { span * 2.0 - cycle } else { cycle }
    };
    orbit(r, phase + angular_speed * t)
}

/// Swirl with radius pulsing by `pulse` (fraction of radius)
pub fn vortex(radius: f32, angular_speed: f32, phase: f32, pulse: f32, t: f32) -> Vec2 {
    let r = radius * (1.0 + pulse * (t * 1.7).sin());
    orbit(r, phase + angular_speed * t)
}

/// Vertical sinusoid; neighbouring columns are phase-shifted so rows ripple
pub fn wave(column: u32, amplitude: f32, frequency: f32, t: f32) -> Vec2 {
    Vec2::new(0.0, (t * frequency + column as f32 * 0.6).sin() * amplitude)
}

/// Lissajous drift used by nebula clouds
pub fn nebula_drift(drift_radius: f32, speed: f32, phase: f32, t: f32) -> Vec2 {
    Vec2::new(
        (t * speed + phase).cos(),
        (t * speed * 1.3 + phase * 0.7).sin(),
    ) * drift_radius
}

/// Small per-entity wobble so formations never look frozen
pub fn jitter(seed: u32, t: f32) -> Vec2 {
    let s = (seed % 997) as f32 * 0.7;
    Vec2::new((t * 2.3 + s).sin(), (t * 1.7 + s * 1.3).cos()) * JITTER_AMPLITUDE
}

/// Type-specific movement for enemies that are not in formation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Standalone {
    /// Drift straight down
    #[default]
    Drift,
    /// Weave left and right while descending
    Zigzag,
    /// Home in on the player's column while descending
    Dive,
    /// Slow horizontal strafe across the screen
    Strafe,
}

/// Velocity for a standalone enemy at `pos`, `t` seconds after breaking formation
pub fn standalone_velocity(style: Standalone, pos: Vec2, target_x: f32, speed: f32, t: f32) -> Vec2 {
    match style {
        Standalone::Drift => Vec2::new(0.0, speed),
        Standalone::Zigzag => Vec2::new((t * 3.0).sin() * speed * 1.5, speed),
        Standalone::Dive => {
            let dx = (target_x - pos.x).clamp(-1.0, 1.0);
            Vec2::new(dx * speed * 0.8, speed * 1.4)
        }
        Standalone::Strafe => Vec2::new(if (t * 0.5).sin() >= 0.0 { speed } else { -speed }, speed * 0.2),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const EPS: f32 = 1e-3;

    #[test]
    fn test_orbit_advances_angle() {
        let mut m = Motion::Orbit {
            radius: 50.0,
            speed: std::f32::consts::FRAC_PI_2,
            angle: 0.0,
        };
        assert!((m.offset(0.0) - Vec2::new(50.0, 0.0)).length() < EPS);
        m.advance(1.0);
        assert!((m.offset(1.0) - Vec2::new(0.0, 50.0)).length() < EPS);
    }

    #[test]
    fn test_patrol_reverses_at_endpoints() {
        let path = vec![Vec2::ZERO, Vec2::new(100.0, 0.0)];
        let (p, fwd) = advance_patrol(&path, 0.0, true, 50.0);
        assert!((p - 0.5).abs() < EPS);
        assert!(fwd);

        // 50 to the end, then 30 back
        let (p, fwd) = advance_patrol(&path, p, fwd, 80.0);
        assert!(!fwd);
        assert!((patrol(&path, p).x - 70.0).abs() < 0.01);

        // Bounces again off the start
        let (p, fwd) = advance_patrol(&path, p, fwd, 90.0);
        assert!(fwd);
        assert!((patrol(&path, p).x - 20.0).abs() < 0.01);
    }

    #[test]
    fn test_patrol_multi_segment() {
        let path = vec![Vec2::ZERO, Vec2::new(10.0, 0.0), Vec2::new(10.0, 10.0)];
        let (p, _) = advance_patrol(&path, 0.0, true, 15.0);
        let pos = patrol(&path, p);
        assert!((pos - Vec2::new(10.0, 5.0)).length() < 0.01);
    }

    #[test]
    fn test_spiral_radius_stays_in_band() {
        for i in 0..200 {
            let t = i as f32 * 0.1;
            let r = spiral(20.0, 15.0, 80.0, 1.0, 0.0, t).length();
            assert!(r >= 20.0 - EPS && r <= 80.0 + EPS, "r={r} at t={t}");
        }
    }

    #[test]
    fn test_wave_keyed_by_column() {
        let a = wave(0, 10.0, 2.0, 1.0);
        let b = wave(3, 10.0, 2.0, 1.0);
        assert_eq!(a.x, 0.0);
        assert!((a.y - b.y).abs() > EPS);
        assert!(a.y.abs() <= 10.0);
    }

    #[test]
    fn test_group_advance_is_capped() {
        let g = GroupMotion::Advance { speed: 10.0, limit: 40.0 };
        assert_eq!(g.offset(2.0), Vec2::new(0.0, 20.0));
        assert_eq!(g.offset(100.0), Vec2::new(0.0, 40.0));
        assert_eq!(GroupMotion::Hold.offset(5.0), Vec2::ZERO);
    }

    #[test]
    fn test_jitter_is_small() {
        for i in 0..50 {
            assert!(jitter(i, i as f32 * 0.37).length() <= JITTER_AMPLITUDE * 1.5);
        }
    }

    #[test]
    fn test_dive_tracks_player() {
        let v = standalone_velocity(Standalone::Dive, Vec2::new(100.0, 0.0), 400.0, 50.0, 0.0);
        assert!(v.x > 0.0);
        assert!(v.y > 0.0);
    }
}
