//! Formation generator
//!
//! Expands a declarative [`FormationSpec`] into spawn entries: enemy type,
//! anchor position and optional individual motion. Each pattern builder
//! returns exactly one entry per listed enemy; boss layouts add one entry
//! for the boss itself.
//!
//! Nebula and fractal placement draw from the caller's RNG, so layouts are
//! only reproducible when the run RNG is seeded.

use std::f32::consts::{PI, TAU};
use std::str::FromStr;

use glam::Vec2;
use rand::Rng;
use serde::{Deserialize, Serialize};

use super::bestiary::EnemyKind;
use super::movement::{GroupMotion, Motion};
use crate::consts::{FORMATION_CENTER_X, FORMATION_CENTER_Y};

/// Golden angle in radians (sunflower packing)
const GOLDEN_ANGLE: f32 = 2.399_963;

/// One enemy to create when a wave spawns
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SpawnEntry {
    pub kind: EnemyKind,
    /// Formation anchor; the enemy's motion offset is added on top
    pub position: Vec2,
    pub motion: Option<Motion>,
    /// Seconds after the wave spawn request before this entry may appear
    pub delay: f32,
    /// Tagged boss of a boss layout
    pub boss: bool,
}

impl SpawnEntry {
    fn at(kind: EnemyKind, position: Vec2) -> Self {
        Self {
            kind,
            position,
            motion: None,
            delay: 0.0,
            boss: false,
        }
    }

    fn with_motion(mut self, motion: Motion) -> Self {
        self.motion = Some(motion);
        self
    }

    /// World position at formation time zero
    pub fn initial_position(&self) -> Vec2 {
        self.position + self.motion.as_ref().map_or(Vec2::ZERO, |m| m.offset(0.0))
    }
}

/// Geometric pattern families
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PatternId {
    Line,
    Grid,
    V,
    Diamond,
    Wall,
    DualColumn,
    Pincer,
    Arc,
    Spiral,
    Helix,
    OrbitalRings,
    Pentagram,
    NestedCircles,
    Serpentine,
    GrowingSpiral,
    Fractal,
    Nebula,
    DualVortex,
    Fortress,
}

impl PatternId {
    pub const ALL: [PatternId; 19] = [
        PatternId::Line,
        PatternId::Grid,
        PatternId::V,
        PatternId::Diamond,
        PatternId::Wall,
        PatternId::DualColumn,
        PatternId::Pincer,
        PatternId::Arc,
        PatternId::Spiral,
        PatternId::Helix,
        PatternId::OrbitalRings,
        PatternId::Pentagram,
        PatternId::NestedCircles,
        PatternId::Serpentine,
        PatternId::GrowingSpiral,
        PatternId::Fractal,
        PatternId::Nebula,
        PatternId::DualVortex,
        PatternId::Fortress,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            PatternId::Line => "line",
            PatternId::Grid => "grid",
            PatternId::V => "v",
            PatternId::Diamond => "diamond",
            PatternId::Wall => "wall",
            PatternId::DualColumn => "dual_column",
            PatternId::Pincer => "pincer",
            PatternId::Arc => "arc",
            PatternId::Spiral => "spiral",
            PatternId::Helix => "helix",
            PatternId::OrbitalRings => "orbital_rings",
            PatternId::Pentagram => "pentagram",
            PatternId::NestedCircles => "nested_circles",
            PatternId::Serpentine => "serpentine",
            PatternId::GrowingSpiral => "growing_spiral",
            PatternId::Fractal => "fractal",
            PatternId::Nebula => "nebula",
            PatternId::DualVortex => "dual_vortex",
            PatternId::Fortress => "fortress",
        }
    }
}

/// Pattern id that does not name any known family
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("Unknown formation pattern `{0}`")]
pub struct UnknownPattern(pub String);

impl FromStr for PatternId {
    type Err = UnknownPattern;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let key = s.trim().to_lowercase().replace(['-', ' '], "_");
        PatternId::ALL
            .into_iter()
            .find(|p| p.as_str() == key)
            .ok_or_else(|| UnknownPattern(s.to_string()))
    }
}

/// Layout parameters shared by the pattern builders
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LayoutParams {
    pub center: Vec2,
    /// Horizontal spacing between neighbours
    pub spacing: f32,
    /// Vertical spacing between rows
    pub row_spacing: f32,
    /// Enemies per row for row-based patterns
    pub columns: u32,
    /// Outer radius for circular patterns
    pub radius: f32,
    pub inner_radius: f32,
    /// Ring count for orbital rings
    pub rings: u32,
    /// Rotation speed for orbiting patterns (radians/s)
    pub angular_speed: f32,
    /// Sinusoid amplitude for helix/serpentine/spiral breathing
    pub amplitude: f32,
    /// Nebula cloud density (scales the cluster radius)
    pub density: f32,
    /// Fractal child offset randomization (pixels)
    pub variance: f32,
    /// Fractal children per seed
    pub cluster: u32,
}

impl Default for LayoutParams {
    fn default() -> Self {
        Self {
            center: Vec2::new(FORMATION_CENTER_X, FORMATION_CENTER_Y),
            spacing: 60.0,
            row_spacing: 50.0,
            columns: 6,
            radius: 120.0,
            inner_radius: 50.0,
            rings: 2,
            angular_speed: 0.8,
            amplitude: 20.0,
            density: 1.0,
            variance: 8.0,
            cluster: 3,
        }
    }
}

impl LayoutParams {
    pub fn centered_at(mut self, x: f32, y: f32) -> Self {
        self.center = Vec2::new(x, y);
        self
    }
}

/// One phase of a multi-phase boss layout
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BossPhase {
    pub minions: Vec<EnemyKind>,
    /// How long this phase lasts before the next one's minions arrive
    pub duration: f32,
    /// Orbit radius around the boss
    pub radius: f32,
    /// Orbit speed (radians/s); alternate phases turn the other way
    pub speed: f32,
}

/// What a formation is made of
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Layout {
    Pattern {
        id: PatternId,
        enemies: Vec<EnemyKind>,
        params: LayoutParams,
    },
    BossWithSatellites {
        boss: EnemyKind,
        satellites: Vec<EnemyKind>,
        params: LayoutParams,
    },
    FinalBoss {
        boss: EnemyKind,
        phases: Vec<BossPhase>,
        params: LayoutParams,
    },
    /// Sub-formations merged together; part `i` is delayed by `i * stagger`.
    /// A zero stagger is a plain multi-formation, a positive one a staggered assault.
    Composite { parts: Vec<FormationSpec>, stagger: f32 },
}

/// Declarative description of a wave's enemies
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FormationSpec {
    pub layout: Layout,
    /// Shared offset for the whole wave (only the outermost spec's is used)
    pub group_motion: GroupMotion,
    /// Delay added to every entry of this spec
    pub spawn_delay: f32,
}

impl FormationSpec {
    pub fn new(layout: Layout) -> Self {
        Self {
            layout,
            group_motion: GroupMotion::Hold,
            spawn_delay: 0.0,
        }
    }

    pub fn pattern(id: PatternId, enemies: Vec<EnemyKind>, params: LayoutParams) -> Self {
        Self::new(Layout::Pattern {
            id,
            enemies,
            params,
        })
    }

    pub fn with_motion(mut self, group_motion: GroupMotion) -> Self {
        self.group_motion = group_motion;
        self
    }

    pub fn delayed(mut self, spawn_delay: f32) -> Self {
        self.spawn_delay = spawn_delay;
        self
    }

    /// Single row of the default enemy type
    pub fn fallback() -> Self {
        Self::pattern(
            PatternId::Line,
            vec![EnemyKind::DEFAULT; 8],
            LayoutParams::default(),
        )
    }

    /// Non-boss enemies listed anywhere in this spec
    pub fn enemy_count(&self) -> usize {
        match &self.layout {
            Layout::Pattern { enemies, .. } => enemies.len(),
            Layout::BossWithSatellites { satellites, .. } => satellites.len(),
            Layout::FinalBoss { phases, .. } => phases.iter().map(|p| p.minions.len()).sum(),
            Layout::Composite { parts, .. } => parts.iter().map(|p| p.enemy_count()).sum(),
        }
    }

    /// Bosses in this spec
    pub fn boss_count(&self) -> usize {
        match &self.layout {
            Layout::Pattern { .. } => 0,
            Layout::BossWithSatellites { .. } | Layout::FinalBoss { .. } => 1,
            Layout::Composite { parts, .. } => parts.iter().map(|p| p.boss_count()).sum(),
        }
    }

    pub fn has_boss(&self) -> bool {
        self.boss_count() > 0
    }

    /// Number of entries [`generate`] produces
    pub fn expected_len(&self) -> usize {
        self.enemy_count() + self.boss_count()
    }

    /// `(start, end)` times of each boss phase, relative to the spawn request
    pub fn phase_schedule(&self) -> Vec<(f32, f32)> {
        match &self.layout {
            Layout::FinalBoss { phases, .. } => {
                let mut t = self.spawn_delay;
                phases
                    .iter()
                    .map(|p| {
                        let start = t;
                        t += p.duration;
                        (start, t)
                    })
                    .collect()
            }
            _ => Vec::new(),
        }
    }
}

/// Expand a formation spec into spawn entries
pub fn generate<R: Rng>(spec: &FormationSpec, rng: &mut R) -> Vec<SpawnEntry> {
    let mut entries = match &spec.layout {
        Layout::Pattern {
            id,
            enemies,
            params,
        } => build_pattern(*id, enemies, params, rng),
        Layout::BossWithSatellites {
            boss,
            satellites,
            params,
        } => boss_with_satellites(*boss, satellites, params),
        Layout::FinalBoss {
            boss,
            phases,
            params,
        } => final_boss(*boss, phases, params),
        Layout::Composite { parts, stagger } => {
            let mut merged = Vec::with_capacity(spec.expected_len());
            for (i, part) in parts.iter().enumerate() {
                let offset = *stagger * i as f32;
                merged.extend(generate(part, rng).into_iter().map(|mut e| {
                    e.delay += offset;
                    e
                }));
            }
            merged
        }
    };
    for entry in &mut entries {
        entry.delay += spec.spawn_delay;
    }
    entries
}

/// Build a pattern from a string id, degrading to a line for unknown ids
pub fn build_named<R: Rng>(
    pattern: &str,
    enemies: &[EnemyKind],
    params: &LayoutParams,
    rng: &mut R,
) -> Vec<SpawnEntry> {
    let id = match pattern.parse::<PatternId>() {
        Ok(id) => id,
        Err(err) => {
            log::warn!("{err}; falling back to a line formation");
            PatternId::Line
        }
    };
    build_pattern(id, enemies, params, rng)
}

/// Dispatch to the builder for one pattern family
pub fn build_pattern<R: Rng>(
    id: PatternId,
    enemies: &[EnemyKind],
    p: &LayoutParams,
    rng: &mut R,
) -> Vec<SpawnEntry> {
    match id {
        PatternId::Line => line(enemies, p),
        PatternId::Grid => grid(enemies, p),
        PatternId::V => v_shape(enemies, p),
        PatternId::Diamond => diamond(enemies, p),
        PatternId::Wall => wall(enemies, p),
        PatternId::DualColumn => dual_column(enemies, p),
        PatternId::Pincer => pincer(enemies, p),
        PatternId::Arc => arc(enemies, p),
        PatternId::Spiral => spiral(enemies, p),
        PatternId::Helix => helix(enemies, p),
        PatternId::OrbitalRings => orbital_rings(enemies, p),
        PatternId::Pentagram => pentagram(enemies, p),
        PatternId::NestedCircles => nested_circles(enemies, p),
        PatternId::Serpentine => serpentine(enemies, p),
        PatternId::GrowingSpiral => growing_spiral(enemies, p),
        PatternId::Fractal => fractal(enemies, p, rng),
        PatternId::Nebula => nebula(enemies, p, rng),
        PatternId::DualVortex => dual_vortex(enemies, p),
        PatternId::Fortress => fortress(enemies, p),
    }
}

/// Offset of slot `i` in a centered row of `n`
#[inline]
fn centered(i: usize, n: usize, spacing: f32) -> f32 {
    (i as f32 - (n.max(1) - 1) as f32 / 2.0) * spacing
}

fn line(enemies: &[EnemyKind], p: &LayoutParams) -> Vec<SpawnEntry> {
    let n = enemies.len();
    enemies
        .iter()
        .enumerate()
        .map(|(i, &kind)| SpawnEntry::at(kind, p.center + Vec2::new(centered(i, n, p.spacing), 0.0)))
        .collect()
}

fn grid(enemies: &[EnemyKind], p: &LayoutParams) -> Vec<SpawnEntry> {
    let n = enemies.len();
    let cols = p.columns.max(1) as usize;
    enemies
        .iter()
        .enumerate()
        .map(|(i, &kind)| {
            let row = i / cols;
            let col = i % cols;
            let row_len = cols.min(n - row * cols);
            let offset = Vec2::new(centered(col, row_len, p.spacing), row as f32 * p.row_spacing);
            SpawnEntry::at(kind, p.center + offset)
        })
        .collect()
}

/// Apex leads toward the player; arms trail back and out
fn v_shape(enemies: &[EnemyKind], p: &LayoutParams) -> Vec<SpawnEntry> {
    enemies
        .iter()
        .enumerate()
        .map(|(i, &kind)| {
            let arm = i.div_ceil(2) as f32;
            let side = if i % 2 == 1 { -1.0 } else { 1.0 };
            let offset = Vec2::new(side * arm * p.spacing * 0.6, -arm * p.row_spacing * 0.6);
            SpawnEntry::at(kind, p.center + offset)
        })
        .collect()
}

/// Concentric diamond outlines filled from the middle out
fn diamond(enemies: &[EnemyKind], p: &LayoutParams) -> Vec<SpawnEntry> {
    let mut slots = Vec::with_capacity(enemies.len());
    let mut layer = 0i32;
    while slots.len() < enemies.len() {
        if layer == 0 {
            slots.push(Vec2::ZERO);
        } else {
            // Walk the |x| + |y| = layer outline
            for step in 0..(4 * layer) {
                let (x, y) = match step / layer {
                    0 => (layer - step % layer, -(step % layer)),
                    1 => (-(step % layer), -(layer - step % layer)),
                    2 => (-(layer - step % layer), step % layer),
                    _ => (step % layer, layer - step % layer),
                };
                slots.push(Vec2::new(x as f32 * p.spacing * 0.6, y as f32 * p.row_spacing * 0.6));
            }
        }
        layer += 1;
    }
    enemies
        .iter()
        .zip(slots)
        .map(|(&kind, offset)| SpawnEntry::at(kind, p.center + offset))
        .collect()
}

/// Dense brick-bond rows
fn wall(enemies: &[EnemyKind], p: &LayoutParams) -> Vec<SpawnEntry> {
    let n = enemies.len();
    let cols = (p.columns.max(1) + 2) as usize;
    let spacing = p.spacing * 0.75;
    enemies
        .iter()
        .enumerate()
        .map(|(i, &kind)| {
            let row = i / cols;
            let col = i % cols;
            let row_len = cols.min(n - row * cols);
            let brick = if row % 2 == 1 { spacing * 0.5 } else { 0.0 };
            let offset = Vec2::new(
                centered(col, row_len, spacing) + brick,
                row as f32 * p.row_spacing * 0.7,
            );
            SpawnEntry::at(kind, p.center + offset)
        })
        .collect()
}

fn dual_column(enemies: &[EnemyKind], p: &LayoutParams) -> Vec<SpawnEntry> {
    let per_column = enemies.len().div_ceil(2);
    enemies
        .iter()
        .enumerate()
        .map(|(i, &kind)| {
            let side = if i % 2 == 0 { -1.0 } else { 1.0 };
            let slot = i / 2;
            let offset = Vec2::new(
                side * p.spacing * 2.0,
                centered(slot, per_column, p.row_spacing * 0.8),
            );
            SpawnEntry::at(kind, p.center + offset)
        })
        .collect()
}

/// Two arms closing in from the flanks
fn pincer(enemies: &[EnemyKind], p: &LayoutParams) -> Vec<SpawnEntry> {
    enemies
        .iter()
        .enumerate()
        .map(|(i, &kind)| {
            let side = if i % 2 == 0 { -1.0 } else { 1.0 };
            let k = (i / 2) as f32;
            let reach = (p.radius * 2.0 - k * p.spacing * 0.6).max(p.spacing * 0.5);
            let offset = Vec2::new(side * reach, k * p.row_spacing * 0.8 - p.row_spacing);
            SpawnEntry::at(kind, p.center + offset)
        })
        .collect()
}

/// Arc bowing toward the player
fn arc(enemies: &[EnemyKind], p: &LayoutParams) -> Vec<SpawnEntry> {
    let n = enemies.len();
    let (start, end) = (30f32.to_radians(), 150f32.to_radians());
    let anchor = p.center - Vec2::new(0.0, p.radius * 0.6);
    enemies
        .iter()
        .enumerate()
        .map(|(i, &kind)| {
            let t = if n > 1 { i as f32 / (n - 1) as f32 } else { 0.5 };
            let angle = start + (end - start) * t;
            SpawnEntry::at(kind, anchor + Vec2::new(angle.cos(), angle.sin()) * p.radius)
        })
        .collect()
}

/// Arms of a spiral whose radius breathes over time
fn spiral(enemies: &[EnemyKind], p: &LayoutParams) -> Vec<SpawnEntry> {
    enemies
        .iter()
        .enumerate()
        .map(|(i, &kind)| {
            let start_radius = p.inner_radius + i as f32 * p.spacing * 0.3;
            SpawnEntry::at(kind, p.center).with_motion(Motion::Spiral {
                start_radius,
                growth: p.amplitude,
                max_radius: start_radius + p.amplitude * 2.0,
                angular_speed: p.angular_speed,
                phase: i as f32 * 0.7,
            })
        })
        .collect()
}

/// Two interleaved sine strands
fn helix(enemies: &[EnemyKind], p: &LayoutParams) -> Vec<SpawnEntry> {
    let per_strand = enemies.len().div_ceil(2);
    enemies
        .iter()
        .enumerate()
        .map(|(i, &kind)| {
            let strand = (i % 2) as f32;
            let k = i / 2;
            let y = ((k as f32) * 0.8 + strand * PI).sin() * p.amplitude;
            let offset = Vec2::new(centered(k, per_strand, p.spacing * 0.8), y);
            SpawnEntry::at(kind, p.center + offset).with_motion(Motion::Wave {
                column: (k * 2) as u32 + (i % 2) as u32 * 5,
                amplitude: p.amplitude * 0.5,
                frequency: 2.0,
            })
        })
        .collect()
}

/// Rings orbiting a shared center, outer rings slightly faster
fn orbital_rings(enemies: &[EnemyKind], p: &LayoutParams) -> Vec<SpawnEntry> {
    let rings = p.rings.max(1) as usize;
    let mut per_ring = vec![0usize; rings];
    for i in 0..enemies.len() {
        per_ring[i % rings] += 1;
    }
    let mut seen = vec![0usize; rings];
    enemies
        .iter()
        .enumerate()
        .map(|(i, &kind)| {
            let ring = i % rings;
            let slot = seen[ring];
            seen[ring] += 1;
            let radius = p.radius * (ring + 1) as f32 / rings as f32;
            SpawnEntry::at(kind, p.center).with_motion(Motion::Orbit {
                radius,
                speed: p.angular_speed * (1.0 + 0.25 * ring as f32),
                angle: slot as f32 * TAU / per_ring[ring] as f32,
            })
        })
        .collect()
}

/// Star points alternating between outer and inner radius, turning slowly
fn pentagram(enemies: &[EnemyKind], p: &LayoutParams) -> Vec<SpawnEntry> {
    enemies
        .iter()
        .enumerate()
        .map(|(i, &kind)| {
            let point = i % 10;
            let layer = (i / 10) as f32;
            let base = if point % 2 == 0 { p.radius } else { p.inner_radius };
            SpawnEntry::at(kind, p.center).with_motion(Motion::Orbit {
                radius: base * (1.0 + 0.45 * layer),
                speed: p.angular_speed * 0.5,
                angle: -PI / 2.0 + point as f32 * TAU / 10.0,
            })
        })
        .collect()
}

/// Rings filled inner-first, each with its own speed and alternating direction
fn nested_circles(enemies: &[EnemyKind], p: &LayoutParams) -> Vec<SpawnEntry> {
    // Ring r holds 4 + 4r enemies
    let mut assignments = Vec::with_capacity(enemies.len());
    let mut ring = 0usize;
    let mut used = 0usize;
    for _ in enemies {
        if used == 4 + 4 * ring {
            ring += 1;
            used = 0;
        }
        assignments.push((ring, used));
        used += 1;
    }
    let ring_sizes: Vec<usize> = (0..=ring)
        .map(|r| assignments.iter().filter(|(ar, _)| *ar == r).count())
        .collect();

    enemies
        .iter()
        .zip(assignments)
        .map(|(&kind, (r, slot))| {
            let direction = if r % 2 == 0 { 1.0 } else { -1.0 };
            SpawnEntry::at(kind, p.center).with_motion(Motion::Orbit {
                radius: p.inner_radius + r as f32 * p.spacing * 0.8,
                speed: p.angular_speed * (1.0 + 0.5 * r as f32) * direction,
                angle: slot as f32 * TAU / ring_sizes[r] as f32,
            })
        })
        .collect()
}

/// Rows with a sinusoidal vertical offset per column
fn serpentine(enemies: &[EnemyKind], p: &LayoutParams) -> Vec<SpawnEntry> {
    let n = enemies.len();
    let cols = p.columns.max(1) as usize;
    enemies
        .iter()
        .enumerate()
        .map(|(i, &kind)| {
            let row = i / cols;
            let col = i % cols;
            let row_len = cols.min(n - row * cols);
            let wiggle = (col as f32 * 0.9 + row as f32 * PI / 2.0).sin() * p.amplitude;
            let offset = Vec2::new(
                centered(col, row_len, p.spacing),
                row as f32 * p.row_spacing + wiggle,
            );
            SpawnEntry::at(kind, p.center + offset).with_motion(Motion::Wave {
                column: col as u32,
                amplitude: p.amplitude * 0.5,
                frequency: 2.0,
            })
        })
        .collect()
}

/// Sunflower spiral; radius grows with index
fn growing_spiral(enemies: &[EnemyKind], p: &LayoutParams) -> Vec<SpawnEntry> {
    enemies
        .iter()
        .enumerate()
        .map(|(i, &kind)| {
            let angle = i as f32 * GOLDEN_ANGLE;
            let radius = p.inner_radius * 0.5 + i as f32 * p.spacing * 0.25;
            SpawnEntry::at(kind, p.center + Vec2::new(angle.cos(), angle.sin()) * radius)
        })
        .collect()
}

/// Seeds on a circle, each followed by a cluster of jittered children
fn fractal<R: Rng>(enemies: &[EnemyKind], p: &LayoutParams, rng: &mut R) -> Vec<SpawnEntry> {
    let group = p.cluster as usize + 1;
    let seeds = enemies.len().div_ceil(group).max(1);
    enemies
        .iter()
        .enumerate()
        .map(|(i, &kind)| {
            let seed = i / group;
            let child = i % group;
            let seed_angle = -PI / 2.0 + seed as f32 * TAU / seeds as f32;
            let seed_pos = Vec2::new(seed_angle.cos(), seed_angle.sin()) * p.radius;
            let offset = if child == 0 {
                seed_pos
            } else {
                let child_angle = child as f32 * TAU / p.cluster.max(1) as f32;
                let variance = p.variance.max(0.0);
                let noise = if variance > 0.0 {
                    Vec2::new(
                        rng.random_range(-variance..=variance),
                        rng.random_range(-variance..=variance),
                    )
                } else {
                    Vec2::ZERO
                };
                seed_pos + Vec2::new(child_angle.cos(), child_angle.sin()) * p.spacing * 0.5 + noise
            };
            SpawnEntry::at(kind, p.center + offset)
        })
        .collect()
}

/// Random polar placement inside a cloud
fn nebula<R: Rng>(enemies: &[EnemyKind], p: &LayoutParams, rng: &mut R) -> Vec<SpawnEntry> {
    let cloud = p.radius * p.density.clamp(0.1, 1.5);
    enemies
        .iter()
        .map(|&kind| {
            let theta = rng.random_range(0.0..TAU);
            // sqrt keeps the area density uniform
            let r = cloud * rng.random::<f32>().sqrt();
            SpawnEntry::at(kind, p.center + Vec2::new(theta.cos(), theta.sin()) * r).with_motion(
                Motion::Nebula {
                    drift_radius: rng.random_range(6.0..16.0),
                    speed: rng.random_range(0.4..0.9),
                    phase: rng.random_range(0.0..TAU),
                },
            )
        })
        .collect()
}

/// Two counter-rotating swirls joined by a static bridge
fn dual_vortex(enemies: &[EnemyKind], p: &LayoutParams) -> Vec<SpawnEntry> {
    let n = enemies.len();
    let connectors = if n >= 6 { (n / 6).clamp(1, 4) } else { 0 };
    let left = p.center - Vec2::new(p.radius * 1.2, 0.0);
    let right = p.center + Vec2::new(p.radius * 1.2, 0.0);
    let mut counts = [0usize; 2];

    enemies
        .iter()
        .enumerate()
        .map(|(i, &kind)| {
            if i < connectors {
                let t = (i + 1) as f32 / (connectors + 1) as f32;
                return SpawnEntry::at(kind, left.lerp(right, t));
            }
            let side = (i - connectors) % 2;
            let k = counts[side];
            counts[side] += 1;
            let (anchor, direction) = if side == 0 { (left, 1.0) } else { (right, -1.0) };
            SpawnEntry::at(kind, anchor).with_motion(Motion::Vortex {
                radius: p.inner_radius + k as f32 * p.spacing * 0.3,
                angular_speed: p.angular_speed * direction,
                phase: k as f32 * 0.9,
                pulse: 0.15,
            })
        })
        .collect()
}

/// Core in the middle, up to four turrets, defenders patrolling the walls
fn fortress(enemies: &[EnemyKind], p: &LayoutParams) -> Vec<SpawnEntry> {
    let r = p.radius;
    let turrets = [
        Vec2::new(-r, 0.0),
        Vec2::new(r, 0.0),
        Vec2::new(-r * 0.5, -r * 0.6),
        Vec2::new(r * 0.5, -r * 0.6),
    ];
    let perimeter = vec![
        Vec2::new(-r, -r * 0.5),
        Vec2::new(r, -r * 0.5),
        Vec2::new(r, r * 0.6),
        Vec2::new(-r, r * 0.6),
    ];
    let segments = (perimeter.len() - 1) as f32;
    let defenders = enemies.len().saturating_sub(1 + turrets.len()).max(1);

    enemies
        .iter()
        .enumerate()
        .map(|(i, &kind)| match i {
            0 => SpawnEntry::at(kind, p.center),
            i if i <= turrets.len() => SpawnEntry::at(kind, p.center + turrets[i - 1]),
            i => {
                let k = i - 1 - turrets.len();
                SpawnEntry::at(kind, p.center).with_motion(Motion::Patrol {
                    path: perimeter.clone(),
                    progress: segments * k as f32 / defenders as f32,
                    speed: 70.0,
                    forward: k % 2 == 0,
                })
            }
        })
        .collect()
}

fn boss_with_satellites(boss: EnemyKind, satellites: &[EnemyKind], p: &LayoutParams) -> Vec<SpawnEntry> {
    let mut entries = Vec::with_capacity(satellites.len() + 1);
    entries.push(SpawnEntry {
        boss: true,
        ..SpawnEntry::at(boss, p.center)
    });
    let m = satellites.len().max(1) as f32;
    entries.extend(satellites.iter().enumerate().map(|(k, &kind)| {
        SpawnEntry::at(kind, p.center).with_motion(Motion::Orbit {
            radius: p.radius,
            speed: p.angular_speed,
            angle: k as f32 * TAU / m,
        })
    }));
    entries
}

fn final_boss(boss: EnemyKind, phases: &[BossPhase], p: &LayoutParams) -> Vec<SpawnEntry> {
    let mut entries = vec![SpawnEntry {
        boss: true,
        ..SpawnEntry::at(boss, p.center)
    }];
    let mut transition_at = 0.0;
    for (phase_index, phase) in phases.iter().enumerate() {
        let direction = if phase_index % 2 == 0 { 1.0 } else { -1.0 };
        let m = phase.minions.len().max(1) as f32;
        entries.extend(phase.minions.iter().enumerate().map(|(k, &kind)| SpawnEntry {
            delay: transition_at,
            ..SpawnEntry::at(kind, p.center).with_motion(Motion::Orbit {
                radius: phase.radius,
                speed: phase.speed * direction,
                angle: k as f32 * TAU / m,
            })
        }));
        transition_at += phase.duration;
    }
    entries
}
