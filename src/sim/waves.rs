//! Round/wave formation table
//!
//! Three rounds of 5, 7 and 8 waves. The last wave of every round is a boss wave.

use super::bestiary::EnemyKind::{self, *};
use super::formation::{BossPhase, FormationSpec, Layout, LayoutParams, PatternId};
use super::movement::GroupMotion;

pub const ROUND_COUNT: u32 = 3;

/// Waves in `round` (1-based), `None` for unknown rounds
pub fn waves_in_round(round: u32) -> Option<u32> {
    match round {
        1 => Some(5),
        2 => Some(7),
        3 => Some(8),
        _ => None,
    }
}

/// Boss waves: round 1 wave 5, round 2 wave 7, round 3 wave 8
pub fn is_boss_wave(round: u32, wave: u32) -> bool {
    matches!((round, wave), (1, 5) | (2, 7) | (3, 8))
}

/// Is this the final wave of the final round?
pub fn is_final_wave(round: u32, wave: u32) -> bool {
    round == ROUND_COUNT && waves_in_round(round) == Some(wave)
}

/// Repeat a short type cycle to `n` enemies
fn mix(cycle: &[EnemyKind], n: usize) -> Vec<EnemyKind> {
    cycle.iter().copied().cycle().take(n).collect()
}

fn sway(amplitude: f32) -> GroupMotion {
    GroupMotion::Sway {
        amplitude,
        speed: 0.8,
    }
}

/// Formation for `(round, wave)`, `None` when the pair is out of range
pub fn formation_for(round: u32, wave: u32) -> Option<FormationSpec> {
    let max_wave = waves_in_round(round)?;
    if wave == 0 || wave > max_wave {
        return None;
    }
    let p = LayoutParams::default();

    let spec = match (round, wave) {
        // Round 1: the forest edge
        (1, 1) => FormationSpec::pattern(PatternId::Line, vec![Imp; 8], p).with_motion(sway(60.0)),
        (1, 2) => FormationSpec::pattern(PatternId::V, mix(&[Imp, Wisp], 7), p).with_motion(sway(50.0)),
        (1, 3) => FormationSpec::pattern(PatternId::Grid, mix(&[Imp, Imp, Bat], 12), p)
            .with_motion(GroupMotion::Bob {
                amplitude: 18.0,
                speed: 1.2,
            }),
        (1, 4) => FormationSpec::pattern(
            PatternId::Diamond,
            vec![Gargoyle, Wisp, Wisp, Bat, Imp, Bat, Imp, Imp, Imp],
            p,
        )
        .with_motion(GroupMotion::FigureEight {
            amplitude: 70.0,
            speed: 0.6,
        }),
        (1, 5) => FormationSpec::new(Layout::BossWithSatellites {
            boss: Treant,
            satellites: vec![Wisp; 6],
            params: LayoutParams {
                radius: 110.0,
                angular_speed: 0.9,
                ..p
            },
        })
        .with_motion(sway(90.0)),

        // Round 2: the storm peaks
        (2, 1) => FormationSpec::pattern(
            PatternId::Wall,
            mix(&[Imp, Bat], 14),
            LayoutParams { columns: 5, ..p },
        )
        .with_motion(GroupMotion::Advance {
            speed: 3.0,
            limit: 60.0,
        }),
        (2, 2) => FormationSpec::pattern(
            PatternId::Pincer,
            mix(&[Bat, Harpy], 10),
            LayoutParams { radius: 160.0, ..p },
        )
        .with_motion(sway(30.0)),
        (2, 3) => FormationSpec::pattern(
            PatternId::Arc,
            vec![Specter; 9],
            LayoutParams { radius: 220.0, ..p },
        )
        .with_motion(GroupMotion::Bob {
            amplitude: 25.0,
            speed: 0.9,
        }),
        (2, 4) => FormationSpec::new(Layout::Composite {
            parts: vec![
                FormationSpec::pattern(
                    PatternId::OrbitalRings,
                    vec![Wisp; 8],
                    LayoutParams { rings: 2, ..p },
                ),
                FormationSpec::pattern(PatternId::Line, vec![Wyvern], p.centered_at(400.0, 110.0)),
            ],
            stagger: 0.0,
        })
        .with_motion(sway(80.0)),
        (2, 5) => FormationSpec::pattern(
            PatternId::Helix,
            mix(&[Harpy, Bat], 12),
            LayoutParams { amplitude: 30.0, ..p },
        )
        .with_motion(sway(40.0)),
        (2, 6) => FormationSpec::new(Layout::Composite {
            parts: vec![
                FormationSpec::pattern(PatternId::DualColumn, mix(&[Gargoyle, Bat], 8), p),
                FormationSpec::pattern(
                    PatternId::Serpentine,
                    mix(&[Imp, Specter], 10),
                    LayoutParams {
                        columns: 5,
                        ..p.centered_at(400.0, 90.0)
                    },
                ),
            ],
            stagger: 4.0,
        })
        .with_motion(sway(35.0)),
        (2, 7) => FormationSpec::new(Layout::BossWithSatellites {
            boss: StormDrake,
            satellites: mix(&[Harpy, Bat], 8),
            params: LayoutParams {
                radius: 130.0,
                angular_speed: 1.1,
                ..p
            },
        })
        .with_motion(GroupMotion::FigureEight {
            amplitude: 110.0,
            speed: 0.5,
        }),

        // Round 3: the alchemist's tower
        (3, 1) => FormationSpec::pattern(
            PatternId::Spiral,
            vec![Specter; 10],
            LayoutParams {
                inner_radius: 40.0,
                amplitude: 30.0,
                ..p.centered_at(400.0, 170.0)
            },
        ),
        (3, 2) => FormationSpec::pattern(
            PatternId::Pentagram,
            mix(&[Gargoyle, Salamander], 10),
            LayoutParams {
                radius: 140.0,
                inner_radius: 60.0,
                ..p.centered_at(400.0, 180.0)
            },
        )
        .with_motion(sway(40.0)),
        (3, 3) => FormationSpec::pattern(
            PatternId::NestedCircles,
            mix(&[Wisp, Specter, Salamander], 12),
            LayoutParams {
                inner_radius: 45.0,
                ..p.centered_at(400.0, 180.0)
            },
        ),
        (3, 4) => FormationSpec::new(Layout::Composite {
            parts: vec![
                FormationSpec::pattern(
                    PatternId::GrowingSpiral,
                    mix(&[Imp, Harpy], 10),
                    p.centered_at(250.0, 170.0),
                ),
                FormationSpec::pattern(
                    PatternId::Fractal,
                    mix(&[Salamander, Bat, Bat, Bat], 12),
                    LayoutParams {
                        radius: 80.0,
                        ..p.centered_at(560.0, 170.0)
                    },
                ),
            ],
            stagger: 1.5,
        }),
        (3, 5) => FormationSpec::new(Layout::Composite {
            parts: vec![
                FormationSpec::pattern(
                    PatternId::Nebula,
                    mix(&[Wisp, Specter, Imp], 16),
                    LayoutParams {
                        radius: 180.0,
                        density: 0.9,
                        ..p.centered_at(400.0, 190.0)
                    },
                ),
                FormationSpec::pattern(PatternId::Line, vec![Lich], p.centered_at(400.0, 100.0)).delayed(3.0),
            ],
            stagger: 0.0,
        }),
        (3, 6) => FormationSpec::pattern(
            PatternId::DualVortex,
            mix(&[Harpy, Specter], 14),
            LayoutParams {
                radius: 130.0,
                inner_radius: 35.0,
                ..p.centered_at(400.0, 180.0)
            },
        ),
        (3, 7) => {
            let mut enemies = vec![Golem];
            enemies.extend([Salamander; 4]);
            enemies.extend([Gargoyle; 6]);
            FormationSpec::pattern(
                PatternId::Fortress,
                enemies,
                LayoutParams {
                    radius: 150.0,
                    ..p.centered_at(400.0, 190.0)
                },
            )
        }
        (3, 8) => FormationSpec::new(Layout::FinalBoss {
            boss: ArchAlchemist,
            phases: vec![
                BossPhase {
                    minions: vec![Wisp; 6],
                    duration: 15.0,
                    radius: 100.0,
                    speed: 1.2,
                },
                BossPhase {
                    minions: mix(&[Salamander, Specter], 6),
                    duration: 15.0,
                    radius: 150.0,
                    speed: 0.8,
                },
                BossPhase {
                    minions: vec![Gargoyle; 4],
                    duration: 20.0,
                    radius: 200.0,
                    speed: 0.5,
                },
            ],
            params: p.centered_at(400.0, 170.0),
        })
        .with_motion(sway(70.0)),

        _ => return None,
    };
    Some(spec)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::formation::generate;
    use rand::SeedableRng;
    use rand_pcg::Pcg32;

    #[test]
    fn test_round_lengths() {
        assert_eq!(waves_in_round(1), Some(5));
        assert_eq!(waves_in_round(2), Some(7));
        assert_eq!(waves_in_round(3), Some(8));
        assert_eq!(waves_in_round(4), None);
        assert_eq!(waves_in_round(0), None);
    }

    #[test]
    fn test_every_wave_has_a_formation() {
        for round in 1..=ROUND_COUNT {
            for wave in 1..=waves_in_round(round).unwrap() {
                let spec = formation_for(round, wave).expect("formation");
                assert_eq!(spec.has_boss(), is_boss_wave(round, wave), "r{round} w{wave}");
            }
        }
        assert!(formation_for(1, 6).is_none());
        assert!(formation_for(4, 1).is_none());
        assert!(formation_for(2, 0).is_none());
    }

    #[test]
    fn test_generated_length_matches_enemy_list() {
        let mut rng = Pcg32::seed_from_u64(5);
        for round in 1..=ROUND_COUNT {
            for wave in 1..=waves_in_round(round).unwrap() {
                let spec = formation_for(round, wave).unwrap();
                let entries = generate(&spec, &mut rng);
                let bonus = if spec.has_boss() { 1 } else { 0 };
                assert_eq!(entries.len(), spec.enemy_count() + bonus);
            }
        }
    }

    #[test]
    fn test_final_wave() {
        assert!(is_final_wave(3, 8));
        assert!(!is_final_wave(2, 7));
        assert!(is_boss_wave(2, 7));
    }
}
