//! Background ambience: a drifting particle cloud, a swaying grid plane and a
//! few pulsing glow spheres. Advanced every frame regardless of which scene
//! is active.

use crate::constants::{
    GLOW_PULSE_MIN, GLOW_PULSE_SPAN, GLOW_SPHERE_COUNT, GLOW_SPHERE_SPREAD, GLOW_SPHERE_Z,
    PARTICLE_COUNT, PARTICLE_SPREAD, PARTICLE_SYSTEM_PITCH_SPEED, PARTICLE_SYSTEM_YAW_SPEED,
    PARTICLE_WOBBLE_SPEED,
};
use glam::Vec3;
use rand::Rng;

#[derive(Clone, Debug)]
pub struct Particle {
    pub position: Vec3,
    pub color: [f32; 3],
    /// Index-derived phase for the depth wobble.
    pub phase: f32,
}

#[derive(Clone, Debug)]
pub struct GlowSphere {
    pub position: Vec3,
    pub pulse_rate: f32,
    pub pulse_offset: f32,
    pub scale: f32,
    pub opacity: f32,
}

#[derive(Clone, Debug)]
pub struct Ambience {
    pub particles: Vec<Particle>,
    pub system_yaw: f32,
    pub system_pitch: f32,
    pub grid_pitch: f32,
    pub grid_yaw: f32,
    pub glows: Vec<GlowSphere>,
}

impl Ambience {
    pub fn new(rng: &mut impl Rng) -> Self {
        let particles = (0..PARTICLE_COUNT)
            .map(|i| Particle {
                position: Vec3::new(
                    (rng.gen::<f32>() - 0.5) * PARTICLE_SPREAD,
                    (rng.gen::<f32>() - 0.5) * PARTICLE_SPREAD,
                    (rng.gen::<f32>() - 0.5) * PARTICLE_SPREAD,
                ),
                color: [
                    0.2 + rng.gen::<f32>() * 0.5,
                    0.5 + rng.gen::<f32>() * 0.5,
                    1.0,
                ],
                phase: i as f32,
            })
            .collect();
        let glows = (0..GLOW_SPHERE_COUNT)
            .map(|_| GlowSphere {
                position: Vec3::new(
                    (rng.gen::<f32>() - 0.5) * GLOW_SPHERE_SPREAD,
                    (rng.gen::<f32>() - 0.5) * GLOW_SPHERE_SPREAD,
                    GLOW_SPHERE_Z,
                ),
                pulse_rate: GLOW_PULSE_MIN + rng.gen::<f32>() * GLOW_PULSE_SPAN,
                pulse_offset: rng.gen::<f32>() * std::f32::consts::TAU,
                scale: 1.0,
                opacity: 0.1,
            })
            .collect();
        Self {
            particles,
            system_yaw: 0.0,
            system_pitch: 0.0,
            grid_pitch: 0.0,
            grid_yaw: 0.0,
            glows,
        }
    }

    pub fn advance(&mut self, dt_sec: f32, t_sec: f32) {
        self.system_yaw += PARTICLE_SYSTEM_YAW_SPEED * dt_sec;
        self.system_pitch += PARTICLE_SYSTEM_PITCH_SPEED * dt_sec;
        for p in &mut self.particles {
            p.position.z += (t_sec + p.phase).sin() * PARTICLE_WOBBLE_SPEED * dt_sec;
        }
        self.grid_pitch = (t_sec * 0.1).sin() * 0.1;
        self.grid_yaw = (t_sec * 0.2).cos() * 0.1;
        for g in &mut self.glows {
            let pulse = (t_sec * g.pulse_rate + g.pulse_offset).sin();
            g.scale = 1.0 + pulse * 0.3;
            g.opacity = 0.1 + pulse * 0.1;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn cloud_fills_the_spread_with_blue_leaning_colors() {
        let mut rng = StdRng::seed_from_u64(1);
        let a = Ambience::new(&mut rng);
        assert_eq!(a.particles.len(), PARTICLE_COUNT);
        assert_eq!(a.glows.len(), GLOW_SPHERE_COUNT);
        for p in a.particles.iter().take(50) {
            assert!(p.position.abs().max_element() <= PARTICLE_SPREAD / 2.0);
            assert_eq!(p.color[2], 1.0);
            assert!(p.color[0] >= 0.2 && p.color[0] <= 0.7);
            assert!(p.color[1] >= 0.5 && p.color[1] <= 1.0);
        }
    }

    #[test]
    fn advance_rotates_system_and_keeps_pulses_bounded() {
        let mut rng = StdRng::seed_from_u64(1);
        let mut a = Ambience::new(&mut rng);
        a.advance(1.0, 1.0);
        assert!((a.system_yaw - PARTICLE_SYSTEM_YAW_SPEED).abs() < 1e-6);
        assert!((a.system_pitch - PARTICLE_SYSTEM_PITCH_SPEED).abs() < 1e-6);
        for t in 0..100 {
            a.advance(0.05, t as f32 * 0.05);
            assert!(a.grid_pitch.abs() <= 0.1 + 1e-6);
            assert!(a.grid_yaw.abs() <= 0.1 + 1e-6);
            for g in &a.glows {
                assert!(g.scale >= 0.7 - 1e-6 && g.scale <= 1.3 + 1e-6);
                assert!(g.opacity >= -1e-6 && g.opacity <= 0.2 + 1e-6);
            }
        }
    }

    #[test]
    fn particles_wobble_in_depth_only() {
        let mut rng = StdRng::seed_from_u64(1);
        let mut a = Ambience::new(&mut rng);
        let before = a.particles[0].position;
        a.advance(0.5, 0.7);
        let after = a.particles[0].position;
        assert_eq!(before.x, after.x);
        assert_eq!(before.y, after.y);
        assert_ne!(before.z, after.z);
    }
}
