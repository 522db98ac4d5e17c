//! The idle-scene globe field: earth-textured spheres tumbling slowly inside
//! a scatter cube, with the whole group drifting around two axes.

use crate::constants::{
    GLOBE_GROUP_PITCH_SPEED, GLOBE_GROUP_YAW_SPEED, GLOBE_SPIN_MAX, GLOBE_SPIN_MIN, GLOBE_SPREAD,
};
use glam::{EulerRot, Quat, Vec3};
use rand::Rng;

#[derive(Clone, Debug)]
pub struct Globe {
    pub position: Vec3,
    pub axis: Vec3,
    /// Radians per second around `axis`.
    pub spin_speed: f32,
    pub orientation: Quat,
}

#[derive(Clone, Debug)]
pub struct GlobeField {
    pub globes: Vec<Globe>,
    pub group_yaw: f32,
    pub group_pitch: f32,
    /// Tweened to sink the field during the wall transition.
    pub offset_y: f32,
    pub visible: bool,
}

impl GlobeField {
    pub fn new(count: usize, rng: &mut impl Rng) -> Self {
        let globes = (0..count)
            .map(|_| {
                let position = Vec3::new(
                    (rng.gen::<f32>() - 0.5) * GLOBE_SPREAD,
                    (rng.gen::<f32>() - 0.5) * GLOBE_SPREAD,
                    (rng.gen::<f32>() - 0.5) * GLOBE_SPREAD,
                );
                let axis = Vec3::new(
                    rng.gen::<f32>() - 0.5,
                    rng.gen::<f32>() - 0.5,
                    rng.gen::<f32>() - 0.5,
                )
                .try_normalize()
                .unwrap_or(Vec3::Y);
                let spin_speed = GLOBE_SPIN_MIN + rng.gen::<f32>() * (GLOBE_SPIN_MAX - GLOBE_SPIN_MIN);
                let orientation = Quat::from_euler(
                    EulerRot::XYZ,
                    rng.gen::<f32>() * std::f32::consts::TAU,
                    rng.gen::<f32>() * std::f32::consts::TAU,
                    rng.gen::<f32>() * std::f32::consts::TAU,
                );
                Globe {
                    position,
                    axis,
                    spin_speed,
                    orientation,
                }
            })
            .collect();
        Self {
            globes,
            group_yaw: 0.0,
            group_pitch: 0.0,
            offset_y: 0.0,
            visible: true,
        }
    }

    pub fn advance(&mut self, dt_sec: f32) {
        self.group_yaw += GLOBE_GROUP_YAW_SPEED * dt_sec;
        self.group_pitch += GLOBE_GROUP_PITCH_SPEED * dt_sec;
        for g in &mut self.globes {
            let step = Quat::from_axis_angle(g.axis, g.spin_speed * dt_sec);
            g.orientation = (step * g.orientation).normalize();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn field_scatters_inside_the_cube() {
        let mut rng = StdRng::seed_from_u64(11);
        let field = GlobeField::new(15, &mut rng);
        assert_eq!(field.globes.len(), 15);
        assert!(field.visible);
        for g in &field.globes {
            assert!(g.position.abs().max_element() <= GLOBE_SPREAD / 2.0);
            assert!((g.axis.length() - 1.0).abs() < 1e-4);
            assert!(g.spin_speed >= GLOBE_SPIN_MIN && g.spin_speed <= GLOBE_SPIN_MAX);
        }
    }

    #[test]
    fn advance_drifts_group_and_spins_globes() {
        let mut rng = StdRng::seed_from_u64(11);
        let mut field = GlobeField::new(3, &mut rng);
        let before = field.globes[0].orientation;
        field.advance(1.0);
        assert!((field.group_yaw - GLOBE_GROUP_YAW_SPEED).abs() < 1e-6);
        assert!((field.group_pitch - GLOBE_GROUP_PITCH_SPEED).abs() < 1e-6);
        let after = field.globes[0].orientation;
        assert!(before.angle_between(after) > 0.01);
        // Positions are fixed; only orientation moves.
        let p0 = field.globes[0].position;
        field.advance(1.0);
        assert_eq!(field.globes[0].position, p0);
    }
}
