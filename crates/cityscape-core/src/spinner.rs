//! Busy indicator: five concentric rings, each with its own tilt axis, spin
//! rate and scale pulse. Shown while a photo batch is loading; a hidden
//! spinner does not advance.

use crate::constants::{
    SPINNER_BASE_RADIUS, SPINNER_PULSE_AMPLITUDE, SPINNER_PULSE_BASE, SPINNER_PULSE_STEP,
    SPINNER_RING_COLORS, SPINNER_RING_COUNT, SPINNER_RING_STEP, SPINNER_SPIN_BASE,
    SPINNER_SPIN_STEP,
};
use glam::{Quat, Vec3};

#[derive(Clone, Debug)]
pub struct SpinnerRing {
    pub radius: f32,
    pub color: [f32; 3],
    pub axis: Vec3,
    pub spin_speed: f32,
    pub pulse_rate: f32,
    pub pulse_offset: f32,
    pub orientation: Quat,
    pub scale: f32,
}

#[derive(Clone, Debug)]
pub struct Spinner {
    pub rings: Vec<SpinnerRing>,
    pub visible: bool,
}

impl Default for Spinner {
    fn default() -> Self {
        Self::new()
    }
}

impl Spinner {
    pub fn new() -> Self {
        let rings = (0..SPINNER_RING_COUNT)
            .map(|i| {
                let phase = i as f32 * std::f32::consts::PI / SPINNER_RING_COUNT as f32;
                let axis = Vec3::new(phase.sin(), phase.cos(), 0.0)
                    .try_normalize()
                    .unwrap_or(Vec3::Y);
                SpinnerRing {
                    radius: SPINNER_BASE_RADIUS + i as f32 * SPINNER_RING_STEP,
                    color: SPINNER_RING_COLORS[i % SPINNER_RING_COLORS.len()],
                    axis,
                    spin_speed: SPINNER_SPIN_BASE + i as f32 * SPINNER_SPIN_STEP,
                    pulse_rate: SPINNER_PULSE_BASE + i as f32 * SPINNER_PULSE_STEP,
                    pulse_offset: phase,
                    orientation: Quat::IDENTITY,
                    scale: 1.0,
                }
            })
            .collect();
        Self {
            rings,
            visible: false,
        }
    }

    pub fn advance(&mut self, dt_sec: f32, t_sec: f32) {
        if !self.visible {
            return;
        }
        for r in &mut self.rings {
            let step = Quat::from_axis_angle(r.axis, r.spin_speed * dt_sec);
            r.orientation = (step * r.orientation).normalize();
            let pulse = (t_sec * r.pulse_rate + r.pulse_offset).sin();
            r.scale = 1.0 + pulse * SPINNER_PULSE_AMPLITUDE;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rings_grow_outward_with_distinct_motion() {
        let s = Spinner::new();
        assert_eq!(s.rings.len(), SPINNER_RING_COUNT);
        assert!(!s.visible);
        for pair in s.rings.windows(2) {
            assert!(pair[1].radius > pair[0].radius);
            assert!(pair[1].spin_speed > pair[0].spin_speed);
            assert!(pair[1].pulse_rate > pair[0].pulse_rate);
        }
    }

    #[test]
    fn hidden_spinner_does_not_advance() {
        let mut s = Spinner::new();
        let before = s.rings[0].orientation;
        s.advance(0.5, 0.5);
        assert_eq!(s.rings[0].orientation, before);

        s.visible = true;
        s.advance(0.5, 1.0);
        assert!(before.angle_between(s.rings[0].orientation) > 0.01);
    }

    #[test]
    fn pulse_stays_within_amplitude() {
        let mut s = Spinner::new();
        s.visible = true;
        for i in 0..200 {
            s.advance(0.016, i as f32 * 0.016);
            for r in &s.rings {
                assert!((r.scale - 1.0).abs() <= SPINNER_PULSE_AMPLITUDE + 1e-5);
            }
        }
    }
}
