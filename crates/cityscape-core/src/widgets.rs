//! Interactive widgets around the main scene: the crystal view-toggle button,
//! the home (reload) button and the per-city clock.
//!
//! Widgets never reach into each other or into the scene; the stage invokes
//! their `on_city_selected` hooks in a fixed order and forwards hover state.
//! Tweened scalars (scale, glow, button height) live on tween channels; the
//! float motions are computed offsets so they never fight a running tween.

use crate::cities;
use crate::constants::{
    CLOCK_FLOAT_AMPLITUDE, CLOCK_FLOAT_RATE, CLOCK_HOVER_SCALE, CLOCK_POS, GLOW_TWEEN_SECS,
    HOME_FLOAT_AMPLITUDE, HOME_FLOAT_RATE, HOME_HOVER_SCALE, HOME_POS, HOME_YAW_AMPLITUDE,
    HOME_YAW_RATE, HOVER_IN_SECS, HOVER_OUT_SECS, LABEL_GLOW_HOVER, LABEL_GLOW_IDLE,
    VIEW_BUTTON_EXIT_Y, VIEW_BUTTON_FLOAT_AMPLITUDE, VIEW_BUTTON_FLOAT_RATE,
    VIEW_BUTTON_HOVER_SCALE, VIEW_BUTTON_SHRINK_SCALE, VIEW_BUTTON_Z, WIDGET_HOVER_SECS,
    ENTER_SCALE_SECS, EXIT_SCALE_SECS, BUTTON_DROP_SECS,
};
use crate::tween::{Channel, Easing, Tweens};
use glam::Vec3;

/// Crystal button toggling the 360 panorama.
#[derive(Clone, Debug, Default)]
pub struct ViewButton {
    pub created: bool,
    pub visible: bool,
    pub enabled: bool,
    pub hovered: bool,
    /// Tweened base height; the float term is added on top.
    pub base_y: f32,
    pub float_y: f32,
    /// Multiplier on the asymmetric crystal base scale.
    pub scale_mul: f32,
    pub label_glow: f32,
}

impl ViewButton {
    /// Idempotent create-and-show, run on every city selection.
    pub fn on_city_selected(&mut self) {
        if !self.created {
            self.created = true;
            self.enabled = true;
            self.base_y = 0.0;
            self.scale_mul = 1.0;
            self.label_glow = LABEL_GLOW_IDLE;
        }
        self.visible = true;
    }

    /// Shrink away and drop below the scene while the panorama takes over.
    pub fn begin_enter(&mut self, tweens: &mut Tweens) {
        self.enabled = false;
        self.hovered = false;
        tweens.start(
            Channel::ButtonScale,
            self.scale_mul,
            VIEW_BUTTON_SHRINK_SCALE,
            ENTER_SCALE_SECS,
            Easing::BackIn,
        );
        tweens.start(
            Channel::ButtonY,
            self.base_y,
            VIEW_BUTTON_EXIT_Y,
            BUTTON_DROP_SECS,
            Easing::QuadOut,
        );
    }

    /// Pop back in from the shrunken state and rise to the resting height.
    pub fn begin_exit(&mut self, tweens: &mut Tweens) {
        self.enabled = true;
        self.visible = true;
        self.scale_mul = VIEW_BUTTON_SHRINK_SCALE;
        tweens.start(
            Channel::ButtonScale,
            VIEW_BUTTON_SHRINK_SCALE,
            1.0,
            EXIT_SCALE_SECS,
            Easing::BackOut,
        );
        tweens.start(
            Channel::ButtonY,
            self.base_y,
            0.0,
            BUTTON_DROP_SECS,
            Easing::QuadOut,
        );
    }

    pub fn set_hovered(&mut self, hovered: bool, tweens: &mut Tweens) {
        if !self.enabled || !self.visible || hovered == self.hovered {
            return;
        }
        self.hovered = hovered;
        if hovered {
            tweens.start(
                Channel::ButtonScale,
                self.scale_mul,
                VIEW_BUTTON_HOVER_SCALE,
                HOVER_IN_SECS,
                Easing::BackOut,
            );
            tweens.start(
                Channel::ButtonGlow,
                self.label_glow,
                LABEL_GLOW_HOVER,
                GLOW_TWEEN_SECS,
                Easing::Linear,
            );
        } else {
            tweens.start(
                Channel::ButtonScale,
                self.scale_mul,
                1.0,
                HOVER_OUT_SECS,
                Easing::QuadOut,
            );
            tweens.start(
                Channel::ButtonGlow,
                self.label_glow,
                LABEL_GLOW_IDLE,
                GLOW_TWEEN_SECS,
                Easing::Linear,
            );
        }
    }

    pub fn advance(&mut self, t_sec: f32) {
        self.float_y = (t_sec * VIEW_BUTTON_FLOAT_RATE).sin() * VIEW_BUTTON_FLOAT_AMPLITUDE;
    }

    pub fn world_center(&self) -> Vec3 {
        Vec3::new(0.0, self.base_y + self.float_y, VIEW_BUTTON_Z)
    }
}

/// House-shaped button that reloads the page (the only way back to the globe
/// field).
#[derive(Clone, Debug, Default)]
pub struct HomeButton {
    pub visible: bool,
    pub hovered: bool,
    pub scale_mul: f32,
    pub glow: f32,
    pub float_y: f32,
    pub yaw: f32,
}

impl HomeButton {
    pub fn new() -> Self {
        Self {
            scale_mul: 1.0,
            ..Self::default()
        }
    }

    pub fn on_city_selected(&mut self) {
        self.visible = true;
    }

    pub fn set_hovered(&mut self, hovered: bool, tweens: &mut Tweens) {
        if !self.visible || hovered == self.hovered {
            return;
        }
        self.hovered = hovered;
        let (scale, glow) = if hovered {
            (HOME_HOVER_SCALE, 1.0)
        } else {
            (1.0, 0.0)
        };
        tweens.start(
            Channel::HomeScale,
            self.scale_mul,
            scale,
            WIDGET_HOVER_SECS,
            Easing::QuadOut,
        );
        tweens.start(
            Channel::HomeGlow,
            self.glow,
            glow,
            WIDGET_HOVER_SECS,
            Easing::Linear,
        );
    }

    pub fn advance(&mut self, t_sec: f32) {
        self.float_y = (t_sec * HOME_FLOAT_RATE).sin() * HOME_FLOAT_AMPLITUDE;
        self.yaw = (t_sec * HOME_YAW_RATE).sin() * HOME_YAW_AMPLITUDE;
    }

    pub fn world_center(&self) -> Vec3 {
        Vec3::from(HOME_POS) + Vec3::new(0.0, self.float_y, 0.0)
    }
}

/// Local-time display for the selected city.
#[derive(Clone, Debug, Default)]
pub struct CityClock {
    pub visible: bool,
    pub hovered: bool,
    pub scale_mul: f32,
    pub glow: f32,
    pub float_y: f32,
    pub city_index: Option<usize>,
}

impl CityClock {
    pub fn new() -> Self {
        Self {
            scale_mul: 1.0,
            ..Self::default()
        }
    }

    pub fn on_city_selected(&mut self, city_index: usize) {
        self.visible = true;
        self.city_index = Some(city_index);
    }

    pub fn time_zone(&self) -> Option<&'static str> {
        self.city_index
            .and_then(cities::city)
            .map(|c| c.time_zone)
    }

    pub fn set_hovered(&mut self, hovered: bool, tweens: &mut Tweens) {
        if !self.visible || hovered == self.hovered {
            return;
        }
        self.hovered = hovered;
        let (scale, glow) = if hovered {
            (CLOCK_HOVER_SCALE, 1.0)
        } else {
            (1.0, 0.0)
        };
        tweens.start(
            Channel::ClockScale,
            self.scale_mul,
            scale,
            WIDGET_HOVER_SECS,
            Easing::QuadOut,
        );
        tweens.start(
            Channel::ClockGlow,
            self.glow,
            glow,
            WIDGET_HOVER_SECS,
            Easing::Linear,
        );
    }

    pub fn advance(&mut self, t_sec: f32) {
        self.float_y = (t_sec * CLOCK_FLOAT_RATE).sin() * CLOCK_FLOAT_AMPLITUDE;
    }

    pub fn world_center(&self) -> Vec3 {
        Vec3::from(CLOCK_POS) + Vec3::new(0.0, self.float_y, 0.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tween::{Channel, Tweens};

    #[test]
    fn view_button_create_is_idempotent() {
        let mut b = ViewButton::default();
        b.on_city_selected();
        assert!(b.created && b.visible && b.enabled);
        assert_eq!(b.scale_mul, 1.0);

        b.scale_mul = 0.7;
        b.on_city_selected();
        assert_eq!(b.scale_mul, 0.7, "re-create must not reset live state");
    }

    #[test]
    fn disabled_button_ignores_hover() {
        let mut b = ViewButton::default();
        let mut tw = Tweens::new();
        b.on_city_selected();
        b.begin_enter(&mut tw);
        assert!(!b.enabled);
        tw.cancel(Channel::ButtonScale);
        b.set_hovered(true, &mut tw);
        assert!(!b.hovered);
        assert!(!tw.is_active(Channel::ButtonScale));
    }

    #[test]
    fn exit_snaps_small_then_grows() {
        let mut b = ViewButton::default();
        let mut tw = Tweens::new();
        b.on_city_selected();
        b.begin_enter(&mut tw);
        b.begin_exit(&mut tw);
        assert!(b.enabled && b.visible);
        assert_eq!(b.scale_mul, VIEW_BUTTON_SHRINK_SCALE);
        assert!(tw.is_active(Channel::ButtonScale));
        assert!(tw.is_active(Channel::ButtonY));
    }

    #[test]
    fn float_offsets_ride_on_the_tweened_base() {
        let mut b = ViewButton::default();
        b.on_city_selected();
        b.base_y = -3.0;
        b.advance(0.5236); // sin(pi/2) peak for rate 3
        let y = b.world_center().y;
        assert!((y - (-3.0 + VIEW_BUTTON_FLOAT_AMPLITUDE)).abs() < 1e-3);
    }

    #[test]
    fn clock_retargets_on_every_selection() {
        let mut c = CityClock::new();
        assert_eq!(c.time_zone(), None);
        c.on_city_selected(4);
        assert_eq!(c.time_zone(), Some("Asia/Tokyo"));
        c.on_city_selected(2);
        assert_eq!(c.time_zone(), Some("Europe/London"));
        assert!(c.visible);
    }

    #[test]
    fn hidden_widgets_ignore_hover() {
        let mut h = HomeButton::new();
        let mut tw = Tweens::new();
        h.set_hovered(true, &mut tw);
        assert!(!h.hovered);
        h.on_city_selected();
        h.set_hovered(true, &mut tw);
        assert!(h.hovered);
        assert!(tw.is_active(Channel::HomeScale));
        assert!(tw.is_active(Channel::HomeGlow));
    }
}
