//! Minimal scalar tween engine.
//!
//! Every animated scalar in the scene is addressed by a [`Channel`]. Starting
//! a tween on a channel replaces whatever was running there, so a hover that
//! reverses mid-flight simply restarts from the current value. The frame loop
//! calls [`Tweens::advance`] once per tick and applies the emitted samples.

use std::time::Duration;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Easing {
    Linear,
    QuadOut,
    BackIn,
    BackOut,
}

const BACK_OVERSHOOT: f32 = 1.70158;

pub fn ease(easing: Easing, k: f32) -> f32 {
    let k = k.clamp(0.0, 1.0);
    match easing {
        Easing::Linear => k,
        Easing::QuadOut => k * (2.0 - k),
        Easing::BackIn => {
            let s = BACK_OVERSHOOT;
            k * k * ((s + 1.0) * k - s)
        }
        Easing::BackOut => {
            let s = BACK_OVERSHOOT;
            let k = k - 1.0;
            k * k * ((s + 1.0) * k + s) + 1.0
        }
    }
}

/// Animated scalar slots. One tween may run per channel at a time.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Channel {
    GlobesY,
    WallY,
    ButtonY,
    ButtonScale,
    ButtonGlow,
    HomeScale,
    HomeGlow,
    ClockScale,
    ClockGlow,
}

#[derive(Clone, Copy, Debug)]
pub struct Sample {
    pub channel: Channel,
    pub value: f32,
    pub finished: bool,
}

#[derive(Clone, Debug)]
struct ActiveTween {
    channel: Channel,
    from: f32,
    to: f32,
    duration: f32,
    elapsed: f32,
    easing: Easing,
}

impl ActiveTween {
    fn value_at(&self, elapsed: f32) -> f32 {
        if self.duration <= 0.0 {
            return self.to;
        }
        let k = ease(self.easing, elapsed / self.duration);
        self.from + (self.to - self.from) * k
    }
}

#[derive(Clone, Debug, Default)]
pub struct Tweens {
    active: Vec<ActiveTween>,
}

impl Tweens {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start (or restart) a tween on a channel.
    pub fn start(&mut self, channel: Channel, from: f32, to: f32, secs: f32, easing: Easing) {
        self.active.retain(|t| t.channel != channel);
        self.active.push(ActiveTween {
            channel,
            from,
            to,
            duration: secs.max(0.0),
            elapsed: 0.0,
            easing,
        });
    }

    pub fn cancel(&mut self, channel: Channel) {
        self.active.retain(|t| t.channel != channel);
    }

    pub fn is_active(&self, channel: Channel) -> bool {
        self.active.iter().any(|t| t.channel == channel)
    }

    /// The value a running tween currently reports, if any. Used to restart
    /// hover tweens from mid-flight positions.
    pub fn current_value(&self, channel: Channel) -> Option<f32> {
        self.active
            .iter()
            .find(|t| t.channel == channel)
            .map(|t| t.value_at(t.elapsed))
    }

    /// Advance all tweens, pushing one sample per active channel. Finished
    /// tweens emit their exact end value and are removed.
    pub fn advance(&mut self, dt: Duration, out: &mut Vec<Sample>) {
        let dt = dt.as_secs_f32();
        for t in &mut self.active {
            t.elapsed += dt;
            let finished = t.elapsed >= t.duration;
            let value = if finished { t.to } else { t.value_at(t.elapsed) };
            out.push(Sample {
                channel: t.channel,
                value,
                finished,
            });
        }
        self.active.retain(|t| t.elapsed < t.duration);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    fn advance_collect(tw: &mut Tweens, secs: f32) -> Vec<Sample> {
        let mut out = Vec::new();
        tw.advance(Duration::from_secs_f32(secs), &mut out);
        out
    }

    #[test]
    fn easing_endpoints_are_exact() {
        for e in [Easing::Linear, Easing::QuadOut, Easing::BackIn, Easing::BackOut] {
            assert!((ease(e, 0.0)).abs() < 1e-6);
            assert!((ease(e, 1.0) - 1.0).abs() < 1e-6);
        }
    }

    #[test]
    fn quad_out_decelerates() {
        // First half covers more ground than the second half.
        let first = ease(Easing::QuadOut, 0.5);
        assert!(first > 0.5);
        assert!(ease(Easing::QuadOut, 0.25) < first);
    }

    #[test]
    fn back_in_dips_below_zero_and_back_out_overshoots() {
        assert!(ease(Easing::BackIn, 0.2) < 0.0);
        assert!(ease(Easing::BackOut, 0.8) > 1.0);
    }

    #[test]
    fn tween_reaches_exact_target_on_finish() {
        let mut tw = Tweens::new();
        tw.start(Channel::WallY, 20.0, 0.0, 1.0, Easing::QuadOut);
        let mid = advance_collect(&mut tw, 0.5);
        assert_eq!(mid.len(), 1);
        assert!(!mid[0].finished);
        assert!(mid[0].value > 0.0 && mid[0].value < 20.0);

        let end = advance_collect(&mut tw, 0.6);
        assert_eq!(end.len(), 1);
        assert!(end[0].finished);
        assert_eq!(end[0].value, 0.0);
        assert!(!tw.is_active(Channel::WallY));
        assert!(advance_collect(&mut tw, 0.1).is_empty());
    }

    #[test]
    fn restart_replaces_the_running_tween() {
        let mut tw = Tweens::new();
        tw.start(Channel::ButtonScale, 1.0, 1.2, 0.3, Easing::BackOut);
        advance_collect(&mut tw, 0.1);
        let mid = tw.current_value(Channel::ButtonScale).unwrap();
        tw.start(Channel::ButtonScale, mid, 1.0, 0.2, Easing::QuadOut);
        let end = advance_collect(&mut tw, 0.25);
        assert_eq!(end.len(), 1, "old tween must not survive the restart");
        assert!(end[0].finished);
        assert_eq!(end[0].value, 1.0);
    }

    #[test]
    fn zero_duration_finishes_immediately_at_target() {
        let mut tw = Tweens::new();
        tw.start(Channel::HomeGlow, 0.0, 1.0, 0.0, Easing::Linear);
        let out = advance_collect(&mut tw, 0.016);
        assert!(out[0].finished);
        assert_eq!(out[0].value, 1.0);
    }

    #[test]
    fn channels_advance_independently() {
        let mut tw = Tweens::new();
        tw.start(Channel::GlobesY, 0.0, -20.0, 1.0, Easing::QuadOut);
        tw.start(Channel::WallY, 20.0, 0.0, 1.0, Easing::QuadOut);
        let out = advance_collect(&mut tw, 0.5);
        assert_eq!(out.len(), 2);
        let globes = out.iter().find(|s| s.channel == Channel::GlobesY).unwrap();
        let wall = out.iter().find(|s| s.channel == Channel::WallY).unwrap();
        assert!(globes.value < 0.0);
        assert!(wall.value > 0.0);
    }
}
