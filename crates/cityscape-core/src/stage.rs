//! Scene orchestration: the active-scene state machine, the city-selection
//! transition, panorama toggling, load-batch bookkeeping and the per-frame
//! advance that multiplexes every animated subsystem.
//!
//! The stage is the single owner of scene state. The web shell feeds it
//! events (nav clicks, canvas clicks, load completions) and reads the
//! resulting fields each frame to build draw lists; it never mutates scene
//! state directly.

use crate::ambience::Ambience;
use crate::assets;
use crate::batch::{BatchEvent, BatchTracker, Generation};
use crate::cities;
use crate::constants::{
    GLOBES_EXIT_Y, GLOBE_COUNT, PANORAMA_PITCH_LIMIT, PANORAMA_TOUCH_RATE, PANORAMA_YAW_SPEED,
    TRANSITION_SECS, WALL_ENTRY_Y,
};
use crate::globes::GlobeField;
use crate::spinner::Spinner;
use crate::tween::{Channel, Easing, Sample, Tweens};
use crate::wall::ImageWall;
use crate::widgets::{CityClock, HomeButton, ViewButton};
use rand::rngs::StdRng;
use rand::SeedableRng;
use std::time::Duration;

/// Which main scene is showing. The globe field shows exactly once, at
/// startup; after the first city selection the stage stays on the wall.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ActiveScene {
    Globes,
    CityImages,
}

/// Returned by [`Stage::select_city`]: the shell spawns one load per URL,
/// tagging each task with the generation and its slot index.
#[derive(Clone, Debug, PartialEq)]
pub struct WallRebuild {
    pub generation: Generation,
    pub city_index: usize,
    pub photo_urls: Vec<String>,
}

/// What a canvas click amounted to.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ClickAction {
    EnterPanorama {
        url: &'static str,
        city_index: usize,
    },
    ExitPanorama,
    Ignored,
}

#[derive(Clone, Copy, Debug, Default)]
pub struct PanoramaView {
    pub yaw: f32,
    pub pitch: f32,
}

pub struct Stage {
    pub scene: ActiveScene,
    pub is_360: bool,
    pub selected: Option<usize>,
    /// Seconds since construction; drives all absolute-time motions.
    pub time: f32,
    pub tweens: Tweens,
    pub batch: BatchTracker,
    pub globes: GlobeField,
    pub wall: ImageWall,
    pub spinner: Spinner,
    pub ambience: Ambience,
    pub view_button: ViewButton,
    pub home_button: HomeButton,
    pub clock: CityClock,
    pub panorama: PanoramaView,
    rng: StdRng,
}

impl Stage {
    pub fn new(seed: u64) -> Self {
        let mut rng = StdRng::seed_from_u64(seed);
        let globes = GlobeField::new(GLOBE_COUNT, &mut rng);
        let ambience = Ambience::new(&mut rng);
        Self {
            scene: ActiveScene::Globes,
            is_360: false,
            selected: None,
            time: 0.0,
            tweens: Tweens::new(),
            batch: BatchTracker::new(),
            globes,
            wall: ImageWall::new(),
            spinner: Spinner::new(),
            ambience,
            view_button: ViewButton::default(),
            home_button: HomeButton::new(),
            clock: CityClock::new(),
            panorama: PanoramaView::default(),
            rng,
        }
    }

    /// Nav-bar selection. The first call transitions Globes -> CityImages;
    /// later calls only rebuild the wall. Returns the photo batch to load,
    /// or `None` for an out-of-range index.
    pub fn select_city(&mut self, index: usize) -> Option<WallRebuild> {
        let city = cities::city(index)?;
        if self.is_360 {
            // Leaving via the nav while in the panorama: drop back first.
            self.exit_panorama();
        }
        self.selected = Some(index);

        if self.scene == ActiveScene::Globes {
            self.scene = ActiveScene::CityImages;
            self.tweens.start(
                Channel::GlobesY,
                self.globes.offset_y,
                GLOBES_EXIT_Y,
                TRANSITION_SECS,
                Easing::QuadOut,
            );
            self.wall.visible = true;
            self.wall.offset_y = WALL_ENTRY_Y;
            self.tweens.start(
                Channel::WallY,
                WALL_ENTRY_Y,
                0.0,
                TRANSITION_SECS,
                Easing::QuadOut,
            );
            log::info!("[stage] first selection, leaving the globe field");
        }

        // Synchronous teardown before the new batch begins; stale loads from
        // the old batch will be rejected by generation.
        self.wall.clear();
        let generation = self.batch.begin(assets::PHOTO_COUNT);
        self.spinner.visible = true;
        let photo_urls = assets::photo_urls(city, assets::PHOTO_COUNT, &mut self.rng);

        // Widget hooks, always in this order.
        self.view_button.on_city_selected();
        self.home_button.on_city_selected();
        self.clock.on_city_selected(index);

        log::info!(
            "[stage] city selected: {} ({} photos queued)",
            city.slug,
            photo_urls.len()
        );
        Some(WallRebuild {
            generation,
            city_index: index,
            photo_urls,
        })
    }

    /// A photo arrived. Returns true if it was accepted into the current
    /// wall; false means the shell must discard the texture.
    pub fn on_photo_loaded(&mut self, generation: Generation, slot: usize) -> bool {
        match self.batch.note(generation) {
            BatchEvent::Stale => {
                log::debug!("[wall] stale photo for slot {slot}, dropped");
                false
            }
            event => {
                self.wall.add_tile(slot, &mut self.rng);
                if event == BatchEvent::Finished {
                    self.spinner.visible = false;
                    log::info!("[wall] batch complete, {} tiles", self.wall.tiles.len());
                }
                true
            }
        }
    }

    /// A photo failed. Counts toward completion without adding a tile.
    pub fn on_photo_failed(&mut self, generation: Generation, slot: usize) {
        match self.batch.note(generation) {
            BatchEvent::Stale => {}
            event => {
                log::warn!("[wall] photo {slot} failed to load");
                if event == BatchEvent::Finished {
                    self.spinner.visible = false;
                    log::info!("[wall] batch complete, {} tiles", self.wall.tiles.len());
                }
            }
        }
    }

    /// Canvas click. While the panorama is up, any click exits; otherwise a
    /// hit on the enabled crystal enters it, if the city has a panorama.
    pub fn handle_click(&mut self, hit_view_button: bool) -> ClickAction {
        if self.is_360 {
            self.exit_panorama();
            return ClickAction::ExitPanorama;
        }
        if !hit_view_button || !self.view_button.enabled || !self.view_button.visible {
            return ClickAction::Ignored;
        }
        let Some(city_index) = self.selected else {
            return ClickAction::Ignored;
        };
        let Some(city) = cities::city(city_index) else {
            return ClickAction::Ignored;
        };
        match assets::panorama_url(city.slug) {
            Some(url) => {
                self.is_360 = true;
                self.panorama = PanoramaView::default();
                self.view_button.begin_enter(&mut self.tweens);
                log::info!("[stage] entering panorama for {}", city.slug);
                ClickAction::EnterPanorama { url, city_index }
            }
            None => {
                log::warn!("[stage] {} has no panorama, toggle refused", city.slug);
                ClickAction::Ignored
            }
        }
    }

    fn exit_panorama(&mut self) {
        self.is_360 = false;
        self.view_button.begin_exit(&mut self.tweens);
        log::info!("[stage] leaving panorama");
    }

    /// Touch drag while the panorama is up, in CSS pixels moved.
    pub fn rotate_panorama(&mut self, dx_px: f32, dy_px: f32) {
        if !self.is_360 {
            return;
        }
        self.panorama.yaw += dx_px * PANORAMA_TOUCH_RATE;
        self.panorama.pitch = (self.panorama.pitch + dy_px * PANORAMA_TOUCH_RATE)
            .clamp(-PANORAMA_PITCH_LIMIT, PANORAMA_PITCH_LIMIT);
    }

    pub fn set_view_button_hovered(&mut self, hovered: bool) {
        self.view_button.set_hovered(hovered, &mut self.tweens);
    }

    pub fn set_home_hovered(&mut self, hovered: bool) {
        self.home_button.set_hovered(hovered, &mut self.tweens);
    }

    pub fn set_clock_hovered(&mut self, hovered: bool) {
        self.clock.set_hovered(hovered, &mut self.tweens);
    }

    /// One frame. Order: tweens, ambience (always), then the scene branch,
    /// then home button and clock.
    pub fn advance(&mut self, dt: Duration) {
        let dt_sec = dt.as_secs_f32();
        self.time += dt_sec;

        let mut samples = Vec::new();
        self.tweens.advance(dt, &mut samples);
        for s in &samples {
            self.apply_sample(s);
        }

        self.ambience.advance(dt_sec, self.time);

        if self.is_360 {
            self.panorama.yaw += PANORAMA_YAW_SPEED * dt_sec;
        } else {
            if self.scene == ActiveScene::Globes {
                self.globes.advance(dt_sec);
            }
            if self.scene == ActiveScene::CityImages {
                self.wall.advance(self.time);
            }
            self.spinner.advance(dt_sec, self.time);
            if self.view_button.visible {
                self.view_button.advance(self.time);
            }
        }

        if self.home_button.visible {
            self.home_button.advance(self.time);
        }
        if self.clock.visible {
            self.clock.advance(self.time);
        }
    }

    fn apply_sample(&mut self, s: &Sample) {
        match s.channel {
            Channel::GlobesY => {
                self.globes.offset_y = s.value;
                if s.finished {
                    self.globes.visible = false;
                }
            }
            Channel::WallY => self.wall.offset_y = s.value,
            Channel::ButtonY => self.view_button.base_y = s.value,
            Channel::ButtonScale => self.view_button.scale_mul = s.value,
            Channel::ButtonGlow => self.view_button.label_glow = s.value,
            Channel::HomeScale => self.home_button.scale_mul = s.value,
            Channel::HomeGlow => self.home_button.glow = s.value,
            Channel::ClockScale => self.clock.scale_mul = s.value,
            Channel::ClockGlow => self.clock.glow = s.value,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn step(stage: &mut Stage, secs: f32) {
        stage.advance(Duration::from_secs_f32(secs));
    }

    #[test]
    fn starts_on_the_globe_field() {
        let stage = Stage::new(1);
        assert_eq!(stage.scene, ActiveScene::Globes);
        assert!(stage.globes.visible);
        assert!(!stage.wall.visible);
        assert!(!stage.is_360);
        assert!(stage.selected.is_none());
        assert!(!stage.view_button.created);
    }

    #[test]
    fn transition_fires_once_then_updates() {
        let mut stage = Stage::new(1);
        let first = stage.select_city(4).unwrap();
        assert_eq!(stage.scene, ActiveScene::CityImages);
        assert!(stage.wall.visible);
        assert_eq!(stage.wall.offset_y, WALL_ENTRY_Y);
        assert!(stage.tweens.is_active(Channel::GlobesY));
        assert!(stage.tweens.is_active(Channel::WallY));

        // Let both transition tweens finish.
        step(&mut stage, 1.5);
        assert!(!stage.globes.visible);
        assert_eq!(stage.globes.offset_y, GLOBES_EXIT_Y);
        assert_eq!(stage.wall.offset_y, 0.0);

        let second = stage.select_city(2).unwrap();
        assert_eq!(stage.scene, ActiveScene::CityImages);
        assert!(!stage.tweens.is_active(Channel::GlobesY), "no re-transition");
        assert_ne!(first.generation, second.generation);
    }

    #[test]
    fn invalid_index_is_rejected() {
        let mut stage = Stage::new(1);
        assert!(stage.select_city(99).is_none());
        assert_eq!(stage.scene, ActiveScene::Globes);
        assert!(stage.selected.is_none());
    }

    #[test]
    fn selection_rebuild_clears_tiles_and_shows_spinner() {
        let mut stage = Stage::new(1);
        let r1 = stage.select_city(0).unwrap();
        assert_eq!(r1.photo_urls.len(), assets::PHOTO_COUNT);
        assert!(stage.spinner.visible);
        assert!(stage.on_photo_loaded(r1.generation, 0));
        assert_eq!(stage.wall.tiles.len(), 1);

        let r2 = stage.select_city(1).unwrap();
        assert!(stage.wall.tiles.is_empty(), "rebuild clears synchronously");
        // A late arrival from the first batch is rejected outright.
        assert!(!stage.on_photo_loaded(r1.generation, 1));
        assert!(stage.wall.tiles.is_empty());
        assert!(stage.on_photo_loaded(r2.generation, 0));
        assert_eq!(stage.wall.tiles.len(), 1);
    }

    #[test]
    fn spinner_hides_exactly_when_the_batch_settles() {
        let mut stage = Stage::new(1);
        let r = stage.select_city(0).unwrap();
        let n = r.photo_urls.len();
        // Mix successes and failures; every completion counts.
        for slot in 0..n - 1 {
            if slot % 5 == 3 {
                stage.on_photo_failed(r.generation, slot);
            } else {
                assert!(stage.on_photo_loaded(r.generation, slot));
            }
            assert!(stage.spinner.visible, "spinner stays until the last one");
        }
        stage.on_photo_failed(r.generation, n - 1);
        assert!(!stage.spinner.visible);
        // K = successes only.
        let failures = (0..n - 1).filter(|s| s % 5 == 3).count() + 1;
        assert_eq!(stage.wall.tiles.len(), n - failures);
    }

    #[test]
    fn click_toggles_panorama_with_gating() {
        let mut stage = Stage::new(1);
        // Nothing selected yet: no crystal, nothing happens.
        assert_eq!(stage.handle_click(true), ClickAction::Ignored);

        stage.select_city(4).unwrap(); // tokyo
        let action = stage.handle_click(true);
        match action {
            ClickAction::EnterPanorama { url, city_index } => {
                assert_eq!(city_index, 4);
                assert!(url.contains("6fndpTM"));
            }
            other => panic!("expected enter, got {other:?}"),
        }
        assert!(stage.is_360);
        assert!(!stage.view_button.enabled);

        // Re-entry is blocked; the disabled crystal no longer responds as a
        // button, but any click exits.
        assert_eq!(stage.handle_click(true), ClickAction::ExitPanorama);
        assert!(!stage.is_360);
        assert!(stage.view_button.enabled);

        // Clicks that miss the crystal do nothing outside the panorama.
        assert_eq!(stage.handle_click(false), ClickAction::Ignored);
    }

    #[test]
    fn nav_selection_while_in_panorama_exits_first() {
        let mut stage = Stage::new(1);
        stage.select_city(0).unwrap();
        stage.handle_click(true);
        assert!(stage.is_360);
        stage.select_city(2).unwrap();
        assert!(!stage.is_360);
        assert_eq!(stage.selected, Some(2));
    }

    #[test]
    fn panorama_auto_yaws_and_clamps_touch_pitch() {
        let mut stage = Stage::new(1);
        stage.select_city(0).unwrap();
        stage.handle_click(true);
        let yaw0 = stage.panorama.yaw;
        step(&mut stage, 1.0);
        assert!((stage.panorama.yaw - yaw0 - PANORAMA_YAW_SPEED).abs() < 1e-4);

        stage.rotate_panorama(0.0, 1e6);
        assert_eq!(stage.panorama.pitch, PANORAMA_PITCH_LIMIT);
        stage.rotate_panorama(0.0, -2e6);
        assert_eq!(stage.panorama.pitch, -PANORAMA_PITCH_LIMIT);

        // Outside the panorama the drag is inert.
        stage.handle_click(false);
        let yaw = stage.panorama.yaw;
        stage.rotate_panorama(100.0, 0.0);
        assert_eq!(stage.panorama.yaw, yaw);
    }

    #[test]
    fn globes_freeze_once_the_wall_takes_over() {
        let mut stage = Stage::new(1);
        step(&mut stage, 0.5);
        let yaw_moving = stage.globes.group_yaw;
        assert!(yaw_moving > 0.0);

        stage.select_city(0).unwrap();
        let yaw_at_switch = stage.globes.group_yaw;
        step(&mut stage, 0.5);
        assert_eq!(stage.globes.group_yaw, yaw_at_switch);
        // The sinking tween still moves them down while frozen.
        assert!(stage.globes.offset_y < 0.0);
    }

    #[test]
    fn ambience_always_advances() {
        let mut stage = Stage::new(1);
        let yaw0 = stage.ambience.system_yaw;
        step(&mut stage, 0.25);
        assert!(stage.ambience.system_yaw > yaw0);

        stage.select_city(0).unwrap();
        stage.handle_click(true); // into the panorama
        let yaw1 = stage.ambience.system_yaw;
        step(&mut stage, 0.25);
        assert!(stage.ambience.system_yaw > yaw1);
    }

    #[test]
    fn hover_is_gated_while_in_panorama() {
        let mut stage = Stage::new(1);
        stage.select_city(0).unwrap();
        stage.handle_click(true);
        stage.set_view_button_hovered(true);
        assert!(!stage.view_button.hovered);
    }
}
