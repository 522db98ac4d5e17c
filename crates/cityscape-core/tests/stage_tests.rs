// Integration tests driving the whole scene engine through its public API,
// the way the web shell does: select cities, complete photo loads out of
// order, toggle the panorama, and advance frames in between.

use cityscape_core::assets::PHOTO_COUNT;
use cityscape_core::constants::{GLOBES_EXIT_Y, PANORAMA_PITCH_LIMIT};
use cityscape_core::stage::{ActiveScene, ClickAction, Stage};
use std::time::Duration;

const TOKYO: usize = 4;
const LONDON: usize = 2;

fn frames(stage: &mut Stage, count: usize) {
    for _ in 0..count {
        stage.advance(Duration::from_millis(16));
    }
}

#[test]
fn tokyo_then_london_mid_load() {
    let mut stage = Stage::new(99);
    frames(&mut stage, 10);
    assert_eq!(stage.scene, ActiveScene::Globes);

    let tokyo = stage.select_city(TOKYO).unwrap();
    assert_eq!(tokyo.photo_urls.len(), PHOTO_COUNT);
    assert!(tokyo.photo_urls.iter().all(|u| u.contains("/Tokyo?")));
    assert!(stage.spinner.visible);
    assert!(stage.view_button.visible && stage.view_button.enabled);
    assert_eq!(stage.clock.time_zone(), Some("Asia/Tokyo"));

    // A dozen Tokyo photos land while the transition plays out.
    for slot in 0..12 {
        assert!(stage.on_photo_loaded(tokyo.generation, slot));
    }
    frames(&mut stage, 30);
    assert_eq!(stage.wall.tiles.len(), 12);
    assert!(stage.spinner.visible, "23 still outstanding");

    // Switch mid-load. The wall empties at once and the old batch goes stale.
    let london = stage.select_city(LONDON).unwrap();
    assert!(london.photo_urls.iter().all(|u| u.contains("/London?")));
    assert!(stage.wall.tiles.is_empty());
    assert_eq!(stage.clock.time_zone(), Some("Europe/London"));

    // Two Tokyo stragglers arrive next; both must be refused.
    assert!(!stage.on_photo_loaded(tokyo.generation, 12));
    assert!(!stage.on_photo_loaded(tokyo.generation, 13));
    assert!(stage.wall.tiles.is_empty());
    assert!(stage.spinner.visible);

    // London finishes with three failures mixed in, out of slot order.
    let mut accepted = 0;
    for slot in (0..PHOTO_COUNT).rev() {
        if slot < 3 {
            stage.on_photo_failed(london.generation, slot);
        } else {
            assert!(stage.on_photo_loaded(london.generation, slot));
            accepted += 1;
        }
    }
    assert!(!stage.spinner.visible, "spinner hides on the final completion");
    assert_eq!(stage.wall.tiles.len(), accepted);
    assert_eq!(accepted, PHOTO_COUNT - 3);

    // Every accepted tile kept its own slot.
    let mut slots: Vec<usize> = stage.wall.tiles.iter().map(|t| t.slot).collect();
    slots.sort_unstable();
    slots.dedup();
    assert_eq!(slots.len(), accepted);
}

#[test]
fn globe_field_never_returns_after_first_selection() {
    let mut stage = Stage::new(5);
    stage.select_city(0).unwrap();
    frames(&mut stage, 120); // well past the one-second transition
    assert!(!stage.globes.visible);
    assert!((stage.globes.offset_y - GLOBES_EXIT_Y).abs() < 1e-4);

    for index in [3, 6, 1] {
        stage.select_city(index).unwrap();
        frames(&mut stage, 5);
        assert_eq!(stage.scene, ActiveScene::CityImages);
        assert!(!stage.globes.visible, "globes stay retired");
    }
}

#[test]
fn panorama_round_trip_via_canvas_clicks() {
    let mut stage = Stage::new(2);
    let rebuild = stage.select_city(LONDON).unwrap();
    for slot in 0..PHOTO_COUNT {
        stage.on_photo_loaded(rebuild.generation, slot);
    }

    let enter = stage.handle_click(true);
    let ClickAction::EnterPanorama { url, city_index } = enter else {
        panic!("expected to enter the panorama, got {enter:?}");
    };
    assert_eq!(city_index, LONDON);
    assert!(url.ends_with(".jpeg"));
    assert!(stage.is_360);

    // The sphere self-rotates and honours drag, clamped in pitch.
    let yaw_before = stage.panorama.yaw;
    frames(&mut stage, 60);
    assert!(stage.panorama.yaw > yaw_before);
    stage.rotate_panorama(50.0, 400.0);
    assert!(stage.panorama.pitch <= PANORAMA_PITCH_LIMIT);

    // While immersed the wall does not sway and the crystal is parked.
    assert!(!stage.view_button.enabled);
    let sway = stage.wall.sway;
    frames(&mut stage, 30);
    assert_eq!(stage.wall.sway, sway);

    // Any click exits, even one that would miss the crystal.
    assert_eq!(stage.handle_click(false), ClickAction::ExitPanorama);
    assert!(!stage.is_360);
    assert!(stage.view_button.enabled);

    // A fresh orientation greets the next entry.
    stage.rotate_panorama(0.0, 0.0);
    stage.handle_click(true);
    assert_eq!(stage.panorama.yaw, 0.0);
    assert_eq!(stage.panorama.pitch, 0.0);
}

#[test]
fn same_seed_reproduces_the_first_wall() {
    let mut a = Stage::new(1234);
    let mut b = Stage::new(1234);
    let ra = a.select_city(TOKYO).unwrap();
    let rb = b.select_city(TOKYO).unwrap();
    assert_eq!(ra.photo_urls, rb.photo_urls);

    for slot in 0..PHOTO_COUNT {
        a.on_photo_loaded(ra.generation, slot);
        b.on_photo_loaded(rb.generation, slot);
    }
    for (ta, tb) in a.wall.tiles.iter().zip(b.wall.tiles.iter()) {
        assert_eq!(ta.slot, tb.slot);
        assert_eq!(ta.jitter.pitch, tb.jitter.pitch);
        assert_eq!(ta.jitter.scale, tb.jitter.scale);
    }
}

#[test]
fn full_wall_tiles_stay_on_the_arc() {
    let mut stage = Stage::new(7);
    let rebuild = stage.select_city(0).unwrap();
    for slot in 0..PHOTO_COUNT {
        stage.on_photo_loaded(rebuild.generation, slot);
    }
    let cfg = stage.wall.config;
    for tile in &stage.wall.tiles {
        let p = tile.placement.position;
        assert!(p.x.abs() <= cfg.radius * (cfg.arc / 2.0).sin() + 1e-3);
        assert!(p.z <= 1e-3, "tiles curve away from the camera: {p:?}");
        assert!(tile.jitter.scale >= 0.8 && tile.jitter.scale <= 1.2);
    }
}
