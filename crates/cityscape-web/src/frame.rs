//! Per-frame driver: advances the stage, refreshes the clock face, turns the
//! stage's state into a [`SceneFrame`] and hands it to the renderer. The loop
//! reschedules itself through requestAnimationFrame.

use crate::constants::{CLOCK_REFRESH_FRAMES, TEXT_TEX_HEIGHT, TEXT_TEX_WIDTH};
use crate::render::{
    Blend, GpuState, LineDraw, LineRef, MeshDraw, MeshRef, PanoramaDraw, ParticleInstance,
    SceneFrame, TextureId,
};
use crate::text;
use cityscape_core::constants::{
    CLOCK_FACE_HEIGHT, CLOCK_FACE_WIDTH, GLOBE_GROUP_Z, GLOBE_RADIUS, GLOW_SPHERE_RADIUS,
    GRID_COLOR, GRID_OPACITY, GRID_Z, HOME_GLOW_COLOR, PARTICLE_OPACITY, PARTICLE_SIZE,
    TILE_HEIGHT, TILE_WIDTH, VIEW_BUTTON_BASE_SCALE, VIEW_BUTTON_LABEL_OFFSET_Y, VIEW_BUTTON_Z,
};
use cityscape_core::{ActiveScene, Stage};
use glam::{EulerRot, Mat4, Quat, Vec3, Vec4};
use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;
use std::time::Duration;
use wasm_bindgen::closure::Closure;
use wasm_bindgen::JsCast;
use web_sys as web;

const CLOCK_FONT: &str = "600 42px 'Segoe UI', sans-serif";
const CLOCK_COLOR: &str = "#7fdbff";

/// GPU-side textures owned by the shell, keyed off stage state. Tile slots
/// map straight onto [`cityscape_core::Tile::slot`].
#[derive(Default)]
pub struct SceneTextures {
    pub tiles: HashMap<usize, TextureId>,
    pub panorama: Option<TextureId>,
    pub earth: Option<TextureId>,
    pub label: Option<TextureId>,
    pub clock: Option<TextureId>,
    pub clock_text: String,
}

pub struct FrameContext {
    pub stage: Rc<RefCell<Stage>>,
    pub canvas: web::HtmlCanvasElement,
    pub gpu: Rc<RefCell<Option<GpuState<'static>>>>,
    pub textures: Rc<RefCell<SceneTextures>>,
    pub last_instant: instant::Instant,
    pub frame_count: u32,
}

pub async fn init_gpu(
    canvas: &web::HtmlCanvasElement,
    gpu: Rc<RefCell<Option<GpuState<'static>>>>,
) -> anyhow::Result<()> {
    // The surface holds a reference for the life of the page, so the canvas
    // handle is leaked rather than threaded through every caller.
    let leaked: &'static web::HtmlCanvasElement = Box::leak(Box::new(canvas.clone()));
    let state = GpuState::new(leaked).await?;
    *gpu.borrow_mut() = Some(state);
    log::info!("[gpu] renderer ready");
    Ok(())
}

pub fn start_loop(ctx: Rc<RefCell<FrameContext>>) {
    let tick: Rc<RefCell<Option<Closure<dyn FnMut()>>>> = Rc::new(RefCell::new(None));
    let tick_clone = tick.clone();
    *tick.borrow_mut() = Some(Closure::wrap(Box::new(move || {
        frame(&mut ctx.borrow_mut());
        if let Some(w) = web::window() {
            let _ = w.request_animation_frame(
                tick_clone.borrow().as_ref().unwrap().as_ref().unchecked_ref(),
            );
        }
    }) as Box<dyn FnMut()>));
    if let Some(w) = web::window() {
        let _ =
            w.request_animation_frame(tick.borrow().as_ref().unwrap().as_ref().unchecked_ref());
    }
}

pub fn frame(ctx: &mut FrameContext) {
    let now = instant::Instant::now();
    // Cap dt so a backgrounded tab does not fast-forward every animation.
    let dt = now
        .duration_since(ctx.last_instant)
        .min(Duration::from_millis(250));
    ctx.last_instant = now;

    ctx.stage.borrow_mut().advance(dt);

    ctx.frame_count = ctx.frame_count.wrapping_add(1);
    if ctx.frame_count % CLOCK_REFRESH_FRAMES == 0 {
        refresh_clock(ctx);
    }

    let scene = build_scene(&ctx.stage.borrow(), &ctx.textures.borrow());

    let mut gpu_ref = ctx.gpu.borrow_mut();
    let Some(gpu) = gpu_ref.as_mut() else {
        return;
    };
    gpu.resize_if_needed(ctx.canvas.width(), ctx.canvas.height());
    if let Err(e) = gpu.render(&scene) {
        log::warn!("[frame] surface error: {:?}", e);
    }
}

/// Re-rasterise the clock face when the displayed minute changes.
fn refresh_clock(ctx: &mut FrameContext) {
    let zone = {
        let stage = ctx.stage.borrow();
        if !stage.clock.visible {
            return;
        }
        match stage.clock.time_zone() {
            Some(z) => z,
            None => return,
        }
    };
    let now = text::time_in_zone(zone);
    if now == ctx.textures.borrow().clock_text {
        return;
    }
    let Some(document) = crate::dom::window_document() else {
        return;
    };
    match text::rasterize_panel_text(
        &document,
        &now,
        TEXT_TEX_WIDTH,
        TEXT_TEX_HEIGHT,
        CLOCK_FONT,
        CLOCK_COLOR,
    ) {
        Ok(img) => {
            let mut gpu_ref = ctx.gpu.borrow_mut();
            let Some(gpu) = gpu_ref.as_mut() else {
                return;
            };
            let mut textures = ctx.textures.borrow_mut();
            if let Some(old) = textures.clock.take() {
                gpu.release_texture(old);
            }
            textures.clock = Some(gpu.create_texture("clock", &img));
            textures.clock_text = now;
        }
        Err(e) => log::warn!("[clock] rasterize failed: {:?}", e),
    }
}

/// Flatten the stage into draw lists. Pure apart from reads, so the scene
/// composition is easy to eyeball in one place.
pub fn build_scene(stage: &Stage, textures: &SceneTextures) -> SceneFrame {
    let mut scene = SceneFrame::default();

    if stage.is_360 {
        scene.panorama = Some(PanoramaDraw {
            texture: textures.panorama,
            yaw: stage.panorama.yaw,
            pitch: stage.panorama.pitch,
        });
        return scene;
    }

    push_ambience(&mut scene, stage);

    if stage.globes.visible {
        push_globes(&mut scene, stage, textures);
    }
    if stage.scene == ActiveScene::CityImages && stage.wall.visible {
        push_wall(&mut scene, stage, textures);
    }
    if stage.spinner.visible {
        push_spinner(&mut scene, stage);
    }
    if stage.view_button.visible {
        push_view_button(&mut scene, stage, textures);
    }
    if stage.home_button.visible {
        push_home_button(&mut scene, stage);
    }
    if stage.clock.visible {
        push_clock(&mut scene, stage, textures);
    }

    scene
}

fn push_ambience(scene: &mut SceneFrame, stage: &Stage) {
    let a = &stage.ambience;

    scene.lines.push(LineDraw {
        lines: LineRef::Grid,
        model: Mat4::from_translation(Vec3::new(0.0, 0.0, GRID_Z))
            * Mat4::from_euler(EulerRot::YXZ, a.grid_yaw, a.grid_pitch, 0.0),
        color: Vec4::new(GRID_COLOR[0], GRID_COLOR[1], GRID_COLOR[2], GRID_OPACITY),
    });

    for g in &a.glows {
        scene.meshes.push(MeshDraw {
            mesh: MeshRef::Sphere,
            model: Mat4::from_translation(g.position)
                * Mat4::from_scale(Vec3::splat(GLOW_SPHERE_RADIUS * g.scale)),
            tint: Vec4::new(0.35, 0.55, 1.0, g.opacity),
            lit: false,
            brightness: 1.0,
            texture: None,
            blend: Blend::Additive,
        });
    }

    let rot = Quat::from_euler(EulerRot::YXZ, a.system_yaw, a.system_pitch, 0.0);
    scene.particles.extend(a.particles.iter().map(|p| {
        let world = rot * p.position;
        ParticleInstance {
            pos_size: [world.x, world.y, world.z, PARTICLE_SIZE],
            color: [p.color[0], p.color[1], p.color[2], PARTICLE_OPACITY],
        }
    }));
}

fn push_globes(scene: &mut SceneFrame, stage: &Stage, textures: &SceneTextures) {
    let f = &stage.globes;
    let group = Mat4::from_translation(Vec3::new(0.0, f.offset_y, GLOBE_GROUP_Z))
        * Mat4::from_euler(EulerRot::YXZ, f.group_yaw, f.group_pitch, 0.0);
    // Plain ocean blue until the earth texture arrives.
    let tint = if textures.earth.is_some() {
        Vec4::ONE
    } else {
        Vec4::new(0.25, 0.45, 0.85, 1.0)
    };
    for g in &f.globes {
        scene.meshes.push(MeshDraw {
            mesh: MeshRef::Sphere,
            model: group
                * Mat4::from_translation(g.position)
                * Mat4::from_quat(g.orientation)
                * Mat4::from_scale(Vec3::splat(GLOBE_RADIUS)),
            tint,
            lit: true,
            brightness: 1.0,
            texture: textures.earth,
            blend: Blend::Opaque,
        });
    }
}

fn push_wall(scene: &mut SceneFrame, stage: &Stage, textures: &SceneTextures) {
    let w = &stage.wall;
    let group = Mat4::from_translation(Vec3::new(0.0, w.offset_y, 0.0))
        * Mat4::from_rotation_y(w.sway);
    for tile in &w.tiles {
        scene.meshes.push(MeshDraw {
            mesh: MeshRef::Quad,
            model: group
                * Mat4::from_translation(tile.placement.position)
                * Mat4::from_euler(
                    EulerRot::YXZ,
                    tile.placement.yaw,
                    tile.jitter.pitch,
                    tile.jitter.roll,
                )
                * Mat4::from_scale(Vec3::new(
                    TILE_WIDTH * tile.jitter.scale,
                    TILE_HEIGHT * tile.jitter.scale,
                    1.0,
                )),
            tint: Vec4::ONE,
            lit: false,
            brightness: 1.0,
            texture: textures.tiles.get(&tile.slot).copied(),
            blend: Blend::Opaque,
        });
    }
}

fn push_spinner(scene: &mut SceneFrame, stage: &Stage) {
    let anchor = Vec3::new(0.0, 0.0, VIEW_BUTTON_Z);
    for (i, r) in stage.spinner.rings.iter().enumerate() {
        scene.meshes.push(MeshDraw {
            mesh: MeshRef::Ring(i),
            model: Mat4::from_translation(anchor)
                * Mat4::from_quat(r.orientation)
                * Mat4::from_scale(Vec3::splat(r.scale)),
            tint: Vec4::new(r.color[0], r.color[1], r.color[2], 1.0),
            lit: false,
            brightness: 1.0,
            texture: None,
            blend: Blend::Opaque,
        });
    }
}

fn push_view_button(scene: &mut SceneFrame, stage: &Stage, textures: &SceneTextures) {
    let b = &stage.view_button;
    let center = b.world_center();
    let body = Mat4::from_translation(center)
        * Mat4::from_scale(Vec3::from(VIEW_BUTTON_BASE_SCALE) * b.scale_mul);

    // Slow shimmer on the glass so the button reads as alive even untouched.
    let shimmer = 1.0 + 0.12 * (stage.time * 2.0).sin();
    scene.meshes.push(MeshDraw {
        mesh: MeshRef::Crystal,
        model: body,
        tint: Vec4::new(0.55, 0.8, 1.0, 0.55),
        lit: true,
        brightness: shimmer,
        texture: None,
        blend: Blend::Alpha,
    });
    scene.lines.push(LineDraw {
        lines: LineRef::CrystalWire,
        model: body,
        color: Vec4::new(0.85, 0.95, 1.0, 0.4),
    });
    scene.meshes.push(MeshDraw {
        mesh: MeshRef::Quad,
        model: Mat4::from_translation(center + Vec3::new(0.0, VIEW_BUTTON_LABEL_OFFSET_Y, 0.0))
            * Mat4::from_scale(Vec3::new(2.0, 0.75, 1.0)),
        tint: Vec4::ONE,
        lit: false,
        brightness: b.label_glow,
        texture: textures.label,
        blend: Blend::Alpha,
    });
}

fn push_home_button(scene: &mut SceneFrame, stage: &Stage) {
    let h = &stage.home_button;
    let base = Mat4::from_translation(h.world_center())
        * Mat4::from_rotation_y(h.yaw)
        * Mat4::from_scale(Vec3::splat(h.scale_mul));

    // Little house: squat cube body with a pyramid roof sitting flush on top.
    scene.meshes.push(MeshDraw {
        mesh: MeshRef::Cube,
        model: base
            * Mat4::from_translation(Vec3::new(0.0, -0.2, 0.0))
            * Mat4::from_scale(Vec3::new(0.9, 0.7, 0.9)),
        tint: Vec4::new(0.85, 0.9, 1.0, 1.0),
        lit: true,
        brightness: 1.0,
        texture: None,
        blend: Blend::Opaque,
    });
    scene.meshes.push(MeshDraw {
        mesh: MeshRef::Pyramid,
        model: base * Mat4::from_translation(Vec3::new(0.0, 0.4, 0.0)),
        tint: Vec4::new(0.95, 0.55, 0.35, 1.0),
        lit: true,
        brightness: 1.0,
        texture: None,
        blend: Blend::Opaque,
    });
    if h.glow > 0.001 {
        scene.meshes.push(MeshDraw {
            mesh: MeshRef::Sphere,
            model: base * Mat4::from_scale(Vec3::splat(0.9)),
            tint: Vec4::new(
                HOME_GLOW_COLOR[0],
                HOME_GLOW_COLOR[1],
                HOME_GLOW_COLOR[2],
                h.glow * 0.35,
            ),
            lit: false,
            brightness: 1.0,
            texture: None,
            blend: Blend::Additive,
        });
    }
}

fn push_clock(scene: &mut SceneFrame, stage: &Stage, textures: &SceneTextures) {
    let c = &stage.clock;
    scene.meshes.push(MeshDraw {
        mesh: MeshRef::Quad,
        model: Mat4::from_translation(c.world_center())
            * Mat4::from_scale(Vec3::new(
                CLOCK_FACE_WIDTH * c.scale_mul,
                CLOCK_FACE_HEIGHT * c.scale_mul,
                1.0,
            )),
        tint: Vec4::ONE,
        lit: false,
        brightness: 1.0 + c.glow * 0.3,
        texture: textures.clock,
        blend: Blend::Alpha,
    });
}
