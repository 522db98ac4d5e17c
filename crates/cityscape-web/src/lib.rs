#![cfg(target_arch = "wasm32")]

//! Browser shell for the cityscape landing scene.
//!
//! All scene behavior lives in `cityscape-core`; this crate owns the DOM,
//! the WebGPU renderer, asset fetches and the frame loop, and feeds events
//! into the core [`Stage`].

pub mod assets;
pub mod camera;
pub mod constants;
pub mod dom;
pub mod events;
pub mod frame;
pub mod input;
pub mod render;
pub mod text;

use crate::constants::{CANVAS_ID, TEXT_TEX_HEIGHT, TEXT_TEX_WIDTH};
use crate::frame::{FrameContext, SceneTextures};
use crate::input::MouseState;
use crate::render::GpuState;
use cityscape_core::{assets as core_assets, cities, ClickAction, Stage, WallRebuild};
use std::cell::RefCell;
use std::rc::Rc;
use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;
use wasm_bindgen_futures::spawn_local;
use web_sys as web;

const LABEL_FONT: &str = "700 52px 'Segoe UI', sans-serif";
const LABEL_COLOR: &str = "#ffffff";
const LABEL_TEXT: &str = "360°";

/// Shared handles threaded through event wiring and async loads.
#[derive(Clone)]
pub struct AppHandles {
    pub stage: Rc<RefCell<Stage>>,
    pub gpu: Rc<RefCell<Option<GpuState<'static>>>>,
    pub textures: Rc<RefCell<SceneTextures>>,
}

#[wasm_bindgen(start)]
pub fn start() -> Result<(), JsValue> {
    console_error_panic_hook::set_once();
    console_log::init_with_level(log::Level::Info).ok();
    spawn_local(async {
        if let Err(e) = init().await {
            log::error!("init error: {:?}", e);
        }
    });
    Ok(())
}

async fn init() -> anyhow::Result<()> {
    let window = web::window().ok_or_else(|| anyhow::anyhow!("no window"))?;
    let document = window
        .document()
        .ok_or_else(|| anyhow::anyhow!("no document"))?;
    let canvas = document
        .get_element_by_id(CANVAS_ID)
        .ok_or_else(|| anyhow::anyhow!("no #{} canvas", CANVAS_ID))?
        .dyn_into::<web::HtmlCanvasElement>()
        .map_err(|e| anyhow::anyhow!(format!("{:?}", e)))?;
    dom::sync_canvas_backing_size(&canvas);
    {
        let canvas_r = canvas.clone();
        let closure = Closure::wrap(Box::new(move || {
            dom::sync_canvas_backing_size(&canvas_r);
        }) as Box<dyn FnMut()>);
        window
            .add_event_listener_with_callback("resize", closure.as_ref().unchecked_ref())
            .map_err(|e| anyhow::anyhow!("resize listener: {:?}", e))?;
        closure.forget();
    }

    // Wall-clock seed: every visit scatters the globes differently.
    let seed = js_sys::Date::now() as u64;
    let app = AppHandles {
        stage: Rc::new(RefCell::new(Stage::new(seed))),
        gpu: Rc::new(RefCell::new(None)),
        textures: Rc::new(RefCell::new(SceneTextures::default())),
    };

    frame::init_gpu(&canvas, app.gpu.clone()).await?;

    // Static textures: the crystal's label now, the earth when it arrives.
    match text::rasterize_text(
        &document,
        LABEL_TEXT,
        TEXT_TEX_WIDTH,
        TEXT_TEX_HEIGHT,
        LABEL_FONT,
        LABEL_COLOR,
    ) {
        Ok(img) => {
            let mut gpu_ref = app.gpu.borrow_mut();
            if let Some(gpu) = gpu_ref.as_mut() {
                app.textures.borrow_mut().label = Some(gpu.create_texture("view_label", &img));
            }
        }
        Err(e) => log::warn!("[app] label rasterize failed: {:?}", e),
    }
    spawn_earth_load(&app);

    {
        let app_nav = app.clone();
        let on_select: Rc<dyn Fn(usize)> = Rc::new(move |index| {
            handle_city_selected(&app_nav, index);
        });
        dom::build_city_nav(&document, on_select)?;
    }

    events::wire_input_handlers(&events::InputWiring {
        canvas: canvas.clone(),
        app: app.clone(),
        mouse: Rc::new(RefCell::new(MouseState::default())),
        hover: Rc::new(RefCell::new(None)),
        last_touch: Rc::new(RefCell::new(None)),
        drag_px: Rc::new(RefCell::new(0.0)),
    })?;

    let ctx = FrameContext {
        stage: app.stage.clone(),
        canvas,
        gpu: app.gpu.clone(),
        textures: app.textures.clone(),
        last_instant: instant::Instant::now(),
        frame_count: 0,
    };
    frame::start_loop(Rc::new(RefCell::new(ctx)));
    log::info!("[app] ready, {} cities in the nav", cities::CITIES.len());
    Ok(())
}

/// Nav click: rebuild the wall for `index` and kick off the photo batch.
pub fn handle_city_selected(app: &AppHandles, index: usize) {
    let rebuild = match app.stage.borrow_mut().select_city(index) {
        Some(r) => r,
        None => {
            log::warn!("[nav] ignored out-of-range city {index}");
            return;
        }
    };
    // The stage already cleared its tiles (and left any panorama), so the
    // matching GPU textures are dead now.
    {
        let mut gpu_ref = app.gpu.borrow_mut();
        let mut textures = app.textures.borrow_mut();
        if let Some(gpu) = gpu_ref.as_mut() {
            for (_, id) in textures.tiles.drain() {
                gpu.release_texture(id);
            }
            if let Some(id) = textures.panorama.take() {
                gpu.release_texture(id);
            }
        } else {
            textures.tiles.clear();
            textures.panorama = None;
        }
    }
    if let Some(document) = dom::window_document() {
        dom::mark_active_city(&document, index);
    }
    spawn_wall_loads(app, rebuild);
}

/// One fetch task per photo slot. Each completion reports back to the stage,
/// which rejects results from superseded batches.
fn spawn_wall_loads(app: &AppHandles, rebuild: WallRebuild) {
    let generation = rebuild.generation;
    for (slot, url) in rebuild.photo_urls.into_iter().enumerate() {
        let app = app.clone();
        spawn_local(async move {
            match assets::fetch_rgba(&url).await {
                Ok(img) => {
                    let accepted = app.stage.borrow_mut().on_photo_loaded(generation, slot);
                    if !accepted {
                        return;
                    }
                    let mut gpu_ref = app.gpu.borrow_mut();
                    if let Some(gpu) = gpu_ref.as_mut() {
                        let id = gpu.create_texture("tile", &img);
                        app.textures.borrow_mut().tiles.insert(slot, id);
                    }
                }
                Err(e) => {
                    log::warn!("[wall] photo {slot} failed: {e}");
                    app.stage.borrow_mut().on_photo_failed(generation, slot);
                }
            }
        });
    }
}

fn spawn_earth_load(app: &AppHandles) {
    let app = app.clone();
    spawn_local(async move {
        match assets::fetch_rgba(core_assets::EARTH_TEXTURE_URL).await {
            Ok(img) => {
                let mut gpu_ref = app.gpu.borrow_mut();
                if let Some(gpu) = gpu_ref.as_mut() {
                    let id = gpu.create_texture("earth", &img);
                    app.textures.borrow_mut().earth = Some(id);
                }
            }
            Err(e) => log::warn!("[assets] earth texture failed: {e}"),
        }
    });
}

/// Carry out the side effects of a canvas click the stage decided on.
pub fn apply_click_action(app: &AppHandles, action: ClickAction) {
    match action {
        ClickAction::EnterPanorama { url, city_index } => {
            {
                let mut gpu_ref = app.gpu.borrow_mut();
                let mut textures = app.textures.borrow_mut();
                if let Some(id) = textures.panorama.take() {
                    if let Some(gpu) = gpu_ref.as_mut() {
                        gpu.release_texture(id);
                    }
                }
            }
            let app = app.clone();
            spawn_local(async move {
                match assets::fetch_rgba(url).await {
                    Ok(img) => {
                        // The user may have left or switched city mid-load.
                        let still_current = {
                            let stage = app.stage.borrow();
                            stage.is_360 && stage.selected == Some(city_index)
                        };
                        if !still_current {
                            log::debug!("[click] panorama arrived after leaving, dropped");
                            return;
                        }
                        let mut gpu_ref = app.gpu.borrow_mut();
                        if let Some(gpu) = gpu_ref.as_mut() {
                            let id = gpu.create_texture("panorama", &img);
                            let mut textures = app.textures.borrow_mut();
                            if let Some(old) = textures.panorama.take() {
                                gpu.release_texture(old);
                            }
                            textures.panorama = Some(id);
                        }
                    }
                    Err(e) => log::error!("[click] panorama load failed: {e}"),
                }
            });
        }
        ClickAction::ExitPanorama => {
            let mut gpu_ref = app.gpu.borrow_mut();
            let mut textures = app.textures.borrow_mut();
            if let Some(id) = textures.panorama.take() {
                if let Some(gpu) = gpu_ref.as_mut() {
                    gpu.release_texture(id);
                }
            }
        }
        ClickAction::Ignored => {}
    }
}
