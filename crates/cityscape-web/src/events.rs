//! DOM event wiring: pointer hover/click picking against the floating
//! widgets, drag-to-look and touch-drag for the panorama. Each handler owns
//! Rc clones of the state it touches and is leaked with `forget`, living as
//! long as the page.

use crate::input::{self, MouseState, WidgetKind};
use crate::{camera, dom, AppHandles};
use cityscape_core::constants::{
    CLOCK_PICK_RADIUS, HOME_PICK_RADIUS, VIEW_BUTTON_PICK_RADIUS,
};
use glam::{Vec2, Vec3};
use std::cell::RefCell;
use std::rc::Rc;
use wasm_bindgen::closure::Closure;
use wasm_bindgen::JsCast;
use web_sys as web;

/// A click that moved further than this is a drag, not a tap.
const DRAG_SUPPRESS_PX: f32 = 5.0;

pub struct InputWiring {
    pub canvas: web::HtmlCanvasElement,
    pub app: AppHandles,
    pub mouse: Rc<RefCell<MouseState>>,
    pub hover: Rc<RefCell<Option<WidgetKind>>>,
    pub last_touch: Rc<RefCell<Option<Vec2>>>,
    pub drag_px: Rc<RefCell<f32>>,
}

pub fn wire_input_handlers(w: &InputWiring) -> anyhow::Result<()> {
    // pointermove: hover picking, or look-around while dragging the panorama
    {
        let canvas_m = w.canvas.clone();
        let app_m = w.app.clone();
        let mouse_m = w.mouse.clone();
        let hover_m = w.hover.clone();
        let drag_m = w.drag_px.clone();
        let closure = Closure::wrap(Box::new(move |ev: web::PointerEvent| {
            let pos = input::mouse_canvas_px(&ev, &canvas_m);
            {
                let mut m = mouse_m.borrow_mut();
                m.x = pos.x;
                m.y = pos.y;
            }
            let mut stage = app_m.stage.borrow_mut();
            if stage.is_360 {
                if mouse_m.borrow().down {
                    stage.rotate_panorama(ev.movement_x() as f32, ev.movement_y() as f32);
                    *drag_m.borrow_mut() +=
                        (ev.movement_x().abs() + ev.movement_y().abs()) as f32;
                }
                if hover_m.borrow_mut().take().is_some() {
                    dom::set_canvas_cursor(&canvas_m, false);
                }
                return;
            }

            let mut targets: Vec<(WidgetKind, Vec3, f32)> = Vec::new();
            if stage.view_button.visible && stage.view_button.enabled {
                targets.push((
                    WidgetKind::ViewButton,
                    stage.view_button.world_center(),
                    VIEW_BUTTON_PICK_RADIUS,
                ));
            }
            if stage.home_button.visible {
                targets.push((
                    WidgetKind::Home,
                    stage.home_button.world_center(),
                    HOME_PICK_RADIUS,
                ));
            }
            if stage.clock.visible {
                targets.push((WidgetKind::Clock, stage.clock.world_center(), CLOCK_PICK_RADIUS));
            }
            let (ro, rd) = camera::screen_to_world_ray(&canvas_m, pos.x, pos.y);
            let hit = input::pick_widget(ro, rd, &targets);
            let prev = *hover_m.borrow();
            if hit != prev {
                stage.set_view_button_hovered(hit == Some(WidgetKind::ViewButton));
                stage.set_home_hovered(hit == Some(WidgetKind::Home));
                stage.set_clock_hovered(hit == Some(WidgetKind::Clock));
                *hover_m.borrow_mut() = hit;
                dom::set_canvas_cursor(&canvas_m, hit.is_some());
                if let Some(kind) = hit {
                    log::debug!("[mouse] hover {:?}", kind);
                }
            }
        }) as Box<dyn FnMut(_)>);
        w.canvas
            .add_event_listener_with_callback("pointermove", closure.as_ref().unchecked_ref())
            .map_err(|e| anyhow::anyhow!("pointermove listener: {:?}", e))?;
        closure.forget();
    }

    // pointerdown: arm dragging, capture so the drag survives leaving the canvas
    {
        let canvas_d = w.canvas.clone();
        let mouse_d = w.mouse.clone();
        let drag_d = w.drag_px.clone();
        let closure = Closure::wrap(Box::new(move |ev: web::PointerEvent| {
            mouse_d.borrow_mut().down = true;
            *drag_d.borrow_mut() = 0.0;
            let _ = canvas_d.set_pointer_capture(ev.pointer_id());
            ev.prevent_default();
        }) as Box<dyn FnMut(_)>);
        w.canvas
            .add_event_listener_with_callback("pointerdown", closure.as_ref().unchecked_ref())
            .map_err(|e| anyhow::anyhow!("pointerdown listener: {:?}", e))?;
        closure.forget();
    }

    // pointerup
    {
        let canvas_u = w.canvas.clone();
        let mouse_u = w.mouse.clone();
        let closure = Closure::wrap(Box::new(move |ev: web::PointerEvent| {
            mouse_u.borrow_mut().down = false;
            let _ = canvas_u.release_pointer_capture(ev.pointer_id());
        }) as Box<dyn FnMut(_)>);
        w.canvas
            .add_event_listener_with_callback("pointerup", closure.as_ref().unchecked_ref())
            .map_err(|e| anyhow::anyhow!("pointerup listener: {:?}", e))?;
        closure.forget();
    }

    // click: widgets first, then the panorama enter/exit path
    {
        let app_c = w.app.clone();
        let hover_c = w.hover.clone();
        let drag_c = w.drag_px.clone();
        let closure = Closure::wrap(Box::new(move |_ev: web::MouseEvent| {
            let hover = *hover_c.borrow();
            match hover {
                Some(WidgetKind::Home) => {
                    log::info!("[click] home, reloading");
                    if let Some(win) = web::window() {
                        let _ = win.location().reload();
                    }
                }
                Some(WidgetKind::Clock) => {}
                Some(WidgetKind::ViewButton) | None => {
                    let dragged = *drag_c.borrow() > DRAG_SUPPRESS_PX;
                    if app_c.stage.borrow().is_360 && dragged {
                        return;
                    }
                    let action = app_c
                        .stage
                        .borrow_mut()
                        .handle_click(hover == Some(WidgetKind::ViewButton));
                    crate::apply_click_action(&app_c, action);
                }
            }
        }) as Box<dyn FnMut(_)>);
        w.canvas
            .add_event_listener_with_callback("click", closure.as_ref().unchecked_ref())
            .map_err(|e| anyhow::anyhow!("click listener: {:?}", e))?;
        closure.forget();
    }

    // touchstart
    {
        let app_t = w.app.clone();
        let last_t = w.last_touch.clone();
        let drag_t = w.drag_px.clone();
        let closure = Closure::wrap(Box::new(move |ev: web::TouchEvent| {
            *last_t.borrow_mut() = input::first_touch_client_xy(&ev);
            *drag_t.borrow_mut() = 0.0;
            if app_t.stage.borrow().is_360 {
                ev.prevent_default();
            }
        }) as Box<dyn FnMut(_)>);
        w.canvas
            .add_event_listener_with_callback("touchstart", closure.as_ref().unchecked_ref())
            .map_err(|e| anyhow::anyhow!("touchstart listener: {:?}", e))?;
        closure.forget();
    }

    // touchmove: one-finger look-around in the panorama
    {
        let app_t = w.app.clone();
        let last_t = w.last_touch.clone();
        let drag_t = w.drag_px.clone();
        let closure = Closure::wrap(Box::new(move |ev: web::TouchEvent| {
            let Some(p) = input::first_touch_client_xy(&ev) else {
                return;
            };
            let prev = last_t.borrow_mut().replace(p);
            let Some(prev) = prev else {
                return;
            };
            let d = p - prev;
            let mut stage = app_t.stage.borrow_mut();
            if stage.is_360 {
                stage.rotate_panorama(d.x, d.y);
                *drag_t.borrow_mut() += d.x.abs() + d.y.abs();
                ev.prevent_default();
                log::trace!("[gesture] pan {:?}", d);
            }
        }) as Box<dyn FnMut(_)>);
        w.canvas
            .add_event_listener_with_callback("touchmove", closure.as_ref().unchecked_ref())
            .map_err(|e| anyhow::anyhow!("touchmove listener: {:?}", e))?;
        closure.forget();
    }

    // touchend
    {
        let last_t = w.last_touch.clone();
        let closure = Closure::wrap(Box::new(move |_ev: web::TouchEvent| {
            *last_t.borrow_mut() = None;
        }) as Box<dyn FnMut(_)>);
        w.canvas
            .add_event_listener_with_callback("touchend", closure.as_ref().unchecked_ref())
            .map_err(|e| anyhow::anyhow!("touchend listener: {:?}", e))?;
        closure.forget();
    }

    Ok(())
}
