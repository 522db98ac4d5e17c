use crate::constants::{NAV_ID, NAV_INDICATOR_ID};
use cityscape_core::cities::CITIES;
use std::rc::Rc;
use wasm_bindgen::JsCast;
use web_sys as web;

#[inline]
pub fn window_document() -> Option<web::Document> {
    web::window().and_then(|w| w.document())
}

pub fn sync_canvas_backing_size(canvas: &web::HtmlCanvasElement) {
    if let Some(w) = web::window() {
        let dpr = w.device_pixel_ratio();
        let rect = canvas.get_bounding_client_rect();
        let w_px = (rect.width() * dpr) as u32;
        let h_px = (rect.height() * dpr) as u32;
        canvas.set_width(w_px.max(1));
        canvas.set_height(h_px.max(1));
    }
}

fn city_button_id(index: usize) -> String {
    format!("city-btn-{index}")
}

/// Fill the nav container with one button per city and wire each to the
/// selection callback. The container must already exist in the page.
pub fn build_city_nav(
    document: &web::Document,
    on_select: Rc<dyn Fn(usize)>,
) -> anyhow::Result<()> {
    let nav = document
        .get_element_by_id(NAV_ID)
        .ok_or_else(|| anyhow::anyhow!("missing #{NAV_ID}"))?;
    for (i, city) in CITIES.iter().enumerate() {
        let button = document
            .create_element("button")
            .map_err(|e| anyhow::anyhow!("create button: {:?}", e))?;
        button.set_id(&city_button_id(i));
        let _ = button.set_attribute("class", "city");
        button.set_text_content(Some(city.label));
        nav.append_child(&button)
            .map_err(|e| anyhow::anyhow!("append button: {:?}", e))?;

        let on_select = on_select.clone();
        let closure = wasm_bindgen::closure::Closure::wrap(Box::new(move || {
            on_select(i);
        }) as Box<dyn FnMut()>);
        let _ = button.add_event_listener_with_callback("click", closure.as_ref().unchecked_ref());
        closure.forget();
    }
    let indicator = document
        .create_element("div")
        .map_err(|e| anyhow::anyhow!("create indicator: {:?}", e))?;
    indicator.set_id(NAV_INDICATOR_ID);
    nav.append_child(&indicator)
        .map_err(|e| anyhow::anyhow!("append indicator: {:?}", e))?;
    Ok(())
}

/// Move the `active` class onto the selected city's button and slide the
/// underline indicator beneath it.
pub fn mark_active_city(document: &web::Document, index: usize) {
    for i in 0..CITIES.len() {
        if let Some(el) = document.get_element_by_id(&city_button_id(i)) {
            let list = el.class_list();
            if i == index {
                let _ = list.add_1("active");
            } else {
                let _ = list.remove_1("active");
            }
        }
    }
    let nav = document.get_element_by_id(NAV_ID);
    let button = document.get_element_by_id(&city_button_id(index));
    let indicator = document.get_element_by_id(NAV_INDICATOR_ID);
    if let (Some(nav), Some(button), Some(indicator)) = (nav, button, indicator) {
        // The indicator is absolutely positioned inside the nav, so the
        // offsets are relative to the nav's own rect.
        let nav_rect = nav.get_bounding_client_rect();
        let rect = button.get_bounding_client_rect();
        let left = rect.left() - nav_rect.left();
        let style = format!("left:{left:.0}px;width:{:.0}px", rect.width());
        let _ = indicator.set_attribute("style", &style);
    }
}

/// Inline cursor hint while a pickable widget is under the pointer.
pub fn set_canvas_cursor(canvas: &web::HtmlCanvasElement, pointer: bool) {
    let style = if pointer { "cursor:pointer" } else { "" };
    let _ = canvas.set_attribute("style", style);
}
