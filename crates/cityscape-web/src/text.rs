//! Text rasterised through an offscreen 2d canvas, handed to the renderer as
//! RGBA pixels. Used for the view-toggle label and the city clock face.

use crate::render::texture::RgbaBytes;
use wasm_bindgen::{JsCast, JsValue};
use web_sys as web;

/// Draw `text` centred on a transparent backing of the given pixel size.
pub fn rasterize_text(
    document: &web::Document,
    text: &str,
    width: u32,
    height: u32,
    font: &str,
    color: &str,
) -> anyhow::Result<RgbaBytes> {
    let canvas = document
        .create_element("canvas")
        .map_err(|e| anyhow::anyhow!("create canvas: {:?}", e))?
        .dyn_into::<web::HtmlCanvasElement>()
        .map_err(|e| anyhow::anyhow!("not a canvas: {:?}", e))?;
    canvas.set_width(width);
    canvas.set_height(height);
    let ctx = canvas
        .get_context("2d")
        .map_err(|e| anyhow::anyhow!("get 2d context: {:?}", e))?
        .ok_or_else(|| anyhow::anyhow!("no 2d context"))?
        .dyn_into::<web::CanvasRenderingContext2d>()
        .map_err(|e| anyhow::anyhow!("not a 2d context: {:?}", e))?;

    ctx.clear_rect(0.0, 0.0, width as f64, height as f64);
    ctx.set_font(font);
    ctx.set_text_align("center");
    ctx.set_text_baseline("middle");
    ctx.set_fill_style_str(color);
    ctx.fill_text(text, width as f64 / 2.0, height as f64 / 2.0)
        .map_err(|e| anyhow::anyhow!("fill_text: {:?}", e))?;

    let image = ctx
        .get_image_data(0.0, 0.0, width as f64, height as f64)
        .map_err(|e| anyhow::anyhow!("get_image_data: {:?}", e))?;
    Ok(RgbaBytes {
        width,
        height,
        pixels: image.data().0,
    })
}

/// Same, over a dark rounded panel so the glyphs read against any scene.
pub fn rasterize_panel_text(
    document: &web::Document,
    text: &str,
    width: u32,
    height: u32,
    font: &str,
    color: &str,
) -> anyhow::Result<RgbaBytes> {
    let canvas = document
        .create_element("canvas")
        .map_err(|e| anyhow::anyhow!("create canvas: {:?}", e))?
        .dyn_into::<web::HtmlCanvasElement>()
        .map_err(|e| anyhow::anyhow!("not a canvas: {:?}", e))?;
    canvas.set_width(width);
    canvas.set_height(height);
    let ctx = canvas
        .get_context("2d")
        .map_err(|e| anyhow::anyhow!("get 2d context: {:?}", e))?
        .ok_or_else(|| anyhow::anyhow!("no 2d context"))?
        .dyn_into::<web::CanvasRenderingContext2d>()
        .map_err(|e| anyhow::anyhow!("not a 2d context: {:?}", e))?;

    ctx.set_fill_style_str("rgba(10, 16, 32, 0.85)");
    ctx.fill_rect(0.0, 0.0, width as f64, height as f64);
    ctx.set_font(font);
    ctx.set_text_align("center");
    ctx.set_text_baseline("middle");
    ctx.set_fill_style_str(color);
    ctx.fill_text(text, width as f64 / 2.0, height as f64 / 2.0)
        .map_err(|e| anyhow::anyhow!("fill_text: {:?}", e))?;

    let image = ctx
        .get_image_data(0.0, 0.0, width as f64, height as f64)
        .map_err(|e| anyhow::anyhow!("get_image_data: {:?}", e))?;
    Ok(RgbaBytes {
        width,
        height,
        pixels: image.data().0,
    })
}

/// Current wall-clock time in an IANA zone, formatted HH:MM via the browser's
/// Intl machinery.
pub fn time_in_zone(zone: &str) -> String {
    let options = js_sys::Object::new();
    let _ = js_sys::Reflect::set(&options, &"timeZone".into(), &zone.into());
    let _ = js_sys::Reflect::set(&options, &"hour".into(), &"2-digit".into());
    let _ = js_sys::Reflect::set(&options, &"minute".into(), &"2-digit".into());
    let _ = js_sys::Reflect::set(&options, &"hour12".into(), &JsValue::FALSE);
    js_sys::Date::new_0()
        .to_locale_string("en-GB", &options)
        .into()
}
