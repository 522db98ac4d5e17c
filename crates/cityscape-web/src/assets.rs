//! Remote image fetch and decode. Photos, panoramas and the shared earth
//! texture all come through here; callers decide what to do with a failure
//! (a missing wall photo just leaves a gap, a missing panorama logs loudly).

use crate::render::texture::RgbaBytes;
use gloo_net::http::Request;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum FetchError {
    #[error("http status {0}")]
    Status(u16),
    #[error("network: {0}")]
    Network(String),
    #[error("decode: {0}")]
    Decode(String),
}

pub async fn fetch_rgba(url: &str) -> Result<RgbaBytes, FetchError> {
    let resp = Request::get(url)
        .send()
        .await
        .map_err(|e| FetchError::Network(e.to_string()))?;
    if !resp.ok() {
        return Err(FetchError::Status(resp.status()));
    }
    let bytes = resp
        .binary()
        .await
        .map_err(|e| FetchError::Network(e.to_string()))?;
    let decoded =
        image::load_from_memory(&bytes).map_err(|e| FetchError::Decode(e.to_string()))?;
    let rgba = decoded.to_rgba8();
    let (width, height) = rgba.dimensions();
    Ok(RgbaBytes {
        width,
        height,
        pixels: rgba.into_raw(),
    })
}
