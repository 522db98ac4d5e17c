// DOM ids and renderer sizing constants

pub const CANVAS_ID: &str = "scene-canvas";
pub const NAV_ID: &str = "city-nav";
pub const NAV_INDICATOR_ID: &str = "nav-indicator";

// Per-draw uniform slots; one frame never comes close to this many draws
pub const MAX_DRAWS: usize = 256;
// WebGPU min_uniform_buffer_offset_alignment is 256 on every backend we target
pub const PER_DRAW_STRIDE: u64 = 256;

// Backing store for rasterised widget text
pub const TEXT_TEX_WIDTH: u32 = 256;
pub const TEXT_TEX_HEIGHT: u32 = 96;

// How often the clock face is re-checked against wall time, in frames
pub const CLOCK_REFRESH_FRAMES: u32 = 30;

// Depth format shared by every scene pipeline
pub const DEPTH_FORMAT: wgpu::TextureFormat = wgpu::TextureFormat::Depth24Plus;
