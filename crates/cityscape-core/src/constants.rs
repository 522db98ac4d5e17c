// Shared scene/animation tuning constants used by the web frontend.
// Rates are per second; the frame loop feeds real dt.

// Camera
pub const CAMERA_Z: f32 = 15.0;
pub const CAMERA_FOV_DEG: f32 = 75.0;
pub const CAMERA_NEAR: f32 = 0.1;
pub const CAMERA_FAR: f32 = 1000.0;

// Lighting
pub const LIGHT_DIR: [f32; 3] = [5.0, 3.0, 5.0];

// Globe field
pub const GLOBE_COUNT: usize = 15;
pub const GLOBE_RADIUS: f32 = 2.2;
pub const GLOBE_SPREAD: f32 = 30.0; // full edge length of the scatter cube
pub const GLOBE_GROUP_Z: f32 = -10.0;
pub const GLOBE_GROUP_YAW_SPEED: f32 = 0.06;
pub const GLOBE_GROUP_PITCH_SPEED: f32 = 0.03;
pub const GLOBE_SPIN_MIN: f32 = 0.18;
pub const GLOBE_SPIN_MAX: f32 = 0.36;
pub const GLOBES_EXIT_Y: f32 = -20.0; // where the field sinks to during the wall transition

// Image wall
pub const WALL_ROWS: usize = 4;
pub const WALL_COLS: usize = 5;
pub const WALL_SPACING: f32 = 5.0;
pub const WALL_RADIUS: f32 = 30.0;
pub const WALL_ARC: f32 = 0.3 * std::f32::consts::PI;
pub const WALL_ENTRY_Y: f32 = 20.0; // wall drops in from here
pub const WALL_SWAY_RATE: f32 = 0.5;
pub const WALL_SWAY_AMPLITUDE: f32 = 0.1;
pub const TILE_WIDTH: f32 = 4.0;
pub const TILE_HEIGHT: f32 = 3.0;
pub const TILE_ROT_JITTER: f32 = 0.2; // uniform span, centered on zero
pub const TILE_SCALE_MIN: f32 = 0.8;
pub const TILE_SCALE_SPAN: f32 = 0.4;

// Transition
pub const TRANSITION_SECS: f32 = 1.0;

// Busy spinner
pub const SPINNER_RING_COUNT: usize = 5;
pub const SPINNER_BASE_RADIUS: f32 = 0.4;
pub const SPINNER_RING_STEP: f32 = 0.15;
pub const SPINNER_TUBE: f32 = 0.03;
pub const SPINNER_SPIN_BASE: f32 = 1.2;
pub const SPINNER_SPIN_STEP: f32 = 0.48;
pub const SPINNER_PULSE_BASE: f32 = 3.0;
pub const SPINNER_PULSE_STEP: f32 = 1.0;
pub const SPINNER_PULSE_AMPLITUDE: f32 = 0.1;
pub const SPINNER_RING_COLORS: [[f32; 3]; 5] = [
    [0.310, 0.275, 0.898], // indigo
    [0.486, 0.227, 0.929], // violet
    [0.753, 0.149, 0.827], // fuchsia
    [0.882, 0.114, 0.282], // rose
    [0.961, 0.620, 0.043], // amber
];

// View button (crystal)
pub const VIEW_BUTTON_Z: f32 = 5.0;
pub const VIEW_BUTTON_RADIUS: f32 = 1.5;
pub const VIEW_BUTTON_BASE_SCALE: [f32; 3] = [2.0, 0.8, 0.4];
pub const VIEW_BUTTON_PICK_RADIUS: f32 = 2.0;
pub const VIEW_BUTTON_FLOAT_RATE: f32 = 3.0;
pub const VIEW_BUTTON_FLOAT_AMPLITUDE: f32 = 0.2;
pub const VIEW_BUTTON_EXIT_Y: f32 = -10.0;
pub const VIEW_BUTTON_HOVER_SCALE: f32 = 1.2;
pub const VIEW_BUTTON_SHRINK_SCALE: f32 = 0.5;
pub const VIEW_BUTTON_LABEL_OFFSET_Y: f32 = 2.4;
pub const LABEL_GLOW_IDLE: f32 = 0.8;
pub const LABEL_GLOW_HOVER: f32 = 1.5;
pub const ENTER_SCALE_SECS: f32 = 0.3;
pub const EXIT_SCALE_SECS: f32 = 0.5;
pub const BUTTON_DROP_SECS: f32 = 1.0;
pub const HOVER_IN_SECS: f32 = 0.3;
pub const HOVER_OUT_SECS: f32 = 0.2;
pub const GLOW_TWEEN_SECS: f32 = 0.2;

// Panorama
pub const PANORAMA_RADIUS: f32 = 500.0;
pub const PANORAMA_YAW_SPEED: f32 = 0.06;
pub const PANORAMA_TOUCH_RATE: f32 = 0.01; // radians per CSS pixel dragged
pub const PANORAMA_PITCH_LIMIT: f32 = 1.48; // just short of the poles

// Home button
pub const HOME_POS: [f32; 3] = [-8.0, 6.0, 5.0];
pub const HOME_PICK_RADIUS: f32 = 1.0;
pub const HOME_FLOAT_RATE: f32 = 2.0;
pub const HOME_FLOAT_AMPLITUDE: f32 = 0.05;
pub const HOME_YAW_RATE: f32 = 1.5;
pub const HOME_YAW_AMPLITUDE: f32 = 0.1;
pub const HOME_HOVER_SCALE: f32 = 1.2;
pub const HOME_GLOW_COLOR: [f32; 3] = [0.3, 0.6, 1.0];
pub const WIDGET_HOVER_SECS: f32 = 0.2;

// City clock
pub const CLOCK_POS: [f32; 3] = [8.0, 6.0, 5.0];
pub const CLOCK_PICK_RADIUS: f32 = 1.2;
pub const CLOCK_FACE_WIDTH: f32 = 2.0;
pub const CLOCK_FACE_HEIGHT: f32 = 0.8;
pub const CLOCK_FLOAT_RATE: f32 = 2.0;
pub const CLOCK_FLOAT_AMPLITUDE: f32 = 0.05;
pub const CLOCK_HOVER_SCALE: f32 = 1.1;

// Background ambience
pub const PARTICLE_COUNT: usize = 2000;
pub const PARTICLE_SPREAD: f32 = 100.0;
pub const PARTICLE_SIZE: f32 = 0.2;
pub const PARTICLE_OPACITY: f32 = 0.8;
pub const PARTICLE_SYSTEM_YAW_SPEED: f32 = 0.018;
pub const PARTICLE_SYSTEM_PITCH_SPEED: f32 = 0.006;
pub const PARTICLE_WOBBLE_SPEED: f32 = 0.6;
pub const GRID_HALF_LINES: i32 = 20;
pub const GRID_SPACING: f32 = 5.0;
pub const GRID_EXTENT: f32 = 100.0;
pub const GRID_Z: f32 = -50.0;
pub const GRID_COLOR: [f32; 3] = [0.0, 1.0, 1.0];
pub const GRID_OPACITY: f32 = 0.2;
pub const GLOW_SPHERE_COUNT: usize = 5;
pub const GLOW_SPHERE_RADIUS: f32 = 2.0;
pub const GLOW_SPHERE_SPREAD: f32 = 40.0;
pub const GLOW_SPHERE_Z: f32 = -30.0;
pub const GLOW_PULSE_MIN: f32 = 1.0;
pub const GLOW_PULSE_SPAN: f32 = 2.0;
