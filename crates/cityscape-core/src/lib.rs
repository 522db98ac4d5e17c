//! Scene engine for the cityscape page, kept free of browser and GPU types
//! so the whole state machine runs under plain `cargo test` on the host.
//!
//! The entry point is [`stage::Stage`]: feed it selection and click events,
//! call [`stage::Stage::advance`] once per frame, then read the subsystem
//! structs to draw. Randomness is injected through the seed handed to
//! [`stage::Stage::new`], so every layout decision is reproducible.

pub mod ambience;
pub mod assets;
pub mod batch;
pub mod cities;
pub mod constants;
pub mod globes;
pub mod layout;
pub mod spinner;
pub mod stage;
pub mod tween;
pub mod wall;
pub mod widgets;

pub use ambience::*;
pub use assets::*;
pub use batch::*;
pub use cities::*;
pub use globes::*;
pub use layout::*;
pub use spinner::*;
pub use stage::*;
pub use tween::*;
pub use wall::*;
pub use widgets::*;
