//! Differentiation and integration.

pub mod differentiate;
pub mod integrate;

pub use differentiate::{differentiate, differentiate_n};
pub use integrate::{PARTS_DEPTH_LIMIT, Strategy, TRANSFORM_SIZE_LIMIT, integrate};
