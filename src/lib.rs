//! Flamekit - fractal flame genome library
//!
//! This library provides functionality to:
//! - Parse and serialize flam3-style genome documents, single or multi-flame
//! - Edit flames: xforms, post transforms, chaos, symmetry, framing
//! - Build and adjust 256-entry palettes
//! - Migrate documents written by older tools to the current attribute set
//!
//! Rendering is delegated to an external engine through [`render::Renderer`].
//!
//! ```
//! use flamekit::Flame;
//!
//! let mut flame = Flame::new();
//! flame.add_xform().set("julia", 0.5);
//! let text = flame.to_string();
//! let back: Flame = text.parse().unwrap();
//! assert_eq!(back.xform(0).unwrap().get("julia"), 0.5);
//! ```

pub mod chaos;
pub mod cli;
pub mod compat;
pub mod config;
pub mod flame;
pub mod fmt;
pub mod geometry;
pub mod output;
pub mod palette;
pub mod parser;
pub mod render;
pub mod value;
pub mod variations;
pub mod xform;

pub use flame::Flame;
pub use palette::Palette;
pub use parser::ParseError;
pub use xform::{PostXform, Triangle, Xform, XformId};
