mod core;
mod heading;
mod keys;
mod marks;
mod math;
mod ops;
mod plugin;
mod render;
mod session;
mod transforms;
mod value;

pub use crate::core::*;
pub use crate::heading::*;
pub use crate::keys::*;
pub use crate::marks::*;
pub use crate::math::*;
pub use crate::ops::*;
pub use crate::plugin::*;
pub use crate::render::*;
pub use crate::session::*;
pub use crate::transforms::*;
pub use crate::value::*;
