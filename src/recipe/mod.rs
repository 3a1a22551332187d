//! Recipe generation: dependency constraint translation + template rendering.

pub mod constraint;
pub mod template;

pub use template::generate_recipe;
