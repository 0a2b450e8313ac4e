pub mod error;
pub mod extent;
pub mod features;
pub mod models;
pub mod projection;
pub mod renderer;
pub mod route;
pub mod style;
