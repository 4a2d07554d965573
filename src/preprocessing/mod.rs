//! Region preprocessing applied before OCR

pub mod pipeline;
pub mod steps;

pub use pipeline::Pipeline;
