pub mod geometric_analysis;
pub mod interpolation;
