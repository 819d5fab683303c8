pub mod classification;
pub mod image_analysis;
