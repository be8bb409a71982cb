pub mod colormap;
pub mod series;
