pub mod convolve;
pub mod kernel;
pub mod pipeline;
