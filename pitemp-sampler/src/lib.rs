pub mod sampler;
pub mod source;

pub use sampler::Sampler;
pub use source::{InvalidContent, SampleError, read_celsius};
