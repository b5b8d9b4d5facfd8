pub mod source;

pub use source::{new_seed, Source};
