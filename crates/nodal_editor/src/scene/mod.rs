//! Scene file I/O.

mod serializer;

pub use serializer::SceneSerializer;
