pub mod file;
pub mod http;
pub mod json_file;
pub mod memory;

pub use file::FileArtifactSource;
pub use http::HttpArtifactSource;
pub use json_file::JsonFileStore;
pub use memory::MemoryStore;
