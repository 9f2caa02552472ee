pub mod bucket;
pub mod fs;

pub use bucket::BucketManager;
pub use fs::FsObjectStore;
