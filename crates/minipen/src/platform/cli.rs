//! Native adapters: file-backed storage and preview, virtual time.

pub mod clock;
pub mod storage;
pub mod surface;

pub use clock::TestClock;
pub use storage::FileStorage;
pub use surface::FileSurface;
