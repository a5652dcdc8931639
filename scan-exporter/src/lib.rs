pub mod error;
pub mod pcd;
pub mod ply;

pub use error::SaveError;
