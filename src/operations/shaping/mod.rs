mod base;
mod extrude;
mod lathe;
mod patch;

pub use base::{BuildBase, BuildMode};
pub use extrude::ExtrudeProfile;
pub use lathe::Lathe;
pub use patch::{BuildPatch, Patch};
