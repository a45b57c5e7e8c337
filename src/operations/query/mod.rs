mod attachment;
mod surface_hit;

pub use attachment::AttachmentValidator;
pub use surface_hit::{raycast_scene, SurfaceHit, SurfaceHitResolver, TargetSet};
