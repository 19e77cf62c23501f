mod geo_enums;
mod interference;
mod rect;

#[doc(inline)]
pub use geo_enums::Orientation;
#[doc(inline)]
pub use interference::GroundObstacle;
#[doc(inline)]
pub use interference::fits_within_bin;
#[doc(inline)]
pub use interference::overlaps;
#[doc(inline)]
pub use interference::stand_interferes;
#[doc(inline)]
pub use rect::Rect;
