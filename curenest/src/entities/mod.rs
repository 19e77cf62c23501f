mod autoclave;
mod instance;
mod item;
mod layout;
mod placed_item;
mod solution;

#[doc(inline)]
pub use autoclave::Autoclave;
#[doc(inline)]
pub use autoclave::RaisedLevel;
#[doc(inline)]
pub use autoclave::Stand;
#[doc(inline)]
pub use instance::NestInstance;
#[doc(inline)]
pub use instance::NestOptions;
#[doc(inline)]
pub use instance::Spacing;
#[doc(inline)]
pub use item::CureCycleId;
#[doc(inline)]
pub use item::Item;
#[doc(inline)]
pub use layout::Layout;
#[doc(inline)]
pub use layout::LayoutSnapshot;
#[doc(inline)]
pub use layout::ResourceConflict;
#[doc(inline)]
pub use placed_item::Level;
#[doc(inline)]
pub use placed_item::PItemKey;
#[doc(inline)]
pub use placed_item::PlacedItem;
#[doc(inline)]
pub use solution::BatchSolution;
#[doc(inline)]
pub use solution::Exclusion;
#[doc(inline)]
pub use solution::ExclusionReason;
