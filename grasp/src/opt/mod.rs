pub mod anchors;
pub mod compaction;
pub mod distributor;
pub mod loss;
pub mod orchestrator;
pub mod placer;
pub mod search;
pub mod two_level;
