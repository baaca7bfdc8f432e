pub mod application;
pub mod final_snapshot;
pub mod selection;
pub mod video;
