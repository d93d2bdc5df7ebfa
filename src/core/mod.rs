pub mod compose;
pub mod draft;
pub mod generation;
pub mod inflight;
pub mod refine;
pub mod session;
pub mod store;
pub mod suggest;
