pub mod blueprint;
pub mod condition;
pub mod context;
pub mod engine;
pub mod recorder;
pub mod redis_storage;
pub mod run;
pub mod storage;
pub mod task;
pub mod walker;
