pub mod config;
pub mod core;
pub mod directory;
pub mod feed;
pub mod storage;
