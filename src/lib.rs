pub mod collector;
pub mod core;
pub mod deadlock;
pub mod dispatch;
pub mod manager;
pub mod observers;
pub mod pool;
