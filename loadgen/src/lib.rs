pub mod batch;
pub mod category;
pub mod deliver;
pub mod device;
pub mod event;
pub mod time;
