pub mod bus;
pub mod feed;
pub mod map;
pub mod model;
pub mod notify;
pub mod services;
pub mod settings;
pub mod storage;
pub mod store;
pub mod worker;
