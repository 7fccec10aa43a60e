pub mod activity;
pub mod child;
pub mod parent;
pub mod transport;
pub mod vehicle;
