pub mod activities;
pub mod children;
pub mod health;
pub mod parents;
pub mod transports;
pub mod vehicles;
