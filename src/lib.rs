pub mod config;
pub mod contact;
pub mod error;
pub mod events;
pub mod gesture;
pub mod slides;
pub mod source;
pub mod tasks {
    pub mod controller;
    pub mod preload;
    pub mod viewer;
}
