pub mod analysis;
pub mod content;
pub mod preview_service;
pub mod upload;
pub mod views;
