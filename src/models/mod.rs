pub mod classify_types;
pub mod upload_types;
pub mod view_types;
