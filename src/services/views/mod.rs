pub mod derive;
pub mod tabs;
