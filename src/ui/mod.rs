pub mod image;
mod layout;

pub use layout::draw_ui;
