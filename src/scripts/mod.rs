pub mod dtos;
pub mod handlers;
pub mod markup;
pub mod pages;
pub mod title;

pub use markup::parse_script_markup;
pub use title::extract_title;
