pub mod read_pages;
pub mod resolve;
