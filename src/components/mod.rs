pub mod bubble_view;
pub mod page_view;
pub mod reader;
