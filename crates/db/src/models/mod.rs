pub mod company;
pub mod document;
pub mod document_counter;
pub mod document_event;
