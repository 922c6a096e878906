pub mod catalog_dto;
pub mod quiz_document;
pub mod validation_dto;
