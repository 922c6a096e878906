pub mod cache_service;
pub mod catalog_service;
pub mod document_source;
pub mod grading_service;
pub mod loader_service;
pub mod locale_service;
pub mod progress_service;
pub mod shuffle_service;
pub mod storage_service;
pub mod timer_service;
pub mod validation_service;
