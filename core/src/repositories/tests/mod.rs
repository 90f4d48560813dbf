mod entity_repository_tests;
mod memory_store_tests;
