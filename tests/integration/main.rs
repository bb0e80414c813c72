//! Integration tests run against wiremock servers

mod book_tests;
mod chapter_tests;
