mod client_tests;
mod query_tests;
