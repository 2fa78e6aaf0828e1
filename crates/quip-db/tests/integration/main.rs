mod common;
mod repository_tests;
