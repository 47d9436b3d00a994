//! Integration tests for wordblame

mod helpers;

mod cli_test;
mod driver_test;
mod engine_props_test;
mod store_test;
