#![cfg(test)]

pub mod common;
pub mod host_tests;
pub mod messaging_tests;
