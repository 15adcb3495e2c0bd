// Event system test module
mod dispatcher_tests;
