
mod fake_test;
