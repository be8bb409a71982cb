pub mod cumulative;
pub mod demographics;
pub mod export;
pub mod tests_bag;
