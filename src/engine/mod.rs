pub mod aggregator;
pub mod correlation;
pub mod decoder;
pub mod filter;
pub mod metrics;
pub mod quadrant;
pub mod sorter;
pub mod summary;

#[cfg(test)]
pub(crate) mod test_support;
