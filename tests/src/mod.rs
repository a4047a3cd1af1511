#[cfg(test)]
pub mod pipeline_tests;
#[cfg(test)]
pub mod router_tests;
#[cfg(test)]
pub mod utils;
