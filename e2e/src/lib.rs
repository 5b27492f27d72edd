//! Black-box tests that boot the backend on a loopback port and drive it
//! through the `client` crate.

pub mod domain;
pub mod util;

#[cfg(test)]
mod tests;
