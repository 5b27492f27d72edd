//! Wire types shared by the to-do server and its clients.

pub mod domain;
pub mod error;
