//! Wire contract and domain vocabulary shared by the resume chat client crates.

pub mod domain;
pub mod error;
pub mod protocol;
