//! Contract bindings for the token contract.
//!
//! The binding is generated using alloy's `sol!` macro.

pub mod token;

pub use token::IToken;
