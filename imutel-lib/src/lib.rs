#![doc = include_str!("../README.md")]

mod error;

pub mod framing;
pub mod packet;

pub use error::{Error, Result};
