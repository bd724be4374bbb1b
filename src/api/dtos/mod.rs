pub mod common;
pub mod message_dto;

pub use common::*;
pub use message_dto::*;
