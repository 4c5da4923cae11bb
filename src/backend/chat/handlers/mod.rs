//! REST chat handlers
//!
//! Both routes sit behind `middleware::auth_middleware`.

pub mod receive;
pub mod send;

pub use receive::{receive_messages, MessageHistory};
pub use send::{send_message, SendMessageResponse};
