mod credentials_handler;
mod link_handler;

pub use credentials_handler::*;
pub use link_handler::*;
