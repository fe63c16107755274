mod group_handlers;

pub use group_handlers::*;
