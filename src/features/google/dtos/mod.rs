mod credentials_dto;

pub use credentials_dto::*;
