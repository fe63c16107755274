mod google_link_service;
mod service_account_service;

pub use google_link_service::GoogleLinkService;
pub use service_account_service::ServiceAccountService;
