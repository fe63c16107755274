mod account_id;
mod google_cloud;
mod token_manager;

pub use account_id::valid_service_account_id_for_client;
pub use google_cloud::{GoogleCloudManager, GoogleCloudProvider};
pub use token_manager::GoogleTokenManager;
