mod credentials;
mod linked_account;
mod service_account;
mod service_account_key;

pub use credentials::{GoogleCredentials, NewServiceAccount, ServiceAccountKeyInfo};
pub use linked_account::{LinkedAccount, LinkedAccountAccess, NewLinkedAccountAccess};
pub use service_account::{NewServiceAccountRecord, ServiceAccount};
pub use service_account_key::{NewServiceAccountKey, ServiceAccountKey};
