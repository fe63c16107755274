//! Google service accounts and credentials.
//!
//! Every (client, user) pair gets its own service account inside the user's
//! proxy group; the account with no client is the user's primary account.
//!
//! | Method | Endpoint | Description |
//! |--------|----------|-------------|
//! | GET | `/api/credentials/google` | Key metadata for the caller's client account |
//! | POST, PUT | `/api/credentials/google` | Mint a key for the caller's client account |
//! | DELETE | `/api/credentials/google/{key_id}` | Delete one of the caller's keys |
//! | POST | `/api/credentials/google/primary` | Get or create the primary account key (`force` always mints) |
//! | GET | `/api/link/google` | Linked Google account email |
//! | PATCH | `/api/link/google` | Extend the linked account's proxy group access |
//! | DELETE | `/api/link/google` | Unlink the Google account |

pub mod clients;
pub mod dtos;
pub mod handlers;
pub mod models;
pub mod routes;
pub mod services;
pub mod store;

pub use services::{GoogleLinkService, ServiceAccountService};
pub use store::PgServiceAccountStore;
