//! Access group administration.
//!
//! | Method | Endpoint | Description |
//! |--------|----------|-------------|
//! | GET | `/api/admin/groups` | List groups with their projects |
//! | POST | `/api/admin/groups` | Create a group |
//! | GET | `/api/admin/groups/{name}` | Group info |
//! | DELETE | `/api/admin/groups/{name}` | Delete a group |
//! | POST | `/api/admin/groups/{name}/projects` | Grant projects to a group |
//! | POST | `/api/admin/projects` | Register a project |

pub mod dtos;
pub mod handlers;
pub mod models;
pub mod routes;
pub mod services;
pub mod store;

pub use services::AdminService;
pub use store::PgGroupStore;
