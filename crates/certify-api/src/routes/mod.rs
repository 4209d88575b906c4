//! # API Route Modules
//!
//! | Route                          | Module             |
//! |--------------------------------|--------------------|
//! | `POST /api/issue-certificate`  | [`certificates`]   |
//! | `POST /api/verify-certificate` | [`certificates`]   |
//! | `POST /api/revoke-certificate` | [`certificates`]   |
//! | `GET /api/certificate/:hash`   | [`certificates`]   |
//! | `POST /api/verify-file`        | [`files`]          |
//! | `GET /api/contract-info`       | [`contract`]       |
//! | `/health/*`                    | [`health`]         |

pub mod certificates;
pub mod contract;
pub mod files;
pub mod health;
