//! Subcommand handlers.
//!
//! Each file in this module corresponds to one user-facing command:
//!
//! | File          | Invocation                       | Description                     |
//! |---------------|----------------------------------|---------------------------------|
//! | `apply.rs`    | `fix-checksums apply`            | Record current hashes           |
//! | `restore.rs`  | `fix-checksums restore`          | Put the original manifest back  |
//! | `status.rs`   | `fix-checksums [status]`         | Read-only drift report          |
//! | `init.rs`     | `fix-checksums init`             | Scaffold a config file          |
//! | `cleanup.rs`  | before `apply` / `restore`       | Remove other versions' backups  |

pub mod apply;
pub mod cleanup;
pub mod init;
pub mod restore;
pub mod status;
