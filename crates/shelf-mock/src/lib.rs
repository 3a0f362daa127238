//! In-memory release host for tests
//!
//! `MemoryHost` implements `ReleaseHost` over a mutex-guarded state that
//! mirrors the GitHub rules shelf depends on:
//!
//! 1. Creating a release for an existing tag fails with a conflict (422)
//! 2. Writing an existing file without its current sha is rejected (422)
//! 3. A repository without releases has no latest release
//!
//! Failures can be injected per operation to exercise degraded paths:
//!
//! ```
//! use shelf_mock::{Failure, MemoryHost};
//!
//! let host = MemoryHost::new("alice");
//! host.add_repo("demo");
//! host.fail_uploads(Failure::Transport("CORS request rejected".to_string()));
//! ```

mod host;

pub use host::{Call, Failure, MemoryHost};
