//! Filesystem operations used by the copy engine.

mod fingerprint;
mod helpers;
mod io_copy;
mod lock;
mod names;
mod publish;

pub use fingerprint::{fingerprint_file, ContentFingerprint};
pub use helpers::io_hint;
pub use lock::{try_acquire_dir_lock, DirLock};
pub use names::{collision_name, COLLISION_SEPARATOR};
pub use publish::{publish_copy, TEMP_PREFIX};
