// Marksync record managers
// Managers borrow the store connection and own one table family each: bookmarks, labels, session cookies.

pub mod bookmark_manager;
pub mod label_manager;
mod mutation;
pub mod session_manager;

pub use bookmark_manager::{BookmarkManager, BookmarkManagerTrait};
pub use label_manager::{LabelManager, LabelManagerTrait};
pub use session_manager::{SessionManager, SessionManagerTrait};
