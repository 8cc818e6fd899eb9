pub mod app_state;
pub mod comment_queue;
pub mod diff_state;
pub mod input_buffer;
pub mod navigator_state;
pub mod viewed_state;

pub use app_state::AppState;
pub use comment_queue::CommentQueue;
pub use diff_state::DiffState;
pub use navigator_state::NavigatorState;
pub use viewed_state::ViewedFiles;
