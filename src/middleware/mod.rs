pub mod guard;
pub mod response;

pub use guard::{navigation_guard, CurrentUser};
pub use response::ApiResponse;
