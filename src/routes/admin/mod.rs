mod dashboard;
mod logout;
mod send_update;

pub use dashboard::*;
pub use logout::*;
pub use send_update::*;
