mod get;
mod post;

pub use get::send_update_form;
pub use post::send_update;
