//! Domain entities - the core business objects.

mod category;
mod comment;
mod location;
mod post;
mod user;

pub use category::{Category, is_valid_slug};
pub use comment::Comment;
pub use location::Location;
pub use post::Post;
pub use user::User;
