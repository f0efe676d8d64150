pub mod comment;
pub mod document;
pub mod markup;
pub mod ticket;
pub mod user;
pub mod view;

pub use view::render_session;
