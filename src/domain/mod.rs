pub mod comment;
pub mod document;
pub mod filter;
pub mod github;
pub mod solution;
pub mod ticket;
pub mod user;
