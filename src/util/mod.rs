pub mod courier;
pub mod fetcher;
pub mod parser;
pub mod text;
