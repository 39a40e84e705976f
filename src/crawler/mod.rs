// Document sources — web crawl, local files, or a fixed list.

pub mod client;
pub mod files;
pub mod html;
pub mod memory;
pub mod rate_limit;
pub mod traits;
pub mod web;
