//! Search-engine-friendly article routing.
//!
//! [`SefRouter`] turns an article id, category and language into the public
//! path visitors use, e.g. `/index.php/en/news/my-article`.

pub mod sef;

pub use sef::{SefRouter, SefRouterConfig};
