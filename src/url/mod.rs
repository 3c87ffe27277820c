//! URL handling module for Trawl
//!
//! Resolves the references found in pages against the URL of the page that
//! contained them. Resolution is pure URL algebra and never touches the
//! network.

mod resolve;

pub use resolve::{is_absolute, resolve, strip_fragment};
