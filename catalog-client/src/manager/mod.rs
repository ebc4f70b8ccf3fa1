//! Per-client caches for data that changes rarely upstream.
//!
//! Both managers are cheap handles around shared state; clones observe the
//! same cache. Nothing expires on its own, callers reset when they need
//! fresh data.
//!
//! | manager  | unit of replacement | `is_empty`                   |
//! |----------|---------------------|------------------------------|
//! | category | whole tree          | no tree fetched yet          |
//! | facet    | one facet group     | no group fetched yet         |

mod category;
mod facet;

pub use category::CategoryManager;
pub use facet::FacetManager;
