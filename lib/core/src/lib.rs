//! # quotx Core
//!
//! Core library for the quotx quoting engine.
//!
//! This crate provides the fundamental data structures:
//!
//! - [`Vector`] - Dense embedding vector with similarity operations
//! - [`Point`] - An indexed part entry (id, vector, document, metadata)
//! - [`Collection`] - The part index: upsert-by-id + k-nearest-neighbor query
//!
//! ## Example
//!
//! ```rust
//! use quotx_core::{Collection, CollectionConfig, Distance, Point, Vector};
//!
//! let collection = Collection::new(CollectionConfig {
//!     name: "parts".to_string(),
//!     vector_dim: 3,
//!     distance: Distance::Cosine,
//! });
//!
//! let point = Point::new("p1", Vector::new(vec![1.0, 0.0, 0.0]), "Material: Steel", None);
//! collection.upsert(point).unwrap();
//!
//! let results = collection.search(&Vector::new(vec![1.0, 0.0, 0.0]), 1);
//! assert_eq!(results[0].0.id, "p1");
//! ```

pub mod collection;
pub mod error;
pub mod point;
pub mod vector;

pub use collection::{Collection, CollectionConfig, Distance};
pub use error::{Error, Result};
pub use point::Point;
pub use vector::Vector;
