//! # blog-storage
//!
//! [`BlobStore`](blog_core::traits::BlobStore) implementation backed by any
//! S3 compatible endpoint (AWS S3, MinIO, ...).

mod s3;

pub use s3::{detect_content_type, S3BlobStore};
