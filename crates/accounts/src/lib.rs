//! On-disk implementation of the managed account directory.

pub mod directory;
pub mod manifest;

pub use {
    directory::FsAccountDirectory,
    manifest::{AccountManifest, MANIFEST_FILENAME},
};
