//! Advanced type safety utilities for compile-time guarantees.
//!
//! This module provides types and patterns that eliminate runtime validation
//! by encoding invariants in the type system. All validation happens at
//! system boundaries (CLI argument parsing, model construction), and the
//! rest of the application works with types that maintain invariants by
//! construction.
//!
//! # Key Concepts
//!
//! - **Phantom Types**: Zero-cost compile-time type markers
//! - **Parse, Don't Validate**: Validation happens once at boundaries
//! - **Make Illegal States Unrepresentable**: Invalid states cannot be constructed

use std::marker::PhantomData;
use std::path::PathBuf;

// Phantom types for path kind

/// Marker type indicating a path points to a directory.
#[derive(Debug, Clone, Copy)]
pub struct Directory;

/// Marker type indicating a path's existence is not verified.
#[derive(Debug, Clone, Copy)]
pub struct MaybeExists;

/// Marker type indicating a path has been verified to exist.
#[derive(Debug, Clone, Copy)]
pub struct Exists;

/// A path with compile-time guarantees about its kind and existence.
///
/// # Type Parameters
///
/// - `PathKind`: whether this is a directory (the only kind the CLI needs)
/// - `ExistenceKind`: whether the path has been verified to exist
#[derive(Debug, Clone)]
pub struct TypedPath<PathKind, ExistenceKind> {
    path: PathBuf,
    _path_kind: PhantomData<PathKind>,
    _existence: PhantomData<ExistenceKind>,
}

impl<P, E> TypedPath<P, E> {
    /// Returns the underlying `PathBuf`.
    pub fn as_path_buf(&self) -> &PathBuf {
        &self.path
    }
}

/// Builder for parsing and validating paths at system boundaries.
///
/// This is the only way to create `TypedPath` instances, ensuring all
/// validation happens at parse time rather than at construction time.
pub struct PathBuilder;

impl PathBuilder {
    /// Parses a path as an existing, readable directory.
    ///
    /// # Errors
    ///
    /// Returns [`PathError::InvalidDirectory`] if the path does not exist
    /// or is not a directory.
    pub fn parse_input_directory(path: PathBuf) -> Result<TypedPath<Directory, Exists>, PathError> {
        if path.exists() && path.is_dir() {
            Ok(TypedPath {
                path,
                _path_kind: PhantomData,
                _existence: PhantomData,
            })
        } else {
            Err(PathError::InvalidDirectory)
        }
    }

    /// Parses a path as an output directory.
    ///
    /// The directory itself need not exist yet (the generator creates it),
    /// but its parent must, so that a typo in the output root is caught
    /// before any emitter runs.
    ///
    /// # Errors
    ///
    /// Returns [`PathError::InvalidOutputDirectory`] if the parent does not
    /// exist.
    pub fn parse_output_directory(
        path: PathBuf,
    ) -> Result<TypedPath<Directory, MaybeExists>, PathError> {
        if path.parent().is_none_or(|p| p.exists()) {
            Ok(TypedPath {
                path,
                _path_kind: PhantomData,
                _existence: PhantomData,
            })
        } else {
            Err(PathError::InvalidOutputDirectory)
        }
    }
}

/// Errors raised while validating paths at system boundaries.
#[derive(Debug, thiserror::Error)]
pub enum PathError {
    /// The path is not a valid, existing directory.
    #[error("invalid directory: must exist and be a directory")]
    InvalidDirectory,

    /// The output directory's parent does not exist.
    #[error("invalid output directory: parent must exist")]
    InvalidOutputDirectory,
}

