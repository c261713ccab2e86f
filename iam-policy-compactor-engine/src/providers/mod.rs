//! Thin I/O shims used by the batch API

// Native filesystem provider implementation
pub(crate) mod filesystem;

// Native JSON provider implementation
pub(crate) mod json;

/// Type alias for the filesystem provider implementation.
///
/// On native platforms, this resolves to [`NativeFileSystemProvider`](filesystem::NativeFileSystemProvider).
pub type FileSystemProvider = filesystem::NativeFileSystemProvider;

/// Type alias for the JSON provider implementation.
///
/// On native platforms, this resolves to [`NativeJsonProvider`](json::NativeJsonProvider).
pub type JsonProvider = json::NativeJsonProvider;
