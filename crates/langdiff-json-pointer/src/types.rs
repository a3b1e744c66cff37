//! Path types shared by the pointer utilities.

/// One unescaped step of a JSON Pointer path.
///
/// Array indices are kept in their decimal string form ("0", "17", "-");
/// whether a step addresses an object key or an array index is decided by
/// the container it is resolved against, per RFC 6901.
pub type PathStep = String;

/// An unescaped JSON Pointer path. The empty path addresses the root.
pub type Path = Vec<PathStep>;
