//! Component D — Naming & Classification.

use std::collections::HashSet;

use percent_encoding::{utf8_percent_encode, AsciiSet, CONTROLS};

use crate::error::{Result, SwiftFsError};
use crate::storage::{ObjectStub, DIRECTORY_CONTENT_TYPE, LINK_CONTENT_TYPE, SYMLINK_TARGET_HEADER};

pub const SEGMENT_CONTAINER_SUFFIX: &str = "_segments";

pub fn segment_container_name(base_container: &str) -> String {
    format!("{base_container}{SEGMENT_CONTAINER_SUFFIX}")
}

pub fn is_segment_container(name: &str) -> bool {
    name.ends_with(SEGMENT_CONTAINER_SUFFIX)
}

/// Characters the manifest header's path fragment must not carry literally,
/// since the storage API treats the header value as a URL path fragment.
const MANIFEST_ENCODE_SET: &AsciiSet = &CONTROLS.add(b'&').add(b'?');

pub fn encode_manifest_header(segment_container: &str, prefix: &str) -> String {
    format!(
        "{segment_container}/{}",
        utf8_percent_encode(prefix, MANIFEST_ENCODE_SET)
    )
}

/// Splits and validates a manifest header against the segment container it
/// is expected to point into. Returns the decoded prefix.
pub fn decode_manifest_header(header: &str, expected_segment_container: &str) -> Result<String> {
    let want_prefix = format!("{expected_segment_container}/");
    if !header.starts_with(&want_prefix) {
        return Err(SwiftFsError::NotSupported(
            "manifest header does not match segment container",
        ));
    }
    let encoded_prefix = &header[want_prefix.len()..];
    if encoded_prefix.is_empty() {
        return Err(SwiftFsError::NotSupported(
            "manifest header has an empty segment prefix",
        ));
    }
    let decoded = percent_encoding::percent_decode_str(encoded_prefix)
        .decode_utf8()
        .map_err(|e| SwiftFsError::Io(format!("invalid manifest header encoding: {e}")))?;
    Ok(decoded.into_owned())
}

/// Segment-path grammar (§6): `<object-storage-path>/<10-digit-unix-seconds>`.
pub fn segment_prefix(object_path: &str, unix_seconds: u64) -> String {
    format!("{object_path}/{unix_seconds:010}")
}

/// `<prefix>/<8-digit-zero-padded-index>`.
pub fn segment_name(prefix: &str, index: u32) -> String {
    format!("{prefix}/{index:08}")
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EntryKind {
    Directory,
    SyntheticDirectory,
    Symlink { target: String },
    Object,
}

#[derive(Debug, Clone)]
pub struct ClassifiedEntry {
    pub leaf_name: String,
    /// Full storage path, including trailing `/` for directories.
    pub storage_path: String,
    pub kind: EntryKind,
    pub bytes: u64,
    pub content_type: String,
    pub last_modified: f64,
    pub headers: crate::storage::Headers,
    /// Set when §4.D rule 5 requires a Metadata Lister HEAD.
    pub needs_metadata: bool,
}

fn strip_trailing_slash(s: &str) -> &str {
    s.strip_suffix('/').unwrap_or(s)
}

fn leaf_of(storage_path: &str, parent_prefix: &str) -> String {
    let rest = storage_path.strip_prefix(parent_prefix).unwrap_or(storage_path);
    strip_trailing_slash(rest).to_string()
}

/// Classifies a full listing batch (§4.D rules 1–5), applied against a
/// listing obtained with delimiter `/` and the given `parent_prefix`
/// (the parent directory's own storage path, possibly empty at the
/// container root).
pub fn classify_listing(entries: &[ObjectStub], parent_prefix: &str) -> Vec<ClassifiedEntry> {
    let real_directory_leaves: HashSet<String> = entries
        .iter()
        .filter(|e| {
            e.content_type == DIRECTORY_CONTENT_TYPE
                && strip_trailing_slash(&e.name) != strip_trailing_slash(parent_prefix)
        })
        .map(|e| leaf_of(&e.name, parent_prefix))
        .collect();

    let mut out = Vec::with_capacity(entries.len());

    for e in entries {
        // Rule 1: symlink sentinel.
        if e.content_type == LINK_CONTENT_TYPE {
            let target = e.headers.get(SYMLINK_TARGET_HEADER).cloned().unwrap_or_default();
            out.push(ClassifiedEntry {
                leaf_name: leaf_of(&e.name, parent_prefix),
                storage_path: e.name.clone(),
                kind: EntryKind::Symlink { target },
                bytes: e.bytes,
                content_type: e.content_type.clone(),
                last_modified: e.last_modified,
                headers: e.headers.clone(),
                needs_metadata: false,
            });
            continue;
        }

        // Rule 2: real directory marker.
        if e.content_type == DIRECTORY_CONTENT_TYPE
            && strip_trailing_slash(&e.name) != strip_trailing_slash(parent_prefix)
        {
            let storage_path = if e.name.ends_with('/') {
                e.name.clone()
            } else {
                format!("{}/", e.name)
            };
            out.push(ClassifiedEntry {
                leaf_name: leaf_of(&e.name, parent_prefix),
                storage_path,
                kind: EntryKind::Directory,
                bytes: 0,
                content_type: e.content_type.clone(),
                last_modified: e.last_modified,
                headers: e.headers.clone(),
                needs_metadata: false,
            });
            continue;
        }

        // Rule 3: delimiter-synthesized pseudo-directory, skipped if a
        // real Directory with the same leaf name was already observed.
        if e.is_pseudo_dir {
            let leaf = leaf_of(&e.name, parent_prefix);
            if !real_directory_leaves.contains(&leaf) {
                out.push(ClassifiedEntry {
                    leaf_name: leaf,
                    storage_path: e.name.clone(),
                    kind: EntryKind::SyntheticDirectory,
                    bytes: 0,
                    content_type: e.content_type.clone(),
                    last_modified: e.last_modified,
                    headers: e.headers.clone(),
                    needs_metadata: false,
                });
            }
            continue;
        }

        // Rule 4: trailing-slash duplicate of rule 2/3, skip.
        if e.name.ends_with('/') {
            continue;
        }

        // Rule 5: regular object.
        let needs_metadata = e.bytes == 0;
        out.push(ClassifiedEntry {
            leaf_name: leaf_of(&e.name, parent_prefix),
            storage_path: e.name.clone(),
            kind: EntryKind::Object,
            bytes: e.bytes,
            content_type: e.content_type.clone(),
            last_modified: e.last_modified,
            headers: e.headers.clone(),
            needs_metadata,
        });
    }

    out
}
