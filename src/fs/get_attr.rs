//! `Getattr`: a pure projection of the already-resolved node, no storage
//! call of its own — whatever populated the node (readdir, lookup,
//! create) is responsible for having current size/mtime/headers.

use crate::fs::entry::FsContext;
use crate::node::{NodeAttr, NodeRef};

pub fn getattr(ctx: &FsContext, node: &NodeRef) -> NodeAttr {
    node.attr(&ctx.attr_defaults())
}
