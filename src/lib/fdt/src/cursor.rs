//! Adapter from a real devicetree blob (parsed by the `fdt` crate) to the
//! `device` crate's [`device::HdtCursor`] contract.
//!
//! `fdt::Fdt`'s node type borrows from the blob and is not itself `Copy`, so
//! this adapter flattens the tree once at construction into an owned,
//! index-addressable table: [`FdtCursor::Node`] is a plain `usize` index
//! into that table rather than a borrowed node handle. Flattening the whole
//! tree up front costs nothing the core cares about at this scale (tens to
//! low hundreds of nodes, walked once per boot).

use alloc::string::String;
use alloc::vec::Vec;

use device::{ErrorKind, HdtCursor};

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum FdtCursorError {
    Malformed,
}

impl From<FdtCursorError> for ErrorKind {
    fn from(_: FdtCursorError) -> Self {
        ErrorKind::BadHdt
    }
}

/// One flattened devicetree node: its name, parent/child links by index into
/// the owning [`FdtCursor`]'s table, its full path (needed to resolve the
/// well-known extended-scan roots like `/chosen`), and the raw bytes of its
/// `compatible` property if present.
struct NodeRecord<'a> {
    name: &'a str,
    path: String,
    parent: Option<usize>,
    children: Vec<usize>,
    compatible: Option<&'a [u8]>,
    enabled: bool,
    pre_reloc: bool,
}

/// Property name the core's pre-reloc gating looks for: `u-boot,dm-pre-reloc`
/// is the convention carried over from the source driver model this core is
/// modeled on.
const PRE_RELOC_PROP: &str = "u-boot,dm-pre-reloc";

pub struct FdtCursor<'a> {
    #[allow(dead_code)]
    fdt: fdt::Fdt<'a>,
    nodes: Vec<NodeRecord<'a>>,
}

impl<'a> FdtCursor<'a> {
    pub fn new(data: &'a [u8]) -> Result<Self, FdtCursorError> {
        let fdt = fdt::Fdt::new(data).map_err(|_| FdtCursorError::Malformed)?;
        let mut nodes = Vec::new();
        flatten(fdt.root(), None, "", &mut nodes);
        Ok(Self { fdt, nodes })
    }

    fn record(&self, node: usize) -> &NodeRecord<'a> {
        &self.nodes[node]
    }
}

fn is_enabled(node: &fdt::node::FdtNode<'_, '_>) -> bool {
    match node.property("status") {
        None => true,
        Some(prop) => matches!(prop.as_str(), Some("okay") | Some("ok")),
    }
}

fn flatten<'a>(
    node: fdt::node::FdtNode<'_, 'a>,
    parent: Option<usize>,
    parent_path: &str,
    nodes: &mut Vec<NodeRecord<'a>>,
) -> usize {
    let idx = nodes.len();
    let name = node.name;
    let path = if parent_path.is_empty() {
        alloc::format!("/{name}")
    } else if parent_path == "/" {
        alloc::format!("/{name}")
    } else {
        alloc::format!("{parent_path}/{name}")
    };

    nodes.push(NodeRecord {
        name,
        path: path.clone(),
        parent,
        children: Vec::new(),
        compatible: node.property("compatible").map(|p| p.value),
        enabled: is_enabled(&node),
        pre_reloc: node.property(PRE_RELOC_PROP).is_some(),
    });

    let mut children = Vec::new();
    for child in node.children() {
        children.push(flatten(child, Some(idx), &path, nodes));
    }
    nodes[idx].children = children;
    idx
}

impl<'a> HdtCursor for FdtCursor<'a> {
    type Node = usize;

    fn root_node(&self) -> Self::Node {
        0
    }

    fn first_subnode(&self, node: Self::Node) -> Option<Self::Node> {
        self.record(node).children.first().copied()
    }

    fn next_subnode(&self, node: Self::Node) -> Option<Self::Node> {
        let rec = self.record(node);
        let parent = rec.parent?;
        let siblings = &self.record(parent).children;
        let pos = siblings.iter().position(|&n| n == node)?;
        siblings.get(pos + 1).copied()
    }

    fn is_valid(&self, node: Self::Node) -> bool {
        node < self.nodes.len()
    }

    fn is_enabled(&self, node: Self::Node) -> bool {
        self.record(node).enabled
    }

    fn pre_reloc(&self, node: Self::Node) -> bool {
        self.record(node).pre_reloc
    }

    fn name(&self, node: Self::Node) -> &str {
        self.record(node).name
    }

    fn property<'b>(&'b self, node: Self::Node, name: &str) -> Option<&'b [u8]> {
        if name == "compatible" {
            self.record(node).compatible
        } else {
            None
        }
    }

    fn path(&self, path: &str) -> Option<Self::Node> {
        self.nodes.iter().position(|rec| rec.path == path)
    }
}
