use crate::binder::{BindCtx, Refused};
use crate::device::{DeviceHandle, DmFlags};
use crate::error::ErrorKind;

/// What the core requires from the hardware-description-tree subsystem.
///
/// Implemented exactly once in-tree, by the `oreboot-fdt` adapter crate
/// wrapping a real devicetree-blob parser; the core never depends on that
/// crate directly so it can be linked against a different adapter without
/// touching this module. Fixture cursors used only for this crate's own
/// tests live under `tests/`, not here.
pub trait HdtCursor {
    type Node: Copy + Eq;

    fn root_node(&self) -> Self::Node;
    fn first_subnode(&self, node: Self::Node) -> Option<Self::Node>;
    fn next_subnode(&self, node: Self::Node) -> Option<Self::Node>;
    fn is_valid(&self, node: Self::Node) -> bool;
    fn is_enabled(&self, node: Self::Node) -> bool;
    fn pre_reloc(&self, node: Self::Node) -> bool;
    fn name(&self, node: Self::Node) -> &str;
    /// Raw bytes of a property, or `None` if absent. For `"compatible"` this
    /// is the NUL-terminated-string concatenation described in the cursor
    /// contract.
    fn property<'a>(&'a self, node: Self::Node, name: &str) -> Option<&'a [u8]>;
    fn path(&self, path: &str) -> Option<Self::Node>;
}

/// Splits a devicetree `compatible` property blob into its NUL-terminated
/// strings, in priority order (high to low). Invalid UTF-8 chunks are
/// skipped rather than treated as a hard error, matching `BadHdt`'s "fatal
/// for the offending node, not the whole walk" policy.
pub fn compatible_strings(bytes: &[u8]) -> impl Iterator<Item = &str> {
    bytes
        .split(|b| *b == 0)
        .filter(|chunk| !chunk.is_empty())
        .filter_map(|chunk| core::str::from_utf8(chunk).ok())
}

impl<'a, N: Copy> BindCtx<'a, N> {
    /// Matches `node`'s `compatible` strings against the registry (or only
    /// `restrict_driver` if given) and binds the first driver that matches
    /// the highest-priority string any driver recognizes. Returns `Ok(None)`
    /// for "no match" or a pre-reloc skip, both of which are not errors.
    pub(crate) fn bind_hdt_node<C: HdtCursor<Node = N>>(
        &mut self,
        cursor: &C,
        parent: Option<DeviceHandle<N>>,
        node: N,
        restrict_driver: Option<&'static crate::device::Driver<N>>,
        pre_reloc_only: bool,
    ) -> Result<Option<DeviceHandle<N>>, ErrorKind> {
        let name = cursor.name(node);
        let Some(compatible) = cursor.property(node, "compatible") else {
            return Ok(None);
        };

        let mut chosen: Option<(&'static crate::device::Driver<N>, u32)> = None;
        'strings: for compat in compatible_strings(compatible) {
            if let Some(driver) = restrict_driver {
                if driver.of_match.is_empty() {
                    break 'strings;
                }
                if let Some(id) = driver.of_match.iter().find(|m| m.compatible == compat) {
                    chosen = Some((driver, id.data));
                    break 'strings;
                }
                continue;
            }
            for driver in self.registry.iter_drivers() {
                if let Some(id) = driver.of_match.iter().find(|m| m.compatible == compat) {
                    chosen = Some((driver, id.data));
                    break 'strings;
                }
            }
        }

        let Some((driver, match_data)) = chosen else {
            return Ok(None);
        };

        if pre_reloc_only {
            let node_pre_reloc = cursor.pre_reloc(node);
            let driver_pre_reloc = driver.flags.contains(DmFlags::PRE_RELOC);
            if !node_pre_reloc && !driver_pre_reloc {
                return Ok(None);
            }
        }

        match self.bind_with_driver(parent, driver, name, Some(node), match_data, None, None)? {
            Ok(mut handle) => {
                if cursor.pre_reloc(node) {
                    handle.get_mut().insert_flags(DmFlags::PRE_RELOC);
                }
                Ok(Some(handle))
            }
            Err(Refused) => Ok(None),
        }
    }
}
