//! CSI inventory: the manifest entries tagged with one security domain.

use crate::types::{Inventory, Manifest};

/// Entries whose tag set contains `csi` (case-insensitive exact match),
/// in manifest order. No match yields empty lists.
pub fn filter(manifest: &Manifest, csi: &str) -> Inventory {
  let wanted = csi.to_lowercase();

  let frontend = manifest
    .frontend
    .iter()
    .filter(|c| has_tag(&c.csi, &wanted))
    .cloned()
    .collect();
  let backend = manifest
    .backend
    .iter()
    .filter(|s| has_tag(&s.csi, &wanted))
    .cloned()
    .collect();

  Inventory {
    csi: csi.to_string(),
    frontend,
    backend,
  }
}

fn has_tag(tags: &[String], wanted_lower: &str) -> bool {
  tags.iter().any(|t| t.to_lowercase() == wanted_lower)
}
