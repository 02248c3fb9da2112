use std::ops::Index;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};

use tracing::debug;

use crate::core::contig::Contig;
use crate::error::{Error, Result};

static NEXT_CATALOG_ID: AtomicU64 = AtomicU64::new(1);

/// Identity of a loaded reference, used to check that a [`ContigRef`] still
/// points into the catalog it was created against.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct CatalogId(u64);

/// Non-owning handle to a contig, valid only for the catalog that issued it
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ContigRef {
    catalog: CatalogId,
    index: usize,
}

impl ContigRef {
    #[must_use]
    pub fn index(&self) -> usize {
        self.index
    }

    #[must_use]
    pub fn catalog_id(&self) -> CatalogId {
        self.catalog
    }
}

/// The ordered set of contigs of a loaded reference
#[derive(Debug)]
pub struct ReferenceCatalog {
    id: CatalogId,
    path: PathBuf,
    contigs: Vec<Contig>,
}

impl ReferenceCatalog {
    /// Build a catalog from already-parsed contigs.
    ///
    /// # Errors
    ///
    /// Returns `Error::ReferenceLoad` if `contigs` is empty.
    pub fn new(path: impl Into<PathBuf>, contigs: Vec<Contig>) -> Result<Self> {
        let path = path.into();
        if contigs.is_empty() {
            return Err(Error::reference_load(path, "reference has no contigs"));
        }
        let id = CatalogId(NEXT_CATALOG_ID.fetch_add(1, Ordering::Relaxed));
        debug!(path = %path.display(), contigs = contigs.len(), "Reference catalog created");
        Ok(Self { id, path, contigs })
    }

    #[must_use]
    pub fn id(&self) -> CatalogId {
        self.id
    }

    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.contigs.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.contigs.is_empty()
    }

    /// Bounds-checked contig access
    ///
    /// # Errors
    ///
    /// Returns `Error::Index` if `index` is not in `[0, len)`.
    pub fn get_contig(&self, index: usize) -> Result<&Contig> {
        self.contigs.get(index).ok_or(Error::Index {
            what: "contig",
            index,
            bound: self.contigs.len(),
        })
    }

    /// Handle to the contig at `index`, for attaching to alignment records
    ///
    /// # Errors
    ///
    /// Returns `Error::Index` if `index` is not in `[0, len)`.
    pub fn contig_ref(&self, index: usize) -> Result<ContigRef> {
        self.get_contig(index)?;
        Ok(ContigRef {
            catalog: self.id,
            index,
        })
    }

    /// Position of the contig called `name`, if any
    #[must_use]
    pub fn find(&self, name: &str) -> Option<usize> {
        self.contigs.iter().position(|c| c.name == name)
    }

    /// Resolve a handle; `None` when it was issued by a different catalog
    #[must_use]
    pub fn resolve(&self, contig: ContigRef) -> Option<&Contig> {
        if contig.catalog == self.id {
            self.contigs.get(contig.index)
        } else {
            None
        }
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Contig> {
        self.contigs.iter()
    }

    #[must_use]
    pub fn contigs(&self) -> &[Contig] {
        &self.contigs
    }

    /// Release the reference. Handles issued by this catalog no longer resolve
    /// against any other catalog.
    pub fn unload(self) {
        debug!(path = %self.path.display(), "Reference unloaded");
    }
}

impl Index<usize> for ReferenceCatalog {
    type Output = Contig;

    fn index(&self, index: usize) -> &Contig {
        &self.contigs[index]
    }
}

impl<'a> IntoIterator for &'a ReferenceCatalog {
    type Item = &'a Contig;
    type IntoIter = std::slice::Iter<'a, Contig>;

    fn into_iter(self) -> Self::IntoIter {
        self.contigs.iter()
    }
}
