//! Built-in plugin without an alignment engine.
//!
//! It loads FASTA references like any other plugin, but its aligner reports
//! every read as unmapped. This keeps the whole pipeline runnable (and
//! testable) when no real aligner is registered.

use std::path::Path;

use tracing::{debug, info};

use crate::core::alignment::AlignmentRecord;
use crate::core::batch::ReadBatch;
use crate::core::reference::ReferenceCatalog;
use crate::error::{Error, Result};
use crate::parsing::reference::load_reference;
use crate::plugin::{ensure_complete, Aligner, AlignerOptions, AlignerPlugin};

pub const PLUGIN_NAME: &str = "null";

/// Parameter that turns on MD5 computation while loading references
pub const COMPUTE_MD5: &str = "compute_md5";

#[derive(Debug, Default)]
pub struct NullPlugin {
    options: Option<AlignerOptions>,
}

impl NullPlugin {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub(crate) fn boxed() -> Box<dyn AlignerPlugin> {
        Box::new(Self::new())
    }

    fn initialized(&self) -> Result<&AlignerOptions> {
        self.options
            .as_ref()
            .ok_or_else(|| Error::Init("plugin has not been initialized".to_string()))
    }
}

impl AlignerPlugin for NullPlugin {
    fn initialize(&mut self, options: &AlignerOptions) -> Result<()> {
        options.validate()?;
        debug!(threads = options.n_threads, "Initialized null aligner");
        self.options = Some(options.clone());
        Ok(())
    }

    fn aligner_name(&self) -> &str {
        PLUGIN_NAME
    }

    fn aligner_version(&self) -> &str {
        "0.0"
    }

    fn plugin_version(&self) -> &str {
        env!("CARGO_PKG_VERSION")
    }

    fn load_reference(&self, path: &Path) -> Result<ReferenceCatalog> {
        let options = self.initialized()?;
        let compute_md5 = options
            .parameter(COMPUTE_MD5)
            .is_some_and(|value| value.is_enabled());
        load_reference(path, compute_md5)
    }

    fn create_aligner(&self, _options: &AlignerOptions) -> Result<Box<dyn Aligner>> {
        self.initialized()?;
        Ok(Box::new(NullAligner))
    }

    fn shutdown(&mut self) -> Result<()> {
        if self.options.take().is_none() {
            return Err(Error::Init("plugin has not been initialized".to_string()));
        }
        info!("Null aligner shut down");
        Ok(())
    }
}

/// Marks every read unmapped
#[derive(Debug)]
pub struct NullAligner;

impl Aligner for NullAligner {
    fn align(&mut self, reference: &ReferenceCatalog, batch: &mut ReadBatch) -> Result<()> {
        ensure_complete(batch)?;
        for fragment in 0..batch.n_fragments() {
            for mate in 0..batch.n_reads_per_fragment() {
                batch.set_alignments(fragment, mate, vec![AlignmentRecord::unmapped()])?;
            }
        }
        debug!(
            reference = %reference.path().display(),
            fragments = batch.n_fragments(),
            "Aligned batch"
        );
        Ok(())
    }
}
