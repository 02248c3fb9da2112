//! Capability interface between the API and an aligner implementation.
//!
//! An aligner is packaged as an [`AlignerPlugin`]: it reports its identity,
//! loads references and creates [`Aligner`] instances that fill a
//! [`ReadBatch`] with alignment records. Plugins are looked up by name with
//! [`load_aligner`]; other crates add theirs with [`register`].
//!
//! The lifecycle is:
//!
//! ```text
//! load_aligner -> load_options -> initialize -> load_reference
//!              -> create_aligner -> align (per batch) -> shutdown
//! ```
//!
//! ## Example
//!
//! ```rust
//! use rapi::plugin::load_aligner;
//!
//! let mut plugin = load_aligner("null").unwrap();
//! let options = plugin.load_options();
//! plugin.initialize(&options).unwrap();
//! assert_eq!(plugin.aligner_name(), "null");
//! plugin.shutdown().unwrap();
//! ```

pub mod null;
pub mod options;

use std::collections::BTreeMap;
use std::path::Path;
use std::sync::{Mutex, OnceLock, PoisonError};

use tracing::{debug, info};

use crate::core::batch::ReadBatch;
use crate::core::reference::ReferenceCatalog;
use crate::error::{Error, Result};

pub use options::{AlignerOptions, ParamValue};

/// An aligner implementation together with its reference loader
pub trait AlignerPlugin: Send {
    /// Default options for this aligner
    fn load_options(&self) -> AlignerOptions {
        AlignerOptions::default()
    }

    /// Prepare the plugin for use.
    ///
    /// # Errors
    ///
    /// Returns `Error::InvalidArgument` for inconsistent options or
    /// `Error::Init` if the aligner cannot start.
    fn initialize(&mut self, options: &AlignerOptions) -> Result<()>;

    fn aligner_name(&self) -> &str;

    fn aligner_version(&self) -> &str;

    fn plugin_version(&self) -> &str;

    /// Load the reference at `path`.
    ///
    /// # Errors
    ///
    /// Returns `Error::Init` before [`initialize`](Self::initialize) and
    /// `Error::ReferenceLoad` for a missing or invalid reference.
    fn load_reference(&self, path: &Path) -> Result<ReferenceCatalog>;

    /// Create an aligner configured with `options`.
    ///
    /// # Errors
    ///
    /// Returns `Error::Init` before [`initialize`](Self::initialize).
    fn create_aligner(&self, options: &AlignerOptions) -> Result<Box<dyn Aligner>>;

    /// Release the resources held by the plugin.
    ///
    /// # Errors
    ///
    /// Returns `Error::Init` if the plugin was never initialized.
    fn shutdown(&mut self) -> Result<()>;
}

/// Aligns reads against a loaded reference
pub trait Aligner {
    /// Attach alignment records to every read of `batch`, in place.
    ///
    /// # Errors
    ///
    /// Returns `Error::InvalidArgument` if the batch ends with an incomplete
    /// fragment.
    fn align(&mut self, reference: &ReferenceCatalog, batch: &mut ReadBatch) -> Result<()>;
}

/// Reject batches whose tail fragment is missing mates
///
/// # Errors
///
/// Returns `Error::InvalidArgument` if `batch` is not complete.
pub fn ensure_complete(batch: &ReadBatch) -> Result<()> {
    if batch.is_complete() {
        Ok(())
    } else {
        Err(Error::invalid(format!(
            "batch has {} reads, not a whole number of {}-read fragments",
            batch.len(),
            batch.n_reads_per_fragment()
        )))
    }
}

/// Constructor of a plugin instance
pub type PluginConstructor = fn() -> Box<dyn AlignerPlugin>;

fn registry() -> &'static Mutex<BTreeMap<String, PluginConstructor>> {
    static REGISTRY: OnceLock<Mutex<BTreeMap<String, PluginConstructor>>> = OnceLock::new();
    REGISTRY.get_or_init(|| {
        let mut plugins: BTreeMap<String, PluginConstructor> = BTreeMap::new();
        plugins.insert(null::PLUGIN_NAME.to_string(), null::NullPlugin::boxed);
        Mutex::new(plugins)
    })
}

/// Make a plugin available to [`load_aligner`] under `name`.
///
/// Registering an existing name replaces the previous constructor.
pub fn register(name: &str, constructor: PluginConstructor) {
    let mut plugins = registry().lock().unwrap_or_else(PoisonError::into_inner);
    if plugins.insert(name.to_string(), constructor).is_some() {
        debug!(plugin = %name, "Replaced registered aligner plugin");
    }
}

/// Names of all registered plugins, sorted
#[must_use]
pub fn available() -> Vec<String> {
    registry()
        .lock()
        .unwrap_or_else(PoisonError::into_inner)
        .keys()
        .cloned()
        .collect()
}

/// Instantiate the plugin registered as `name`
///
/// # Errors
///
/// Returns `Error::Unsupported` if no plugin has that name.
pub fn load_aligner(name: &str) -> Result<Box<dyn AlignerPlugin>> {
    let constructor = registry()
        .lock()
        .unwrap_or_else(PoisonError::into_inner)
        .get(name)
        .copied()
        .ok_or_else(|| Error::Unsupported(format!("no aligner plugin named '{name}'")))?;

    let plugin = constructor();
    info!(
        plugin = %name,
        aligner = %plugin.aligner_name(),
        version = %plugin.aligner_version(),
        "Loaded aligner plugin"
    );
    Ok(plugin)
}
