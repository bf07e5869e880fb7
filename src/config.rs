//! Split configuration.
//!
//! [`SplitOptions`] is a builder that carries the reconciliation settings
//! and menu-length override through [`DiscTitles`](crate::DiscTitles)
//! without widening every function signature.
//!
//! # Example
//!
//! ```
//! use std::sync::Arc;
//!
//! use discsplit::{LegacyEndpoint, SplitOptions};
//!
//! let options = SplitOptions::new()
//!     .with_safe_indices(true)
//!     .with_endpoint_policy(Arc::new(LegacyEndpoint));
//! assert!(options.safe_indices());
//! ```

use std::fmt::{Debug, Formatter, Result as FmtResult};
use std::sync::Arc;

use crate::reconcile::{EndpointPolicy, PackedEndpoint};

/// Settings for splitting a disc into titles.
///
/// A default-constructed value never rewrites chapters and estimates the
/// menu length from the index descriptor.
#[derive(Clone)]
pub struct SplitOptions {
    /// Trim chapters that overrun the decoded stream.
    pub(crate) safe_indices: bool,
    /// Where a trimmed title ends.
    pub(crate) endpoint_policy: Arc<dyn EndpointPolicy>,
    /// Fixed menu length, bypassing the estimator.
    pub(crate) menu_length: Option<u64>,
}

impl Debug for SplitOptions {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        f.debug_struct("SplitOptions")
            .field("safe_indices", &self.safe_indices)
            .field("endpoint_policy", &self.endpoint_policy.name())
            .field("menu_length", &self.menu_length)
            .finish()
    }
}

impl Default for SplitOptions {
    fn default() -> Self {
        Self::new()
    }
}

impl SplitOptions {
    /// Defaults: no reconciliation, [`PackedEndpoint`], estimated menu length.
    pub fn new() -> Self {
        Self {
            safe_indices: false,
            endpoint_policy: Arc::new(PackedEndpoint),
            menu_length: None,
        }
    }

    /// Rewrite chapters that run past the decoded stream.
    ///
    /// When disabled, an overrun is only reported as a
    /// [`Diagnostic`](crate::Diagnostic) and chapters near the end of the
    /// disc may fail to resolve.
    #[must_use]
    pub fn with_safe_indices(mut self, enabled: bool) -> Self {
        self.safe_indices = enabled;
        self
    }

    /// Replace the rule that places the end of a trimmed title.
    #[must_use]
    pub fn with_endpoint_policy(mut self, policy: Arc<dyn EndpointPolicy>) -> Self {
        self.endpoint_policy = policy;
        self
    }

    /// Use a known menu length instead of estimating it.
    #[must_use]
    pub fn with_menu_length(mut self, menu_length: Option<u64>) -> Self {
        self.menu_length = menu_length;
        self
    }

    pub fn safe_indices(&self) -> bool {
        self.safe_indices
    }

    pub fn endpoint_policy(&self) -> &dyn EndpointPolicy {
        self.endpoint_policy.as_ref()
    }

    pub fn menu_length(&self) -> Option<u64> {
        self.menu_length
    }
}
