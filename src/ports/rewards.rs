//! Rewards chart port.

use crate::Result;

/// Renders a cumulative reward series into an image payload.
pub trait RewardsChart: Send + Sync {
    /// Render `cumulative` (one point per recorded update) to encoded bytes.
    ///
    /// # Errors
    ///
    /// Returns [`crate::Error::ChartRender`] if encoding fails.
    fn render(&self, cumulative: &[f64]) -> Result<Vec<u8>>;

    /// MIME type of the bytes produced by [`RewardsChart::render`].
    fn content_type(&self) -> &'static str {
        "image/png"
    }
}
