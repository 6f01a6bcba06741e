//! Maps `Box<dyn Error>` from the seam traits to typed `FeederError`.
//!
//! The traits in `feeder_traits` use `Box<dyn Error + Send + Sync>` for
//! maximum flexibility; this module converts those to our typed error enum,
//! with an optional feature-gated path for `feeder_hardware::HwError`
//! downcasting.

use crate::error::FeederError;

/// Map a trait-boundary error to a typed `FeederError`.
pub fn map_hw_error(e: &(dyn std::error::Error + 'static)) -> FeederError {
    #[cfg(feature = "hardware-errors")]
    {
        if let Some(hw) = e.downcast_ref::<feeder_hardware::error::HwError>() {
            return FeederError::HardwareFault(hw.to_string());
        }
    }

    FeederError::Hardware(e.to_string())
}
