//! Configuration types for background removal operations

use crate::color::{Hsv, HUE_RANGE};
use crate::error::BgRemovalError;
use serde::{Deserialize, Serialize};

/// Largest accepted blur kernel
pub const MAX_BLUR_KERNEL: u32 = 31;

/// Inclusive HSV bounds that mark a pixel as background
///
/// The defaults select near-white pixels: any hue, saturation up to 25 and
/// value of at least 200. Hue covers the whole `0..=180` circle, so only
/// saturation and value decide anything unless the caller narrows it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClassifierThresholds {
    /// Hue bounds in half-degrees (`0..=180`)
    pub hue: (u8, u8),
    /// Saturation bounds
    pub saturation: (u8, u8),
    /// Value (brightness) bounds
    pub value: (u8, u8),
}

impl Default for ClassifierThresholds {
    fn default() -> Self {
        Self {
            hue: (0, HUE_RANGE),
            saturation: (0, 25),
            value: (200, 255),
        }
    }
}

impl ClassifierThresholds {
    /// Whether a pixel falls inside all three ranges
    #[must_use]
    pub fn contains(&self, hsv: Hsv) -> bool {
        (self.hue.0..=self.hue.1).contains(&hsv.h)
            && (self.saturation.0..=self.saturation.1).contains(&hsv.s)
            && (self.value.0..=self.value.1).contains(&hsv.v)
    }

    /// Check that every range is ordered and hue stays on the 8-bit circle
    pub fn validate(&self) -> crate::Result<()> {
        let ranges = [
            ("hue", self.hue),
            ("saturation", self.saturation),
            ("value", self.value),
        ];
        for (name, (low, high)) in ranges {
            if low > high {
                return Err(BgRemovalError::invalid_config(format!(
                    "{} range is empty: min {} > max {}",
                    name, low, high
                )));
            }
        }

        if self.hue.1 > HUE_RANGE {
            return Err(BgRemovalError::config_value_error(
                "hue max",
                self.hue.1,
                "0-180",
                Some(HUE_RANGE),
            ));
        }

        Ok(())
    }
}

/// Gaussian smoothing applied to the opacity mask
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MaskBlur {
    /// Odd kernel size, or 0 to keep the mask binary
    pub kernel_size: u32,
    /// Standard deviation; `<= 0` derives it from the kernel size
    pub sigma: f32,
}

impl Default for MaskBlur {
    fn default() -> Self {
        Self {
            kernel_size: 3,
            sigma: 0.0,
        }
    }
}

impl MaskBlur {
    /// No smoothing: the mask stays strictly 0 or 255
    #[must_use]
    pub fn disabled() -> Self {
        Self {
            kernel_size: 0,
            sigma: 0.0,
        }
    }

    #[must_use]
    pub fn is_enabled(&self) -> bool {
        self.kernel_size > 1
    }

    pub fn validate(&self) -> crate::Result<()> {
        if self.kernel_size != 0 && (self.kernel_size % 2 == 0 || self.kernel_size > MAX_BLUR_KERNEL)
        {
            return Err(BgRemovalError::config_value_error(
                "blur kernel size",
                self.kernel_size,
                "0 or odd 1-31",
                Some(3),
            ));
        }

        if !self.sigma.is_finite() {
            return Err(BgRemovalError::invalid_config(format!(
                "blur sigma must be finite, got {}",
                self.sigma
            )));
        }

        Ok(())
    }
}

/// Configuration for background removal operations
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct RemovalConfig {
    /// Which pixels count as background
    pub thresholds: ClassifierThresholds,

    /// Smoothing of the opacity mask
    pub blur: MaskBlur,

    /// Enable debug mode (mask statistics are logged per image)
    pub debug: bool,
}

impl RemovalConfig {
    /// Create a new configuration builder for fluent API construction
    ///
    /// # Examples
    ///
    /// ```rust
    /// use white_bgremove::RemovalConfig;
    ///
    /// let config = RemovalConfig::builder()
    ///     .saturation_max(40)
    ///     .value_min(180)
    ///     .blur_kernel_size(5)
    ///     .build()
    ///     .unwrap();
    /// assert_eq!(config.thresholds.value, (180, 255));
    /// ```
    #[must_use]
    pub fn builder() -> RemovalConfigBuilder {
        RemovalConfigBuilder::default()
    }

    /// Validate all configuration parameters
    ///
    /// # Errors
    /// - A threshold range whose minimum exceeds its maximum
    /// - Hue maximum above 180
    /// - Blur kernel that is even or larger than 31
    ///
    /// ```rust
    /// use white_bgremove::RemovalConfig;
    ///
    /// let mut config = RemovalConfig::default();
    /// assert!(config.validate().is_ok());
    ///
    /// config.blur.kernel_size = 4;
    /// assert!(config.validate().is_err());
    /// ```
    pub fn validate(&self) -> crate::Result<()> {
        self.thresholds.validate()?;
        self.blur.validate()
    }
}

/// Builder for `RemovalConfig`
#[derive(Debug, Default)]
pub struct RemovalConfigBuilder {
    config: RemovalConfig,
}

impl RemovalConfigBuilder {
    /// Replace all thresholds at once
    #[must_use]
    pub fn thresholds(mut self, thresholds: ClassifierThresholds) -> Self {
        self.config.thresholds = thresholds;
        self
    }

    /// Set hue bounds (half-degrees)
    #[must_use]
    pub fn hue_range(mut self, min: u8, max: u8) -> Self {
        self.config.thresholds.hue = (min, max);
        self
    }

    /// Set saturation bounds
    #[must_use]
    pub fn saturation_range(mut self, min: u8, max: u8) -> Self {
        self.config.thresholds.saturation = (min, max);
        self
    }

    /// Set the highest saturation still treated as background
    #[must_use]
    pub fn saturation_max(mut self, max: u8) -> Self {
        self.config.thresholds.saturation.1 = max;
        self
    }

    /// Set value bounds
    #[must_use]
    pub fn value_range(mut self, min: u8, max: u8) -> Self {
        self.config.thresholds.value = (min, max);
        self
    }

    /// Set the lowest brightness still treated as background
    #[must_use]
    pub fn value_min(mut self, min: u8) -> Self {
        self.config.thresholds.value.0 = min;
        self
    }

    /// Replace the blur settings
    #[must_use]
    pub fn blur(mut self, blur: MaskBlur) -> Self {
        self.config.blur = blur;
        self
    }

    /// Set the blur kernel size (0 disables smoothing)
    #[must_use]
    pub fn blur_kernel_size(mut self, kernel_size: u32) -> Self {
        self.config.blur.kernel_size = kernel_size;
        self
    }

    /// Set the blur sigma (`<= 0` derives it from the kernel size)
    #[must_use]
    pub fn blur_sigma(mut self, sigma: f32) -> Self {
        self.config.blur.sigma = sigma;
        self
    }

    /// Enable debug mode
    #[must_use]
    pub fn debug(mut self, debug: bool) -> Self {
        self.config.debug = debug;
        self
    }

    /// Build the configuration, validating it first
    pub fn build(self) -> crate::Result<RemovalConfig> {
        self.config.validate()?;
        Ok(self.config)
    }
}
