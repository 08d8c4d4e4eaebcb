//! Translation settings.
#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};
use strum::{EnumIter, IntoEnumIterator};

use crate::error::{Error, Result};

/// What to do with a literal whose value does not fit its bit width.
#[derive(Debug, Clone, Copy, Default, Hash, PartialEq, Eq, EnumIter)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum LiteralPolicy {
    /// Keep the low bits (two's complement), logging a warning.
    #[default]
    Truncate,
    /// Reject the program.
    Strict,
}

impl LiteralPolicy {
    pub fn from_str(s: &str) -> Option<Self> {
        LiteralPolicy::iter().find(|policy| policy.to_str() == s)
    }

    pub fn to_str(&self) -> &'static str {
        match self {
            LiteralPolicy::Truncate => "truncate",
            LiteralPolicy::Strict => "strict",
        }
    }
}

/// Settings shared by both back ends.
#[derive(Debug, Clone, Hash, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(default, deny_unknown_fields))]
pub struct TranslateConfig {
    /// Width of each kind's usage counter in the tag field. A kind may be
    /// required at most `2^tag_bits - 1` times.
    pub tag_bits: u32,
    pub literal_policy: LiteralPolicy,
}

impl Default for TranslateConfig {
    fn default() -> Self {
        Self {
            tag_bits: Self::DEFAULT_TAG_BITS,
            literal_policy: LiteralPolicy::default(),
        }
    }
}

impl TranslateConfig {
    pub const DEFAULT_TAG_BITS: u32 = 4;
    pub const MAX_TAG_BITS: u32 = 16;

    pub fn with_tag_bits(mut self, tag_bits: u32) -> Self {
        self.tag_bits = tag_bits;
        self
    }

    pub fn with_literal_policy(mut self, literal_policy: LiteralPolicy) -> Self {
        self.literal_policy = literal_policy;
        self
    }

    /// Largest usage count a single kind can be required to reach.
    pub fn max_count(&self) -> u32 {
        (1u32 << self.tag_bits) - 1
    }

    pub fn validate(&self) -> Result<()> {
        if self.tag_bits == 0 || self.tag_bits > Self::MAX_TAG_BITS {
            return Err(Error::InvalidConfig(format!(
                "tag_bits must be between 1 and {}, got {}",
                Self::MAX_TAG_BITS,
                self.tag_bits
            )));
        }
        Ok(())
    }
}
