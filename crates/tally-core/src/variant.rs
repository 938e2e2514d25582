//! The variant registry: the fixed set of content variants under test and
//! the share of traffic each one receives.
//!
//! The set of variant ids is closed. Weights are the only part that may be
//! tuned at startup, and a registry can only be built if they sum to 100.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use strum::{Display, EnumIter, EnumString, IntoEnumIterator, IntoStaticStr};

use crate::{
  Error, Result,
  content::{self, Locale, VariantContent},
};

// ─── VariantId ───────────────────────────────────────────────────────────────

/// Stable identifier of a variant. Declaration order is significant: it is
/// the order the assignment walk visits variants and the key order of the
/// stats snapshot.
#[derive(
  Debug,
  Clone,
  Copy,
  PartialEq,
  Eq,
  PartialOrd,
  Ord,
  Hash,
  Serialize,
  Deserialize,
  Display,
  EnumIter,
  EnumString,
  IntoStaticStr,
)]
#[serde(rename_all = "kebab-case")]
#[strum(serialize_all = "kebab-case")]
pub enum VariantId {
  Control,
  VariantA,
  VariantB,
  VariantC,
}

impl VariantId {
  /// The wire form, e.g. `"variant-a"`.
  pub fn as_str(self) -> &'static str { self.into() }

  /// Every variant id in declaration order.
  pub fn all() -> impl Iterator<Item = Self> { Self::iter() }

  /// Parse a wire id, returning [`Error::UnknownVariant`] for anything
  /// outside the closed set.
  pub fn parse(s: &str) -> Result<Self> {
    s.parse().map_err(|_| Error::UnknownVariant(s.to_owned()))
  }
}

// ─── Variant ─────────────────────────────────────────────────────────────────

/// One candidate version of the landing page.
#[derive(Debug, Clone, Serialize)]
pub struct Variant {
  pub id:          VariantId,
  pub name:        &'static str,
  /// Percentage of traffic, 0–100.
  pub weight:      u8,
  pub description: &'static str,
}

fn builtin(id: VariantId) -> Variant {
  let (name, description) = match id {
    VariantId::Control => {
      ("Control (Original)", "Original version - professional tone")
    }
    VariantId::VariantA => {
      ("Variant A (Urgency)", "Focus on urgency and scarcity")
    }
    VariantId::VariantB => {
      ("Variant B (ROI Focus)", "ROI and data-driven approach")
    }
    VariantId::VariantC => {
      ("Variant C (Local Trust)", "Local Luxembourg focus")
    }
  };
  Variant { id, name, weight: 25, description }
}

// ─── Registry ────────────────────────────────────────────────────────────────

/// Immutable, validated set of variants.
#[derive(Debug, Clone)]
pub struct VariantRegistry {
  variants: Vec<Variant>,
}

impl VariantRegistry {
  /// The built-in registry: every variant at an equal 25% share.
  pub fn builtin() -> Self {
    Self { variants: VariantId::iter().map(builtin).collect() }
  }

  /// The built-in registry with some or all weights replaced.
  ///
  /// Fails with [`Error::InvalidWeights`] unless the resulting weights sum to
  /// exactly 100.
  pub fn with_weights(overrides: &BTreeMap<VariantId, u8>) -> Result<Self> {
    let variants = VariantId::iter()
      .map(|id| {
        let mut v = builtin(id);
        if let Some(w) = overrides.get(&id) {
          v.weight = *w;
        }
        v
      })
      .collect();
    Self::new(variants)
  }

  fn new(variants: Vec<Variant>) -> Result<Self> {
    let sum: u32 = variants.iter().map(|v| u32::from(v.weight)).sum();
    if sum != 100 {
      return Err(Error::InvalidWeights { sum });
    }
    Ok(Self { variants })
  }

  /// All variants in declaration order.
  pub fn variants(&self) -> &[Variant] { &self.variants }

  pub fn get(&self, id: VariantId) -> Option<&Variant> {
    self.variants.iter().find(|v| v.id == id)
  }

  /// Localized content for `variant_id`. Unknown locales fall back to
  /// English; unknown variant ids fall back to the control content.
  pub fn content(&self, locale: &str, variant_id: &str) -> &'static VariantContent {
    let locale = Locale::parse_or_default(locale);
    let id = VariantId::parse(variant_id).unwrap_or(VariantId::Control);
    content::lookup(locale, id)
  }
}

impl Default for VariantRegistry {
  fn default() -> Self { Self::builtin() }
}
