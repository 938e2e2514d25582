//! Weighted-random variant assignment with sticky per-visitor results.
//!
//! A visitor is drawn into a variant once. The assignment travels back to the
//! visitor as a token; while that token names a known variant it is returned
//! unchanged, even if weights have since been edited.

use rand::Rng;

use crate::variant::{VariantId, VariantRegistry};

/// The outcome of [`resolve`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Assignment {
  pub variant: VariantId,
  /// `true` when the variant was freshly drawn and the caller must persist a
  /// new token.
  pub fresh:   bool,
}

/// Map a draw in `[0, 100)` onto a variant by walking cumulative weights in
/// declaration order. Zero-weight variants are never selected.
pub fn variant_for_draw(registry: &VariantRegistry, draw: f64) -> VariantId {
  let mut cumulative = 0.0;
  for v in registry.variants() {
    if v.weight == 0 {
      continue;
    }
    cumulative += f64::from(v.weight);
    if draw <= cumulative {
      return v.id;
    }
  }
  VariantId::Control
}

/// Draw a fresh variant according to the registry weights.
pub fn assign<R: Rng + ?Sized>(registry: &VariantRegistry, rng: &mut R) -> VariantId {
  variant_for_draw(registry, rng.gen_range(0.0..100.0))
}

/// Return the variant named by `token` if it is still a known variant,
/// otherwise draw a new one.
pub fn resolve<R: Rng + ?Sized>(
  registry: &VariantRegistry,
  token: Option<&str>,
  rng: &mut R,
) -> Assignment {
  let existing = token
    .and_then(|t| VariantId::parse(t).ok())
    .filter(|id| registry.get(*id).is_some());

  match existing {
    Some(variant) => Assignment { variant, fresh: false },
    None => Assignment { variant: assign(registry, rng), fresh: true },
  }
}
