//! Localized content bundles, one per (locale, variant) pair.
//!
//! The copy is static and compiled in; the presentation layer renders it
//! keyed by the visitor's assigned variant.

use serde::Serialize;
use strum::{Display, EnumIter, EnumString, IntoStaticStr};

use crate::variant::VariantId;

// ─── Locale ──────────────────────────────────────────────────────────────────

/// A supported site locale.
#[derive(
  Debug,
  Clone,
  Copy,
  Default,
  PartialEq,
  Eq,
  Serialize,
  Display,
  EnumIter,
  EnumString,
  IntoStaticStr,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum Locale {
  #[default]
  En,
  Fr,
  De,
}

impl Locale {
  /// Parse a locale code, falling back to the default for anything unknown.
  pub fn parse_or_default(s: &str) -> Self { s.parse().unwrap_or_default() }
}

// ─── Bundle types ────────────────────────────────────────────────────────────

/// Visual style of a call-to-action button.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum CtaStyle {
  Default,
  Secondary,
  Outline,
  Destructive,
  Ghost,
  Link,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HeroContent {
  pub headline:    &'static str,
  pub subheadline: &'static str,
  pub cta_text:    &'static str,
  pub cta_style:   CtaStyle,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub image_src:   Option<&'static str>,
}

#[derive(Debug, Clone, Serialize)]
pub struct ServicesContent {
  pub title:       &'static str,
  pub description: &'static str,
}

#[derive(Debug, Clone, Serialize)]
pub struct CtaContent {
  pub text:    &'static str,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub urgency: Option<&'static str>,
}

/// Everything the page needs to render one variant in one locale.
#[derive(Debug, Clone, Serialize)]
pub struct VariantContent {
  pub hero:     HeroContent,
  pub services: ServicesContent,
  pub cta:      CtaContent,
}

/// Content for `(locale, id)`. Every pair is defined, so this never fails.
pub fn lookup(locale: Locale, id: VariantId) -> &'static VariantContent {
  let table = match locale {
    Locale::En => &EN,
    Locale::Fr => &FR,
    Locale::De => &DE,
  };
  // Tables are laid out in `VariantId` declaration order.
  &table[id as usize]
}

const fn bundle(
  hero: (&'static str, &'static str, &'static str, CtaStyle),
  services: (&'static str, &'static str),
  cta: &'static str,
) -> VariantContent {
  VariantContent {
    hero:     HeroContent {
      headline:    hero.0,
      subheadline: hero.1,
      cta_text:    hero.2,
      cta_style:   hero.3,
      image_src:   None,
    },
    services: ServicesContent { title: services.0, description: services.1 },
    cta:      CtaContent { text: cta, urgency: None },
  }
}

// ─── English ─────────────────────────────────────────────────────────────────

static EN: [VariantContent; 4] = [
  bundle(
    (
      "Digital Growth Made Simple for Luxembourg Businesses",
      "Fresh approach to digital marketing. Transparent pricing, honest results, and strategies that work for SMBs in Luxembourg",
      "Get Free 30-Min Consultation",
      CtaStyle::Default,
    ),
    (
      "Digital Marketing Services",
      "SEO, PPC, Social Media, and Content Marketing for the Luxembourg market",
    ),
    "Ready to Grow Your Online Presence?",
  ),
  bundle(
    (
      "Honest Digital Marketing for Luxembourg SMBs",
      "No inflated promises. No hidden fees. Just transparent, results-focused digital marketing from a team that understands your market",
      "See Our Transparent Pricing",
      CtaStyle::Default,
    ),
    (
      "What We Actually Do",
      "Real services, honest approach, measurable results",
    ),
    "Let's Discuss Your Goals",
  ),
  bundle(
    (
      "Grow Your Business with Smart Digital Marketing",
      "Strategic SEO, targeted ads, and engaging content designed specifically for Luxembourg's trilingual market",
      "Request Free Marketing Audit",
      CtaStyle::Secondary,
    ),
    (
      "How We Help You Grow",
      "Comprehensive digital strategies tailored to your business goals",
    ),
    "Start Your Digital Strategy",
  ),
  bundle(
    (
      "Luxembourg's Fresh Digital Marketing Agency",
      "New agency, experienced team. Specializing in multilingual digital marketing for Luxembourg, Esch, and the Greater Region",
      "Meet Our Team",
      CtaStyle::Outline,
    ),
    (
      "Local Expertise, Modern Approach",
      "Digital marketing that understands Luxembourg's unique market",
    ),
    "Discover Our Approach",
  ),
];

// ─── French ──────────────────────────────────────────────────────────────────

static FR: [VariantContent; 4] = [
  bundle(
    (
      "Marketing Digital Simplifié pour les Entreprises Luxembourgeoises",
      "Approche moderne du marketing digital. Tarifs transparents, résultats honnêtes et stratégies efficaces pour les PME au Luxembourg",
      "Consultation Gratuite de 30 Min",
      CtaStyle::Default,
    ),
    (
      "Services de Marketing Digital",
      "SEO, publicité en ligne, réseaux sociaux et content marketing pour le marché luxembourgeois",
    ),
    "Prêt à Développer Votre Présence en Ligne?",
  ),
  bundle(
    (
      "Marketing Digital Transparent pour PME Luxembourgeoises",
      "Pas de promesses exagérées. Pas de frais cachés. Juste du marketing digital transparent et axé sur les résultats",
      "Voir Nos Tarifs Transparents",
      CtaStyle::Default,
    ),
    (
      "Ce Que Nous Faisons Réellement",
      "Services réels, approche honnête, résultats mesurables",
    ),
    "Discutons de Vos Objectifs",
  ),
  bundle(
    (
      "Développez Votre Entreprise avec du Marketing Digital Intelligent",
      "SEO stratégique, publicités ciblées et contenu engageant conçus spécifiquement pour le marché trilingue du Luxembourg",
      "Demander un Audit Marketing Gratuit",
      CtaStyle::Secondary,
    ),
    (
      "Comment Nous Vous Aidons à Grandir",
      "Stratégies digitales complètes adaptées à vos objectifs commerciaux",
    ),
    "Commencez Votre Stratégie Digitale",
  ),
  bundle(
    (
      "Nouvelle Agence de Marketing Digital au Luxembourg",
      "Nouvelle agence, équipe expérimentée. Spécialistes du marketing digital multilingue pour Luxembourg, Esch et la Grande Région",
      "Rencontrer Notre Équipe",
      CtaStyle::Outline,
    ),
    (
      "Expertise Locale, Approche Moderne",
      "Marketing digital qui comprend le marché unique du Luxembourg",
    ),
    "Découvrez Notre Approche",
  ),
];

// ─── German ──────────────────────────────────────────────────────────────────

static DE: [VariantContent; 4] = [
  bundle(
    (
      "Digitales Wachstum Einfach Gemacht für Luxemburger Unternehmen",
      "Frischer Ansatz im Digitalmarketing. Transparente Preise, ehrliche Ergebnisse und Strategien für KMU in Luxemburg",
      "Kostenlose 30-Min-Beratung",
      CtaStyle::Default,
    ),
    (
      "Digitalmarketing-Services",
      "SEO, Online-Werbung, Social Media und Content Marketing für den luxemburgischen Markt",
    ),
    "Bereit, Ihre Online-Präsenz Auszubauen?",
  ),
  bundle(
    (
      "Ehrliches Digitalmarketing für Luxemburger KMU",
      "Keine überzogenen Versprechen. Keine versteckten Kosten. Nur transparentes, ergebnisorientiertes Digitalmarketing",
      "Transparente Preise Ansehen",
      CtaStyle::Default,
    ),
    (
      "Was Wir Tatsächlich Tun",
      "Echte Dienstleistungen, ehrlicher Ansatz, messbare Ergebnisse",
    ),
    "Lassen Sie Uns Ihre Ziele Besprechen",
  ),
  bundle(
    (
      "Wachsen Sie mit Intelligentem Digitalmarketing",
      "Strategisches SEO, gezielte Werbung und ansprechende Inhalte speziell für Luxemburgs mehrsprachigen Markt",
      "Kostenloses Marketing-Audit Anfordern",
      CtaStyle::Secondary,
    ),
    (
      "Wie Wir Ihnen Beim Wachstum Helfen",
      "Umfassende digitale Strategien, zugeschnitten auf Ihre Geschäftsziele",
    ),
    "Starten Sie Ihre Digitalstrategie",
  ),
  bundle(
    (
      "Luxemburgs Neue Digitalmarketing-Agentur",
      "Neue Agentur, erfahrenes Team. Spezialisiert auf mehrsprachiges Digitalmarketing für Luxemburg, Esch und die Großregion",
      "Unser Team Kennenlernen",
      CtaStyle::Outline,
    ),
    (
      "Lokale Expertise, Moderner Ansatz",
      "Digitalmarketing, das Luxemburgs einzigartigen Markt versteht",
    ),
    "Entdecken Sie Unseren Ansatz",
  ),
];

#[cfg(test)]
mod tests {
  use strum::IntoEnumIterator;

  use super::*;

  #[test]
  fn every_pair_has_content() {
    for locale in Locale::iter() {
      for id in VariantId::iter() {
        let c = lookup(locale, id);
        assert!(!c.hero.headline.is_empty(), "{locale}/{id}");
        assert!(!c.cta.text.is_empty(), "{locale}/{id}");
      }
    }
  }

  #[test]
  fn tables_follow_variant_order() {
    assert_eq!(lookup(Locale::En, VariantId::VariantC).hero.cta_text, "Meet Our Team");
    assert_eq!(
      lookup(Locale::En, VariantId::VariantB).hero.cta_style,
      CtaStyle::Secondary
    );
  }

  #[test]
  fn locale_parse_falls_back_to_english() {
    assert_eq!(Locale::parse_or_default("de"), Locale::De);
    assert_eq!(Locale::parse_or_default("lb"), Locale::En);
  }

  #[test]
  fn hero_serialises_camel_case() {
    let json = serde_json::to_value(lookup(Locale::En, VariantId::Control)).unwrap();
    assert_eq!(json["hero"]["ctaStyle"], "default");
    assert!(json["hero"].get("ctaText").is_some());
    assert!(json["hero"].get("imageSrc").is_none());
  }
}
