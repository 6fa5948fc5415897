//! Archetype selection from a score card

use crate::schema::{ArchetypeRules, Schema, COMPOSITE_BASIS};
use crate::{ArchetypeMatch, ScoreCard, Strategy};

/// Prototype components that a schema leaves out
const NEUTRAL_SCORE: f64 = 50.0;

/// Pick the archetype for a score card according to the schema's rules
pub fn classify(schema: &Schema, card: &ScoreCard) -> ArchetypeMatch {
    match &schema.archetypes {
        ArchetypeRules::Nearest { prototypes } => {
            let mut best: Option<(usize, f64)> = None;
            for (i, prototype) in prototypes.iter().enumerate() {
                let d = distance(card, |axis| {
                    prototype
                        .vector
                        .get(axis)
                        .copied()
                        .unwrap_or(NEUTRAL_SCORE)
                });
                // Strict comparison keeps the first declared prototype on ties
                if best.map_or(true, |(_, bd)| d < bd) {
                    best = Some((i, d));
                }
            }
            let Some((index, d)) = best else {
                return unclassified(Strategy::Nearest);
            };
            let prototype = &prototypes[index];
            let max_distance = 100.0 * (card.axes.len() as f64).sqrt();
            let similarity = if max_distance > 0.0 {
                (((1.0 - d / max_distance) * 100.0).clamp(0.0, 100.0) * 10.0).round() / 10.0
            } else {
                100.0
            };
            ArchetypeMatch {
                id: prototype.id.clone(),
                label: prototype.label.clone(),
                description: prototype.description.clone(),
                strategy: Strategy::Nearest,
                similarity: Some(similarity),
            }
        }
        ArchetypeRules::Threshold {
            basis,
            bands,
            fallback,
        } => {
            let value = if basis == COMPOSITE_BASIS {
                card.composite.percent
            } else {
                card.axis(basis).unwrap_or(0.0)
            };
            let mut ordered: Vec<_> = bands.iter().collect();
            // Stable sort: equal minimums keep declaration order
            ordered.sort_by(|a, b| b.min.total_cmp(&a.min));
            if let Some(band) = ordered.into_iter().find(|b| value >= b.min) {
                return ArchetypeMatch {
                    id: band.id.clone(),
                    label: band.label.clone(),
                    description: band.description.clone(),
                    strategy: Strategy::Threshold,
                    similarity: None,
                };
            }
            match fallback {
                Some(f) => ArchetypeMatch {
                    id: f.id.clone(),
                    label: f.label.clone(),
                    description: f.description.clone(),
                    strategy: Strategy::Threshold,
                    similarity: None,
                },
                None => unclassified(Strategy::Threshold),
            }
        }
        ArchetypeRules::Dominant { labels } => {
            let top = card.axes.iter().fold(None, |best: Option<&crate::AxisScore>, a| {
                match best {
                    Some(b) if b.score >= a.score => Some(b),
                    _ => Some(a),
                }
            });
            let Some(top) = top else {
                return unclassified(Strategy::Dominant);
            };
            ArchetypeMatch {
                id: top.axis.clone(),
                label: labels
                    .get(&top.axis)
                    .cloned()
                    .unwrap_or_else(|| top.label.clone()),
                description: schema.axis(&top.axis).and_then(|a| a.description.clone()),
                strategy: Strategy::Dominant,
                similarity: None,
            }
        }
    }
}

fn distance(card: &ScoreCard, expected: impl Fn(&str) -> f64) -> f64 {
    card.axes
        .iter()
        .map(|a| {
            let diff = a.score - expected(&a.axis);
            diff * diff
        })
        .sum::<f64>()
        .sqrt()
}

fn unclassified(strategy: Strategy) -> ArchetypeMatch {
    ArchetypeMatch {
        id: "unclassified".to_string(),
        label: "Unclassified".to_string(),
        description: None,
        strategy,
        similarity: None,
    }
}
