//! CHOAM starport stock.

use dune_skirmish_core::{CampaignTier, SkirmishRng, UnitKind};

/// Units offered by the starport at the start of a match.
#[derive(Clone, Debug, Default, PartialEq, Eq, Hash)]
pub struct StarportStock {
    offers: Vec<(UnitKind, u16)>,
}

impl StarportStock {
    /// Draws the stock for the tier.
    #[must_use]
    pub fn draw(rng: &mut SkirmishRng, tier: CampaignTier) -> Self {
        let mut offers = vec![
            (UnitKind::Carryall, 2),
            (UnitKind::Trike, 5),
            (UnitKind::Quad, 5),
            (UnitKind::Tank, rng.range(4, 6)),
            (UnitKind::Harvester, 2),
            (UnitKind::Mcv, 2),
        ];
        if tier.get() >= 5 {
            offers.push((UnitKind::Launcher, rng.range(2, 4)));
        }
        if tier.get() >= 6 {
            offers.push((UnitKind::SiegeTank, rng.range(3, 5)));
        }
        if tier.get() >= 7 {
            offers.push((UnitKind::Ornithopter, 3));
        }
        Self { offers }
    }

    /// Units of `kind` on offer.
    #[must_use]
    pub fn available(&self, kind: UnitKind) -> u16 {
        self.offers
            .iter()
            .find(|(offered, _)| *offered == kind)
            .map_or(0, |(_, count)| *count)
    }

    /// Every offer in stocking order.
    pub fn offers(&self) -> impl Iterator<Item = (UnitKind, u16)> + '_ {
        self.offers.iter().copied()
    }
}
