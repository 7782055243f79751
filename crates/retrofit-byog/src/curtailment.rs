//! Weighted curtailment cost: distribute estimated annual curtailment MWh
//! across non-tier1 tiers, cheapest rate first, at the headroom each tier's
//! event limits allow.

use crate::config::ByogConfig;

/// Blended $/MWh cost of the estimated annual curtailment, and the revenue
/// lost in dollars per year.
#[derive(Debug, Clone, Copy)]
pub struct CurtailmentCost {
    pub weighted_rate_usd_per_mwh: f64,
    pub annual_revenue_lost_usd: f64,
}

pub fn weighted_curtailment_cost(config: &ByogConfig, annual_curtailment_mwh: f64) -> CurtailmentCost {
    if annual_curtailment_mwh <= 0.0 {
        return CurtailmentCost {
            weighted_rate_usd_per_mwh: 0.0,
            annual_revenue_lost_usd: 0.0,
        };
    }

    let mut tiers: Vec<&crate::config::CurtailmentTier> = config
        .curtailment
        .tiers
        .iter()
        .filter(|t| t.name != "tier1")
        .collect();
    tiers.sort_by(|a, b| {
        a.revenue_loss_rate_usd_per_mwh
            .partial_cmp(&b.revenue_loss_rate_usd_per_mwh)
            .unwrap()
    });

    let mut remaining = annual_curtailment_mwh;
    let mut revenue_lost = 0.0;
    let mut highest_rate = 0.0;

    for tier in &tiers {
        highest_rate = tier.revenue_loss_rate_usd_per_mwh.max(highest_rate);
        if remaining <= 0.0 {
            break;
        }
        let headroom = (tier.mw * tier.max_event_hours * tier.max_events).max(0.0);
        let filled = remaining.min(headroom);
        revenue_lost += filled * tier.revenue_loss_rate_usd_per_mwh;
        remaining -= filled;
    }

    if remaining > 0.0 {
        revenue_lost += remaining * highest_rate;
    }

    CurtailmentCost {
        weighted_rate_usd_per_mwh: revenue_lost / annual_curtailment_mwh,
        annual_revenue_lost_usd: revenue_lost,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ByogConfig;
    use serde_json::json;

    fn config_with_tiers() -> ByogConfig {
        let overlay = json!({
            "curtailment": {
                "tiers": [
                    { "name": "tier1", "mw": 60.0, "revenue_loss_rate_usd_per_mwh": 0.0, "max_event_hours": 0.0, "max_events": 0.0 },
                    { "name": "tier2", "mw": 20.0, "revenue_loss_rate_usd_per_mwh": 50.0, "max_event_hours": 10.0, "max_events": 5.0 },
                    { "name": "tier3", "mw": 10.0, "revenue_loss_rate_usd_per_mwh": 200.0, "max_event_hours": 10.0, "max_events": 5.0 }
                ]
            },
            "load_profile": { "peak_it_load_mw": 90.0 }
        });
        let mut config = ByogConfig::from_overrides(Some(&overlay)).unwrap();
        config.validate_and_reconcile().unwrap();
        config
    }

    #[test]
    fn zero_curtailment_has_zero_cost() {
        let config = config_with_tiers();
        let cost = weighted_curtailment_cost(&config, 0.0);
        assert_eq!(cost.weighted_rate_usd_per_mwh, 0.0);
    }

    #[test]
    fn curtailment_fills_cheapest_tier_first() {
        let config = config_with_tiers();
        // tier2 headroom = 20*10*5 = 1000 MWh at $50; fill exactly that.
        let cost = weighted_curtailment_cost(&config, 1000.0);
        assert!((cost.annual_revenue_lost_usd - 50_000.0).abs() < 1e-6);
    }

    #[test]
    fn overflow_beyond_all_tiers_charges_the_highest_rate() {
        let config = config_with_tiers();
        // tier2 headroom 1000 @ $50, tier3 headroom 500 @ $200, overflow 100 @ $200
        let cost = weighted_curtailment_cost(&config, 1600.0);
        let expected = 1000.0 * 50.0 + 500.0 * 200.0 + 100.0 * 200.0;
        assert!((cost.annual_revenue_lost_usd - expected).abs() < 1e-6);
    }
}
