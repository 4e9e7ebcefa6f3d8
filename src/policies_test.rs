#[cfg(test)]
mod tests {
    use super::super::crop::GrowthStage;
    use super::super::data::ProcessingSpec;
    use super::super::error::SimError;
    use super::super::policies::crop::{self, CropPolicy, CropPolicyContext};
    use super::super::policies::economic::{self, EconomicPolicy, EconomicPolicyContext};
    use super::super::policies::energy::{EnergyPolicy, EnergyPolicyContext, RenewableFirst};
    use super::super::policies::food::{self, *};
    use super::super::policies::market::{self, MarketPolicy, MarketPolicyContext};
    use super::super::policies::registry::*;
    use super::super::policies::water::{
        self, WaterPolicy, WaterPolicyContext, clip_groundwater, fair_shares, split_demand,
    };
    use super::super::scenario::{PolicyParameters, PolicySelection, ProcessingCapacity};
    use super::super::types::{ConstraintHit, ProductType, ZERO_DEMAND};
    use rust_decimal::Decimal;
    use rust_decimal_macros::dec;

    fn create_test_water_context(demand_m3: f64) -> WaterPolicyContext {
        WaterPolicyContext {
            demand_m3,
            available_well_m3: 60.0,
            available_treatment_m3: 500.0,
            pumping_kwh_per_m3: 0.5,
            conveyance_kwh_per_m3: 0.2,
            treatment_kwh_per_m3: 1.5,
            gw_maintenance_per_m3: dec!(0.05),
            energy_price_per_kwh: dec!(0.10),
            municipal_price_per_m3: dec!(0.50),
            groundwater_tds_ppm: 800.0,
            municipal_tds_ppm: 500.0,
            groundwater_used_this_year_m3: 0.0,
            groundwater_used_this_month_m3: 0.0,
        }
    }

    fn create_test_food_context(harvest_kg: f64) -> FoodProcessingContext {
        FoodProcessingContext {
            crop: "tomato".to_string(),
            harvest_kg,
            fresh_price: dec!(1.00),
            fresh_reference_price: dec!(1.00),
            capacities: ProcessingCapacity::default(),
        }
    }

    fn create_test_market_context(available_kg: f64) -> MarketPolicyContext {
        MarketPolicyContext {
            crop: "tomato".to_string(),
            product: ProductType::Canned,
            available_kg,
            current_price: dec!(2.00),
            reference_price: dec!(2.00),
            storage_capacity_kg: 1000.0,
            stored_total_kg: available_kg,
            liquidate: false,
        }
    }

    fn create_test_economic_context(cash: Decimal) -> EconomicPolicyContext {
        EconomicPolicyContext {
            cash_usd: cash,
            monthly_operating_cost_usd: dec!(500),
            inventory_value_usd: dec!(200),
            debt_service_usd: dec!(100),
        }
    }

    fn crop_context(stage: GrowthStage, temperature_c: f64) -> CropPolicyContext {
        CropPolicyContext {
            crop: "tomato".to_string(),
            base_demand_m3: 10.0,
            stage,
            days_in_stage: 3,
            temperature_c,
            heat_threshold_c: 35.0,
        }
    }

    #[test]
    fn test_max_groundwater_hits_well_limit() {
        let ctx = create_test_water_context(100.0);
        let allocation = water::MaxGroundwater.allocate(&ctx).unwrap();

        assert_eq!(allocation.groundwater_m3, 60.0);
        assert_eq!(allocation.municipal_m3, 40.0);
        assert_eq!(allocation.constraint_hit, Some(ConstraintHit::WellLimit));
        assert_eq!(allocation.decision_reason, "gw_preferred");
        assert_eq!(allocation.gw_cost_per_m3, dec!(0.27));
        assert_eq!(allocation.cost_usd, dec!(36.2));
        assert!((allocation.energy_used_kwh - 132.0).abs() < 1e-9);
    }

    #[test]
    fn test_treatment_limit_is_reported() {
        assert_eq!(
            clip_groundwater(100.0, 200.0, 50.0),
            (50.0, Some(ConstraintHit::TreatmentLimit))
        );
        assert_eq!(clip_groundwater(40.0, 200.0, 50.0), (40.0, None));
    }

    #[test]
    fn test_every_water_policy_conserves_demand() {
        let registry = water_policies();
        let params = PolicyParameters::default();
        for name in registry.names() {
            let policy = registry.create(name, &params).unwrap();
            for demand in [0.5, 45.0, 100.0, 1000.0, 379.357, 0.1 + 0.2] {
                let ctx = create_test_water_context(demand);
                let allocation = policy.allocate(&ctx).unwrap();
                assert_eq!(
                    allocation.groundwater_m3 + allocation.municipal_m3,
                    demand,
                    "{} does not conserve {}",
                    name,
                    demand
                );
                assert!(allocation.groundwater_m3 >= 0.0);
                assert!(allocation.municipal_m3 >= 0.0);
                assert!(allocation.groundwater_m3 <= 60.0 + 1e-9);
            }
        }
    }

    #[test]
    fn test_conservation_is_exact_for_awkward_volumes() {
        let ctx = WaterPolicyContext {
            available_well_m3: 112.119,
            ..create_test_water_context(379.357)
        };
        let allocation = water::MaxGroundwater.allocate(&ctx).unwrap();
        assert_eq!(allocation.groundwater_m3 + allocation.municipal_m3, 379.357);
        assert!((allocation.groundwater_m3 - 112.119).abs() < 1e-12);

        let mut demand = 0.37;
        while demand < 500.0 {
            for fraction in [0.0, 0.013, 0.3, 0.49, 0.5, 0.77, 1.0] {
                let (gw, municipal) = split_demand(demand, demand * fraction);
                assert_eq!(gw + municipal, demand, "demand {} fraction {}", demand, fraction);
                assert!(gw >= 0.0 && municipal >= 0.0);
            }
            demand = demand * 1.37 + 0.113;
        }
    }

    #[test]
    fn test_fair_shares_fill_idle_capacity() {
        // An idle farm takes nothing; the bound farm gets the whole well.
        assert_eq!(fair_shares(&[116.8, 0.0], 20.0), vec![20.0, 0.0]);

        // A small request is met in full and its slack goes to the others.
        let shares = fair_shares(&[100.0, 5.0, 100.0], 65.0);
        assert_eq!(shares, vec![30.0, 5.0, 30.0]);

        // Enough capacity: everyone gets their request.
        assert_eq!(fair_shares(&[10.0, 20.0], 100.0), vec![10.0, 20.0]);

        assert_eq!(fair_shares(&[], 100.0), Vec::<f64>::new());
        assert_eq!(fair_shares(&[0.0, 0.0], 50.0), vec![0.0, 0.0]);
    }

    #[test]
    fn test_groundwater_request_matches_policy_intent() {
        let ctx = create_test_water_context(100.0);
        assert_eq!(water::MaxGroundwater.groundwater_request(&ctx).unwrap(), 100.0);
        assert_eq!(water::MaxMunicipal.groundwater_request(&ctx).unwrap(), 0.0);
        assert_eq!(
            water::MaxGroundwater
                .groundwater_request(&create_test_water_context(0.0))
                .unwrap(),
            0.0
        );
        assert!(
            water::MaxGroundwater
                .groundwater_request(&create_test_water_context(f64::NAN))
                .is_err()
        );
    }

    #[test]
    fn test_zero_demand_short_circuits_everywhere() {
        let params = PolicyParameters::default();
        let water = water_policies();
        for name in water.names() {
            let policy = water.create(name, &params).unwrap();
            let ctx = create_test_water_context(0.0);
            let first = policy.allocate(&ctx).unwrap();
            assert_eq!(first, policy.allocate(&ctx).unwrap());
            assert_eq!(first.decision_reason, ZERO_DEMAND);
            assert_eq!(first.cost_usd, Decimal::ZERO);
        }

        let crops = crop_policies();
        for name in crops.names() {
            let policy = crops.create(name, &params).unwrap();
            let ctx = CropPolicyContext {
                base_demand_m3: 0.0,
                ..crop_context(GrowthStage::Initial, 40.0)
            };
            assert_eq!(policy.decide(&ctx).unwrap().decision_reason, ZERO_DEMAND);
        }

        let foods = food_policies();
        for name in foods.names() {
            let policy = foods.create(name, &params).unwrap();
            let decision = policy.allocate(&create_test_food_context(0.0)).unwrap();
            assert_eq!(decision, ProcessingDecision::zero_demand());
        }

        let markets = market_policies();
        for name in markets.names() {
            let policy = markets.create(name, &params).unwrap();
            let decision = policy.decide(&create_test_market_context(0.0)).unwrap();
            assert_eq!(decision.sell_kg, 0.0);
            assert_eq!(decision.decision_reason, ZERO_DEMAND);
        }

        let economics = economic_policies();
        for name in economics.names() {
            let policy = economics.create(name, &params).unwrap();
            let ctx = EconomicPolicyContext {
                monthly_operating_cost_usd: Decimal::ZERO,
                ..create_test_economic_context(dec!(100))
            };
            let decision = policy.review(&ctx).unwrap();
            assert_eq!(decision.decision_reason, ZERO_DEMAND);
            assert!(!decision.sell_inventory);
        }

        let energy = RenewableFirst {
            battery_reserve_pct: 0.2,
        };
        let decision = energy
            .select(&EnergyPolicyContext {
                demand_kwh: 0.0,
                pv_available_kwh: 40.0,
                wind_available_kwh: 0.0,
                battery_soc: 0.5,
                grid_price_per_kwh: dec!(0.1),
                diesel_price_per_l: dec!(1.2),
            })
            .unwrap();
        assert_eq!(decision.decision_reason, ZERO_DEMAND);
        assert!(decision.flags.grid_export);
    }

    #[test]
    fn test_invalid_inputs_rejected() {
        let mut ctx = create_test_water_context(f64::NAN);
        assert!(matches!(
            water::MaxGroundwater.allocate(&ctx),
            Err(SimError::InvalidInput {
                field: "demand_m3",
                ..
            })
        ));
        ctx.demand_m3 = 10.0;
        ctx.available_well_m3 = -1.0;
        assert!(water::MaxMunicipal.allocate(&ctx).is_err());
        ctx.available_well_m3 = 60.0;
        ctx.municipal_price_per_m3 = dec!(-0.5);
        assert!(water::CheapestSource.allocate(&ctx).is_err());

        let market = create_test_market_context(f64::INFINITY);
        assert!(market::SellAllImmediately.decide(&market).is_err());

        let ctx = EconomicPolicyContext {
            monthly_operating_cost_usd: dec!(-1),
            ..create_test_economic_context(dec!(100))
        };
        assert!(economic::AggressiveGrowth { reserve_months: 1.0 }.review(&ctx).is_err());
    }

    #[test]
    fn test_cheapest_and_conserve_groundwater() {
        let ctx = create_test_water_context(100.0);
        let cheapest = water::CheapestSource.allocate(&ctx).unwrap();
        assert_eq!(cheapest.decision_reason, "gw_cheaper");
        assert_eq!(cheapest.groundwater_m3, 60.0);

        let pricey_gw = WaterPolicyContext {
            municipal_price_per_m3: dec!(0.20),
            ..create_test_water_context(100.0)
        };
        let cheapest = water::CheapestSource.allocate(&pricey_gw).unwrap();
        assert_eq!(cheapest.decision_reason, "municipal_cheaper");
        assert_eq!(cheapest.municipal_m3, 100.0);
        assert_eq!(cheapest.constraint_hit, None);

        let conserve = water::ConserveGroundwater {
            price_threshold_multiplier: 1.5,
            max_gw_ratio: 0.3,
        };
        let allocation = conserve.allocate(&ctx).unwrap();
        assert_eq!(allocation.decision_reason, "price_threshold_exceeded");
        assert!((allocation.groundwater_m3 - 30.0).abs() < 1e-9);

        let allocation = conserve.allocate(&pricey_gw).unwrap();
        assert_eq!(allocation.decision_reason, "conserving");
        assert_eq!(allocation.groundwater_m3, 0.0);
    }

    #[test]
    fn test_quota_enforced() {
        let quota = water::QuotaEnforced {
            annual_quota_m3: 1200.0,
            monthly_variance_pct: 0.0,
        };
        let ctx = WaterPolicyContext {
            groundwater_used_this_month_m3: 80.0,
            groundwater_used_this_year_m3: 300.0,
            ..create_test_water_context(50.0)
        };
        let allocation = quota.allocate(&ctx).unwrap();
        assert_eq!(allocation.decision_reason, "quota_limited");
        assert!((allocation.groundwater_m3 - 20.0).abs() < 1e-9);
        assert!((allocation.municipal_m3 - 30.0).abs() < 1e-9);

        let exhausted = WaterPolicyContext {
            groundwater_used_this_year_m3: 1200.0,
            ..create_test_water_context(50.0)
        };
        let allocation = quota.allocate(&exhausted).unwrap();
        assert_eq!(allocation.decision_reason, "quota_exhausted");
        assert_eq!(allocation.groundwater_m3, 0.0);

        let allocation = quota.allocate(&create_test_water_context(50.0)).unwrap();
        assert_eq!(allocation.decision_reason, "within_quota");
        assert_eq!(allocation.groundwater_m3, 50.0);
    }

    #[test]
    fn test_min_water_quality_blend() {
        let strict = water::MinWaterQuality {
            target_tds_ppm: 600.0,
        };
        assert!((strict.groundwater_fraction(800.0, 500.0) - 1.0 / 3.0).abs() < 1e-12);
        let allocation = strict.allocate(&create_test_water_context(30.0)).unwrap();
        assert_eq!(allocation.decision_reason, "quality_blend");
        assert!((allocation.groundwater_m3 - 10.0).abs() < 1e-9);

        let lenient = water::MinWaterQuality {
            target_tds_ppm: 1500.0,
        };
        let allocation = lenient.allocate(&create_test_water_context(30.0)).unwrap();
        assert_eq!(allocation.decision_reason, "gw_meets_quality");
        assert_eq!(allocation.groundwater_m3, 30.0);

        assert_eq!(strict.groundwater_fraction(800.0, 900.0), 1.0);
    }

    #[test]
    fn test_crop_policies() {
        let fixed = crop::FixedSchedule
            .decide(&crop_context(GrowthStage::Development, 25.0))
            .unwrap();
        assert_eq!(fixed.adjusted_demand_m3, 10.0);
        assert_eq!(fixed.decision_reason, "full_schedule");

        let deficit = crop::DeficitIrrigation {
            deficit_fraction: 0.2,
        };
        let early = deficit.decide(&crop_context(GrowthStage::Initial, 25.0)).unwrap();
        assert!((early.adjusted_demand_m3 - 8.0).abs() < 1e-12);
        assert_eq!(early.decision_reason, "deficit_applied");
        let mid = deficit
            .decide(&crop_context(GrowthStage::MidSeason, 25.0))
            .unwrap();
        assert_eq!(mid.adjusted_demand_m3, 10.0);
        assert_eq!(mid.decision_reason, "mid_season_full");

        let adaptive = crop::WeatherAdaptive {
            heat_boost: 0.15,
            cool_reduction: 0.15,
            cool_threshold_c: 15.0,
        };
        let hot = adaptive.decide(&crop_context(GrowthStage::MidSeason, 40.0)).unwrap();
        assert!((hot.adjusted_demand_m3 - 11.5).abs() < 1e-12);
        assert_eq!(hot.decision_reason, "heat_boost");
        let cool = adaptive.decide(&crop_context(GrowthStage::MidSeason, 10.0)).unwrap();
        assert!((cool.adjusted_demand_m3 - 8.5).abs() < 1e-12);
        let mild = adaptive.decide(&crop_context(GrowthStage::MidSeason, 22.0)).unwrap();
        assert_eq!(mild.decision_reason, "normal_weather");

        let bad_temp = CropPolicyContext {
            temperature_c: f64::NAN,
            ..crop_context(GrowthStage::MidSeason, 0.0)
        };
        assert!(adaptive.decide(&bad_temp).is_err());
    }

    #[test]
    fn test_all_fresh_keeps_whole_harvest_fresh() {
        let decision = food::AllFresh
            .allocate(&create_test_food_context(1000.0))
            .unwrap();
        assert_eq!(decision.fractions, ProcessingFractions::ALL_FRESH);
        assert_eq!(decision.fractions.packaged, 0.0);
        assert_eq!(decision.fractions.canned, 0.0);
        assert_eq!(decision.fractions.dried, 0.0);
        assert!(!decision.capacity_clipped);
    }

    #[test]
    fn test_capacity_overflow_moves_to_fresh() {
        let ctx = FoodProcessingContext {
            capacities: ProcessingCapacity {
                packaged_kg_per_day: Some(100.0),
                canned_kg_per_day: None,
                dried_kg_per_day: Some(0.0),
            },
            ..create_test_food_context(1000.0)
        };
        let decision = food::Balanced.allocate(&ctx).unwrap();
        assert!(decision.capacity_clipped);
        assert!((decision.fractions.packaged - 0.1).abs() < 1e-12);
        assert_eq!(decision.fractions.dried, 0.0);
        assert!((decision.fractions.canned - 0.15).abs() < 1e-12);
        assert!((decision.fractions.fresh - 0.75).abs() < 1e-12);
        assert!((decision.fractions.total() - 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_market_responsive_processing() {
        let policy = food::MarketResponsive {
            price_threshold: 0.8,
        };
        let low = FoodProcessingContext {
            fresh_price: dec!(0.50),
            ..create_test_food_context(500.0)
        };
        let decision = policy.allocate(&low).unwrap();
        assert_eq!(decision.fractions, food::MarketResponsive::LOW_PRICE_FRACTIONS);
        assert_eq!(decision.decision_reason, "low_fresh_price");

        let normal = policy.allocate(&create_test_food_context(500.0)).unwrap();
        assert_eq!(normal.fractions, food::Balanced::FRACTIONS);

        for name in food_policies().names() {
            let policy = food_policies()
                .create(name, &PolicyParameters::default())
                .unwrap();
            let decision = policy.allocate(&create_test_food_context(800.0)).unwrap();
            assert!((decision.fractions.total() - 1.0).abs() < 1e-9, "{}", name);
        }
    }

    #[test]
    fn test_process_harvest_applies_retention() {
        let outputs = process_harvest(1000.0, &food::Balanced::FRACTIONS, |product| {
            Ok(match product {
                ProductType::Dried => ProcessingSpec {
                    weight_retention: 0.12,
                    energy_kwh_per_kg: 0.8,
                    shelf_life_days: 180,
                },
                _ => ProcessingSpec {
                    weight_retention: 1.0,
                    energy_kwh_per_kg: 0.0,
                    shelf_life_days: 7,
                },
            })
        })
        .unwrap();
        assert_eq!(outputs.len(), 4);
        let dried = outputs
            .iter()
            .find(|o| o.product == ProductType::Dried)
            .unwrap();
        assert!((dried.input_kg - 150.0).abs() < 1e-9);
        assert!((dried.output_kg - 18.0).abs() < 1e-9);
        assert!((dried.energy_kwh - 120.0).abs() < 1e-9);

        let fresh_only = process_harvest(1000.0, &ProcessingFractions::ALL_FRESH, |_| {
            Err(SimError::MissingData("no spec".to_string()))
        });
        assert!(fresh_only.is_err());
    }

    #[test]
    fn test_market_policies() {
        let ctx = create_test_market_context(100.0);
        let all = market::SellAllImmediately.decide(&ctx).unwrap();
        assert_eq!(all.sell_kg, 100.0);
        assert_eq!(all.store_kg, 0.0);

        let hold = market::HoldForPeak {
            price_threshold_multiplier: 1.2,
        };
        let holding = hold.decide(&ctx).unwrap();
        assert_eq!(holding.decision_reason, "holding_for_peak");
        assert_eq!(holding.store_kg, 100.0);
        assert!(!holding.storage_capped);

        let peak = MarketPolicyContext {
            current_price: dec!(2.50),
            ..create_test_market_context(100.0)
        };
        assert_eq!(hold.decide(&peak).unwrap().decision_reason, "peak_price_reached");

        let cramped = MarketPolicyContext {
            storage_capacity_kg: 50.0,
            ..create_test_market_context(100.0)
        };
        let capped = hold.decide(&cramped).unwrap();
        assert_eq!(capped.store_kg, 50.0);
        assert_eq!(capped.sell_kg, 50.0);
        assert!(capped.storage_capped);

        let liquidating = MarketPolicyContext {
            liquidate: true,
            ..create_test_market_context(100.0)
        };
        let sold = hold.decide(&liquidating).unwrap();
        assert_eq!(sold.decision_reason, "economic_liquidation");
        assert_eq!(sold.sell_kg, 100.0);
    }

    #[test]
    fn test_adaptive_sell_fraction() {
        let adaptive = market::Adaptive {
            steepness: 5.0,
            min_sell: 0.2,
            max_sell: 1.0,
        };
        assert!((adaptive.fraction_for_ratio(1.0) - 0.6).abs() < 1e-12);
        assert!(adaptive.fraction_for_ratio(2.0) > 0.99);
        assert!(adaptive.fraction_for_ratio(0.0) < 0.21);
        assert!(adaptive.fraction_for_ratio(1.1) > adaptive.fraction_for_ratio(0.9));

        let decision = adaptive.decide(&create_test_market_context(100.0)).unwrap();
        assert!((decision.sell_kg - 60.0).abs() < 1e-9);
        assert_eq!(decision.decision_reason, "price_above_reference");
    }

    #[test]
    fn test_economic_policies() {
        let balanced = economic::Balanced {
            reserve_months: 3.0,
        };
        let short = balanced
            .review(&create_test_economic_context(dec!(1000)))
            .unwrap();
        assert_eq!(short.reserve_target_usd, dec!(1800));
        assert!(short.sell_inventory);
        assert_eq!(short.decision_reason, "below_reserve_liquidate");

        let no_stock = EconomicPolicyContext {
            inventory_value_usd: Decimal::ZERO,
            ..create_test_economic_context(dec!(-250))
        };
        let decision = balanced.review(&no_stock).unwrap();
        assert!(!decision.sell_inventory);
        assert_eq!(decision.decision_reason, "below_reserve_no_inventory");

        let flush = balanced
            .review(&create_test_economic_context(dec!(5000)))
            .unwrap();
        assert_eq!(flush.decision_reason, "reserve_adequate");

        let growth = economic::AggressiveGrowth {
            reserve_months: 1.0,
        }
        .review(&create_test_economic_context(dec!(0)))
        .unwrap();
        assert_eq!(growth.reserve_target_usd, dec!(600));
        assert!(!growth.sell_inventory);
        assert_eq!(growth.decision_reason, "growth_no_liquidation");

        let cautious = economic::RiskAverse {
            reserve_months: 9.0,
            liquidation_multiplier: 1.5,
        }
        .review(&create_test_economic_context(dec!(6000)))
        .unwrap();
        assert_eq!(cautious.reserve_target_usd, dec!(5400));
        assert!(cautious.sell_inventory);
    }

    #[test]
    fn test_registry_lookup() {
        let params = PolicyParameters::default();
        assert!(water_policies().contains("MAX_GROUNDWATER"));
        assert_eq!(
            water_policies()
                .create("Max_Groundwater", &params)
                .unwrap()
                .name(),
            "max_groundwater"
        );
        assert_eq!(
            energy_policies().names(),
            vec!["all_grid", "microgrid", "renewable_first"]
        );
        assert_eq!(economic_policies().domain(), "economic");

        match market_policies().create("sell_everything", &params) {
            Err(SimError::UnknownPolicy {
                domain,
                name,
                available,
            }) => {
                assert_eq!(domain, "market");
                assert_eq!(name, "sell_everything");
                assert_eq!(available, "adaptive, hold_for_peak, sell_all_immediately");
            }
            _ => panic!("expected unknown policy"),
        }
    }

    #[test]
    fn test_policy_parameters_reach_constructors() {
        let mut params = PolicyParameters::default();
        params.set("deficit_irrigation", "deficit_fraction", 0.5);
        let policy = crop_policies().create("deficit_irrigation", &params).unwrap();
        let decision = policy
            .decide(&crop_context(GrowthStage::LateSeason, 20.0))
            .unwrap();
        assert_eq!(decision.adjusted_demand_m3, 5.0);

        params.set("microgrid", "battery_reserve_pct", 0.35);
        let energy = energy_policies().create("microgrid", &params).unwrap();
        assert_eq!(energy.flags().battery_reserve_soc, 0.35);
    }

    #[test]
    fn test_policy_set_build() {
        let selection = PolicySelection {
            water: "quota_enforced".to_string(),
            food: "market_responsive".to_string(),
            ..PolicySelection::default()
        };
        let set = PolicySet::build(&selection, &PolicyParameters::default()).unwrap();
        assert_eq!(set.water.name(), "quota_enforced");
        assert_eq!(set.food.name(), "market_responsive");
        assert_eq!(set.economic.name(), "balanced");
        assert!(format!("{:?}", set).contains("market_responsive"));

        let broken = PolicySelection {
            crop: "rain_dance".to_string(),
            ..PolicySelection::default()
        };
        assert!(PolicySet::build(&broken, &PolicyParameters::default()).is_err());
    }
}
