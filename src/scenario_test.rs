#[cfg(test)]
mod tests {
    use super::super::data::{CropParameters, ProcessingSpec};
    use super::super::error::SimError;
    use super::super::scenario::*;
    use super::super::types::ProductType;
    use rust_decimal_macros::dec;

    fn create_test_farm(id: &str) -> FarmConfig {
        FarmConfig {
            id: id.to_string(),
            area_ha: 10.0,
            initial_capital_usd: dec!(10000),
            yield_factor: 1.0,
            crops: vec![CropPlan {
                crop: "tomato".to_string(),
                area_ha: 4.0,
                planting_dates: vec!["03-01".to_string()],
            }],
            policies: PolicyOverrides::default(),
        }
    }

    #[test]
    fn test_scenario_creation() {
        let mut scenario = Scenario::new("test_scenario".to_string());
        scenario.description = "A test scenario".to_string();
        scenario.add_farm(create_test_farm("farm_1"));

        assert_eq!(scenario.farms.len(), 1);
        assert_eq!(scenario.name, "test_scenario");
        assert!(scenario.validate().is_ok());
    }

    #[test]
    fn test_scenario_validation() {
        let mut scenario = Scenario::new("invalid".to_string());
        assert!(scenario.validate().is_err());

        let mut oversized = create_test_farm("oversized");
        oversized.crops[0].area_ha = 12.0;
        scenario.add_farm(oversized);
        assert!(matches!(scenario.validate(), Err(SimError::Config(_))));

        scenario.farms[0].crops[0].area_ha = 4.0;
        scenario.farms[0].crops[0].planting_dates = vec!["13-40".to_string()];
        assert!(scenario.validate().is_err());

        scenario.farms[0].crops[0].planting_dates = vec!["02-29".to_string()];
        assert!(scenario.validate().is_ok());

        scenario.add_farm(create_test_farm("oversized"));
        assert!(scenario.validate().is_err(), "duplicate ids must be rejected");
    }

    fn create_valid_scenario() -> Scenario {
        let mut scenario = Scenario::new("infrastructure".to_string());
        scenario.add_farm(create_test_farm("farm_1"));
        scenario
    }

    #[test]
    fn test_infrastructure_numbers_are_checked() {
        let cases: &[(&str, fn(&mut Scenario))] = &[
            ("well flow NaN", |s| s.community.wells.flow_m3_per_day = f64::NAN),
            ("negative treatment", |s| {
                s.community.treatment.capacity_m3_per_day = -1.0
            }),
            ("negative storage", |s| s.community.storage_capacity_kg = -5.0),
            ("infinite dried cap", |s| {
                s.community.processing.dried_kg_per_day = Some(f64::INFINITY)
            }),
            ("zero aquifer", |s| s.community.aquifer.exploitable_volume_m3 = 0.0),
            ("negative head", |s| s.community.aquifer.static_head_m = -3.0),
            ("battery NaN", |s| s.community.energy.battery.capacity_kwh = f64::NAN),
            ("yield factor", |s| s.farms[0].yield_factor = -0.5),
            ("export fraction", |s| s.community.energy.export_price_fraction = 1.5),
            ("pump efficiency NaN", |s| s.community.wells.pump_efficiency = f64::NAN),
            ("debt term", |s| {
                s.community.financing.push(DebtConfig {
                    subsystem: "wells".to_string(),
                    principal_usd: dec!(1000),
                    annual_interest_rate: 0.05,
                    term_years: 0,
                })
            }),
        ];

        assert!(create_valid_scenario().validate().is_ok());
        for (label, corrupt) in cases {
            let mut scenario = create_valid_scenario();
            corrupt(&mut scenario);
            assert!(
                matches!(scenario.validate(), Err(SimError::Config(_))),
                "{} was accepted",
                label
            );
        }

        let mut scenario = create_valid_scenario();
        scenario.community.storage_capacity_kg = 0.0;
        scenario.community.processing.canned_kg_per_day = Some(0.0);
        assert!(scenario.validate().is_ok(), "zero capacity is a valid setting");
    }

    #[test]
    fn test_crop_and_processing_tables_are_checked() {
        let tomato = CropParameters {
            season_days: 100,
            kc_initial: 0.6,
            kc_mid: 1.15,
            kc_end: 0.8,
            ky: 1.05,
            potential_yield_kg_per_ha: 40_000.0,
            heat_threshold_c: 35.0,
        };
        assert!(tomato.validate("tomato").is_ok());
        assert!(
            CropParameters {
                season_days: 0,
                ..tomato
            }
            .validate("tomato")
            .is_err()
        );
        assert!(
            CropParameters {
                season_days: CropParameters::MIN_SEASON_DAYS,
                ..tomato
            }
            .validate("tomato")
            .is_ok()
        );
        assert!(matches!(
            CropParameters { ky: f64::NAN, ..tomato }.validate("tomato"),
            Err(SimError::Config(_))
        ));
        assert!(
            CropParameters {
                kc_mid: -0.1,
                ..tomato
            }
            .validate("tomato")
            .is_err()
        );

        let dried = ProcessingSpec {
            weight_retention: 0.12,
            energy_kwh_per_kg: 0.8,
            shelf_life_days: 365,
        };
        assert!(dried.validate(ProductType::Dried).is_ok());
        assert!(
            ProcessingSpec {
                weight_retention: 0.0,
                ..dried
            }
            .validate(ProductType::Dried)
            .is_err()
        );
        assert!(
            ProcessingSpec {
                energy_kwh_per_kg: f64::NAN,
                ..dried
            }
            .validate(ProductType::Dried)
            .is_err()
        );
    }

    #[test]
    fn test_stage_fractions_must_sum_to_one() {
        let mut scenario = Scenario::new("fractions".to_string());
        scenario.add_farm(create_test_farm("farm_1"));
        scenario.simulation.growth_stage_fractions = StageFractions {
            initial: 0.2,
            development: 0.2,
            mid_season: 0.2,
            late_season: 0.2,
        };
        assert!(scenario.validate().is_err());

        scenario.simulation.growth_stage_fractions = StageFractions {
            initial: 0.1,
            development: 0.3,
            mid_season: 0.4,
            late_season: 0.2,
        };
        assert!(scenario.validate().is_ok());
    }

    #[test]
    fn test_unknown_policy_rejected() {
        let mut scenario = Scenario::new("policies".to_string());
        let mut farm = create_test_farm("farm_1");
        farm.policies.water = Some("pump_everything".to_string());
        scenario.add_farm(farm);

        match scenario.validate() {
            Err(SimError::UnknownPolicy {
                domain, available, ..
            }) => {
                assert_eq!(domain, "water");
                assert!(available.contains("max_groundwater"));
            }
            other => panic!("expected unknown policy error, got {:?}", other),
        }

        scenario.farms[0].policies.water = None;
        scenario.community_policies.energy = "nuclear".to_string();
        assert!(matches!(
            scenario.validate(),
            Err(SimError::UnknownPolicy { domain: "energy", .. })
        ));
    }

    #[test]
    fn test_battery_initial_soc_bounds() {
        let mut scenario = Scenario::new("battery".to_string());
        scenario.add_farm(create_test_farm("farm_1"));
        scenario.community.energy.battery.initial_soc = 0.05;
        assert!(scenario.validate().is_err());
        scenario.community.energy.battery.initial_soc = 0.5;
        assert!(scenario.validate().is_ok());
    }

    #[test]
    fn test_policy_resolution_and_parameters() {
        let mut scenario = Scenario::new("resolution".to_string());
        let mut farm = create_test_farm("farm_1");
        farm.policies.market = Some("hold_for_peak".to_string());
        scenario.add_farm(farm);

        let resolved = scenario.policies_for(&scenario.farms[0]);
        assert_eq!(resolved.market, "hold_for_peak");
        assert_eq!(resolved.water, "max_groundwater");
        assert_eq!(resolved.energy, "renewable_first");

        scenario
            .policy_parameters
            .set("conserve_groundwater", "max_gw_ratio", 0.5);
        assert_eq!(
            scenario
                .policy_parameters
                .get("conserve_groundwater", "max_gw_ratio", 0.3)
                .unwrap(),
            0.5
        );
        assert_eq!(
            scenario
                .policy_parameters
                .get("conserve_groundwater", "price_threshold_multiplier", 1.5)
                .unwrap(),
            1.5
        );

        scenario.policy_parameters.set("adaptive", "steepness", -1.0);
        assert!(scenario.policy_parameters.get("adaptive", "steepness", 5.0).is_err());
    }

    #[test]
    fn test_standard_scenarios() {
        let scenarios = create_standard_scenarios();

        assert!(scenarios.contains_key("baseline"));
        assert!(scenarios.contains_key("scarcity"));

        for (name, scenario) in &scenarios {
            assert!(
                scenario.validate().is_ok(),
                "Scenario {} failed validation",
                name
            );
        }
    }

    #[test]
    fn test_yaml_round_trip_through_file() {
        let yaml = r#"
name: yaml_scenario
simulation:
  start_date: 2021-01-01
  end_date: 2021-06-30
community:
  wells:
    count: 1
    flow_m3_per_day: 60.0
farms:
  - id: north
    area_ha: 5.0
    initial_capital_usd: "2500"
    crops:
      - crop: tomato
        area_ha: 2.0
        planting_dates: ["02-15"]
community_policies:
  water: cheapest_source
policy_parameters:
  cheapest_source.unused: 1.0
"#;
        let path = std::env::temp_dir().join("community_farm_model_scenario_test.yaml");
        std::fs::write(&path, yaml).unwrap();
        let scenario = Scenario::load_from_file(&path).unwrap();
        std::fs::remove_file(&path).ok();

        assert_eq!(scenario.name, "yaml_scenario");
        assert_eq!(scenario.community.well_capacity_m3_per_day(), 60.0);
        assert_eq!(scenario.community.treatment.capacity_m3_per_day, 500.0);
        assert_eq!(scenario.farms[0].yield_factor, 1.0);
        assert_eq!(scenario.community_policies.water, "cheapest_source");
        assert_eq!(scenario.community_policies.market, "sell_all_immediately");
        assert!(scenario.validate().is_ok());
    }
}
