#[cfg(test)]
mod tests {
    use super::super::energy::*;
    use super::super::policies::energy::{AllGrid, EnergyPolicy, Microgrid, RenewableFirst};
    use super::super::scenario::{BatteryConfig, EnergyConfig, GeneratorConfig};
    use rust_decimal::Decimal;
    use rust_decimal_macros::dec;

    fn create_test_battery(soc: f64) -> BatteryState {
        BatteryState::new(&BatteryConfig {
            capacity_kwh: 100.0,
            hardware_floor_soc: 0.10,
            soc_max: 0.95,
            initial_soc: soc,
            charge_efficiency: 1.0,
            discharge_efficiency: 1.0,
            calendar_fade_per_year: 0.01,
            cycle_fade_per_efc: 0.001,
        })
    }

    fn create_test_generator() -> GeneratorConfig {
        GeneratorConfig {
            capacity_kw: 10.0,
            min_load_fraction: 0.3,
            fuel_l_per_kwh: 0.3,
        }
    }

    fn prices() -> DispatchPrices {
        DispatchPrices {
            grid_import_per_kwh: dec!(0.20),
            grid_export_per_kwh: dec!(0.10),
            diesel_per_l: dec!(1.50),
        }
    }

    fn flags(grid: bool, generator: bool, reserve: f64) -> DispatchFlags {
        DispatchFlags {
            use_renewables: true,
            use_battery: true,
            grid_import: grid,
            grid_export: grid,
            use_generator: generator,
            battery_reserve_soc: reserve,
        }
    }

    #[test]
    fn test_policy_reserve_overrides_hardware_floor() {
        let battery = create_test_battery(0.15);
        assert_eq!(battery.discharge_floor(0.20), 0.20);
        assert_eq!(battery.discharge_floor(0.05), 0.10);
        assert_eq!(battery.available_discharge_kwh(0.20), 0.0);

        let result = dispatch(
            50.0,
            0.0,
            0.0,
            &battery,
            &create_test_generator(),
            &flags(true, false, 0.20),
            &prices(),
        );
        assert_eq!(result.battery_discharge_kwh, 0.0);
        assert_eq!(result.grid_import_kwh, 50.0);
        assert_eq!(result.soc_after, 0.15);
        assert_eq!(result.cost_usd, dec!(10.00));
    }

    #[test]
    fn test_battery_discharges_down_to_floor() {
        let battery = create_test_battery(0.5);
        let result = dispatch(
            100.0,
            0.0,
            0.0,
            &battery,
            &create_test_generator(),
            &DispatchFlags {
                use_generator: false,
                ..flags(false, false, 0.2)
            },
            &prices(),
        );
        assert!((result.battery_discharge_kwh - 30.0).abs() < 1e-9);
        assert!((result.unmet_kwh - 70.0).abs() < 1e-9);
        assert!((result.soc_after - 0.2).abs() < 1e-9);
        assert!(result.soc_after >= battery.hardware_floor_soc);
    }

    #[test]
    fn test_renewables_serve_load_first_and_surplus_charges() {
        let battery = create_test_battery(0.5);
        let result = dispatch(
            40.0,
            60.0,
            10.0,
            &battery,
            &create_test_generator(),
            &flags(true, false, 0.2),
            &prices(),
        );
        assert_eq!(result.pv_used_kwh, 40.0);
        assert_eq!(result.wind_used_kwh, 0.0);
        assert_eq!(result.grid_import_kwh, 0.0);
        // 30 kWh surplus; 45 kWh of headroom to soc_max.
        assert!((result.battery_charge_kwh - 30.0).abs() < 1e-9);
        assert!((result.soc_after - 0.8).abs() < 1e-9);
        assert_eq!(result.grid_export_kwh, 0.0);
        assert_eq!(result.self_supplied_kwh(), 40.0);
    }

    #[test]
    fn test_full_battery_exports_surplus() {
        let battery = create_test_battery(0.95);
        let result = dispatch(
            30.0,
            100.0,
            0.0,
            &battery,
            &create_test_generator(),
            &flags(true, false, 0.2),
            &prices(),
        );
        assert_eq!(result.battery_charge_kwh, 0.0);
        assert!((result.grid_export_kwh - 70.0).abs() < 1e-9);
        assert_eq!(result.cost_usd, dec!(-7.0));
        assert!(result.soc_after <= battery.soc_max);
    }

    #[test]
    fn test_generator_minimum_load_curtails_excess() {
        let battery = create_test_battery(0.10);
        let result = dispatch(
            20.0,
            0.0,
            0.0,
            &battery,
            &create_test_generator(),
            &flags(false, true, 0.2),
            &prices(),
        );
        assert!((result.generator_kwh - 72.0).abs() < 1e-9);
        assert!((result.curtailed_kwh - 52.0).abs() < 1e-9);
        assert!((result.generator_fuel_l - 21.6).abs() < 1e-9);
        assert_eq!(result.unmet_kwh, 0.0);
        assert!(result.cost_usd > Decimal::ZERO);
    }

    #[test]
    fn test_generator_capacity_leaves_unmet() {
        let battery = create_test_battery(0.10);
        let result = dispatch(
            300.0,
            0.0,
            0.0,
            &battery,
            &create_test_generator(),
            &flags(false, true, 0.2),
            &prices(),
        );
        assert!((result.generator_kwh - 240.0).abs() < 1e-9);
        assert!((result.unmet_kwh - 60.0).abs() < 1e-9);
    }

    #[test]
    fn test_all_grid_exports_all_renewables() {
        let policy = AllGrid;
        let battery = create_test_battery(0.5);
        let result = dispatch(
            30.0,
            50.0,
            0.0,
            &battery,
            &create_test_generator(),
            &policy.flags(),
            &prices(),
        );
        assert_eq!(result.pv_used_kwh, 0.0);
        assert_eq!(result.grid_import_kwh, 30.0);
        assert_eq!(result.grid_export_kwh, 50.0);
        assert_eq!(result.soc_after, 0.5);
        assert_eq!(result.cost_usd, dec!(1.0));
    }

    #[test]
    fn test_policy_flags() {
        let microgrid = Microgrid {
            battery_reserve_pct: 0.25,
        };
        assert!(!microgrid.flags().grid_import);
        assert!(microgrid.flags().use_generator);
        assert_eq!(microgrid.flags().battery_reserve_soc, 0.25);

        let renewable = RenewableFirst {
            battery_reserve_pct: 0.2,
        };
        assert!(renewable.flags().grid_import);
        assert!(!renewable.flags().use_generator);
    }

    #[test]
    fn test_energy_balance_holds() {
        let battery = create_test_battery(0.6);
        for (demand, pv, grid) in [(80.0, 30.0, true), (10.0, 90.0, true), (120.0, 0.0, false)] {
            let result = dispatch(
                demand,
                pv,
                5.0,
                &battery,
                &create_test_generator(),
                &flags(grid, !grid, 0.2),
                &prices(),
            );
            let served = result.self_supplied_kwh()
                + result.grid_import_kwh
                + result.generator_kwh
                + result.unmet_kwh;
            assert_eq!(result.curtailed_kwh, 0.0);
            assert!((served - demand).abs() < 1e-9);
            assert!(result.soc_after >= battery.hardware_floor_soc - 1e-12);
            assert!(result.soc_after <= battery.soc_max + 1e-12);
        }
    }

    #[test]
    fn test_yearly_degradation() {
        let mut state = EnergyState::new(&EnergyConfig {
            pv_kw: 10.0,
            pv_degradation_per_year: 0.005,
            battery: BatteryConfig {
                capacity_kwh: 100.0,
                calendar_fade_per_year: 0.01,
                cycle_fade_per_efc: 0.001,
                charge_efficiency: 1.0,
                discharge_efficiency: 1.0,
                ..BatteryConfig::default()
            },
            ..EnergyConfig::default()
        });
        let day = DispatchResult {
            demand_kwh: 100.0,
            battery_charge_kwh: 100.0,
            battery_discharge_kwh: 100.0,
            soc_after: 0.5,
            ..Default::default()
        };
        state.apply(&day);
        assert!((state.battery.efc_this_year() - 1.0).abs() < 1e-9);

        let totals = state.close_year();
        assert_eq!(totals.demand_kwh, 100.0);
        assert_eq!(totals.self_supplied_kwh, 100.0);
        assert!((state.battery.capacity_factor - 0.989).abs() < 1e-9);
        assert!((state.battery.cumulative_efc - 1.0).abs() < 1e-9);
        assert_eq!(state.battery.efc_this_year(), 0.0);
        assert!((state.pv_capacity_factor - 0.995).abs() < 1e-9);
        assert_eq!(state.year, EnergyTotals::default());
    }
}
