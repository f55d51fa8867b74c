//! Behavioural properties of the atmosphere model and the absorption tables.
//!
//! These tests go through the public facade only and use the O2 A-band
//! fixture in `tests/data`.

use std::sync::Arc;

use approx::assert_relative_eq;
use rtbx::prelude::*;

const O2_A_BAND: &str = include_str!("data/o2_a_band.toml");

fn unit(s: &str) -> Unit {
    Unit::parse(s).unwrap()
}

fn o2_table() -> Arc<SpectroscopyTable<f64>> {
    Arc::new(SpectroscopyTable::from_toml_str(O2_A_BAND).unwrap())
}

fn atmosphere(n_retrieval: usize, n_met: usize) -> EarthAtmosphere<f64> {
    EarthAtmosphere::new(n_retrieval, n_met, AtmosphereUnits::standard().unwrap()).unwrap()
}

mod units {
    use super::*;

    /// Converting there and back again returns the original value.
    #[test]
    fn test_round_trip_within_class() {
        let pairs = [
            ("hPa", "Pa"),
            ("atm", "Torr"),
            ("bar", "hPa"),
            ("km", "micron"),
            ("cm^-1", "m^-1"),
            ("cm^2/molecule", "m^2"),
            ("m/s^2", "cm s^-2"),
            ("g/kg", "ppm"),
            ("K", "mK"),
        ];
        for (a, b) in pairs {
            let q = PhysicalQuantity::array(vec![0.37, 12.5, 8125.0], unit(a));
            let back = q.convert(&unit(b)).unwrap().convert(&unit(a)).unwrap();
            for (x, y) in q.values().iter().zip(back.values()) {
                assert_relative_eq!(*x, y, max_relative = 1e-12);
            }
        }
    }

    #[test]
    fn test_relative_temperature_never_converts() {
        let celsius = PhysicalQuantity::scalar(15.0, unit("degC"));
        assert!(celsius.convert(&unit("K")).is_err());
        assert!(celsius.convert(&unit("degF")).is_err());
    }

    /// An angle is not a mass ratio, whichever field it is offered to.
    #[test]
    fn test_angle_is_its_own_class() {
        assert!(unit("deg").convert_to(1.0, &unit("ppm")).is_err());

        let vmr = SharedArray::from_vec(vec![0.2095; 4]);
        assert!(GasAbsorber::new("O2", o2_table(), vmr, unit("deg")).is_err());

        let atmosphere = atmosphere(4, 4);
        let angle = PhysicalQuantity::array(vec![90.0; 4], unit("deg"));
        assert!(matches!(
            atmosphere.ingest("specific_humidity_levels", &angle),
            Err(RTBXError::Dimension(_))
        ));
        assert_eq!(atmosphere.specific_humidity().levels().to_vec(), vec![0.0; 4]);
    }

    #[test]
    fn test_unknown_symbol_fails_to_parse() {
        assert!(matches!(
            Unit::parse("furlong/s"),
            Err(rtbx::rtbx_core::units::ParseError::UnknownUnit(_))
        ));
        let config = "n_retrieval_levels = 3\nn_met_levels = 3\n\n[units]\n\
                      retrieval_pressure = \"hPa\"\nmet_pressure = \"hPa\"\n\
                      temperature = \"K\"\nspecific_humidity = \"kg/kg\"\n\
                      altitude = \"furlong\"\ngravity = \"m/s^2\"\n";
        assert!(EarthAtmosphere::<f64>::from_toml_str(config).is_err());
    }
}

mod grids {
    use super::*;

    #[test]
    fn test_levels_to_layers_exact() {
        assert_eq!(
            levels_to_layers(&[1.0, 100.0, 500.0, 1000.0]),
            vec![50.5, 300.0, 750.0]
        );
    }

    /// Level counts do not move whatever is done to contents or elements.
    #[test]
    fn test_level_counts_are_invariant() {
        let mut atmosphere = atmosphere(5, 8);
        let table = o2_table();

        let temperature: Vec<f64> = (0..8).map(|i| 200.0 + 10.0 * i as f64).collect();
        let temperature = PhysicalQuantity::array(temperature, unit("K"));
        atmosphere.ingest("temperature_levels", &temperature).unwrap();
        atmosphere.met_pressure().levels().write()[3] = 512.0;
        atmosphere.calculate_layers();

        atmosphere.add_element(RayleighScattering.into()).unwrap();
        let vmr = SharedArray::from_vec(vec![0.2095; 5]);
        atmosphere
            .add_element(GasAbsorber::new("O2", table, vmr, unit("1")).unwrap().into())
            .unwrap();
        let too_long = PhysicalQuantity::array(vec![1.0; 9], unit("K"));
        assert!(atmosphere.ingest("temperature_levels", &too_long).is_err());
        atmosphere.remove_element(0);

        assert_eq!(atmosphere.n_retrieval_levels(), 5);
        assert_eq!(atmosphere.n_retrieval_layers(), 4);
        assert_eq!(atmosphere.n_met_levels(), 8);
        assert_eq!(atmosphere.n_met_layers(), 7);
        for name in ["temperature", "specific_humidity", "altitude", "gravity"] {
            let grid = atmosphere.grid(name).unwrap();
            assert_eq!((grid.n_levels(), grid.n_layers()), (8, 7), "{name}");
        }
    }
}

mod ingest {
    use super::*;

    #[test]
    fn test_ingest_stores_converted_values() {
        let atmosphere = atmosphere(4, 4);
        let pressure = PhysicalQuantity::array(vec![0.001, 0.1, 0.5, 1.0], unit("bar"));
        atmosphere.ingest("retrieval_pressure_levels", &pressure).unwrap();
        let stored = atmosphere.retrieval_pressure().levels().to_vec();
        for (value, expected) in stored.iter().zip([1.0, 100.0, 500.0, 1000.0]) {
            assert_relative_eq!(*value, expected, max_relative = 1e-12);
        }
    }

    #[test]
    fn test_ingest_across_classes_leaves_target_unchanged() {
        let atmosphere = atmosphere(4, 4);
        let gravity = PhysicalQuantity::array(vec![9.80, 9.79, 9.78, 9.77], unit("m/s^2"));
        atmosphere.ingest("gravity_levels", &gravity).unwrap();

        let wrong = PhysicalQuantity::array(vec![1.0, 2.0, 3.0, 4.0], unit("km"));
        let result = atmosphere.ingest("gravity_levels", &wrong);
        assert!(matches!(result, Err(RTBXError::Dimension(_))));
        assert_eq!(atmosphere.gravity().levels().to_vec(), vec![9.80, 9.79, 9.78, 9.77]);
    }

    #[test]
    fn test_unitless_source_is_taken_verbatim() {
        let atmosphere = atmosphere(4, 4);
        let values = ndarray::array![250.0, 255.0, 260.0, 265.0];
        let raw = PhysicalQuantity::unitless(QuantityValue::Array(values.clone()));
        atmosphere.ingest("temperature_levels", &raw).unwrap();
        assert_eq!(atmosphere.temperature().levels().to_array(), values);
    }
}

mod spectroscopy {
    use super::*;

    /// Every stored tensor value comes back exactly at its grid coordinates.
    #[test]
    fn test_exact_grid_lookup() {
        let table = o2_table();
        let spectral = table.spectral().to_vec();
        let broadener = table.broadener_vmrs().to_vec();
        let pressures = table.pressures().to_vec();
        let temperatures = table.temperatures().clone();
        let cross_section = table.cross_section().clone();

        for (iw, &w) in spectral.iter().enumerate() {
            for (ib, &b) in broadener.iter().enumerate() {
                for (ip, &p) in pressures.iter().enumerate() {
                    for it in 0..temperatures.ncols() {
                        let t = temperatures[[ip, it]];
                        let value = table.lookup(w, p, t, b).unwrap();
                        assert_eq!(value, cross_section[[iw, ib, it, ip]]);
                    }
                }
            }
        }
    }

    #[test]
    fn test_scale_factor_is_applied_once() {
        let table = o2_table();
        assert_eq!(table.scale_factor(), Some(1e-24));
        assert_relative_eq!(table.cross_section()[[0, 0, 0, 0]], 1e-24, max_relative = 1e-12);
    }

    /// Between two pressure points the result stays within the values at
    /// those points.
    #[test]
    fn test_pressure_interpolation_is_bracketed() {
        let table = o2_table();
        let (w, t, x) = (760.4, 240.0, 0.03);
        let v_lo = table.lookup(w, 300.0, t, x).unwrap();
        let v_hi = table.lookup(w, 700.0, t, x).unwrap();
        let (min, max) = (v_lo.min(v_hi), v_lo.max(v_hi));

        for p in [300.5, 350.0, 500.0, 650.0, 699.9] {
            let v = table.lookup(w, p, t, x).unwrap();
            assert!(v >= min * (1.0 - 1e-12) && v <= max * (1.0 + 1e-12), "p = {p}: {v}");
        }
    }

    #[test]
    fn test_pressure_outside_table_is_clamped() {
        let table = o2_table();
        let clamped = table.lookup(761.0, 2000.0, 270.0, 0.02).unwrap();
        let surface = table.lookup(761.0, 1050.0, 270.0, 0.02).unwrap();
        assert_eq!(clamped, surface);
    }

    #[test]
    fn test_other_axes_are_bounded() {
        let table = o2_table();
        assert!(matches!(
            table.lookup(759.0, 500.0, 250.0, 0.0),
            Err(RTBXError::Bounds { .. })
        ));
        assert!(matches!(
            table.lookup(761.0, 500.0, 250.0, 0.1),
            Err(RTBXError::Bounds { .. })
        ));
        // 190 K is on the 300 hPa row but below the 700 hPa row
        assert!(matches!(
            table.lookup(761.0, 500.0, 190.0, 0.0),
            Err(RTBXError::Bounds { .. })
        ));
    }

    #[test]
    fn test_lookup_from_wavenumber() {
        let table = o2_table();
        let nu = PhysicalQuantity::scalar(1e7 / 761.0, unit("cm^-1"));
        let p = PhysicalQuantity::scalar(70000.0, unit("Pa"));
        let t = PhysicalQuantity::scalar(250.0, unit("K"));
        let result = table.lookup_in_units(&nu, &p, &t, 0.02).unwrap();
        let direct = table.lookup(761.0, 700.0, 250.0, 0.02).unwrap();
        assert_relative_eq!(result.values()[0], direct, max_relative = 1e-9);
    }

    /// One table serves lookups from several threads at once.
    #[test]
    fn test_shared_between_threads() {
        let table = o2_table();
        let expected = table.lookup(761.5, 420.0, 245.0, 0.01).unwrap();
        std::thread::scope(|scope| {
            for _ in 0..4 {
                let table = Arc::clone(&table);
                scope.spawn(move || {
                    assert_eq!(table.lookup(761.5, 420.0, 245.0, 0.01).unwrap(), expected);
                });
            }
        });
    }
}

mod elements {
    use super::*;

    fn absorber(name: &str) -> AtmosphereElement<f64> {
        GasAbsorber::new_copied(name, o2_table(), &[0.2095; 4], unit("1"))
            .unwrap()
            .into()
    }

    #[test]
    fn test_capability_matching_ignores_order() {
        let empty: Vec<AtmosphereElement<f64>> = Vec::new();
        assert!(!any_matches_capability(&empty, Capability::GasAbsorption));

        let orders: [Vec<AtmosphereElement<f64>>; 3] = [
            vec![absorber("O2"), RayleighScattering.into(), absorber("H2O")],
            vec![RayleighScattering.into(), absorber("O2"), absorber("H2O")],
            vec![absorber("O2"), absorber("H2O"), RayleighScattering.into()],
        ];
        for elements in &orders {
            assert!(any_matches_capability(elements, Capability::GasAbsorption));
            assert!(any_matches_capability(elements, Capability::RayleighScattering));
            assert!(!any_matches_capability(elements, Capability::AerosolScattering));
            assert_eq!(elements_with_capability(elements, Capability::GasAbsorption).len(), 2);
        }

        let gases_only = vec![absorber("O2")];
        assert!(!any_matches_capability(&gases_only, Capability::RayleighScattering));
    }

    /// The VMR buffer handed to an absorber stays the caller's buffer.
    #[test]
    fn test_vmr_aliasing() {
        let table = o2_table();
        let a = SharedArray::from_vec(vec![0.2095, 0.2095, 0.2095, 0.2095]);
        let mut atmosphere = atmosphere(4, 10);
        atmosphere
            .add_element(
                GasAbsorber::new("O2", Arc::clone(&table), a.clone(), unit("1"))
                    .unwrap()
                    .into(),
            )
            .unwrap();

        a.write()[2] = 0.15;

        let o2 = atmosphere.gas_absorber("O2").unwrap();
        assert_eq!(o2.vmr_levels().read()[2], 0.15);
        assert!(Arc::ptr_eq(o2.spectroscopy(), &table));
    }
}

mod windows {
    use super::*;

    #[test]
    fn test_wavelength_window_rejects_wavenumber_accessors() {
        let grid: Vec<f64> = (0..=30).map(|i| 759.5 + 0.1 * i as f64).collect();
        let window = SpectralWindow::new("o2a", 759.8, 762.2, grid, unit("nm"), 761.0).unwrap();

        assert!(window.wavelength_grid().is_ok());
        assert!(matches!(
            window.wavenumber_grid(),
            Err(RTBXError::SpectralFamilyMismatch { .. })
        ));
        assert!(matches!(
            window.wavenumber_reference(),
            Err(RTBXError::SpectralFamilyMismatch { .. })
        ));
    }

    /// A window's grid drives a whole-spectrum lookup.
    #[test]
    fn test_window_grid_through_table() {
        let table = o2_table();
        let grid: Vec<f64> = (0..=20).map(|i| 760.0 + 0.1 * i as f64).collect();
        let window = SpectralWindow::new("o2a", 760.2, 761.8, grid, unit("nm"), 761.0).unwrap();
        let spectrum = table
            .lookup_spectrum(window.wavelength_grid().unwrap().view(), 500.0, 250.0, 0.02)
            .unwrap();
        assert_eq!(spectrum.len(), window.n_hires());
        assert!(spectrum.iter().all(|v| *v > 0.0));
    }
}
