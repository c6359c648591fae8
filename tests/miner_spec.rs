use chrono::NaiveDate;
use rocket_miner::miner::{LaunchRepository, MinerError, RocketMiner};
use rocket_miner::models::*;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use speculate2::speculate;
use uuid::Uuid;

fn provider(name: &str, country: &str) -> LaunchServiceProvider {
    LaunchServiceProvider {
        id: Uuid::new_v4(),
        name: name.to_string(),
        year_founded: 2000,
        country: country.to_string(),
        headquarters: None,
    }
}

fn rocket(name: &str, country: &str, manufacturer: &LaunchServiceProvider) -> Rocket {
    Rocket {
        id: Uuid::new_v4(),
        name: name.to_string(),
        country: country.to_string(),
        manufacturer: manufacturer.clone(),
        mass_to_leo: None,
        mass_to_gto: None,
        mass_to_other: None,
        first_year_flight: None,
        latest_year_flight: None,
        wikilink: None,
    }
}

fn payload(mass_kg: u32, is_active: bool) -> Payload {
    Payload {
        id: Uuid::new_v4(),
        name: format!("sat-{}", Uuid::new_v4()),
        destination: "LEO".to_string(),
        mass_kg,
        payload_type: "satellite".to_string(),
        is_active,
    }
}

fn date(s: &str) -> NaiveDate {
    NaiveDate::parse_from_str(s, "%Y-%m-%d").expect("valid date")
}

fn launch(on: &str, vehicle: &Rocket, by: &LaunchServiceProvider) -> Launch {
    Launch {
        id: Uuid::new_v4(),
        launch_date: date(on),
        launch_vehicle: vehicle.clone(),
        launch_service_provider: by.clone(),
        orbit: "LEO".to_string(),
        launch_outcome: LaunchOutcome::Successful,
        price: dec!(100),
        payloads: Vec::new(),
        launch_site: None,
        function: None,
    }
}

fn failed(mut l: Launch) -> Launch {
    l.launch_outcome = LaunchOutcome::Failed;
    l
}

fn priced(mut l: Launch, price: Decimal) -> Launch {
    l.price = price;
    l
}

fn into_orbit(mut l: Launch, orbit: &str, payloads: Vec<Payload>) -> Launch {
    l.orbit = orbit.to_string();
    l.payloads = payloads;
    l
}

fn names(rockets: &[Rocket]) -> Vec<&str> {
    rockets.iter().map(|r| r.name.as_str()).collect()
}

fn provider_names(providers: &[LaunchServiceProvider]) -> Vec<&str> {
    providers.iter().map(|p| p.name.as_str()).collect()
}

/// A store that is always down.
struct Unavailable;

impl LaunchRepository for Unavailable {
    fn load_all_launches(&self) -> anyhow::Result<Vec<Launch>> {
        anyhow::bail!("store unavailable")
    }
}

speculate! {
    before {
        let spacex = provider("SpaceX", "USA");
        let ula = provider("ULA", "USA");
        let esa = provider("Arianespace", "France");
        let isro = provider("ISRO", "India");

        let f9 = rocket("Falcon 9", "USA", &spacex);
        let atlas = rocket("Atlas V", "USA", &ula);
        let ariane = rocket("Ariane 5", "France", &esa);
        let pslv = rocket("PSLV", "India", &isro);
    }

    describe "argument checks" {
        it "rejects negative k before reading the store" {
            let miner = RocketMiner::new(Unavailable);

            let results = [
                miner.most_launched_rockets(-1).map(|_| ()),
                miner.most_reliable_launch_service_providers(-1).map(|_| ()),
                miner.most_recent_launches(-1).map(|_| ()),
                miner.most_expensive_launches(-1).map(|_| ()),
                miner.highest_revenue_launch_service_providers(-1, 2017).map(|_| ()),
            ];

            for result in results {
                match result {
                    Err(err @ MinerError::InvalidArgument(_)) => {
                        assert_eq!(err.to_string(), "k cannot be negative");
                    }
                    other => panic!("expected InvalidArgument, got {:?}", other),
                }
            }
        }

        it "returns empty results for k = 0" {
            let miner = RocketMiner::new(vec![
                launch("2017-01-01", &f9, &spacex),
                launch("2018-01-01", &ariane, &esa),
            ]);

            assert!(miner.most_launched_rockets(0).unwrap().is_empty());
            assert!(miner.most_reliable_launch_service_providers(0).unwrap().is_empty());
            assert!(miner.most_recent_launches(0).unwrap().is_empty());
            assert!(miner.most_expensive_launches(0).unwrap().is_empty());
            assert!(miner.highest_revenue_launch_service_providers(0, 2017).unwrap().is_empty());
        }

        it "passes store failures through" {
            let miner = RocketMiner::new(Unavailable);

            let err = miner.most_recent_launches(3).unwrap_err();
            assert!(matches!(err, MinerError::Repository(_)));
            assert_eq!(err.to_string(), "store unavailable");

            assert!(matches!(
                miner.rocket_with_most_active_payloads("USA"),
                Err(MinerError::Repository(_))
            ));
        }

        it "treats an empty store as no candidates" {
            let miner = RocketMiner::new(Vec::<Launch>::new());

            assert!(miner.most_launched_rockets(5).unwrap().is_empty());
            assert!(miner.most_recent_launches(5).unwrap().is_empty());
            assert_eq!(miner.rocket_with_most_active_payloads("USA").unwrap(), None);
        }
    }

    describe "most_launched_rockets" {
        it "ranks rockets by launch count" {
            let miner = RocketMiner::new(vec![
                launch("2017-01-01", &atlas, &ula),
                launch("2017-02-01", &f9, &spacex),
                launch("2017-03-01", &ariane, &esa),
                launch("2017-04-01", &f9, &spacex),
                launch("2017-05-01", &ariane, &esa),
                launch("2017-06-01", &f9, &spacex),
            ]);

            let top = miner.most_launched_rockets(2).unwrap();
            assert_eq!(names(&top), vec!["Falcon 9", "Ariane 5"]);
        }

        it "returns every launched rocket when k exceeds them" {
            let miner = RocketMiner::new(vec![
                launch("2017-01-01", &atlas, &ula),
                launch("2017-02-01", &f9, &spacex),
                launch("2017-03-01", &f9, &spacex),
            ]);

            let top = miner.most_launched_rockets(10).unwrap();
            assert_eq!(names(&top), vec!["Falcon 9", "Atlas V"]);
        }

        it "breaks equal counts by rocket name" {
            let miner = RocketMiner::new(vec![
                launch("2017-01-01", &pslv, &isro),
                launch("2017-02-01", &atlas, &ula),
                launch("2017-03-01", &pslv, &isro),
                launch("2017-04-01", &atlas, &ula),
            ]);

            let top = miner.most_launched_rockets(2).unwrap();
            assert_eq!(names(&top), vec!["Atlas V", "PSLV"]);
        }

        it "counts launches of the same rocket identity together" {
            let mut f9_copy = f9.clone();
            f9_copy.id = Uuid::new_v4();
            f9_copy.mass_to_leo = Some(22_800);

            let miner = RocketMiner::new(vec![
                launch("2017-01-01", &atlas, &ula),
                launch("2017-02-01", &f9, &spacex),
                launch("2017-03-01", &f9_copy, &spacex),
            ]);

            let top = miner.most_launched_rockets(1).unwrap();
            assert_eq!(names(&top), vec!["Falcon 9"]);
        }
    }

    describe "most_reliable_launch_service_providers" {
        it "ranks providers by success ratio" {
            let miner = RocketMiner::new(vec![
                launch("2017-01-01", &f9, &spacex),
                failed(launch("2017-02-01", &f9, &spacex)),
                launch("2017-03-01", &atlas, &ula),
                launch("2017-04-01", &atlas, &ula),
                launch("2017-05-01", &ariane, &esa),
                launch("2017-06-01", &ariane, &esa),
                failed(launch("2017-07-01", &ariane, &esa)),
            ]);

            let top = miner.most_reliable_launch_service_providers(3).unwrap();
            assert_eq!(provider_names(&top), vec!["ULA", "Arianespace", "SpaceX"]);
        }

        it "only considers providers credited with launches" {
            // SpaceX builds the rocket, ULA flies it.
            let miner = RocketMiner::new(vec![launch("2017-01-01", &f9, &ula)]);

            let top = miner.most_reliable_launch_service_providers(5).unwrap();
            assert_eq!(provider_names(&top), vec!["ULA"]);
        }

        it "breaks equal ratios by provider name" {
            let miner = RocketMiner::new(vec![
                launch("2017-01-01", &f9, &spacex),
                failed(launch("2017-02-01", &f9, &spacex)),
                launch("2017-03-01", &pslv, &isro),
                failed(launch("2017-04-01", &pslv, &isro)),
            ]);

            let top = miner.most_reliable_launch_service_providers(2).unwrap();
            assert_eq!(provider_names(&top), vec!["ISRO", "SpaceX"]);
        }
    }

    describe "most_recent_launches" {
        it "returns the newest launches first" {
            let miner = RocketMiner::new(vec![
                launch("2015-06-01", &f9, &spacex),
                launch("2019-01-01", &atlas, &ula),
                launch("2017-03-01", &ariane, &esa),
            ]);

            let recent = miner.most_recent_launches(2).unwrap();
            let dates: Vec<_> = recent.iter().map(|l| l.launch_date).collect();
            assert_eq!(dates, vec![date("2019-01-01"), date("2017-03-01")]);
        }

        it "keeps snapshot order for launches on the same day" {
            let first = launch("2018-01-01", &f9, &spacex);
            let second = launch("2018-01-01", &atlas, &ula);
            let miner = RocketMiner::new(vec![
                launch("2010-01-01", &pslv, &isro),
                first.clone(),
                second.clone(),
            ]);

            let recent = miner.most_recent_launches(3).unwrap();
            assert_eq!(recent.len(), 3);
            assert_eq!(recent[0].id, first.id);
            assert_eq!(recent[1].id, second.id);
        }
    }

    describe "successful_launch_rate_in_year" {
        it "rounds the rate to two places" {
            let miner = RocketMiner::new(vec![
                launch("2017-01-01", &f9, &spacex),
                launch("2017-02-01", &f9, &spacex),
                failed(launch("2017-03-01", &f9, &spacex)),
                failed(launch("2018-03-01", &f9, &spacex)),
            ]);

            let rate = miner.successful_launch_rate_in_year(2017).unwrap();
            assert_eq!(rate, dec!(0.67));
            assert_eq!(rate.to_string(), "0.67");
        }

        it "rounds halves up" {
            let mut launches = vec![launch("2016-01-01", &f9, &spacex)];
            for day in 2..=8 {
                launches.push(failed(launch(&format!("2016-01-0{day}"), &f9, &spacex)));
            }
            let miner = RocketMiner::new(launches);

            // 1 of 8 is 0.125
            assert_eq!(miner.successful_launch_rate_in_year(2016).unwrap(), dec!(0.13));
        }

        it "is zero for a year without launches" {
            let miner = RocketMiner::new(vec![launch("2017-01-01", &f9, &spacex)]);

            let rate = miner.successful_launch_rate_in_year(1990).unwrap();
            assert_eq!(rate, Decimal::ZERO);
            assert_eq!(rate.to_string(), "0.00");
        }

        it "is one when every launch succeeded" {
            let miner = RocketMiner::new(vec![launch("2017-01-01", &f9, &spacex)]);
            assert_eq!(miner.successful_launch_rate_in_year(2017).unwrap().to_string(), "1.00");
        }
    }

    describe "dominant_country" {
        it "picks the country with most launches into the orbit" {
            let miner = RocketMiner::new(vec![
                into_orbit(launch("2017-01-01", &f9, &spacex), "GTO", vec![]),
                into_orbit(launch("2017-02-01", &atlas, &ula), "GTO", vec![]),
                into_orbit(launch("2017-03-01", &ariane, &esa), "GTO", vec![payload(9000, true)]),
                into_orbit(launch("2017-04-01", &ariane, &esa), "LEO", vec![]),
                into_orbit(launch("2017-05-01", &ariane, &esa), "LEO", vec![]),
            ]);

            assert_eq!(miner.dominant_country("GTO").unwrap(), "USA");
            assert_eq!(miner.dominant_country("LEO").unwrap(), "France");
        }

        it "settles a tie by payload mass" {
            let miner = RocketMiner::new(vec![
                into_orbit(launch("2017-01-01", &f9, &spacex), "SSO", vec![payload(50, true)]),
                into_orbit(launch("2017-02-01", &f9, &spacex), "SSO", vec![payload(50, false)]),
                into_orbit(launch("2017-03-01", &atlas, &ula), "SSO", vec![]),
                into_orbit(launch("2017-04-01", &ariane, &esa), "SSO", vec![payload(100, true)]),
                into_orbit(launch("2017-05-01", &ariane, &esa), "SSO", vec![payload(25, true)]),
                into_orbit(launch("2017-06-01", &ariane, &esa), "SSO", vec![payload(25, true)]),
            ]);

            // USA: 3 launches, 100 kg. France: 3 launches, 150 kg.
            assert_eq!(miner.dominant_country("SSO").unwrap(), "France");
        }

        it "settles a three-way tie by payload mass" {
            let miner = RocketMiner::new(vec![
                into_orbit(launch("2017-01-01", &f9, &spacex), "MEO", vec![payload(10, true)]),
                into_orbit(launch("2017-02-01", &ariane, &esa), "MEO", vec![payload(20, true)]),
                into_orbit(launch("2017-03-01", &pslv, &isro), "MEO", vec![payload(30, true)]),
            ]);

            assert_eq!(miner.dominant_country("MEO").unwrap(), "India");
        }

        it "falls back to the country name when mass is tied too" {
            let miner = RocketMiner::new(vec![
                into_orbit(launch("2017-01-01", &f9, &spacex), "HEO", vec![payload(10, true)]),
                into_orbit(launch("2017-02-01", &pslv, &isro), "HEO", vec![payload(10, true)]),
            ]);

            assert_eq!(miner.dominant_country("HEO").unwrap(), "India");
        }

        it "reports an orbit nobody launched into" {
            let miner = RocketMiner::new(vec![launch("2017-01-01", &f9, &spacex)]);

            assert!(matches!(
                miner.dominant_country("Pluto"),
                Err(MinerError::NotFound(_))
            ));
        }
    }

    describe "most_expensive_launches" {
        it "returns the dearest launches first" {
            let miner = RocketMiner::new(vec![
                priced(launch("2017-01-01", &f9, &spacex), dec!(100)),
                priced(launch("2017-02-01", &atlas, &ula), dec!(50)),
                priced(launch("2017-03-01", &ariane, &esa), dec!(200)),
            ]);

            let prices: Vec<_> = miner
                .most_expensive_launches(2)
                .unwrap()
                .iter()
                .map(|l| l.price)
                .collect();
            assert_eq!(prices, vec![dec!(200), dec!(100)]);
        }

        it "returns every launch when k exceeds them" {
            let miner = RocketMiner::new(vec![
                priced(launch("2017-01-01", &f9, &spacex), dec!(1)),
                priced(launch("2017-02-01", &atlas, &ula), dec!(2)),
            ]);

            assert_eq!(miner.most_expensive_launches(5).unwrap().len(), 2);
        }

        it "keeps snapshot order on equal prices" {
            let first = priced(launch("2017-01-01", &f9, &spacex), dec!(70));
            let second = priced(launch("2017-02-01", &atlas, &ula), dec!(70.00));
            let miner = RocketMiner::new(vec![first.clone(), second.clone()]);

            let top = miner.most_expensive_launches(2).unwrap();
            assert_eq!(top[0].id, first.id);
            assert_eq!(top[1].id, second.id);
        }
    }

    describe "highest_revenue_launch_service_providers" {
        it "credits the rocket's manufacturer within the year" {
            let miner = RocketMiner::new(vec![
                // Falcon 9 flown by ULA still earns for SpaceX.
                priced(launch("2017-01-01", &f9, &ula), dec!(300)),
                priced(launch("2017-02-01", &atlas, &ula), dec!(100)),
                priced(launch("2017-03-01", &atlas, &ula), dec!(150)),
                priced(launch("2017-04-01", &ariane, &esa), dec!(50)),
                priced(launch("2018-01-01", &ariane, &esa), dec!(10000)),
            ]);

            let top = miner.highest_revenue_launch_service_providers(2, 2017).unwrap();
            assert_eq!(provider_names(&top), vec!["SpaceX", "ULA"]);

            let all = miner.highest_revenue_launch_service_providers(10, 2017).unwrap();
            assert_eq!(provider_names(&all), vec!["SpaceX", "ULA", "Arianespace"]);
        }

        it "leaves out manufacturers with no launches that year" {
            let miner = RocketMiner::new(vec![
                priced(launch("2016-01-01", &f9, &spacex), dec!(300)),
                priced(launch("2017-01-01", &pslv, &isro), dec!(20)),
            ]);

            let top = miner.highest_revenue_launch_service_providers(5, 2017).unwrap();
            assert_eq!(provider_names(&top), vec!["ISRO"]);
        }
    }

    describe "rocket_with_most_active_payloads" {
        it "returns the first rocket among tied launches" {
            let r1 = rocket("R1", "USA", &spacex);
            let r2 = rocket("R2", "USA", &ula);
            let r3 = rocket("R3", "India", &isro);
            let miner = RocketMiner::new(vec![
                into_orbit(launch("2017-01-01", &r1, &spacex), "LEO",
                    vec![payload(1, true), payload(1, true)]),
                into_orbit(launch("2017-02-01", &r2, &ula), "LEO",
                    vec![payload(1, true), payload(1, true), payload(1, false)]),
                into_orbit(launch("2017-03-01", &r3, &isro), "LEO",
                    (0..5).map(|_| payload(1, true)).collect()),
            ]);

            assert_eq!(miner.rocket_with_most_active_payloads("USA").unwrap(), Some(r1));
            assert_eq!(miner.rocket_with_most_active_payloads("India").unwrap(), Some(r3));
            assert_eq!(miner.rocket_with_most_active_payloads("France").unwrap(), None);
        }

        it "lets a later launch win with strictly more active payloads" {
            let miner = RocketMiner::new(vec![
                into_orbit(launch("2017-01-01", &atlas, &ula), "LEO", vec![payload(1, true)]),
                into_orbit(launch("2017-02-01", &f9, &spacex), "LEO",
                    vec![payload(1, true), payload(1, true)]),
            ]);

            assert_eq!(miner.rocket_with_most_active_payloads("USA").unwrap(), Some(f9));
        }

        it "matches on the rocket's country, not the provider's" {
            // An Indian rocket flown by a US provider.
            let miner = RocketMiner::new(vec![
                into_orbit(launch("2017-01-01", &pslv, &spacex), "LEO", vec![payload(1, true)]),
            ]);

            assert_eq!(miner.rocket_with_most_active_payloads("USA").unwrap(), None);
            assert_eq!(miner.rocket_with_most_active_payloads("India").unwrap(), Some(pslv));
        }

        it "still names a rocket when no payload is active" {
            let miner = RocketMiner::new(vec![
                launch("2017-01-01", &atlas, &ula),
                into_orbit(launch("2017-02-01", &f9, &spacex), "LEO", vec![payload(1, false)]),
            ]);

            assert_eq!(miner.rocket_with_most_active_payloads("USA").unwrap(), Some(atlas));
        }
    }
}
