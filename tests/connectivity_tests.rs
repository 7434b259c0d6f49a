//! Tests that generated levels can be walked from any floor cell to any other.

use delve::{
    utils, Coord, DelveError, DelveResult, DiggerConfig, DiggerGenerator, Generator,
    GeneratorOptions, SeededSource, UniformConfig, UniformGenerator,
};

#[test]
fn test_digger_levels_are_connected() -> DelveResult<()> {
    for seed in 100..130 {
        let generator = DiggerGenerator::new(48, 24, GeneratorOptions::default())?;
        let excavation = generator.excavate(&mut SeededSource::from_seed(seed))?;
        assert!(
            utils::floor_is_connected(excavation.grid()),
            "seed {} produced disconnected floor:\n{}",
            seed,
            excavation.grid().to_ascii()
        );
    }
    Ok(())
}

#[test]
fn test_dense_digger_stays_connected() -> DelveResult<()> {
    let config = DiggerConfig {
        dug_fraction: 0.45,
        ..DiggerConfig::default()
    };
    let generator = DiggerGenerator::with_config(40, 30, GeneratorOptions::default(), config)?;

    for seed in 0..5 {
        match generator.excavate(&mut SeededSource::from_seed(seed)) {
            Ok(excavation) => {
                assert!(excavation.dug_fraction() >= 0.45);
                assert!(utils::floor_is_connected(excavation.grid()));
            }
            Err(DelveError::GenerationFailed(_)) => {}
            Err(e) => return Err(e),
        }
    }
    Ok(())
}

#[test]
fn test_uniform_rooms_reach_each_other() -> DelveResult<()> {
    let config = UniformConfig {
        room_coverage: 0.12,
        ..UniformConfig::default()
    };
    let generator = UniformGenerator::with_config(60, 24, GeneratorOptions::default(), config)?;

    let mut checked = 0;
    for seed in 0..30 {
        let excavation = match generator.excavate(&mut SeededSource::from_seed(seed)) {
            Ok(excavation) => excavation,
            Err(DelveError::GenerationFailed(_)) => continue,
            Err(e) => return Err(e),
        };

        let grid = excavation.grid();
        let start = excavation.rooms()[0].center();
        let reachable = utils::reachable_floor(grid, start);
        assert_eq!(reachable.len(), grid.floor_count(), "seed {}", seed);
        for room in excavation.rooms() {
            assert!(reachable.contains(&room.center()));
        }
        checked += 1;
    }
    assert!(checked >= 28, "only {} of 30 uniform levels generated", checked);
    Ok(())
}

#[test]
fn test_reachable_floor_from_wall_is_empty() -> DelveResult<()> {
    let generator = DiggerGenerator::new(30, 15, GeneratorOptions::default())?;
    let excavation = generator.excavate(&mut SeededSource::from_seed(1))?;
    assert!(utils::reachable_floor(excavation.grid(), Coord::new(0, 0)).is_empty());
    Ok(())
}
