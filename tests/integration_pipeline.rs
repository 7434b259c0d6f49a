//! Integration test for the generate-and-build pipeline.

use delve::{
    generate_with_kind, utils, Coord, DelveError, DelveResult, DiggerGenerator, GenerationConfig,
    Generator, GeneratorKind, GeneratorOptions, Grid, LayoutBuilder, MapBuilder, SeededSource,
    UniformGenerator,
};

/// Records every builder call so the hand-off order can be checked.
#[derive(Default)]
struct TraceBuilder {
    calls: Vec<String>,
}

impl MapBuilder for TraceBuilder {
    type Map = (Grid, Vec<(Coord, Coord)>);

    fn from_bitmap(
        &mut self,
        id: &str,
        grid: &Grid,
        wall: &str,
        corridor: &str,
    ) -> DelveResult<Self::Map> {
        self.calls.push(format!("bitmap {} {} {}", id, wall, corridor));
        Ok((grid.clone(), Vec::new()))
    }

    fn add_room(
        &mut self,
        map: &mut Self::Map,
        room: &str,
        corner1: Coord,
        corner2: Coord,
    ) -> DelveResult<()> {
        self.calls.push(format!("room {}", room));
        map.1.push((corner1, corner2));
        Ok(())
    }
}

#[test]
fn test_builder_called_bitmap_first_then_rooms() -> DelveResult<()> {
    let options = GeneratorOptions {
        wall: "rock".to_string(),
        corridor: "hall".to_string(),
        room: "chamber".to_string(),
    };
    let generator = DiggerGenerator::new(50, 20, options)?;
    let mut builder = TraceBuilder::default();
    let mut rng = SeededSource::from_seed(7);
    let (grid, rooms) = generator.generate("depth-3", &mut rng, &mut builder)?;

    assert_eq!(builder.calls[0], "bitmap depth-3 rock hall");
    assert!(builder.calls[1..].iter().all(|c| c == "room chamber"));
    assert_eq!(builder.calls.len(), rooms.len() + 1);
    assert!(!rooms.is_empty());

    for (corner1, corner2) in rooms {
        for x in corner1.x..=corner2.x {
            for y in corner1.y..=corner2.y {
                assert!(grid.is_floor(Coord::new(x, y)));
            }
        }
    }
    Ok(())
}

#[test]
fn test_every_kind_from_config() -> DelveResult<()> {
    for kind in [GeneratorKind::Arena, GeneratorKind::Uniform, GeneratorKind::Digger] {
        let mut config = GenerationConfig::for_testing(3);
        config.generator = kind;

        let mut generated = None;
        for seed in 0..20 {
            config.seed = Some(seed);
            match generate_with_kind(&config, "lvl", &mut config.source(), &mut LayoutBuilder) {
                Ok(layout) => {
                    generated = Some(layout);
                    break;
                }
                Err(DelveError::GenerationFailed(_)) => continue,
                Err(e) => return Err(e),
            }
        }

        let layout = generated.expect("at least one seed succeeds");
        assert_eq!(layout.grid.width(), config.width);
        assert_eq!(layout.grid.height(), config.height);
        assert!(layout.grid.floor_count() > 0);
        assert!(layout.grid.border().all(|c| layout.grid.is_wall(c)));
    }
    Ok(())
}

#[test]
fn test_same_seed_same_layout() -> DelveResult<()> {
    let config = GenerationConfig::new(99);
    let a = generate_with_kind(&config, "a", &mut config.source(), &mut LayoutBuilder)?;
    let b = generate_with_kind(&config, "a", &mut config.source(), &mut LayoutBuilder)?;
    assert_eq!(a, b);
    Ok(())
}

#[test]
fn test_generator_is_reusable() -> DelveResult<()> {
    let generator = UniformGenerator::new(60, 20, GeneratorOptions::default())?;
    let mut rng = SeededSource::from_seed(5);
    let mut successes = 0;

    for _ in 0..5 {
        match generator.excavate(&mut rng) {
            Ok(excavation) => {
                generator.validate(&excavation)?;
                assert!(utils::floor_is_connected(excavation.grid()));
                successes += 1;
            }
            Err(DelveError::GenerationFailed(_)) => {}
            Err(e) => return Err(e),
        }
    }
    assert!(successes > 0);
    Ok(())
}

#[test]
fn test_invalid_config_fails_before_digging() {
    let mut config = GenerationConfig::for_testing(1);
    config.width = 2;
    config.generator = GeneratorKind::Arena;
    let result = generate_with_kind(&config, "x", &mut config.source(), &mut LayoutBuilder);
    assert!(matches!(result, Err(DelveError::InvalidConfig(_))));
}

#[test]
fn test_config_from_json() -> DelveResult<()> {
    let config = GenerationConfig::from_json_str(
        r#"{
            "seed": 12,
            "width": 32,
            "height": 16,
            "generator": "digger",
            "digger": { "dug_fraction": 0.3 }
        }"#,
    )?;
    assert_eq!(config.seed, Some(12));
    assert_eq!(config.generator, GeneratorKind::Digger);
    assert_eq!(config.digger.dug_fraction, 0.3);
    assert_eq!(config.digger.min_room_size, delve::DiggerConfig::default().min_room_size);

    let layout = generate_with_kind(&config, "json", &mut config.source(), &mut LayoutBuilder)?;
    let dug = layout.grid.floor_count() as f64 / layout.grid.interior_area() as f64;
    assert!(dug >= 0.3);
    Ok(())
}
