//! # Arena Generation
//!
//! A single open room filling everything inside the border. Used for boss and
//! set-piece levels.

use crate::{Coord, DelveError, DelveResult, Excavation, Generator, GeneratorOptions, RandomSource};

/// One-room generator.
#[derive(Debug, Clone)]
pub struct ArenaGenerator {
    width: u32,
    height: u32,
    options: GeneratorOptions,
}

impl ArenaGenerator {
    /// Creates an arena generator.
    ///
    /// # Examples
    ///
    /// ```
    /// use delve::{ArenaGenerator, GeneratorOptions};
    ///
    /// assert!(ArenaGenerator::new(10, 8, GeneratorOptions::default()).is_ok());
    /// assert!(ArenaGenerator::new(2, 8, GeneratorOptions::default()).is_err());
    /// ```
    pub fn new(width: u32, height: u32, options: GeneratorOptions) -> DelveResult<Self> {
        Self::check_size(width, height)?;
        Ok(Self {
            width,
            height,
            options,
        })
    }

    /// The grid must leave at least one interior cell.
    pub fn check_size(width: u32, height: u32) -> DelveResult<()> {
        if width < 3 || height < 3 {
            return Err(DelveError::InvalidConfig(format!(
                "arena needs at least 3x3 cells, got {}x{}",
                width, height
            )));
        }
        Ok(())
    }
}

impl Generator for ArenaGenerator {
    fn excavate<R: RandomSource>(&self, _rng: &mut R) -> DelveResult<Excavation> {
        let mut excavation = Excavation::new(self.width, self.height);
        excavation.blank();

        let corner1 = Coord::new(1, 1);
        let corner2 = Coord::new(self.width as i32 - 2, self.height as i32 - 2);
        excavation.dig_room(corner1, corner2);
        excavation.add_dug(excavation.interior_area());

        Ok(excavation)
    }

    fn options(&self) -> &GeneratorOptions {
        &self.options
    }

    fn generator_type(&self) -> &'static str {
        "ArenaGenerator"
    }
}
