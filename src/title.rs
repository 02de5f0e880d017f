use std::collections::HashSet;

use rand::Rng;

const INSTRUMENT: &str = "M99999";
const RUN: &str = "100";
const FLOWCELL: &str = "000000000-BL3BP";
const LANE: &str = "1";
const TILE: (u32, u32) = (1101, 2110);
const COORD_X: (u32, u32) = (2000, 29000);
const COORD_Y: (u32, u32) = (1, 9999);

/// Produces Illumina-like read titles, `INSTRUMENT:RUN:FLOWCELL:LANE:TILE:X:Y`.
///
/// Tile and coordinates are drawn on a step of 2 from fixed half-open
/// ranges. A title is never handed out twice: on a collision the
/// synthesizer draws again from the same generator.
#[derive(Debug, Default)]
pub struct TitleSynthesizer {
    issued: HashSet<String>,
}

impl TitleSynthesizer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn next<R: Rng>(&mut self, rng: &mut R) -> String {
        loop {
            let title = draw(rng);
            if self.issued.insert(title.clone()) {
                return title;
            }
        }
    }
}

fn draw<R: Rng>(rng: &mut R) -> String {
    let tile = step_range(rng, TILE, 2);
    let x = step_range(rng, COORD_X, 2);
    let y = step_range(rng, COORD_Y, 2);
    format!("{INSTRUMENT}:{RUN}:{FLOWCELL}:{LANE}:{tile}:{x}:{y:04}")
}

/// Uniform pick from `start, start + step, ...` below `stop`.
fn step_range<R: Rng>(rng: &mut R, (start, stop): (u32, u32), step: u32) -> u32 {
    let slots = (stop - start).div_ceil(step);
    start + step * rng.gen_range(0..slots)
}
