use quickcheck::{Arbitrary, Gen};

use crate::{Color, Face, PlayerId, Value, COLORS};

/// One action of whoever holds the turn, or a declaration by anybody.
#[derive(Clone, Copy, Debug)]
pub enum Step {
    /// Play the card at this position, modulo the hand size.
    Play(u8),
    Draw,
    Pass,
    Declare(PlayerId),
    Accuse(PlayerId),
}

/// A seeded game followed by a sequence of steps. Illegal steps are rejected
/// by the game and simply skipped.
#[derive(Clone, Debug)]
pub struct Script {
    pub seed: u64,
    pub steps: Vec<Step>,
}

impl Arbitrary for Script {
    fn arbitrary(g: &mut Gen) -> Self {
        Self {
            seed: u64::arbitrary(g),
            steps: Vec::<Step>::arbitrary(g),
        }
    }

    fn shrink(&self) -> Box<dyn Iterator<Item = Self>> {
        let seed = self.seed;
        Box::new(self.steps.shrink().map(move |steps| Script { seed, steps }))
    }
}

impl Arbitrary for Step {
    fn arbitrary(g: &mut Gen) -> Self {
        // Plays are the interesting part, so weigh them up
        match u8::arbitrary(g) % 8 {
            0..=3 => Step::Play(u8::arbitrary(g)),
            4 => Step::Draw,
            5 => Step::Pass,
            6 => Step::Declare(PlayerId::arbitrary(g)),
            _ => Step::Accuse(PlayerId::arbitrary(g)),
        }
    }
}

impl Arbitrary for PlayerId {
    fn arbitrary(g: &mut Gen) -> Self {
        *g.choose(&PlayerId::BOTH).unwrap()
    }
}

/// Only faces that exist in the standard catalog.
impl Arbitrary for Face {
    fn arbitrary(g: &mut Gen) -> Self {
        if u8::arbitrary(g) % 14 == 0 {
            let value = *g.choose(&[Value::DrawFour, Value::Wild]).unwrap();
            return Face::new(Color::NonColor, value);
        }
        let color = *g.choose(&COLORS).unwrap();
        let value = match u8::arbitrary(g) % 13 {
            n @ 0..=9 => Value::Number(n),
            10 => Value::Skip,
            11 => Value::Reserve,
            _ => Value::DrawTwo,
        };
        Face::new(color, value)
    }
}
