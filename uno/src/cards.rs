use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Identifies one physical card within a game.
///
/// Two cards can show the same [`Face`] and still be different cards. Hands and
/// piles always compare cards by id, never by face.
#[derive(Copy, Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct CardId(pub u16);

/// A physical card: an identity plus the face printed on it.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Card {
    pub id: CardId,
    pub face: Face,
}

/// What is printed on a card.
///
/// Serialized as its short text form, e.g. `"B+2"`, `"R7"` or `"W"`.
#[derive(Copy, Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(into = "String", try_from = "String")]
pub struct Face {
    pub color: Color,
    pub value: Value,
}

/// The color of a [face](Face).
#[derive(Copy, Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Color {
    Red,
    Yellow,
    Green,
    Blue,
    /// Wild-class cards have no color and can be played on anything.
    NonColor,
}

/// The value of a [face](Face).
#[derive(Copy, Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Value {
    /// `0` to `9`.
    Number(u8),
    Skip,
    /// Reverse. With two players it acts like a skip.
    Reserve,
    DrawTwo,
    DrawFour,
    Wild,
}

pub const COLORS: [Color; 4] = [Color::Red, Color::Yellow, Color::Green, Color::Blue];

/// Number of cards in [`standard_catalog()`].
pub const STANDARD_CATALOG_SIZE: usize = 54;

impl Card {
    pub fn new(id: CardId, face: Face) -> Self {
        Self { id, face }
    }
}

impl Face {
    pub const fn new(color: Color, value: Value) -> Self {
        Self { color, value }
    }

    pub fn is_wild_class(self) -> bool {
        self.color == Color::NonColor
    }

    /// Plain number cards are the only ones that may seed the table.
    pub fn is_numeric(self) -> bool {
        matches!(self.value, Value::Number(_)) && !self.is_wild_class()
    }

    /// Whether a card with this face may be put on top of `top`.
    ///
    /// Wild-class cards go on anything and anything goes on a wild-class card.
    /// Otherwise the color or the value has to match.
    pub fn can_be_played_on(self, top: Face) -> bool {
        self.is_wild_class()
            || top.is_wild_class()
            || self.color == top.color
            || self.value == top.value
    }
}

impl std::fmt::Display for Card {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.face)
    }
}

impl std::fmt::Display for Face {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let color = match self.color {
            Color::Red => "R",
            Color::Yellow => "Y",
            Color::Green => "G",
            Color::Blue => "B",
            Color::NonColor => "",
        };
        write!(f, "{}", color)?;
        match self.value {
            Value::Number(n) => write!(f, "{}", n),
            Value::Skip => write!(f, "S"),
            Value::Reserve => write!(f, "R"),
            Value::DrawTwo => write!(f, "+2"),
            Value::DrawFour => write!(f, "+4"),
            Value::Wild => write!(f, "W"),
        }
    }
}

/// The error type for the [`FromStr`] instance of [`Face`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FaceFromStrErr {
    Empty,
    InvalidColor,
    InvalidValue,
}

impl std::error::Error for FaceFromStrErr {}

impl std::fmt::Display for FaceFromStrErr {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            FaceFromStrErr::Empty => write!(f, "Empty card code"),
            FaceFromStrErr::InvalidColor => {
                write!(f, "Card code must start with R, Y, G or B, or be +4 or W")
            }
            FaceFromStrErr::InvalidValue => {
                write!(f, "Card value must be a digit, S, R or +2")
            }
        }
    }
}

impl FromStr for Face {
    type Err = FaceFromStrErr;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "" => return Err(FaceFromStrErr::Empty),
            "+4" => return Ok(Face::new(Color::NonColor, Value::DrawFour)),
            "W" => return Ok(Face::new(Color::NonColor, Value::Wild)),
            _ => {}
        }
        let mut chars = s.chars();
        let color = match chars.next() {
            Some('R') => Color::Red,
            Some('Y') => Color::Yellow,
            Some('G') => Color::Green,
            Some('B') => Color::Blue,
            _ => return Err(FaceFromStrErr::InvalidColor),
        };
        let value = match chars.as_str() {
            "S" => Value::Skip,
            "R" => Value::Reserve,
            "+2" => Value::DrawTwo,
            digit if digit.len() == 1 => match digit.chars().next().and_then(|c| c.to_digit(10)) {
                Some(n) => Value::Number(n as u8),
                None => return Err(FaceFromStrErr::InvalidValue),
            },
            _ => return Err(FaceFromStrErr::InvalidValue),
        };
        Ok(Face { color, value })
    }
}

impl From<Face> for String {
    fn from(face: Face) -> String {
        face.to_string()
    }
}

impl TryFrom<String> for Face {
    type Error = FaceFromStrErr;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        s.parse()
    }
}

/// Shorthand for creating faces from their text form.
///
/// The first character is the color (`R`, `Y`, `G`, `B`), followed by a digit,
/// `S` (skip), `R` (reserve) or `+2`. The two wild-class faces are written `+4`
/// and `W`.
///
/// This macro is just calling the [`FromStr`] instance of [`Face`].
/// ```
/// # use uno::{face, Color, Face, Value};
/// assert_eq!(
///     face!("B+2"),
///     Face { color: Color::Blue, value: Value::DrawTwo }
/// );
/// ```
#[macro_export]
macro_rules! face {
    ($code:literal) => {
        <$crate::Face as std::str::FromStr>::from_str($code)
            .expect("Invalid card code given to face! macro")
    };
}
#[allow(unused_imports)]
pub(crate) use face;

/// The faces of the standard catalog, in catalog order.
///
/// Per color: the numbers 0 to 9, a skip, a reserve and a +2. Then one +4 and
/// one wild.
pub fn standard_faces() -> Vec<Face> {
    let mut faces = Vec::with_capacity(STANDARD_CATALOG_SIZE);
    for color in COLORS {
        for n in 0..=9 {
            faces.push(Face::new(color, Value::Number(n)));
        }
        faces.push(Face::new(color, Value::Skip));
        faces.push(Face::new(color, Value::Reserve));
        faces.push(Face::new(color, Value::DrawTwo));
    }
    faces.push(Face::new(Color::NonColor, Value::DrawFour));
    faces.push(Face::new(Color::NonColor, Value::Wild));
    faces
}

/// Turns faces into physical cards with ids `0..faces.len()`.
pub fn mint_cards(faces: impl IntoIterator<Item = Face>) -> Vec<Card> {
    faces
        .into_iter()
        .enumerate()
        .map(|(i, face)| Card::new(CardId(i as u16), face))
        .collect()
}

/// Every card of the standard catalog, unshuffled.
pub fn standard_catalog() -> Vec<Card> {
    mint_cards(standard_faces())
}
