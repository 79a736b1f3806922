use serde::{Deserialize, Serialize};

/// An 8-bit RGB colour.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct Rgb(pub [u8; 3]);

impl Rgb {
    pub const BLACK: Rgb = Rgb([0, 0, 0]);
    pub const GRAY: Rgb = Rgb([128, 128, 128]);
    pub const WHITE: Rgb = Rgb([255, 255, 255]);
}

/// Canvas fill colour offered by the control window.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Background {
    Black,
    Gray,
    White,
}

impl Background {
    pub const ALL: &[Background] = &[Background::Black, Background::Gray, Background::White];

    pub fn rgb(self) -> Rgb {
        match self {
            Background::Black => Rgb::BLACK,
            Background::Gray => Rgb::GRAY,
            Background::White => Rgb::WHITE,
        }
    }
}

impl std::fmt::Display for Background {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Background::Black => write!(f, "Black"),
            Background::Gray => write!(f, "Gray"),
            Background::White => write!(f, "White"),
        }
    }
}

impl std::str::FromStr for Background {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "black" => Ok(Background::Black),
            "gray" | "grey" => Ok(Background::Gray),
            "white" => Ok(Background::White),
            other => Err(format!(
                "background must be one of: black, gray, white, got '{other}'"
            )),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case::black(Background::Black, 0)]
    #[case::gray(Background::Gray, 128)]
    #[case::white(Background::White, 255)]
    fn test_background_levels(#[case] background: Background, #[case] level: u8) {
        assert_eq!(background.rgb(), Rgb([level; 3]));
    }

    #[rstest]
    #[case("black", Background::Black)]
    #[case("Grey", Background::Gray)]
    #[case("WHITE", Background::White)]
    fn test_parse(#[case] input: &str, #[case] expected: Background) {
        assert_eq!(input.parse::<Background>().unwrap(), expected);
    }

    #[test]
    fn test_parse_rejects_unknown() {
        assert!("purple".parse::<Background>().is_err());
    }

    #[test]
    fn test_serde_uses_lowercase() {
        let json = serde_json::to_string(&Background::Gray).unwrap();
        assert_eq!(json, "\"gray\"");
    }
}
