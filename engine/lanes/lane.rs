use std::str::FromStr;

/** Which of the two travel directions through a node a lane carries. */
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum LaneSide {
    One,
    Two,
}

pub static SIDES: &'static [LaneSide] = &[LaneSide::One, LaneSide::Two];

impl LaneSide {
    pub fn suffix(&self) -> char {
        use LaneSide::*;
        match self {
            One => '1',
            Two => '2',
        }
    }

    pub fn from_suffix(suffix: char) -> Option<Self> {
        use LaneSide::*;
        match suffix {
            '1' => Some(One),
            '2' => Some(Two),
            _ => None,
        }
    }
}

/**
 * Half of a map node: the map node's name plus the side. Externally it is named by appending the
 * side's suffix, so node `A` splits into lanes `A1` and `A2`.
 */
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct LaneNode {
    pub node: String,
    pub side: LaneSide,
}

impl LaneNode {
    pub fn new(node: &str, side: LaneSide) -> Self {
        Self {
            node: node.to_string(),
            side,
        }
    }

    pub fn one(node: &str) -> Self {
        Self::new(node, LaneSide::One)
    }

    pub fn two(node: &str) -> Self {
        Self::new(node, LaneSide::Two)
    }

    pub fn is_on(&self, node: &str) -> bool {
        self.node == node
    }
}

impl std::fmt::Display for LaneNode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}{}", self.node, self.side.suffix())
    }
}

#[derive(thiserror::Error, Debug, PartialEq)]
#[error("Not a lane name: {0:?}")]
pub struct LaneNameError(pub String);

impl FromStr for LaneNode {
    type Err = LaneNameError;

    fn from_str(name: &str) -> Result<Self, Self::Err> {
        let (split, suffix) = name
            .char_indices()
            .last()
            .ok_or_else(|| LaneNameError(name.to_string()))?;
        let side = LaneSide::from_suffix(suffix).ok_or_else(|| LaneNameError(name.to_string()))?;
        if split == 0 {
            return Err(LaneNameError(name.to_string()));
        }
        Ok(Self::new(&name[..split], side))
    }
}

#[cfg(test)]
mod lane_tests {
    use crate::lane::*;

    #[test]
    fn names() {
        assert_eq!(LaneNode::one("A").to_string(), "A1");
        assert_eq!(LaneNode::two("Main St").to_string(), "Main St2");
        assert_eq!("Main St2".parse(), Ok(LaneNode::two("Main St")));
        // only the last character is the side
        assert_eq!("B12".parse(), Ok(LaneNode::two("B1")));
        assert_eq!("\u{e9}1".parse(), Ok(LaneNode::one("\u{e9}")));
    }

    #[test]
    fn bad_names() {
        assert!("A".parse::<LaneNode>().is_err());
        assert!("A3".parse::<LaneNode>().is_err());
        assert!("1".parse::<LaneNode>().is_err());
        assert!("".parse::<LaneNode>().is_err());
    }
}
