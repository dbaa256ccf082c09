use serde::Serialize;

use crate::map::TrackMap;

/** Junctions of more than three roads cannot be split into two lanes per node. */
pub const MAX_DEGREE: usize = 3;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub enum Issue {
    OrphanNode { node: String },
    OverConnectedNode { node: String, degree: usize },
}

impl std::fmt::Display for Issue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        use Issue::*;
        match self {
            OrphanNode { node } => write!(f, "{} is not connected to anything", node),
            OverConnectedNode { node, degree } => write!(
                f,
                "{} has {} connections, at most {} are supported",
                node, degree, MAX_DEGREE
            ),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Report {
    pub issues: Vec<Issue>,
    /** Nodes of degree 3, in map order. */
    pub junctions: Vec<String>,
}

impl Report {
    /** Whether the map can be compiled. */
    pub fn is_complete(&self) -> bool {
        self.issues.is_empty()
    }

    /** Complete, and every node has at most two connections. */
    pub fn is_simple(&self) -> bool {
        self.is_complete() && self.junctions.is_empty()
    }
}

impl std::fmt::Display for Report {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if self.issues.is_empty() {
            write!(f, "no issues")?;
        } else {
            write!(f, "{} issues:", self.issues.len())?;
            for issue in &self.issues {
                write!(f, "\n  {}", issue)?;
            }
        }
        if !self.junctions.is_empty() {
            write!(f, "\njunctions: {}", self.junctions.join(", "))?;
        }
        Ok(())
    }
}

impl TrackMap {
    /**
     * Structural checks before compiling. Nothing is corrected; every node with a problem gets
     * an entry in the report.
     */
    pub fn validate(&self) -> Report {
        let mut report = Report::default();
        for node in self.node_names() {
            let degree = self.degree(node);
            if degree == 0 {
                report.issues.push(Issue::OrphanNode {
                    node: node.to_string(),
                });
            } else if degree > MAX_DEGREE {
                report.issues.push(Issue::OverConnectedNode {
                    node: node.to_string(),
                    degree,
                });
            } else if degree == MAX_DEGREE {
                report.junctions.push(node.to_string());
            }
        }
        report
    }
}

#[cfg(test)]
mod validate_tests {
    use crate::adjacency::Side;
    use crate::map::TrackMap;
    use crate::validate::*;

    #[test]
    fn chain_is_simple() {
        let mut map = TrackMap::new();
        map.connect("A", "B", 1, Side::Back);
        map.connect("B", "C", 2, Side::Back);
        let report = map.validate();
        assert!(report.is_complete());
        assert!(report.is_simple());
    }

    #[test]
    fn junction_is_complete_but_not_simple() {
        let mut map = TrackMap::new();
        map.connect("J", "P", 1, Side::Back);
        map.connect("J", "Q", 1, Side::Back);
        map.connect("J", "R", 1, Side::Back);
        let report = map.validate();
        assert!(report.is_complete());
        assert!(!report.is_simple());
        assert_eq!(report.junctions, vec!["J".to_string()]);
    }

    #[test]
    fn orphans_and_over_connected() {
        let mut map = TrackMap::new();
        for other in ["A", "B", "C", "D"] {
            map.connect("X", other, 1, Side::Back);
        }
        map.add_node("Lonely");
        let report = map.validate();
        assert!(!report.is_complete());
        assert_eq!(
            report.issues,
            vec![
                Issue::OverConnectedNode {
                    node: "X".to_string(),
                    degree: 4
                },
                Issue::OrphanNode {
                    node: "Lonely".to_string()
                },
            ]
        );
    }
}
