// Connector-phrase selection for inserted keywords.
//
// In "Built the billing service, leveraging Kafka" the connector word is
// picked by an injected strategy so output is reproducible: the default
// rotates through the list, and a seeded random strategy varies phrasing
// while staying deterministic for a given seed.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

pub const CONNECTORS: &[&str] = &["leveraging", "utilizing", "through", "via", "using", "with"];

/// Picks the connector word for the next insertion.
pub trait ConnectorStrategy: Send {
    fn next_connector(&mut self) -> &'static str;
}

/// Deterministic round robin over `CONNECTORS`.
#[derive(Debug, Default)]
pub struct RotatingConnectors {
    index: usize,
}

impl ConnectorStrategy for RotatingConnectors {
    fn next_connector(&mut self) -> &'static str {
        let connector = CONNECTORS[self.index % CONNECTORS.len()];
        self.index = self.index.wrapping_add(1);
        connector
    }
}

/// Random choice from a seeded generator.
pub struct SeededConnectors {
    rng: StdRng,
}

impl SeededConnectors {
    pub fn new(seed: u64) -> Self {
        Self {
            rng: StdRng::seed_from_u64(seed),
        }
    }
}

impl ConnectorStrategy for SeededConnectors {
    fn next_connector(&mut self) -> &'static str {
        CONNECTORS[self.rng.random_range(0..CONNECTORS.len())]
    }
}

/// Strategy for an optional seed: seeded when given, rotating otherwise.
pub fn strategy_for(seed: Option<u64>) -> Box<dyn ConnectorStrategy> {
    match seed {
        Some(seed) => Box::new(SeededConnectors::new(seed)),
        None => Box::new(RotatingConnectors::default()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rotation_wraps() {
        let mut strategy = RotatingConnectors::default();
        let picked: Vec<&str> = (0..CONNECTORS.len() + 1).map(|_| strategy.next_connector()).collect();
        assert_eq!(picked[0], "leveraging");
        assert_eq!(picked[CONNECTORS.len()], "leveraging");
        assert_eq!(picked[1], "utilizing");
    }

    #[test]
    fn test_same_seed_same_sequence() {
        let mut a = SeededConnectors::new(7);
        let mut b = SeededConnectors::new(7);
        let seq_a: Vec<&str> = (0..20).map(|_| a.next_connector()).collect();
        let seq_b: Vec<&str> = (0..20).map(|_| b.next_connector()).collect();
        assert_eq!(seq_a, seq_b);
        assert!(seq_a.iter().all(|c| CONNECTORS.contains(c)));
    }
}
