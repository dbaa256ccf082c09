use std::cmp::Ordering;
use std::collections::HashMap;

use cgmath as cg;

/** Screen coordinates: x grows to the right, y grows downward. */
pub type Key = cg::Vector2<f64>;

pub trait Positions {
    fn position(&self, node: &str) -> Option<Key>;
}

impl Positions for HashMap<String, Key> {
    fn position(&self, node: &str) -> Option<Key> {
        self.get(node).copied()
    }
}

/** No positions at all, so every ordering falls back to adjacency order. */
impl Positions for () {
    fn position(&self, _node: &str) -> Option<Key> {
        None
    }
}

impl<P: Positions + ?Sized> Positions for &P {
    fn position(&self, node: &str) -> Option<Key> {
        (**self).position(node)
    }
}

/**
 * Signed turn of `candidate` relative to the arrival direction `previous -> current`. Negative
 * values are to the right (with y pointing down), zero is collinear, positive is to the left.
 */
pub fn turn_order(previous: Key, current: Key, candidate: Key) -> f64 {
    (candidate - previous).perp_dot(current - previous)
}

/**
 * Orders the onward candidates at `current`, arriving from `previous`, from rightmost to
 * leftmost. The sort is stable, so collinear candidates keep their given order. If any of the
 * positions is unknown, the candidates are returned unchanged.
 */
pub fn sort_right_to_left<'a, P, I>(
    positions: &P,
    previous: &str,
    current: &str,
    candidates: I,
) -> Vec<&'a str>
where
    P: Positions + ?Sized,
    I: IntoIterator<Item = &'a str>,
{
    let candidates: Vec<&'a str> = candidates.into_iter().collect();

    let (previous_key, current_key) =
        match (positions.position(previous), positions.position(current)) {
            (Some(previous_key), Some(current_key)) => (previous_key, current_key),
            _ => {
                log::debug!(
                    "No position for {} or {}, keeping adjacency order",
                    previous,
                    current
                );
                return candidates;
            }
        };

    let mut keyed = Vec::with_capacity(candidates.len());
    for candidate in candidates.iter() {
        match positions.position(candidate) {
            Some(key) => keyed.push((turn_order(previous_key, current_key, key), *candidate)),
            None => {
                log::debug!("No position for {}, keeping adjacency order", candidate);
                return candidates;
            }
        }
    }

    keyed.sort_by(|a, b| a.0.partial_cmp(&b.0).unwrap_or(Ordering::Equal));
    keyed.into_iter().map(|(_, candidate)| candidate).collect()
}
