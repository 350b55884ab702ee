//! Combination identifiers for topping sets.
//!
//! A set is identified by the union of its toppings' bit weights. Weights are distinct
//! powers of two (enforced by `ToppingCatalog`), so for a set without repeats this is
//! the sum of the weights, and decoding is a per-topping AND.

use crate::catalog::Topping;

/// Minimum width of the rendered binary id.
const MIN_DIGITS: usize = 3;

/// Bitmask of `selected`. A topping listed twice counts once.
pub fn combination_value(selected: &[Topping]) -> u32 {
    selected.iter().fold(0, |acc, t| acc | t.bit_weight)
}

/// Render `selected` as a zero-padded binary id, or `None` for an empty set.
///
/// Width is `max(3, toppings + 1)` over the distinct toppings, so a lone lowest
/// bit renders as `"001"`.
pub fn encode(selected: &[Topping]) -> Option<String> {
    let value = combination_value(selected);
    if value == 0 {
        return None;
    }
    let width = MIN_DIGITS.max(value.count_ones() as usize + 1);
    Some(format!("{:0width$b}", value, width = width))
}

/// Catalog toppings whose bit is set in `value`, in catalog order.
pub fn decode(value: u32, catalog: &[Topping]) -> Vec<Topping> {
    catalog
        .iter()
        .filter(|t| value & t.bit_weight != 0)
        .cloned()
        .collect()
}

/// Parse a rendered binary id back into its integer value.
pub fn parse(id: &str) -> Option<u32> {
    u32::from_str_radix(id, 2).ok()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::ToppingCatalog;

    fn three() -> Vec<Topping> {
        vec![
            Topping::new("a", "A", 1.0, 1),
            Topping::new("b", "B", 1.0, 2),
            Topping::new("c", "C", 1.0, 4),
        ]
    }

    #[test]
    fn test_full_set() {
        let toppings = three();
        assert_eq!(combination_value(&toppings), 7);
        assert_eq!(encode(&toppings).as_deref(), Some("111"));
    }

    #[test]
    fn test_lowest_bit_is_padded() {
        let toppings = three();
        assert_eq!(encode(&toppings[..1]).as_deref(), Some("001"));
    }

    #[test]
    fn test_repeated_topping_counts_once() {
        let toppings = three();
        let doubled = vec![toppings[0].clone(), toppings[0].clone()];
        assert_eq!(combination_value(&doubled), 1);
        assert_eq!(encode(&doubled).as_deref(), Some("001"));
        let decoded: Vec<_> = decode(1, &toppings).into_iter().map(|t| t.id).collect();
        assert_eq!(decoded, vec!["a"]);

        let top = Topping::new("z", "Z", 1.0, 1 << 31);
        assert_eq!(combination_value(&[top.clone(), top]), 1 << 31);
    }

    #[test]
    fn test_empty_set_is_none() {
        assert_eq!(encode(&[]), None);
    }

    #[test]
    fn test_width_grows_with_count() {
        let catalog = ToppingCatalog::builtin();
        let all = catalog.toppings();
        // 7 toppings -> width 8 even though 127 needs 7 digits
        assert_eq!(encode(all).as_deref(), Some("01111111"));
    }

    #[test]
    fn test_decode_every_subset() {
        let catalog = ToppingCatalog::builtin();
        let all = catalog.toppings();
        for mask in 0u32..(1 << all.len()) {
            let subset: Vec<Topping> = all
                .iter()
                .enumerate()
                .filter(|(i, _)| mask & (1 << i) != 0)
                .map(|(_, t)| t.clone())
                .collect();
            let value = combination_value(&subset);
            assert_eq!(decode(value, all), subset, "mask {mask:#b}");
        }
    }

    #[test]
    fn test_parse_rendered_id() {
        let toppings = three();
        let id = encode(&toppings[1..]).unwrap();
        assert_eq!(id, "110");
        assert_eq!(parse(&id), Some(6));
        assert_eq!(parse("12"), None);
    }
}
