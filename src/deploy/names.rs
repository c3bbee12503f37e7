//! Default stack name generation

use rand::Rng;

const ADJECTIVES: &[&str] = &[
    "amber", "brisk", "calm", "deft", "eager", "fleet", "gentle", "hardy", "ivory", "jolly",
    "kind", "lucid", "mossy", "noble", "opal", "proud", "quiet", "rapid", "sturdy", "tidy",
];

const NOUNS: &[&str] = &[
    "archive", "bay", "cache", "dock", "estuary", "field", "grove", "harbor", "island", "jetty",
    "keel", "lagoon", "marsh", "nook", "orchard", "pier", "quarry", "reservoir", "shelf", "vault",
];

/// Generate a default name like "sturdy-harbor-2847"
pub fn generate() -> String {
    let mut rng = rand::thread_rng();
    let adjective = ADJECTIVES[rng.gen_range(0..ADJECTIVES.len())];
    let noun = NOUNS[rng.gen_range(0..NOUNS.len())];
    let number: u16 = rng.gen_range(1000..10000);
    format!("{}-{}-{}", adjective, noun, number)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_generate_name_format() {
        let name = generate();
        let parts: Vec<&str> = name.split('-').collect();
        assert_eq!(parts.len(), 3);
        assert!(ADJECTIVES.contains(&parts[0]));
        assert!(NOUNS.contains(&parts[1]));
        let number: u16 = parts[2].parse().unwrap();
        assert!((1000..10000).contains(&number));
    }

    #[test]
    fn test_generated_names_are_valid_environment_names() {
        for _ in 0..20 {
            assert!(super::super::aws::validate_environment_name(&generate()).is_ok());
        }
    }
}
