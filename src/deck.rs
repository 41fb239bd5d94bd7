//! Built-in word decks

use rand::Rng;
use rand::SeedableRng;
use rand::seq::SliceRandom;
use rand_pcg::Pcg32;
use serde::{Deserialize, Serialize};

const ANIMALS: &[&str] = &[
    "Elephant", "Giraffe", "Penguin", "Kangaroo", "Octopus", "Flamingo", "Cheetah", "Dolphin",
    "Hedgehog", "Platypus", "Koala", "Zebra", "Gorilla", "Peacock", "Crocodile", "Squirrel",
    "Jellyfish", "Chameleon", "Hamster", "Owl", "Rhinoceros", "Sloth", "Lobster", "Camel",
    "Butterfly", "Walrus", "Porcupine", "Seahorse", "Raccoon", "Hippopotamus", "Panda", "Moose",
    "Toucan", "Armadillo", "Starfish", "Otter", "Woodpecker", "Llama", "Scorpion", "Polar Bear",
];

const ACTIONS: &[&str] = &[
    "Swimming", "Juggling", "Sneezing", "Dancing", "Skipping", "Whistling", "Yawning", "Cooking",
    "Painting", "Climbing", "Knitting", "Surfing", "Bowling", "Fishing", "Boxing", "Skating",
    "Brushing Teeth", "Tying Shoes", "Hula Hooping", "Rowing", "Sweeping", "Typing", "Snoring",
    "Clapping", "Shivering", "Driving", "Hiccuping", "Ironing", "Golfing", "Hiking", "Laughing",
    "Meditating", "Skydiving", "Texting", "Vacuuming", "Weightlifting", "Yodeling", "Crawling",
    "Tiptoeing", "Waving",
];

/// Which deck a round draws from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DeckId {
    #[default]
    Animals,
    Actions,
}

impl DeckId {
    pub const ALL: [DeckId; 2] = [DeckId::Animals, DeckId::Actions];

    pub fn as_str(&self) -> &'static str {
        match self {
            DeckId::Animals => "animals",
            DeckId::Actions => "actions",
        }
    }

    pub fn display_name(&self) -> &'static str {
        match self {
            DeckId::Animals => "Animals",
            DeckId::Actions => "Actions",
        }
    }

    /// Words in their stored order
    pub fn words(&self) -> &'static [&'static str] {
        match self {
            DeckId::Animals => ANIMALS,
            DeckId::Actions => ACTIONS,
        }
    }

    /// Uniform random permutation of the deck (Fisher-Yates)
    pub fn shuffled_words<R: Rng + ?Sized>(&self, rng: &mut R) -> Vec<String> {
        let mut words: Vec<String> = self.words().iter().map(|w| w.to_string()).collect();
        words.shuffle(rng);
        words
    }

    /// Reproducible shuffle for a given seed
    pub fn shuffled_with_seed(&self, seed: u64) -> Vec<String> {
        let mut rng = Pcg32::seed_from_u64(seed);
        self.shuffled_words(&mut rng)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn decks_have_unique_words() {
        for deck in DeckId::ALL {
            let unique: HashSet<_> = deck.words().iter().collect();
            assert_eq!(unique.len(), deck.words().len(), "{}", deck.display_name());
            assert!(deck.words().len() >= 40);
        }
    }

    #[test]
    fn shuffle_is_a_permutation() {
        let deck = DeckId::Animals;
        let mut shuffled = deck.shuffled_with_seed(7);
        let mut original: Vec<String> = deck.words().iter().map(|w| w.to_string()).collect();
        shuffled.sort();
        original.sort();
        assert_eq!(shuffled, original);
    }

    #[test]
    fn seeded_shuffle_is_reproducible() {
        assert_eq!(
            DeckId::Actions.shuffled_with_seed(42),
            DeckId::Actions.shuffled_with_seed(42)
        );
        assert_ne!(
            DeckId::Actions.shuffled_with_seed(1),
            DeckId::Actions.shuffled_with_seed(2)
        );
    }

    #[test]
    fn serialized_names_match_as_str() {
        for deck in DeckId::ALL {
            let json = serde_json::to_string(&deck).unwrap();
            assert_eq!(json, format!("\"{}\"", deck.as_str()));
            assert_eq!(serde_json::from_str::<DeckId>(&json).unwrap(), deck);
        }
    }
}
