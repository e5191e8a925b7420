//! Container names: validation and random slugs.

use rand::seq::SliceRandom;
use regex::Regex;
use std::sync::OnceLock;

const ADJECTIVES: &[&str] = &[
    "amber", "brave", "calm", "clever", "dusty", "eager", "fancy", "gentle", "happy", "icy",
    "jolly", "keen", "lively", "lucky", "mellow", "misty", "noble", "proud", "quiet", "rapid",
    "rusty", "shiny", "silent", "sunny", "swift", "tidy", "vivid", "witty", "young", "zesty",
];

const NOUNS: &[&str] = &[
    "badger", "beaver", "bison", "cobra", "condor", "coyote", "crane", "dingo", "eagle", "falcon",
    "ferret", "gecko", "heron", "ibex", "jackal", "koala", "lemur", "lynx", "marten", "moose",
    "newt", "otter", "panda", "puffin", "raven", "salmon", "tapir", "walrus", "wombat", "yak",
];

fn name_pattern() -> Option<&'static Regex> {
    static PATTERN: OnceLock<Option<Regex>> = OnceLock::new();
    PATTERN
        .get_or_init(|| Regex::new(r"^[a-zA-Z][a-zA-Z0-9-]{0,62}$").ok())
        .as_ref()
}

/// Whether LXD accepts `name` as a container name.
pub fn is_valid_name(name: &str) -> bool {
    name_pattern().is_some_and(|p| p.is_match(name)) && !name.ends_with('-')
}

/// Random `adjective-noun` slug.
pub fn random_name() -> String {
    let mut rng = rand::thread_rng();
    let adjective = ADJECTIVES.choose(&mut rng).copied().unwrap_or("lazy");
    let noun = NOUNS.choose(&mut rng).copied().unwrap_or("box");
    format!("{}-{}", adjective, noun)
}
