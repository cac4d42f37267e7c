//! Replacement vocabulary.

/// The fixed replacement word list, ordered and lowercase, read-only for
/// the process lifetime.
///
/// Heavily trimmed-down version of
/// https://en.wiktionary.org/wiki/Category:English_vulgarities
pub const VOCABULARY: &[&str] = &[
    "ass",
    "assclown",
    "asshat",
    "asshole",
    "badass",
    "balls",
    "bastard",
    "batshit",
    "bazonga",
    "bellend",
    "bitch",
    "bloody",
    "bollocks",
    "booty",
    "brotherfucker",
    "bugger",
    "bulge",
    "bullshit",
    "bussy",
    "butt",
    "cacky",
    "choad",
    "clit",
    "cock",
    "crap",
    "cum",
    "damn",
    "dick",
    "dipshit",
    "douche",
    "dumbass",
    "fanny",
    "fap",
    "fuck",
    "frick",
    "goddamn",
    "hell",
    "jackoff",
    "jizz",
    "motherfucker",
    "musk",
    "nutsack",
    "penis",
    "piss",
    "poop",
    "prick",
    "pussy",
    "rump",
    "shart",
    "shit",
    "shite",
    "sisterfucker",
    "slut",
    "sperm",
    "thrussy",
    "tits",
    "turd",
    "twat",
    "vagina",
    "wanker",
    "whore",
];
