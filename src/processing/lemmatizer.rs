//! Rule-based English lemmatizer
//!
//! Reduces inflected word forms to a base form with a small set of suffix
//! rules plus an exception table for irregular forms. Rules are applied until
//! the word stops changing, so `lemmatize` is idempotent for every word the
//! built-in table covers.

use crate::error::{Result, ScreenerError};
use log::debug;
use serde::Deserialize;
use std::collections::HashMap;
use std::path::Path;

const MAX_PASSES: usize = 16;

/// Irregular forms and words the suffix rules would damage.
/// Entries mapping a word to itself stop the rules from touching it.
const EXCEPTIONS: &[(&str, &str)] = &[
    // irregular verbs
    ("ran", "run"),
    ("went", "go"),
    ("gone", "go"),
    ("led", "lead"),
    ("built", "build"),
    ("wrote", "write"),
    ("written", "write"),
    ("taught", "teach"),
    ("thought", "think"),
    ("bought", "buy"),
    ("brought", "bring"),
    ("made", "make"),
    ("began", "begin"),
    ("begun", "begin"),
    ("grew", "grow"),
    ("grown", "grow"),
    ("knew", "know"),
    ("known", "know"),
    ("drove", "drive"),
    ("driven", "drive"),
    ("chose", "choose"),
    ("chosen", "choose"),
    ("spoke", "speak"),
    ("spoken", "speak"),
    ("held", "hold"),
    ("kept", "keep"),
    ("met", "meet"),
    ("sent", "send"),
    ("spent", "spend"),
    ("took", "take"),
    ("taken", "take"),
    ("gave", "give"),
    ("given", "give"),
    ("saw", "see"),
    ("seen", "see"),
    ("found", "find"),
    ("got", "get"),
    ("gotten", "get"),
    ("told", "tell"),
    ("sold", "sell"),
    ("paid", "pay"),
    ("fought", "fight"),
    ("sought", "seek"),
    ("felt", "feel"),
    ("lost", "lose"),
    ("meant", "mean"),
    ("understood", "understand"),
    ("oversaw", "oversee"),
    ("overseen", "oversee"),
    ("undertook", "undertake"),
    ("undertaken", "undertake"),
    // regular verbs the suffix rules get wrong
    ("used", "use"),
    ("using", "use"),
    ("created", "create"),
    ("creating", "create"),
    ("controlled", "control"),
    ("controlling", "control"),
    ("modelled", "model"),
    ("modelling", "model"),
    ("labelled", "label"),
    ("labelling", "label"),
    ("travelled", "travel"),
    ("travelling", "travel"),
    ("cancelled", "cancel"),
    ("cancelling", "cancel"),
    ("focused", "focus"),
    ("focusing", "focus"),
    ("biased", "bias"),
    ("agreed", "agree"),
    ("guaranteed", "guarantee"),
    ("explored", "explore"),
    ("exploring", "explore"),
    ("ignored", "ignore"),
    ("ignoring", "ignore"),
    ("promoted", "promote"),
    ("promoting", "promote"),
    ("invited", "invite"),
    ("inviting", "invite"),
    ("welcomed", "welcome"),
    ("welcoming", "welcome"),
    // irregular plurals
    ("children", "child"),
    ("men", "man"),
    ("women", "woman"),
    ("feet", "foot"),
    ("teeth", "tooth"),
    ("mice", "mouse"),
    ("geese", "goose"),
    ("analyses", "analysis"),
    ("criteria", "criterion"),
    ("phenomena", "phenomenon"),
    ("indices", "index"),
    ("matrices", "matrix"),
    ("vertices", "vertex"),
    ("caches", "cache"),
    ("niches", "niche"),
    ("movies", "movie"),
    ("cookies", "cookie"),
    // left alone
    ("bias", "bias"),
    ("embed", "embed"),
    ("hundred", "hundred"),
    ("news", "news"),
    ("series", "series"),
    ("species", "species"),
    ("always", "always"),
    ("perhaps", "perhaps"),
    ("whereas", "whereas"),
    ("nothing", "nothing"),
    ("something", "something"),
    ("anything", "anything"),
    ("everything", "everything"),
    ("physics", "physics"),
    ("mathematics", "mathematics"),
    ("analytics", "analytics"),
    ("economics", "economics"),
    ("electronics", "electronics"),
    ("robotics", "robotics"),
    ("logistics", "logistics"),
    ("ethics", "ethics"),
    ("politics", "politics"),
    // tools and platforms that end in -s
    ("kubernetes", "kubernetes"),
    ("postgres", "postgres"),
    ("jenkins", "jenkins"),
    ("pandas", "pandas"),
    ("devops", "devops"),
    ("devsecops", "devsecops"),
    ("mlops", "mlops"),
    ("gitops", "gitops"),
    ("aws", "aws"),
    ("ios", "ios"),
    ("macos", "macos"),
    ("sas", "sas"),
    ("rails", "rails"),
    ("nodejs", "nodejs"),
    ("nextjs", "nextjs"),
    ("vuejs", "vuejs"),
    ("threejs", "threejs"),
];

#[derive(Debug, Deserialize)]
struct ExceptionFile {
    #[serde(default)]
    exceptions: HashMap<String, String>,
}

#[derive(Debug, Clone)]
pub struct Lemmatizer {
    exceptions: HashMap<String, String>,
}

impl Default for Lemmatizer {
    fn default() -> Self {
        Self::new()
    }
}

impl Lemmatizer {
    pub fn new() -> Self {
        let exceptions = EXCEPTIONS
            .iter()
            .map(|(word, lemma)| (word.to_string(), lemma.to_string()))
            .collect();

        Self { exceptions }
    }

    /// Built-in table extended with a TOML file of the form
    /// `[exceptions]` followed by `word = "lemma"` lines.
    pub fn with_exceptions_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            ScreenerError::Normalization(format!(
                "cannot read lemma exceptions {}: {}",
                path.display(),
                e
            ))
        })?;

        let file: ExceptionFile = toml::from_str(&content).map_err(|e| {
            ScreenerError::Normalization(format!(
                "invalid lemma exceptions {}: {}",
                path.display(),
                e
            ))
        })?;

        let mut lemmatizer = Self::new();
        let added = file.exceptions.len();
        for (word, lemma) in file.exceptions {
            lemmatizer
                .exceptions
                .insert(word.to_lowercase(), lemma.to_lowercase());
        }
        debug!("Loaded {} lemma exceptions from {}", added, path.display());

        Ok(lemmatizer)
    }

    pub fn exception_count(&self) -> usize {
        self.exceptions.len()
    }

    pub fn lemmatize(&self, word: &str) -> String {
        let mut current = word.to_string();
        for _ in 0..MAX_PASSES {
            match self.step(&current) {
                Some(next) if next != current => current = next,
                _ => break,
            }
        }
        current
    }

    /// One rewrite. `None` means the word is already a base form.
    fn step(&self, word: &str) -> Option<String> {
        if let Some(lemma) = self.exceptions.get(word) {
            return (lemma != word).then(|| lemma.clone());
        }

        if word.len() <= 3 || !word.bytes().all(|b| b.is_ascii_lowercase()) {
            return None;
        }

        let len = word.len();
        if word.ends_with("sses") {
            Some(word[..len - 2].to_string())
        } else if word.ends_with("ies") && len > 4 {
            Some(format!("{}y", &word[..len - 3]))
        } else if ["shes", "ches", "xes", "zzes"].iter().any(|s| word.ends_with(s)) {
            Some(word[..len - 2].to_string())
        } else if word.ends_with('s') {
            if ["ss", "us", "is"].iter().any(|s| word.ends_with(s)) {
                None
            } else {
                Some(word[..len - 1].to_string())
            }
        } else if word.ends_with("ied") && len > 4 {
            Some(format!("{}y", &word[..len - 3]))
        } else if word.ends_with("eed") {
            None
        } else if let Some(stem) = word.strip_suffix("ed") {
            verb_stem(stem)
        } else if let Some(stem) = word.strip_suffix("ing") {
            verb_stem(stem)
        } else {
            None
        }
    }
}

/// Restore the base form of a verb whose `-ed` or `-ing` was removed.
fn verb_stem(stem: &str) -> Option<String> {
    let b = stem.as_bytes();
    if b.len() < 3 || !(0..b.len()).any(|i| is_vowel(b, i)) {
        return None;
    }

    let n = b.len();
    if b[n - 1] == b[n - 2]
        && !is_vowel(b, n - 1)
        && !matches!(b[n - 1], b'l' | b's' | b'z' | b'f')
        && ends_cvc(&b[..n - 1])
    {
        return Some(stem[..n - 1].to_string());
    }

    if needs_e(b) {
        Some(format!("{}e", stem))
    } else {
        Some(stem.to_string())
    }
}

fn needs_e(b: &[u8]) -> bool {
    let n = b.len();
    if measure(b) == 1 && ends_cvc(b) {
        return true;
    }

    let last = b[n - 1];
    let prev = b[n - 2];
    // consonant before the final two letters
    let open = n >= 3 && !is_vowel(b, n - 3);

    match last {
        b'v' => true,
        b'c' => !b.ends_with(b"ync"),
        b's' => prev != b's',
        b'z' => matches!(prev, b'i' | b'y'),
        b't' => match prev {
            b'a' => n >= 3 && !matches!(b[n - 3], b'e' | b'o'),
            b'u' => open,
            b'e' => n >= 3 && matches!(b[n - 3], b'l' | b'p'),
            _ => false,
        },
        b'r' => matches!(prev, b'u' | b'i' | b'a') && open,
        b'g' => {
            matches!(prev, b'a' | b'e' | b'o' | b'u' | b'r' | b'd')
                || b.ends_with(b"ang")
                || b.ends_with(b"eng")
        }
        b'l' => {
            (!is_vowel(b, n - 2) && !matches!(prev, b'l' | b'r' | b'w'))
                || (matches!(prev, b'i' | b'u') && open)
        }
        b'd' => matches!(prev, b'a' | b'i' | b'u') && open,
        b'm' => prev == b'u' && open,
        b'n' => prev == b'i' && open,
        b'k' => prev == b'o' && open,
        _ => false,
    }
}

fn is_vowel(b: &[u8], i: usize) -> bool {
    match b[i] {
        b'a' | b'e' | b'i' | b'o' => true,
        b'u' => !(i > 0 && b[i - 1] == b'q'),
        b'y' => i > 0 && !is_vowel(b, i - 1),
        _ => false,
    }
}

/// Number of vowel-consonant sequences in the word.
fn measure(b: &[u8]) -> usize {
    let mut m = 0;
    let mut prev_vowel = false;
    for i in 0..b.len() {
        let vowel = is_vowel(b, i);
        if prev_vowel && !vowel {
            m += 1;
        }
        prev_vowel = vowel;
    }
    m
}

fn ends_cvc(b: &[u8]) -> bool {
    let n = b.len();
    n >= 3
        && !is_vowel(b, n - 3)
        && is_vowel(b, n - 2)
        && !is_vowel(b, n - 1)
        && !matches!(b[n - 1], b'w' | b'x' | b'y')
}
